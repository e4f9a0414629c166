// Function result entries reported back to the pipeline

use serde::{Deserialize, Serialize};
use serde_yaml::Mapping;

/// Result severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
            Severity::Info => write!(f, "info"),
        }
    }
}

/// One entry of the pipeline's result-reporting collection
///
/// Results written by earlier functions pass through untouched: a missing
/// severity stays missing and fields such as `resourceRef`, `field` or
/// `tags` are kept in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionResult {
    #[serde(default)]
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity: Option<Severity>,
    #[serde(flatten)]
    pub extra: Mapping,
}

impl FunctionResult {
    /// Generic result wrapping an error message
    pub fn general(err: impl std::fmt::Display, severity: Severity) -> Self {
        Self {
            message: err.to_string(),
            severity: Some(severity),
            extra: Mapping::new(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Some(Severity::Error)
    }
}
