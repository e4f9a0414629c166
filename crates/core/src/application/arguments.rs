// Argument builder: function configuration -> ordered argument vector

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::domain::ConfigurationMap;
use crate::error::Result;

/// Keys starting with this marker are rendered as a single `key=value` token
pub const FLAG_PREFIX: &str = "--";

/// How the command key's value turns into the leading tokens
#[derive(Debug, Clone, Copy)]
pub enum CommandRule {
    /// Fixed prefix followed by the command value, split shell-style
    /// (`"config cluster"` -> `config`, `cluster`)
    Split { prefix: &'static [&'static str] },
    /// Verb must be listed; emits `<route prefix> <verb>`
    Routed {
        routes: &'static [(&'static str, &'static str)],
    },
}

/// Per-adapter rules for recognized keys
#[derive(Debug, Clone, Copy)]
pub struct ArgumentRules {
    pub command_key: &'static str,
    pub command: CommandRule,
    /// Positional path emitted right after the command tokens
    pub path_key: Option<&'static str>,
    /// Content staged to a file and replaced by `--config=<path>`
    pub inline_config_key: Option<&'static str>,
    /// Boolean key switching stdout from logs to re-ingestion
    pub stream_toggle_key: Option<&'static str>,
    /// Keys consumed by the adapter itself, never rendered as flags
    pub reserved_keys: &'static [&'static str],
}

/// What happens to the subprocess stdout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StreamPolicy {
    /// Every stdout line goes to the info log
    #[default]
    LogOnly,
    /// stdout is accumulated and parsed back into objects
    Capture,
}

/// Why no subprocess is started
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// No configuration map, or an empty one
    NoConfig,
    /// Command key absent or empty
    MissingCommand,
    /// Command not in the adapter's allowed set
    UnrecognizedCommand(String),
    /// Command value could not be tokenized
    InvalidCommand(String),
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::NoConfig => write!(f, "no function configuration"),
            SkipReason::MissingCommand => write!(f, "no command configured"),
            SkipReason::UnrecognizedCommand(cmd) => write!(f, "unrecognized command '{}'", cmd),
            SkipReason::InvalidCommand(reason) => write!(f, "invalid command: {}", reason),
        }
    }
}

/// Fully built invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArgumentPlan {
    pub args: Vec<String>,
    /// First token of the command value
    pub verb: String,
    /// Route prefix chosen by a `CommandRule::Routed` table
    pub route_prefix: Option<&'static str>,
    pub stream_policy: StreamPolicy,
    /// Inline configuration content, staged by `ArgumentBuilder::build`
    pub inline_config: Option<String>,
    /// Values of reserved keys
    pub reserved: BTreeMap<String, String>,
}

impl ArgumentPlan {
    pub fn reserved(&self, key: &str) -> Option<&str> {
        self.reserved.get(key).map(String::as_str)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildOutcome {
    Skip(SkipReason),
    Invoke(ArgumentPlan),
}

impl BuildOutcome {
    /// Argument vector; empty when nothing is invoked
    pub fn args(&self) -> &[String] {
        match self {
            BuildOutcome::Skip(_) => &[],
            BuildOutcome::Invoke(plan) => &plan.args,
        }
    }
}

/// Builds argument vectors for one adapter
pub struct ArgumentBuilder {
    rules: ArgumentRules,
    config_path: PathBuf,
}

impl ArgumentBuilder {
    /// Create a builder
    ///
    /// # Arguments
    /// * `rules` - Recognized keys of the adapter
    /// * `config_path` - Fixed path inline configuration is staged to
    pub fn new(rules: ArgumentRules, config_path: impl Into<PathBuf>) -> Self {
        Self {
            rules,
            config_path: config_path.into(),
        }
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Build the argument vector, staging inline configuration to disk
    ///
    /// The file write completes before the plan is returned.
    pub async fn build(&self, config: Option<&ConfigurationMap>) -> Result<BuildOutcome> {
        let mut plan = match self.plan(config) {
            Ok(plan) => plan,
            Err(reason) => return Ok(BuildOutcome::Skip(reason)),
        };

        if let Some(content) = &plan.inline_config {
            tokio::fs::write(&self.config_path, content).await?;
            plan.args
                .push(format!("{}config={}", FLAG_PREFIX, self.config_path.display()));
        }

        debug!(args = ?plan.args, "Built argument vector");
        Ok(BuildOutcome::Invoke(plan))
    }

    /// Translate the map into a plan without touching the filesystem
    ///
    /// Order: command tokens, path, then remaining flags in encounter order.
    pub fn plan(&self, config: Option<&ConfigurationMap>) -> std::result::Result<ArgumentPlan, SkipReason> {
        let config = match config {
            Some(c) if !c.is_empty() => c,
            _ => return Err(SkipReason::NoConfig),
        };

        let mut command = None;
        let mut path = None;
        let mut inline_config = None;
        let mut stream_policy = StreamPolicy::LogOnly;
        let mut reserved = BTreeMap::new();
        let mut flags = Vec::new();

        for (key, value) in config.iter() {
            if key == self.rules.command_key {
                command = Some(value);
            } else if Some(key) == self.rules.inline_config_key {
                inline_config = Some(value);
            } else if Some(key) == self.rules.stream_toggle_key {
                if value.trim().eq_ignore_ascii_case("true") {
                    stream_policy = StreamPolicy::Capture;
                }
            } else if Some(key) == self.rules.path_key {
                path = Some(value);
            } else if self.rules.reserved_keys.iter().any(|k| *k == key) {
                reserved.insert(key.to_string(), value.to_string());
            } else {
                render_flag(key, value, &mut flags);
            }
        }

        let command = command
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .ok_or(SkipReason::MissingCommand)?;

        let (mut args, verb, route_prefix) = self.command_tokens(command)?;

        if let Some(path) = path.filter(|p| !p.is_empty()) {
            args.push(path.to_string());
        }
        args.extend(flags);

        Ok(ArgumentPlan {
            args,
            verb,
            route_prefix,
            stream_policy,
            inline_config: inline_config.filter(|c| !c.is_empty()).map(str::to_string),
            reserved,
        })
    }

    fn command_tokens(
        &self,
        command: &str,
    ) -> std::result::Result<(Vec<String>, String, Option<&'static str>), SkipReason> {
        match self.rules.command {
            CommandRule::Split { prefix } => {
                let words = shell_words::split(command)
                    .map_err(|e| SkipReason::InvalidCommand(e.to_string()))?;
                let verb = words.first().cloned().ok_or(SkipReason::MissingCommand)?;
                let args = prefix
                    .iter()
                    .map(|p| p.to_string())
                    .chain(words)
                    .collect();
                Ok((args, verb, None))
            }
            CommandRule::Routed { routes } => {
                let (verb, prefix) = routes
                    .iter()
                    .find(|(verb, _)| *verb == command)
                    .ok_or_else(|| SkipReason::UnrecognizedCommand(command.to_string()))?;
                Ok((
                    vec![prefix.to_string(), verb.to_string()],
                    verb.to_string(),
                    Some(*prefix),
                ))
            }
        }
    }
}

/// `--key` style keys become `--key=value`; bare keys become `--key`, `value`
fn render_flag(key: &str, value: &str, out: &mut Vec<String>) {
    if key.starts_with(FLAG_PREFIX) {
        out.push(format!("{}={}", key, value));
    } else {
        out.push(format!("{}{}", FLAG_PREFIX, key));
        out.push(value.to_string());
    }
}
