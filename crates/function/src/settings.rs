//! Adapter settings resolved from command-line options and environment

use std::path::PathBuf;

use krm_exec_core::application::{AdapterProfile, AdapterSettings, StreamFormat};
use tracing::warn;

/// Overrides accepted by `krm-exec run`
#[derive(Debug, Clone, Default)]
pub struct SettingsOverrides {
    pub binary: Option<String>,
    pub config_path: Option<String>,
    pub input_format: Option<StreamFormat>,
}

/// Apply overrides on top of the profile defaults
///
/// The config path is tilde-expanded (`~/clusterctl.yaml`). The input format
/// only applies to adapters that feed the collection to their tool.
pub fn resolve(profile: &AdapterProfile, overrides: SettingsOverrides) -> AdapterSettings {
    let mut settings = AdapterSettings::defaults(profile);

    if let Some(binary) = overrides.binary.filter(|b| !b.is_empty()) {
        settings.binary = binary;
    }
    if let Some(path) = overrides.config_path.filter(|p| !p.is_empty()) {
        settings.config_path = PathBuf::from(shellexpand::tilde(&path).into_owned());
    }
    if let Some(format) = overrides.input_format {
        if profile.input.is_some() {
            settings.input_format = Some(format);
        } else {
            warn!(adapter = %profile.name, "Adapter takes no stdin payload, ignoring input format");
        }
    }

    settings
}

#[cfg(test)]
mod tests {
    use super::*;
    use krm_exec_core::application::AdapterKind;

    #[test]
    fn test_defaults_without_overrides() {
        let profile = AdapterKind::Clusterctl.profile();
        let settings = resolve(&profile, SettingsOverrides::default());

        assert_eq!(settings.binary, "clusterctl");
        assert_eq!(settings.config_path, PathBuf::from("/tmp/clusterctl.yaml"));
        assert_eq!(settings.input_format, None);
    }

    #[test]
    fn test_overrides_apply() {
        let profile = AdapterKind::Kpt.profile();
        let settings = resolve(
            &profile,
            SettingsOverrides {
                binary: Some("/opt/kpt/bin/kpt".to_string()),
                config_path: Some("/var/run/kpt.yaml".to_string()),
                input_format: Some(StreamFormat::YamlDocuments),
            },
        );

        assert_eq!(settings.binary, "/opt/kpt/bin/kpt");
        assert_eq!(settings.config_path, PathBuf::from("/var/run/kpt.yaml"));
        assert_eq!(settings.input_format, Some(StreamFormat::YamlDocuments));
    }

    #[test]
    fn test_input_format_ignored_without_stdin_payload() {
        let profile = AdapterKind::Clusterctl.profile();
        let settings = resolve(
            &profile,
            SettingsOverrides {
                input_format: Some(StreamFormat::YamlDocuments),
                ..Default::default()
            },
        );

        assert_eq!(settings.input_format, None);
    }

    #[test]
    fn test_config_path_tilde_is_expanded() {
        let profile = AdapterKind::Clusterctl.profile();
        let settings = resolve(
            &profile,
            SettingsOverrides {
                config_path: Some("~/clusterctl.yaml".to_string()),
                ..Default::default()
            },
        );

        assert!(!settings.config_path.starts_with("~"));
        assert!(settings.config_path.ends_with("clusterctl.yaml"));
    }
}
