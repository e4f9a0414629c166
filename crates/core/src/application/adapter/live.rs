// kpt live adapter

use super::AdapterProfile;
use crate::application::arguments::{ArgumentRules, CommandRule};
use crate::application::encoder::StreamFormat;

pub const BINARY: &str = "kpt";
pub const CMD_KEY: &str = "cmd";

pub const USAGE: &str = r#"
Execute `kpt live <cmd>` with the pipeline resources on stdin.
Configured using a ConfigMap with a key for {cmd}; every other key is passed
as a flag (--<flag>=<value> for keys starting with "--", --<flag> <value>
otherwise). kpt output is logged.

Example:
apiVersion: v1
kind: ConfigMap
metadata:
  name: live-apply
  annotations:
    config.kubernetes.io/function: |
      container:
        image: krm-exec-live
    config.kubernetes.io/local-config: "true"
data:
  cmd: "apply"
  --reconcile-timeout: "2m"
"#;

pub fn profile() -> AdapterProfile {
    AdapterProfile {
        name: "live",
        binary: BINARY,
        rules: ArgumentRules {
            command_key: CMD_KEY,
            command: CommandRule::Split { prefix: &["live"] },
            path_key: None,
            inline_config_key: None,
            stream_toggle_key: None,
            reserved_keys: &[],
        },
        default_config_path: "/tmp/kpt-live.yaml",
        input: Some(StreamFormat::ResourceListYaml),
        inventory: None,
        usage: USAGE,
    }
}
