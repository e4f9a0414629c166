// clusterctl adapter

use super::AdapterProfile;
use crate::application::arguments::{ArgumentRules, CommandRule};

pub const BINARY: &str = "clusterctl";
pub const CMD_KEY: &str = "cmd";
pub const INLINE_CONFIG_KEY: &str = "inlineConfig";
pub const STDOUT_TO_PIPELINE_KEY: &str = "stdoutToPipeline";

/// Inline configuration is staged here and passed as `--config`
pub const CONFIG_PATH: &str = "/tmp/clusterctl.yaml";

pub const USAGE: &str = r#"
Execute the clusterctl binary with the parameters specified.
Configured using a ConfigMap with a key for {cmd}.
Works with arbitrary clusterctl commands like init and flags like --infrastructure:

cmd: command, can contain several words, e.g. "config cluster".
inlineConfig: [Optional] clusterctl configuration, written to /tmp/clusterctl.yaml
  and passed as --config.
stdoutToPipeline: [Optional] "true" parses clusterctl output as resources and
  adds them to the pipeline instead of logging it.
--<flag>: [Optional] passed as --<flag>=<value>, e.g. --infrastructure.
<flag>: [Optional] passed as --<flag> <value>.

Example:
To init an Openstack provider:
apiVersion: v1
kind: ConfigMap
metadata:
  name: my-config
  annotations:
    config.kubernetes.io/function: |
      container:
        image: krm-exec-clusterctl
    config.kubernetes.io/local-config: "true"
data:
  cmd: "init"
  --infrastructure: "openstack"
"#;

pub fn profile() -> AdapterProfile {
    AdapterProfile {
        name: "clusterctl",
        binary: BINARY,
        rules: ArgumentRules {
            command_key: CMD_KEY,
            command: CommandRule::Split { prefix: &[] },
            path_key: None,
            inline_config_key: Some(INLINE_CONFIG_KEY),
            stream_toggle_key: Some(STDOUT_TO_PIPELINE_KEY),
            reserved_keys: &[],
        },
        default_config_path: CONFIG_PATH,
        input: None,
        inventory: None,
        usage: USAGE,
    }
}
