// kpt adapter with command routing and inventory synthesis

use super::{AdapterProfile, InventoryPolicy};
use crate::application::arguments::{ArgumentRules, CommandRule};
use crate::application::encoder::StreamFormat;
use crate::application::inventory::InventoryKeys;

pub const BINARY: &str = "kpt";
pub const CMD_KEY: &str = "cmd";
pub const PATH_KEY: &str = "path";
pub const STDOUT_TO_PIPELINE_KEY: &str = "stdoutToPipeline";
pub const INVENTORY_NAME_KEY: &str = "inventoryName";
pub const INVENTORY_NAMESPACE_KEY: &str = "inventoryNamespace";
pub const INVENTORY_ID_KEY: &str = "inventoryId";

/// Allowed commands and the kpt command group they belong to
pub const COMMAND_ROUTES: &[(&str, &str)] = &[
    ("apply", "live"),
    ("preview", "live"),
    ("destroy", "live"),
    ("status", "live"),
    ("diff", "live"),
    ("source", "fn"),
    ("sink", "fn"),
    ("eval", "fn"),
];

pub const USAGE: &str = r#"
Execute kpt with the pipeline resources on stdin.
Configured using a ConfigMap with the following keys:

cmd: one of apply, preview, destroy, status, diff (run as `kpt live <cmd>`)
  or source, sink, eval (run as `kpt fn <cmd>`). Other values are ignored.
path: [Optional] package path passed right after the command, "-" reads stdin.
stdoutToPipeline: [Optional] "true" parses kpt output as resources and adds
  them to the pipeline instead of logging it.
inventoryName, inventoryNamespace, inventoryId: [Optional] used to add an
  inventory ConfigMap for live commands when the resources carry none.
--<flag>: [Optional] passed as --<flag>=<value>.
<flag>: [Optional] passed as --<flag> <value>.

Example:
apiVersion: v1
kind: ConfigMap
metadata:
  name: kpt-apply
  annotations:
    config.kubernetes.io/function: |
      container:
        image: krm-exec-kpt
    config.kubernetes.io/local-config: "true"
data:
  cmd: "apply"
  path: "-"
  inventoryName: "inventory-capi"
  inventoryNamespace: "default"
  inventoryId: "capi-workload"
"#;

pub fn profile() -> AdapterProfile {
    AdapterProfile {
        name: "kpt",
        binary: BINARY,
        rules: ArgumentRules {
            command_key: CMD_KEY,
            command: CommandRule::Routed {
                routes: COMMAND_ROUTES,
            },
            path_key: Some(PATH_KEY),
            inline_config_key: None,
            stream_toggle_key: Some(STDOUT_TO_PIPELINE_KEY),
            reserved_keys: &[
                INVENTORY_NAME_KEY,
                INVENTORY_NAMESPACE_KEY,
                INVENTORY_ID_KEY,
            ],
        },
        default_config_path: "/tmp/kpt.yaml",
        input: Some(StreamFormat::ResourceListYaml),
        inventory: Some(InventoryPolicy {
            keys: InventoryKeys {
                name: INVENTORY_NAME_KEY,
                namespace: INVENTORY_NAMESPACE_KEY,
                id: INVENTORY_ID_KEY,
            },
            route_prefixes: &["live"],
        }),
        usage: USAGE,
    }
}
