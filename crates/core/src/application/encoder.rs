// Stream encoder: object collection -> subprocess stdin payload

use crate::domain::{KubernetesObject, ResourceList};
use crate::error::Result;

/// Payload format written to the subprocess
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StreamFormat {
    /// Items wrapped in a `ResourceList`, as YAML
    #[default]
    ResourceListYaml,
    /// Items wrapped in a `ResourceList`, as JSON
    ResourceListJson,
    /// Bare YAML documents separated by `---`
    YamlDocuments,
}

impl std::str::FromStr for StreamFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "resource-list" | "resource-list-yaml" => Ok(StreamFormat::ResourceListYaml),
            "resource-list-json" | "json" => Ok(StreamFormat::ResourceListJson),
            "yaml" | "yaml-documents" => Ok(StreamFormat::YamlDocuments),
            other => Err(format!("unknown stream format '{}'", other)),
        }
    }
}

/// Serialize items in collection order; nothing is filtered here
pub fn encode(items: &[KubernetesObject], format: StreamFormat) -> Result<String> {
    match format {
        StreamFormat::ResourceListYaml => Ok(serde_yaml::to_string(&ResourceList::from_items(items))?),
        StreamFormat::ResourceListJson => Ok(serde_json::to_string(&ResourceList::from_items(items))?),
        StreamFormat::YamlDocuments => {
            let docs = items
                .iter()
                .map(|obj| serde_yaml::to_string(obj.as_value()))
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(docs.join("---\n"))
        }
    }
}
