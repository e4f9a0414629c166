// ResourceList wire format (pipeline function input/output)

use serde::{Deserialize, Serialize};
use serde_yaml::Value;

use super::collection::ObjectCollection;
use super::error::{DomainError, Result};
use super::object::KubernetesObject;
use super::result::FunctionResult;

pub const RESOURCE_LIST_API_VERSION: &str = "config.kubernetes.io/v1";
pub const RESOURCE_LIST_KIND: &str = "ResourceList";

/// Envelope exchanged between pipeline functions
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceList {
    pub api_version: String,
    pub kind: String,
    #[serde(default)]
    pub items: Vec<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub function_config: Option<Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub results: Vec<FunctionResult>,
}

impl ResourceList {
    /// Envelope carrying only items
    pub fn from_items(items: &[KubernetesObject]) -> Self {
        Self {
            api_version: RESOURCE_LIST_API_VERSION.to_string(),
            kind: RESOURCE_LIST_KIND.to_string(),
            items: items.iter().map(|o| o.as_value().clone()).collect(),
            function_config: None,
            results: Vec::new(),
        }
    }

    /// Convert into a collection
    ///
    /// Items that are not Kubernetes objects are rejected: the pipeline
    /// contract only carries well-formed objects.
    pub fn into_collection(self) -> Result<ObjectCollection> {
        if self.kind != RESOURCE_LIST_KIND {
            return Err(DomainError::ValidationError(format!(
                "expected kind {}, got {}",
                RESOURCE_LIST_KIND, self.kind
            )));
        }

        let items = self
            .items
            .into_iter()
            .enumerate()
            .map(|(idx, value)| {
                KubernetesObject::from_value(value).ok_or_else(|| {
                    DomainError::ValidationError(format!(
                        "item {} is not a Kubernetes object (apiVersion, kind and metadata.name required)",
                        idx
                    ))
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(ObjectCollection::from_parts(
            items,
            self.function_config,
            self.results,
        ))
    }
}

impl From<ObjectCollection> for ResourceList {
    fn from(collection: ObjectCollection) -> Self {
        let (items, function_config, results) = collection.into_parts();
        Self {
            api_version: RESOURCE_LIST_API_VERSION.to_string(),
            kind: RESOURCE_LIST_KIND.to_string(),
            items: items.into_iter().map(KubernetesObject::into_value).collect(),
            function_config,
            results,
        }
    }
}
