// Structured configuration object (one document of the pipeline's collection)

use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};

/// A single Kubernetes-style configuration object.
///
/// The full document is kept as a `serde_yaml::Value` so that nested fields
/// survive a round trip through the pipeline untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KubernetesObject(Value);

impl KubernetesObject {
    /// Wrap a value if it looks like a Kubernetes object
    ///
    /// A recognizable object is a mapping with string `apiVersion`, string
    /// `kind` and string `metadata.name`. Anything else yields `None`.
    pub fn from_value(value: Value) -> Option<Self> {
        if Self::is_kubernetes_object(&value) {
            Some(Self(value))
        } else {
            None
        }
    }

    /// Build an object from its identifying fields with empty metadata otherwise
    pub fn new(api_version: &str, kind: &str, name: &str) -> Self {
        let mut metadata = Mapping::new();
        metadata.insert(Value::from("name"), Value::from(name));

        let mut root = Mapping::new();
        root.insert(Value::from("apiVersion"), Value::from(api_version));
        root.insert(Value::from("kind"), Value::from(kind));
        root.insert(Value::from("metadata"), Value::Mapping(metadata));
        Self(Value::Mapping(root))
    }

    pub fn is_kubernetes_object(value: &Value) -> bool {
        let has_str = |v: Option<&Value>| v.map(Value::is_string).unwrap_or(false);
        value.is_mapping()
            && has_str(value.get("apiVersion"))
            && has_str(value.get("kind"))
            && has_str(value.get("metadata").and_then(|m| m.get("name")))
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn into_value(self) -> Value {
        self.0
    }

    pub fn api_version(&self) -> Option<&str> {
        self.0.get("apiVersion").and_then(Value::as_str)
    }

    pub fn kind(&self) -> Option<&str> {
        self.0.get("kind").and_then(Value::as_str)
    }

    pub fn name(&self) -> Option<&str> {
        self.metadata_field("name").and_then(Value::as_str)
    }

    pub fn namespace(&self) -> Option<&str> {
        self.metadata_field("namespace").and_then(Value::as_str)
    }

    /// Look up a label value by key
    pub fn label(&self, key: &str) -> Option<&str> {
        self.metadata_field("labels")
            .and_then(|labels| labels.get(key))
            .and_then(Value::as_str)
    }

    pub fn has_label(&self, key: &str) -> bool {
        self.metadata_field("labels")
            .and_then(|labels| labels.get(key))
            .is_some()
    }

    /// Set `metadata.<field>` to a string value, creating `metadata` if needed
    pub fn set_metadata_field(&mut self, field: &str, value: &str) {
        if let Some(metadata) = self.metadata_mut() {
            metadata.insert(Value::from(field), Value::from(value));
        }
    }

    /// Set `metadata.labels[key]`, creating the labels mapping if needed
    pub fn set_label(&mut self, key: &str, value: &str) {
        let Some(metadata) = self.metadata_mut() else {
            return;
        };
        let labels = metadata
            .entry(Value::from("labels"))
            .or_insert_with(|| Value::Mapping(Mapping::new()));
        if !labels.is_mapping() {
            *labels = Value::Mapping(Mapping::new());
        }
        if let Value::Mapping(labels) = labels {
            labels.insert(Value::from(key), Value::from(value));
        }
    }

    fn metadata_field(&self, field: &str) -> Option<&Value> {
        self.0.get("metadata").and_then(|m| m.get(field))
    }

    fn metadata_mut(&mut self) -> Option<&mut Mapping> {
        let Value::Mapping(root) = &mut self.0 else {
            return None;
        };
        let metadata = root
            .entry(Value::from("metadata"))
            .or_insert_with(|| Value::Mapping(Mapping::new()));
        match metadata {
            Value::Mapping(m) => Some(m),
            _ => None,
        }
    }
}

impl From<KubernetesObject> for Value {
    fn from(obj: KubernetesObject) -> Self {
        obj.0
    }
}
