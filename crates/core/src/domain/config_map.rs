// Function configuration map (key/value pairs driving an adapter)

use serde_yaml::Value;

/// Ordered, read-only view of a function's key/value configuration.
///
/// Entries keep the order they had in the source document so that flags
/// can be rendered deterministically.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigurationMap {
    entries: Vec<(String, String)>,
}

impl ConfigurationMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a map from `data` of a ConfigMap document
    ///
    /// Scalar values are stringified (`true` -> "true", `3` -> "3"); keys or
    /// values that are not scalars are skipped.
    pub fn from_data(data: &Value) -> Self {
        let entries = data
            .as_mapping()
            .map(|mapping| {
                mapping
                    .iter()
                    .filter_map(|(k, v)| Some((scalar_to_string(k)?, scalar_to_string(v)?)))
                    .collect()
            })
            .unwrap_or_default();
        Self { entries }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for ConfigurationMap
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Null => Some(String::new()),
        _ => None,
    }
}
