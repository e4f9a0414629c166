// Object collection shared between pipeline functions

use serde_yaml::Value;

use super::config_map::ConfigurationMap;
use super::object::KubernetesObject;
use super::result::FunctionResult;

/// The pipeline's working set: items, the function config and reported results
///
/// The function config is kept exactly as received, whatever its shape;
/// only `function_config_map` interprets it.
#[derive(Debug, Clone, Default)]
pub struct ObjectCollection {
    items: Vec<KubernetesObject>,
    function_config: Option<Value>,
    results: Vec<FunctionResult>,
}

impl ObjectCollection {
    pub fn new(items: Vec<KubernetesObject>) -> Self {
        Self {
            items,
            ..Default::default()
        }
    }

    pub fn with_function_config(mut self, function_config: impl Into<Value>) -> Self {
        self.function_config = Some(function_config.into());
        self
    }

    pub fn items(&self) -> &[KubernetesObject] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn function_config(&self) -> Option<&Value> {
        self.function_config.as_ref()
    }

    /// Key/value configuration of the function, if it is configured by a ConfigMap
    pub fn function_config_map(&self) -> Option<ConfigurationMap> {
        let config = self.function_config.as_ref()?;
        if config.get("kind").and_then(Value::as_str) != Some("ConfigMap") {
            return None;
        }
        Some(
            config
                .get("data")
                .map(ConfigurationMap::from_data)
                .unwrap_or_default(),
        )
    }

    /// Append objects at the end, keeping their order
    pub fn insert(&mut self, objects: impl IntoIterator<Item = KubernetesObject>) {
        self.items.extend(objects);
    }

    /// Replace all items
    pub fn replace(&mut self, objects: Vec<KubernetesObject>) {
        self.items = objects;
    }

    pub fn find(&self, predicate: impl Fn(&KubernetesObject) -> bool) -> Option<&KubernetesObject> {
        self.items.iter().find(|obj| predicate(obj))
    }

    pub fn results(&self) -> &[FunctionResult] {
        &self.results
    }

    pub fn add_result(&mut self, result: FunctionResult) {
        self.results.push(result);
    }

    pub fn has_errors(&self) -> bool {
        self.results.iter().any(FunctionResult::is_error)
    }

    pub(crate) fn into_parts(
        self,
    ) -> (Vec<KubernetesObject>, Option<Value>, Vec<FunctionResult>) {
        (self.items, self.function_config, self.results)
    }

    pub(crate) fn from_parts(
        items: Vec<KubernetesObject>,
        function_config: Option<Value>,
        results: Vec<FunctionResult>,
    ) -> Self {
        Self {
            items,
            function_config,
            results,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_map(doc: &str) -> KubernetesObject {
        KubernetesObject::from_value(serde_yaml::from_str(doc).unwrap()).unwrap()
    }

    #[test]
    fn test_function_config_map_from_configmap() {
        let collection = ObjectCollection::new(vec![]).with_function_config(config_map(
            "apiVersion: v1\nkind: ConfigMap\nmetadata:\n  name: fn\ndata:\n  cmd: init\n",
        ));

        let map = collection.function_config_map().unwrap();
        assert_eq!(map.get("cmd"), Some("init"));
    }

    #[test]
    fn test_function_config_map_without_data_is_empty() {
        let collection = ObjectCollection::new(vec![]).with_function_config(config_map(
            "apiVersion: v1\nkind: ConfigMap\nmetadata:\n  name: fn\n",
        ));

        assert!(collection.function_config_map().unwrap().is_empty());
    }

    #[test]
    fn test_function_config_map_other_kind_is_none() {
        let collection = ObjectCollection::new(vec![]).with_function_config(config_map(
            "apiVersion: example.com/v1\nkind: Setter\nmetadata:\n  name: fn\n",
        ));

        assert!(collection.function_config_map().is_none());
        assert!(ObjectCollection::default().function_config_map().is_none());
    }

    #[test]
    fn test_function_config_map_ignores_unnamed_configmap_metadata() {
        let raw: Value = serde_yaml::from_str("kind: ConfigMap\ndata:\n  cmd: init\n").unwrap();
        let collection = ObjectCollection::default().with_function_config(raw.clone());

        assert_eq!(collection.function_config_map().unwrap().get("cmd"), Some("init"));
        assert_eq!(collection.function_config(), Some(&raw));
    }

    #[test]
    fn test_insert_appends_in_order() {
        let mut collection = ObjectCollection::new(vec![KubernetesObject::new("v1", "ConfigMap", "a")]);
        collection.insert(vec![
            KubernetesObject::new("v1", "ConfigMap", "b"),
            KubernetesObject::new("v1", "ConfigMap", "c"),
        ]);

        let names: Vec<_> = collection.items().iter().filter_map(|o| o.name()).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
    }
}
