// Inventory synthesizer: adds the inventory object the live tooling expects

use crate::domain::{KubernetesObject, ObjectCollection};
use crate::port::LogSink;

/// Label carrying the inventory identifier
pub const INVENTORY_LABEL: &str = "cli-utils.sigs.k8s.io/inventory-id";

/// Configuration keys holding the inventory fields
#[derive(Debug, Clone, Copy)]
pub struct InventoryKeys {
    pub name: &'static str,
    pub namespace: &'static str,
    pub id: &'static str,
}

/// Inventory object fields
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InventoryRecord {
    pub name: String,
    pub namespace: String,
    pub id: String,
}

impl InventoryRecord {
    /// ConfigMap carrying the inventory label
    pub fn to_object(&self) -> KubernetesObject {
        let mut obj = KubernetesObject::new("v1", "ConfigMap", &self.name);
        obj.set_metadata_field("namespace", &self.namespace);
        obj.set_label(INVENTORY_LABEL, &self.id);
        obj
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InventoryOutcome {
    /// An object already carries the inventory label
    Found,
    /// A new inventory object was inserted
    Added(InventoryRecord),
    /// Some fields were missing; nothing inserted
    Incomplete { missing: Vec<&'static str> },
}

pub struct InventorySynthesizer {
    keys: InventoryKeys,
}

impl InventorySynthesizer {
    pub fn new(keys: InventoryKeys) -> Self {
        Self { keys }
    }

    /// Make sure the collection holds an inventory object
    ///
    /// `lookup` resolves configuration keys to values. Empty values count as
    /// missing. A missing field is logged as a warning, never an error.
    pub fn ensure<'v>(
        &self,
        collection: &mut ObjectCollection,
        lookup: impl Fn(&str) -> Option<&'v str>,
        log: &dyn LogSink,
    ) -> InventoryOutcome {
        if let Some(existing) = collection.find(|obj| obj.has_label(INVENTORY_LABEL)) {
            log.info(&format!(
                "found inventory {}/{}",
                existing.namespace().unwrap_or_default(),
                existing.name().unwrap_or_default()
            ));
            return InventoryOutcome::Found;
        }

        let fields = [self.keys.name, self.keys.namespace, self.keys.id]
            .map(|key| lookup(key).filter(|v| !v.trim().is_empty()));
        let missing: Vec<&'static str> = [self.keys.name, self.keys.namespace, self.keys.id]
            .into_iter()
            .zip(fields.iter())
            .filter(|(_, value)| value.is_none())
            .map(|(key, _)| key)
            .collect();

        let [Some(name), Some(namespace), Some(id)] = fields else {
            log.warn(&format!(
                "inventory not found and cannot be added, missing: {}",
                missing.join(", ")
            ));
            return InventoryOutcome::Incomplete { missing };
        };

        let record = InventoryRecord {
            name: name.to_string(),
            namespace: namespace.to_string(),
            id: id.to_string(),
        };
        collection.insert([record.to_object()]);
        log.info(&format!(
            "added inventory {}/{} ({})",
            record.namespace, record.name, record.id
        ));
        InventoryOutcome::Added(record)
    }
}
