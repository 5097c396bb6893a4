//! Sparse property storage and change notification types

use std::collections::BTreeMap;

use slotmap::new_key_type;

/// Property naming the block this block inherits from
pub const EXTENDS: &str = "Extends";

/// Property naming the material a block is made of
pub const MATERIAL: &str = "Material";

/// Sparse map of property overrides
///
/// Holds only the values an entity sets itself; anything absent is either
/// inherited through `Extends` or left at the game's default. Keys are kept
/// sorted, which is also the order they are written back in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PropertyStore {
    values: BTreeMap<String, String>,
}

impl PropertyStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// The override stored for `key`, if any
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Store an override, returning the previous one
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.values.insert(key.into(), value.into())
    }

    /// Drop an override, returning it
    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.values.remove(key)
    }

    /// Overrides in ascending key order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Snapshot of every override except `Extends`
    pub(crate) fn overrides_without_extends(&self) -> Vec<(String, String)> {
        self.values
            .iter()
            .filter(|(k, _)| k.as_str() != EXTENDS)
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

new_key_type! {
    /// Key for a registered change listener, used for removal
    pub struct ListenerKey;
}

/// An effective property change on one entity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyChange {
    /// Name of the entity that changed
    pub entity: String,
    /// Property whose effective value changed
    pub property: String,
    /// Effective value before the change
    pub old: Option<String>,
    /// Effective value after the change
    pub new: Option<String>,
}

/// Callback invoked synchronously after an effective property change
pub type ChangeCallback = Box<dyn FnMut(&PropertyChange)>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_iterates_sorted() {
        let mut store = PropertyStore::new();
        store.insert("Material", "wood");
        store.insert("Extends", "woodFrame");
        store.insert("CanPickup", "true");

        let keys: Vec<_> = store.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["CanPickup", "Extends", "Material"]);
    }

    #[test]
    fn test_overrides_snapshot_skips_extends() {
        let mut store = PropertyStore::new();
        store.insert(EXTENDS, "parent");
        store.insert("Mass", "10");

        let snapshot = store.overrides_without_extends();
        assert_eq!(snapshot, vec![("Mass".to_string(), "10".to_string())]);
    }

    #[test]
    fn test_insert_and_remove() {
        let mut store = PropertyStore::new();
        assert!(store.is_empty());
        assert_eq!(store.insert("Mass", "10"), None);
        assert_eq!(store.insert("Mass", "20"), Some("10".to_string()));
        assert_eq!(store.get("Mass"), Some("20"));
        assert_eq!(store.remove("Mass"), Some("20".to_string()));
        assert!(!store.contains("Mass"));
    }
}
