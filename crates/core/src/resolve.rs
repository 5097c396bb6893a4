//! Inheritance resolution along `Extends` references
//!
//! Parents are looked up by name on every walk, never cached, so a rename or a
//! removed parent is picked up immediately. An unknown parent ends the walk
//! with `None`. Every walk keeps a visited set and reports a loop as
//! [`ConfigError::InheritanceCycle`].

use std::collections::{BTreeMap, HashSet};

use tracing::trace;

use crate::collection::Collection;
use crate::entities::{Entity, PropertyEntity};
use crate::error::{ConfigError, ConfigResult};
use crate::properties::EXTENDS;

/// Effective value of `key` on `entity`: its own override, else whatever the
/// parent chain yields.
///
/// `Extends` itself is never inherited.
pub fn resolve<'a, T: PropertyEntity>(
    collection: &'a Collection<T>,
    entity: &'a T,
    key: &str,
) -> ConfigResult<Option<&'a str>> {
    if let Some(value) = entity.properties().get(key) {
        return Ok(Some(value));
    }
    inherited(collection, entity, key)
}

/// Value the parent chain yields for `key`, ignoring `entity`'s own override
pub fn inherited<'a, T: PropertyEntity>(
    collection: &'a Collection<T>,
    entity: &'a T,
    key: &str,
) -> ConfigResult<Option<&'a str>> {
    if !T::INHERITS || key == EXTENDS {
        return Ok(None);
    }

    let mut visited: HashSet<&str> = HashSet::new();
    let mut chain: Vec<&str> = vec![entity.name()];
    visited.insert(entity.name());

    let mut current = entity;
    while let Some(parent) = parent_of(collection, current) {
        chain.push(parent.name());
        if !visited.insert(parent.name()) {
            return Err(cycle(&chain));
        }
        if let Some(value) = parent.properties().get(key) {
            trace!("{} inherits {} from {}", entity.name(), key, parent.name());
            return Ok(Some(value));
        }
        current = parent;
    }
    Ok(None)
}

/// Every effective property of `entity`, nearest definition winning
pub fn effective<T: PropertyEntity>(
    collection: &Collection<T>,
    entity: &T,
) -> ConfigResult<BTreeMap<String, String>> {
    let mut values: BTreeMap<String, String> = entity
        .properties()
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

    let mut visited: HashSet<&str> = HashSet::from([entity.name()]);
    let mut chain: Vec<&str> = vec![entity.name()];
    let mut current = entity;
    while let Some(parent) = parent_of(collection, current) {
        chain.push(parent.name());
        if !visited.insert(parent.name()) {
            return Err(cycle(&chain));
        }
        for (key, value) in parent.properties().iter() {
            if key != EXTENDS {
                values.entry(key.to_string()).or_insert_with(|| value.to_string());
            }
        }
        current = parent;
    }
    Ok(values)
}

/// The entity `entity` extends, if it names one that exists
pub fn parent_of<'a, T: PropertyEntity>(collection: &'a Collection<T>, entity: &T) -> Option<&'a T> {
    if !T::INHERITS {
        return None;
    }
    entity
        .properties()
        .get(EXTENDS)
        .and_then(|parent| collection.get(parent))
}

/// Fail if making `entity` extend `parent` would close a loop
pub fn check_extends<T: PropertyEntity>(
    collection: &Collection<T>,
    entity: &str,
    parent: &str,
) -> ConfigResult<()> {
    let mut chain: Vec<&str> = vec![entity];
    let mut visited: HashSet<&str> = HashSet::from([entity]);

    let mut next = Some(parent);
    while let Some(name) = next {
        chain.push(name);
        if !visited.insert(name) {
            return Err(cycle(&chain));
        }
        next = collection
            .get(name)
            .and_then(|e| e.properties().get(EXTENDS));
    }
    Ok(())
}

/// Whether `ancestor` appears anywhere on `entity`'s parent chain
pub fn descends_from<'a, T: PropertyEntity>(
    collection: &'a Collection<T>,
    entity: &'a T,
    ancestor: &str,
) -> ConfigResult<bool> {
    let mut chain: Vec<&str> = vec![entity.name()];
    let mut visited: HashSet<&str> = HashSet::from([entity.name()]);

    let mut current = entity;
    while let Some(parent) = parent_of(collection, current) {
        if parent.name() == ancestor {
            return Ok(true);
        }
        chain.push(parent.name());
        if !visited.insert(parent.name()) {
            return Err(cycle(&chain));
        }
        current = parent;
    }
    Ok(false)
}

/// Fail if renaming `old` to `new` would close a loop.
///
/// After the rename, references to either name lead to the renamed entity,
/// so only loops through it need checking.
pub fn check_rename<'a, T: Entity>(collection: &'a Collection<T>, old: &'a str, new: &'a str) -> ConfigResult<()> {
    let Some(renamed) = collection.get(old) else {
        return Ok(());
    };

    let mut chain: Vec<&str> = vec![new];
    let mut visited: HashSet<&str> = HashSet::from([new]);

    let mut current = renamed;
    while let Some(parent) = current.parent() {
        let next = if parent == old || parent == new {
            Some(renamed)
        } else {
            collection.get(parent)
        };
        let Some(next) = next else {
            break;
        };

        let shown = if next.name() == old { new } else { next.name() };
        chain.push(shown);
        if !visited.insert(shown) {
            return Err(cycle(&chain));
        }
        current = next;
    }
    Ok(())
}

fn cycle(chain: &[&str]) -> ConfigError {
    ConfigError::InheritanceCycle {
        chain: chain.iter().map(|s| s.to_string()).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::Block;

    fn block(id: u32, name: &str, props: &[(&str, &str)]) -> Block {
        let mut block = Block::new(id, name);
        for (k, v) in props {
            block.properties_mut().insert(*k, *v);
        }
        block
    }

    fn collection(blocks: Vec<Block>) -> Collection<Block> {
        let mut collection = Collection::new();
        for b in blocks {
            collection.insert(b).unwrap();
        }
        collection
    }

    #[test]
    fn test_resolve_walks_grandparents() {
        let c = collection(vec![
            block(1, "base", &[("Material", "wood")]),
            block(2, "mid", &[("Extends", "base")]),
            block(3, "leaf", &[("Extends", "mid")]),
        ]);
        let leaf = c.get("leaf").unwrap();
        assert_eq!(resolve(&c, leaf, "Material").unwrap(), Some("wood"));
        assert_eq!(resolve(&c, leaf, "Shape").unwrap(), None);
    }

    #[test]
    fn test_extends_is_not_inherited() {
        let c = collection(vec![
            block(1, "base", &[("Extends", "nowhere")]),
            block(2, "leaf", &[("Extends", "base")]),
        ]);
        let base = c.get("base").unwrap();
        let leaf = c.get("leaf").unwrap();
        assert_eq!(inherited(&c, leaf, EXTENDS).unwrap(), None);
        assert_eq!(resolve(&c, leaf, EXTENDS).unwrap(), Some("base"));
        assert_eq!(resolve(&c, base, EXTENDS).unwrap(), Some("nowhere"));
    }

    #[test]
    fn test_unknown_parent_resolves_to_none() {
        let c = collection(vec![block(1, "orphan", &[("Extends", "missing")])]);
        let orphan = c.get("orphan").unwrap();
        assert_eq!(resolve(&c, orphan, "Material").unwrap(), None);
        assert!(parent_of(&c, orphan).is_none());
    }

    #[test]
    fn test_cycle_is_reported() {
        let c = collection(vec![
            block(1, "a", &[("Extends", "b")]),
            block(2, "b", &[("Extends", "a")]),
        ]);
        let a = c.get("a").unwrap();
        match resolve(&c, a, "Material") {
            Err(ConfigError::InheritanceCycle { chain }) => {
                assert_eq!(chain, vec!["a", "b", "a"]);
            }
            other => panic!("expected cycle, got {:?}", other),
        }
    }

    #[test]
    fn test_effective_merges_chain() {
        let c = collection(vec![
            block(1, "base", &[("Material", "wood"), ("Shape", "Cube"), ("Extends", "x")]),
            block(2, "mid", &[("Extends", "base"), ("Shape", "Ramp")]),
            block(3, "leaf", &[("Extends", "mid"), ("Light", "4")]),
        ]);
        let values = effective(&c, c.get("leaf").unwrap()).unwrap();
        assert_eq!(values.get("Material").map(String::as_str), Some("wood"));
        assert_eq!(values.get("Shape").map(String::as_str), Some("Ramp"));
        assert_eq!(values.get("Light").map(String::as_str), Some("4"));
        assert_eq!(values.get(EXTENDS).map(String::as_str), Some("mid"));
    }

    #[test]
    fn test_descends_from() {
        let c = collection(vec![
            block(1, "base", &[]),
            block(2, "mid", &[("Extends", "base")]),
            block(3, "leaf", &[("Extends", "mid")]),
            block(4, "other", &[("Extends", "missing")]),
        ]);
        assert!(descends_from(&c, c.get("leaf").unwrap(), "base").unwrap());
        assert!(descends_from(&c, c.get("mid").unwrap(), "base").unwrap());
        assert!(!descends_from(&c, c.get("base").unwrap(), "leaf").unwrap());
        assert!(!descends_from(&c, c.get("other").unwrap(), "base").unwrap());
    }

    #[test]
    fn test_check_rename() {
        let c = collection(vec![
            block(1, "a", &[("Extends", "c")]),
            block(2, "c", &[("Extends", "b")]),
            block(3, "d", &[("Extends", "a")]),
        ]);
        assert!(check_rename(&c, "d", "e").is_ok());
        assert!(check_rename(&c, "a", "e").is_ok());
        assert!(matches!(
            check_rename(&c, "a", "b"),
            Err(ConfigError::InheritanceCycle { .. })
        ));
        assert!(check_rename(&c, "missing", "b").is_ok());
    }

    #[test]
    fn test_check_extends() {
        let c = collection(vec![
            block(1, "a", &[]),
            block(2, "b", &[("Extends", "a")]),
        ]);
        assert!(check_extends(&c, "c", "b").is_ok());
        assert!(check_extends(&c, "a", "missing").is_ok());
        assert!(matches!(
            check_extends(&c, "a", "b"),
            Err(ConfigError::InheritanceCycle { .. })
        ));
        assert!(matches!(
            check_extends(&c, "a", "a"),
            Err(ConfigError::InheritanceCycle { .. })
        ));
    }
}
