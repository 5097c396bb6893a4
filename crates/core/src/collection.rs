//! Name-keyed entity collections
//!
//! A [`Collection`] exclusively owns every entity of one kind. Entities are
//! stored in a slot map and indexed by name; references between entities
//! (`Extends`, drop targets) are plain names resolved against the collection
//! on demand, so nothing holds a pointer back into it.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use slotmap::{new_key_type, SlotMap};
use tracing::debug;

use crate::entities::{Entity, PropertyEntity};
use crate::error::{ConfigError, ConfigResult};
use crate::properties::{ChangeCallback, ListenerKey, PropertyChange, EXTENDS};
use crate::resolve;

new_key_type! {
    /// Stable handle to an entity, unaffected by renames
    pub struct EntityKey;
}

/// Entities of one kind, unique by name
pub struct Collection<T> {
    /// Entities indexed by key
    entities: SlotMap<EntityKey, T>,

    /// Lookup by name
    by_name: HashMap<String, EntityKey>,

    /// Insertion (document) order
    order: Vec<EntityKey>,

    /// Property change listeners
    listeners: SlotMap<ListenerKey, ChangeCallback>,
}

impl<T> Default for Collection<T> {
    fn default() -> Self {
        Self {
            entities: SlotMap::with_key(),
            by_name: HashMap::new(),
            order: Vec::new(),
            listeners: SlotMap::with_key(),
        }
    }
}

impl<T: Entity> fmt::Debug for Collection<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Collection")
            .field("kind", &T::KIND)
            .field("len", &self.entities.len())
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

fn not_found<T: Entity>(name: &str) -> ConfigError {
    ConfigError::EntityNotFound {
        kind: T::KIND,
        name: name.to_string(),
    }
}

impl<T: Entity> Collection<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entity
    ///
    /// Fails with [`ConfigError::DuplicateEntityName`] if the name is taken.
    pub fn insert(&mut self, entity: T) -> ConfigResult<EntityKey> {
        if self.by_name.contains_key(entity.name()) {
            return Err(ConfigError::DuplicateEntityName {
                kind: T::KIND,
                name: entity.name().to_string(),
            });
        }

        let name = entity.name().to_string();
        let key = self.entities.insert(entity);
        self.by_name.insert(name, key);
        self.order.push(key);
        Ok(key)
    }

    /// Remove an entity by name, returning it
    ///
    /// References to it from other entities are left in place and resolve to
    /// nothing from now on.
    pub fn remove(&mut self, name: &str) -> Option<T> {
        let key = self.by_name.remove(name)?;
        self.order.retain(|k| *k != key);
        let entity = self.entities.remove(key);
        if entity.is_some() {
            debug!("Removed {} {}", T::KIND, name);
        }
        entity
    }

    /// Rename an entity, moving its index entry in one step.
    ///
    /// By-name references held by sibling entities (`Extends`, block drop
    /// targets) are rewritten to the new name. Siblings that named `new`
    /// without it existing start inheriting from the renamed entity; the
    /// rename fails without changes if that would close an `Extends` loop.
    pub fn rekey(&mut self, old: &str, new: &str) -> ConfigResult<()> {
        if old == new {
            return if self.contains(old) {
                Ok(())
            } else {
                Err(not_found::<T>(old))
            };
        }
        if self.by_name.contains_key(new) {
            return Err(ConfigError::NameTaken {
                kind: T::KIND,
                name: new.to_string(),
            });
        }

        let key = *self.by_name.get(old).ok_or_else(|| not_found::<T>(old))?;
        resolve::check_rename(self, old, new)?;

        let adopted: Vec<String> = self
            .iter()
            .filter(|entity| entity.parent() == Some(new))
            .map(|entity| entity.name().to_string())
            .collect();

        self.by_name.remove(old);
        self.by_name.insert(new.to_string(), key);
        if let Some(entity) = self.entities.get_mut(key) {
            entity.rename(new.to_string());
        }
        for entity in self.entities.values_mut() {
            entity.retarget(old, new);
        }

        if !adopted.is_empty() {
            T::adopted(self, &adopted)?;
        }

        debug!("Renamed {} {} to {}", T::KIND, old, new);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&T> {
        self.by_name.get(name).and_then(|key| self.entities.get(*key))
    }

    /// Mutable access to an entity.
    ///
    /// Property edits should go through [`Collection::set_property`] so the
    /// store stays minimal and listeners are told.
    pub fn get_mut(&mut self, name: &str) -> Option<&mut T> {
        let key = *self.by_name.get(name)?;
        self.entities.get_mut(key)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    /// Entities in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.order.iter().filter_map(|key| self.entities.get(*key))
    }

    /// Mutable access to every entity, in no particular order
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut T> {
        self.entities.values_mut()
    }

    /// Entity names in insertion order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.iter().map(Entity::name)
    }

    /// Entities in save order: ascending id, then ascending name
    pub fn sorted(&self) -> Vec<&T> {
        let mut sorted: Vec<&T> = self.iter().collect();
        sorted.sort_by(|a, b| a.id().cmp(&b.id()).then_with(|| a.name().cmp(b.name())));
        sorted
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Remove every entity. Listeners stay registered.
    pub fn clear(&mut self) {
        self.entities.clear();
        self.by_name.clear();
        self.order.clear();
    }

    /// Register a callback for effective property changes
    ///
    /// # Returns
    /// A key that can be passed to [`Collection::unsubscribe`].
    pub fn subscribe<F>(&mut self, callback: F) -> ListenerKey
    where
        F: FnMut(&PropertyChange) + 'static,
    {
        self.listeners.insert(Box::new(callback))
    }

    /// Remove a listener. Returns `true` if it was registered.
    pub fn unsubscribe(&mut self, key: ListenerKey) -> bool {
        self.listeners.remove(key).is_some()
    }

    fn notify(&mut self, change: &PropertyChange) {
        for (_, callback) in self.listeners.iter_mut() {
            callback(change);
        }
    }
}

impl<T: PropertyEntity> Collection<T> {
    /// Effective value of `key` on entity `name`
    ///
    /// `None` means the property is unset (game default), not an error.
    /// `Extends` reports only the entity's own parent reference.
    pub fn get_property(&self, name: &str, key: &str) -> ConfigResult<Option<&str>> {
        let entity = self.get(name).ok_or_else(|| not_found::<T>(name))?;
        resolve::resolve(self, entity, key)
    }

    /// Every property `name` ends up with, own overrides and inherited values
    /// alike, keyed by property name
    pub fn effective_properties(&self, name: &str) -> ConfigResult<BTreeMap<String, String>> {
        let entity = self.get(name).ok_or_else(|| not_found::<T>(name))?;
        resolve::effective(self, entity)
    }

    /// Set or reset (`None`) a property on entity `name`.
    ///
    /// An override is stored only when it differs from the inherited value;
    /// setting the inherited value removes the override. Setting `Extends`
    /// also drops every other override that the new parent already provides,
    /// and fails without changes if it would create a cycle. Overrides on
    /// inheriting entities that now match what they inherit are dropped too.
    ///
    /// # Returns
    /// `true` if the effective value changed. Listeners are called once in
    /// that case and not at all otherwise.
    pub fn set_property(&mut self, name: &str, key: &str, value: Option<&str>) -> ConfigResult<bool> {
        self.apply_property(name, key, value, true)
    }

    /// [`Collection::set_property`] for the loader: descendants are left for
    /// the [`Collection::normalize`] pass that follows loading.
    pub(crate) fn load_property(&mut self, name: &str, key: &str, value: Option<&str>) -> ConfigResult<bool> {
        self.apply_property(name, key, value, false)
    }

    fn apply_property(
        &mut self,
        name: &str,
        key: &str,
        value: Option<&str>,
        cascade: bool,
    ) -> ConfigResult<bool> {
        let entity = self.get(name).ok_or_else(|| not_found::<T>(name))?;
        let old = resolve::resolve(self, entity, key)?.map(str::to_string);
        let inherited = resolve::inherited(self, entity, key)?.map(str::to_string);

        let sets_parent = T::INHERITS && key == EXTENDS;
        if sets_parent {
            if let Some(parent) = value {
                resolve::check_extends(self, name, parent)?;
            }
        }

        let store = self
            .get_mut(name)
            .ok_or_else(|| not_found::<T>(name))?
            .properties_mut();
        match value {
            Some(value) if inherited.as_deref() != Some(value) => {
                store.insert(key, value);
            }
            _ => {
                store.remove(key);
            }
        }

        let new = self.get_property(name, key)?.map(str::to_string);
        if new == old {
            return Ok(false);
        }

        if sets_parent {
            self.prune_redundant(name)?;
        }
        if cascade {
            self.prune_descendants(name)?;
        }

        self.notify(&PropertyChange {
            entity: name.to_string(),
            property: key.to_string(),
            old,
            new,
        });
        Ok(true)
    }

    /// Drop the overrides of `name` that equal what its parent chain yields.
    ///
    /// Effective values are unchanged. Returns how many overrides were removed.
    pub fn prune_redundant(&mut self, name: &str) -> ConfigResult<usize> {
        let entity = self.get(name).ok_or_else(|| not_found::<T>(name))?;

        let mut redundant = Vec::new();
        for (key, value) in entity.properties().overrides_without_extends() {
            if resolve::inherited(self, entity, &key)? == Some(value.as_str()) {
                redundant.push(key);
            }
        }

        if let Some(entity) = self.get_mut(name) {
            for key in &redundant {
                entity.properties_mut().remove(key);
            }
        }
        Ok(redundant.len())
    }

    /// Prune every entity that inherits from `name`, directly or through
    /// intermediate parents. Returns how many overrides were removed.
    pub fn prune_descendants(&mut self, name: &str) -> ConfigResult<usize> {
        if !T::INHERITS {
            return Ok(0);
        }

        let mut descendants = Vec::new();
        for entity in self.iter() {
            if entity.name() != name && resolve::descends_from(self, entity, name)? {
                descendants.push(entity.name().to_string());
            }
        }

        let mut pruned = 0;
        for descendant in &descendants {
            pruned += self.prune_redundant(descendant)?;
        }
        Ok(pruned)
    }

    /// Prune redundant overrides on every entity, so the stored form no longer
    /// depends on the order properties were applied in.
    pub fn normalize(&mut self) -> ConfigResult<usize> {
        if !T::INHERITS {
            return Ok(0);
        }
        let names: Vec<String> = self.names().map(str::to_string).collect();
        let mut pruned = 0;
        for name in &names {
            pruned += self.prune_redundant(name)?;
        }
        Ok(pruned)
    }
}
