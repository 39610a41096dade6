use std::collections::{btree_map, BTreeMap};
use std::fmt;
use std::iter::Flatten;

use crate::core::entity::{ActionKind, Entity, Id, Kind, ObservationKind, StateKind};
use crate::error::{Error, Result};

pub type FiniteStates = FiniteCollection<StateKind>;
pub type FiniteActions = FiniteCollection<ActionKind>;
pub type FiniteObservations = FiniteCollection<ObservationKind>;

/// A finite set of distinct entities bucketed by their hash.
///
/// Iteration follows hash order, which is independent of insertion order and stable
/// across runs. Callers should not rely on any particular order for correctness.
/// Different entities that share a hash are kept side by side in their bucket.
pub struct FiniteCollection<K: Kind> {
    buckets: BTreeMap<u32, Vec<Entity<K>>>,
    len: usize,
}

impl<K: Kind> FiniteCollection<K> {
    pub fn new() -> Self {
        Self {
            buckets: BTreeMap::new(),
            len: 0,
        }
    }

    /// Builds a collection from a list of entities.
    pub fn from_entities<I>(entities: I) -> Self
    where
        I: IntoIterator<Item = Entity<K>>,
    {
        let mut collection = Self::new();
        for entity in entities {
            collection.add(entity);
        }
        collection
    }

    /// Convenience constructor for named entities.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::from_entities(names.into_iter().map(Entity::new))
    }

    /// Inserts an entity. Adding an equal entity again is a no-op. A different entity
    /// with the same hash is stored next to the existing one and logged.
    pub fn add(&mut self, entity: Entity<K>) {
        let bucket = self.buckets.entry(entity.hash_value()).or_default();
        let position = match bucket.binary_search(&entity) {
            Ok(_) => return,
            Err(position) => position,
        };
        if let Some(existing) = bucket.first() {
            log::warn!(
                "{} '{}' shares hash {} with '{}'",
                K::NAME,
                entity,
                entity.hash_value(),
                existing
            );
        }
        bucket.insert(position, entity);
        self.len += 1;
    }

    /// Removes an entity and hands it back to the caller.
    pub fn remove(&mut self, entity: &Entity<K>) -> Result<Entity<K>> {
        let not_found = || Error::NotFound {
            kind: K::NAME,
            name: entity.to_string(),
        };
        let bucket = self
            .buckets
            .get_mut(&entity.hash_value())
            .ok_or_else(not_found)?;
        let position = bucket.binary_search(entity).map_err(|_| not_found())?;
        let removed = bucket.remove(position);
        if bucket.is_empty() {
            self.buckets.remove(&entity.hash_value());
        }
        self.len -= 1;
        Ok(removed)
    }

    /// Replaces the whole contents.
    pub fn set<I>(&mut self, entities: I)
    where
        I: IntoIterator<Item = Entity<K>>,
    {
        *self = Self::from_entities(entities);
    }

    /// Positional lookup in iteration order.
    pub fn get(&self, index: usize) -> Result<&Entity<K>> {
        self.iter().nth(index).ok_or(Error::IndexOutOfRange {
            index,
            len: self.len,
        })
    }

    /// Linear scan by name. Factored entities match on their space-joined name.
    pub fn find(&self, name: &str) -> Result<&Entity<K>> {
        self.iter()
            .find(|entity| entity.name() == name)
            .ok_or_else(|| Error::NotFound {
                kind: K::NAME,
                name: name.to_string(),
            })
    }

    /// Looks an entity up by its table identity.
    pub fn resolve(&self, id: &Id<K>) -> Option<&Entity<K>> {
        let entity = id.entity();
        self.buckets
            .get(&entity.hash_value())?
            .iter()
            .find(|&existing| existing == entity)
    }

    pub fn contains(&self, entity: &Entity<K>) -> bool {
        self.buckets
            .get(&entity.hash_value())
            .is_some_and(|bucket| bucket.binary_search(entity).is_ok())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Entity<K>> + '_ {
        self.buckets.values().flatten()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn clear(&mut self) {
        self.buckets.clear();
        self.len = 0;
    }

    /// Snapshot of the entities in iteration order, used by the solvers for dense indexing.
    pub fn to_vec(&self) -> Vec<Entity<K>> {
        self.iter().cloned().collect()
    }
}

impl<K: Kind> Default for FiniteCollection<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Kind> Clone for FiniteCollection<K> {
    fn clone(&self) -> Self {
        Self {
            buckets: self.buckets.clone(),
            len: self.len,
        }
    }
}

impl<K: Kind> fmt::Debug for FiniteCollection<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<'a, K: Kind> IntoIterator for &'a FiniteCollection<K> {
    type Item = &'a Entity<K>;
    type IntoIter = Flatten<btree_map::Values<'a, u32, Vec<Entity<K>>>>;

    fn into_iter(self) -> Self::IntoIter {
        self.buckets.values().flatten()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::entity::State;

    #[test]
    fn test_add_find_remove() {
        let mut states = FiniteStates::new();
        states.add(State::new("left"));
        states.add(State::new("right"));
        assert_eq!(states.len(), 2);

        assert_eq!(states.find("left").unwrap().name(), "left");
        assert!(matches!(
            states.find("middle"),
            Err(Error::NotFound { kind: "state", .. })
        ));

        let removed = states.remove(&State::new("left")).unwrap();
        assert_eq!(removed.name(), "left");
        assert_eq!(states.len(), 1);
        assert!(matches!(
            states.remove(&State::new("left")),
            Err(Error::NotFound { .. })
        ));
    }

    #[test]
    fn test_duplicate_add_is_idempotent() {
        let mut states = FiniteStates::from_names(["s0", "s1"]);
        states.add(State::new("s0"));
        assert_eq!(states.len(), 2);
    }

    #[test]
    fn test_hash_collisions_are_kept_apart() {
        // "Aa" and "BB" share a hash under the 31-multiplier recurrence.
        let mut states = FiniteStates::new();
        states.add(State::new("Aa"));
        states.add(State::new("BB"));
        states.add(State::new("Aa"));
        assert_eq!(states.len(), 2);
        assert_eq!(states.find("Aa").unwrap().name(), "Aa");
        assert_eq!(states.find("BB").unwrap().name(), "BB");
        assert_eq!(
            states.resolve(&State::new("BB").id()).unwrap().name(),
            "BB"
        );

        states.remove(&State::new("Aa")).unwrap();
        assert!(!states.contains(&State::new("Aa")));
        assert!(states.contains(&State::new("BB")));
        assert_eq!(states.len(), 1);
    }

    #[test]
    fn test_set_replaces_contents() {
        let mut states = FiniteStates::from_names(["x"]);
        states.set(vec![State::new("p"), State::new("q"), State::new("r")]);
        assert_eq!(states.len(), 3);
        assert!(!states.contains(&State::new("x")));
    }

    #[test]
    fn test_positional_get() {
        let states = FiniteStates::from_names(["a", "b", "c"]);
        let names: Vec<_> = (0..3)
            .map(|i| states.get(i).unwrap().name().to_string())
            .collect();
        let iterated: Vec<_> = states.iter().map(|s| s.name().to_string()).collect();
        assert_eq!(names, iterated);
        assert!(matches!(
            states.get(3),
            Err(Error::IndexOutOfRange { index: 3, len: 3 })
        ));
    }

    #[test]
    fn test_iteration_ignores_insertion_order() {
        let forward = FiniteStates::from_names(["a", "b", "c"]);
        let backward = FiniteStates::from_names(["c", "b", "a"]);
        assert_eq!(forward.to_vec(), backward.to_vec());
    }
}
