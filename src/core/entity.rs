//! States, actions and observations.
//!
//! Every entity is an immutable, reference-counted value. A name (or, for factored and
//! joint entities, an ordered tuple of child entities) determines a 32-bit hash that
//! orders entities inside collections. The hash is not unique, so identity is the hash
//! together with the name and children. Cloning an entity only bumps a reference count,
//! so policies can keep the entities they mention after the problem description that
//! produced them is dropped.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use std::sync::Arc;

/// Seed of the polynomial hash used for names and factor tuples.
const HASH_SEED: u32 = 7;
/// Multiplier of the polynomial hash used for names and factor tuples.
const HASH_MULTIPLIER: u32 = 31;

/// Marker distinguishing the three entity families at the type level.
pub trait Kind: 'static + Send + Sync {
    /// Human-readable family name used in error messages.
    const NAME: &'static str;
}

#[derive(Debug, Clone, Copy)]
pub enum StateKind {}

#[derive(Debug, Clone, Copy)]
pub enum ActionKind {}

#[derive(Debug, Clone, Copy)]
pub enum ObservationKind {}

impl Kind for StateKind {
    const NAME: &'static str = "state";
}

impl Kind for ActionKind {
    const NAME: &'static str = "action";
}

impl Kind for ObservationKind {
    const NAME: &'static str = "observation";
}

pub type State = Entity<StateKind>;
pub type Action = Entity<ActionKind>;
pub type Observation = Entity<ObservationKind>;

/// A named or factored entity of kind `K`.
pub struct Entity<K: Kind> {
    inner: Arc<EntityData<K>>,
}

struct EntityData<K: Kind> {
    hash: u32,
    name: String,
    factors: Vec<Entity<K>>,
    _kind: PhantomData<fn() -> K>,
}

impl<K: Kind> Entity<K> {
    /// Creates a named entity.
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let hash = name_hash(&name);
        Self {
            inner: Arc::new(EntityData {
                hash,
                name,
                factors: Vec::new(),
                _kind: PhantomData,
            }),
        }
    }

    /// Creates a composite entity from an ordered tuple of children.
    ///
    /// The composite name is the children's names joined by single spaces and the hash
    /// folds the children's hashes in order.
    pub fn factored(factors: Vec<Entity<K>>) -> Self {
        let hash = factors.iter().fold(HASH_SEED, |hash, factor| {
            hash.wrapping_mul(HASH_MULTIPLIER)
                .wrapping_add(factor.hash_value())
        });
        let name = factors
            .iter()
            .map(|factor| factor.name())
            .collect::<Vec<_>>()
            .join(" ");
        Self {
            inner: Arc::new(EntityData {
                hash,
                name,
                factors,
                _kind: PhantomData,
            }),
        }
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    pub fn hash_value(&self) -> u32 {
        self.inner.hash
    }

    /// The children of a factored entity; empty for a named one.
    pub fn factors(&self) -> &[Entity<K>] {
        &self.inner.factors
    }

    pub fn is_factored(&self) -> bool {
        !self.inner.factors.is_empty()
    }

    /// The identity used as a table key.
    pub fn id(&self) -> Id<K> {
        Id {
            entity: self.clone(),
        }
    }
}

/// Java-style string hash: `h = 31 * h + byte`, seeded with 7.
fn name_hash(name: &str) -> u32 {
    name.bytes().fold(HASH_SEED, |hash, byte| {
        hash.wrapping_mul(HASH_MULTIPLIER)
            .wrapping_add(u32::from(byte))
    })
}

impl<K: Kind> Clone for Entity<K> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<K: Kind> PartialEq for Entity<K> {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
            || (self.inner.hash == other.inner.hash
                && self.inner.name == other.inner.name
                && self.inner.factors == other.inner.factors)
    }
}

impl<K: Kind> Eq for Entity<K> {}

impl<K: Kind> Hash for Entity<K> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u32(self.inner.hash);
    }
}

impl<K: Kind> Ord for Entity<K> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.inner
            .hash
            .cmp(&other.inner.hash)
            .then_with(|| self.inner.name.cmp(&other.inner.name))
            .then_with(|| self.inner.factors.cmp(&other.inner.factors))
    }
}

impl<K: Kind> PartialOrd for Entity<K> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<K: Kind> fmt::Display for Entity<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.inner.name)
    }
}

impl<K: Kind> fmt::Debug for Entity<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({:?})", K::NAME, self.inner.name)
    }
}

/// Table key of an entity. Hashes by the entity's 32-bit hash and compares by full
/// identity, so entities whose hashes collide still get separate table entries.
pub struct Id<K: Kind> {
    entity: Entity<K>,
}

impl<K: Kind> Id<K> {
    pub fn hash_value(&self) -> u32 {
        self.entity.hash_value()
    }

    pub fn entity(&self) -> &Entity<K> {
        &self.entity
    }
}

impl<K: Kind> Clone for Id<K> {
    fn clone(&self) -> Self {
        Self {
            entity: self.entity.clone(),
        }
    }
}

impl<K: Kind> PartialEq for Id<K> {
    fn eq(&self, other: &Self) -> bool {
        self.entity == other.entity
    }
}

impl<K: Kind> Eq for Id<K> {}

impl<K: Kind> Hash for Id<K> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.entity.hash(state);
    }
}

impl<K: Kind> fmt::Debug for Id<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", K::NAME, self.entity.hash_value())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_hash_matches_string_hash_recurrence() {
        // 7 * 31 + 'a' = 314
        assert_eq!(State::new("a").hash_value(), 314);
        assert_eq!(State::new("").hash_value(), 7);
        assert_eq!(
            Action::new("ab").hash_value(),
            (7u32 * 31 + 97) * 31 + 98
        );
    }

    #[test]
    fn test_factored_hash_and_name() {
        let a = State::new("a");
        let c = State::new("c");
        let joint = State::factored(vec![a.clone(), c.clone()]);

        let expected = (7u32 * 31 + a.hash_value()) * 31 + c.hash_value();
        assert_eq!(joint.hash_value(), expected);
        assert_eq!(joint.name(), "a c");
        assert!(joint.is_factored());
        assert_eq!(joint.factors(), &[a, c]);
    }

    #[test]
    fn test_equality_is_by_value() {
        let first = Observation::new("beep");
        let second = Observation::new("beep");
        assert_eq!(first, second);
        assert_eq!(first.id(), second.id());
        assert_ne!(first, Observation::new("boop"));
    }

    #[test]
    fn test_colliding_hashes_keep_distinct_ids() {
        // "Aa" and "BB" share a hash under the 31-multiplier recurrence.
        let aa = State::new("Aa");
        let bb = State::new("BB");
        assert_eq!(aa.hash_value(), bb.hash_value());
        assert_ne!(aa, bb);
        assert_ne!(aa.id(), bb.id());
        assert_eq!(aa.id(), State::new("Aa").id());
    }

    #[test]
    fn test_clone_outlives_original() {
        let kept = {
            let original = Action::new("listen");
            original.clone()
        };
        assert_eq!(kept.to_string(), "listen");
    }
}
