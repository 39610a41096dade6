//! Sparse lookup tables with wildcard keys.
//!
//! A table maps a tuple of keys to a value. Each position of the tuple is either a
//! concrete entity or [`Slot::Any`]. Lookups try every way of replacing the given keys by
//! wildcards, most specific first, and return the first stored value. The order is:
//! fewer wildcards first; among patterns with the same number of wildcards, wildcarding
//! an earlier key position is preferred (bit `i` of the mask wildcards position `i`).

use std::collections::HashMap;
use std::hash::Hash;

use crate::core::entity::{Entity, Id, Kind};

/// One key position of a table entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot<T> {
    Is(T),
    Any,
}

impl<K: Kind> Slot<Id<K>> {
    /// A concrete key for `Some`, the wildcard for `None`.
    pub fn from_option(entity: Option<&Entity<K>>) -> Self {
        match entity {
            Some(entity) => Slot::Is(entity.id()),
            None => Slot::Any,
        }
    }

    pub fn of(entity: &Entity<K>) -> Self {
        Slot::Is(entity.id())
    }
}

impl<T: Clone> Slot<T> {
    fn masked(&self, wildcard: bool) -> Self {
        if wildcard {
            Slot::Any
        } else {
            self.clone()
        }
    }
}

/// A tuple of slots that knows how to substitute wildcards position by position.
pub trait Pattern: Clone + Eq + Hash {
    /// Masks in resolution order, most specific first.
    const RESOLUTION_ORDER: &'static [u8];

    /// Replaces every position whose bit is set in `mask` with [`Slot::Any`].
    fn masked(&self, mask: u8) -> Self;
}

impl<A: Clone + Eq + Hash, B: Clone + Eq + Hash> Pattern for (Slot<A>, Slot<B>) {
    const RESOLUTION_ORDER: &'static [u8] = &[0b00, 0b01, 0b10, 0b11];

    fn masked(&self, mask: u8) -> Self {
        (self.0.masked(mask & 1 != 0), self.1.masked(mask & 2 != 0))
    }
}

impl<A, B, C> Pattern for (Slot<A>, Slot<B>, Slot<C>)
where
    A: Clone + Eq + Hash,
    B: Clone + Eq + Hash,
    C: Clone + Eq + Hash,
{
    const RESOLUTION_ORDER: &'static [u8] = &[
        0b000, 0b001, 0b010, 0b100, 0b011, 0b101, 0b110, 0b111,
    ];

    fn masked(&self, mask: u8) -> Self {
        (
            self.0.masked(mask & 1 != 0),
            self.1.masked(mask & 2 != 0),
            self.2.masked(mask & 4 != 0),
        )
    }
}

impl<A, B, C, D> Pattern for (Slot<A>, Slot<B>, Slot<C>, Slot<D>)
where
    A: Clone + Eq + Hash,
    B: Clone + Eq + Hash,
    C: Clone + Eq + Hash,
    D: Clone + Eq + Hash,
{
    const RESOLUTION_ORDER: &'static [u8] = &[
        0b0000, 0b0001, 0b0010, 0b0100, 0b1000, 0b0011, 0b0101, 0b0110, 0b1001, 0b1010, 0b1100,
        0b0111, 0b1011, 0b1101, 0b1110, 0b1111,
    ];

    fn masked(&self, mask: u8) -> Self {
        (
            self.0.masked(mask & 1 != 0),
            self.1.masked(mask & 2 != 0),
            self.2.masked(mask & 4 != 0),
            self.3.masked(mask & 8 != 0),
        )
    }
}

/// Sparse table from patterns to values.
#[derive(Debug, Clone)]
pub struct WildcardTable<P: Pattern> {
    entries: HashMap<P, f64>,
}

impl<P: Pattern> WildcardTable<P> {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Stores a value for an exact pattern (wildcards included), replacing any previous one.
    pub fn insert(&mut self, pattern: P, value: f64) {
        self.entries.insert(pattern, value);
    }

    /// Resolves a fully specified key, falling back through the wildcard patterns.
    pub fn resolve(&self, key: P) -> Option<f64> {
        P::RESOLUTION_ORDER
            .iter()
            .find_map(|&mask| self.entries.get(&key.masked(mask)).copied())
    }

    /// Value stored under exactly this pattern, without any fallback.
    pub fn exact(&self, pattern: &P) -> Option<f64> {
        self.entries.get(pattern).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn values(&self) -> impl Iterator<Item = f64> + '_ {
        self.entries.values().copied()
    }

    /// Stored patterns and their values, in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (&P, f64)> + '_ {
        self.entries.iter().map(|(pattern, &value)| (pattern, value))
    }
}

impl<P: Pattern> Default for WildcardTable<P> {
    fn default() -> Self {
        Self::new()
    }
}
