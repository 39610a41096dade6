//! Factored (joint) entity spaces.
//!
//! A factored space keeps one list of entities per factor and materializes their
//! Cartesian product as composite entities. The product is rebuilt by [`FactoredCollection::update`]
//! and is considered stale after any factor edit until `update` runs again.

use crate::core::collection::FiniteCollection;
use crate::core::entity::{ActionKind, Entity, Kind, ObservationKind, StateKind};
use crate::error::{Error, Result};

pub type FiniteFactoredStates = FactoredCollection<StateKind>;
pub type FiniteJointActions = FactoredCollection<ActionKind>;
pub type FiniteJointObservations = FactoredCollection<ObservationKind>;

#[derive(Debug, Clone)]
pub struct FactoredCollection<K: Kind> {
    factors: Vec<Vec<Entity<K>>>,
    joint: FiniteCollection<K>,
    stale: bool,
}

impl<K: Kind> FactoredCollection<K> {
    /// Creates `num_factors` empty factors (at least one).
    pub fn new(num_factors: usize) -> Self {
        Self {
            factors: vec![Vec::new(); num_factors.max(1)],
            joint: FiniteCollection::new(),
            stale: true,
        }
    }

    /// Appends a whole new factor.
    pub fn add_factor(&mut self, entities: Vec<Entity<K>>) -> Result<()> {
        if entities.is_empty() {
            return Err(Error::InvalidDefinition(format!(
                "a {} factor must contain at least one entity",
                K::NAME
            )));
        }
        self.factors.push(entities);
        self.stale = true;
        Ok(())
    }

    pub fn add(&mut self, factor: usize, entity: Entity<K>) -> Result<()> {
        self.factor_mut(factor)?.push(entity);
        self.stale = true;
        Ok(())
    }

    /// Removes an entity from one factor and returns it.
    pub fn remove(&mut self, factor: usize, entity: &Entity<K>) -> Result<Entity<K>> {
        let list = self.factor_mut(factor)?;
        let position = list
            .iter()
            .position(|candidate| candidate == entity)
            .ok_or_else(|| Error::NotFound {
                kind: K::NAME,
                name: entity.to_string(),
            })?;
        let removed = list.remove(position);
        self.stale = true;
        Ok(removed)
    }

    /// Replaces one factor's entities.
    pub fn set(&mut self, factor: usize, entities: Vec<Entity<K>>) -> Result<()> {
        if entities.is_empty() {
            return Err(Error::InvalidDefinition(format!(
                "a {} factor must contain at least one entity",
                K::NAME
            )));
        }
        *self.factor_mut(factor)? = entities;
        self.stale = true;
        Ok(())
    }

    pub fn get(&self, factor: usize, index: usize) -> Result<&Entity<K>> {
        let list = self.factors.get(factor).ok_or(Error::IndexOutOfRange {
            index: factor,
            len: self.factors.len(),
        })?;
        list.get(index).ok_or(Error::IndexOutOfRange {
            index,
            len: list.len(),
        })
    }

    pub fn num_factors(&self) -> usize {
        self.factors.len()
    }

    pub fn factor(&self, factor: usize) -> Result<&[Entity<K>]> {
        self.factors
            .get(factor)
            .map(Vec::as_slice)
            .ok_or(Error::IndexOutOfRange {
                index: factor,
                len: self.factors.len(),
            })
    }

    /// Rebuilds the joint collection from the current factors.
    pub fn update(&mut self) -> Result<()> {
        if let Some(empty) = self.factors.iter().position(Vec::is_empty) {
            return Err(Error::InvalidDefinition(format!(
                "{} factor {} is empty",
                K::NAME,
                empty
            )));
        }

        let mut joint = FiniteCollection::new();
        let mut partial = Vec::with_capacity(self.factors.len());
        self.expand(0, &mut partial, &mut joint);

        log::debug!(
            "materialized {} joint {}s from {} factors",
            joint.len(),
            K::NAME,
            self.factors.len()
        );

        self.joint = joint;
        self.stale = false;
        Ok(())
    }

    /// The materialized product. Fails if a factor changed since the last `update`.
    pub fn joint(&self) -> Result<&FiniteCollection<K>> {
        if self.stale {
            return Err(Error::InvalidDefinition(format!(
                "joint {}s are stale; call update() after editing factors",
                K::NAME
            )));
        }
        Ok(&self.joint)
    }

    /// Finds a joint entity by its space-joined name.
    pub fn find(&self, name: &str) -> Result<&Entity<K>> {
        self.joint()?.find(name)
    }

    fn factor_mut(&mut self, factor: usize) -> Result<&mut Vec<Entity<K>>> {
        let len = self.factors.len();
        self.factors
            .get_mut(factor)
            .ok_or(Error::IndexOutOfRange { index: factor, len })
    }

    fn expand(
        &self,
        depth: usize,
        partial: &mut Vec<Entity<K>>,
        joint: &mut FiniteCollection<K>,
    ) {
        for entity in &self.factors[depth] {
            partial.push(entity.clone());
            if depth + 1 == self.factors.len() {
                joint.add(Entity::factored(partial.clone()));
            } else {
                self.expand(depth + 1, partial, joint);
            }
            partial.pop();
        }
    }
}
