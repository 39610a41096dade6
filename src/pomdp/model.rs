//! Dense POMDP model and the exact per-action backup.
//!
//! States, actions and observations are indexed in collection order. Alpha vectors are
//! stored densely over that state order while solving and converted back to sparse
//! [`AlphaVector`]s for the policy.

use std::ops::AddAssign;

use crate::core::{cross_sum, Action, AlphaVector, Observation, State};
use crate::error::{Error, Result};
use crate::pomdp::Pomdp;

/// An alpha vector over dense state indices, tagged with a dense action index.
#[derive(Debug, Clone, PartialEq)]
pub struct DenseAlpha {
    pub action: usize,
    pub values: Vec<f64>,
}

impl DenseAlpha {
    pub fn dot(&self, belief: &[f64]) -> f64 {
        self.values.iter().zip(belief).map(|(v, b)| v * b).sum()
    }
}

impl AddAssign<&DenseAlpha> for DenseAlpha {
    fn add_assign(&mut self, other: &DenseAlpha) {
        for (value, &addend) in self.values.iter_mut().zip(&other.values) {
            *value += addend;
        }
    }
}

#[derive(Debug)]
pub struct PomdpModel {
    pub states: Vec<State>,
    pub actions: Vec<Action>,
    pub observations: Vec<Observation>,
    pub gamma: f64,
    /// T[a][s][s']
    transitions: Vec<Vec<Vec<f64>>>,
    /// O[a][s'][z]
    observation_probs: Vec<Vec<Vec<f64>>>,
    /// Expected immediate reward R[a][s] = Σ_{s'} T(s,a,s') Σ_z O(a,s',z) R(s,a,s',z)
    rewards: Vec<Vec<f64>>,
}

impl PomdpModel {
    /// Resolves every table of `pomdp` into dense arrays.
    ///
    /// Fails with [`Error::IncompatibleProblemShape`] when any of S, A or Z is empty.
    pub fn from_pomdp(pomdp: &Pomdp) -> Result<Self> {
        if pomdp.states.is_empty() || pomdp.actions.is_empty() || pomdp.observations.is_empty() {
            return Err(Error::IncompatibleProblemShape(format!(
                "a POMDP needs states, actions and observations (got {}, {} and {})",
                pomdp.states.len(),
                pomdp.actions.len(),
                pomdp.observations.len()
            )));
        }

        let states = pomdp.states.to_vec();
        let actions = pomdp.actions.to_vec();
        let observations = pomdp.observations.to_vec();

        let transitions: Vec<Vec<Vec<f64>>> = actions
            .iter()
            .map(|a| {
                states
                    .iter()
                    .map(|s| {
                        states
                            .iter()
                            .map(|sp| pomdp.transitions.get(s, a, sp))
                            .collect()
                    })
                    .collect()
            })
            .collect();

        let observation_probs: Vec<Vec<Vec<f64>>> = actions
            .iter()
            .map(|a| {
                states
                    .iter()
                    .map(|sp| {
                        observations
                            .iter()
                            .map(|z| pomdp.observation_transitions.get(a, sp, z))
                            .collect()
                    })
                    .collect()
            })
            .collect();

        let mut rewards = vec![vec![0.0; states.len()]; actions.len()];
        for (ai, a) in actions.iter().enumerate() {
            for (si, s) in states.iter().enumerate() {
                let mut expected = 0.0;
                for (spi, sp) in states.iter().enumerate() {
                    let t = transitions[ai][si][spi];
                    if t == 0.0 {
                        continue;
                    }
                    let mut inner = 0.0;
                    for (zi, z) in observations.iter().enumerate() {
                        let o = observation_probs[ai][spi][zi];
                        if o != 0.0 {
                            inner += o * pomdp.rewards.get(s, a, sp, z);
                        }
                    }
                    expected += t * inner;
                }
                rewards[ai][si] = expected;
            }
        }

        Ok(Self {
            states,
            actions,
            observations,
            gamma: pomdp.horizon.discount_factor(),
            transitions,
            observation_probs,
            rewards,
        })
    }

    pub fn num_states(&self) -> usize {
        self.states.len()
    }

    pub fn num_actions(&self) -> usize {
        self.actions.len()
    }

    pub fn num_observations(&self) -> usize {
        self.observations.len()
    }

    /// Γ_{a,*}: the expected immediate reward of `action` in every state.
    pub fn gamma_a_star(&self, action: usize) -> DenseAlpha {
        DenseAlpha {
            action,
            values: self.rewards[action].clone(),
        }
    }

    /// α'(s) = γ Σ_{s'} T(s,a,s') O(a,s',z) α(s').
    pub fn project(&self, action: usize, observation: usize, alpha: &DenseAlpha) -> DenseAlpha {
        let t = &self.transitions[action];
        let o = &self.observation_probs[action];
        let values = (0..self.num_states())
            .map(|s| {
                let mut value = 0.0;
                for (sp, &alpha_sp) in alpha.values.iter().enumerate() {
                    value += t[s][sp] * o[sp][observation] * alpha_sp;
                }
                self.gamma * value
            })
            .collect();
        DenseAlpha { action, values }
    }

    /// Γ_a = Γ_{a,*} ⊕ Γ_{a,z1} ⊕ ... ⊕ Γ_{a,z|Z|}, every member tagged with `action`.
    ///
    /// An empty `prior` (no steps to go afterwards) leaves Γ_{a,*} alone.
    pub fn backup_action(&self, action: usize, prior: &[DenseAlpha]) -> Vec<DenseAlpha> {
        let mut gamma_a = vec![self.gamma_a_star(action)];
        for observation in 0..self.num_observations() {
            let gamma_a_z: Vec<DenseAlpha> = prior
                .iter()
                .map(|alpha| self.project(action, observation, alpha))
                .collect();
            gamma_a = cross_sum(&gamma_a, &gamma_a_z);
        }
        for alpha in &mut gamma_a {
            alpha.action = action;
        }
        gamma_a
    }

    /// Γ_a for every action, in action order.
    #[cfg(feature = "parallel")]
    pub fn backup_all(&self, prior: &[DenseAlpha]) -> Vec<Vec<DenseAlpha>> {
        use rayon::prelude::*;
        (0..self.num_actions())
            .into_par_iter()
            .map(|a| self.backup_action(a, prior))
            .collect()
    }

    /// Γ_a for every action, in action order.
    #[cfg(not(feature = "parallel"))]
    pub fn backup_all(&self, prior: &[DenseAlpha]) -> Vec<Vec<DenseAlpha>> {
        (0..self.num_actions())
            .map(|a| self.backup_action(a, prior))
            .collect()
    }

    pub fn to_alpha_vector(&self, alpha: &DenseAlpha) -> AlphaVector {
        let mut sparse = AlphaVector::new(self.actions[alpha.action].clone());
        for (state, &value) in self.states.iter().zip(&alpha.values) {
            sparse.set(state.clone(), value);
        }
        sparse
    }
}
