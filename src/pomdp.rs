//! Partially observable MDPs solved exactly over alpha-vector value functions.

pub mod execution;
pub mod model;
pub mod prune;
pub mod value_iteration;


use crate::core::{
    FiniteActions, FiniteObservations, FiniteStates, Horizon, ObservationTransitions,
    PolicyAlphaVectors, SasoRewards, StateTransitions,
};
use crate::error::Result;

pub use execution::{belief_update, extract_policy_tree};
pub use prune::prune_dominated;
pub use value_iteration::{compute_num_iterations, PomdpValueIteration};

/// A finite POMDP: states, actions, observations, T(s, a, s'), O(a, s', z),
/// R(s, a, s', z) and a horizon.
#[derive(Debug, Clone)]
pub struct Pomdp {
    pub states: FiniteStates,
    pub actions: FiniteActions,
    pub observations: FiniteObservations,
    pub transitions: StateTransitions,
    pub observation_transitions: ObservationTransitions,
    pub rewards: SasoRewards,
    pub horizon: Horizon,
}

impl Pomdp {
    pub fn new(
        states: FiniteStates,
        actions: FiniteActions,
        observations: FiniteObservations,
        transitions: StateTransitions,
        observation_transitions: ObservationTransitions,
        rewards: SasoRewards,
        horizon: Horizon,
    ) -> Self {
        Self {
            states,
            actions,
            observations,
            transitions,
            observation_transitions,
            rewards,
            horizon,
        }
    }
}

pub trait PomdpSolver {
    fn solve(&self, pomdp: &Pomdp) -> Result<PolicyAlphaVectors>;
}
