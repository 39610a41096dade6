//! Fully observable Markov decision processes and their exact solvers.

pub mod bellman;
pub mod policy_iteration;
pub mod value_iteration;

#[cfg(test)]
mod tests;

use std::collections::BTreeMap;

use crate::core::{
    FiniteActions, FiniteStates, Horizon, PolicyMap, SasRewards, State, StateTransitions,
};
use crate::error::Result;

pub use bellman::MarkovDecisionProcess;
pub use policy_iteration::{PolicyIteration, PolicyIterationVariant};
pub use value_iteration::ValueIteration;

/// A finite MDP: states, actions, T(s, a, s'), R(s, a, s') and a horizon.
///
/// Rewards that ignore the successor can be given as an [`SaRewards`](crate::core::SaRewards) table to [`Mdp::new`].
///
/// Every action is available in every state. The solvers treat the description as
/// read-only.
#[derive(Debug, Clone)]
pub struct Mdp {
    pub states: FiniteStates,
    pub actions: FiniteActions,
    pub transitions: StateTransitions,
    pub rewards: SasRewards,
    pub horizon: Horizon,
}

impl Mdp {
    pub fn new(
        states: FiniteStates,
        actions: FiniteActions,
        transitions: StateTransitions,
        rewards: impl Into<SasRewards>,
        horizon: Horizon,
    ) -> Self {
        Self {
            states,
            actions,
            transitions,
            rewards: rewards.into(),
            horizon,
        }
    }
}

/// What an MDP solver hands back.
#[derive(Debug, Clone)]
pub struct MdpSolution {
    pub policy: PolicyMap,
    /// The value of every state at epoch 0 (or the stationary value for infinite horizons).
    pub values: BTreeMap<State, f64>,
    /// Sweeps for value iteration, improvement steps for policy iteration, epochs for
    /// finite horizons.
    pub iterations: usize,
    pub converged: bool,
}

impl MdpSolution {
    /// The value of `state`; 0 for states the solver never saw.
    pub fn value(&self, state: &State) -> f64 {
        self.values.get(state).copied().unwrap_or(0.0)
    }
}

pub trait MdpSolver {
    fn solve(&self, mdp: &Mdp) -> Result<MdpSolution>;
}
