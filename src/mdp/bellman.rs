//! A dense, index-based view of an [`Mdp`] and the Bellman backup over it.
//!
//! The wildcard tables are resolved once per (s, a, s') triple when the view is built, so
//! the sweeps only touch flat vectors.

use std::collections::BTreeMap;

use crate::core::{Action, PolicyMap, State};
use crate::error::{Error, Result};
use crate::mdp::Mdp;

/// A Markov decision process in discrete form.
#[derive(Debug)]
pub struct MarkovDecisionProcess {
    /// States in collection order; state `i` of the dense model is `states[i]`
    pub states: Vec<State>,
    /// Actions in collection order (all available in every state)
    pub actions: Vec<Action>,
    /// Discount factor (0 <= gamma <= 1)
    pub gamma: f64,
    /// For each (state, action), a list of (next_state, probability, reward) with
    /// probability > 0.
    pub transitions: Vec<Vec<Vec<(usize, f64, f64)>>>,
}

impl MarkovDecisionProcess {
    /// Resolves every transition and reward of `mdp` into dense form.
    ///
    /// Fails with [`Error::IncompatibleProblemShape`] when the MDP has no states or no actions.
    pub fn from_mdp(mdp: &Mdp) -> Result<Self> {
        if mdp.states.is_empty() || mdp.actions.is_empty() {
            return Err(Error::IncompatibleProblemShape(format!(
                "an MDP needs at least one state and one action (got {} and {})",
                mdp.states.len(),
                mdp.actions.len()
            )));
        }

        let states = mdp.states.to_vec();
        let actions = mdp.actions.to_vec();
        let mut transitions = Vec::with_capacity(states.len());
        for s in &states {
            let mut per_action = Vec::with_capacity(actions.len());
            for a in &actions {
                let mut outcomes = Vec::new();
                for (next, sp) in states.iter().enumerate() {
                    let prob = mdp.transitions.get(s, a, sp);
                    if prob > 0.0 {
                        outcomes.push((next, prob, mdp.rewards.get(s, a, sp)));
                    }
                }
                let prob_sum: f64 = outcomes.iter().map(|(_, p, _)| p).sum();
                if (prob_sum - 1.0).abs() > 1e-8 {
                    log::warn!(
                        "transition probabilities of state '{}' under action '{}' sum to {}",
                        s,
                        a,
                        prob_sum
                    );
                }
                per_action.push(outcomes);
            }
            transitions.push(per_action);
        }

        Ok(Self {
            states,
            actions,
            gamma: mdp.horizon.discount_factor(),
            transitions,
        })
    }

    pub fn num_states(&self) -> usize {
        self.states.len()
    }

    pub fn num_actions(&self) -> usize {
        self.actions.len()
    }

    /// Q(s, a) = sum_{s'} P(s'|s,a) [ R(s,a,s') + gamma * V(s') ].
    pub fn compute_q_value(&self, s: usize, a: usize, values: &[f64]) -> f64 {
        let mut q = 0.0;
        for &(s_next, prob, reward) in &self.transitions[s][a] {
            q += prob * (reward + self.gamma * values[s_next]);
        }
        q
    }

    /// max_a Q(s, a) and the first action attaining it.
    pub fn bellman_update(&self, s: usize, values: &[f64]) -> (f64, usize) {
        let mut best_a = 0;
        let mut best_val = f64::NEG_INFINITY;
        for a in 0..self.num_actions() {
            let q_sa = self.compute_q_value(s, a, values);
            if q_sa > best_val {
                best_val = q_sa;
                best_a = a;
            }
        }
        (best_val, best_a)
    }

    /// Records `choice[s]` as the action of every state at `epoch`.
    pub(crate) fn record_policy(
        &self,
        policy: &mut PolicyMap,
        epoch: usize,
        choice: &[usize],
    ) -> Result<()> {
        for (s, &a) in choice.iter().enumerate() {
            policy.set(epoch, self.states[s].clone(), self.actions[a].clone())?;
        }
        Ok(())
    }

    pub(crate) fn value_map(&self, values: &[f64]) -> BTreeMap<State, f64> {
        self.states.iter().cloned().zip(values.iter().copied()).collect()
    }
}
