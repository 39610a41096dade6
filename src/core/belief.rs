use std::collections::BTreeMap;

use approx::abs_diff_eq;

use crate::core::collection::FiniteStates;
use crate::core::entity::State;

/// A probability distribution over states. States without an entry have probability 0.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BeliefState {
    probabilities: BTreeMap<State, f64>,
}

impl BeliefState {
    pub fn new() -> Self {
        Self::default()
    }

    /// The uniform belief over `states`.
    pub fn uniform(states: &FiniteStates) -> Self {
        let mut belief = Self::new();
        if states.is_empty() {
            return belief;
        }
        let p = 1.0 / states.len() as f64;
        for state in states {
            belief.set(state.clone(), p);
        }
        belief
    }

    /// Sets b(s), clamped to [0, 1].
    pub fn set(&mut self, state: State, probability: f64) {
        self.probabilities
            .insert(state, probability.clamp(0.0, 1.0));
    }

    pub fn get(&self, state: &State) -> f64 {
        self.probabilities.get(state).copied().unwrap_or(0.0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&State, f64)> + '_ {
        self.probabilities.iter().map(|(state, &p)| (state, p))
    }

    pub fn len(&self) -> usize {
        self.probabilities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.probabilities.is_empty()
    }

    pub fn total(&self) -> f64 {
        self.probabilities.values().sum()
    }

    /// True when every entry is non-negative and the entries sum to one.
    pub fn is_distribution(&self) -> bool {
        self.probabilities.values().all(|&p| p >= 0.0)
            && abs_diff_eq!(self.total(), 1.0, epsilon = 1e-9)
    }
}

impl FromIterator<(State, f64)> for BeliefState {
    fn from_iter<I: IntoIterator<Item = (State, f64)>>(iter: I) -> Self {
        let mut belief = Self::new();
        for (state, p) in iter {
            belief.set(state, p);
        }
        belief
    }
}
