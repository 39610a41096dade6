use std::collections::BTreeMap;
use std::ops::AddAssign;

use crate::core::belief::BeliefState;
use crate::core::entity::{Action, State};

/// One linear piece of a POMDP value function: a coefficient per state plus the action
/// whose value it represents. Unset states contribute 0.
#[derive(Debug, Clone, PartialEq)]
pub struct AlphaVector {
    action: Action,
    values: BTreeMap<State, f64>,
}

impl AlphaVector {
    pub fn new(action: Action) -> Self {
        Self {
            action,
            values: BTreeMap::new(),
        }
    }

    pub fn action(&self) -> &Action {
        &self.action
    }

    pub fn set_action(&mut self, action: Action) {
        self.action = action;
    }

    pub fn set(&mut self, state: State, value: f64) {
        self.values.insert(state, value);
    }

    pub fn get(&self, state: &State) -> f64 {
        self.values.get(state).copied().unwrap_or(0.0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&State, f64)> + '_ {
        self.values.iter().map(|(state, &value)| (state, value))
    }

    /// Σ_s b(s)·α(s).
    pub fn dot(&self, belief: &BeliefState) -> f64 {
        self.values
            .iter()
            .map(|(state, value)| belief.get(state) * value)
            .sum()
    }
}

impl AddAssign<&AlphaVector> for AlphaVector {
    /// Adds coefficients state-wise over the union of both key sets. The action is kept.
    fn add_assign(&mut self, other: &AlphaVector) {
        for (state, value) in &other.values {
            *self.values.entry(state.clone()).or_insert(0.0) += value;
        }
    }
}

/// The Minkowski sum `{u + v : u ∈ left, v ∈ right}`, `left`-major.
///
/// An empty operand acts as the identity, so folding observation sets into an empty
/// accumulator starts the accumulator with the first set.
pub fn cross_sum<V>(left: &[V], right: &[V]) -> Vec<V>
where
    V: Clone + for<'a> AddAssign<&'a V>,
{
    if left.is_empty() {
        return right.to_vec();
    }
    if right.is_empty() {
        return left.to_vec();
    }

    let mut sums = Vec::with_capacity(left.len() * right.len());
    for u in left {
        for v in right {
            let mut sum = u.clone();
            sum += v;
            sums.push(sum);
        }
    }
    sums
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn alpha(action: &str, values: &[(&str, f64)]) -> AlphaVector {
        let mut alpha = AlphaVector::new(Action::new(action));
        for &(state, value) in values {
            alpha.set(State::new(state), value);
        }
        alpha
    }

    #[test]
    fn test_dot_with_sparse_belief() {
        let a = alpha("listen", &[("left", 10.0), ("right", -5.0)]);
        let belief: BeliefState = [(State::new("left"), 0.25), (State::new("right"), 0.75)]
            .into_iter()
            .collect();
        assert_abs_diff_eq!(a.dot(&belief), 2.5 - 3.75);
        assert_eq!(a.get(&State::new("middle")), 0.0);
    }

    #[test]
    fn test_add_assign_uses_key_union() {
        let mut a = alpha("x", &[("s0", 1.0)]);
        a += &alpha("y", &[("s0", 2.0), ("s1", 3.0)]);
        assert_eq!(a.action().name(), "x");
        assert_eq!(a.get(&State::new("s0")), 3.0);
        assert_eq!(a.get(&State::new("s1")), 3.0);
    }

    #[test]
    fn test_cross_sum_cardinality_and_identity() {
        let left = vec![alpha("a", &[("s", 1.0)]), alpha("a", &[("s", 2.0)])];
        let right = vec![
            alpha("a", &[("s", 10.0)]),
            alpha("a", &[("s", 20.0)]),
            alpha("a", &[("s", 30.0)]),
        ];
        let sums = cross_sum(&left, &right);
        assert_eq!(sums.len(), 6);
        let s = State::new("s");
        let values: Vec<f64> = sums.iter().map(|v| v.get(&s)).collect();
        assert_eq!(values, vec![11.0, 21.0, 31.0, 12.0, 22.0, 32.0]);

        assert_eq!(cross_sum(&[], &right).len(), 3);
        assert_eq!(cross_sum(&left, &[]).len(), 2);
    }
}
