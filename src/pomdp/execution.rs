//! Belief tracking and conversion of alpha-vector policies into policy trees.

use crate::core::{Action, BeliefState, Observation, PolicyAlphaVectors, PolicyTree};
use crate::error::{Error, Result};
use crate::pomdp::Pomdp;

/// Bayes update of `belief` after taking `action` and observing `observation`:
///
/// b'(s') ∝ O(a, s', z) Σ_s T(s, a, s') b(s)
///
/// Fails with [`Error::NumericFailure`] when the observation has zero probability under
/// `belief`.
pub fn belief_update(
    pomdp: &Pomdp,
    belief: &BeliefState,
    action: &Action,
    observation: &Observation,
) -> Result<BeliefState> {
    let mut updated = Vec::with_capacity(pomdp.states.len());
    let mut normalizer = 0.0;
    for next_state in &pomdp.states {
        let o = pomdp
            .observation_transitions
            .get(action, next_state, observation);
        if o == 0.0 {
            continue;
        }
        let reach: f64 = belief
            .iter()
            .map(|(state, p)| p * pomdp.transitions.get(state, action, next_state))
            .sum();
        let mass = o * reach;
        if mass > 0.0 {
            normalizer += mass;
            updated.push((next_state.clone(), mass));
        }
    }

    if normalizer <= 0.0 {
        return Err(Error::NumericFailure(format!(
            "observation '{observation}' is impossible after action '{action}'"
        )));
    }
    Ok(updated
        .into_iter()
        .map(|(state, mass)| (state, mass / normalizer))
        .collect())
}

/// Unrolls a finite-horizon alpha-vector policy from `initial` into a policy tree.
///
/// Each node takes the best action of its epoch's Γ at the belief reached by its
/// observation history. Histories containing an impossible observation keep the belief
/// of their parent.
pub fn extract_policy_tree(
    pomdp: &Pomdp,
    policy: &PolicyAlphaVectors,
    initial: &BeliefState,
) -> Result<PolicyTree> {
    let horizon = policy.horizon();
    if !horizon.is_finite() {
        return Err(Error::IncompatibleProblemShape(
            "policy trees need a finite horizon".into(),
        ));
    }

    let mut tree = PolicyTree::new(&pomdp.observations, horizon.epochs())?;
    let mut history = Vec::with_capacity(horizon.epochs());
    unroll(pomdp, policy, &mut tree, &mut history, initial)?;
    log::debug!("extracted a policy tree with {} nodes", tree.len());
    Ok(tree)
}

fn unroll(
    pomdp: &Pomdp,
    policy: &PolicyAlphaVectors,
    tree: &mut PolicyTree,
    history: &mut Vec<Observation>,
    belief: &BeliefState,
) -> Result<()> {
    let epoch = history.len();
    let action = policy.get(epoch, belief)?.clone();
    tree.set(history, action.clone())?;
    if epoch + 1 >= tree.horizon() {
        return Ok(());
    }

    for observation in &pomdp.observations {
        let next = match belief_update(pomdp, belief, &action, observation) {
            Ok(next) => next,
            Err(Error::NumericFailure(_)) => belief.clone(),
            Err(err) => return Err(err),
        };
        history.push(observation.clone());
        unroll(pomdp, policy, tree, history, &next)?;
        history.pop();
    }
    Ok(())
}
