use approx::assert_abs_diff_eq;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::core::{
    Action, FiniteActions, FiniteStates, Horizon, SaRewards, SasRewards, State,
    StateTransitions,
};
use crate::error::Error;
use crate::mdp::{Mdp, MdpSolver, PolicyIteration, ValueIteration};

/// Two states, "stay" keeps the state and pays (1 in s0, `s1_reward` in s1), "move"
/// switches state and pays nothing.
fn two_state_mdp(s1_reward: f64, horizon: Horizon) -> Mdp {
    let states = FiniteStates::from_names(["s0", "s1"]);
    let actions = FiniteActions::from_names(["stay", "move"]);
    let s0 = State::new("s0");
    let s1 = State::new("s1");
    let stay = Action::new("stay");
    let go = Action::new("move");

    let mut t = StateTransitions::new();
    t.set(Some(&s0), Some(&stay), Some(&s0), 1.0);
    t.set(Some(&s1), Some(&stay), Some(&s1), 1.0);
    t.set(Some(&s0), Some(&go), Some(&s1), 1.0);
    t.set(Some(&s1), Some(&go), Some(&s0), 1.0);

    let mut r = SasRewards::new();
    r.set(Some(&s0), Some(&stay), None, 1.0);
    r.set(Some(&s1), Some(&stay), None, s1_reward);

    Mdp::new(states, actions, t, r, horizon)
}

fn random_mdp(rng: &mut ChaCha8Rng, num_states: usize, num_actions: usize, gamma: f64) -> Mdp {
    let states = FiniteStates::from_names((0..num_states).map(|i| format!("s{i}")));
    let actions = FiniteActions::from_names((0..num_actions).map(|i| format!("a{i}")));

    let mut t = StateTransitions::new();
    let mut r = SasRewards::new();
    for s in &states {
        for a in &actions {
            let weights: Vec<f64> = (0..num_states).map(|_| rng.gen_range(0.0..1.0)).collect();
            let total: f64 = weights.iter().sum();
            for (sp, w) in states.iter().zip(weights) {
                t.set(Some(s), Some(a), Some(sp), w / total);
                r.set(Some(s), Some(a), Some(sp), rng.gen_range(-1.0..1.0));
            }
        }
    }
    Mdp::new(states, actions, t, r, Horizon::infinite(gamma))
}

#[test]
fn test_value_iteration_matches_closed_form() {
    // V*(s1) = 2 / (1 - 0.9) = 20, V*(s0) = 0.9 * 20 = 18 by moving.
    let mdp = two_state_mdp(2.0, Horizon::infinite(0.9));
    let solution = ValueIteration::default()
        .with_tolerance(1e-6)
        .solve(&mdp)
        .unwrap();

    assert!(solution.converged);
    assert_abs_diff_eq!(solution.value(&State::new("s1")), 20.0, epsilon = 1e-5);
    assert_abs_diff_eq!(solution.value(&State::new("s0")), 18.0, epsilon = 1e-5);
    assert_eq!(solution.policy.get(0, &State::new("s0")).unwrap().name(), "move");
    assert_eq!(solution.policy.get(0, &State::new("s1")).unwrap().name(), "stay");
}

#[test]
fn test_state_action_rewards() {
    let with_successor = two_state_mdp(2.0, Horizon::infinite(0.9));

    let mut r = SaRewards::new();
    r.set(Some(&State::new("s0")), Some(&Action::new("stay")), 1.0);
    r.set(Some(&State::new("s1")), Some(&Action::new("stay")), 2.0);
    let mdp = Mdp::new(
        with_successor.states.clone(),
        with_successor.actions.clone(),
        with_successor.transitions.clone(),
        r,
        Horizon::infinite(0.9),
    );

    let expected = PolicyIteration::exact().solve(&with_successor).unwrap();
    let solution = PolicyIteration::exact().solve(&mdp).unwrap();
    for state in &mdp.states {
        assert_abs_diff_eq!(solution.value(state), expected.value(state), epsilon = 1e-9);
    }
    assert_eq!(solution.policy.get(0, &State::new("s0")).unwrap().name(), "move");
}

#[test]
fn test_policy_iteration_agrees_with_value_iteration() {
    let mdp = two_state_mdp(2.0, Horizon::infinite(0.9));
    let vi = ValueIteration::default()
        .with_tolerance(1e-6)
        .solve(&mdp)
        .unwrap();
    let pi = PolicyIteration::exact().solve(&mdp).unwrap();
    let mpi = PolicyIteration::modified(3)
        .with_tolerance(1e-6)
        .solve(&mdp)
        .unwrap();

    assert!(pi.converged);
    assert!(mpi.converged);
    assert_abs_diff_eq!(pi.value(&State::new("s1")), 20.0, epsilon = 1e-9);
    assert_abs_diff_eq!(pi.value(&State::new("s0")), 18.0, epsilon = 1e-9);
    for state in &mdp.states {
        let expected = vi.policy.get(0, state).unwrap();
        assert_eq!(pi.policy.get(0, state).unwrap(), expected);
        assert_eq!(mpi.policy.get(0, state).unwrap(), expected);
        assert_abs_diff_eq!(mpi.value(state), pi.value(state), epsilon = 1e-4);
    }
}

#[test]
fn test_finite_horizon_epochs() {
    // With s1 paying 3 and no discounting:
    //   1 step to go:  s0 stays (1), s1 stays (3)
    //   2 steps to go: s0 moves (3), s1 stays (6)
    //   3 steps to go: s0 moves (6), s1 stays (9)
    let mdp = two_state_mdp(3.0, Horizon::finite(3));
    let solution = ValueIteration::default().solve(&mdp).unwrap();
    let s0 = State::new("s0");

    assert_eq!(solution.iterations, 3);
    assert_eq!(solution.policy.get(0, &s0).unwrap().name(), "move");
    assert_eq!(solution.policy.get(1, &s0).unwrap().name(), "move");
    assert_eq!(solution.policy.get(2, &s0).unwrap().name(), "stay");
    assert_abs_diff_eq!(solution.value(&s0), 6.0);
    assert_abs_diff_eq!(solution.value(&State::new("s1")), 9.0);
    assert!(solution.policy.get(3, &s0).is_err());
}

#[test]
fn test_value_iteration_respects_iteration_cap() {
    let mdp = two_state_mdp(2.0, Horizon::infinite(0.99));
    let solution = ValueIteration::default()
        .with_tolerance(1e-9)
        .with_max_iterations(3)
        .solve(&mdp)
        .unwrap();
    assert!(!solution.converged);
    assert_eq!(solution.iterations, 3);
}

#[test]
fn test_policy_iteration_preconditions() {
    let finite = two_state_mdp(2.0, Horizon::finite(4));
    assert!(matches!(
        PolicyIteration::exact().solve(&finite),
        Err(Error::IncompatibleProblemShape(_))
    ));

    let infinite = two_state_mdp(2.0, Horizon::infinite(0.9));
    assert!(matches!(
        PolicyIteration::modified(0).solve(&infinite),
        Err(Error::IncompatibleProblemShape(_))
    ));

    let empty = Mdp::new(
        FiniteStates::new(),
        FiniteActions::new(),
        StateTransitions::new(),
        SasRewards::new(),
        Horizon::infinite(0.9),
    );
    assert!(matches!(
        ValueIteration::default().solve(&empty),
        Err(Error::IncompatibleProblemShape(_))
    ));
}

#[test]
fn test_undiscounted_exact_evaluation_is_singular() {
    let mdp = two_state_mdp(2.0, Horizon::infinite(1.0));
    assert!(matches!(
        PolicyIteration::exact().solve(&mdp),
        Err(Error::NumericFailure(_))
    ));
}

#[test]
fn test_zero_discount_is_myopic() {
    let mdp = two_state_mdp(2.0, Horizon::infinite(0.0));
    let vi = ValueIteration::default().solve(&mdp).unwrap();
    let pi = PolicyIteration::exact().solve(&mdp).unwrap();

    assert!(vi.converged);
    assert_eq!(vi.iterations, 1);
    for solution in [&vi, &pi] {
        assert_abs_diff_eq!(solution.value(&State::new("s0")), 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(solution.value(&State::new("s1")), 2.0, epsilon = 1e-12);
        assert_eq!(solution.policy.get(0, &State::new("s0")).unwrap().name(), "stay");
    }
}

#[test]
fn test_modified_policy_iteration_undiscounted() {
    // Values grow without bound, but the policy settles within a few blocks.
    let mdp = two_state_mdp(2.0, Horizon::infinite(1.0));
    let solution = PolicyIteration::modified(2)
        .with_max_iterations(1_000)
        .solve(&mdp)
        .unwrap();

    assert!(solution.converged);
    assert!(solution.iterations <= 3);
    assert_eq!(solution.policy.get(0, &State::new("s0")).unwrap().name(), "move");
    assert_eq!(solution.policy.get(0, &State::new("s1")).unwrap().name(), "stay");
}

#[test]
fn test_random_problems_agree() {
    let mut rng = ChaCha8Rng::seed_from_u64(17);
    for _ in 0..5 {
        let mdp = random_mdp(&mut rng, 6, 3, 0.9);
        let vi = ValueIteration::default()
            .with_tolerance(1e-9)
            .solve(&mdp)
            .unwrap();
        let pi = PolicyIteration::exact().solve(&mdp).unwrap();
        let mpi = PolicyIteration::modified(4)
            .with_tolerance(1e-9)
            .solve(&mdp)
            .unwrap();

        assert!(vi.converged && pi.converged && mpi.converged);
        for state in &mdp.states {
            assert_abs_diff_eq!(vi.value(state), pi.value(state), epsilon = 1e-6);
            assert_abs_diff_eq!(mpi.value(state), pi.value(state), epsilon = 1e-6);
        }
    }
}
