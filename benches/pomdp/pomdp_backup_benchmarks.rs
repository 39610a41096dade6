use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use decision_dp::core::{
    Action, FiniteActions, FiniteObservations, FiniteStates, Horizon, Observation,
    ObservationTransitions, SasoRewards, State, StateTransitions,
};
use decision_dp::pomdp::model::PomdpModel;
use decision_dp::pomdp::{Pomdp, PomdpSolver, PomdpValueIteration};

fn tiger(horizon: Horizon) -> Pomdp {
    let states = FiniteStates::from_names(["tiger-left", "tiger-right"]);
    let actions = FiniteActions::from_names(["listen", "open-left", "open-right"]);
    let observations = FiniteObservations::from_names(["growl-left", "growl-right"]);

    let left = State::new("tiger-left");
    let right = State::new("tiger-right");
    let listen = Action::new("listen");
    let open_left = Action::new("open-left");
    let open_right = Action::new("open-right");
    let growl_left = Observation::new("growl-left");
    let growl_right = Observation::new("growl-right");

    let mut t = StateTransitions::new();
    t.set(None, None, None, 0.5);
    t.set(Some(&left), Some(&listen), Some(&left), 1.0);
    t.set(Some(&left), Some(&listen), Some(&right), 0.0);
    t.set(Some(&right), Some(&listen), Some(&right), 1.0);
    t.set(Some(&right), Some(&listen), Some(&left), 0.0);

    let mut o = ObservationTransitions::new();
    o.set(None, None, None, 0.5);
    o.set(Some(&listen), Some(&left), Some(&growl_left), 0.85);
    o.set(Some(&listen), Some(&left), Some(&growl_right), 0.15);
    o.set(Some(&listen), Some(&right), Some(&growl_right), 0.85);
    o.set(Some(&listen), Some(&right), Some(&growl_left), 0.15);

    let mut r = SasoRewards::new();
    r.set(None, Some(&listen), None, None, -1.0);
    r.set(Some(&left), Some(&open_left), None, None, -100.0);
    r.set(Some(&right), Some(&open_left), None, None, 10.0);
    r.set(Some(&right), Some(&open_right), None, None, -100.0);
    r.set(Some(&left), Some(&open_right), None, None, 10.0);

    Pomdp::new(states, actions, observations, t, o, r, horizon)
}

fn bench_backup_action(c: &mut Criterion) {
    let pomdp = tiger(Horizon::infinite(0.95));
    let model = PomdpModel::from_pomdp(&pomdp).unwrap();
    let prior = model.backup_all(&[]).into_iter().flatten().collect::<Vec<_>>();

    c.bench_function("pomdp_backup_action_listen", |b| {
        b.iter(|| black_box(model.backup_action(0, &prior)));
    });
}

fn bench_value_iteration(c: &mut Criterion) {
    let mut group = c.benchmark_group("pomdp_value_iteration");
    group.sample_size(10);
    for &epochs in &[2, 3, 4] {
        let pomdp = tiger(Horizon::finite(epochs));
        group.bench_with_input(BenchmarkId::new("tiger", epochs), &pomdp, |b, pomdp| {
            b.iter(|| black_box(PomdpValueIteration::default().solve(pomdp).unwrap()));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_backup_action, bench_value_iteration);
criterion_main!(benches);
