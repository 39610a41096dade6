use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use decision_dp::core::{FiniteActions, FiniteStates, Horizon, SasRewards, StateTransitions};
use decision_dp::mdp::{Mdp, MdpSolver, PolicyIteration, ValueIteration};

fn random_mdp(num_states: usize, num_actions: usize, horizon: Horizon) -> Mdp {
    let mut rng = ChaCha8Rng::seed_from_u64(42);
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
            }
            r.set(Some(s), Some(a), None, rng.gen_range(-1.0..1.0));
        }
    }
    Mdp::new(states, actions, t, r, horizon)
}

fn bench_value_iteration(c: &mut Criterion) {
    let mut group = c.benchmark_group("mdp_value_iteration");
    for &size in &[10, 50, 100] {
        let infinite = random_mdp(size, 4, Horizon::infinite(0.9));
        group.bench_with_input(BenchmarkId::new("infinite", size), &infinite, |b, mdp| {
            b.iter(|| black_box(ValueIteration::default().solve(mdp).unwrap()));
        });

        let finite = random_mdp(size, 4, Horizon::finite(20));
        group.bench_with_input(BenchmarkId::new("finite_20", size), &finite, |b, mdp| {
            b.iter(|| black_box(ValueIteration::default().solve(mdp).unwrap()));
        });
    }
    group.finish();
}

fn bench_policy_iteration(c: &mut Criterion) {
    let mut group = c.benchmark_group("mdp_policy_iteration");
    for &size in &[10, 50, 100] {
        let mdp = random_mdp(size, 4, Horizon::infinite(0.9));
        group.bench_with_input(BenchmarkId::new("exact", size), &mdp, |b, mdp| {
            b.iter(|| black_box(PolicyIteration::exact().solve(mdp).unwrap()));
        });
        group.bench_with_input(BenchmarkId::new("modified_5", size), &mdp, |b, mdp| {
            b.iter(|| black_box(PolicyIteration::modified(5).solve(mdp).unwrap()));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_value_iteration, bench_policy_iteration);
criterion_main!(benches);
