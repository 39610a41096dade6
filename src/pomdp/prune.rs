//! Removal of dominated alpha vectors.
//!
//! A vector survives when some belief exists at which it beats every other survivor by
//! more than the tolerance. Pointwise-dominated vectors and duplicates are dropped first,
//! then each remaining candidate is checked with the witness LP
//!
//! maximize δ
//! subject to (α' − α)·b + δ ≤ 0   for every other survivor α'
//!            Σ b = 1, b ≥ 0
//!
//! and kept when the optimum δ exceeds the tolerance.

use crate::core::{AlphaVector, FiniteStates};
use crate::error::{Error, Result};
use crate::math::simplex::{self, LinearProgram, LpStatus, SimplexConfig};
use crate::pomdp::model::DenseAlpha;

/// Default margin a witness belief must give a vector over its competitors.
pub const DEFAULT_PRUNE_TOLERANCE: f64 = 1e-9;

/// Prunes `gamma` over the state order of `states` with default settings.
///
/// Order among survivors is preserved and the first of any duplicates is the one kept.
pub fn prune_dominated(states: &FiniteStates, gamma: &[AlphaVector]) -> Result<Vec<AlphaVector>> {
    let dense: Vec<Vec<f64>> = gamma
        .iter()
        .map(|alpha| states.iter().map(|s| alpha.get(s)).collect())
        .collect();
    let keep = surviving_indices(
        &dense,
        states.len(),
        DEFAULT_PRUNE_TOLERANCE,
        &SimplexConfig::default(),
    )?;
    Ok(keep.into_iter().map(|i| gamma[i].clone()).collect())
}

pub(crate) fn prune_dense(
    gamma: Vec<DenseAlpha>,
    num_states: usize,
    tolerance: f64,
    lp: &SimplexConfig<f64>,
) -> Result<Vec<DenseAlpha>> {
    let values: Vec<&[f64]> = gamma.iter().map(|alpha| alpha.values.as_slice()).collect();
    let keep = surviving_indices(&values, num_states, tolerance, lp)?;
    let mut keep = keep.into_iter().peekable();
    Ok(gamma
        .into_iter()
        .enumerate()
        .filter_map(|(i, alpha)| {
            if keep.peek() == Some(&i) {
                keep.next();
                Some(alpha)
            } else {
                None
            }
        })
        .collect())
}

/// Indices, in ascending order, of the vectors that survive pruning.
fn surviving_indices<V: AsRef<[f64]>>(
    vectors: &[V],
    num_states: usize,
    tolerance: f64,
    lp: &SimplexConfig<f64>,
) -> Result<Vec<usize>> {
    if vectors.is_empty() {
        return Ok(Vec::new());
    }
    if num_states == 0 {
        return Err(Error::NumericFailure(
            "cannot prune alpha vectors over an empty state space".into(),
        ));
    }

    let mut survivors = pointwise_survivors(vectors);
    if survivors.len() <= 1 {
        return Ok(survivors);
    }

    let mut i = 0;
    while i < survivors.len() {
        let candidate = vectors[survivors[i]].as_ref();
        let competitors: Vec<&[f64]> = survivors
            .iter()
            .enumerate()
            .filter(|&(j, _)| j != i)
            .map(|(_, &k)| vectors[k].as_ref())
            .collect();

        if has_witness(candidate, &competitors, tolerance, lp) {
            i += 1;
        } else {
            survivors.remove(i);
        }
    }
    Ok(survivors)
}

/// Drops every vector that is weakly dominated pointwise by an earlier survivor or
/// by any later vector. Exact duplicates keep their first occurrence.
fn pointwise_survivors<V: AsRef<[f64]>>(vectors: &[V]) -> Vec<usize> {
    let mut survivors: Vec<usize> = Vec::with_capacity(vectors.len());
    for (i, vector) in vectors.iter().enumerate() {
        let alpha = vector.as_ref();
        if survivors
            .iter()
            .any(|&k| weakly_dominates(vectors[k].as_ref(), alpha))
        {
            continue;
        }
        survivors.retain(|&k| !weakly_dominates(alpha, vectors[k].as_ref()));
        survivors.push(i);
    }
    survivors.sort_unstable();
    survivors
}

fn weakly_dominates(a: &[f64], b: &[f64]) -> bool {
    a.iter().zip(b).all(|(x, y)| x >= y)
}

fn has_witness(
    candidate: &[f64],
    competitors: &[&[f64]],
    tolerance: f64,
    config: &SimplexConfig<f64>,
) -> bool {
    if competitors.is_empty() {
        return true;
    }

    let n = candidate.len();
    // Variables b_0 .. b_{n-1}, then δ.
    let mut objective = vec![0.0; n + 1];
    objective[n] = 1.0;

    let mut constraints = Vec::with_capacity(competitors.len() + 2);
    let mut rhs = Vec::with_capacity(competitors.len() + 2);
    for other in competitors {
        let mut row: Vec<f64> = other.iter().zip(candidate).map(|(o, c)| o - c).collect();
        row.push(1.0);
        constraints.push(row);
        rhs.push(0.0);
    }
    let mut total = vec![1.0; n + 1];
    total[n] = 0.0;
    constraints.push(total.clone());
    rhs.push(1.0);
    constraints.push(total.iter().map(|x| -x).collect());
    rhs.push(-1.0);

    let program = LinearProgram {
        objective,
        constraints,
        rhs,
    };
    let solution = simplex::maximize(&program, config);
    match solution.status {
        LpStatus::Optimal => solution.value > tolerance,
        LpStatus::Unbounded => true,
        LpStatus::Infeasible => false,
        LpStatus::MaxIterationsReached => {
            log::warn!(
                "witness LP hit {} iterations against {} competitors; keeping the vector",
                config.max_iterations,
                competitors.len()
            );
            true
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Action, State};

    fn alpha(action: &str, values: &[(&str, f64)]) -> AlphaVector {
        let mut alpha = AlphaVector::new(Action::new(action));
        for &(state, value) in values {
            alpha.set(State::new(state), value);
        }
        alpha
    }

    fn two_states() -> FiniteStates {
        FiniteStates::from_names(["left", "right"])
    }

    #[test]
    fn test_pointwise_dominated_and_duplicates() {
        let vectors = vec![
            vec![1.0, 1.0],
            vec![0.0, 0.0],
            vec![2.0, -5.0],
            vec![1.0, 1.0],
            vec![-5.0, 2.0],
        ];
        assert_eq!(pointwise_survivors(&vectors), vec![0, 2, 4]);
    }

    #[test]
    fn test_dominated_by_combination() {
        let states = two_states();
        let corners = [
            alpha("a", &[("left", 1.0)]),
            alpha("b", &[("right", 1.0)]),
        ];

        let mut gamma = corners.to_vec();
        gamma.push(alpha("c", &[("left", 0.4), ("right", 0.4)]));
        let pruned = prune_dominated(&states, &gamma).unwrap();
        assert_eq!(pruned, corners.to_vec());

        let mut gamma = corners.to_vec();
        gamma.push(alpha("c", &[("left", 0.6), ("right", 0.6)]));
        assert_eq!(prune_dominated(&states, &gamma).unwrap().len(), 3);
    }

    #[test]
    fn test_single_vector_and_empty_set() {
        let states = two_states();
        let single = vec![alpha("a", &[("left", -3.0)])];
        assert_eq!(prune_dominated(&states, &single).unwrap(), single);
        assert!(prune_dominated(&states, &[]).unwrap().is_empty());
    }

    #[test]
    fn test_empty_state_space() {
        let result = prune_dominated(&FiniteStates::new(), &[alpha("a", &[])]);
        assert!(matches!(result, Err(Error::NumericFailure(_))));
    }

    #[test]
    fn test_prune_dense_keeps_order() {
        let gamma = vec![
            DenseAlpha {
                action: 0,
                values: vec![0.0, 1.0],
            },
            DenseAlpha {
                action: 1,
                values: vec![0.0, 0.5],
            },
            DenseAlpha {
                action: 2,
                values: vec![1.0, 0.0],
            },
        ];
        let pruned = prune_dense(gamma, 2, DEFAULT_PRUNE_TOLERANCE, &SimplexConfig::default())
            .unwrap();
        let actions: Vec<usize> = pruned.iter().map(|alpha| alpha.action).collect();
        assert_eq!(actions, vec![0, 2]);
    }
}
