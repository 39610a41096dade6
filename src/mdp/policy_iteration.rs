use ndarray::{Array1, Array2};

use crate::core::PolicyMap;
use crate::error::{Error, Result};
use crate::math::linear_system;
use crate::mdp::bellman::MarkovDecisionProcess;
use crate::mdp::value_iteration::convergence_threshold;
use crate::mdp::{Mdp, MdpSolution, MdpSolver};

/// An action only changes when it beats the current one by more than this.
const IMPROVEMENT_EPSILON: f64 = 1e-12;

/// Where the iteration stopped, in dense indices.
struct Outcome {
    choice: Vec<usize>,
    values: Vec<f64>,
    iterations: usize,
    converged: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyIterationVariant {
    /// Evaluate each policy exactly with a dense linear solve.
    Exact,
    /// Approximate each evaluation with `k` synchronous sweeps, the last of which is greedy.
    Modified { k: usize },
}

/// Policy iteration for infinite-horizon MDPs.
#[derive(Debug, Clone)]
pub struct PolicyIteration {
    pub variant: PolicyIterationVariant,
    /// Modified policy iteration stops once a block changes no action and, for γ < 1, the
    /// greedy sweep's residual is at most `tolerance * (1 - γ) / γ`. Undiscounted problems
    /// stop on a stable policy alone.
    pub tolerance: f64,
    pub max_iterations: usize,
}

impl Default for PolicyIteration {
    fn default() -> Self {
        Self {
            variant: PolicyIterationVariant::Exact,
            tolerance: 0.001,
            max_iterations: 100_000,
        }
    }
}

impl PolicyIteration {
    pub fn exact() -> Self {
        Self::default()
    }

    pub fn modified(k: usize) -> Self {
        Self {
            variant: PolicyIterationVariant::Modified { k },
            ..Self::default()
        }
    }

    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    fn solve_exact(&self, model: &MarkovDecisionProcess) -> Result<Outcome> {
        let mut choice = vec![0_usize; model.num_states()];
        let mut iterations = 0;

        while iterations < self.max_iterations {
            let values = evaluate_policy(model, &choice)?;
            iterations += 1;
            let changed = improve_policy(model, &values, &mut choice);
            log::debug!("policy iteration step {}: {} actions changed", iterations, changed);
            if changed == 0 {
                return Ok(Outcome {
                    choice,
                    values,
                    iterations,
                    converged: true,
                });
            }
        }

        let values = evaluate_policy(model, &choice)?;
        Ok(Outcome {
            choice,
            values,
            iterations,
            converged: false,
        })
    }

    fn solve_modified(&self, model: &MarkovDecisionProcess, k: usize) -> Outcome {
        let n = model.num_states();
        let threshold = convergence_threshold(self.tolerance, model.gamma);
        let mut values = vec![0.0; n];
        let mut choice: Vec<Option<usize>> = vec![None; n];
        let mut iterations = 0;
        let mut converged = false;

        while iterations < self.max_iterations {
            for _ in 1..k {
                values = (0..n)
                    .map(|s| match choice[s] {
                        Some(a) => model.compute_q_value(s, a, &values),
                        None => model.bellman_update(s, &values).0,
                    })
                    .collect();
            }

            let mut delta = 0.0_f64;
            let mut changed = 0;
            let mut greedy = vec![0.0; n];
            for (s, value) in greedy.iter_mut().enumerate() {
                let (best, action) = model.bellman_update(s, &values);
                let kept = choice[s].filter(|&a| {
                    model.compute_q_value(s, a, &values) + IMPROVEMENT_EPSILON >= best
                });
                if kept.is_none() {
                    choice[s] = Some(action);
                    changed += 1;
                }
                delta = delta.max((best - values[s]).abs());
                *value = best;
            }
            values = greedy;
            iterations += 1;
            log::debug!(
                "modified policy iteration block {}: {} actions changed, residual {:.3e}",
                iterations,
                changed,
                delta
            );

            if changed == 0 && (model.gamma >= 1.0 || delta <= threshold) {
                converged = true;
                break;
            }
        }

        Outcome {
            choice: choice.into_iter().map(|a| a.unwrap_or(0)).collect(),
            values,
            iterations,
            converged,
        }
    }
}

impl MdpSolver for PolicyIteration {
    fn solve(&self, mdp: &Mdp) -> Result<MdpSolution> {
        if mdp.horizon.is_finite() {
            return Err(Error::IncompatibleProblemShape(
                "policy iteration requires an infinite horizon".into(),
            ));
        }
        if let PolicyIterationVariant::Modified { k: 0 } = self.variant {
            return Err(Error::IncompatibleProblemShape(
                "modified policy iteration needs k >= 1".into(),
            ));
        }

        let model = MarkovDecisionProcess::from_mdp(mdp)?;
        let outcome = match self.variant {
            PolicyIterationVariant::Exact => self.solve_exact(&model)?,
            PolicyIterationVariant::Modified { k } => self.solve_modified(&model, k),
        };

        if outcome.converged {
            log::info!(
                "policy iteration converged after {} iterations",
                outcome.iterations
            );
        } else {
            log::warn!(
                "policy iteration stopped at {} iterations without converging",
                outcome.iterations
            );
        }

        let mut policy = PolicyMap::new(mdp.horizon);
        model.record_policy(&mut policy, 0, &outcome.choice)?;
        Ok(MdpSolution {
            policy,
            values: model.value_map(&outcome.values),
            iterations: outcome.iterations,
            converged: outcome.converged,
        })
    }
}

/// Solves (I − γ P_π) V = r_π for the value of a fixed policy.
fn evaluate_policy(model: &MarkovDecisionProcess, choice: &[usize]) -> Result<Vec<f64>> {
    let n = model.num_states();
    let mut a = Array2::<f64>::eye(n);
    let mut b = Array1::<f64>::zeros(n);
    for (s, &action) in choice.iter().enumerate() {
        for &(s_next, prob, reward) in &model.transitions[s][action] {
            a[[s, s_next]] -= model.gamma * prob;
            b[s] += prob * reward;
        }
    }
    Ok(linear_system::solve(a, b)?.to_vec())
}

/// Greedy improvement against `values`. Returns the number of states whose action changed.
fn improve_policy(model: &MarkovDecisionProcess, values: &[f64], choice: &mut [usize]) -> usize {
    let mut changed = 0;
    for (s, current) in choice.iter_mut().enumerate() {
        let (best, action) = model.bellman_update(s, values);
        if best > model.compute_q_value(s, *current, values) + IMPROVEMENT_EPSILON {
            *current = action;
            changed += 1;
        }
    }
    changed
}
