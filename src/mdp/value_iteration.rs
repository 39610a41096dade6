use crate::core::PolicyMap;
use crate::error::Result;
use crate::mdp::bellman::MarkovDecisionProcess;
use crate::mdp::{Mdp, MdpSolution, MdpSolver};

/// Bellman-backup value iteration for finite and infinite horizons.
///
/// Finite horizons run one backup per epoch from the last to the first. Infinite horizons
/// sweep in place until the largest change in a sweep is at most `tolerance * (1 - γ) / γ`,
/// which bounds the returned policy's loss by `tolerance`.
#[derive(Debug, Clone)]
pub struct ValueIteration {
    pub tolerance: f64,
    pub max_iterations: usize,
}

impl Default for ValueIteration {
    fn default() -> Self {
        Self {
            tolerance: 0.001,
            max_iterations: 100_000,
        }
    }
}

impl ValueIteration {
    pub fn new(max_iterations: usize, tolerance: f64) -> Self {
        Self {
            tolerance,
            max_iterations,
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

    fn solve_finite_horizon(&self, mdp: &Mdp, model: &MarkovDecisionProcess) -> Result<MdpSolution> {
        let horizon = mdp.horizon;
        let mut policy = PolicyMap::new(horizon);
        // Values with no steps to go.
        let mut next = vec![0.0; model.num_states()];

        for t in (0..horizon.epochs()).rev() {
            let backups = backup_all(model, &next);
            let choice: Vec<usize> = backups.iter().map(|&(_, a)| a).collect();
            model.record_policy(&mut policy, t, &choice)?;
            next = backups.into_iter().map(|(v, _)| v).collect();
            log::debug!("epoch {}: backed up {} states", t, model.num_states());
        }

        log::info!(
            "value iteration finished {} epochs over {} states",
            horizon.epochs(),
            model.num_states()
        );
        Ok(MdpSolution {
            policy,
            values: model.value_map(&next),
            iterations: horizon.epochs(),
            converged: true,
        })
    }

    fn solve_infinite_horizon(&self, mdp: &Mdp, model: &MarkovDecisionProcess) -> Result<MdpSolution> {
        let n = model.num_states();
        let threshold = convergence_threshold(self.tolerance, model.gamma);
        let mut values = vec![0.0; n];
        let mut choice = vec![0_usize; n];
        let mut iterations = 0;
        let mut converged = false;

        while iterations < self.max_iterations {
            let mut delta = 0.0_f64;
            // In place: later states in the sweep already see this sweep's values.
            for s in 0..n {
                let (value, action) = model.bellman_update(s, &values);
                delta = delta.max((value - values[s]).abs());
                values[s] = value;
                choice[s] = action;
            }
            iterations += 1;
            log::debug!("sweep {}: residual {:.3e}", iterations, delta);

            if delta <= threshold {
                converged = true;
                break;
            }
        }

        if converged {
            log::info!("value iteration converged after {} sweeps", iterations);
        } else {
            log::warn!(
                "value iteration stopped at {} sweeps without reaching residual {:.3e}",
                iterations,
                threshold
            );
        }

        let mut policy = PolicyMap::new(mdp.horizon);
        model.record_policy(&mut policy, 0, &choice)?;
        Ok(MdpSolution {
            policy,
            values: model.value_map(&values),
            iterations,
            converged,
        })
    }
}

impl MdpSolver for ValueIteration {
    fn solve(&self, mdp: &Mdp) -> Result<MdpSolution> {
        let model = MarkovDecisionProcess::from_mdp(mdp)?;
        if mdp.horizon.is_finite() {
            self.solve_finite_horizon(mdp, &model)
        } else {
            self.solve_infinite_horizon(mdp, &model)
        }
    }
}

/// Largest Bellman residual at which a sweep counts as converged: ε(1 − γ)/γ.
pub(crate) fn convergence_threshold(tolerance: f64, gamma: f64) -> f64 {
    if gamma <= 0.0 {
        f64::INFINITY
    } else {
        tolerance * (1.0 - gamma) / gamma
    }
}

/// One synchronous backup of every state against `next`.
#[cfg(feature = "parallel")]
fn backup_all(model: &MarkovDecisionProcess, next: &[f64]) -> Vec<(f64, usize)> {
    use rayon::prelude::*;
    (0..model.num_states())
        .into_par_iter()
        .map(|s| model.bellman_update(s, next))
        .collect()
}

/// One synchronous backup of every state against `next`.
#[cfg(not(feature = "parallel"))]
fn backup_all(model: &MarkovDecisionProcess, next: &[f64]) -> Vec<(f64, usize)> {
    (0..model.num_states())
        .map(|s| model.bellman_update(s, next))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_convergence_threshold() {
        assert!((convergence_threshold(0.001, 0.9) - 0.001 * 0.1 / 0.9).abs() < 1e-15);
        assert_eq!(convergence_threshold(0.001, 1.0), 0.0);
        assert_eq!(convergence_threshold(0.001, 0.0), f64::INFINITY);
    }

    #[test]
    fn test_builders() {
        let solver = ValueIteration::default()
            .with_tolerance(1e-6)
            .with_max_iterations(50);
        assert_eq!(solver.tolerance, 1e-6);
        assert_eq!(solver.max_iterations, 50);

        let solver = ValueIteration::new(10, 0.5);
        assert_eq!(solver.max_iterations, 10);
        assert_eq!(solver.tolerance, 0.5);
    }
}
