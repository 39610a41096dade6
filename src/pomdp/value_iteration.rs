use crate::core::{AlphaVector, PolicyAlphaVectors};
use crate::error::{Error, Result};
use crate::math::simplex::SimplexConfig;
use crate::pomdp::model::{DenseAlpha, PomdpModel};
use crate::pomdp::prune::{self, DEFAULT_PRUNE_TOLERANCE};
use crate::pomdp::{Pomdp, PomdpSolver};

/// Reward spreads below this are treated as this when bounding iterations.
const MIN_REWARD_RANGE: f64 = 1e-6;

/// Exact value iteration over sets of alpha vectors.
///
/// Each step backs up Γ_t into Γ_{t+1} = prune(∪_a Γ_{a,*} ⊕ Γ_{a,z1} ⊕ ... ⊕ Γ_{a,z|Z|}).
/// Finite horizons run one step per epoch and store every epoch's set; infinite horizons
/// run `iterations` steps and keep only the final set.
#[derive(Debug, Clone)]
pub struct PomdpValueIteration {
    /// Number of backups for infinite horizons. Finite horizons always run `epochs()`.
    pub iterations: usize,
    pub prune_tolerance: f64,
    pub lp: SimplexConfig<f64>,
}

impl Default for PomdpValueIteration {
    fn default() -> Self {
        Self {
            iterations: 1,
            prune_tolerance: DEFAULT_PRUNE_TOLERANCE,
            lp: SimplexConfig::default(),
        }
    }
}

impl PomdpValueIteration {
    pub fn new(iterations: usize) -> Self {
        Self::default().with_iterations(iterations)
    }

    pub fn with_iterations(mut self, iterations: usize) -> Self {
        self.iterations = iterations.max(1);
        self
    }

    pub fn with_prune_tolerance(mut self, prune_tolerance: f64) -> Self {
        self.prune_tolerance = prune_tolerance;
        self
    }

    pub fn with_lp_config(mut self, lp: SimplexConfig<f64>) -> Self {
        self.lp = lp;
        self
    }

    /// Sets the iteration count that bounds the infinite-horizon error by `epsilon`.
    pub fn with_error_bound(self, pomdp: &Pomdp, epsilon: f64) -> Result<Self> {
        let iterations = compute_num_iterations(pomdp, epsilon)?;
        Ok(self.with_iterations(iterations))
    }

    /// Γ_{t+1} from Γ_t, pruned.
    fn backup(&self, model: &PomdpModel, prior: &[DenseAlpha]) -> Result<Vec<DenseAlpha>> {
        let unpruned: Vec<DenseAlpha> = model.backup_all(prior).into_iter().flatten().collect();
        let before = unpruned.len();
        let pruned = prune::prune_dense(
            unpruned,
            model.num_states(),
            self.prune_tolerance,
            &self.lp,
        )?;
        log::debug!(
            "backup of {} vectors: {} before pruning, {} after",
            prior.len(),
            before,
            pruned.len()
        );
        Ok(pruned)
    }

    fn to_policy_set(model: &PomdpModel, gamma: &[DenseAlpha]) -> Vec<AlphaVector> {
        gamma.iter().map(|alpha| model.to_alpha_vector(alpha)).collect()
    }
}

impl PomdpSolver for PomdpValueIteration {
    fn solve(&self, pomdp: &Pomdp) -> Result<PolicyAlphaVectors> {
        let model = PomdpModel::from_pomdp(pomdp)?;
        let horizon = pomdp.horizon;
        let mut policy = PolicyAlphaVectors::new(horizon);
        let mut gamma: Vec<DenseAlpha> = Vec::new();

        if horizon.is_finite() {
            let epochs = horizon.epochs();
            // After `steps` backups, Γ holds the value with `steps` decisions left.
            for steps in 1..=epochs {
                gamma = self.backup(&model, &gamma)?;
                policy.set(epochs - steps, Self::to_policy_set(&model, &gamma))?;
            }
            log::info!(
                "POMDP value iteration finished {} epochs with {} vectors at the first",
                epochs,
                gamma.len()
            );
        } else {
            for _ in 0..self.iterations {
                gamma = self.backup(&model, &gamma)?;
            }
            policy.set(0, Self::to_policy_set(&model, &gamma))?;
            log::info!(
                "POMDP value iteration finished {} iterations with {} vectors",
                self.iterations,
                gamma.len()
            );
        }

        Ok(policy)
    }
}

/// Number of backups after which the infinite-horizon value is within `epsilon` of optimal:
/// ⌊(ln ε − ln(R_max − R_min)) / ln γ⌋, and at least one.
///
/// Requires 0 < γ < 1 and ε > 0.
pub fn compute_num_iterations(pomdp: &Pomdp, epsilon: f64) -> Result<usize> {
    let gamma = pomdp.horizon.discount_factor();
    if !(gamma > 0.0 && gamma < 1.0) {
        return Err(Error::IncompatibleProblemShape(format!(
            "an error bound needs a discount factor strictly between 0 and 1, got {gamma}"
        )));
    }
    if !(epsilon > 0.0) {
        return Err(Error::InvalidDefinition(format!(
            "the error bound must be positive, got {epsilon}"
        )));
    }

    let spread = pomdp.rewards.max() - pomdp.rewards.min();
    let range = if spread.is_finite() {
        spread.max(MIN_REWARD_RANGE)
    } else {
        MIN_REWARD_RANGE
    };
    let iterations = ((epsilon.ln() - range.ln()) / gamma.ln()).floor();
    // Negative counts saturate to zero in the cast.
    Ok((iterations as usize).max(1))
}
