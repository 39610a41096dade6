use num_traits::Float;
use std::fmt::Debug;

/// A linear program with inequality constraints and non-negative variables.
#[derive(Debug, Clone)]
pub struct LinearProgram<T>
where
    T: Float + Debug,
{
    /// The objective function coefficients (c in max c^T x)
    pub objective: Vec<T>,
    /// The constraint matrix (A in Ax ≤ b)
    pub constraints: Vec<Vec<T>>,
    /// The right-hand side vector (b in Ax ≤ b); entries may be negative
    pub rhs: Vec<T>,
}

/// Configuration options for the simplex method.
#[derive(Debug, Clone)]
pub struct SimplexConfig<T>
where
    T: Float + Debug,
{
    /// Maximum number of pivots over both phases
    pub max_iterations: usize,
    /// Values within this distance of zero are treated as zero
    pub tolerance: T,
}

impl<T> Default for SimplexConfig<T>
where
    T: Float + Debug,
{
    fn default() -> Self {
        Self {
            max_iterations: 10_000,
            tolerance: T::from(1e-10).unwrap_or_else(T::epsilon),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LpStatus {
    Optimal,
    Infeasible,
    Unbounded,
    MaxIterationsReached,
}

/// Result of a simplex solve. `point` and `value` are only meaningful for
/// [`LpStatus::Optimal`].
#[derive(Debug, Clone)]
pub struct LpSolution<T>
where
    T: Float + Debug,
{
    pub point: Vec<T>,
    pub value: T,
    pub status: LpStatus,
    pub iterations: usize,
}

/// Maximizes a linear program with the two-phase simplex method.
///
/// Solves
/// maximize c^T x
/// subject to Ax ≤ b
///           x ≥ 0
///
/// Rows with a negative right-hand side are negated and given an artificial variable;
/// phase I drives the artificials to zero, phase II optimizes the real objective.
/// Pivoting follows Bland's rule, so degenerate problems terminate.
///
/// # Examples
///
/// ```
/// use decision_dp::math::simplex::{maximize, LinearProgram, LpStatus, SimplexConfig};
///
/// // maximize 2x + y subject to x + y ≤ 2, x ≤ 1
/// let lp = LinearProgram {
///     objective: vec![2.0_f64, 1.0],
///     constraints: vec![vec![1.0, 1.0], vec![1.0, 0.0]],
///     rhs: vec![2.0, 1.0],
/// };
///
/// let solution = maximize(&lp, &SimplexConfig::default());
/// assert_eq!(solution.status, LpStatus::Optimal);
/// assert!((solution.value - 3.0).abs() < 1e-9);
/// ```
pub fn maximize<T>(lp: &LinearProgram<T>, config: &SimplexConfig<T>) -> LpSolution<T>
where
    T: Float + Debug,
{
    let mut tableau = Tableau::new(lp);
    let eps = config.tolerance;
    let mut iterations = 0;

    if tableau.num_artificial > 0 {
        let phase_one_cost: Vec<T> = (0..tableau.width())
            .map(|j| {
                if tableau.is_artificial(j) {
                    T::one()
                } else {
                    T::zero()
                }
            })
            .collect();
        tableau.set_cost(&phase_one_cost, eps);

        // The phase I objective is bounded below by zero.
        if let Phase::MaxIterations = tableau.run(config, &mut iterations, true) {
            return tableau.finish(lp, LpStatus::MaxIterationsReached, iterations);
        }

        // Row 0 rhs is the negated phase I objective.
        if -tableau.rows[0][tableau.rhs_col()] > eps {
            return tableau.finish(lp, LpStatus::Infeasible, iterations);
        }
        tableau.drive_out_artificials(eps);
    }

    let mut phase_two_cost = vec![T::zero(); tableau.width()];
    for (j, &c) in lp.objective.iter().enumerate() {
        phase_two_cost[j] = -c;
    }
    tableau.set_cost(&phase_two_cost, eps);

    let status = match tableau.run(config, &mut iterations, false) {
        Phase::Optimal => LpStatus::Optimal,
        Phase::Unbounded => LpStatus::Unbounded,
        Phase::MaxIterations => LpStatus::MaxIterationsReached,
    };
    tableau.finish(lp, status, iterations)
}

/// Minimizes a linear program by maximizing its negated objective.
pub fn minimize<T>(lp: &LinearProgram<T>, config: &SimplexConfig<T>) -> LpSolution<T>
where
    T: Float + Debug,
{
    let max_lp = LinearProgram {
        objective: lp.objective.iter().map(|&c| -c).collect(),
        constraints: lp.constraints.clone(),
        rhs: lp.rhs.clone(),
    };

    let result = maximize(&max_lp, config);

    LpSolution {
        point: result.point,
        value: -result.value,
        status: result.status,
        iterations: result.iterations,
    }
}

enum Phase {
    Optimal,
    Unbounded,
    MaxIterations,
}

/// Dense simplex tableau.
///
/// Row 0 holds the reduced costs of the current (minimization) objective with the negated
/// objective value in the rhs column. Rows 1..=m are the constraints. Columns are the
/// original variables, one slack per row, one artificial per negated row, then the rhs.
struct Tableau<T> {
    rows: Vec<Vec<T>>,
    basis: Vec<usize>,
    num_original: usize,
    num_slack: usize,
    num_artificial: usize,
}

impl<T> Tableau<T>
where
    T: Float + Debug,
{
    fn new(lp: &LinearProgram<T>) -> Self {
        let m = lp.constraints.len();
        let n = lp.objective.len();
        let negated: Vec<bool> = lp.rhs.iter().map(|&b| b < T::zero()).collect();
        let num_artificial = negated.iter().filter(|&&neg| neg).count();
        let width = n + m + num_artificial;

        let mut rows = vec![vec![T::zero(); width + 1]; m + 1];
        let mut basis = Vec::with_capacity(m);
        let mut next_artificial = n + m;

        for i in 0..m {
            let sign = if negated[i] { -T::one() } else { T::one() };
            let row = &mut rows[i + 1];
            for (j, &a) in lp.constraints[i].iter().enumerate().take(n) {
                row[j] = sign * a;
            }
            row[n + i] = sign;
            row[width] = sign * lp.rhs[i];

            if negated[i] {
                row[next_artificial] = T::one();
                basis.push(next_artificial);
                next_artificial += 1;
            } else {
                basis.push(n + i);
            }
        }

        Self {
            rows,
            basis,
            num_original: n,
            num_slack: m,
            num_artificial,
        }
    }

    fn width(&self) -> usize {
        self.num_original + self.num_slack + self.num_artificial
    }

    fn rhs_col(&self) -> usize {
        self.width()
    }

    fn is_artificial(&self, col: usize) -> bool {
        col >= self.num_original + self.num_slack && col < self.width()
    }

    /// Installs a new cost row and prices out the current basis.
    fn set_cost(&mut self, cost: &[T], eps: T) {
        let rhs = self.rhs_col();
        for (j, value) in self.rows[0].iter_mut().enumerate() {
            *value = if j < cost.len() { cost[j] } else { T::zero() };
        }
        self.rows[0][rhs] = T::zero();

        for i in 0..self.basis.len() {
            let coef = self.rows[0][self.basis[i]];
            if coef.abs() > eps {
                let (objective, constraints) = self.rows.split_at_mut(1);
                for (target, &source) in objective[0].iter_mut().zip(constraints[i].iter()) {
                    *target = *target - coef * source;
                }
            }
        }
    }

    fn run(&mut self, config: &SimplexConfig<T>, iterations: &mut usize, phase_one: bool) -> Phase {
        let eps = config.tolerance;
        let rhs = self.rhs_col();
        loop {
            // Bland's rule: lowest-index improving column.
            let entering = (0..self.width())
                .filter(|&j| phase_one || !self.is_artificial(j))
                .find(|&j| self.rows[0][j] < -eps);
            let Some(entering_col) = entering else {
                return Phase::Optimal;
            };

            if *iterations >= config.max_iterations {
                return Phase::MaxIterations;
            }

            // Minimum ratio test, ties broken by the lowest basic variable index.
            let mut leaving: Option<(usize, T)> = None;
            for (i, row) in self.rows.iter().enumerate().skip(1) {
                let coef = row[entering_col];
                if coef > eps {
                    let ratio = row[rhs] / coef;
                    let better = match leaving {
                        None => true,
                        Some((best, best_ratio)) => {
                            ratio < best_ratio - eps
                                || ((ratio - best_ratio).abs() <= eps
                                    && self.basis[i - 1] < self.basis[best - 1])
                        }
                    };
                    if better {
                        leaving = Some((i, ratio));
                    }
                }
            }
            let Some((leaving_row, _)) = leaving else {
                return Phase::Unbounded;
            };

            self.pivot(leaving_row, entering_col, eps);
            *iterations += 1;
        }
    }

    /// Pivots basic artificials at zero level out of the basis where a real column allows it.
    fn drive_out_artificials(&mut self, eps: T) {
        for i in 1..self.rows.len() {
            if !self.is_artificial(self.basis[i - 1]) {
                continue;
            }
            let replacement = (0..self.num_original + self.num_slack)
                .find(|&j| self.rows[i][j].abs() > eps);
            if let Some(col) = replacement {
                self.pivot(i, col, eps);
            }
        }
    }

    fn pivot(&mut self, leaving_row: usize, entering_col: usize, eps: T) {
        let pivot_scale = T::one() / self.rows[leaving_row][entering_col];
        for value in self.rows[leaving_row].iter_mut() {
            *value = *value * pivot_scale;
            if value.abs() < eps {
                *value = T::zero();
            }
        }

        let pivot_row = self.rows[leaving_row].clone();
        for (i, row) in self.rows.iter_mut().enumerate() {
            if i == leaving_row {
                continue;
            }
            let factor = row[entering_col];
            if factor.abs() > eps {
                for (value, &p) in row.iter_mut().zip(pivot_row.iter()) {
                    *value = *value - factor * p;
                    if value.abs() < eps {
                        *value = T::zero();
                    }
                }
            }
            row[entering_col] = T::zero();
        }
        self.rows[leaving_row][entering_col] = T::one();
        self.basis[leaving_row - 1] = entering_col;
    }

    fn finish(&self, lp: &LinearProgram<T>, status: LpStatus, iterations: usize) -> LpSolution<T> {
        let rhs = self.rhs_col();
        let mut point = vec![T::zero(); self.num_original];
        for (i, &var) in self.basis.iter().enumerate() {
            if var < self.num_original {
                point[var] = self.rows[i + 1][rhs];
            }
        }
        let value = point
            .iter()
            .zip(lp.objective.iter())
            .fold(T::zero(), |acc, (&x, &c)| acc + c * x);

        LpSolution {
            point,
            value,
            status,
            iterations,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> SimplexConfig<f64> {
        SimplexConfig {
            max_iterations: 100,
            tolerance: 1e-10,
        }
    }

    #[test]
    fn test_bounded_lp() {
        // minimize -2x - y
        // subject to:
        //   x + y ≤ 2
        //   x ≤ 1
        let lp = LinearProgram {
            objective: vec![-2.0, -1.0],
            constraints: vec![vec![1.0, 1.0], vec![1.0, 0.0]],
            rhs: vec![2.0, 1.0],
        };

        let result = minimize(&lp, &config());

        assert_eq!(result.status, LpStatus::Optimal);
        assert!((result.point[0] - 1.0).abs() < 1e-9);
        assert!((result.point[1] - 1.0).abs() < 1e-9);
        assert!((result.value + 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_equality_through_negative_rhs() {
        // maximize x - y subject to x + y = 1 (as x + y ≤ 1 and -x - y ≤ -1), x ≤ 0.25
        let lp = LinearProgram {
            objective: vec![1.0, -1.0],
            constraints: vec![vec![1.0, 1.0], vec![-1.0, -1.0], vec![1.0, 0.0]],
            rhs: vec![1.0, -1.0, 0.25],
        };

        let result = maximize(&lp, &config());

        assert_eq!(result.status, LpStatus::Optimal);
        assert!((result.point[0] - 0.25).abs() < 1e-9);
        assert!((result.point[1] - 0.75).abs() < 1e-9);
        assert!((result.value + 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_infeasible() {
        // x ≤ 1 and x ≥ 2
        let lp = LinearProgram {
            objective: vec![1.0],
            constraints: vec![vec![1.0], vec![-1.0]],
            rhs: vec![1.0, -2.0],
        };
        assert_eq!(maximize(&lp, &config()).status, LpStatus::Infeasible);
    }

    #[test]
    fn test_unbounded() {
        // maximize x + y subject to x - y ≤ 1
        let lp = LinearProgram {
            objective: vec![1.0, 1.0],
            constraints: vec![vec![1.0, -1.0]],
            rhs: vec![1.0],
        };
        assert_eq!(maximize(&lp, &config()).status, LpStatus::Unbounded);
    }

    #[test]
    fn test_degenerate_lp() {
        // maximize x + y subject to x + y ≤ 1, x ≤ 0.5, y ≤ 0.5, x - y ≤ 0
        let lp = LinearProgram {
            objective: vec![1.0, 1.0],
            constraints: vec![
                vec![1.0, 1.0],
                vec![1.0, 0.0],
                vec![0.0, 1.0],
                vec![1.0, -1.0],
            ],
            rhs: vec![1.0, 0.5, 0.5, 0.0],
        };

        let result = maximize(&lp, &config());

        assert_eq!(result.status, LpStatus::Optimal);
        assert!((result.value - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_iteration_cap() {
        let lp = LinearProgram {
            objective: vec![1.0, 1.0],
            constraints: vec![vec![1.0, 0.0], vec![0.0, 1.0]],
            rhs: vec![1.0, 1.0],
        };
        let config = SimplexConfig {
            max_iterations: 1,
            tolerance: 1e-10,
        };
        let result = maximize(&lp, &config);
        assert_eq!(result.status, LpStatus::MaxIterationsReached);
        assert_eq!(result.iterations, 1);
    }
}
