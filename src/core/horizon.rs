/// The planning horizon: a number of decision epochs, or zero for an infinite,
/// discounted horizon.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Horizon {
    epochs: usize,
    discount_factor: f64,
}

impl Horizon {
    /// A finite horizon of `epochs` decisions, undiscounted.
    pub fn finite(epochs: usize) -> Self {
        Self {
            epochs,
            discount_factor: 1.0,
        }
    }

    /// An infinite horizon with the given discount factor, clamped to [0, 1].
    pub fn infinite(discount_factor: f64) -> Self {
        Self::finite(0).with_discount_factor(discount_factor)
    }

    /// Sets the discount factor, clamped to [0, 1].
    ///
    /// A factor of 0 is accepted and makes the problem myopic: only the immediate reward
    /// counts, so a single value iteration sweep is already exact. Error-bound iteration
    /// counts need a factor strictly inside (0, 1).
    pub fn with_discount_factor(mut self, discount_factor: f64) -> Self {
        self.discount_factor = discount_factor.clamp(0.0, 1.0);
        self
    }

    pub fn is_finite(&self) -> bool {
        self.epochs > 0
    }

    /// Number of epochs; 0 for an infinite horizon.
    pub fn epochs(&self) -> usize {
        self.epochs
    }

    pub fn discount_factor(&self) -> f64 {
        self.discount_factor
    }

    /// Number of epoch slots a policy for this horizon needs (one for infinite horizons).
    pub fn policy_slots(&self) -> usize {
        self.epochs.max(1)
    }
}

impl Default for Horizon {
    fn default() -> Self {
        Self::finite(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_finite_and_infinite() {
        let h = Horizon::finite(5);
        assert!(h.is_finite());
        assert_eq!(h.epochs(), 5);
        assert_eq!(h.discount_factor(), 1.0);
        assert_eq!(h.policy_slots(), 5);

        let h = Horizon::infinite(0.9);
        assert!(!h.is_finite());
        assert_eq!(h.policy_slots(), 1);
        assert_eq!(h.discount_factor(), 0.9);
    }

    #[test]
    fn test_discount_is_clamped() {
        assert_eq!(Horizon::infinite(1.5).discount_factor(), 1.0);
        assert_eq!(
            Horizon::finite(3).with_discount_factor(-0.1).discount_factor(),
            0.0
        );
    }
}
