//! Policy representations produced by the solvers.

pub mod alpha_vector;
pub mod alpha_vectors;
mod format;
pub mod map;
pub mod tree;

pub use alpha_vector::{cross_sum, AlphaVector};
pub use alpha_vectors::PolicyAlphaVectors;
pub use map::PolicyMap;
pub use tree::PolicyTree;
