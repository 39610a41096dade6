pub mod core;
pub mod error;
pub mod math;
pub mod mdp;
pub mod pomdp;

pub use error::{Error, Result};
