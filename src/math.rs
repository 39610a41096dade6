pub mod linear_system;
pub mod simplex;

pub use simplex::{
    maximize as simplex_maximize, minimize as simplex_minimize, LinearProgram, LpSolution,
    LpStatus, SimplexConfig,
};
