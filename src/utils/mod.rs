//! Convergence monitoring shared by the iterative solvers.

pub mod convergence;
pub use convergence::{IterationMonitor, NormKind, SolveStats};
