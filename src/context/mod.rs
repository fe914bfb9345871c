//! Context types for configuring and running solver pipelines.
//!
//! - [`ksp_context`]: `KspContext`, which builds a solver and a
//!   preconditioner from options and runs a solve.
//! - [`pc_context`]: the `PC` preconditioner selection enum.

pub mod ksp_context;
pub use ksp_context::KspContext;
pub mod pc_context;
pub use pc_context::PC;
