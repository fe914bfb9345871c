//! sparsekit: sparse storage, Krylov solvers and incomplete factorizations.
//!
//! The crate provides a sparse vector, a family of sparse matrix formats
//! behind one [`SparseMatrix`] trait, preconditioners behind
//! [`Preconditioner`] and iterative solvers behind [`LinearSolver`], all
//! generic over a `num_traits::Float` scalar. Dense operators and
//! eigenvalue estimates come from `faer`.

pub mod config;
pub mod context;
pub mod core;
pub mod error;
pub mod io;
pub mod matrix;
pub mod preconditioner;
pub mod solver;
pub mod utils;
pub mod vector;

// Re-exports for convenience
pub use config::{PcOptions, PcType, SolverKind, SolverOptions};
pub use context::{KspContext, PC};
pub use core::{MatShape, MatVec};
pub use error::{KitError, StopReason};
pub use matrix::{
    CscMatrix, CsrMatrix, DiagMatrix, FlexCsrMatrix, LinkedMatrix, MatrixEntry, SparseMatrix,
};
pub use preconditioner::{Identity, Ilu0, Ilut, Jacobi, Preconditioner, Ssor, spectral_bounds};
pub use solver::{
    BiCgSolver, BiCgStabSolver, CgSolver, CgsSolver, ChebyshevSolver, GmresSolver, LinearSolver,
    RichardsonSolver,
};
pub use utils::convergence::{IterationMonitor, NormKind, SolveStats};
pub use vector::SparseVector;
