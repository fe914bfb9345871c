//! Krylov solver interfaces.
//!
//! Every solver borrows the operator, the right-hand side and the solution
//! vector for the duration of [`LinearSolver::solve`]. The solution is
//! updated in place, so after a `NotConverged` failure `x` still holds the
//! last iterate.

use crate::core::traits::MatVec;
use crate::core::wrappers::{residual, to_f64};
use crate::error::{KitError, check_dim};
use crate::preconditioner::Preconditioner;
use crate::utils::convergence::{IterationMonitor, SolveStats};
use num_traits::Float;
use tracing::debug;

/// Common interface for any iterative solver.
pub trait LinearSolver<T: Float> {
    /// Solve A·x = b, starting from and writing the result into `x`.
    /// Returns iteration stats on convergence.
    fn solve(
        &mut self,
        a: &dyn MatVec<T>,
        pc: Option<&dyn Preconditioner<T>>,
        b: &[T],
        x: &mut [T],
    ) -> Result<SolveStats<T>, KitError>;

    /// Monitor of the last solve (residual history, iteration count).
    fn monitor(&self) -> &IterationMonitor<T>;
}

pub mod bicg;
pub use bicg::BiCgSolver;

pub mod bicgstab;
pub use bicgstab::BiCgStabSolver;

pub mod cg;
pub use cg::CgSolver;

pub mod cgs;
pub use cgs::CgsSolver;

pub mod chebyshev;
pub use chebyshev::ChebyshevSolver;

pub mod gmres;
pub use gmres::GmresSolver;

pub mod richardson;
pub use richardson::RichardsonSolver;

/// INITIALIZING: checks dimensions, resets the monitor and returns r0 = b − A x.
pub(crate) fn start<T: Float>(
    name: &str,
    a: &dyn MatVec<T>,
    b: &[T],
    x: &[T],
    monitor: &mut IterationMonitor<T>,
) -> Result<Vec<T>, KitError> {
    check_dim(a.nrows(), a.ncols())?;
    check_dim(a.nrows(), b.len())?;
    check_dim(a.ncols(), x.len())?;
    monitor.reset();
    let mut r = vec![T::zero(); b.len()];
    residual(a, b, x, &mut r)?;
    debug!(
        solver = name,
        n = b.len(),
        rtol = to_f64(monitor.rtol),
        max_iters = monitor.max_iters,
        "solve started"
    );
    Ok(r)
}

/// z = M⁻¹ r, or a copy of r without preconditioner.
pub(crate) fn precondition<T: Float>(
    pc: Option<&dyn Preconditioner<T>>,
    r: &[T],
    z: &mut [T],
) -> Result<(), KitError> {
    match pc {
        Some(pc) => pc.apply(r, z),
        None => {
            z.copy_from_slice(r);
            Ok(())
        }
    }
}

/// z = M⁻ᵀ r, or a copy of r without preconditioner.
pub(crate) fn precondition_transpose<T: Float>(
    pc: Option<&dyn Preconditioner<T>>,
    r: &[T],
    z: &mut [T],
) -> Result<(), KitError> {
    match pc {
        Some(pc) => pc.apply_transpose(r, z),
        None => {
            z.copy_from_slice(r);
            Ok(())
        }
    }
}
