//! Factory for Krylov Subspace Methods (KSP).
//!
//! `KspContext` turns [`SolverOptions`] and [`PcOptions`] into a solver and
//! a preconditioner, factorizes the preconditioner from the matrix and
//! runs the solve:
//!
//! ```rust
//! use sparsekit::config::{PcOptions, PcType, SolverKind, SolverOptions};
//! use sparsekit::context::KspContext;
//! use sparsekit::matrix::{LinkedMatrix, SparseMatrix};
//!
//! let mut a = LinkedMatrix::new(3, 3);
//! for i in 0..3 {
//!     a.set(i, i, 2.0).unwrap();
//! }
//! let mut ksp = KspContext::new(
//!     SolverOptions::new(SolverKind::Cg).with_rtol(1e-10),
//!     PcOptions::new(PcType::Jacobi),
//! );
//! let mut x: Vec<f64> = vec![0.0; 3];
//! let stats = ksp.solve(&a, &[2.0, 4.0, 6.0], &mut x).unwrap();
//! assert_eq!(stats.iterations, 1);
//! assert!((x[2] - 3.0).abs() < 1e-12);
//! ```

use crate::config::options::{PcOptions, SolverKind, SolverOptions};
use crate::context::pc_context::PC;
use crate::error::KitError;
use crate::matrix::SparseMatrix;
use crate::preconditioner::Preconditioner;
use crate::solver::{
    BiCgSolver, BiCgStabSolver, CgSolver, CgsSolver, ChebyshevSolver, GmresSolver, LinearSolver,
    RichardsonSolver,
};
use crate::utils::convergence::{IterationMonitor, SolveStats};
use num_traits::Float;
use tracing::debug;

/// Context and configuration for a Krylov subspace solver.
pub struct KspContext<T> {
    pub opts: SolverOptions<T>,
    pub pc: PC<T>,
    history: Vec<T>,
}

impl<T: Float + 'static> KspContext<T> {
    pub fn new(opts: SolverOptions<T>, pc_opts: PcOptions<T>) -> Self {
        Self { opts, pc: PC::from_options(&pc_opts), history: Vec::new() }
    }

    /// Residual norms of the last solve.
    pub fn history(&self) -> &[T] {
        &self.history
    }

    fn monitor(&self) -> IterationMonitor<T> {
        IterationMonitor::new(self.opts.rtol, self.opts.max_iters)
            .with_atol(self.opts.atol)
            .with_dtol(self.opts.dtol)
            .with_norm(self.opts.norm)
    }

    /// The configured solver, with a monitor built from the options.
    pub fn build_solver(&self) -> Result<Box<dyn LinearSolver<T>>, KitError> {
        let mon = self.monitor();
        Ok(match self.opts.kind {
            SolverKind::Cg => Box::new(CgSolver::with_monitor(mon)),
            SolverKind::BiCg => Box::new(BiCgSolver::with_monitor(mon)),
            SolverKind::BiCgStab => Box::new(BiCgStabSolver::with_monitor(mon)),
            SolverKind::Cgs => Box::new(CgsSolver::with_monitor(mon)),
            SolverKind::Gmres => Box::new(GmresSolver::with_monitor(self.opts.restart, mon)),
            SolverKind::Chebyshev => {
                let (lo, hi) = self.opts.eig_bounds.ok_or_else(|| {
                    KitError::InvalidArgument("Chebyshev iteration needs eig_bounds".into())
                })?;
                Box::new(ChebyshevSolver::with_monitor(lo, hi, mon))
            }
            SolverKind::Richardson => Box::new(RichardsonSolver::with_monitor(self.opts.omega, mon)),
        })
    }

    /// Sets up the preconditioner on `a` and solves `a x = b`.
    pub fn solve<M: SparseMatrix<T>>(
        &mut self,
        a: &M,
        b: &[T],
        x: &mut [T],
    ) -> Result<SolveStats<T>, KitError> {
        let mut solver = self.build_solver()?;
        let mut pc = self.pc.build();
        if let Some(pc) = pc.as_mut() {
            pc.setup(a)?;
        }
        debug!(solver = %self.opts.kind, pc = ?pc.is_some(), "KSP solve");
        let pc_ref: Option<&dyn Preconditioner<T>> = pc.as_deref();
        let result = solver.solve(a, pc_ref, b, x);
        self.history = solver.monitor().history().to_vec();
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::options::PcType;
    use crate::error::StopReason;
    use crate::matrix::CsrMatrix;

    fn system(n: usize) -> (CsrMatrix<f64>, Vec<f64>) {
        let mut t = Vec::new();
        for i in 0..n {
            t.push((i, i, 4.0));
            if i > 0 {
                t.push((i, i - 1, -1.0));
                t.push((i - 1, i, -1.0));
            }
        }
        let a = CsrMatrix::from_triplets(n, n, &t).unwrap();
        (a, vec![1.0; n])
    }

    #[test]
    fn every_kind_and_pc_solves() {
        let (a, b) = system(20);
        let kinds = [
            SolverKind::Cg,
            SolverKind::BiCg,
            SolverKind::BiCgStab,
            SolverKind::Cgs,
            SolverKind::Gmres,
            SolverKind::Chebyshev,
            SolverKind::Richardson,
        ];
        for kind in kinds {
            for pc in [PcType::None, PcType::Jacobi, PcType::Ilu0] {
                // Jacobi-scaled spectrum lies in [0.5, 1.5]; unscaled in [2, 6]
                let (lo, hi, omega) = match pc {
                    PcType::None => (2.0, 6.0, 0.25),
                    _ => (0.5, 1.5, 1.0),
                };
                let opts = SolverOptions::new(kind)
                    .with_rtol(1e-10)
                    .with_max_iters(500)
                    .with_eig_bounds(lo, hi)
                    .with_omega(omega);
                let mut ksp = KspContext::new(opts, PcOptions::new(pc));
                let mut x = vec![0.0; 20];
                let stats = ksp
                    .solve(&a, &b, &mut x)
                    .unwrap_or_else(|e| panic!("{kind} with {pc:?}: {e}"));
                assert_eq!(ksp.history().len(), stats.iterations + 1);
            }
        }
    }

    #[test]
    fn chebyshev_without_bounds_is_rejected() {
        let ksp = KspContext::<f64>::new(
            SolverOptions::new(SolverKind::Chebyshev),
            PcOptions::default(),
        );
        assert!(matches!(ksp.build_solver(), Err(KitError::InvalidArgument(_))));
    }

    #[test]
    fn failure_history_is_kept() {
        let (a, b) = system(30);
        let mut ksp = KspContext::new(
            SolverOptions::new(SolverKind::Cg).with_rtol(1e-14).with_max_iters(2),
            PcOptions::default(),
        );
        let mut x = vec![0.0; 30];
        let err = ksp.solve(&a, &b, &mut x).unwrap_err();
        assert_eq!(err.stop_reason(), Some(StopReason::MaxIterationsExceeded));
        assert_eq!(ksp.history().len(), 3);
    }
}
