//! Preconditioned Conjugate Gradient per Saad §9.2.
//!
//! Without a preconditioner this is plain CG (Saad §6.7). The matrix and
//! the preconditioner must both be symmetric positive definite.

use crate::core::traits::MatVec;
use crate::core::wrappers::{axpy, dot, xpby};
use crate::error::KitError;
use crate::preconditioner::Preconditioner;
use crate::solver::{LinearSolver, precondition, start};
use crate::utils::convergence::{IterationMonitor, SolveStats, vanishes};
use num_traits::Float;

pub struct CgSolver<T> {
    pub monitor: IterationMonitor<T>,
}

impl<T: Float> CgSolver<T> {
    pub fn new(tol: T, max_iters: usize) -> Self {
        Self { monitor: IterationMonitor::new(tol, max_iters) }
    }

    pub fn with_monitor(monitor: IterationMonitor<T>) -> Self {
        Self { monitor }
    }
}

impl<T: Float> LinearSolver<T> for CgSolver<T> {
    fn solve(
        &mut self,
        a: &dyn MatVec<T>,
        pc: Option<&dyn Preconditioner<T>>,
        b: &[T],
        x: &mut [T],
    ) -> Result<SolveStats<T>, KitError> {
        let mon = &mut self.monitor;
        let mut r = start("cg", a, b, x, mon)?;
        if mon.check(mon.residual_norm(&r))? {
            return Ok(mon.stats());
        }
        let n = r.len();
        let mut z = vec![T::zero(); n];
        let mut q = vec![T::zero(); n];
        precondition(pc, &r, &mut z)?;
        let mut p = z.clone();
        let mut rho = dot(&r, &z);
        loop {
            a.matvec(&p, &mut q)?;
            let pq = dot(&p, &q);
            if vanishes(pq) {
                return Err(mon.breakdown("p·Ap"));
            }
            let alpha = rho / pq;
            axpy(alpha, &p, x);
            axpy(-alpha, &q, &mut r);
            if mon.check(mon.residual_norm(&r))? {
                return Ok(mon.stats());
            }
            precondition(pc, &r, &mut z)?;
            let rho_new = dot(&r, &z);
            if vanishes(rho) {
                return Err(mon.breakdown("r·z"));
            }
            // p = z + beta p
            xpby(&z, rho_new / rho, &mut p);
            rho = rho_new;
        }
    }

    fn monitor(&self) -> &IterationMonitor<T> {
        &self.monitor
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StopReason;
    use crate::preconditioner::{Ilu0, Jacobi};
    use crate::solver::test_support::{max_err, tridiag};
    use faer::Mat;

    #[test]
    fn cg_solves_simple_spd() {
        // SPD system: [[4,1],[1,3]] x = [1,2]
        let a = Mat::from_fn(2, 2, |i, j| [[4.0, 1.0], [1.0, 3.0]][i][j]);
        let b = vec![1.0, 2.0];
        let mut x = vec![0.0, 0.0];
        let mut solver = CgSolver::new(1e-10, 20);
        let stats = solver.solve(&a, None, &b, &mut x).unwrap();
        let expected = vec![0.09090909090909091, 0.6363636363636364];
        assert!(max_err(&x, &expected) < 1e-8);
        assert!(stats.iterations <= 2);
    }

    #[test]
    fn preconditioned_cg_needs_fewer_iterations() {
        let (a, b, x_true) = tridiag(50, -1.0, 2.5, -1.0);
        let mut plain = CgSolver::new(1e-10, 200);
        let mut x = vec![0.0; 50];
        let s0 = plain.solve(&a, None, &b, &mut x).unwrap();
        assert!(max_err(&x, &x_true) < 1e-6);

        let mut pc = Ilu0::new();
        pc.setup(&a).unwrap();
        let mut x = vec![0.0; 50];
        let s1 = CgSolver::new(1e-10, 200).solve(&a, Some(&pc), &b, &mut x).unwrap();
        assert!(max_err(&x, &x_true) < 1e-6);
        assert!(s1.iterations < s0.iterations);
        assert_eq!(s1.iterations, 1);

        let mut jac = Jacobi::new();
        jac.setup(&a).unwrap();
        let mut x = vec![0.0; 50];
        CgSolver::new(1e-10, 200).solve(&a, Some(&jac), &b, &mut x).unwrap();
        assert!(max_err(&x, &x_true) < 1e-6);
    }

    #[test]
    fn iteration_limit_keeps_partial_solution() {
        let (a, b, _) = tridiag(40, -1.0, 2.0, -1.0);
        let mut x = vec![0.0; 40];
        let err = CgSolver::new(1e-14, 3).solve(&a, None, &b, &mut x).unwrap_err();
        match err {
            KitError::NotConverged { reason, iterations, residual } => {
                assert_eq!(reason, StopReason::MaxIterationsExceeded);
                assert_eq!(iterations, 3);
                assert!(residual > 0.0);
            }
            other => panic!("unexpected {other:?}"),
        }
        assert!(x.iter().any(|&v| v != 0.0));
    }

    #[test]
    fn dimension_mismatch_is_reported() {
        let (a, b, _) = tridiag(4, -1.0, 2.0, -1.0);
        let mut x = vec![0.0; 3];
        assert!(matches!(
            CgSolver::new(1e-8, 10).solve(&a, None, &b, &mut x),
            Err(KitError::DimensionMismatch { .. })
        ));
    }
}
