//! Conjugate Gradient Squared (Saad §7.4.1), right-preconditioned.

use crate::core::traits::MatVec;
use crate::core::wrappers::{axpy, dot};
use crate::error::KitError;
use crate::preconditioner::Preconditioner;
use crate::solver::{LinearSolver, precondition, start};
use crate::utils::convergence::{IterationMonitor, SolveStats, vanishes};
use num_traits::Float;

pub struct CgsSolver<T> {
    pub monitor: IterationMonitor<T>,
}

impl<T: Float> CgsSolver<T> {
    pub fn new(tol: T, max_iters: usize) -> Self {
        Self { monitor: IterationMonitor::new(tol, max_iters) }
    }

    pub fn with_monitor(monitor: IterationMonitor<T>) -> Self {
        Self { monitor }
    }
}

impl<T: Float> LinearSolver<T> for CgsSolver<T> {
    fn solve(
        &mut self,
        a: &dyn MatVec<T>,
        pc: Option<&dyn Preconditioner<T>>,
        b: &[T],
        x: &mut [T],
    ) -> Result<SolveStats<T>, KitError> {
        let mon = &mut self.monitor;
        let mut r = start("cgs", a, b, x, mon)?;
        if mon.check(mon.residual_norm(&r))? {
            return Ok(mon.stats());
        }
        let n = r.len();
        let r_tld = r.clone();
        let mut u = vec![T::zero(); n];
        let mut p = vec![T::zero(); n];
        let mut q = vec![T::zero(); n];
        let mut p_hat = vec![T::zero(); n];
        let mut v_hat = vec![T::zero(); n];
        let mut u_hat = vec![T::zero(); n];
        let mut q_hat = vec![T::zero(); n];
        let mut rho_old = T::one();
        let mut first = true;
        loop {
            let rho = dot(&r_tld, &r);
            if vanishes(rho) {
                return Err(mon.breakdown("rho"));
            }
            if first {
                u.copy_from_slice(&r);
                p.copy_from_slice(&r);
                first = false;
            } else {
                let beta = rho / rho_old;
                for i in 0..n {
                    u[i] = r[i] + beta * q[i];
                    p[i] = u[i] + beta * (q[i] + beta * p[i]);
                }
            }
            precondition(pc, &p, &mut p_hat)?;
            a.matvec(&p_hat, &mut v_hat)?;
            let sigma = dot(&r_tld, &v_hat);
            if vanishes(sigma) {
                return Err(mon.breakdown("r~·v"));
            }
            let alpha = rho / sigma;
            for i in 0..n {
                q[i] = u[i] - alpha * v_hat[i];
                // u + q, preconditioned below
                v_hat[i] = u[i] + q[i];
            }
            precondition(pc, &v_hat, &mut u_hat)?;
            axpy(alpha, &u_hat, x);
            a.matvec(&u_hat, &mut q_hat)?;
            axpy(-alpha, &q_hat, &mut r);
            rho_old = rho;
            if mon.check(mon.residual_norm(&r))? {
                return Ok(mon.stats());
            }
        }
    }

    fn monitor(&self) -> &IterationMonitor<T> {
        &self.monitor
    }
}
