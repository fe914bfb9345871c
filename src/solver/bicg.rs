//! BiConjugate Gradient (Saad §7.3.1).
//!
//! Needs products with Aᵀ and, when preconditioned, applications of M⁻ᵀ.

use crate::core::traits::MatVec;
use crate::core::wrappers::{axpy, dot, xpby};
use crate::error::KitError;
use crate::preconditioner::Preconditioner;
use crate::solver::{LinearSolver, precondition, precondition_transpose, start};
use crate::utils::convergence::{IterationMonitor, SolveStats, vanishes};
use num_traits::Float;

pub struct BiCgSolver<T> {
    pub monitor: IterationMonitor<T>,
}

impl<T: Float> BiCgSolver<T> {
    pub fn new(tol: T, max_iters: usize) -> Self {
        Self { monitor: IterationMonitor::new(tol, max_iters) }
    }

    pub fn with_monitor(monitor: IterationMonitor<T>) -> Self {
        Self { monitor }
    }
}

impl<T: Float> LinearSolver<T> for BiCgSolver<T> {
    fn solve(
        &mut self,
        a: &dyn MatVec<T>,
        pc: Option<&dyn Preconditioner<T>>,
        b: &[T],
        x: &mut [T],
    ) -> Result<SolveStats<T>, KitError> {
        let mon = &mut self.monitor;
        let mut r = start("bicg", a, b, x, mon)?;
        if mon.check(mon.residual_norm(&r))? {
            return Ok(mon.stats());
        }
        let n = r.len();
        let mut r_tld = r.clone();
        let mut z = vec![T::zero(); n];
        let mut z_tld = vec![T::zero(); n];
        let mut p = vec![T::zero(); n];
        let mut p_tld = vec![T::zero(); n];
        let mut q = vec![T::zero(); n];
        let mut q_tld = vec![T::zero(); n];
        let mut rho_old = T::one();
        let mut first = true;
        loop {
            precondition(pc, &r, &mut z)?;
            precondition_transpose(pc, &r_tld, &mut z_tld)?;
            let rho = dot(&z, &r_tld);
            if vanishes(rho) {
                return Err(mon.breakdown("rho"));
            }
            if first {
                p.copy_from_slice(&z);
                p_tld.copy_from_slice(&z_tld);
                first = false;
            } else {
                let beta = rho / rho_old;
                xpby(&z, beta, &mut p);
                xpby(&z_tld, beta, &mut p_tld);
            }
            a.matvec(&p, &mut q)?;
            a.trans_matvec(&p_tld, &mut q_tld)?;
            let denom = dot(&p_tld, &q);
            if vanishes(denom) {
                return Err(mon.breakdown("p~·Ap"));
            }
            let alpha = rho / denom;
            axpy(alpha, &p, x);
            axpy(-alpha, &q, &mut r);
            axpy(-alpha, &q_tld, &mut r_tld);
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
