//! BiCGStab solver (Saad §7.4.2), right-preconditioned.

use crate::core::traits::MatVec;
use crate::core::wrappers::{axpy, dot};
use crate::error::KitError;
use crate::preconditioner::Preconditioner;
use crate::solver::{LinearSolver, precondition, start};
use crate::utils::convergence::{IterationMonitor, SolveStats, vanishes};
use num_traits::Float;

pub struct BiCgStabSolver<T> {
    pub monitor: IterationMonitor<T>,
}

impl<T: Float> BiCgStabSolver<T> {
    pub fn new(tol: T, max_iters: usize) -> Self {
        Self { monitor: IterationMonitor::new(tol, max_iters) }
    }

    pub fn with_monitor(monitor: IterationMonitor<T>) -> Self {
        Self { monitor }
    }
}

impl<T: Float> LinearSolver<T> for BiCgStabSolver<T> {
    fn solve(
        &mut self,
        a: &dyn MatVec<T>,
        pc: Option<&dyn Preconditioner<T>>,
        b: &[T],
        x: &mut [T],
    ) -> Result<SolveStats<T>, KitError> {
        let mon = &mut self.monitor;
        let mut r = start("bicgstab", a, b, x, mon)?;
        if mon.check(mon.residual_norm(&r))? {
            return Ok(mon.stats());
        }
        let n = r.len();
        let r_hat = r.clone(); // shadow residual
        let mut p = vec![T::zero(); n];
        let mut v = vec![T::zero(); n];
        let mut p_hat = vec![T::zero(); n];
        let mut s_hat = vec![T::zero(); n];
        let mut t = vec![T::zero(); n];
        let (mut rho_old, mut alpha, mut omega) = (T::one(), T::one(), T::one());
        let mut first = true;
        loop {
            let rho = dot(&r_hat, &r);
            if vanishes(rho) {
                return Err(mon.breakdown("rho"));
            }
            if first {
                p.copy_from_slice(&r);
                first = false;
            } else {
                // p = r + beta (p - omega v)
                let beta = (rho / rho_old) * (alpha / omega);
                for ((pi, &ri), &vi) in p.iter_mut().zip(&r).zip(&v) {
                    *pi = ri + beta * (*pi - omega * vi);
                }
            }
            precondition(pc, &p, &mut p_hat)?;
            a.matvec(&p_hat, &mut v)?;
            let rv = dot(&r_hat, &v);
            if vanishes(rv) {
                return Err(mon.breakdown("r^·v"));
            }
            alpha = rho / rv;
            // r becomes s = r - alpha v
            axpy(-alpha, &v, &mut r);
            axpy(alpha, &p_hat, x);

            precondition(pc, &r, &mut s_hat)?;
            a.matvec(&s_hat, &mut t)?;
            let tt = dot(&t, &t);
            if vanishes(tt) {
                // s = 0: the half step already solved the system
                if mon.check(mon.residual_norm(&r))? {
                    return Ok(mon.stats());
                }
                return Err(mon.breakdown("t·t"));
            }
            omega = dot(&t, &r) / tt;
            axpy(omega, &s_hat, x);
            axpy(-omega, &t, &mut r);
            rho_old = rho;
            if mon.check(mon.residual_norm(&r))? {
                return Ok(mon.stats());
            }
            if vanishes(omega) {
                return Err(mon.breakdown("omega"));
            }
        }
    }

    fn monitor(&self) -> &IterationMonitor<T> {
        &self.monitor
    }
}
