//! Chebyshev iteration (Saad §12.3; Gutknecht & Röllin 2002).
//!
//! Needs an interval `[eig_min, eig_max]`, `0 < eig_min <= eig_max`,
//! enclosing the spectrum of M⁻¹A. The recurrence coefficients depend only
//! on that interval, so no inner products are formed besides the residual
//! norm handed to the monitor.

use crate::core::traits::MatVec;
use crate::core::wrappers::{axpy, to_f64};
use crate::error::KitError;
use crate::preconditioner::Preconditioner;
use crate::solver::{LinearSolver, precondition, start};
use crate::utils::convergence::{IterationMonitor, SolveStats};
use num_traits::Float;

pub struct ChebyshevSolver<T> {
    pub eig_min: T,
    pub eig_max: T,
    pub monitor: IterationMonitor<T>,
}

impl<T: Float> ChebyshevSolver<T> {
    pub fn new(eig_min: T, eig_max: T, tol: T, max_iters: usize) -> Self {
        Self { eig_min, eig_max, monitor: IterationMonitor::new(tol, max_iters) }
    }

    pub fn with_monitor(eig_min: T, eig_max: T, monitor: IterationMonitor<T>) -> Self {
        Self { eig_min, eig_max, monitor }
    }
}

impl<T: Float> LinearSolver<T> for ChebyshevSolver<T> {
    fn solve(
        &mut self,
        a: &dyn MatVec<T>,
        pc: Option<&dyn Preconditioner<T>>,
        b: &[T],
        x: &mut [T],
    ) -> Result<SolveStats<T>, KitError> {
        let (lo, hi) = (self.eig_min, self.eig_max);
        if !(lo > T::zero() && hi >= lo && hi.is_finite()) {
            return Err(KitError::InvalidArgument(format!(
                "Chebyshev needs 0 < eig_min <= eig_max, got [{}, {}]",
                to_f64(lo),
                to_f64(hi)
            )));
        }
        let mon = &mut self.monitor;
        let mut r = start("chebyshev", a, b, x, mon)?;
        if mon.check(mon.residual_norm(&r))? {
            return Ok(mon.stats());
        }
        let n = r.len();
        let two = T::one() + T::one();
        // center and half-width of the interval
        let theta = (hi + lo) / two;
        let delta = (hi - lo) / two;
        let sigma = theta / delta;
        let mut rho = delta / theta;

        let mut z = vec![T::zero(); n];
        let mut q = vec![T::zero(); n];
        precondition(pc, &r, &mut z)?;
        let mut d: Vec<T> = z.iter().map(|&zi| zi / theta).collect();
        loop {
            axpy(T::one(), &d, x);
            a.matvec(&d, &mut q)?;
            axpy(-T::one(), &q, &mut r);
            if mon.check(mon.residual_norm(&r))? {
                return Ok(mon.stats());
            }
            precondition(pc, &r, &mut z)?;
            if delta.is_zero() {
                // one-point spectrum: plain scaled Richardson
                for (di, &zi) in d.iter_mut().zip(&z) {
                    *di = zi / theta;
                }
            } else {
                let rho_new = T::one() / (two * sigma - rho);
                let (c_d, c_z) = (rho_new * rho, two * rho_new / delta);
                for (di, &zi) in d.iter_mut().zip(&z) {
                    *di = c_d * *di + c_z * zi;
                }
                rho = rho_new;
            }
        }
    }

    fn monitor(&self) -> &IterationMonitor<T> {
        &self.monitor
    }
}
