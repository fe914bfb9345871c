//! Preconditioned Richardson iteration: x ← x + ω M⁻¹(b − A x).

use crate::core::traits::MatVec;
use crate::core::wrappers::{axpy, residual};
use crate::error::KitError;
use crate::preconditioner::Preconditioner;
use crate::solver::{LinearSolver, precondition, start};
use crate::utils::convergence::{IterationMonitor, SolveStats};
use num_traits::Float;

pub struct RichardsonSolver<T> {
    /// Damping factor ω
    pub omega: T,
    pub monitor: IterationMonitor<T>,
}

impl<T: Float> RichardsonSolver<T> {
    pub fn new(omega: T, tol: T, max_iters: usize) -> Self {
        Self { omega, monitor: IterationMonitor::new(tol, max_iters) }
    }

    pub fn with_monitor(omega: T, monitor: IterationMonitor<T>) -> Self {
        Self { omega, monitor }
    }
}

impl<T: Float> LinearSolver<T> for RichardsonSolver<T> {
    fn solve(
        &mut self,
        a: &dyn MatVec<T>,
        pc: Option<&dyn Preconditioner<T>>,
        b: &[T],
        x: &mut [T],
    ) -> Result<SolveStats<T>, KitError> {
        let omega = self.omega;
        let mon = &mut self.monitor;
        let mut r = start("richardson", a, b, x, mon)?;
        let mut z = vec![T::zero(); r.len()];
        loop {
            if mon.check(mon.residual_norm(&r))? {
                return Ok(mon.stats());
            }
            precondition(pc, &r, &mut z)?;
            axpy(omega, &z, x);
            residual(a, b, x, &mut r)?;
        }
    }

    fn monitor(&self) -> &IterationMonitor<T> {
        &self.monitor
    }
}
