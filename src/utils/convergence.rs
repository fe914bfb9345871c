//! Convergence tracking & tolerance checks for iterative solvers.
//!
//! [`IterationMonitor`] is consulted once per iteration with the current
//! residual norm. It only keeps scalar bookkeeping, so it can be swapped
//! between solves; solvers call [`IterationMonitor::reset`] on entry.

use std::fmt;

use crate::core::wrappers::{norm_inf, norm1, norm2, to_f64};
use crate::error::{KitError, StopReason};
use num_traits::Float;
use tracing::{debug, trace, warn};

/// Vector norm used to measure residuals.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum NormKind {
    One,
    #[default]
    Two,
    Infinity,
}

/// Outcome of a converged solve; failures are reported as `NotConverged`.
#[derive(Clone, Debug)]
pub struct SolveStats<T> {
    pub iterations: usize,
    pub final_residual: T,
}

/// Stopping criteria, residual history and an optional per-iteration reporter.
pub struct IterationMonitor<T> {
    /// Maximum number of iterations.
    pub max_iters: usize,
    /// Relative tolerance, measured against the initial residual.
    pub rtol: T,
    /// Absolute tolerance.
    pub atol: T,
    /// Divergence factor: fail once `r > dtol * r0`.
    pub dtol: T,
    pub norm: NormKind,
    initial: T,
    history: Vec<T>,
    reporter: Option<Box<dyn FnMut(usize, T)>>,
}

fn cast<T: Float>(v: f64) -> T {
    num_traits::cast::<f64, T>(v).unwrap_or_else(T::epsilon)
}

impl<T: Float> IterationMonitor<T> {
    /// Relative tolerance `rtol`, iteration limit `max_iters`;
    /// `atol = 1e-50`, `dtol = 1e5`.
    pub fn new(rtol: T, max_iters: usize) -> Self {
        Self {
            max_iters,
            rtol,
            atol: cast(1e-50),
            dtol: cast(1e5),
            norm: NormKind::Two,
            initial: T::zero(),
            history: Vec::new(),
            reporter: None,
        }
    }

    pub fn with_atol(mut self, atol: T) -> Self {
        self.atol = atol;
        self
    }

    pub fn with_dtol(mut self, dtol: T) -> Self {
        self.dtol = dtol;
        self
    }

    pub fn with_norm(mut self, norm: NormKind) -> Self {
        self.norm = norm;
        self
    }

    /// Calls `f(iteration, residual)` on every check.
    pub fn with_reporter<F>(mut self, f: F) -> Self
    where
        F: FnMut(usize, T) + 'static,
    {
        self.reporter = Some(Box::new(f));
        self
    }

    /// Forgets the history of a previous solve.
    pub fn reset(&mut self) {
        self.history.clear();
        self.initial = T::zero();
    }

    /// Iterations performed since the last reset.
    pub fn iterations(&self) -> usize {
        self.history.len().saturating_sub(1)
    }

    /// Residual norms, starting with the initial residual.
    pub fn history(&self) -> &[T] {
        &self.history
    }

    /// Last recorded residual norm.
    pub fn last_residual(&self) -> T {
        self.history.last().copied().unwrap_or_else(T::zero)
    }

    /// Measures `r` in the configured norm.
    pub fn residual_norm(&self, r: &[T]) -> T {
        match self.norm {
            NormKind::One => norm1(r),
            NormKind::Two => norm2(r),
            NormKind::Infinity => norm_inf(r),
        }
    }

    /// Records `r` and decides: `Ok(true)` converged, `Ok(false)` continue.
    ///
    /// The first call after `reset` records the initial residual.
    pub fn check(&mut self, r: T) -> Result<bool, KitError> {
        let k = self.history.len();
        self.history.push(r);
        if let Some(report) = self.reporter.as_mut() {
            report(k, r);
        }
        trace!(iteration = k, residual = to_f64(r), "residual");
        if k == 0 {
            self.initial = r;
        }
        if !r.is_finite() {
            return Err(self.fail(StopReason::Breakdown));
        }
        if r <= (self.rtol * self.initial).max(self.atol) {
            debug!(iterations = k, residual = to_f64(r), "converged");
            return Ok(true);
        }
        if self.initial > T::zero() && r > self.dtol * self.initial {
            return Err(self.fail(StopReason::Diverged));
        }
        if k >= self.max_iters {
            return Err(self.fail(StopReason::MaxIterationsExceeded));
        }
        Ok(false)
    }

    /// Error for a vanished recurrence denominator named `what`.
    pub fn breakdown(&self, what: &str) -> KitError {
        warn!(iterations = self.iterations(), quantity = what, "breakdown");
        self.not_converged(StopReason::Breakdown)
    }

    /// Stats for a converged solve.
    pub fn stats(&self) -> SolveStats<T> {
        SolveStats {
            iterations: self.iterations(),
            final_residual: self.last_residual(),
        }
    }

    fn fail(&self, reason: StopReason) -> KitError {
        warn!(
            iterations = self.iterations(),
            residual = to_f64(self.last_residual()),
            %reason,
            "not converged"
        );
        self.not_converged(reason)
    }

    fn not_converged(&self, reason: StopReason) -> KitError {
        KitError::NotConverged {
            reason,
            residual: to_f64(self.last_residual()),
            iterations: self.iterations(),
        }
    }
}

impl<T: Float + fmt::Debug> fmt::Debug for IterationMonitor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IterationMonitor")
            .field("max_iters", &self.max_iters)
            .field("rtol", &self.rtol)
            .field("atol", &self.atol)
            .field("dtol", &self.dtol)
            .field("norm", &self.norm)
            .field("iterations", &self.iterations())
            .finish()
    }
}

/// Is `d` unusable as a recurrence denominator?
pub(crate) fn vanishes<T: Float>(d: T) -> bool {
    !d.is_finite() || d.abs() <= T::min_positive_value()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converges_relative_to_initial_residual() {
        let mut m = IterationMonitor::new(1e-3, 10);
        assert!(!m.check(1.0).unwrap());
        assert!(!m.check(0.1).unwrap());
        assert!(m.check(1e-4).unwrap());
        assert_eq!(m.iterations(), 2);
        assert_eq!(m.history(), &[1.0, 0.1, 1e-4]);
    }

    #[test]
    fn max_iterations_carries_payload() {
        let mut m = IterationMonitor::new(1e-12, 2);
        m.check(1.0).unwrap();
        m.check(0.5).unwrap();
        match m.check(0.25) {
            Err(KitError::NotConverged { reason, residual, iterations }) => {
                assert_eq!(reason, StopReason::MaxIterationsExceeded);
                assert_eq!(residual, 0.25);
                assert_eq!(iterations, 2);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn divergence_and_nan() {
        let mut m = IterationMonitor::new(1e-8, 100).with_dtol(10.0);
        m.check(1.0).unwrap();
        let err = m.check(20.0).unwrap_err();
        assert_eq!(err.stop_reason(), Some(StopReason::Diverged));
        m.reset();
        m.check(1.0).unwrap();
        let err = m.check(f64::NAN).unwrap_err();
        assert_eq!(err.stop_reason(), Some(StopReason::Breakdown));
    }

    #[test]
    fn zero_initial_residual_is_converged() {
        let mut m = IterationMonitor::new(1e-8, 10);
        assert!(m.check(0.0).unwrap());
        assert_eq!(m.iterations(), 0);
    }

    #[test]
    fn reporter_sees_every_check() {
        use std::cell::RefCell;
        use std::rc::Rc;
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let mut m = IterationMonitor::new(1e-8, 10)
            .with_norm(NormKind::Infinity)
            .with_reporter(move |k, r| sink.borrow_mut().push((k, r)));
        assert_eq!(m.residual_norm(&[1.0, -3.0]), 3.0);
        m.check(3.0).unwrap();
        m.check(1.0).unwrap();
        assert_eq!(*seen.borrow(), vec![(0, 3.0), (1, 1.0)]);
    }
}
