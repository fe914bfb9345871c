//! Restarted GMRES(m) with left preconditioning (Saad §6.5, §9.3.1).
//!
//! The Arnoldi basis is orthogonalized with modified Gram-Schmidt and the
//! Hessenberg least-squares problem is kept triangular with Givens
//! rotations, so the residual estimate `|g[j+1]|` is available at every
//! step without forming x. The monitored quantity is the 2-norm of the
//! preconditioned residual M⁻¹(b − A x).

use crate::core::traits::MatVec;
use crate::core::wrappers::{axpy, dot, norm2, residual};
use crate::error::KitError;
use crate::preconditioner::Preconditioner;
use crate::solver::{LinearSolver, precondition, start};
use crate::utils::convergence::{IterationMonitor, SolveStats, vanishes};
use num_traits::Float;
use tracing::{trace, warn};

/// GMRES solver with a fixed restart length.
pub struct GmresSolver<T> {
    /// Number of Arnoldi vectors before restart
    pub restart: usize,
    pub monitor: IterationMonitor<T>,
}

impl<T: Float> GmresSolver<T> {
    pub fn new(restart: usize, tol: T, max_iters: usize) -> Self {
        Self { restart, monitor: IterationMonitor::new(tol, max_iters) }
    }

    pub fn with_monitor(restart: usize, monitor: IterationMonitor<T>) -> Self {
        Self { restart, monitor }
    }
}

/// Rotation `(c, s)` zeroing `b` in `[a; b]`.
fn givens<T: Float>(a: T, b: T) -> (T, T) {
    let r = a.hypot(b);
    if r.is_zero() {
        (T::one(), T::zero())
    } else {
        (a / r, b / r)
    }
}

/// Solves the leading `k`×`k` triangle of `h` against `g` and adds
/// `V y` to `x`. Returns `false` on a vanishing diagonal.
fn update_solution<T: Float>(h: &[Vec<T>], g: &[T], v: &[Vec<T>], k: usize, x: &mut [T]) -> bool {
    let mut y = g[..k].to_vec();
    for i in (0..k).rev() {
        for j in i + 1..k {
            y[i] = y[i] - h[i][j] * y[j];
        }
        if vanishes(h[i][i]) {
            return false;
        }
        y[i] = y[i] / h[i][i];
    }
    for (yi, vi) in y.iter().zip(v) {
        axpy(*yi, vi, x);
    }
    true
}

impl<T: Float> LinearSolver<T> for GmresSolver<T> {
    fn solve(
        &mut self,
        a: &dyn MatVec<T>,
        pc: Option<&dyn Preconditioner<T>>,
        b: &[T],
        x: &mut [T],
    ) -> Result<SolveStats<T>, KitError> {
        if self.restart == 0 {
            return Err(KitError::InvalidArgument("GMRES restart must be positive".into()));
        }
        let m = self.restart;
        let mon = &mut self.monitor;
        let mut r = start("gmres", a, b, x, mon)?;
        let n = r.len();
        let mut z = vec![T::zero(); n];
        precondition(pc, &r, &mut z)?;
        let mut beta = norm2(&z);
        if mon.check(beta)? {
            return Ok(mon.stats());
        }

        let mut h = vec![vec![T::zero(); m]; m + 1];
        let mut cs = vec![T::zero(); m];
        let mut sn = vec![T::zero(); m];
        let mut g = vec![T::zero(); m + 1];
        let mut v: Vec<Vec<T>> = Vec::with_capacity(m + 1);
        let mut w = vec![T::zero(); n];
        loop {
            v.clear();
            v.push(z.iter().map(|&zi| zi / beta).collect());
            g.iter_mut().for_each(|gi| *gi = T::zero());
            g[0] = beta;
            let mut k = 0;
            let mut converged = false;
            for j in 0..m {
                a.matvec(&v[j], &mut r)?;
                precondition(pc, &r, &mut w)?;
                for i in 0..=j {
                    h[i][j] = dot(&w, &v[i]);
                    axpy(-h[i][j], &v[i], &mut w);
                }
                let hn = norm2(&w);
                h[j + 1][j] = hn;
                for i in 0..j {
                    let t = cs[i] * h[i][j] + sn[i] * h[i + 1][j];
                    h[i + 1][j] = -sn[i] * h[i][j] + cs[i] * h[i + 1][j];
                    h[i][j] = t;
                }
                let (c, s) = givens(h[j][j], h[j + 1][j]);
                cs[j] = c;
                sn[j] = s;
                h[j][j] = c * h[j][j] + s * h[j + 1][j];
                h[j + 1][j] = T::zero();
                g[j + 1] = -s * g[j];
                g[j] = c * g[j];
                k = j + 1;

                match mon.check(g[j + 1].abs()) {
                    Ok(done) => converged = done,
                    Err(e) => {
                        if !update_solution(&h, &g, &v, k, x) {
                            warn!(
                                iterations = mon.iterations(),
                                "vanishing Hessenberg diagonal, last cycle not applied to x"
                            );
                        }
                        return Err(e);
                    }
                }
                if converged || hn <= T::epsilon() * beta {
                    break;
                }
                v.push(w.iter().map(|&wi| wi / hn).collect());
            }
            if !update_solution(&h, &g, &v, k, x) {
                return Err(mon.breakdown("Hessenberg diagonal"));
            }
            if converged {
                return Ok(mon.stats());
            }

            residual(a, b, x, &mut r)?;
            precondition(pc, &r, &mut z)?;
            beta = norm2(&z);
            trace!(iterations = mon.iterations(), "GMRES restart");
            if beta.is_zero() {
                mon.check(beta)?;
                return Ok(mon.stats());
            }
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
    use crate::preconditioner::{Ilu0, Ilut};
    use crate::solver::test_support::{max_err, tridiag};
    use faer::Mat;

    #[test]
    fn gmres_solves_small_dense() {
        let a = Mat::from_fn(3, 3, |i, j| [[4.0, 1.0, 0.0], [1.0, 3.0, 1.0], [0.0, 1.0, 2.0]][i][j]);
        let b = vec![1.0, 2.0, 3.0];
        let mut x = vec![0.0; 3];
        let stats = GmresSolver::new(3, 1e-12, 20).solve(&a, None, &b, &mut x).unwrap();
        assert!(stats.iterations <= 3);
        let mut ax = vec![0.0; 3];
        a.matvec(&x, &mut ax).unwrap();
        assert!(max_err(&ax, &b) < 1e-10);
    }

    #[test]
    fn restarted_gmres_converges() {
        let (a, b, x_true) = tridiag(60, -1.3, 3.0, -0.7);
        let mut x = vec![0.0; 60];
        let mut solver = GmresSolver::new(5, 1e-11, 500);
        let stats = solver.solve(&a, None, &b, &mut x).unwrap();
        assert!(stats.iterations > 5, "should have restarted");
        assert!(max_err(&x, &x_true) < 1e-7);
        assert_eq!(solver.monitor().history().len(), stats.iterations + 1);
    }

    #[test]
    fn ilu_preconditioned_gmres() {
        let (a, b, x_true) = tridiag(60, -1.3, 3.0, -0.7);
        let mut ilu = Ilu0::new();
        ilu.setup(&a).unwrap();
        let mut x = vec![0.0; 60];
        let stats = GmresSolver::new(10, 1e-10, 100).solve(&a, Some(&ilu), &b, &mut x).unwrap();
        assert_eq!(stats.iterations, 1);
        assert!(max_err(&x, &x_true) < 1e-8);

        let mut ilut = Ilut::new(2, 1e-4);
        ilut.setup(&a).unwrap();
        let mut x = vec![0.0; 60];
        GmresSolver::new(10, 1e-10, 100).solve(&a, Some(&ilut), &b, &mut x).unwrap();
        assert!(max_err(&x, &x_true) < 1e-7);
    }

    #[test]
    fn iteration_limit_updates_partial_solution() {
        let (a, b, _) = tridiag(60, -1.0, 2.0, -1.0);
        let mut x = vec![0.0; 60];
        let err = GmresSolver::new(20, 1e-14, 4).solve(&a, None, &b, &mut x).unwrap_err();
        assert_eq!(err.stop_reason(), Some(StopReason::MaxIterationsExceeded));
        assert!(x.iter().any(|&v| v != 0.0));
    }

    #[test]
    fn singular_triangle_leaves_solution_untouched() {
        let v = vec![vec![1.0, 0.0], vec![0.0, 1.0]];
        let g = [3.0, 4.0, 0.0];
        let mut x = vec![1.0, 1.0];

        let singular = vec![vec![2.0, 1.0], vec![0.0, 0.0], vec![0.0, 0.0]];
        assert!(!update_solution(&singular, &g, &v, 2, &mut x));
        assert_eq!(x, vec![1.0, 1.0]);

        // [[2, 1], [0, 4]] y = (3, 4) gives y = (1, 1)
        let upper = vec![vec![2.0, 1.0], vec![0.0, 4.0], vec![0.0, 0.0]];
        assert!(update_solution(&upper, &g, &v, 2, &mut x));
        assert_eq!(x, vec![2.0, 2.0]);
    }

    #[test]
    fn zero_operator_is_breakdown() {
        let a = Mat::<f64>::zeros(2, 2);
        let mut x = vec![0.0; 2];
        let err = GmresSolver::new(2, 1e-10, 10).solve(&a, None, &[1.0, 0.0], &mut x).unwrap_err();
        assert_eq!(err.stop_reason(), Some(StopReason::Breakdown));
        assert_eq!(x, vec![0.0, 0.0]);
    }

    #[test]
    fn zero_restart_is_invalid() {
        let (a, b, _) = tridiag(3, -1.0, 2.0, -1.0);
        let mut x = vec![0.0; 3];
        assert!(matches!(
            GmresSolver::new(0, 1e-8, 10).solve(&a, None, &b, &mut x),
            Err(KitError::InvalidArgument(_))
        ));
    }
}
