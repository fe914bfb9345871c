//! Dense vector kernels and the `faer::Mat` operator implementation.
//!
//! The Krylov solvers work on plain slices; everything they need from
//! dense linear algebra (inner products, norms, axpy updates, residuals)
//! lives here so that each solver reads as its recurrence only.
//!
//! # References
//! - [faer crate documentation](https://docs.rs/faer)
//! - [num-traits crate documentation](https://docs.rs/num-traits)

use crate::core::traits::{MatShape, MatVec, check_matvec_dims};
use crate::error::KitError;
use faer::Mat;
use num_traits::Float;

/// Implements matrix-vector multiplication for dense `faer::Mat`.
///
/// Used as the dense reference operator in tests and for small systems.
impl<T: Float> MatVec<T> for Mat<T> {
    fn matvec(&self, x: &[T], y: &mut [T]) -> Result<(), KitError> {
        check_matvec_dims(self, x.len(), y.len())?;
        for (i, yi) in y.iter_mut().enumerate() {
            let mut sum = T::zero();
            for (j, &xj) in x.iter().enumerate() {
                sum = sum + self[(i, j)] * xj;
            }
            *yi = sum;
        }
        Ok(())
    }

    fn trans_matvec(&self, x: &[T], y: &mut [T]) -> Result<(), KitError> {
        check_matvec_dims(self, y.len(), x.len())?;
        for (j, yj) in y.iter_mut().enumerate() {
            let mut sum = T::zero();
            for (i, &xi) in x.iter().enumerate() {
                sum = sum + self[(i, j)] * xi;
            }
            *yj = sum;
        }
        Ok(())
    }
}

impl<T> MatShape for Mat<T> {
    fn nrows(&self) -> usize {
        self.nrows()
    }
    fn ncols(&self) -> usize {
        self.ncols()
    }
}

/// Computes the dot product of two vectors: `x^T y`.
pub fn dot<T: Float>(x: &[T], y: &[T]) -> T {
    debug_assert_eq!(x.len(), y.len(), "Vectors must have the same length");
    x.iter()
        .zip(y)
        .fold(T::zero(), |acc, (&xi, &yi)| acc + xi * yi)
}

/// Computes the Euclidean norm of a vector: `||x||_2`.
pub fn norm2<T: Float>(x: &[T]) -> T {
    dot(x, x).sqrt()
}

/// Overflow-safe Euclidean norm (scaled sum of squares, as in LAPACK `dnrm2`).
pub fn norm2_robust<T: Float>(x: &[T]) -> T {
    let mut scale = T::zero();
    let mut ssq = T::one();
    for &xi in x {
        if xi != T::zero() {
            let absxi = xi.abs();
            if scale < absxi {
                let r = scale / absxi;
                ssq = T::one() + ssq * r * r;
                scale = absxi;
            } else {
                let r = absxi / scale;
                ssq = ssq + r * r;
            }
        }
    }
    scale * ssq.sqrt()
}

/// Sum of absolute values.
pub fn norm1<T: Float>(x: &[T]) -> T {
    x.iter().fold(T::zero(), |acc, &xi| acc + xi.abs())
}

/// Largest absolute value.
pub fn norm_inf<T: Float>(x: &[T]) -> T {
    x.iter().fold(T::zero(), |acc, &xi| acc.max(xi.abs()))
}

/// y ← y + alpha x
pub fn axpy<T: Float>(alpha: T, x: &[T], y: &mut [T]) {
    for (yi, &xi) in y.iter_mut().zip(x) {
        *yi = *yi + alpha * xi;
    }
}

/// y ← x + beta y
pub fn xpby<T: Float>(x: &[T], beta: T, y: &mut [T]) {
    for (yi, &xi) in y.iter_mut().zip(x) {
        *yi = xi + beta * *yi;
    }
}

/// r ← b − A x
pub fn residual<T: Float>(
    a: &dyn MatVec<T>,
    b: &[T],
    x: &[T],
    r: &mut [T],
) -> Result<(), KitError> {
    a.matvec(x, r)?;
    for (ri, &bi) in r.iter_mut().zip(b) {
        *ri = bi - *ri;
    }
    Ok(())
}

/// Lossy conversion used for diagnostics and error payloads.
pub(crate) fn to_f64<T: Float>(v: T) -> f64 {
    v.to_f64().unwrap_or(f64::NAN)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn robust_norm_matches_plain_norm() {
        let x = [3.0, -4.0, 0.0, 12.0];
        assert_abs_diff_eq!(norm2_robust(&x), 13.0, epsilon = 1e-12);
        assert_abs_diff_eq!(norm2(&x), 13.0, epsilon = 1e-12);
    }

    #[test]
    fn robust_norm_survives_huge_values() {
        let x = [1e200, 1e200];
        let n = norm2_robust(&x);
        assert!(n.is_finite());
        assert_abs_diff_eq!(n / 1e200, 2.0f64.sqrt(), epsilon = 1e-12);
    }

    #[test]
    fn dense_matvec_and_transpose() {
        let a = Mat::from_fn(2, 3, |i, j| (i * 3 + j) as f64);
        let x = [1.0, 1.0, 1.0];
        let mut y = [0.0; 2];
        a.matvec(&x, &mut y).unwrap();
        assert_eq!(y, [3.0, 12.0]);
        let mut z = [0.0; 3];
        a.trans_matvec(&[1.0, 1.0], &mut z).unwrap();
        assert_eq!(z, [3.0, 5.0, 7.0]);
        assert!(a.matvec(&[1.0], &mut y).is_err());
    }
}
