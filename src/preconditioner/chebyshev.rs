//! Spectral bounds for Chebyshev iteration.
//!
//! Chebyshev iteration needs an interval `[λ_min, λ_max]` enclosing the
//! spectrum of the (preconditioned) operator. For calibration and tests the
//! interval is taken from a dense self-adjoint eigendecomposition.

use crate::error::{KitError, check_dim};
use crate::matrix::SparseMatrix;
use faer::{Mat, Side};

/// Extremal eigenvalues `(λ_min, λ_max)` of a symmetric dense matrix.
///
/// Only the lower triangle of `a` is read.
pub fn spectral_bounds(a: &Mat<f64>) -> Result<(f64, f64), KitError> {
    check_dim(a.nrows(), a.ncols())?;
    if a.nrows() == 0 {
        return Err(KitError::InvalidArgument("empty matrix has no spectrum".into()));
    }
    let eigs = a
        .self_adjoint_eigenvalues(Side::Lower)
        .map_err(|e| KitError::InvalidArgument(format!("eigenvalue decomposition failed: {e:?}")))?;
    let lo = eigs.iter().copied().fold(f64::INFINITY, f64::min);
    let hi = eigs.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    Ok((lo, hi))
}

/// [`spectral_bounds`] of the dense copy of a sparse matrix.
pub fn sparse_spectral_bounds(a: &dyn SparseMatrix<f64>) -> Result<(f64, f64), KitError> {
    spectral_bounds(&a.to_dense())
}
