//! Preconditioners for linear solvers.
//!
//! This module defines the Preconditioner trait and includes the identity,
//! Jacobi, SSOR, ILU(0) and ILUT implementations, plus the spectral-bound
//! helper used to calibrate Chebyshev iteration.
//!
//! A preconditioner factorizes a snapshot of the matrix handed to
//! [`Preconditioner::setup`]; it keeps no reference into that matrix, and
//! later changes to the matrix are only seen after another `setup`.

use crate::error::KitError;
use crate::matrix::SparseMatrix;
use num_traits::Float;

/// A preconditioner M ≈ A.
pub trait Preconditioner<T: Float> {
    /// Factorize (or otherwise prepare) from a snapshot of `a`.
    fn setup(&mut self, a: &dyn SparseMatrix<T>) -> Result<(), KitError>;

    /// Solve M z = r, writing z.
    fn apply(&self, r: &[T], z: &mut [T]) -> Result<(), KitError>;

    /// Solve Mᵀ z = r, writing z. Symmetric preconditioners keep the default.
    fn apply_transpose(&self, r: &[T], z: &mut [T]) -> Result<(), KitError> {
        self.apply(r, z)
    }

    /// Solve M z = z, overwriting the right-hand side with the result.
    fn apply_in_place(&self, z: &mut [T]) -> Result<(), KitError> {
        let r = z.to_vec();
        self.apply(&r, z)
    }
}

// Submodules for various preconditioners
pub mod chebyshev;
pub mod identity;
pub mod ilu;
pub mod ilut;
pub mod jacobi;
pub mod ssor;

// Re-exports for convenience
pub use chebyshev::{sparse_spectral_bounds, spectral_bounds};
pub use identity::Identity;
pub use ilu::Ilu0;
pub use ilut::Ilut;
pub use jacobi::Jacobi;
pub use ssor::Ssor;

/// Forward substitution with a unit lower factor stored row-wise
/// (entries left of `diag[i]` in row `i`).
pub(crate) fn unit_lower_solve<T: Float>(
    row_ptr: &[usize],
    col_idx: &[usize],
    values: &[T],
    diag: &[usize],
    z: &mut [T],
) {
    for i in 0..z.len() {
        let mut sum = z[i];
        for k in row_ptr[i]..diag[i] {
            sum = sum - values[k] * z[col_idx[k]];
        }
        z[i] = sum;
    }
}

/// Backward substitution with an upper factor stored row-wise
/// (entries from `diag[i]` to the end of row `i`).
pub(crate) fn upper_solve<T: Float>(
    row_ptr: &[usize],
    col_idx: &[usize],
    values: &[T],
    diag: &[usize],
    z: &mut [T],
) {
    for i in (0..z.len()).rev() {
        let mut sum = z[i];
        for k in diag[i] + 1..row_ptr[i + 1] {
            sum = sum - values[k] * z[col_idx[k]];
        }
        z[i] = sum / values[diag[i]];
    }
}

/// Solves Uᵀ w = z in place (column sweep over the row-stored upper factor).
pub(crate) fn upper_transpose_solve<T: Float>(
    row_ptr: &[usize],
    col_idx: &[usize],
    values: &[T],
    diag: &[usize],
    z: &mut [T],
) {
    for i in 0..z.len() {
        z[i] = z[i] / values[diag[i]];
        let zi = z[i];
        for k in diag[i] + 1..row_ptr[i + 1] {
            z[col_idx[k]] = z[col_idx[k]] - values[k] * zi;
        }
    }
}

/// Solves Lᵀ w = z in place for the unit lower factor.
pub(crate) fn unit_lower_transpose_solve<T: Float>(
    row_ptr: &[usize],
    col_idx: &[usize],
    values: &[T],
    diag: &[usize],
    z: &mut [T],
) {
    for i in (0..z.len()).rev() {
        let zi = z[i];
        for k in row_ptr[i]..diag[i] {
            z[col_idx[k]] = z[col_idx[k]] - values[k] * zi;
        }
    }
}
