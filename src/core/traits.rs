//! Core linear-algebra traits for sparsekit.

use crate::error::KitError;

/// Shape of a matrix or operator.
pub trait MatShape {
    /// Number of rows.
    fn nrows(&self) -> usize;
    /// Number of columns.
    fn ncols(&self) -> usize;
}

/// Matrix–vector products: y ← A x and y ← Aᵀ x.
///
/// Both products overwrite `y` and fail with `DimensionMismatch` instead of
/// truncating or padding mismatched operands.
pub trait MatVec<T>: MatShape {
    /// Compute y = A · x.
    fn matvec(&self, x: &[T], y: &mut [T]) -> Result<(), KitError>;
    /// Compute y = Aᵀ · x.
    fn trans_matvec(&self, x: &[T], y: &mut [T]) -> Result<(), KitError>;
}

/// Checks `x.len() == ncols` and `y.len() == nrows` for y = A x.
pub(crate) fn check_matvec_dims<M: MatShape + ?Sized>(
    a: &M,
    x_len: usize,
    y_len: usize,
) -> Result<(), KitError> {
    crate::error::check_dim(a.ncols(), x_len)?;
    crate::error::check_dim(a.nrows(), y_len)
}
