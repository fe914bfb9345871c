//! Matrix module: sparse storage formats and the `SparseMatrix` trait.
//!
//! Every format shares one contract: an entry that is not stored reads as
//! exactly zero. They differ in how much the structure may change after
//! construction:
//!
//! | format          | structure                                    |
//! |-----------------|----------------------------------------------|
//! | [`CsrMatrix`]   | fixed row pattern                            |
//! | [`CscMatrix`]   | fixed column pattern                         |
//! | [`DiagMatrix`]  | set of diagonals, grows by whole diagonals   |
//! | [`LinkedMatrix`]| fully mutable, row and column adjacency      |
//! | [`FlexCsrMatrix`]| fully mutable, one sparse vector per row    |

use crate::core::traits::MatVec;
use crate::error::KitError;
use faer::Mat;
use num_traits::Float;

pub mod csc;
pub mod csr;
pub mod dense;
pub mod diag;
pub mod flex;
pub mod linked;

pub use csc::CscMatrix;
pub use csr::CsrMatrix;
pub use diag::DiagMatrix;
pub use flex::FlexCsrMatrix;
pub use linked::LinkedMatrix;

/// One stored entry produced by [`SparseMatrix::entries`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MatrixEntry<T> {
    pub row: usize,
    pub col: usize,
    pub value: T,
}

impl<T> MatrixEntry<T> {
    pub fn new(row: usize, col: usize, value: T) -> Self {
        Self { row, col, value }
    }
}

/// A sparse matrix supporting element access, iteration and y = A * x.
pub trait SparseMatrix<T: Float>: MatVec<T> {
    /// Number of stored entries (stored zeros included).
    fn nnz(&self) -> usize;

    /// Entry (row, col); zero when not stored.
    fn get(&self, row: usize, col: usize) -> Result<T, KitError>;

    /// Overwrites entry (row, col).
    fn set(&mut self, row: usize, col: usize, value: T) -> Result<(), KitError>;

    /// Accumulates into entry (row, col).
    fn add(&mut self, row: usize, col: usize, value: T) -> Result<(), KitError>;

    /// Stored entries in the format's traversal order.
    fn entries(&self) -> Box<dyn Iterator<Item = MatrixEntry<T>> + '_>;

    /// Sets every stored value to zero, keeping the structure.
    fn zero(&mut self);

    /// Dense copy of the matrix.
    fn to_dense(&self) -> Mat<T> {
        dense::entries_to_dense(self.nrows(), self.ncols(), self.entries())
    }
}

/// Rejects (row, col) outside an `nrows x ncols` matrix.
pub(crate) fn check_entry(row: usize, col: usize, nrows: usize, ncols: usize) -> Result<(), KitError> {
    crate::error::check_index(row, nrows)?;
    crate::error::check_index(col, ncols)
}

/// Validates per-row (or per-column) index lists: strictly increasing and below `bound`.
pub(crate) fn check_pattern(pattern: &[Vec<usize>], bound: usize) -> Result<(), KitError> {
    for (i, list) in pattern.iter().enumerate() {
        for (k, &j) in list.iter().enumerate() {
            crate::error::check_index(j, bound)?;
            if k > 0 && list[k - 1] >= j {
                return Err(KitError::InvalidArgument(format!(
                    "pattern list {i} is not strictly increasing at position {k}"
                )));
            }
        }
    }
    Ok(())
}
