// Compressed sparse column storage with a fixed pattern

use crate::core::traits::{MatShape, MatVec, check_matvec_dims};
use crate::error::{KitError, check_index};
use crate::matrix::{CsrMatrix, MatrixEntry, SparseMatrix, check_entry, dense};
use faer::Mat;
use num_traits::Float;

/// Compressed sparse column matrix.
///
/// Stored as the row-compressed transpose, so a column of `A` is a row of
/// the inner matrix. Row indices inside each column are strictly
/// increasing and the pattern is fixed at construction.
#[derive(Clone, Debug, PartialEq)]
pub struct CscMatrix<T> {
    t: CsrMatrix<T>,
}

impl<T: Float> CscMatrix<T> {
    /// Zero-valued matrix over the given per-column row lists.
    pub fn from_pattern(nrows: usize, ncols: usize, pattern: &[Vec<usize>]) -> Result<Self, KitError> {
        Ok(Self { t: CsrMatrix::from_pattern(ncols, nrows, pattern)? })
    }

    /// Build a CSC from raw col-ptr, row-idx, and values.
    pub fn from_csc(
        nrows: usize,
        ncols: usize,
        col_ptr: Vec<usize>,
        row_idx: Vec<usize>,
        values: Vec<T>,
    ) -> Result<Self, KitError> {
        Ok(Self { t: CsrMatrix::from_csr(ncols, nrows, col_ptr, row_idx, values)? })
    }

    /// Copies the non-zero entries of a dense matrix.
    pub fn from_dense(a: &Mat<T>) -> Self {
        let pattern = dense::col_pattern(a);
        let mut t = CsrMatrix::empty_with_pattern(a.ncols(), a.nrows(), &pattern);
        let values = t.values_mut();
        let mut k = 0;
        for (j, rows) in pattern.iter().enumerate() {
            for &i in rows {
                values[k] = a[(i, j)];
                k += 1;
            }
        }
        Self { t }
    }

    /// Snapshot of the stored entries of any sparse matrix.
    pub fn from_sparse(a: &dyn SparseMatrix<T>) -> Result<Self, KitError> {
        let triplets: Vec<(usize, usize, T)> = a.entries().map(|e| (e.col, e.row, e.value)).collect();
        Ok(Self { t: CsrMatrix::from_triplets(a.ncols(), a.nrows(), &triplets)? })
    }

    pub fn col_ptr(&self) -> &[usize] {
        self.t.row_ptr()
    }

    pub fn row_idx(&self) -> &[usize] {
        self.t.col_idx()
    }

    pub fn values(&self) -> &[T] {
        self.t.values()
    }

    pub fn values_mut(&mut self) -> &mut [T] {
        self.t.values_mut()
    }

    /// Row indices and values of column `j`.
    pub fn column(&self, j: usize) -> Result<(&[usize], &[T]), KitError> {
        check_index(j, self.ncols())?;
        Ok(self.t.row_slices(j))
    }

    fn slot(&self, row: usize, col: usize) -> Result<usize, KitError> {
        check_entry(row, col, self.nrows(), self.ncols())?;
        self.t
            .position(col, row)
            .ok_or(KitError::StructurallyMissingEntry { row, col })
    }
}

impl<T> MatShape for CscMatrix<T> {
    fn nrows(&self) -> usize {
        self.t.ncols()
    }
    fn ncols(&self) -> usize {
        self.t.nrows()
    }
}

impl<T: Float> MatVec<T> for CscMatrix<T> {
    fn matvec(&self, x: &[T], y: &mut [T]) -> Result<(), KitError> {
        check_matvec_dims(self, x.len(), y.len())?;
        self.t.trans_matvec(x, y)
    }

    fn trans_matvec(&self, x: &[T], y: &mut [T]) -> Result<(), KitError> {
        check_matvec_dims(self, y.len(), x.len())?;
        self.t.matvec(x, y)
    }
}

impl<T: Float> SparseMatrix<T> for CscMatrix<T> {
    fn nnz(&self) -> usize {
        self.t.nnz()
    }

    fn get(&self, row: usize, col: usize) -> Result<T, KitError> {
        check_entry(row, col, self.nrows(), self.ncols())?;
        self.t.get(col, row)
    }

    fn set(&mut self, row: usize, col: usize, value: T) -> Result<(), KitError> {
        let k = self.slot(row, col)?;
        self.t.values_mut()[k] = value;
        Ok(())
    }

    fn add(&mut self, row: usize, col: usize, value: T) -> Result<(), KitError> {
        let k = self.slot(row, col)?;
        let v = &mut self.t.values_mut()[k];
        *v = *v + value;
        Ok(())
    }

    /// Column-major traversal.
    fn entries(&self) -> Box<dyn Iterator<Item = MatrixEntry<T>> + '_> {
        Box::new(self.t.entries().map(|e| MatrixEntry::new(e.col, e.row, e.value)))
    }

    fn zero(&mut self) {
        self.t.zero();
    }
}
