// Flexible compressed row storage: one sparse vector per row

use crate::core::traits::{MatShape, MatVec, check_matvec_dims};
use crate::error::{KitError, check_dim, check_index};
use crate::matrix::{MatrixEntry, SparseMatrix, check_entry};
use crate::vector::SparseVector;
use faer::Mat;
use num_traits::Float;

/// Row-compressed matrix with a dynamic pattern.
///
/// Each row is a [`SparseVector`] that grows on demand, so entries can be
/// inserted anywhere. Overwriting with zero keeps the slot until
/// [`FlexCsrMatrix::compact`] is called.
#[derive(Clone, Debug, PartialEq)]
pub struct FlexCsrMatrix<T> {
    ncols: usize,
    rows: Vec<SparseVector<T>>,
}

impl<T: Float> FlexCsrMatrix<T> {
    pub fn new(nrows: usize, ncols: usize) -> Self {
        Self { ncols, rows: vec![SparseVector::new(ncols); nrows] }
    }

    /// Copies the non-zero entries of a dense matrix.
    pub fn from_dense(a: &Mat<T>) -> Self {
        let rows = (0..a.nrows())
            .map(|i| {
                let row: Vec<T> = (0..a.ncols()).map(|j| a[(i, j)]).collect();
                SparseVector::from_dense(&row)
            })
            .collect();
        Self { ncols: a.ncols(), rows }
    }

    /// Snapshot of the stored entries of any sparse matrix.
    pub fn from_sparse(a: &dyn SparseMatrix<T>) -> Result<Self, KitError> {
        let mut m = Self::new(a.nrows(), a.ncols());
        for e in a.entries() {
            m.rows[e.row].add(e.col, e.value)?;
        }
        Ok(m)
    }

    pub fn row(&self, i: usize) -> Result<&SparseVector<T>, KitError> {
        check_index(i, self.rows.len())?;
        Ok(&self.rows[i])
    }

    pub fn row_mut(&mut self, i: usize) -> Result<&mut SparseVector<T>, KitError> {
        check_index(i, self.rows.len())?;
        Ok(&mut self.rows[i])
    }

    /// Replaces row `i`; the new row must have `ncols` logical entries.
    pub fn set_row(&mut self, i: usize, row: SparseVector<T>) -> Result<(), KitError> {
        check_index(i, self.rows.len())?;
        check_dim(self.ncols, row.size())?;
        self.rows[i] = row;
        Ok(())
    }

    /// Drops stored zeros from every row.
    pub fn compact(&mut self) {
        self.rows.iter_mut().for_each(SparseVector::compact);
    }
}

impl<T> MatShape for FlexCsrMatrix<T> {
    fn nrows(&self) -> usize {
        self.rows.len()
    }
    fn ncols(&self) -> usize {
        self.ncols
    }
}

impl<T: Float> MatVec<T> for FlexCsrMatrix<T> {
    fn matvec(&self, x: &[T], y: &mut [T]) -> Result<(), KitError> {
        check_matvec_dims(self, x.len(), y.len())?;
        for (yi, row) in y.iter_mut().zip(&self.rows) {
            *yi = row.dot_dense(x)?;
        }
        Ok(())
    }

    fn trans_matvec(&self, x: &[T], y: &mut [T]) -> Result<(), KitError> {
        check_matvec_dims(self, y.len(), x.len())?;
        y.iter_mut().for_each(|yj| *yj = T::zero());
        for (&xi, row) in x.iter().zip(&self.rows) {
            for (j, v) in row.iter() {
                y[j] = y[j] + v * xi;
            }
        }
        Ok(())
    }
}

impl<T: Float> SparseMatrix<T> for FlexCsrMatrix<T> {
    fn nnz(&self) -> usize {
        self.rows.iter().map(SparseVector::used).sum()
    }

    fn get(&self, row: usize, col: usize) -> Result<T, KitError> {
        check_entry(row, col, self.rows.len(), self.ncols)?;
        self.rows[row].get(col)
    }

    fn set(&mut self, row: usize, col: usize, value: T) -> Result<(), KitError> {
        check_entry(row, col, self.rows.len(), self.ncols)?;
        self.rows[row].set(col, value)
    }

    fn add(&mut self, row: usize, col: usize, value: T) -> Result<(), KitError> {
        check_entry(row, col, self.rows.len(), self.ncols)?;
        self.rows[row].add(col, value)
    }

    fn entries(&self) -> Box<dyn Iterator<Item = MatrixEntry<T>> + '_> {
        Box::new(
            self.rows
                .iter()
                .enumerate()
                .flat_map(|(i, row)| row.iter().map(move |(j, v)| MatrixEntry::new(i, j, v))),
        )
    }

    fn zero(&mut self) {
        for row in &mut self.rows {
            row.data_mut().iter_mut().for_each(|v| *v = T::zero());
        }
    }
}
