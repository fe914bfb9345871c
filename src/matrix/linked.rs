// Mutable-structure sparse matrix with row and column adjacency

use std::collections::{BTreeMap, BTreeSet};

use crate::core::traits::{MatShape, MatVec, check_matvec_dims};
use crate::error::{KitError, check_index};
use crate::matrix::{MatrixEntry, SparseMatrix, check_entry};
use faer::Mat;
use num_traits::Float;

/// Sparse matrix whose structure may change at any time.
///
/// Each row is an ordered map column -> value. A per-column set of row
/// indices mirrors the same structure so columns can be walked without a
/// full scan. Entries are addressed by index; no node holds a reference to
/// another.
#[derive(Clone, Debug, PartialEq)]
pub struct LinkedMatrix<T> {
    nrows: usize,
    ncols: usize,
    rows: Vec<BTreeMap<usize, T>>,
    cols: Vec<BTreeSet<usize>>,
}

impl<T: Float> LinkedMatrix<T> {
    pub fn new(nrows: usize, ncols: usize) -> Self {
        Self {
            nrows,
            ncols,
            rows: vec![BTreeMap::new(); nrows],
            cols: vec![BTreeSet::new(); ncols],
        }
    }

    /// Copies the non-zero entries of a dense matrix.
    pub fn from_dense(a: &Mat<T>) -> Self {
        let mut m = Self::new(a.nrows(), a.ncols());
        for i in 0..a.nrows() {
            for j in 0..a.ncols() {
                let v = a[(i, j)];
                if !v.is_zero() {
                    m.insert(i, j, v);
                }
            }
        }
        m
    }

    /// Snapshot of the stored entries of any sparse matrix.
    pub fn from_sparse(a: &dyn SparseMatrix<T>) -> Self {
        let mut m = Self::new(a.nrows(), a.ncols());
        for e in a.entries() {
            let v = m.rows[e.row].get(&e.col).copied().unwrap_or_else(T::zero);
            m.insert(e.row, e.col, v + e.value);
        }
        m
    }

    /// Removes entry (row, col) from the structure, returning its value.
    pub fn remove(&mut self, row: usize, col: usize) -> Result<Option<T>, KitError> {
        check_entry(row, col, self.nrows, self.ncols)?;
        let old = self.rows[row].remove(&col);
        if old.is_some() {
            self.cols[col].remove(&row);
        }
        Ok(old)
    }

    /// Stored entries of row `i`, columns ascending.
    pub fn row(&self, i: usize) -> Result<impl Iterator<Item = (usize, T)> + '_, KitError> {
        check_index(i, self.nrows)?;
        Ok(self.rows[i].iter().map(|(&j, &v)| (j, v)))
    }

    /// Stored entries of column `j`, rows ascending.
    pub fn column(&self, j: usize) -> Result<impl Iterator<Item = (usize, T)> + '_, KitError> {
        check_index(j, self.ncols)?;
        Ok(self.column_entries(j))
    }

    fn column_entries(&self, j: usize) -> impl Iterator<Item = (usize, T)> + '_ {
        self.cols[j].iter().filter_map(move |&i| self.rows[i].get(&j).map(|&v| (i, v)))
    }

    fn insert(&mut self, row: usize, col: usize, value: T) {
        self.rows[row].insert(col, value);
        self.cols[col].insert(row);
    }
}

impl<T> MatShape for LinkedMatrix<T> {
    fn nrows(&self) -> usize {
        self.nrows
    }
    fn ncols(&self) -> usize {
        self.ncols
    }
}

impl<T: Float> MatVec<T> for LinkedMatrix<T> {
    fn matvec(&self, x: &[T], y: &mut [T]) -> Result<(), KitError> {
        check_matvec_dims(self, x.len(), y.len())?;
        for (yi, row) in y.iter_mut().zip(&self.rows) {
            *yi = row.iter().fold(T::zero(), |acc, (&j, &v)| acc + v * x[j]);
        }
        Ok(())
    }

    fn trans_matvec(&self, x: &[T], y: &mut [T]) -> Result<(), KitError> {
        check_matvec_dims(self, y.len(), x.len())?;
        for (j, yj) in y.iter_mut().enumerate() {
            *yj = self.column_entries(j).fold(T::zero(), |acc, (i, v)| acc + v * x[i]);
        }
        Ok(())
    }
}

impl<T: Float> SparseMatrix<T> for LinkedMatrix<T> {
    fn nnz(&self) -> usize {
        self.rows.iter().map(BTreeMap::len).sum()
    }

    fn get(&self, row: usize, col: usize) -> Result<T, KitError> {
        check_entry(row, col, self.nrows, self.ncols)?;
        Ok(self.rows[row].get(&col).copied().unwrap_or_else(T::zero))
    }

    fn set(&mut self, row: usize, col: usize, value: T) -> Result<(), KitError> {
        check_entry(row, col, self.nrows, self.ncols)?;
        self.insert(row, col, value);
        Ok(())
    }

    fn add(&mut self, row: usize, col: usize, value: T) -> Result<(), KitError> {
        let v = self.get(row, col)?;
        self.insert(row, col, v + value);
        Ok(())
    }

    fn entries(&self) -> Box<dyn Iterator<Item = MatrixEntry<T>> + '_> {
        Box::new(
            self.rows
                .iter()
                .enumerate()
                .flat_map(|(i, row)| row.iter().map(move |(&j, &v)| MatrixEntry::new(i, j, v))),
        )
    }

    fn zero(&mut self) {
        for row in &mut self.rows {
            row.values_mut().for_each(|v| *v = T::zero());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_remove_and_walk_columns() {
        let mut a = LinkedMatrix::new(3, 3);
        a.set(2, 0, 4.0).unwrap();
        a.set(0, 0, 1.0).unwrap();
        a.add(0, 0, 1.0).unwrap();
        a.set(1, 2, 5.0).unwrap();
        let col0: Vec<_> = a.column(0).unwrap().collect();
        assert_eq!(col0, vec![(0, 2.0), (2, 4.0)]);
        assert_eq!(a.remove(2, 0).unwrap(), Some(4.0));
        assert_eq!(a.remove(2, 0).unwrap(), None);
        assert_eq!(a.column(0).unwrap().count(), 1);
        assert_eq!(a.get(2, 0).unwrap(), 0.0);
        assert_eq!(a.nnz(), 2);
    }

    #[test]
    fn transpose_product_uses_column_index() {
        let mut a = LinkedMatrix::new(2, 3);
        a.set(0, 1, 2.0).unwrap();
        a.set(1, 1, 3.0).unwrap();
        a.set(1, 2, 1.0).unwrap();
        let mut y = vec![0.0; 3];
        a.trans_matvec(&[1.0, 2.0], &mut y).unwrap();
        assert_eq!(y, vec![0.0, 8.0, 2.0]);
        assert!(a.set(2, 0, 1.0).is_err());
    }
}
