// Compressed diagonal storage

use crate::core::traits::{MatShape, MatVec, check_matvec_dims};
use crate::error::KitError;
use crate::matrix::{MatrixEntry, SparseMatrix, check_entry};
use faer::Mat;
use num_traits::Float;

/// Compressed diagonal matrix.
///
/// The pattern is a sorted set of diagonal offsets `k = col - row`; each
/// stored diagonal holds every position it crosses. Writing to a position
/// on a diagonal that is not stored yet adds that whole diagonal.
#[derive(Clone, Debug, PartialEq)]
pub struct DiagMatrix<T> {
    nrows: usize,
    ncols: usize,
    offsets: Vec<isize>,
    diags: Vec<Vec<T>>,
}

impl<T: Float> DiagMatrix<T> {
    /// Empty matrix; no diagonal is stored.
    pub fn new(nrows: usize, ncols: usize) -> Self {
        Self { nrows, ncols, offsets: Vec::new(), diags: Vec::new() }
    }

    /// Zero-valued matrix with the given diagonals.
    pub fn from_offsets(nrows: usize, ncols: usize, offsets: &[isize]) -> Result<Self, KitError> {
        let mut m = Self::new(nrows, ncols);
        for &k in offsets {
            m.check_offset(k)?;
            m.diagonal_position(k);
        }
        Ok(m)
    }

    /// Copies the non-zero entries of a dense matrix.
    pub fn from_dense(a: &Mat<T>) -> Self {
        let mut m = Self::new(a.nrows(), a.ncols());
        for i in 0..a.nrows() {
            for j in 0..a.ncols() {
                let v = a[(i, j)];
                if !v.is_zero() {
                    let d = m.diagonal_position(j as isize - i as isize);
                    m.diags[d][i.min(j)] = v;
                }
            }
        }
        m
    }

    /// Snapshot of the stored entries of any sparse matrix.
    pub fn from_sparse(a: &dyn SparseMatrix<T>) -> Self {
        let mut m = Self::new(a.nrows(), a.ncols());
        for e in a.entries() {
            let d = m.diagonal_position(e.col as isize - e.row as isize);
            let p = e.row.min(e.col);
            m.diags[d][p] = m.diags[d][p] + e.value;
        }
        m
    }

    /// Stored diagonal offsets, ascending.
    pub fn offsets(&self) -> &[isize] {
        &self.offsets
    }

    /// Values of the diagonal with offset `k`, if stored.
    pub fn diagonal(&self, k: isize) -> Option<&[T]> {
        self.offsets
            .binary_search(&k)
            .ok()
            .map(|d| self.diags[d].as_slice())
    }

    fn check_offset(&self, k: isize) -> Result<(), KitError> {
        if k <= -(self.nrows as isize) || k >= self.ncols as isize {
            return Err(KitError::InvalidArgument(format!(
                "diagonal offset {k} lies outside a {}x{} matrix",
                self.nrows, self.ncols
            )));
        }
        Ok(())
    }

    fn diagonal_len(&self, k: isize) -> usize {
        if k >= 0 {
            self.nrows.min(self.ncols - k as usize)
        } else {
            (self.nrows - k.unsigned_abs()).min(self.ncols)
        }
    }

    /// Index of diagonal `k` in storage, inserting it when absent.
    fn diagonal_position(&mut self, k: isize) -> usize {
        match self.offsets.binary_search(&k) {
            Ok(d) => d,
            Err(d) => {
                let len = self.diagonal_len(k);
                self.offsets.insert(d, k);
                self.diags.insert(d, vec![T::zero(); len]);
                d
            }
        }
    }
}

impl<T> MatShape for DiagMatrix<T> {
    fn nrows(&self) -> usize {
        self.nrows
    }
    fn ncols(&self) -> usize {
        self.ncols
    }
}

impl<T: Float> MatVec<T> for DiagMatrix<T> {
    fn matvec(&self, x: &[T], y: &mut [T]) -> Result<(), KitError> {
        check_matvec_dims(self, x.len(), y.len())?;
        y.iter_mut().for_each(|yi| *yi = T::zero());
        for (&k, diag) in self.offsets.iter().zip(&self.diags) {
            let (row0, col0) = if k >= 0 { (0, k as usize) } else { (k.unsigned_abs(), 0) };
            for (p, &v) in diag.iter().enumerate() {
                y[row0 + p] = y[row0 + p] + v * x[col0 + p];
            }
        }
        Ok(())
    }

    fn trans_matvec(&self, x: &[T], y: &mut [T]) -> Result<(), KitError> {
        check_matvec_dims(self, y.len(), x.len())?;
        y.iter_mut().for_each(|yj| *yj = T::zero());
        for (&k, diag) in self.offsets.iter().zip(&self.diags) {
            let (row0, col0) = if k >= 0 { (0, k as usize) } else { (k.unsigned_abs(), 0) };
            for (p, &v) in diag.iter().enumerate() {
                y[col0 + p] = y[col0 + p] + v * x[row0 + p];
            }
        }
        Ok(())
    }
}

impl<T: Float> SparseMatrix<T> for DiagMatrix<T> {
    fn nnz(&self) -> usize {
        self.diags.iter().map(Vec::len).sum()
    }

    fn get(&self, row: usize, col: usize) -> Result<T, KitError> {
        check_entry(row, col, self.nrows, self.ncols)?;
        let k = col as isize - row as isize;
        Ok(self.diagonal(k).map_or(T::zero(), |d| d[row.min(col)]))
    }

    fn set(&mut self, row: usize, col: usize, value: T) -> Result<(), KitError> {
        check_entry(row, col, self.nrows, self.ncols)?;
        let d = self.diagonal_position(col as isize - row as isize);
        self.diags[d][row.min(col)] = value;
        Ok(())
    }

    fn add(&mut self, row: usize, col: usize, value: T) -> Result<(), KitError> {
        check_entry(row, col, self.nrows, self.ncols)?;
        let d = self.diagonal_position(col as isize - row as isize);
        let v = &mut self.diags[d][row.min(col)];
        *v = *v + value;
        Ok(())
    }

    /// Row-major traversal, columns ascending within a row.
    fn entries(&self) -> Box<dyn Iterator<Item = MatrixEntry<T>> + '_> {
        Box::new((0..self.nrows).flat_map(move |i| {
            self.offsets
                .iter()
                .zip(&self.diags)
                .filter_map(move |(&k, diag)| {
                    let j = i as isize + k;
                    if j < 0 || j >= self.ncols as isize {
                        return None;
                    }
                    let j = j as usize;
                    Some(MatrixEntry::new(i, j, diag[i.min(j)]))
                })
        }))
    }

    fn zero(&mut self) {
        for d in &mut self.diags {
            d.iter_mut().for_each(|v| *v = T::zero());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn structure_grows_by_diagonal() {
        let mut a = DiagMatrix::<f64>::from_offsets(4, 4, &[0]).unwrap();
        assert_eq!(a.nnz(), 4);
        a.set(3, 1, 2.0).unwrap();
        assert_eq!(a.offsets(), &[-2, 0]);
        assert_eq!(a.nnz(), 6);
        assert_eq!(a.get(3, 1).unwrap(), 2.0);
        assert_eq!(a.get(0, 3).unwrap(), 0.0);
    }

    #[test]
    fn rectangular_matvec() {
        // [[1,2,0],[0,3,4]]
        let mut a = DiagMatrix::new(2, 3);
        a.set(0, 0, 1.0).unwrap();
        a.set(1, 1, 3.0).unwrap();
        a.set(0, 1, 2.0).unwrap();
        a.set(1, 2, 4.0).unwrap();
        let mut y = vec![0.0; 2];
        a.matvec(&[1.0, 1.0, 1.0], &mut y).unwrap();
        assert_eq!(y, vec![3.0, 7.0]);
        let order: Vec<_> = a.entries().map(|e| (e.row, e.col)).collect();
        assert_eq!(order, vec![(0, 0), (0, 1), (1, 1), (1, 2)]);
    }

    #[test]
    fn invalid_offset_is_rejected() {
        assert!(DiagMatrix::<f64>::from_offsets(3, 3, &[3]).is_err());
        assert!(DiagMatrix::<f64>::from_offsets(3, 3, &[-3]).is_err());
    }
}
