// Compressed sparse row storage with a fixed pattern

use crate::core::traits::{MatShape, MatVec, check_matvec_dims};
use crate::error::{KitError, check_dim, check_index};
use crate::matrix::{MatrixEntry, SparseMatrix, check_entry, check_pattern, dense};
use faer::Mat;
use num_traits::Float;

/// Compressed sparse row matrix.
///
/// The non-zero pattern is declared at construction. Column indices inside
/// each row are strictly increasing; `set`/`add` outside the pattern fail
/// with `StructurallyMissingEntry`.
#[derive(Clone, Debug, PartialEq)]
pub struct CsrMatrix<T> {
    nrows: usize,
    ncols: usize,
    row_ptr: Vec<usize>,
    col_idx: Vec<usize>,
    values: Vec<T>,
}

impl<T: Float> CsrMatrix<T> {
    /// Build a CSR from raw row-ptr, col-idx, and values.
    pub fn from_csr(
        nrows: usize,
        ncols: usize,
        row_ptr: Vec<usize>,
        col_idx: Vec<usize>,
        values: Vec<T>,
    ) -> Result<Self, KitError> {
        check_dim(nrows + 1, row_ptr.len())?;
        check_dim(col_idx.len(), values.len())?;
        check_dim(col_idx.len(), row_ptr[nrows])?;
        if row_ptr[0] != 0 || row_ptr.windows(2).any(|w| w[0] > w[1]) {
            return Err(KitError::InvalidArgument(
                "row pointers must start at zero and be non-decreasing".into(),
            ));
        }
        let pattern: Vec<Vec<usize>> = (0..nrows)
            .map(|i| col_idx[row_ptr[i]..row_ptr[i + 1]].to_vec())
            .collect();
        check_pattern(&pattern, ncols)?;
        Ok(Self { nrows, ncols, row_ptr, col_idx, values })
    }

    /// Zero-valued matrix over the given per-row column lists.
    ///
    /// Exactly the declared entries are allocated.
    pub fn from_pattern(nrows: usize, ncols: usize, pattern: &[Vec<usize>]) -> Result<Self, KitError> {
        check_dim(nrows, pattern.len())?;
        check_pattern(pattern, ncols)?;
        let nnz = pattern.iter().map(Vec::len).sum();
        let mut row_ptr = Vec::with_capacity(nrows + 1);
        let mut col_idx = Vec::with_capacity(nnz);
        row_ptr.push(0);
        for row in pattern {
            col_idx.extend_from_slice(row);
            row_ptr.push(col_idx.len());
        }
        Ok(Self {
            nrows,
            ncols,
            row_ptr,
            col_idx,
            values: vec![T::zero(); nnz],
        })
    }

    /// Assembles from (row, col, value) triplets; duplicates are summed.
    ///
    /// Fails with `InvalidArgument` when the row pointer array for `nrows`
    /// rows cannot be allocated.
    pub fn from_triplets(
        nrows: usize,
        ncols: usize,
        triplets: &[(usize, usize, T)],
    ) -> Result<Self, KitError> {
        let mut row_ptr = row_ptr_buffer(nrows)?;
        for &(i, j, _) in triplets {
            check_entry(i, j, nrows, ncols)?;
            row_ptr[i + 1] += 1;
        }
        for i in 0..nrows {
            row_ptr[i + 1] += row_ptr[i];
        }
        // bucket by row; row_ptr[i] is the insertion cursor of row i
        let mut bucketed = vec![(0, T::zero()); triplets.len()];
        for &(i, j, v) in triplets {
            bucketed[row_ptr[i]] = (j, v);
            row_ptr[i] += 1;
        }
        for i in (0..nrows).rev() {
            row_ptr[i + 1] = row_ptr[i];
        }
        row_ptr[0] = 0;

        let mut col_idx = Vec::with_capacity(bucketed.len());
        let mut values = Vec::with_capacity(bucketed.len());
        let mut start = 0;
        for i in 0..nrows {
            let end = row_ptr[i + 1];
            let row = &mut bucketed[start..end];
            row.sort_by_key(|&(j, _)| j);
            let row_start = col_idx.len();
            for &(j, v) in row.iter() {
                if col_idx.len() > row_start && col_idx.last() == Some(&j) {
                    if let Some(last) = values.last_mut() {
                        *last = *last + v;
                    }
                } else {
                    col_idx.push(j);
                    values.push(v);
                }
            }
            row_ptr[i + 1] = col_idx.len();
            start = end;
        }
        Ok(Self { nrows, ncols, row_ptr, col_idx, values })
    }

    /// Copies the non-zero entries of a dense matrix.
    pub fn from_dense(a: &Mat<T>) -> Self {
        let pattern = dense::row_pattern(a);
        let mut m = Self::empty_with_pattern(a.nrows(), a.ncols(), &pattern);
        for i in 0..m.nrows {
            for k in m.row_ptr[i]..m.row_ptr[i + 1] {
                m.values[k] = a[(i, m.col_idx[k])];
            }
        }
        m
    }

    /// Snapshot of the stored entries of any sparse matrix.
    pub fn from_sparse(a: &dyn SparseMatrix<T>) -> Result<Self, KitError> {
        let triplets: Vec<(usize, usize, T)> = a.entries().map(|e| (e.row, e.col, e.value)).collect();
        Self::from_triplets(a.nrows(), a.ncols(), &triplets)
    }

    pub(crate) fn empty_with_pattern(nrows: usize, ncols: usize, pattern: &[Vec<usize>]) -> Self {
        let mut row_ptr = vec![0; nrows + 1];
        let mut col_idx = Vec::new();
        for (i, row) in pattern.iter().enumerate() {
            col_idx.extend_from_slice(row);
            row_ptr[i + 1] = col_idx.len();
        }
        let values = vec![T::zero(); col_idx.len()];
        Self { nrows, ncols, row_ptr, col_idx, values }
    }

    pub fn row_ptr(&self) -> &[usize] {
        &self.row_ptr
    }

    pub fn col_idx(&self) -> &[usize] {
        &self.col_idx
    }

    pub fn values(&self) -> &[T] {
        &self.values
    }

    pub fn values_mut(&mut self) -> &mut [T] {
        &mut self.values
    }

    /// Row pointers, column indices and mutable values at once.
    pub fn parts_mut(&mut self) -> (&[usize], &[usize], &mut [T]) {
        (&self.row_ptr, &self.col_idx, &mut self.values)
    }

    /// Column indices and values of row `i`.
    pub fn row(&self, i: usize) -> Result<(&[usize], &[T]), KitError> {
        check_index(i, self.nrows)?;
        Ok(self.row_slices(i))
    }

    /// Storage position of (row, col), `None` when it is not part of the pattern.
    pub fn find(&self, row: usize, col: usize) -> Result<Option<usize>, KitError> {
        check_entry(row, col, self.nrows, self.ncols)?;
        Ok(self.position(row, col))
    }

    pub(crate) fn row_slices(&self, i: usize) -> (&[usize], &[T]) {
        let range = self.row_ptr[i]..self.row_ptr[i + 1];
        (&self.col_idx[range.clone()], &self.values[range])
    }

    pub(crate) fn position(&self, row: usize, col: usize) -> Option<usize> {
        let start = self.row_ptr[row];
        self.col_idx[start..self.row_ptr[row + 1]]
            .binary_search(&col)
            .ok()
            .map(|k| start + k)
    }

    /// Storage position of each diagonal entry, `None` when not in the pattern.
    pub fn diag_positions(&self) -> Vec<Option<usize>> {
        (0..self.nrows.min(self.ncols)).map(|i| self.position(i, i)).collect()
    }

    fn slot(&self, row: usize, col: usize) -> Result<usize, KitError> {
        check_entry(row, col, self.nrows, self.ncols)?;
        self.position(row, col)
            .ok_or(KitError::StructurallyMissingEntry { row, col })
    }
}

/// Zeroed row pointer array of length `nrows + 1`.
fn row_ptr_buffer(nrows: usize) -> Result<Vec<usize>, KitError> {
    let len = nrows
        .checked_add(1)
        .ok_or_else(|| KitError::InvalidArgument(format!("row count {nrows} is too large")))?;
    let mut row_ptr = Vec::new();
    row_ptr
        .try_reserve_exact(len)
        .map_err(|_| KitError::InvalidArgument(format!("cannot allocate row pointers for {nrows} rows")))?;
    row_ptr.resize(len, 0);
    Ok(row_ptr)
}

impl<T> MatShape for CsrMatrix<T> {
    fn nrows(&self) -> usize {
        self.nrows
    }
    fn ncols(&self) -> usize {
        self.ncols
    }
}

impl<T: Float> MatVec<T> for CsrMatrix<T> {
    fn matvec(&self, x: &[T], y: &mut [T]) -> Result<(), KitError> {
        check_matvec_dims(self, x.len(), y.len())?;
        for (i, yi) in y.iter_mut().enumerate() {
            let (cols, vals) = self.row_slices(i);
            *yi = cols
                .iter()
                .zip(vals)
                .fold(T::zero(), |acc, (&j, &v)| acc + v * x[j]);
        }
        Ok(())
    }

    fn trans_matvec(&self, x: &[T], y: &mut [T]) -> Result<(), KitError> {
        check_matvec_dims(self, y.len(), x.len())?;
        y.iter_mut().for_each(|yj| *yj = T::zero());
        for (i, &xi) in x.iter().enumerate() {
            let (cols, vals) = self.row_slices(i);
            for (&j, &v) in cols.iter().zip(vals) {
                y[j] = y[j] + v * xi;
            }
        }
        Ok(())
    }
}

impl<T: Float> SparseMatrix<T> for CsrMatrix<T> {
    fn nnz(&self) -> usize {
        self.values.len()
    }

    fn get(&self, row: usize, col: usize) -> Result<T, KitError> {
        check_entry(row, col, self.nrows, self.ncols)?;
        Ok(self.position(row, col).map_or(T::zero(), |k| self.values[k]))
    }

    fn set(&mut self, row: usize, col: usize, value: T) -> Result<(), KitError> {
        let k = self.slot(row, col)?;
        self.values[k] = value;
        Ok(())
    }

    fn add(&mut self, row: usize, col: usize, value: T) -> Result<(), KitError> {
        let k = self.slot(row, col)?;
        self.values[k] = self.values[k] + value;
        Ok(())
    }

    fn entries(&self) -> Box<dyn Iterator<Item = MatrixEntry<T>> + '_> {
        Box::new((0..self.nrows).flat_map(move |i| {
            (self.row_ptr[i]..self.row_ptr[i + 1])
                .map(move |k| MatrixEntry::new(i, self.col_idx[k], self.values[k]))
        }))
    }

    fn zero(&mut self) {
        self.values.iter_mut().for_each(|v| *v = T::zero());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tridiag(n: usize) -> CsrMatrix<f64> {
        let pattern: Vec<Vec<usize>> = (0..n)
            .map(|i| (i.saturating_sub(1)..(i + 2).min(n)).collect())
            .collect();
        let mut a = CsrMatrix::from_pattern(n, n, &pattern).unwrap();
        for i in 0..n {
            a.set(i, i, 2.0).unwrap();
            if i > 0 {
                a.set(i, i - 1, -1.0).unwrap();
                a.set(i - 1, i, -1.0).unwrap();
            }
        }
        a
    }

    #[test]
    fn identity_spmv() {
        // 3×3 identity in CSR: row_ptr=[0,1,2,3], col_idx=[0,1,2], vals=[1,1,1]
        let m = CsrMatrix::from_csr(3, 3, vec![0, 1, 2, 3], vec![0, 1, 2], vec![1.0, 1.0, 1.0]).unwrap();
        let x = vec![2.0, 3.0, 5.0];
        let mut y = vec![0.0; 3];
        m.matvec(&x, &mut y).unwrap();
        assert_eq!(y, x);
    }

    #[test]
    fn simple_pattern() {
        // 2×3 matrix [[1,2,0],[0,3,4]]
        let m = CsrMatrix::from_csr(2, 3, vec![0, 2, 4], vec![0, 1, 1, 2], vec![1.0, 2.0, 3.0, 4.0]).unwrap();
        let mut y = vec![0.0; 2];
        m.matvec(&[1.0, 1.0, 1.0], &mut y).unwrap();
        assert_eq!(y, vec![3.0, 7.0]);
        let mut z = vec![0.0; 3];
        m.trans_matvec(&[1.0, 1.0], &mut z).unwrap();
        assert_eq!(z, vec![1.0, 5.0, 4.0]);
    }

    #[test]
    fn outside_pattern_reads_zero_and_rejects_writes() {
        let mut a = tridiag(5);
        assert_eq!(a.get(0, 4).unwrap(), 0.0);
        assert!(matches!(
            a.set(0, 4, 1.0),
            Err(KitError::StructurallyMissingEntry { row: 0, col: 4 })
        ));
        assert!(a.add(4, 0, 1.0).is_err());
        assert!(matches!(a.get(5, 0), Err(KitError::IndexOutOfRange { .. })));
        assert_eq!(a.nnz(), 13);
    }

    #[test]
    fn unsorted_pattern_is_rejected() {
        let pattern = vec![vec![1, 0], vec![1]];
        assert!(CsrMatrix::<f64>::from_pattern(2, 2, &pattern).is_err());
    }

    #[test]
    fn matvec_dimension_mismatch() {
        let a = tridiag(3);
        let mut y = vec![0.0; 3];
        assert!(matches!(
            a.matvec(&[1.0; 4], &mut y),
            Err(KitError::DimensionMismatch { expected: 3, found: 4 })
        ));
    }

    #[test]
    fn unallocatable_row_count_is_rejected() {
        for nrows in [usize::MAX, 1 << 60] {
            assert!(matches!(
                CsrMatrix::<f64>::from_triplets(nrows, 1, &[]),
                Err(KitError::InvalidArgument(_))
            ));
        }
    }

    #[test]
    fn triplets_bucket_unsorted_rows() {
        let t = [(2, 0, 1.0), (0, 2, 2.0), (2, 0, 0.5), (0, 0, 3.0), (1, 1, 4.0)];
        let a = CsrMatrix::from_triplets(3, 3, &t).unwrap();
        assert_eq!(a.row_ptr(), &[0, 2, 3, 4]);
        assert_eq!(a.col_idx(), &[0, 2, 1, 0]);
        assert_eq!(a.values(), &[3.0, 2.0, 4.0, 1.5]);
    }

    #[test]
    fn triplets_sum_duplicates() {
        let a = CsrMatrix::from_triplets(2, 2, &[(1, 1, 1.0), (0, 1, 2.0), (1, 1, 3.0)]).unwrap();
        assert_eq!(a.get(1, 1).unwrap(), 4.0);
        assert_eq!(a.nnz(), 2);
        let entries: Vec<_> = a.entries().map(|e| (e.row, e.col)).collect();
        assert_eq!(entries, vec![(0, 1), (1, 1)]);
    }
}
