//! Conversions between sparse storage and dense `faer::Mat`.

use crate::matrix::MatrixEntry;
use faer::Mat;
use num_traits::Float;

/// Scatters `entries` into a dense `nrows x ncols` matrix (duplicates add up).
pub fn entries_to_dense<T, I>(nrows: usize, ncols: usize, entries: I) -> Mat<T>
where
    T: Float,
    I: IntoIterator<Item = MatrixEntry<T>>,
{
    let mut data = vec![T::zero(); nrows * ncols];
    for e in entries {
        let k = e.col * nrows + e.row;
        data[k] = data[k] + e.value;
    }
    Mat::from_fn(nrows, ncols, |i, j| data[j * nrows + i])
}

/// Per-row column lists of the non-zeros of a dense matrix.
pub fn row_pattern<T: Float>(a: &Mat<T>) -> Vec<Vec<usize>> {
    (0..a.nrows())
        .map(|i| (0..a.ncols()).filter(|&j| !a[(i, j)].is_zero()).collect())
        .collect()
}

/// Per-column row lists of the non-zeros of a dense matrix.
pub fn col_pattern<T: Float>(a: &Mat<T>) -> Vec<Vec<usize>> {
    (0..a.ncols())
        .map(|j| (0..a.nrows()).filter(|&i| !a[(i, j)].is_zero()).collect())
        .collect()
}
