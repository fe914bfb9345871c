//! ILUT preconditioner
//!
//! Implements ILUT (Incomplete LU with threshold and fill-in control) as a preconditioner.
//!
//! # Overview
//!
//! ILUT is an incomplete LU factorization with user-specified fill-in and drop tolerance.
//! Each row is eliminated against the rows above it in a dense work row (IKJ order), so
//! fill-in may appear anywhere. Afterwards every entry whose magnitude is below
//! `droptol · ‖aᵢ‖₂` is dropped and only the `fill` largest entries of the L part and of the
//! U part are kept. The diagonal is always kept; its position in the stored row is located
//! after filtering, since dropping changes how many lower entries precede it.
//!
//! # Usage
//!
//! - Create an `Ilut` preconditioner with the desired fill and drop tolerance.
//! - Call `setup` with the system matrix to compute the factors.
//! - Use `apply` to solve M⁻¹r ≈ A⁻¹r using the computed factors.
//!
//! # References
//! - Saad, Y. (2003). Iterative Methods for Sparse Linear Systems, Section 10.4.

use std::collections::BTreeSet;

use crate::core::traits::MatShape;
use crate::error::{KitError, check_dim};
use crate::matrix::{CsrMatrix, SparseMatrix};
use crate::preconditioner::{
    Preconditioner, unit_lower_solve, unit_lower_transpose_solve, upper_solve,
    upper_transpose_solve,
};
use num_traits::Float;
use tracing::debug;

/// Sparse row structure for the L/U parts of one row while it is filtered.
#[derive(Clone, Debug)]
pub struct SparseRow<T> {
    /// Column indices of nonzero entries
    pub cols: Vec<usize>,
    /// Values of nonzero entries
    pub vals: Vec<T>,
}

impl<T: Float> SparseRow<T> {
    /// Create an empty sparse row
    pub fn new() -> Self {
        Self { cols: Vec::new(), vals: Vec::new() }
    }

    pub fn push(&mut self, col: usize, val: T) {
        self.cols.push(col);
        self.vals.push(val);
    }

    /// Keeps the `fill` largest entries by magnitude, then restores column order.
    fn keep_largest(&mut self, fill: usize) {
        let mut entries: Vec<(usize, T)> = self.cols.iter().copied().zip(self.vals.iter().copied()).collect();
        if entries.len() > fill {
            entries.sort_by(|a, b| b.1.abs().partial_cmp(&a.1.abs()).unwrap_or(std::cmp::Ordering::Equal));
            entries.truncate(fill);
        }
        entries.sort_by_key(|&(c, _)| c);
        self.cols = entries.iter().map(|&(c, _)| c).collect();
        self.vals = entries.iter().map(|&(_, v)| v).collect();
    }
}

impl<T: Float> Default for SparseRow<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// ILUT preconditioner struct.
///
/// - `fill`: Maximum number of nonzeros kept in each of the L and U parts of a row
/// - `droptol`: Drop tolerance, relative to the 2-norm of the matrix row
#[derive(Clone, Debug)]
pub struct Ilut<T> {
    pub fill: usize,
    pub droptol: T,
    lu: Option<CsrMatrix<T>>,
    diag: Vec<usize>,
}

impl<T: Float> Ilut<T> {
    /// Create a new ILUT preconditioner with fill and drop tolerance.
    pub fn new(fill: usize, droptol: T) -> Self {
        Self { fill, droptol, lu: None, diag: Vec::new() }
    }

    /// The combined L\U factors of the last `setup`.
    pub fn factors(&self) -> Option<&CsrMatrix<T>> {
        self.lu.as_ref()
    }

    fn lu(&self) -> Result<&CsrMatrix<T>, KitError> {
        self.lu
            .as_ref()
            .ok_or_else(|| KitError::InvalidArgument("ILUT used before setup".into()))
    }
}

/// Dense work row with a record of which columns are occupied.
struct WorkRow<T> {
    vals: Vec<T>,
    occupied: Vec<bool>,
    cols: Vec<usize>,
}

impl<T: Float> WorkRow<T> {
    fn new(n: usize) -> Self {
        Self { vals: vec![T::zero(); n], occupied: vec![false; n], cols: Vec::new() }
    }

    fn add(&mut self, col: usize, v: T) -> bool {
        let fresh = !self.occupied[col];
        if fresh {
            self.occupied[col] = true;
            self.cols.push(col);
        }
        self.vals[col] = self.vals[col] + v;
        fresh
    }

    fn clear(&mut self) {
        for &c in &self.cols {
            self.vals[c] = T::zero();
            self.occupied[c] = false;
        }
        self.cols.clear();
    }
}

impl<T: Float> Preconditioner<T> for Ilut<T> {
    /// Setup ILUT factors from a snapshot of `a`.
    fn setup(&mut self, a: &dyn SparseMatrix<T>) -> Result<(), KitError> {
        check_dim(a.nrows(), a.ncols())?;
        if self.droptol < T::zero() {
            return Err(KitError::InvalidArgument("ILUT drop tolerance must be non-negative".into()));
        }
        self.lu = None;
        let a = CsrMatrix::from_sparse(a)?;
        let n = a.nrows();
        let mut row_ptr = Vec::with_capacity(n + 1);
        let mut col_idx: Vec<usize> = Vec::new();
        let mut values: Vec<T> = Vec::new();
        let mut diag: Vec<usize> = Vec::with_capacity(n);
        row_ptr.push(0);
        let mut w = WorkRow::new(n);
        let mut pending: BTreeSet<usize> = BTreeSet::new();

        for i in 0..n {
            let (cols, vals) = a.row_slices(i);
            let norm = vals.iter().fold(T::zero(), |acc, &v| acc + v * v).sqrt();
            let tau = self.droptol * norm;
            for (&j, &v) in cols.iter().zip(vals) {
                w.add(j, v);
                if j < i {
                    pending.insert(j);
                }
            }
            // eliminate lower entries in increasing column order, fill-in included
            while let Some(k) = pending.pop_first() {
                let pivot = values[diag[k]];
                let lik = w.vals[k] / pivot;
                if lik.abs() < tau {
                    w.vals[k] = T::zero();
                    continue;
                }
                w.vals[k] = lik;
                for q in diag[k] + 1..row_ptr[k + 1] {
                    let j = col_idx[q];
                    if w.add(j, -lik * values[q]) && j < i {
                        pending.insert(j);
                    }
                }
            }

            let mut lower = SparseRow::new();
            let mut upper = SparseRow::new();
            for &j in &w.cols {
                let v = w.vals[j];
                if j == i || v.is_zero() || v.abs() < tau {
                    continue;
                }
                if j < i {
                    lower.push(j, v);
                } else {
                    upper.push(j, v);
                }
            }
            lower.keep_largest(self.fill);
            upper.keep_largest(self.fill);
            let pivot = w.vals[i];
            if pivot.is_zero() || !pivot.is_finite() {
                return Err(KitError::Singular { row: i });
            }
            col_idx.extend_from_slice(&lower.cols);
            values.extend_from_slice(&lower.vals);
            col_idx.push(i);
            values.push(pivot);
            col_idx.extend_from_slice(&upper.cols);
            values.extend_from_slice(&upper.vals);
            row_ptr.push(col_idx.len());
            // pivot position depends on how many lower entries survived
            let start = row_ptr[i];
            let d = col_idx[start..row_ptr[i + 1]]
                .binary_search(&i)
                .map_err(|_| KitError::Singular { row: i })?;
            diag.push(start + d);
            w.clear();
        }

        let lu = CsrMatrix::from_csr(n, n, row_ptr, col_idx, values)?;
        debug!(n, nnz_a = a.nnz(), nnz_lu = lu.nnz(), "ILUT factorized");
        self.lu = Some(lu);
        self.diag = diag;
        Ok(())
    }

    /// Apply ILUT preconditioner: solve Ly = r, then Uz = y.
    fn apply(&self, r: &[T], z: &mut [T]) -> Result<(), KitError> {
        let lu = self.lu()?;
        check_dim(lu.nrows(), r.len())?;
        check_dim(lu.nrows(), z.len())?;
        z.copy_from_slice(r);
        unit_lower_solve(lu.row_ptr(), lu.col_idx(), lu.values(), &self.diag, z);
        upper_solve(lu.row_ptr(), lu.col_idx(), lu.values(), &self.diag, z);
        Ok(())
    }

    fn apply_transpose(&self, r: &[T], z: &mut [T]) -> Result<(), KitError> {
        let lu = self.lu()?;
        check_dim(lu.nrows(), r.len())?;
        check_dim(lu.nrows(), z.len())?;
        z.copy_from_slice(r);
        upper_transpose_solve(lu.row_ptr(), lu.col_idx(), lu.values(), &self.diag, z);
        unit_lower_transpose_solve(lu.row_ptr(), lu.col_idx(), lu.values(), &self.diag, z);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::traits::MatVec;
    use crate::matrix::{FlexCsrMatrix, LinkedMatrix};

    fn tridiag(n: usize) -> FlexCsrMatrix<f64> {
        let mut a = FlexCsrMatrix::new(n, n);
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
    fn ilut_identity() {
        let mut a = LinkedMatrix::new(2, 2);
        a.set(0, 0, 1.0).unwrap();
        a.set(1, 1, 1.0).unwrap();
        let mut pc = Ilut::new(2, 1e-12);
        pc.setup(&a).unwrap();
        let r = vec![2.0f64, 3.0];
        let mut z = vec![0.0; 2];
        pc.apply(&r, &mut z).unwrap();
        assert!((z[0] - 2.0).abs() < 1e-12 && (z[1] - 3.0).abs() < 1e-12);
    }

    #[test]
    fn ilut_tridiag_is_exact_without_dropping() {
        let a = tridiag(3);
        let mut pc = Ilut::new(3, 0.0);
        pc.setup(&a).unwrap();
        let x_true = [1.0, 2.0, 3.0];
        let mut b = vec![0.0; 3];
        a.matvec(&x_true, &mut b).unwrap();
        let mut z = vec![0.0; 3];
        pc.apply(&b, &mut z).unwrap();
        for (zi, xi) in z.iter().zip(&x_true) {
            assert!((zi - xi).abs() < 1e-12);
        }
    }

    #[test]
    fn large_fill_limit_with_dropping_does_not_overrun() {
        let a = tridiag(100);
        let mut pc = Ilut::new(50, 1e-6);
        pc.setup(&a).unwrap();
        let lu = pc.factors().unwrap();
        assert!(lu.nnz() <= a.nnz());
        let mut z = vec![0.0; 100];
        pc.apply(&vec![1.0; 100], &mut z).unwrap();
        assert!(z.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn fill_in_is_created_then_limited() {
        // arrow matrix: elimination fills the whole trailing block
        let n = 6;
        let mut a = LinkedMatrix::new(n, n);
        for i in 0..n {
            a.set(i, 0, 1.0).unwrap();
            a.set(0, i, 1.0).unwrap();
            a.set(i, i, 8.0).unwrap();
        }
        let mut full = Ilut::new(n, 0.0);
        full.setup(&a).unwrap();
        let mut narrow = Ilut::new(1, 0.0);
        narrow.setup(&a).unwrap();
        assert!(full.factors().unwrap().nnz() > a.nnz());
        let lu = narrow.factors().unwrap();
        for i in 0..n {
            let (cols, _) = lu.row(i).unwrap();
            assert!(cols.len() <= 3, "row {i} keeps {cols:?}");
            assert!(cols.contains(&i));
        }
    }

    #[test]
    fn transposed_apply_solves_transposed_system() {
        let mut a = LinkedMatrix::new(3, 3);
        for (i, j, v) in [(0, 0, 4.0), (0, 2, 1.0), (1, 0, 2.0), (1, 1, 5.0), (2, 1, -1.0), (2, 2, 3.0)] {
            a.set(i, j, v).unwrap();
        }
        let mut pc = Ilut::new(3, 0.0);
        pc.setup(&a).unwrap();
        let b = [1.0, 2.0, 3.0];
        let mut z = vec![0.0; 3];
        pc.apply_transpose(&b, &mut z).unwrap();
        let mut atz = vec![0.0; 3];
        a.trans_matvec(&z, &mut atz).unwrap();
        for (got, want) in atz.iter().zip(&b) {
            assert!((got - want).abs() < 1e-12);
        }
    }
}
