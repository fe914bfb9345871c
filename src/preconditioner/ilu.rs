//! ILU(0) factorization with zero fill (Saad §10.3).
//!
//! The factors share the pattern of the matrix snapshot: the strictly lower
//! part of each row holds the unit lower factor L, the rest holds U.
//! Elimination never creates entries outside that pattern.

use crate::core::traits::MatShape;
use crate::error::{KitError, check_dim};
use crate::matrix::{CsrMatrix, SparseMatrix};
use crate::preconditioner::{
    Preconditioner, unit_lower_solve, unit_lower_transpose_solve, upper_solve,
    upper_transpose_solve,
};
use num_traits::Float;
use tracing::debug;

#[derive(Clone, Debug)]
pub struct Ilu0<T> {
    pub(crate) lu: Option<CsrMatrix<T>>,
    pub(crate) diag: Vec<usize>,
}

impl<T: Float> Ilu0<T> {
    pub fn new() -> Self {
        Self { lu: None, diag: Vec::new() }
    }

    /// The combined L\U factors of the last `setup`.
    pub fn factors(&self) -> Option<&CsrMatrix<T>> {
        self.lu.as_ref()
    }

    fn lu(&self) -> Result<&CsrMatrix<T>, KitError> {
        self.lu
            .as_ref()
            .ok_or_else(|| KitError::InvalidArgument("ILU(0) used before setup".into()))
    }
}

impl<T: Float> Default for Ilu0<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// In-place ILU(0) of `lu` over its own pattern; returns the diagonal positions.
fn factor_in_place<T: Float>(lu: &mut CsrMatrix<T>) -> Result<Vec<usize>, KitError> {
    let n = lu.nrows();
    let diag = lu
        .diag_positions()
        .into_iter()
        .enumerate()
        .map(|(i, p)| p.ok_or(KitError::Singular { row: i }))
        .collect::<Result<Vec<_>, _>>()?;
    let (row_ptr, col_idx, values) = lu.parts_mut();
    let mut iw = vec![usize::MAX; n];
    for i in 0..n {
        let row = row_ptr[i]..row_ptr[i + 1];
        for p in row.clone() {
            iw[col_idx[p]] = p;
        }
        for p in row_ptr[i]..diag[i] {
            let k = col_idx[p];
            let pivot = values[diag[k]];
            if pivot.is_zero() {
                return Err(KitError::Singular { row: k });
            }
            let lik = values[p] / pivot;
            values[p] = lik;
            for q in diag[k] + 1..row_ptr[k + 1] {
                let w = iw[col_idx[q]];
                if w != usize::MAX {
                    values[w] = values[w] - lik * values[q];
                }
            }
        }
        if values[diag[i]].is_zero() {
            return Err(KitError::Singular { row: i });
        }
        for p in row {
            iw[col_idx[p]] = usize::MAX;
        }
    }
    Ok(diag)
}

impl<T: Float> Preconditioner<T> for Ilu0<T> {
    fn setup(&mut self, a: &dyn SparseMatrix<T>) -> Result<(), KitError> {
        check_dim(a.nrows(), a.ncols())?;
        self.lu = None;
        let mut lu = CsrMatrix::from_sparse(a)?;
        let diag = factor_in_place(&mut lu)?;
        debug!(n = lu.nrows(), nnz = lu.nnz(), "ILU(0) factorized");
        self.lu = Some(lu);
        self.diag = diag;
        Ok(())
    }

    fn apply(&self, x: &[T], y: &mut [T]) -> Result<(), KitError> {
        let lu = self.lu()?;
        check_dim(lu.nrows(), x.len())?;
        check_dim(lu.nrows(), y.len())?;
        y.copy_from_slice(x);
        // solve L y1 = x, then U y = y1
        unit_lower_solve(lu.row_ptr(), lu.col_idx(), lu.values(), &self.diag, y);
        upper_solve(lu.row_ptr(), lu.col_idx(), lu.values(), &self.diag, y);
        Ok(())
    }

    fn apply_transpose(&self, x: &[T], y: &mut [T]) -> Result<(), KitError> {
        let lu = self.lu()?;
        check_dim(lu.nrows(), x.len())?;
        check_dim(lu.nrows(), y.len())?;
        y.copy_from_slice(x);
        upper_transpose_solve(lu.row_ptr(), lu.col_idx(), lu.values(), &self.diag, y);
        unit_lower_transpose_solve(lu.row_ptr(), lu.col_idx(), lu.values(), &self.diag, y);
        Ok(())
    }

    fn apply_in_place(&self, y: &mut [T]) -> Result<(), KitError> {
        let lu = self.lu()?;
        check_dim(lu.nrows(), y.len())?;
        unit_lower_solve(lu.row_ptr(), lu.col_idx(), lu.values(), &self.diag, y);
        upper_solve(lu.row_ptr(), lu.col_idx(), lu.values(), &self.diag, y);
        Ok(())
    }
}
