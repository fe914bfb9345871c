// Jacobi preconditioner implementation

use crate::error::{KitError, check_dim};
use crate::matrix::SparseMatrix;
use crate::preconditioner::Preconditioner;
use num_traits::Float;

/// Jacobi preconditioner: M⁻¹ = D⁻¹
#[derive(Clone, Debug)]
pub struct Jacobi<T> {
    pub(crate) inv_diag: Vec<T>,
}

impl<T: Float> Jacobi<T> {
    /// new with empty state; user must call `setup`.
    pub fn new() -> Self {
        Self { inv_diag: Vec::new() }
    }
}

impl<T: Float> Default for Jacobi<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Float> Preconditioner<T> for Jacobi<T> {
    fn setup(&mut self, a: &dyn SparseMatrix<T>) -> Result<(), KitError> {
        check_dim(a.nrows(), a.ncols())?;
        let mut inv_diag = Vec::with_capacity(a.nrows());
        for i in 0..a.nrows() {
            let d = a.get(i, i)?;
            if d.is_zero() {
                return Err(KitError::Singular { row: i });
            }
            inv_diag.push(T::one() / d);
        }
        self.inv_diag = inv_diag;
        Ok(())
    }

    fn apply(&self, x: &[T], y: &mut [T]) -> Result<(), KitError> {
        check_dim(self.inv_diag.len(), x.len())?;
        check_dim(self.inv_diag.len(), y.len())?;
        for ((yi, &xi), &d) in y.iter_mut().zip(x).zip(&self.inv_diag) {
            *yi = d * xi;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matrix::DiagMatrix;

    #[test]
    fn scales_by_inverse_diagonal() {
        let mut a = DiagMatrix::new(2, 2);
        a.set(0, 0, 2.0).unwrap();
        a.set(1, 1, 4.0).unwrap();
        let mut pc = Jacobi::new();
        pc.setup(&a).unwrap();
        let mut z = vec![0.0; 2];
        pc.apply(&[1.0, 1.0], &mut z).unwrap();
        assert_eq!(z, vec![0.5, 0.25]);
    }

    #[test]
    fn zero_diagonal_is_singular() {
        let mut a = DiagMatrix::new(2, 2);
        a.set(0, 0, 2.0).unwrap();
        let mut pc = Jacobi::new();
        assert!(matches!(pc.setup(&a), Err(KitError::Singular { row: 1 })));
    }
}
