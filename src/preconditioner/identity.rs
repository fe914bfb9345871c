// Identity preconditioner: M = I

use crate::error::{KitError, check_dim};
use crate::matrix::SparseMatrix;
use crate::preconditioner::Preconditioner;
use num_traits::Float;

#[derive(Clone, Copy, Debug, Default)]
pub struct Identity;

impl<T: Float> Preconditioner<T> for Identity {
    fn setup(&mut self, _a: &dyn SparseMatrix<T>) -> Result<(), KitError> {
        Ok(())
    }

    fn apply(&self, r: &[T], z: &mut [T]) -> Result<(), KitError> {
        check_dim(r.len(), z.len())?;
        z.copy_from_slice(r);
        Ok(())
    }

    fn apply_in_place(&self, _z: &mut [T]) -> Result<(), KitError> {
        Ok(())
    }
}
