use crate::core::traits::MatShape;
use crate::error::{KitError, check_dim};
use crate::matrix::{CsrMatrix, SparseMatrix};
use crate::preconditioner::Preconditioner;
use num_traits::Float;

/// Symmetric Successive Over-Relaxation.
/// M = (D/ω + L) (ω/(2−ω)) D⁻¹ (D/ω + U)
#[derive(Clone, Debug)]
pub struct Ssor<T> {
    omega: T,
    a: Option<CsrMatrix<T>>,
    diag: Vec<usize>,
}

impl<T: Float> Ssor<T> {
    pub fn new(omega: T) -> Self {
        Self { omega, a: None, diag: Vec::new() }
    }

    pub fn omega(&self) -> T {
        self.omega
    }

    fn factors(&self) -> Result<&CsrMatrix<T>, KitError> {
        self.a
            .as_ref()
            .ok_or_else(|| KitError::InvalidArgument("SSOR used before setup".into()))
    }

    /// ω(2 − ω), the scaling of the right-hand side.
    fn scale(&self) -> T {
        self.omega * (T::one() + T::one() - self.omega)
    }
}

impl<T: Float> Preconditioner<T> for Ssor<T> {
    fn setup(&mut self, a: &dyn SparseMatrix<T>) -> Result<(), KitError> {
        let two = T::one() + T::one();
        if !(self.omega > T::zero() && self.omega < two) {
            return Err(KitError::InvalidArgument("SSOR relaxation must lie in (0, 2)".into()));
        }
        check_dim(a.nrows(), a.ncols())?;
        let csr = CsrMatrix::from_sparse(a)?;
        let mut diag = Vec::with_capacity(csr.nrows());
        for (i, pos) in csr.diag_positions().into_iter().enumerate() {
            match pos {
                Some(k) if !csr.values()[k].is_zero() => diag.push(k),
                _ => return Err(KitError::Singular { row: i }),
            }
        }
        self.a = Some(csr);
        self.diag = diag;
        Ok(())
    }

    fn apply(&self, r: &[T], z: &mut [T]) -> Result<(), KitError> {
        let a = self.factors()?;
        check_dim(a.nrows(), r.len())?;
        check_dim(a.nrows(), z.len())?;
        let (row_ptr, col_idx, vals) = (a.row_ptr(), a.col_idx(), a.values());
        let (omega, c) = (self.omega, self.scale());
        // forward: (D + ωL) y = ω(2−ω) r, then y ← D y
        for i in 0..r.len() {
            let mut sum = c * r[i];
            for k in row_ptr[i]..self.diag[i] {
                sum = sum - omega * vals[k] * z[col_idx[k]];
            }
            z[i] = sum / vals[self.diag[i]];
        }
        for i in 0..r.len() {
            z[i] = z[i] * vals[self.diag[i]];
        }
        // backward: (D + ωU) z = y
        for i in (0..r.len()).rev() {
            let mut sum = z[i];
            for k in self.diag[i] + 1..row_ptr[i + 1] {
                sum = sum - omega * vals[k] * z[col_idx[k]];
            }
            z[i] = sum / vals[self.diag[i]];
        }
        Ok(())
    }

    fn apply_transpose(&self, r: &[T], z: &mut [T]) -> Result<(), KitError> {
        let a = self.factors()?;
        check_dim(a.nrows(), r.len())?;
        check_dim(a.nrows(), z.len())?;
        let (row_ptr, col_idx, vals) = (a.row_ptr(), a.col_idx(), a.values());
        let (omega, c) = (self.omega, self.scale());
        // (D + ωU)ᵀ y = ω(2−ω) r, column sweep
        for (zi, &ri) in z.iter_mut().zip(r) {
            *zi = c * ri;
        }
        for i in 0..r.len() {
            z[i] = z[i] / vals[self.diag[i]];
            let zi = z[i];
            for k in self.diag[i] + 1..row_ptr[i + 1] {
                z[col_idx[k]] = z[col_idx[k]] - omega * vals[k] * zi;
            }
        }
        for i in 0..r.len() {
            z[i] = z[i] * vals[self.diag[i]];
        }
        // (D + ωL)ᵀ z = y
        for i in (0..r.len()).rev() {
            z[i] = z[i] / vals[self.diag[i]];
            let zi = z[i];
            for k in row_ptr[i]..self.diag[i] {
                z[col_idx[k]] = z[col_idx[k]] - omega * vals[k] * zi;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::traits::MatVec;
    use crate::matrix::LinkedMatrix;

    fn nonsym() -> LinkedMatrix<f64> {
        let mut a = LinkedMatrix::new(3, 3);
        for (i, j, v) in [(0, 0, 4.0), (0, 1, 1.0), (1, 0, -2.0), (1, 1, 5.0), (1, 2, 1.0), (2, 1, 3.0), (2, 2, 6.0)] {
            a.set(i, j, v).unwrap();
        }
        a
    }

    #[test]
    fn omega_one_on_diagonal_matrix_is_jacobi() {
        let mut a = LinkedMatrix::new(2, 2);
        a.set(0, 0, 2.0).unwrap();
        a.set(1, 1, 8.0).unwrap();
        let mut pc = Ssor::new(1.0);
        pc.setup(&a).unwrap();
        let mut z = vec![0.0; 2];
        pc.apply(&[2.0, 4.0], &mut z).unwrap();
        assert!((z[0] - 1.0).abs() < 1e-14 && (z[1] - 0.5).abs() < 1e-14);
    }

    #[test]
    fn transpose_apply_is_adjoint() {
        // <M⁻¹ x, y> == <x, M⁻ᵀ y>
        let a = nonsym();
        let mut pc = Ssor::new(1.2);
        pc.setup(&a).unwrap();
        let x = [1.0, -2.0, 0.5];
        let y = [0.3, 1.0, -1.0];
        let (mut mx, mut mty) = (vec![0.0; 3], vec![0.0; 3]);
        pc.apply(&x, &mut mx).unwrap();
        pc.apply_transpose(&y, &mut mty).unwrap();
        let lhs: f64 = mx.iter().zip(&y).map(|(a, b)| a * b).sum();
        let rhs: f64 = x.iter().zip(&mty).map(|(a, b)| a * b).sum();
        assert!((lhs - rhs).abs() < 1e-12);
        let mut ax = vec![0.0; 3];
        a.matvec(&mx, &mut ax).unwrap();
        assert!(ax.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn rejects_bad_relaxation() {
        let mut pc = Ssor::new(2.0);
        assert!(matches!(pc.setup(&nonsym()), Err(KitError::InvalidArgument(_))));
    }
}
