//! Preconditioner selection for Krylov solvers.
//!
//! [`PC`] names one preconditioning strategy together with its parameters
//! and builds the matching [`Preconditioner`] object.
//!
//! ```rust
//! use sparsekit::context::pc_context::PC;
//! let pc = PC::Ilut { fill: 10, droptol: 1e-3 };
//! let boxed = pc.build();
//! assert!(boxed.is_some());
//! ```

use crate::config::options::{PcOptions, PcType};
use crate::preconditioner::{Identity, Ilu0, Ilut, Jacobi, Preconditioner, Ssor};
use num_traits::Float;

/// Unified preconditioner enum for all supported types.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PC<T> {
    /// No preconditioning.
    None,
    /// Identity operator; equivalent to `None` but goes through the trait.
    Identity,
    /// Diagonal scaling.
    Jacobi,
    /// Symmetric successive over-relaxation with relaxation factor `omega`.
    Ssor { omega: T },
    /// Incomplete LU with zero fill-in.
    Ilu0,
    /// Incomplete LU with threshold dropping.
    ///
    /// - `fill`: largest entries kept per row in each of L and U.
    /// - `droptol`: drop threshold relative to the row's 2-norm.
    Ilut { fill: usize, droptol: T },
}

impl<T: Float + 'static> PC<T> {
    pub fn from_options(opts: &PcOptions<T>) -> Self {
        match opts.pc_type {
            PcType::None => PC::None,
            PcType::Identity => PC::Identity,
            PcType::Jacobi => PC::Jacobi,
            PcType::Ssor => PC::Ssor { omega: opts.omega },
            PcType::Ilu0 => PC::Ilu0,
            PcType::Ilut => PC::Ilut { fill: opts.fill, droptol: opts.drop_tol },
        }
    }

    /// A fresh, not yet set up preconditioner; `None` for [`PC::None`].
    pub fn build(&self) -> Option<Box<dyn Preconditioner<T>>> {
        match *self {
            PC::None => None,
            PC::Identity => Some(Box::new(Identity)),
            PC::Jacobi => Some(Box::new(Jacobi::new())),
            PC::Ssor { omega } => Some(Box::new(Ssor::new(omega))),
            PC::Ilu0 => Some(Box::new(Ilu0::new())),
            PC::Ilut { fill, droptol } => Some(Box::new(Ilut::new(fill, droptol))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn options_map_to_variants() {
        let o = PcOptions::new(PcType::Ssor).with_omega(1.5);
        assert_eq!(PC::from_options(&o), PC::Ssor { omega: 1.5 });
        let o = PcOptions::new(PcType::Ilut).with_fill(4).with_drop_tol(1e-3);
        assert_eq!(PC::from_options(&o), PC::Ilut { fill: 4, droptol: 1e-3 });
        assert!(PC::<f64>::None.build().is_none());
        assert!(PC::<f64>::Jacobi.build().is_some());
    }
}
