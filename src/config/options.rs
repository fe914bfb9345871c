//! Command-line or API options for solvers and preconditioners.
//!
//! [`SolverOptions`] and [`PcOptions`] are plain structs with defaults and
//! builder-style setters. Method names parse from strings (`"gmres"`,
//! `"ilut"`, ...), so options can come straight from a command line or a
//! config file.

use std::fmt;
use std::str::FromStr;

use crate::error::KitError;
use crate::utils::convergence::NormKind;
use num_traits::Float;

/// Krylov method selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SolverKind {
    /// Conjugate Gradient (SPD matrices)
    Cg,
    /// BiConjugate Gradient
    BiCg,
    /// BiConjugate Gradient Stabilized
    BiCgStab,
    /// Conjugate Gradient Squared
    Cgs,
    /// Restarted GMRES
    #[default]
    Gmres,
    /// Chebyshev iteration; needs spectral bounds
    Chebyshev,
    /// Preconditioned Richardson iteration
    Richardson,
}

impl SolverKind {
    pub fn name(self) -> &'static str {
        match self {
            SolverKind::Cg => "cg",
            SolverKind::BiCg => "bicg",
            SolverKind::BiCgStab => "bicgstab",
            SolverKind::Cgs => "cgs",
            SolverKind::Gmres => "gmres",
            SolverKind::Chebyshev => "chebyshev",
            SolverKind::Richardson => "richardson",
        }
    }
}

impl fmt::Display for SolverKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SolverKind {
    type Err = KitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cg" => Ok(SolverKind::Cg),
            "bicg" => Ok(SolverKind::BiCg),
            "bicgstab" | "bcgs" => Ok(SolverKind::BiCgStab),
            "cgs" => Ok(SolverKind::Cgs),
            "gmres" => Ok(SolverKind::Gmres),
            "chebyshev" | "cheby" => Ok(SolverKind::Chebyshev),
            "richardson" => Ok(SolverKind::Richardson),
            other => Err(KitError::InvalidArgument(format!("unknown solver '{other}'"))),
        }
    }
}

/// Preconditioner selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PcType {
    #[default]
    None,
    Identity,
    Jacobi,
    Ssor,
    Ilu0,
    Ilut,
}

impl FromStr for PcType {
    type Err = KitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" | "" => Ok(PcType::None),
            "identity" => Ok(PcType::Identity),
            "jacobi" => Ok(PcType::Jacobi),
            "ssor" => Ok(PcType::Ssor),
            "ilu" | "ilu0" => Ok(PcType::Ilu0),
            "ilut" => Ok(PcType::Ilut),
            other => Err(KitError::InvalidArgument(format!("unknown preconditioner '{other}'"))),
        }
    }
}

/// Krylov solver parameters.
#[derive(Debug, Clone)]
pub struct SolverOptions<T> {
    pub kind: SolverKind,
    /// Relative tolerance
    pub rtol: T,
    /// Absolute tolerance
    pub atol: T,
    /// Divergence factor
    pub dtol: T,
    pub max_iters: usize,
    pub norm: NormKind,
    /// Restart length for GMRES
    pub restart: usize,
    /// Spectral interval for Chebyshev iteration
    pub eig_bounds: Option<(T, T)>,
    /// Damping factor for Richardson iteration
    pub omega: T,
}

impl<T: Float> Default for SolverOptions<T> {
    fn default() -> Self {
        let cast = |v: f64| num_traits::cast::<f64, T>(v).unwrap_or_else(T::epsilon);
        Self {
            kind: SolverKind::default(),
            rtol: cast(1e-8),
            atol: cast(1e-50),
            dtol: cast(1e5),
            max_iters: 1000,
            norm: NormKind::Two,
            restart: 30,
            eig_bounds: None,
            omega: T::one(),
        }
    }
}

impl<T: Float> SolverOptions<T> {
    pub fn new(kind: SolverKind) -> Self {
        Self { kind, ..Self::default() }
    }

    pub fn with_rtol(mut self, rtol: T) -> Self {
        self.rtol = rtol;
        self
    }

    pub fn with_atol(mut self, atol: T) -> Self {
        self.atol = atol;
        self
    }

    pub fn with_dtol(mut self, dtol: T) -> Self {
        self.dtol = dtol;
        self
    }

    pub fn with_max_iters(mut self, max_iters: usize) -> Self {
        self.max_iters = max_iters;
        self
    }

    pub fn with_norm(mut self, norm: NormKind) -> Self {
        self.norm = norm;
        self
    }

    pub fn with_restart(mut self, restart: usize) -> Self {
        self.restart = restart;
        self
    }

    pub fn with_eig_bounds(mut self, eig_min: T, eig_max: T) -> Self {
        self.eig_bounds = Some((eig_min, eig_max));
        self
    }

    pub fn with_omega(mut self, omega: T) -> Self {
        self.omega = omega;
        self
    }
}

/// Preconditioner types & parameters.
#[derive(Debug, Clone)]
pub struct PcOptions<T> {
    pub pc_type: PcType,
    /// Relaxation factor ω for SSOR
    pub omega: T,
    /// Entries kept per row in each ILUT factor
    pub fill: usize,
    /// Drop tolerance for ILUT, relative to the row norm
    pub drop_tol: T,
}

impl<T: Float> Default for PcOptions<T> {
    fn default() -> Self {
        Self {
            pc_type: PcType::None,
            omega: T::one(),
            fill: 10,
            drop_tol: num_traits::cast::<f64, T>(1e-4).unwrap_or_else(T::epsilon),
        }
    }
}

impl<T: Float> PcOptions<T> {
    pub fn new(pc_type: PcType) -> Self {
        Self { pc_type, ..Self::default() }
    }

    pub fn with_omega(mut self, omega: T) -> Self {
        self.omega = omega;
        self
    }

    pub fn with_fill(mut self, fill: usize) -> Self {
        self.fill = fill;
        self
    }

    pub fn with_drop_tol(mut self, drop_tol: T) -> Self {
        self.drop_tol = drop_tol;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_kind_names() {
        assert_eq!("GMRES".parse::<SolverKind>().unwrap(), SolverKind::Gmres);
        assert_eq!(" bicgstab ".parse::<SolverKind>().unwrap(), SolverKind::BiCgStab);
        assert_eq!("ilu".parse::<PcType>().unwrap(), PcType::Ilu0);
        assert!("lsqr".parse::<SolverKind>().is_err());
        assert!(matches!("amg".parse::<PcType>(), Err(KitError::InvalidArgument(_))));
    }

    #[test]
    fn display_round_trips() {
        for kind in [SolverKind::Cg, SolverKind::Chebyshev, SolverKind::Richardson] {
            assert_eq!(kind.to_string().parse::<SolverKind>().unwrap(), kind);
        }
    }

    #[test]
    fn builders_override_defaults() {
        let o = SolverOptions::<f64>::new(SolverKind::Cg).with_rtol(1e-6).with_max_iters(5);
        assert_eq!((o.kind, o.rtol, o.max_iters, o.restart), (SolverKind::Cg, 1e-6, 5, 30));
        let p = PcOptions::<f64>::new(PcType::Ilut).with_fill(3).with_drop_tol(1e-2);
        assert_eq!((p.fill, p.drop_tol, p.omega), (3, 1e-2, 1.0));
    }
}
