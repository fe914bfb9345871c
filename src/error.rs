use std::fmt;

use thiserror::Error;

// Unified error type for sparsekit

/// Why an iterative solve stopped without converging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The iteration limit was reached before the tolerance was met.
    MaxIterationsExceeded,
    /// A recurrence denominator vanished (or became non-finite).
    Breakdown,
    /// The residual grew beyond the divergence threshold.
    Diverged,
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            StopReason::MaxIterationsExceeded => "maximum iterations exceeded",
            StopReason::Breakdown => "breakdown",
            StopReason::Diverged => "diverged",
        };
        f.write_str(s)
    }
}

#[derive(Error, Debug)]
pub enum KitError {
    #[error("index {index} out of range (bound {bound})")]
    IndexOutOfRange { index: usize, bound: usize },
    #[error("entry ({row}, {col}) is not part of the sparsity pattern")]
    StructurallyMissingEntry { row: usize, col: usize },
    #[error("zero pivot at row {row}")]
    Singular { row: usize },
    #[error("not converged ({reason}) after {iterations} iterations, residual {residual:.3e}")]
    NotConverged {
        reason: StopReason,
        residual: f64,
        iterations: usize,
    },
    #[error("dimension mismatch: expected {expected}, found {found}")]
    DimensionMismatch { expected: usize, found: usize },
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("parse error at line {line}: {message}")]
    Parse { line: usize, message: String },
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl KitError {
    /// The stop reason of a `NotConverged` error.
    pub fn stop_reason(&self) -> Option<StopReason> {
        match self {
            KitError::NotConverged { reason, .. } => Some(*reason),
            _ => None,
        }
    }
}

/// Fails with `DimensionMismatch` unless `found == expected`.
pub(crate) fn check_dim(expected: usize, found: usize) -> Result<(), KitError> {
    if expected == found {
        Ok(())
    } else {
        Err(KitError::DimensionMismatch { expected, found })
    }
}

/// Fails with `IndexOutOfRange` unless `index < bound`.
pub(crate) fn check_index(index: usize, bound: usize) -> Result<(), KitError> {
    if index < bound {
        Ok(())
    } else {
        Err(KitError::IndexOutOfRange { index, bound })
    }
}
