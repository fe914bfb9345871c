pub mod options;
pub use options::{PcOptions, PcType, SolverKind, SolverOptions};
