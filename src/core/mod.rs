pub mod traits;
pub mod wrappers;

pub use traits::{MatShape, MatVec};
pub use wrappers::{axpy, dot, norm_inf, norm1, norm2, norm2_robust, residual, xpby};
