//! File formats.

pub mod matrix_market;
pub use matrix_market::{read_matrix, read_vector, write_matrix, write_vector};
