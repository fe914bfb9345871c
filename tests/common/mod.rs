//! Test-data generators shared by the integration tests.
//!
//! Every generator takes an explicit seeded `StdRng`, so a failing case can
//! be replayed from its seed.

#![allow(dead_code)]

use faer::Mat;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use sparsekit::{CsrMatrix, MatVec};

pub fn rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

/// About `per_row` random entries in [-1, 1) per row, duplicates allowed.
pub fn random_triplets(
    rng: &mut StdRng,
    nrows: usize,
    ncols: usize,
    per_row: usize,
) -> Vec<(usize, usize, f64)> {
    let mut t = Vec::with_capacity(nrows * per_row);
    for i in 0..nrows {
        for _ in 0..per_row {
            t.push((i, rng.gen_range(0..ncols), rng.gen_range(-1.0..1.0)));
        }
    }
    t
}

/// Symmetric matrix made positive definite by a diagonal shift:
/// each diagonal entry exceeds its row's off-diagonal absolute sum by `shift`.
pub fn random_spd(rng: &mut StdRng, n: usize, per_row: usize, shift: f64) -> CsrMatrix<f64> {
    let mut t = Vec::new();
    let mut row_sum = vec![0.0; n];
    for (i, j, v) in random_triplets(rng, n, n, per_row) {
        if i == j {
            continue;
        }
        t.push((i, j, v));
        t.push((j, i, v));
        row_sum[i] += v.abs();
        row_sum[j] += v.abs();
    }
    for (i, s) in row_sum.iter().enumerate() {
        t.push((i, i, s + shift));
    }
    CsrMatrix::from_triplets(n, n, &t).expect("indices are in range")
}

pub fn random_vector(rng: &mut StdRng, n: usize) -> Vec<f64> {
    (0..n).map(|_| rng.gen_range(-1.0..1.0)).collect()
}

/// Random dense matrix with entries in [0, 1) plus `shift` on the diagonal.
pub fn random_dense(rng: &mut StdRng, n: usize, shift: f64) -> Mat<f64> {
    let vals: Vec<f64> = (0..n * n).map(|_| rng.gen_range(0.0..1.0)).collect();
    Mat::from_fn(n, n, |i, j| vals[j * n + i] + if i == j { shift } else { 0.0 })
}

/// Tridiagonal matrix with constant bands.
pub fn tridiag(n: usize, lo: f64, d: f64, up: f64) -> CsrMatrix<f64> {
    let mut t = Vec::with_capacity(3 * n);
    for i in 0..n {
        t.push((i, i, d));
        if i > 0 {
            t.push((i, i - 1, lo));
            t.push((i - 1, i, up));
        }
    }
    CsrMatrix::from_triplets(n, n, &t).expect("indices are in range")
}

/// b = A x for a known x.
pub fn rhs_for(a: &dyn MatVec<f64>, x: &[f64]) -> Vec<f64> {
    let mut b = vec![0.0; a.nrows()];
    a.matvec(x, &mut b).expect("dimensions match");
    b
}

pub fn max_err(x: &[f64], y: &[f64]) -> f64 {
    x.iter().zip(y).map(|(a, b)| (a - b).abs()).fold(0.0, f64::max)
}
