use criterion::{Criterion, black_box, criterion_group, criterion_main};
use sparsekit::{
    CgSolver, CsrMatrix, GmresSolver, Ilu0, Ilut, LinearSolver, MatVec, Preconditioner,
};

/// Five-point Laplacian on a k×k grid.
fn laplacian_2d(k: usize) -> CsrMatrix<f64> {
    let n = k * k;
    let mut t = Vec::with_capacity(5 * n);
    for i in 0..k {
        for j in 0..k {
            let p = i * k + j;
            t.push((p, p, 4.0));
            if i > 0 {
                t.push((p, p - k, -1.0));
            }
            if i + 1 < k {
                t.push((p, p + k, -1.0));
            }
            if j > 0 {
                t.push((p, p - 1, -1.0));
            }
            if j + 1 < k {
                t.push((p, p + 1, -1.0));
            }
        }
    }
    CsrMatrix::from_triplets(n, n, &t).unwrap()
}

fn bench_kernels(c: &mut Criterion) {
    let a = laplacian_2d(64);
    let n = 64 * 64;
    let x: Vec<f64> = (0..n).map(|i| (i as f64).sin()).collect();
    let mut y = vec![0.0; n];

    c.bench_function("csr matvec 4096", |ben| {
        ben.iter(|| a.matvec(black_box(&x), black_box(&mut y)).unwrap())
    });
    c.bench_function("ilu0 setup 4096", |ben| {
        ben.iter(|| {
            let mut pc = Ilu0::new();
            pc.setup(black_box(&a)).unwrap();
        })
    });
    c.bench_function("ilut(10, 1e-4) setup 4096", |ben| {
        ben.iter(|| {
            let mut pc = Ilut::new(10, 1e-4);
            pc.setup(black_box(&a)).unwrap();
        })
    });
}

fn bench_solvers(c: &mut Criterion) {
    let a = laplacian_2d(32);
    let n = 32 * 32;
    let b = vec![1.0; n];
    let mut ilu = Ilu0::new();
    ilu.setup(&a).unwrap();

    c.bench_function("cg 1024", |ben| {
        let mut solver = CgSolver::new(1e-8, 1000);
        ben.iter(|| {
            let mut x = vec![0.0; n];
            solver.solve(&a, None, black_box(&b), &mut x).unwrap()
        })
    });
    c.bench_function("cg + ilu0 1024", |ben| {
        let mut solver = CgSolver::new(1e-8, 1000);
        ben.iter(|| {
            let mut x = vec![0.0; n];
            solver.solve(&a, Some(&ilu), black_box(&b), &mut x).unwrap()
        })
    });
    c.bench_function("gmres(30) + ilu0 1024", |ben| {
        let mut solver = GmresSolver::new(30, 1e-8, 1000);
        ben.iter(|| {
            let mut x = vec![0.0; n];
            solver.solve(&a, Some(&ilu), black_box(&b), &mut x).unwrap()
        })
    });
}

criterion_group!(benches, bench_kernels, bench_solvers);
criterion_main!(benches);
