//! Property tests for the linear system solver on random systems.

use ndarray::{Array1, Array2, Axis};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand_distr::{Distribution, Normal};
use sadec_linalg::{LinalgError, LinearSystemSolver, SolverConfig, robust_residual};

fn random_matrix(n: usize, rng: &mut StdRng) -> Array2<f64> {
    let normal = Normal::new(0.0, 1.0).unwrap();
    Array2::from_shape_fn((n, n), |_| normal.sample(rng))
}

fn random_vector(n: usize, rng: &mut StdRng) -> Array1<f64> {
    let normal = Normal::new(0.0, 1.0).unwrap();
    Array1::from_shape_fn(n, |_| normal.sample(rng))
}

/// Orthonormalises the columns of a random Gaussian matrix (modified
/// Gram-Schmidt, applied twice).
fn random_orthogonal(n: usize, rng: &mut StdRng) -> Array2<f64> {
    let mut q = random_matrix(n, rng);
    for _ in 0..2 {
        for j in 0..n {
            for k in 0..j {
                let proj = q.column(k).dot(&q.column(j));
                let qk = q.column(k).to_owned();
                q.column_mut(j).scaled_add(-proj, &qk);
            }
            let norm = q.column(j).dot(&q.column(j)).sqrt();
            q.column_mut(j).mapv_inplace(|v| v / norm);
        }
    }
    q
}

/// `U·diag(s)·Vᵀ` with singular values log-spaced from 1 down to `1/cond`.
fn conditioned_matrix(n: usize, cond: f64, rng: &mut StdRng) -> Array2<f64> {
    let u = random_orthogonal(n, rng);
    let v = random_orthogonal(n, rng);
    let s = Array1::from_shape_fn(n, |i| cond.powf(-(i as f64) / (n as f64 - 1.0)));
    let us = &u * &s.insert_axis(Axis(0));
    us.dot(&v.t())
}

fn norm(x: &Array1<f64>) -> f64 {
    x.dot(x).sqrt()
}

#[test]
fn well_conditioned_systems_are_solved_accurately() {
    let mut rng = StdRng::seed_from_u64(7);
    for config in [
        SolverConfig::new(),
        SolverConfig::new().with_normalize(true),
        SolverConfig::new().with_improve(true),
        SolverConfig::new().with_normalize(true).with_improve(true),
    ] {
        let solver = LinearSystemSolver::new(config);
        for trial in 0..20 {
            let n = 3 + trial % 15;
            let a = conditioned_matrix(n, 500.0, &mut rng);
            let x = random_vector(n, &mut rng);
            let mut b = a.dot(&x);
            solver.solve(a.view(), b.view_mut()).unwrap();
            let err = norm(&(&b - &x));
            assert!(
                err < 1e-9 * norm(&x),
                "config {config:?}, n = {n}: error {err:e}"
            );
        }
    }
}

#[test]
fn normalization_does_not_change_the_solution() {
    let mut rng = StdRng::seed_from_u64(11);
    let plain = LinearSystemSolver::new(SolverConfig::new());
    let scaled = LinearSystemSolver::new(SolverConfig::new().with_normalize(true));
    for _ in 0..20 {
        let n = 8;
        let mut a = random_matrix(n, &mut rng);
        // badly scaled rows, still invertible
        for (i, mut row) in a.rows_mut().into_iter().enumerate() {
            row *= 10f64.powi(i as i32 - 4);
        }
        let b = random_vector(n, &mut rng);

        let mut x1 = b.clone();
        plain.solve(a.view(), x1.view_mut()).unwrap();
        let mut x2 = b.clone();
        scaled.solve(a.view(), x2.view_mut()).unwrap();

        let rel = norm(&(&x1 - &x2)) / norm(&x1);
        assert!(rel < 1e-8, "relative difference {rel:e}");
    }
}

#[test]
fn refinement_reduces_the_residual() {
    let mut rng = StdRng::seed_from_u64(2024);
    let n = 30;
    let a = conditioned_matrix(n, 1e7, &mut rng);
    let base = LinearSystemSolver::new(SolverConfig::new());
    let refined = LinearSystemSolver::new(SolverConfig::new().with_improve(true));

    let trials = 50;
    let mut improved = 0;
    for _ in 0..trials {
        let x = random_vector(n, &mut rng);
        let b = a.dot(&x);

        let mut x0 = b.clone();
        base.solve(a.view(), x0.view_mut()).unwrap();
        let mut x1 = b.clone();
        refined.solve(a.view(), x1.view_mut()).unwrap();

        let r0 = norm(&robust_residual(a.view(), x0.view(), b.view()));
        let r1 = norm(&robust_residual(a.view(), x1.view(), b.view()));
        if r1 < r0 {
            improved += 1;
        }
    }
    assert!(
        improved * 10 >= trials * 9,
        "refinement improved only {improved} of {trials} trials"
    );
}

#[test]
fn zero_row_fails_the_matrix_solve() {
    let mut rng = StdRng::seed_from_u64(3);
    let mut a = random_matrix(5, &mut rng);
    a.row_mut(2).fill(0.0);
    let mut b = Array2::eye(5);
    let err = LinearSystemSolver::default()
        .solve_matrix(a.view(), b.view_mut())
        .unwrap_err();
    assert!(matches!(err, LinalgError::Singular { .. }), "{err}");
}

#[test]
fn duplicate_rows_fail_the_matrix_solve() {
    let mut rng = StdRng::seed_from_u64(5);
    let mut a = random_matrix(6, &mut rng);
    let dup = a.row(1).to_owned();
    a.row_mut(4).assign(&dup);
    for config in [SolverConfig::new(), SolverConfig::new().with_normalize(true)] {
        let mut b = Array2::ones((6, 3));
        let err = LinearSystemSolver::new(config)
            .solve_matrix(a.view(), b.view_mut())
            .unwrap_err();
        assert!(matches!(err, LinalgError::Singular { .. }), "{err}");
    }
}

#[test]
fn matrix_solve_matches_column_solves() {
    let mut rng = StdRng::seed_from_u64(13);
    let a = conditioned_matrix(7, 50.0, &mut rng);
    let rhs = random_matrix(7, &mut rng);
    let solver = LinearSystemSolver::new(SolverConfig::new().with_normalize(true).with_improve(true));

    let mut x = rhs.clone();
    solver.solve_matrix(a.view(), x.view_mut()).unwrap();
    for j in 0..7 {
        let mut col = rhs.column(j).to_owned();
        solver.solve(a.view(), col.view_mut()).unwrap();
        for i in 0..7 {
            assert!((col[i] - x[[i, j]]).abs() < 1e-12);
        }
    }
}

#[test]
fn square_requirement_is_checked_first() {
    let a = Array2::<f64>::zeros((4, 3));
    let mut b = Array1::zeros(2);
    let err = LinearSystemSolver::default()
        .solve(a.view(), b.view_mut())
        .unwrap_err();
    assert_eq!(err, LinalgError::SquareRequired { rows: 4, cols: 3 });
}
