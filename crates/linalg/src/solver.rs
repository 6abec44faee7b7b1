//! QR-based solver for square linear systems.
//!
//! ```text
//! solve(A, b)
//!   ├─ check A square, b.len() == A.rows()
//!   ├─ normalize?  scale private copies of A and b by the row norms of A
//!   ├─ QR-decompose, check rank
//!   ├─ x = R⁻¹·Qᵀ·b
//!   ├─ improve?    r = A·x - b (compensated), δ = R⁻¹·Qᵀ·r, x -= δ
//!   └─ b <- x      the caller's buffer is only written on success
//! ```

use std::marker::PhantomData;

use ndarray::{Array1, Array2, ArrayView2, ArrayViewMut1, ArrayViewMut2, Axis};
use tracing::trace;

use crate::accumulator::{robust_dot, robust_residual};
use crate::error::LinalgError;
use crate::qr::{HouseholderQr, QrDecomposition};

/// Immutable configuration of a [`LinearSystemSolver`].
///
/// Defaults: `normalize = false`, `improve = false`, `enforce_full_rank = true`.
///
/// # Example
///
/// ```
/// use sadec_linalg::SolverConfig;
///
/// let config = SolverConfig::new().with_normalize(true).with_improve(true);
/// assert!(config.normalize());
/// assert!(config.improve());
/// assert!(config.enforce_full_rank());
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SolverConfig {
    normalize: bool,
    improve: bool,
    enforce_full_rank: bool,
}

impl SolverConfig {
    /// Creates the default configuration.
    pub fn new() -> Self {
        Self {
            normalize: false,
            improve: false,
            enforce_full_rank: true,
        }
    }

    /// Scales every row of the system by its Euclidean norm before decomposing.
    pub fn with_normalize(mut self, normalize: bool) -> Self {
        self.normalize = normalize;
        self
    }

    /// Performs one step of iterative refinement after the base solve.
    pub fn with_improve(mut self, improve: bool) -> Self {
        self.improve = improve;
        self
    }

    /// Fails with [`LinalgError::Singular`] on rank deficiency in
    /// [`LinearSystemSolver::solve`]. The matrix overload always checks.
    pub fn with_enforce_full_rank(mut self, enforce: bool) -> Self {
        self.enforce_full_rank = enforce;
        self
    }

    /// Returns whether rows are normalised.
    pub fn normalize(&self) -> bool {
        self.normalize
    }

    /// Returns whether a refinement step is performed.
    pub fn improve(&self) -> bool {
        self.improve
    }

    /// Returns whether the vector overload rejects rank-deficient systems.
    pub fn enforce_full_rank(&self) -> bool {
        self.enforce_full_rank
    }
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Stateless solver for `A·x = b` and `A·X = B` with square `A`.
///
/// The factorisation is pluggable through the [`QrDecomposition`] type
/// parameter and defaults to [`HouseholderQr`]. `A` is only borrowed: with
/// `normalize` the scaled copy is private, without it the matrix is handed
/// to the decomposition as is.
///
/// # Example
///
/// ```
/// use ndarray::array;
/// use sadec_linalg::{LinearSystemSolver, SolverConfig};
///
/// let a = array![[2.0, 1.0], [1.0, 3.0]];
/// let mut b = array![3.0, 5.0];
/// LinearSystemSolver::new(SolverConfig::new().with_improve(true))
///     .solve(a.view(), b.view_mut())
///     .unwrap();
/// assert!((b[0] - 0.8).abs() < 1e-12);
/// assert!((b[1] - 1.4).abs() < 1e-12);
/// ```
#[derive(Clone, Debug)]
pub struct LinearSystemSolver<Q = HouseholderQr> {
    config: SolverConfig,
    decomposition: PhantomData<fn() -> Q>,
}

impl LinearSystemSolver {
    /// Creates a solver backed by [`HouseholderQr`].
    pub fn new(config: SolverConfig) -> Self {
        Self::with_decomposition(config)
    }
}

impl Default for LinearSystemSolver {
    fn default() -> Self {
        Self::new(SolverConfig::default())
    }
}

impl<Q: QrDecomposition> LinearSystemSolver<Q> {
    /// Creates a solver backed by the decomposition `Q`.
    pub fn with_decomposition(config: SolverConfig) -> Self {
        Self {
            config,
            decomposition: PhantomData,
        }
    }

    /// Returns the solver configuration.
    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Solves `A·x = b`; on success `b` holds `x`, on error it is untouched.
    ///
    /// # Errors
    ///
    /// | Variant | Trigger |
    /// |---------|---------|
    /// | [`LinalgError::SquareRequired`] | `a` is not square |
    /// | [`LinalgError::DimensionMismatch`] | `b.len() != a.nrows()` |
    /// | [`LinalgError::Singular`] | rank deficiency and `enforce_full_rank` |
    pub fn solve(
        &self,
        a: ArrayView2<'_, f64>,
        mut b: ArrayViewMut1<'_, f64>,
    ) -> Result<(), LinalgError> {
        let n = check_square(a)?;
        if b.len() != n {
            return Err(LinalgError::DimensionMismatch {
                expected: n,
                found: b.len(),
            });
        }

        let norms = self.config.normalize.then(|| row_norms(a));
        let scaled = norms.as_ref().map(|w| scale_rows(a.to_owned(), w));
        let an = scaled.as_ref().map_or(a.view(), |s| s.view());
        let mut rhs = b.to_owned();
        if let Some(w) = &norms {
            rhs /= w;
        }

        let qr = Q::decompose(an)?;
        trace!(n, rank = qr.rank(), "linear system decomposed");
        if self.config.enforce_full_rank && !qr.is_full_rank() {
            return Err(LinalgError::Singular {
                rank: qr.rank(),
                dim: n,
            });
        }

        let mut x = Array1::zeros(n);
        qr.least_squares(rhs.view(), x.view_mut(), None)?;
        if self.config.improve {
            let residual = robust_residual(an, x.view(), rhs.view());
            let mut delta = Array1::zeros(n);
            qr.least_squares(residual.view(), delta.view_mut(), None)?;
            x -= &delta;
        }
        b.assign(&x);
        Ok(())
    }

    /// Solves `A·X = B` column by column; on success `B` holds `X`, on error
    /// it is untouched.
    ///
    /// Rank deficiency is always an error here, whatever
    /// [`SolverConfig::enforce_full_rank`] says.
    ///
    /// # Errors
    ///
    /// | Variant | Trigger |
    /// |---------|---------|
    /// | [`LinalgError::SquareRequired`] | `a` is not square |
    /// | [`LinalgError::DimensionMismatch`] | `b.nrows() != a.nrows()` |
    /// | [`LinalgError::Singular`] | `a` is rank deficient |
    pub fn solve_matrix(
        &self,
        a: ArrayView2<'_, f64>,
        mut b: ArrayViewMut2<'_, f64>,
    ) -> Result<(), LinalgError> {
        let n = check_square(a)?;
        if b.nrows() != n {
            return Err(LinalgError::DimensionMismatch {
                expected: n,
                found: b.nrows(),
            });
        }

        let norms = self.config.normalize.then(|| row_norms(a));
        let scaled = norms.as_ref().map(|w| scale_rows(a.to_owned(), w));
        let an = scaled.as_ref().map_or(a.view(), |s| s.view());
        let rhs = match &norms {
            Some(w) => scale_rows(b.to_owned(), w),
            None => b.to_owned(),
        };

        let qr = Q::decompose(an)?;
        trace!(n, rank = qr.rank(), cols = b.ncols(), "linear system decomposed");
        if !qr.is_full_rank() {
            return Err(LinalgError::Singular {
                rank: qr.rank(),
                dim: n,
            });
        }

        let mut x = Array2::zeros(rhs.raw_dim());
        let mut delta = Array1::zeros(n);
        for (mut col, r) in x.axis_iter_mut(Axis(1)).zip(rhs.axis_iter(Axis(1))) {
            qr.least_squares(r, col.view_mut(), None)?;
            if self.config.improve {
                let residual = robust_residual(an, col.view(), r);
                qr.least_squares(residual.view(), delta.view_mut(), None)?;
                col -= &delta;
            }
        }
        b.assign(&x);
        Ok(())
    }
}

fn check_square(a: ArrayView2<'_, f64>) -> Result<usize, LinalgError> {
    let (rows, cols) = a.dim();
    if rows != cols {
        return Err(LinalgError::SquareRequired { rows, cols });
    }
    Ok(rows)
}

/// Euclidean row norms with compensated accumulation; zero rows keep a unit
/// scale.
fn row_norms(a: ArrayView2<'_, f64>) -> Array1<f64> {
    a.rows()
        .into_iter()
        .map(|row| robust_dot(row, row).sqrt())
        .map(|norm| if norm > 0.0 { norm } else { 1.0 })
        .collect()
}

fn scale_rows(mut m: Array2<f64>, norms: &Array1<f64>) -> Array2<f64> {
    for (mut row, w) in m.rows_mut().into_iter().zip(norms) {
        row /= *w;
    }
    m
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    #[test]
    fn config_defaults() {
        let config = SolverConfig::default();
        assert!(!config.normalize());
        assert!(!config.improve());
        assert!(config.enforce_full_rank());
    }

    #[test]
    fn config_builder_chaining() {
        let config = SolverConfig::new()
            .with_normalize(true)
            .with_improve(true)
            .with_enforce_full_rank(false);
        assert!(config.normalize());
        assert!(config.improve());
        assert!(!config.enforce_full_rank());
    }

    #[test]
    fn rejects_rectangular() {
        let a = Array2::<f64>::zeros((3, 2));
        let mut b = Array1::zeros(3);
        let err = LinearSystemSolver::default()
            .solve(a.view(), b.view_mut())
            .unwrap_err();
        assert_eq!(err, LinalgError::SquareRequired { rows: 3, cols: 2 });
    }

    #[test]
    fn rejects_wrong_rhs_length() {
        let a = Array2::<f64>::eye(3);
        let mut b = Array1::zeros(4);
        let err = LinearSystemSolver::default()
            .solve(a.view(), b.view_mut())
            .unwrap_err();
        assert_eq!(
            err,
            LinalgError::DimensionMismatch {
                expected: 3,
                found: 4
            }
        );

        let mut bm = Array2::zeros((2, 2));
        let err = LinearSystemSolver::default()
            .solve_matrix(a.view(), bm.view_mut())
            .unwrap_err();
        assert_eq!(
            err,
            LinalgError::DimensionMismatch {
                expected: 3,
                found: 2
            }
        );
    }

    #[test]
    fn normalize_leaves_matrix_untouched() {
        let a = array![[100.0, 1.0], [1.0, 0.01]];
        let copy = a.clone();
        let mut b = array![101.0, 1.01];
        LinearSystemSolver::new(SolverConfig::new().with_normalize(true))
            .solve(a.view(), b.view_mut())
            .unwrap();
        assert_eq!(a, copy);
        assert_abs_diff_eq!(b[0], 1.0, epsilon = 1e-8);
    }

    #[test]
    fn zero_row_is_singular_for_matrix_rhs() {
        let a = array![[1.0, 2.0, 0.5], [0.0, 0.0, 0.0], [3.0, 1.0, 2.0]];
        for config in [
            SolverConfig::new(),
            SolverConfig::new().with_normalize(true),
            SolverConfig::new().with_enforce_full_rank(false),
        ] {
            let mut b = Array2::ones((3, 2));
            let err = LinearSystemSolver::new(config)
                .solve_matrix(a.view(), b.view_mut())
                .unwrap_err();
            assert!(matches!(err, LinalgError::Singular { rank: 2, dim: 3 }));
        }
    }

    #[test]
    fn vector_rank_policy() {
        let a = array![[1.0, 2.0], [1.0, 2.0]];
        let mut b = array![3.0, 3.0];
        let err = LinearSystemSolver::default()
            .solve(a.view(), b.view_mut())
            .unwrap_err();
        assert!(matches!(err, LinalgError::Singular { .. }));

        let mut b = array![3.0, 3.0];
        LinearSystemSolver::new(SolverConfig::new().with_enforce_full_rank(false))
            .solve(a.view(), b.view_mut())
            .unwrap();
        assert!(b.iter().all(|x| x.is_finite()));
        // the returned x still satisfies the consistent system
        assert_abs_diff_eq!(b[0] + 2.0 * b[1], 3.0, epsilon = 1e-10);
    }

    #[test]
    fn failed_solve_leaves_rhs_untouched() {
        let a = array![[2.0, 0.0], [4.0, 0.0]];
        let solver = LinearSystemSolver::new(SolverConfig::new().with_normalize(true));

        let mut b = array![3.0, 8.0];
        let err = solver.solve(a.view(), b.view_mut()).unwrap_err();
        assert!(matches!(err, LinalgError::Singular { rank: 1, dim: 2 }));
        assert_eq!(b, array![3.0, 8.0]);

        let mut bm = array![[3.0, 1.0], [8.0, 2.0]];
        let err = solver.solve_matrix(a.view(), bm.view_mut()).unwrap_err();
        assert!(matches!(err, LinalgError::Singular { rank: 1, dim: 2 }));
        assert_eq!(bm, array![[3.0, 1.0], [8.0, 2.0]]);
    }

    #[test]
    fn normalized_matrix_solve_matches_plain() {
        let a = array![[1e4, 2e4, 0.0], [1.0, 0.0, 3.0], [0.0, 1e-3, 2e-3]];
        let rhs = array![[3e4, 1.0], [4.0, 0.0], [3e-3, 1e-3]];
        let mut plain = rhs.clone();
        LinearSystemSolver::default()
            .solve_matrix(a.view(), plain.view_mut())
            .unwrap();
        let mut scaled = rhs.clone();
        LinearSystemSolver::new(SolverConfig::new().with_normalize(true).with_improve(true))
            .solve_matrix(a.view(), scaled.view_mut())
            .unwrap();
        for (p, q) in plain.iter().zip(scaled.iter()) {
            assert_abs_diff_eq!(p, q, epsilon = 1e-9);
        }
        assert_abs_diff_eq!(scaled[[0, 0]], 1.0, epsilon = 1e-9);
    }

    #[test]
    fn matrix_rhs_identity_gives_inverse() {
        let a = array![[4.0, 7.0], [2.0, 6.0]];
        let mut inv = Array2::eye(2);
        LinearSystemSolver::new(SolverConfig::new().with_improve(true))
            .solve_matrix(a.view(), inv.view_mut())
            .unwrap();
        assert_abs_diff_eq!(inv[[0, 0]], 0.6, epsilon = 1e-12);
        assert_abs_diff_eq!(inv[[0, 1]], -0.7, epsilon = 1e-12);
        assert_abs_diff_eq!(inv[[1, 0]], -0.2, epsilon = 1e-12);
        assert_abs_diff_eq!(inv[[1, 1]], 0.4, epsilon = 1e-12);
    }
}
