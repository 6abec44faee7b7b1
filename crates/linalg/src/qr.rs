//! Orthogonal-triangular factorisation.
//!
//! [`QrDecomposition`] is the contract the solver consumes; [`HouseholderQr`]
//! is the implementation used throughout the workspace. Factors are stored
//! compactly: `R` above the diagonal (its diagonal kept apart) and the
//! Householder vectors on and below it.

use ndarray::{Array1, Array2, ArrayView1, ArrayView2, ArrayViewMut1};

use crate::error::LinalgError;

/// Relative threshold on `|R_kk| / max |R_jj|` below which a column is
/// considered linearly dependent on the previous ones.
pub const RANK_TOLERANCE: f64 = 1e-13;

/// An orthogonal-triangular factorisation `A = Q·R` of an `m x n` matrix
/// with `m >= n`.
pub trait QrDecomposition: Sized {
    /// Factorises `a`.
    ///
    /// # Errors
    ///
    /// [`LinalgError::DimensionMismatch`] when `a` has fewer rows than columns.
    fn decompose(a: ArrayView2<'_, f64>) -> Result<Self, LinalgError>;

    /// Number of rows of the factorised matrix.
    fn rows(&self) -> usize;

    /// Number of columns of the factorised matrix.
    fn cols(&self) -> usize;

    /// Numerical rank.
    fn rank(&self) -> usize;

    /// `true` when the numerical rank equals the number of columns.
    fn is_full_rank(&self) -> bool {
        self.rank() == self.cols()
    }

    /// The `n x n` upper-triangular factor.
    fn r(&self) -> Array2<f64>;

    /// Least-squares solution of `A·x ≈ b`.
    ///
    /// `x` receives the `n` coefficients. When given, `residuals` receives the
    /// last `m - n` elements of `Qᵀ·b`, whose squared norm is the residual sum
    /// of squares. Coefficients tied to rank-deficient columns are set to zero.
    ///
    /// # Errors
    ///
    /// [`LinalgError::DimensionMismatch`] when a buffer has the wrong length.
    fn least_squares(
        &self,
        b: ArrayView1<'_, f64>,
        x: ArrayViewMut1<'_, f64>,
        residuals: Option<ArrayViewMut1<'_, f64>>,
    ) -> Result<(), LinalgError>;
}

/// Householder QR factorisation without column pivoting.
#[derive(Clone, Debug)]
pub struct HouseholderQr {
    qr: Array2<f64>,
    rdiag: Array1<f64>,
    max_rdiag: f64,
    rank: usize,
}

impl HouseholderQr {
    /// Diagonal of `R`.
    pub fn rdiag(&self) -> ArrayView1<'_, f64> {
        self.rdiag.view()
    }

    /// Applies `Qᵀ` to `b` in place.
    fn apply_qt(&self, b: &mut Array1<f64>) {
        let (m, n) = self.qr.dim();
        for k in 0..n {
            let pivot = self.qr[[k, k]];
            if pivot == 0.0 {
                continue;
            }
            let mut s = 0.0;
            for i in k..m {
                s += self.qr[[i, k]] * b[i];
            }
            s = -s / pivot;
            for i in k..m {
                b[i] += s * self.qr[[i, k]];
            }
        }
    }

    fn is_negligible(&self, k: usize) -> bool {
        self.rdiag[k].abs() <= RANK_TOLERANCE * self.max_rdiag
    }
}

impl QrDecomposition for HouseholderQr {
    fn decompose(a: ArrayView2<'_, f64>) -> Result<Self, LinalgError> {
        let (m, n) = a.dim();
        if m < n {
            return Err(LinalgError::DimensionMismatch {
                expected: n,
                found: m,
            });
        }
        let mut qr = a.to_owned();
        let mut rdiag = Array1::zeros(n);

        for k in 0..n {
            let mut nrm = 0.0_f64;
            for i in k..m {
                nrm = nrm.hypot(qr[[i, k]]);
            }
            if nrm == 0.0 {
                continue;
            }
            if qr[[k, k]] < 0.0 {
                nrm = -nrm;
            }
            for i in k..m {
                qr[[i, k]] /= nrm;
            }
            qr[[k, k]] += 1.0;
            for j in (k + 1)..n {
                let mut s = 0.0;
                for i in k..m {
                    s += qr[[i, k]] * qr[[i, j]];
                }
                s = -s / qr[[k, k]];
                for i in k..m {
                    let qik = qr[[i, k]];
                    qr[[i, j]] += s * qik;
                }
            }
            rdiag[k] = -nrm;
        }

        let max_rdiag = rdiag.iter().fold(0.0_f64, |acc: f64, d: &f64| acc.max(d.abs()));
        let rank = rdiag
            .iter()
            .filter(|d| max_rdiag > 0.0 && d.abs() > RANK_TOLERANCE * max_rdiag)
            .count();

        Ok(Self {
            qr,
            rdiag,
            max_rdiag,
            rank,
        })
    }

    fn rows(&self) -> usize {
        self.qr.nrows()
    }

    fn cols(&self) -> usize {
        self.qr.ncols()
    }

    fn rank(&self) -> usize {
        self.rank
    }

    fn r(&self) -> Array2<f64> {
        let n = self.cols();
        Array2::from_shape_fn((n, n), |(i, j)| match i.cmp(&j) {
            std::cmp::Ordering::Less => self.qr[[i, j]],
            std::cmp::Ordering::Equal => self.rdiag[i],
            std::cmp::Ordering::Greater => 0.0,
        })
    }

    fn least_squares(
        &self,
        b: ArrayView1<'_, f64>,
        mut x: ArrayViewMut1<'_, f64>,
        residuals: Option<ArrayViewMut1<'_, f64>>,
    ) -> Result<(), LinalgError> {
        let (m, n) = self.qr.dim();
        if b.len() != m {
            return Err(LinalgError::DimensionMismatch {
                expected: m,
                found: b.len(),
            });
        }
        if x.len() != n {
            return Err(LinalgError::DimensionMismatch {
                expected: n,
                found: x.len(),
            });
        }

        let mut qtb = b.to_owned();
        self.apply_qt(&mut qtb);

        // Back substitution on R.
        for k in (0..n).rev() {
            if self.is_negligible(k) {
                x[k] = 0.0;
                continue;
            }
            let mut s = qtb[k];
            for j in (k + 1)..n {
                s -= self.qr[[k, j]] * x[j];
            }
            x[k] = s / self.rdiag[k];
        }

        if let Some(mut e) = residuals {
            if e.len() != m - n {
                return Err(LinalgError::DimensionMismatch {
                    expected: m - n,
                    found: e.len(),
                });
            }
            e.assign(&qtb.slice(ndarray::s![n..]));
        }
        Ok(())
    }
}
