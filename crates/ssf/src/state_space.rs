//! State-space realisations of ARMA and ARIMA models.
//!
//! The stationary part uses the Harvey form
//!
//! ```text
//! u[t+1] = T_u * u[t] + R_u * e[t]
//! w[t]   = u[t][0]
//! ```
//!
//! with `T_u` in companion form (first column `-φ`, ones on the
//! super-diagonal) and `R_u = [1, θ1, …, θq, 0, …]`. A unit-root polynomial
//! `δ(B)` of degree `d` is handled by prepending the last `d` values of the
//! component, which are the diffuse part of the initial state.

use ndarray::{Array1, Array2, ArrayView2, Axis, s};
use sadec_arima::{ArimaModel, Polynomial};
use sadec_linalg::{HouseholderQr, QrDecomposition};

use crate::error::SsfError;

/// Maximum number of doublings in [`stationary_factor`].
const MAX_DOUBLINGS: usize = 64;

/// Relative size below which the doubling increment is negligible.
const DOUBLING_TOLERANCE: f64 = 1e-15;

/// Harvey-form transition matrix and noise loading of the ARMA model
/// `ar(B)·w = ma(B)·e`.
pub(crate) fn harvey(ar: &Polynomial, ma: &Polynomial) -> (Array2<f64>, Array1<f64>) {
    let p = ar.degree();
    let q = ma.degree();
    let r = p.max(q + 1);

    let mut t = Array2::zeros((r, r));
    for i in 0..p {
        t[[i, 0]] = -ar.get(i + 1);
    }
    for i in 0..r - 1 {
        t[[i, i + 1]] = 1.0;
    }

    let mut r_vec = Array1::zeros(r);
    r_vec[0] = 1.0;
    for j in 1..=q {
        r_vec[j] = ma.get(j);
    }
    (t, r_vec)
}

/// Re-triangularises a covariance factor: returns `L'` with `L'·L'ᵀ = L·Lᵀ`
/// and at most `L.nrows()` columns.
pub fn compress(l: Array2<f64>) -> Result<Array2<f64>, SsfError> {
    if l.ncols() <= l.nrows() {
        return Ok(l);
    }
    let qr = HouseholderQr::decompose(l.t())?;
    Ok(qr.r().reversed_axes())
}

/// Square root `L` of the stationary covariance `Σ = T·Σ·Tᵀ + R·Rᵀ`,
/// computed by doubling: `Σ_{j<2^{k+1}} = Σ_{j<2^k} + T^{2^k}·Σ_{j<2^k}·T^{2^k}ᵀ`.
///
/// # Errors
///
/// [`SsfError::NonConvergence`] when `T` is not stable enough for the
/// series to converge, [`SsfError::NonFinite`] on overflow.
pub fn stationary_factor(
    t: &Array2<f64>,
    r: &Array1<f64>,
) -> Result<Array2<f64>, SsfError> {
    let mut l = r.view().insert_axis(Axis(1)).to_owned();
    let mut tk = t.clone();
    for _ in 0..MAX_DOUBLINGS {
        let increment = tk.dot(&l);
        let size = max_abs(&l);
        let added = max_abs(&increment);
        if !added.is_finite() {
            return Err(SsfError::NonFinite { position: 0 });
        }
        if added <= DOUBLING_TOLERANCE * size {
            return Ok(l);
        }
        l = compress(hstack(l.view(), increment.view()))?;
        tk = tk.dot(&tk);
    }
    Err(SsfError::NonConvergence {
        iterations: MAX_DOUBLINGS,
    })
}

/// `[a | b]` for matrices with the same number of rows.
pub(crate) fn hstack(a: ArrayView2<'_, f64>, b: ArrayView2<'_, f64>) -> Array2<f64> {
    debug_assert_eq!(a.nrows(), b.nrows());
    let mut out = Array2::zeros((a.nrows(), a.ncols() + b.ncols()));
    out.slice_mut(s![.., ..a.ncols()]).assign(&a);
    out.slice_mut(s![.., a.ncols()..]).assign(&b);
    out
}

fn max_abs(m: &Array2<f64>) -> f64 {
    m.iter().fold(0.0_f64, |acc, v| acc.max(v.abs()))
}

/// State-space form of a single ARIMA component
/// `φ(B)·δ(B)·x_t = θ(B)·e_t`.
///
/// State `s_t = (x_{t-1}, …, x_{t-d}, u_t)` where `u_t` is the Harvey state
/// of the stationary part `φ(B)·w_t = θ(B)·e_t`, `w_t = δ(B)·x_t`.
#[derive(Clone, Debug)]
pub struct ArimaSsf {
    t: Array2<f64>,
    z: Array1<f64>,
    noise: Array1<f64>,
    stationary_factor: Array2<f64>,
    diffuse_dim: usize,
}

impl ArimaSsf {
    /// Builds the realisation of `model`. The noise loading and the initial
    /// factor are scaled by the standard deviation of the innovations.
    ///
    /// # Errors
    ///
    /// Propagates [`stationary_factor`] failures.
    pub fn new(model: &ArimaModel) -> Result<Self, SsfError> {
        let (tu, ru) = harvey(model.stationary_ar(), model.ma());
        let r = tu.nrows();
        let delta = model.differencing();
        let d = delta.degree();
        let n = d + r;
        let sd = model.innovation_variance().sqrt();

        let mut z = Array1::zeros(n);
        for i in 0..d {
            z[i] = -delta.get(i + 1);
        }
        z[d] = 1.0;

        let mut t = Array2::zeros((n, n));
        if d > 0 {
            t.row_mut(0).assign(&z);
            for i in 1..d {
                t[[i, i - 1]] = 1.0;
            }
        }
        t.slice_mut(s![d.., d..]).assign(&tu);

        let mut noise = Array1::zeros(n);
        noise.slice_mut(s![d..]).assign(&(&ru * sd));

        let su = stationary_factor(&tu, &ru)?;
        let mut factor = Array2::zeros((n, su.ncols()));
        factor.slice_mut(s![d.., ..]).assign(&(&su * sd));

        Ok(Self {
            t,
            z,
            noise,
            stationary_factor: factor,
            diffuse_dim: d,
        })
    }

    /// State dimension `d + max(p, q + 1)`.
    pub fn dim(&self) -> usize {
        self.z.len()
    }

    /// Number of diffuse initial elements (degree of `δ`).
    pub fn diffuse_dim(&self) -> usize {
        self.diffuse_dim
    }

    /// Transition matrix.
    pub fn t(&self) -> &Array2<f64> {
        &self.t
    }

    /// Measurement loading: `x_t = z·s_t`.
    pub fn z(&self) -> &Array1<f64> {
        &self.z
    }

    /// Noise loading, scaled by the innovation standard deviation.
    pub fn noise(&self) -> &Array1<f64> {
        &self.noise
    }

    /// Square root of the covariance of the non-diffuse initial state.
    pub fn stationary_factor(&self) -> &Array2<f64> {
        &self.stationary_factor
    }

    /// Loadings of the diffuse initial values: `[I_d; 0]`.
    pub fn diffuse(&self) -> Array2<f64> {
        let mut a0 = Array2::zeros((self.dim(), self.diffuse_dim));
        for i in 0..self.diffuse_dim {
            a0[[i, i]] = 1.0;
        }
        a0
    }
}
