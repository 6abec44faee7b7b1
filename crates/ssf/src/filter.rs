//! Exact ARMA filter used to whiten regression data for GLS.
//!
//! For a stationary ARMA process with unit innovation variance the filter
//! produces standardized one-step prediction errors `e_t = v_t / √F_t` and
//! `log|Ω| = Σ ln F_t`, so that `yᵀΩ⁻¹y = Σ e_t²`. Every column of the input
//! is filtered with the same gains.

use ndarray::{Array1, Array2, ArrayView2, Axis};
use sadec_arima::Polynomial;

use crate::error::SsfError;
use crate::state_space::{harvey, stationary_factor};

/// Distance to 1 of `F_t` below which the gain is treated as constant.
const STEADY_STATE_TOLERANCE: f64 = 1e-13;

/// Whitened columns and the log-determinant of the ARMA covariance.
#[derive(Clone, Debug)]
pub struct FilteredData {
    /// Standardized prediction errors, same shape as the input.
    pub e: Array2<f64>,
    /// `Σ ln F_t`.
    pub log_det: f64,
}

/// Kalman filter for `ar(B)·w_t = ma(B)·e_t`, `e_t ~ N(0, 1)`.
#[derive(Clone, Debug)]
pub struct ArmaFilter {
    t: Array2<f64>,
    r: Array1<f64>,
    p0: Array2<f64>,
}

impl ArmaFilter {
    /// Prepares the filter.
    ///
    /// # Errors
    ///
    /// [`SsfError::NonConvergence`] when `ar` is not stationary.
    pub fn new(ar: &Polynomial, ma: &Polynomial) -> Result<Self, SsfError> {
        let (t, r) = harvey(ar, ma);
        let l = stationary_factor(&t, &r)?;
        let p0 = l.dot(&l.t());
        Ok(Self { t, r, p0 })
    }

    /// Filters every column of `y`.
    ///
    /// # Errors
    ///
    /// [`SsfError::SingularInnovation`] when a prediction variance vanishes.
    pub fn filter(&self, y: ArrayView2<'_, f64>) -> Result<FilteredData, SsfError> {
        let (n, k) = y.dim();
        let dim = self.r.len();
        let rrt = self
            .r
            .view()
            .insert_axis(Axis(1))
            .dot(&self.r.view().insert_axis(Axis(0)));

        let mut a = Array2::<f64>::zeros((dim, k));
        let mut p = self.p0.clone();
        let mut steady = false;
        let mut e = Array2::zeros((n, k));
        let mut log_det = 0.0;

        for (t, yt) in y.axis_iter(Axis(0)).enumerate() {
            let f = p[[0, 0]];
            if f <= 0.0 || !f.is_finite() {
                return Err(SsfError::SingularInnovation { position: t });
            }
            let sf = f.sqrt();
            let v = &yt - &a.row(0);
            e.row_mut(t).assign(&(&v / sf));
            log_det += f.ln();

            // a = T (a + K v), K = P[:, 0] / F
            let gain = p.column(0).to_owned() / f;
            for (mut col, &vj) in a.axis_iter_mut(Axis(1)).zip(v.iter()) {
                col.scaled_add(vj, &gain);
            }
            a = self.t.dot(&a);

            if !steady {
                let pz = p.column(0).to_owned();
                let outer = pz
                    .view()
                    .insert_axis(Axis(1))
                    .dot(&pz.view().insert_axis(Axis(0)));
                let filtered = &p - &(outer / f);
                p = self.t.dot(&filtered).dot(&self.t.t()) + &rrt;
                steady = (p[[0, 0]] - 1.0).abs() < STEADY_STATE_TOLERANCE;
            }
        }

        Ok(FilteredData { e, log_det })
    }
}
