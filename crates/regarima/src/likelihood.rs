//! Concentrated likelihood of a regression with ARMA errors.
//!
//! With `Ω` the ARMA covariance (unit innovation variance), the filter
//! gives `L⁻¹y` and `L⁻¹X`. The GLS coefficients `β̂ = (X̃ᵀX̃)⁻¹X̃ᵀỹ` and the
//! variance `σ̂² = e·e / n` are profiled out, leaving
//!
//! ```text
//! ll = -0.5 * (n * (ln 2π + 1 + ln σ̂²) + ln|Ω|)
//! ```
//!
//! Missing values enter as leading dummy columns of `X`; `n` then counts the
//! observed positions only.

use ndarray::{Array1, Array2, ArrayView1, ArrayView2, s};
use sadec_linalg::{LinearSystemSolver, SolverConfig};
use sadec_ssf::ArmaFilter;
use tracing::trace;

use crate::error::RegArimaError;
use crate::model::RegArmaModel;

/// Likelihood with regression coefficients and variance profiled out.
#[derive(Clone, Debug, PartialEq)]
pub struct ConcentratedLikelihood {
    ssq: f64,
    log_det: f64,
    coefficients: Array1<f64>,
    unscaled_covariance: Array2<f64>,
    residuals: Array1<f64>,
    missing: usize,
}

impl ConcentratedLikelihood {
    /// Number of observed positions.
    pub fn observations(&self) -> usize {
        self.residuals.len() - self.missing
    }

    /// Number of missing positions handled by dummies.
    pub fn missing(&self) -> usize {
        self.missing
    }

    /// Sum of squared standardized residuals.
    pub fn ssq(&self) -> f64 {
        self.ssq
    }

    /// `ln|Ω|`.
    pub fn log_det(&self) -> f64 {
        self.log_det
    }

    /// ML estimate of the innovation variance, `ssq / n`.
    pub fn sigma2(&self) -> f64 {
        self.ssq / self.observations() as f64
    }

    /// `|Ω|^(1/n)`, the factor turning `ssq` into the ML objective.
    pub fn factor(&self) -> f64 {
        (self.log_det / self.observations() as f64).exp()
    }

    pub fn log_likelihood(&self) -> f64 {
        let n = self.observations() as f64;
        -0.5 * (n * ((2.0 * std::f64::consts::PI).ln() + 1.0 + self.sigma2().ln()) + self.log_det)
    }

    /// GLS estimates of the regression coefficients, dummies excluded.
    pub fn coefficients(&self) -> ArrayView1<'_, f64> {
        self.coefficients.slice(s![self.missing..])
    }

    /// `(X̃ᵀX̃)⁻¹` restricted to the regression coefficients.
    pub fn unscaled_covariance(&self) -> ArrayView2<'_, f64> {
        self.unscaled_covariance
            .slice(s![self.missing.., self.missing..])
    }

    /// GLS coefficients of the missing-value dummies, in position order.
    pub fn missing_effects(&self) -> ArrayView1<'_, f64> {
        self.coefficients.slice(s![..self.missing])
    }

    /// Standard errors of the coefficients, using `ssq / (n - k - extra)`
    /// with `extra` additional estimated parameters.
    pub fn coefficient_stderr(&self, extra: usize) -> Array1<f64> {
        self.stderr(extra).slice(s![self.missing..]).to_owned()
    }

    /// Standard errors of [`missing_effects`](Self::missing_effects).
    pub fn missing_stderr(&self, extra: usize) -> Array1<f64> {
        self.stderr(extra).slice(s![..self.missing]).to_owned()
    }

    fn stderr(&self, extra: usize) -> Array1<f64> {
        let k = self.coefficients.len();
        let df = self.residuals.len().saturating_sub(k + extra).max(1) as f64;
        let scale = self.ssq / df;
        self.unscaled_covariance
            .diag()
            .mapv(|c| (scale * c.max(0.0)).sqrt())
    }

    /// Standardized one-step prediction errors of the regression residuals.
    pub fn residuals(&self) -> &Array1<f64> {
        &self.residuals
    }
}

/// Computes [`ConcentratedLikelihood`] values.
#[derive(Clone, Debug)]
pub struct ConcentratedLikelihoodComputer {
    solver: LinearSystemSolver,
}

impl Default for ConcentratedLikelihoodComputer {
    fn default() -> Self {
        Self::new()
    }
}

impl ConcentratedLikelihoodComputer {
    /// Computer solving the normal equations with row normalisation and one
    /// refinement step.
    pub fn new() -> Self {
        Self::with_solver(LinearSystemSolver::new(
            SolverConfig::new().with_normalize(true).with_improve(true),
        ))
    }

    pub fn with_solver(solver: LinearSystemSolver) -> Self {
        Self { solver }
    }

    /// Evaluates the concentrated likelihood of `model`.
    ///
    /// # Errors
    ///
    /// | Variant | Trigger |
    /// |---------|---------|
    /// | [`RegArimaError::Ssf`] | AR part not stationary, or filter breakdown |
    /// | [`RegArimaError::Linalg`] | regressors collinear after whitening |
    pub fn compute(&self, model: &RegArmaModel<'_>) -> Result<ConcentratedLikelihood, RegArimaError> {
        let y = model.y();
        let x = model.x();
        let n = y.len();
        let k = x.ncols();

        let filter = ArmaFilter::new(model.ar(), model.ma())?;
        let mut data = Array2::zeros((n, k + 1));
        data.column_mut(0).assign(&y);
        data.slice_mut(s![.., 1..]).assign(&x);
        let filtered = filter.filter(data.view())?;

        let ey = filtered.e.column(0);
        let ex = filtered.e.slice(s![.., 1..]);

        let (coefficients, unscaled_covariance, residuals) = if k == 0 {
            (Array1::zeros(0), Array2::zeros((0, 0)), ey.to_owned())
        } else {
            let xtx = ex.t().dot(&ex);
            let mut b = ex.t().dot(&ey);
            self.solver.solve(xtx.view(), b.view_mut())?;

            let mut cov = Array2::eye(k);
            self.solver.solve_matrix(xtx.view(), cov.view_mut())?;

            let e = &ey - &ex.dot(&b);
            (b, cov, e)
        };
        let ssq: f64 = residuals.iter().map(|v| v * v).sum();
        trace!(n, k, ssq, log_det = filtered.log_det, "concentrated likelihood");

        Ok(ConcentratedLikelihood {
            ssq,
            log_det: filtered.log_det,
            coefficients,
            unscaled_covariance,
            residuals,
            missing: model.missing(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::DifferencedData;
    use approx::assert_abs_diff_eq;
    use ndarray::array;
    use sadec_arima::Polynomial;

    #[test]
    fn white_noise_mean_is_sample_mean() {
        let data = DifferencedData {
            y: array![1.0, 2.0, 6.0, 3.0],
            x: Array2::ones((4, 1)),
            missing: 0,
        };
        let model = RegArmaModel::new(&data, Polynomial::one(), Polynomial::one());
        let ll = ConcentratedLikelihoodComputer::new().compute(&model).unwrap();
        assert_abs_diff_eq!(ll.coefficients()[0], 3.0, epsilon = 1e-12);
        assert_abs_diff_eq!(ll.ssq(), 4.0 + 1.0 + 9.0 + 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(ll.unscaled_covariance()[[0, 0]], 0.25, epsilon = 1e-12);
        assert_abs_diff_eq!(ll.log_det(), 0.0);
        assert_abs_diff_eq!(ll.factor(), 1.0);
        // se = sqrt(ssq / (n - 1) / n)
        assert_abs_diff_eq!(
            ll.coefficient_stderr(0)[0],
            (14.0 / 3.0 / 4.0_f64).sqrt(),
            epsilon = 1e-12
        );
    }

    #[test]
    fn missing_dummy_is_profiled_out() {
        // y = [1, 2, ?, 6, 3] with a mean
        let data = DifferencedData {
            y: array![1.0, 2.0, 0.0, 6.0, 3.0],
            x: array![[0.0, 1.0], [0.0, 1.0], [1.0, 1.0], [0.0, 1.0], [0.0, 1.0]],
            missing: 1,
        };
        let model = RegArmaModel::new(&data, Polynomial::one(), Polynomial::one());
        let ll = ConcentratedLikelihoodComputer::new().compute(&model).unwrap();
        assert_eq!(ll.observations(), 4);
        assert_eq!(ll.missing(), 1);
        assert_eq!(ll.coefficients().len(), 1);
        assert_abs_diff_eq!(ll.coefficients()[0], 3.0, epsilon = 1e-12);
        assert_abs_diff_eq!(ll.missing_effects()[0], -3.0, epsilon = 1e-12);
        assert_abs_diff_eq!(ll.ssq(), 14.0, epsilon = 1e-12);
        assert_abs_diff_eq!(ll.sigma2(), 3.5, epsilon = 1e-12);
        assert_abs_diff_eq!(ll.unscaled_covariance()[[0, 0]], 0.25, epsilon = 1e-12);
        // same inference on the mean as without the missing position
        assert_abs_diff_eq!(
            ll.coefficient_stderr(0)[0],
            (14.0 / 3.0 / 4.0_f64).sqrt(),
            epsilon = 1e-12
        );
        assert_eq!(ll.missing_stderr(0).len(), 1);
    }

    #[test]
    fn no_regressor_keeps_filtered_series() {
        let data = DifferencedData {
            y: array![1.0, -1.0, 0.5],
            x: Array2::zeros((3, 0)),
            missing: 0,
        };
        let model = RegArmaModel::new(&data, Polynomial::from_lags(&[-0.5]), Polynomial::one());
        let ll = ConcentratedLikelihoodComputer::new().compute(&model).unwrap();
        assert!(ll.coefficients().is_empty());
        assert_eq!(ll.observations(), 3);
        // e_2 = y_2 - 0.5 y_1
        assert_abs_diff_eq!(ll.residuals()[1], -1.5, epsilon = 1e-12);
        let expected = -0.5
            * (3.0 * ((2.0 * std::f64::consts::PI).ln() + 1.0 + ll.sigma2().ln())
                + ll.log_det());
        assert_abs_diff_eq!(ll.log_likelihood(), expected, epsilon = 1e-12);
    }

    #[test]
    fn collinear_regressors_are_rejected() {
        let data = DifferencedData {
            y: array![1.0, 2.0, 3.0, 5.0],
            x: array![[1.0, 2.0], [1.0, 2.0], [1.0, 2.0], [1.0, 2.0]],
            missing: 0,
        };
        let model = RegArmaModel::new(&data, Polynomial::one(), Polynomial::one());
        let err = ConcentratedLikelihoodComputer::new().compute(&model).unwrap_err();
        assert!(matches!(err, RegArimaError::Linalg(_)));
    }
}
