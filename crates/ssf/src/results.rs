//! Output of the diffuse smoother.

use ndarray::{Array1, Array2, ArrayView1};

/// Diffuse log-likelihood by-products of a filtering pass.
///
/// The variance scale is concentrated out: with `n_eff = n_obs - d` and
/// `σ̂² = ssq / n_eff`,
///
/// ```text
/// ll = -0.5 * (n_eff * (ln 2π + 1 + ln σ̂²) + log_det + diffuse_log_det)
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DiffuseLikelihood {
    ssq: f64,
    log_det: f64,
    diffuse_log_det: f64,
    observations: usize,
    diffuse_dim: usize,
}

impl DiffuseLikelihood {
    pub(crate) fn new(
        ssq: f64,
        log_det: f64,
        diffuse_log_det: f64,
        observations: usize,
        diffuse_dim: usize,
    ) -> Self {
        Self {
            ssq,
            log_det,
            diffuse_log_det,
            observations,
            diffuse_dim,
        }
    }

    /// Sum of squared standardized innovations after removing the diffuse
    /// initial values.
    pub fn ssq(&self) -> f64 {
        self.ssq
    }

    /// `Σ ln F_t`.
    pub fn log_det(&self) -> f64 {
        self.log_det
    }

    /// `ln |S|` of the diffuse information matrix.
    pub fn diffuse_log_det(&self) -> f64 {
        self.diffuse_log_det
    }

    /// Number of non-missing observations.
    pub fn observations(&self) -> usize {
        self.observations
    }

    /// Number of diffuse initial elements.
    pub fn diffuse_dim(&self) -> usize {
        self.diffuse_dim
    }

    /// Effective number of observations, `n_obs - d`.
    pub fn effective_observations(&self) -> usize {
        self.observations.saturating_sub(self.diffuse_dim)
    }

    /// Maximum-likelihood estimate of the variance scale.
    pub fn sigma2(&self) -> f64 {
        self.ssq / self.effective_observations() as f64
    }

    /// Diffuse log-likelihood with the variance scale concentrated out.
    pub fn log_likelihood(&self) -> f64 {
        let n = self.effective_observations() as f64;
        -0.5 * (n * ((2.0 * std::f64::consts::PI).ln() + 1.0 + self.sigma2().ln())
            + self.log_det
            + self.diffuse_log_det)
    }
}

/// Smoothed states and covariances over the whole data window.
#[derive(Clone, Debug)]
pub struct SmoothingResults {
    states: Array2<f64>,
    variances: Vec<Array2<f64>>,
    likelihood: DiffuseLikelihood,
}

impl SmoothingResults {
    pub(crate) fn new(
        states: Array2<f64>,
        variances: Vec<Array2<f64>>,
        likelihood: DiffuseLikelihood,
    ) -> Self {
        Self {
            states,
            variances,
            likelihood,
        }
    }

    /// Length of the data window.
    pub fn len(&self) -> usize {
        self.states.nrows()
    }

    /// `true` when the window is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Smoothed signal `loading·s_t` for every `t`.
    pub fn signal(&self, loading: ArrayView1<'_, f64>) -> Array1<f64> {
        self.states.dot(&loading)
    }

    /// Variance of the smoothed signal `loading·P_t·loadingᵀ` for every `t`.
    pub fn signal_variance(&self, loading: ArrayView1<'_, f64>) -> Array1<f64> {
        self.variances
            .iter()
            .map(|p| loading.dot(&p.dot(&loading)))
            .collect()
    }

    /// Multiplies every covariance by `factor`. Means are unchanged.
    pub fn rescale_variances(&mut self, factor: f64) {
        for p in &mut self.variances {
            *p *= factor;
        }
    }

    /// Diffuse likelihood of the filtering pass.
    pub fn likelihood(&self) -> &DiffuseLikelihood {
        &self.likelihood
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    fn results() -> SmoothingResults {
        SmoothingResults::new(
            array![[1.0, 2.0], [3.0, 4.0]],
            vec![array![[1.0, 0.5], [0.5, 2.0]], array![[0.0, 0.0], [0.0, 1.0]]],
            DiffuseLikelihood::new(10.0, 2.0, 0.0, 10, 0),
        )
    }

    #[test]
    fn signal_and_variance() {
        let r = results();
        let loading = array![1.0, 1.0];
        assert_eq!(r.signal(loading.view()), array![3.0, 7.0]);
        assert_eq!(r.signal_variance(loading.view()), array![4.0, 1.0]);
        assert_eq!(r.signal(array![0.0, 1.0].view()), array![2.0, 4.0]);
    }

    #[test]
    fn rescaling_leaves_means() {
        let mut r = results();
        r.rescale_variances(3.0);
        let loading = array![1.0, 1.0];
        assert_eq!(r.signal_variance(loading.view()), array![12.0, 3.0]);
        assert_eq!(r.signal(loading.view()), array![3.0, 7.0]);
    }

    #[test]
    fn concentrated_likelihood() {
        let ll = DiffuseLikelihood::new(20.0, 1.0, 0.5, 12, 2);
        assert_eq!(ll.effective_observations(), 10);
        assert_abs_diff_eq!(ll.sigma2(), 2.0);
        let expected =
            -0.5 * (10.0 * ((2.0 * std::f64::consts::PI).ln() + 1.0 + 2.0_f64.ln()) + 1.5);
        assert_abs_diff_eq!(ll.log_likelihood(), expected, epsilon = 1e-12);
    }
}
