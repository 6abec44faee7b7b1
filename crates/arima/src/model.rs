//! Generic ARIMA models `φ(B)·δ(B)·x_t = θ(B)·e_t`.

use ndarray::Array2;
use rand::Rng;
use rand_distr::{Distribution, StandardNormal};
use serde::{Deserialize, Serialize};

use crate::error::ArimaError;
use crate::polynomial::Polynomial;

/// An ARIMA model with separate stationary AR `φ(B)`, differencing (unit
/// root) `δ(B)` and MA `θ(B)` polynomials, and innovation variance `σ²`.
///
/// A model with `σ² = 0` is *null*: it generates the zero process and is
/// skipped by decompositions.
///
/// # Example
///
/// ```
/// use sadec_arima::{ArimaModel, Polynomial};
///
/// // random walk with MA(1) innovations
/// let model = ArimaModel::new(
///     Polynomial::one(),
///     Polynomial::differencing(1),
///     Polynomial::from_lags(&[-0.4]),
///     1.0,
/// )
/// .unwrap();
/// assert_eq!(model.ar().coefficients(), &[1.0, -1.0]);
/// assert!(!model.is_null());
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ArimaModel {
    stationary_ar: Polynomial,
    differencing: Polynomial,
    ma: Polynomial,
    innovation_variance: f64,
}

impl ArimaModel {
    /// Creates a model, validating its polynomials and variance.
    ///
    /// # Errors
    ///
    /// | Variant | Trigger |
    /// |---------|---------|
    /// | [`ArimaError::NonFinite`] | a coefficient or the variance is not finite |
    /// | [`ArimaError::NonUnitConstant`] | a polynomial does not start with 1 |
    /// | [`ArimaError::NegativeVariance`] | `innovation_variance < 0` |
    /// | [`ArimaError::NonStationary`] | `stationary_ar` has a root on or inside the unit circle |
    pub fn new(
        stationary_ar: Polynomial,
        differencing: Polynomial,
        ma: Polynomial,
        innovation_variance: f64,
    ) -> Result<Self, ArimaError> {
        for p in [&stationary_ar, &differencing, &ma] {
            Polynomial::checked(p.coefficients())?;
        }
        if !innovation_variance.is_finite() {
            return Err(ArimaError::NonFinite);
        }
        if innovation_variance < 0.0 {
            return Err(ArimaError::NegativeVariance(innovation_variance));
        }
        if !stationary_ar.is_stationary() {
            return Err(ArimaError::NonStationary);
        }
        Ok(Self {
            stationary_ar,
            differencing,
            ma,
            innovation_variance,
        })
    }

    /// White noise with variance `variance`.
    ///
    /// # Errors
    ///
    /// Same as [`ArimaModel::new`].
    pub fn white_noise(variance: f64) -> Result<Self, ArimaError> {
        Self::new(Polynomial::one(), Polynomial::one(), Polynomial::one(), variance)
    }

    /// The null model (zero variance).
    pub fn null() -> Self {
        Self {
            stationary_ar: Polynomial::one(),
            differencing: Polynomial::one(),
            ma: Polynomial::one(),
            innovation_variance: 0.0,
        }
    }

    /// Stationary autoregressive polynomial `φ(B)`.
    pub fn stationary_ar(&self) -> &Polynomial {
        &self.stationary_ar
    }

    /// Differencing polynomial `δ(B)`.
    pub fn differencing(&self) -> &Polynomial {
        &self.differencing
    }

    /// Moving-average polynomial `θ(B)`.
    pub fn ma(&self) -> &Polynomial {
        &self.ma
    }

    /// Full autoregressive polynomial `φ(B)·δ(B)`.
    pub fn ar(&self) -> Polynomial {
        &self.stationary_ar * &self.differencing
    }

    /// Innovation variance `σ²`.
    pub fn innovation_variance(&self) -> f64 {
        self.innovation_variance
    }

    /// `true` when the innovation variance is zero.
    pub fn is_null(&self) -> bool {
        self.innovation_variance == 0.0
    }

    /// `true` when the differencing polynomial is trivial.
    pub fn is_stationary(&self) -> bool {
        self.differencing.is_identity()
    }

    /// Generates `n_sim` realisations of length `n`, shape `(n, n_sim)`.
    ///
    /// Stationary models are started after a burn-in period; non-stationary
    /// ones start from zero pre-sample values.
    pub fn simulate<R: Rng>(&self, n: usize, n_sim: usize, rng: &mut R) -> Array2<f64> {
        const BURN_IN: usize = 100;

        if n == 0 || n_sim == 0 || self.is_null() {
            return Array2::zeros((n, n_sim));
        }

        let sd = self.innovation_variance.sqrt();
        let ar = self.ar();
        let ma = &self.ma;
        let burn_in = if self.is_stationary() { BURN_IN } else { 0 };
        let n_tot = burn_in + n;
        let mut output = Array2::zeros((n, n_sim));

        for sim in 0..n_sim {
            let eps: Vec<f64> = (0..n_tot)
                .map(|_| {
                    let z: f64 = StandardNormal.sample(rng);
                    sd * z
                })
                .collect();
            let mut y = vec![0.0; n_tot];

            for t in 0..n_tot {
                let mut val = eps[t];
                for i in 1..=ar.degree().min(t) {
                    val -= ar.get(i) * y[t - i];
                }
                for j in 1..=ma.degree().min(t) {
                    val += ma.get(j) * eps[t - j];
                }
                y[t] = val;
            }

            for (i, &val) in y[burn_in..].iter().enumerate() {
                output[[i, sim]] = val;
            }
        }

        output
    }
}
