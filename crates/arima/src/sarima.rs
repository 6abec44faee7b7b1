//! Seasonal ARIMA `(p,d,q)(P,D,Q)_s` specifications and models.

use serde::{Deserialize, Serialize};

use crate::error::ArimaError;
use crate::model::ArimaModel;
use crate::params::is_stationary_block;
use crate::polynomial::Polynomial;

/// Orders of a seasonal ARIMA model.
///
/// # Example
///
/// ```
/// use sadec_arima::SarimaSpec;
///
/// let spec = SarimaSpec::new(12).with_regular(0, 1, 1).with_seasonal(0, 1, 1);
/// assert_eq!(spec, SarimaSpec::airline(12));
/// assert_eq!(spec.parameters_count(), 2);
/// assert_eq!(spec.differencing_order(), 13);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SarimaSpec {
    period: usize,
    p: usize,
    d: usize,
    q: usize,
    bp: usize,
    bd: usize,
    bq: usize,
}

impl SarimaSpec {
    /// White noise with seasonal period `period`.
    pub fn new(period: usize) -> Self {
        Self {
            period,
            p: 0,
            d: 0,
            q: 0,
            bp: 0,
            bd: 0,
            bq: 0,
        }
    }

    /// The airline model `(0,1,1)(0,1,1)_s`.
    pub fn airline(period: usize) -> Self {
        Self::new(period).with_regular(0, 1, 1).with_seasonal(0, 1, 1)
    }

    /// Sets the regular orders `(p, d, q)`.
    pub fn with_regular(mut self, p: usize, d: usize, q: usize) -> Self {
        self.p = p;
        self.d = d;
        self.q = q;
        self
    }

    /// Sets the seasonal orders `(P, D, Q)`.
    pub fn with_seasonal(mut self, bp: usize, bd: usize, bq: usize) -> Self {
        self.bp = bp;
        self.bd = bd;
        self.bq = bq;
        self
    }

    /// Checks that the period can carry the seasonal orders.
    ///
    /// # Errors
    ///
    /// [`ArimaError::InvalidPeriod`] when the period is 0, or when it is 1
    /// and a seasonal order is non-zero.
    pub fn validate(&self) -> Result<(), ArimaError> {
        let seasonal = self.bp + self.bd + self.bq > 0;
        if self.period == 0 || (self.period == 1 && seasonal) {
            return Err(ArimaError::InvalidPeriod {
                period: self.period,
            });
        }
        Ok(())
    }

    /// Seasonal period.
    pub fn period(&self) -> usize {
        self.period
    }

    /// Regular AR order.
    pub fn p(&self) -> usize {
        self.p
    }

    /// Regular differencing order.
    pub fn d(&self) -> usize {
        self.d
    }

    /// Regular MA order.
    pub fn q(&self) -> usize {
        self.q
    }

    /// Seasonal AR order.
    pub fn bp(&self) -> usize {
        self.bp
    }

    /// Seasonal differencing order.
    pub fn bd(&self) -> usize {
        self.bd
    }

    /// Seasonal MA order.
    pub fn bq(&self) -> usize {
        self.bq
    }

    /// Number of free ARMA parameters, `p + P + q + Q`.
    pub fn parameters_count(&self) -> usize {
        self.p + self.bp + self.q + self.bq
    }

    /// Degree of the differencing polynomial, `d + s·D`.
    pub fn differencing_order(&self) -> usize {
        self.d + self.period * self.bd
    }

    /// The differencing polynomial `(1 - B)^d (1 - B^s)^D`.
    pub fn differencing(&self) -> Polynomial {
        Polynomial::differencing(self.d) * Polynomial::seasonal_differencing(self.period, self.bd)
    }
}

/// A seasonal ARIMA model: a [`SarimaSpec`] with its ARMA coefficients.
///
/// Coefficients follow the polynomial convention, e.g. `theta = [-0.6]`
/// means the regular MA polynomial `1 - 0.6·B`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SarimaModel {
    spec: SarimaSpec,
    phi: Vec<f64>,
    bphi: Vec<f64>,
    theta: Vec<f64>,
    btheta: Vec<f64>,
}

impl SarimaModel {
    /// Creates the model with all coefficients at zero.
    pub fn new(spec: SarimaSpec) -> Self {
        Self {
            spec,
            phi: vec![0.0; spec.p],
            bphi: vec![0.0; spec.bp],
            theta: vec![0.0; spec.q],
            btheta: vec![0.0; spec.bq],
        }
    }

    /// The airline model `(1 - B)(1 - B^s) y = (1 + θ·B)(1 + Θ·B^s) e`.
    pub fn airline(period: usize, theta: f64, btheta: f64) -> Self {
        let mut model = Self::new(SarimaSpec::airline(period));
        model.theta[0] = theta;
        model.btheta[0] = btheta;
        model
    }

    /// Replaces the coefficients, ordered `phi, bphi, theta, btheta`.
    ///
    /// # Errors
    ///
    /// | Variant | Trigger |
    /// |---------|---------|
    /// | [`ArimaError::ParameterCount`] | wrong length |
    /// | [`ArimaError::NonFinite`] | a value is NaN or infinite |
    pub fn with_parameters(mut self, parameters: &[f64]) -> Result<Self, ArimaError> {
        let expected = self.spec.parameters_count();
        if parameters.len() != expected {
            return Err(ArimaError::ParameterCount {
                expected,
                found: parameters.len(),
            });
        }
        if parameters.iter().any(|v| !v.is_finite()) {
            return Err(ArimaError::NonFinite);
        }
        let (phi, rest) = parameters.split_at(self.spec.p);
        let (bphi, rest) = rest.split_at(self.spec.bp);
        let (theta, btheta) = rest.split_at(self.spec.q);
        self.phi = phi.to_vec();
        self.bphi = bphi.to_vec();
        self.theta = theta.to_vec();
        self.btheta = btheta.to_vec();
        Ok(self)
    }

    /// Orders of the model.
    pub fn spec(&self) -> SarimaSpec {
        self.spec
    }

    /// Coefficients ordered `phi, bphi, theta, btheta`.
    pub fn parameters(&self) -> Vec<f64> {
        [&self.phi, &self.bphi, &self.theta, &self.btheta]
            .into_iter()
            .flatten()
            .copied()
            .collect()
    }

    /// Regular AR coefficients.
    pub fn phi(&self) -> &[f64] {
        &self.phi
    }

    /// Seasonal AR coefficients.
    pub fn bphi(&self) -> &[f64] {
        &self.bphi
    }

    /// Regular MA coefficients.
    pub fn theta(&self) -> &[f64] {
        &self.theta
    }

    /// Seasonal MA coefficients.
    pub fn btheta(&self) -> &[f64] {
        &self.btheta
    }

    /// Stationary AR polynomial `φ(B)·Φ(B^s)`.
    pub fn stationary_ar(&self) -> Polynomial {
        Polynomial::from_lags(&self.phi)
            * Polynomial::seasonal_from_lags(self.spec.period, &self.bphi)
    }

    /// MA polynomial `θ(B)·Θ(B^s)`.
    pub fn ma(&self) -> Polynomial {
        Polynomial::from_lags(&self.theta)
            * Polynomial::seasonal_from_lags(self.spec.period, &self.btheta)
    }

    /// `true` when both AR blocks are stationary.
    pub fn is_stationary(&self) -> bool {
        is_stationary_block(&self.phi) && is_stationary_block(&self.bphi)
    }

    /// `true` when both MA blocks are invertible.
    pub fn is_invertible(&self) -> bool {
        is_stationary_block(&self.theta) && is_stationary_block(&self.btheta)
    }

    /// The full ARIMA model with innovation variance `variance`.
    ///
    /// # Errors
    ///
    /// Propagates [`ArimaModel::new`] validation.
    pub fn to_arima(&self, variance: f64) -> Result<ArimaModel, ArimaError> {
        ArimaModel::new(self.stationary_ar(), self.spec.differencing(), self.ma(), variance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn airline_spec() {
        let spec = SarimaSpec::airline(12);
        assert_eq!((spec.p(), spec.d(), spec.q()), (0, 1, 1));
        assert_eq!((spec.bp(), spec.bd(), spec.bq()), (0, 1, 1));
        assert_eq!(spec.period(), 12);
        assert!(spec.validate().is_ok());
    }

    #[test]
    fn validate_period() {
        assert!(SarimaSpec::new(0).validate().is_err());
        assert!(SarimaSpec::new(1).with_regular(1, 1, 1).validate().is_ok());
        assert_eq!(
            SarimaSpec::new(1).with_seasonal(0, 1, 0).validate(),
            Err(ArimaError::InvalidPeriod { period: 1 })
        );
    }

    #[test]
    fn differencing_polynomial_degree() {
        let spec = SarimaSpec::new(4).with_regular(0, 2, 0).with_seasonal(0, 1, 0);
        assert_eq!(spec.differencing().degree(), 6);
        assert_eq!(spec.differencing_order(), 6);
    }

    #[test]
    fn parameters_round_trip() {
        let spec = SarimaSpec::new(12).with_regular(2, 1, 1).with_seasonal(1, 1, 1);
        let values = [0.3, -0.2, 0.5, -0.4, -0.6];
        let model = SarimaModel::new(spec).with_parameters(&values).unwrap();
        assert_eq!(model.parameters(), values.to_vec());
        assert_eq!(model.phi(), &[0.3, -0.2]);
        assert_eq!(model.bphi(), &[0.5]);
        assert_eq!(model.theta(), &[-0.4]);
        assert_eq!(model.btheta(), &[-0.6]);
    }

    #[test]
    fn wrong_parameter_count() {
        let err = SarimaModel::new(SarimaSpec::airline(12))
            .with_parameters(&[0.1])
            .unwrap_err();
        assert_eq!(
            err,
            ArimaError::ParameterCount {
                expected: 2,
                found: 1
            }
        );
    }

    #[test]
    fn airline_polynomials() {
        let model = SarimaModel::airline(4, -0.5, -0.6);
        let ma = model.ma();
        assert_eq!(ma.degree(), 5);
        assert_abs_diff_eq!(ma.get(1), -0.5);
        assert_abs_diff_eq!(ma.get(4), -0.6);
        assert_abs_diff_eq!(ma.get(5), 0.3, epsilon = 1e-15);
        assert!(model.stationary_ar().is_identity());
        assert!(model.is_invertible());

        let arima = model.to_arima(2.0).unwrap();
        assert_eq!(arima.differencing().degree(), 5);
        assert_eq!(arima.innovation_variance(), 2.0);
    }

    #[test]
    fn stationarity_flags() {
        let spec = SarimaSpec::new(12).with_regular(1, 0, 1);
        let model = SarimaModel::new(spec).with_parameters(&[-1.1, 0.3]).unwrap();
        assert!(!model.is_stationary());
        assert!(model.is_invertible());
    }
}
