//! Polynomials in the backshift operator `B`.

use std::ops::Mul;

use serde::{Deserialize, Serialize};

use crate::error::ArimaError;
use crate::params;

/// A polynomial `c0 + c1·B + … + cn·B^n` in the backshift operator.
///
/// Model polynomials always have `c0 = 1`; [`Polynomial::checked`] enforces
/// it. Trailing zero coefficients are trimmed, so [`Polynomial::degree`] is
/// the true degree.
///
/// # Example
///
/// ```
/// use sadec_arima::Polynomial;
///
/// // (1 - B)(1 - B^4)
/// let p = Polynomial::differencing(1) * Polynomial::seasonal_differencing(4, 1);
/// assert_eq!(p.coefficients(), &[1.0, -1.0, 0.0, 0.0, -1.0, 1.0]);
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Polynomial {
    coefficients: Vec<f64>,
}

impl Polynomial {
    /// The constant polynomial `1`.
    pub fn one() -> Self {
        Self {
            coefficients: vec![1.0],
        }
    }

    /// Builds a polynomial from its coefficients, lowest degree first.
    ///
    /// An empty slice gives the zero polynomial.
    pub fn from_coefficients(coefficients: &[f64]) -> Self {
        let mut coefficients = coefficients.to_vec();
        while coefficients.len() > 1 && coefficients.last() == Some(&0.0) {
            coefficients.pop();
        }
        if coefficients.is_empty() {
            coefficients.push(0.0);
        }
        Self { coefficients }
    }

    /// Builds `1 + c1·B + … + cn·B^n` from the non-constant coefficients.
    pub fn from_lags(lags: &[f64]) -> Self {
        Self::seasonal_from_lags(1, lags)
    }

    /// Builds `1 + c1·B^s + … + cn·B^{n·s}`.
    pub fn seasonal_from_lags(period: usize, lags: &[f64]) -> Self {
        let mut coefficients = vec![0.0; lags.len() * period + 1];
        coefficients[0] = 1.0;
        for (k, &c) in lags.iter().enumerate() {
            coefficients[(k + 1) * period] = c;
        }
        Self::from_coefficients(&coefficients)
    }

    /// Builds a model polynomial, checking that the constant term is 1 and
    /// every coefficient is finite.
    ///
    /// # Errors
    ///
    /// | Variant | Trigger |
    /// |---------|---------|
    /// | [`ArimaError::NonFinite`] | a coefficient is NaN or infinite |
    /// | [`ArimaError::NonUnitConstant`] | `coefficients[0] != 1` |
    pub fn checked(coefficients: &[f64]) -> Result<Self, ArimaError> {
        if coefficients.iter().any(|c| !c.is_finite()) {
            return Err(ArimaError::NonFinite);
        }
        let c0 = coefficients.first().copied().unwrap_or(0.0);
        if c0 != 1.0 {
            return Err(ArimaError::NonUnitConstant(c0));
        }
        Ok(Self::from_coefficients(coefficients))
    }

    /// Regular differencing `(1 - B)^d`.
    pub fn differencing(d: usize) -> Self {
        Self::seasonal_differencing(1, d)
    }

    /// Seasonal differencing `(1 - B^s)^D`.
    pub fn seasonal_differencing(period: usize, order: usize) -> Self {
        let factor = Self::seasonal_from_lags(period, &[-1.0]);
        (0..order).fold(Self::one(), |acc, _| &acc * &factor)
    }

    /// Seasonal summation `1 + B + … + B^{s-1}`.
    pub fn seasonal_sum(period: usize) -> Self {
        Self {
            coefficients: vec![1.0; period.max(1)],
        }
    }

    /// Degree of the polynomial.
    pub fn degree(&self) -> usize {
        self.coefficients.len() - 1
    }

    /// Coefficients, lowest degree first.
    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }

    /// Coefficient of `B^i`, zero beyond the degree.
    pub fn get(&self, i: usize) -> f64 {
        self.coefficients.get(i).copied().unwrap_or(0.0)
    }

    /// `true` for the constant polynomial `1`.
    pub fn is_identity(&self) -> bool {
        self.coefficients == [1.0]
    }

    /// Evaluates the polynomial at `x` (Horner).
    pub fn evaluate(&self, x: f64) -> f64 {
        self.coefficients
            .iter()
            .rev()
            .fold(0.0, |acc, &c| acc * x + c)
    }

    /// `true` when every root lies strictly outside the unit circle.
    ///
    /// Decided by the Schur-Cohn step-down recursion; only meaningful for
    /// polynomials with a unit constant term.
    pub fn is_stationary(&self) -> bool {
        let phi: Vec<f64> = self.coefficients[1..].iter().map(|c| -c).collect();
        params::coeffs_to_pacf(&phi).is_some()
    }
}

impl Default for Polynomial {
    fn default() -> Self {
        Self::one()
    }
}

impl Mul for &Polynomial {
    type Output = Polynomial;

    fn mul(self, rhs: &Polynomial) -> Polynomial {
        let mut out = vec![0.0; self.coefficients.len() + rhs.coefficients.len() - 1];
        for (i, &a) in self.coefficients.iter().enumerate() {
            if a == 0.0 {
                continue;
            }
            for (j, &b) in rhs.coefficients.iter().enumerate() {
                out[i + j] += a * b;
            }
        }
        Polynomial::from_coefficients(&out)
    }
}

impl Mul for Polynomial {
    type Output = Polynomial;

    fn mul(self, rhs: Polynomial) -> Polynomial {
        &self * &rhs
    }
}
