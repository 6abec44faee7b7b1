//! PACF parametrisation of stationary polynomials (Jones 1980, Monahan 1984).
//!
//! A block `1 - φ1·B - … - φp·B^p` is stationary exactly when its partial
//! autocorrelations `r_k` all lie in (-1, 1). The mapping
//!
//! ```text
//! alpha_k --tanh--> r_k --Levinson--> φ
//! φ --step-down--> r_k --atanh--> alpha_k
//! ```
//!
//! is a bijection between `R^p` and the stationary region. Applied to a
//! moving-average block it yields invertible polynomials.

use crate::error::ArimaError;
use crate::polynomial::Polynomial;
use crate::sarima::{SarimaModel, SarimaSpec};

/// Maps unconstrained parameters to the coefficients `φ` of a stationary
/// block `1 - Σ φ_i·B^i`.
pub fn unconstrained_to_coeffs(alpha: &[f64]) -> Vec<f64> {
    let p = alpha.len();
    if p == 0 {
        return Vec::new();
    }

    let r: Vec<f64> = alpha.iter().map(|a| a.tanh()).collect();

    // Levinson-Durbin recursion
    let mut phi = vec![0.0; p];
    let mut prev = vec![0.0; p];
    phi[0] = r[0];
    for k in 1..p {
        prev[..k].copy_from_slice(&phi[..k]);
        phi[k] = r[k];
        for j in 0..k {
            phi[j] = prev[j] - r[k] * prev[k - 1 - j];
        }
    }
    phi
}

/// Step-down recursion: partial autocorrelations of `1 - Σ φ_i·B^i`, or
/// `None` when the block is not stationary.
pub(crate) fn coeffs_to_pacf(phi: &[f64]) -> Option<Vec<f64>> {
    let p = phi.len();
    let mut cur = phi.to_vec();
    let mut r = vec![0.0; p];
    for k in (1..=p).rev() {
        let rk = cur[k - 1];
        if !rk.is_finite() || rk.abs() >= 1.0 {
            return None;
        }
        r[k - 1] = rk;
        let denom = 1.0 - rk * rk;
        let prev: Vec<f64> = (0..k - 1)
            .map(|j| (cur[j] + rk * cur[k - 2 - j]) / denom)
            .collect();
        cur = prev;
    }
    Some(r)
}

/// Inverse of [`unconstrained_to_coeffs`]; `None` outside the stationary
/// region.
pub fn coeffs_to_unconstrained(phi: &[f64]) -> Option<Vec<f64>> {
    coeffs_to_pacf(phi).map(|r| r.into_iter().map(f64::atanh).collect())
}

/// Parameter-domain mapping between `R^k` and the stationary, invertible
/// SARIMA models of a given specification.
///
/// Each of the four blocks (regular AR, seasonal AR, regular MA, seasonal MA)
/// is mapped independently. Model coefficients follow the polynomial sign
/// convention `1 + c1·B + …`, so `c_i = -φ_i`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SarimaMapping {
    spec: SarimaSpec,
}

impl SarimaMapping {
    /// Creates the mapping for `spec`.
    pub fn new(spec: SarimaSpec) -> Self {
        Self { spec }
    }

    /// The specification this mapping belongs to.
    pub fn spec(&self) -> SarimaSpec {
        self.spec
    }

    /// Number of unconstrained parameters.
    pub fn dim(&self) -> usize {
        self.spec.parameters_count()
    }

    /// Maps an unconstrained vector to a model.
    ///
    /// # Errors
    ///
    /// [`ArimaError::ParameterCount`] when `x.len() != self.dim()`.
    pub fn to_model(&self, x: &[f64]) -> Result<SarimaModel, ArimaError> {
        if x.len() != self.dim() {
            return Err(ArimaError::ParameterCount {
                expected: self.dim(),
                found: x.len(),
            });
        }
        let mut coefficients = Vec::with_capacity(x.len());
        for block in self.blocks(x) {
            coefficients.extend(unconstrained_to_coeffs(block).into_iter().map(|phi| -phi));
        }
        SarimaModel::new(self.spec).with_parameters(&coefficients)
    }

    /// Maps a model back to the unconstrained space.
    ///
    /// # Errors
    ///
    /// [`ArimaError::NonStationary`] or [`ArimaError::NonInvertible`] when a
    /// block lies on or outside the boundary of the domain.
    pub fn from_model(&self, model: &SarimaModel) -> Result<Vec<f64>, ArimaError> {
        let parameters = model.parameters();
        let spec = self.spec;
        let ar_len = spec.p() + spec.bp();
        let mut out = Vec::with_capacity(parameters.len());
        let mut offset = 0;
        for len in [spec.p(), spec.bp(), spec.q(), spec.bq()] {
            let block = &parameters[offset..offset + len];
            let phi: Vec<f64> = block.iter().map(|c| -c).collect();
            let alpha = coeffs_to_unconstrained(&phi).ok_or(if offset < ar_len {
                ArimaError::NonStationary
            } else {
                ArimaError::NonInvertible
            })?;
            out.extend(alpha);
            offset += len;
        }
        Ok(out)
    }

    fn blocks<'a>(&self, x: &'a [f64]) -> [&'a [f64]; 4] {
        let s = self.spec;
        let (phi, rest) = x.split_at(s.p());
        let (bphi, rest) = rest.split_at(s.bp());
        let (theta, btheta) = rest.split_at(s.q());
        [phi, bphi, theta, btheta]
    }
}

/// `true` when `1 + Σ c_i·B^i` is stationary.
pub(crate) fn is_stationary_block(coefficients: &[f64]) -> bool {
    Polynomial::from_lags(coefficients).is_stationary()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn empty_input() {
        assert!(unconstrained_to_coeffs(&[]).is_empty());
        assert_eq!(coeffs_to_unconstrained(&[]), Some(vec![]));
    }

    #[test]
    fn single_coefficient_is_tanh() {
        for a in [-3.0, -0.5, 0.0, 0.5, 3.0] {
            let phi = unconstrained_to_coeffs(&[a]);
            assert_abs_diff_eq!(phi[0], f64::tanh(a), epsilon = 1e-15);
        }
    }

    #[test]
    fn two_coefficients() {
        let phi = unconstrained_to_coeffs(&[0.5, 0.3]);
        let expected_0 = 0.5_f64.tanh() - 0.3_f64.tanh() * 0.5_f64.tanh();
        assert_abs_diff_eq!(phi[0], expected_0, epsilon = 1e-12);
        assert_abs_diff_eq!(phi[1], 0.3_f64.tanh(), epsilon = 1e-12);
    }

    #[test]
    fn round_trip_through_step_down() {
        let cases: &[&[f64]] = &[&[1.0, -2.0, 3.0], &[0.5], &[-3.0, 2.0], &[0.1, 0.2, -0.4, 0.8]];
        for alpha in cases {
            let phi = unconstrained_to_coeffs(alpha);
            let back = coeffs_to_unconstrained(&phi).unwrap();
            for (a, b) in alpha.iter().zip(back.iter()) {
                assert_abs_diff_eq!(a, b, epsilon = 1e-8);
            }
        }
    }

    #[test]
    fn mapped_blocks_are_stationary() {
        let cases: &[&[f64]] = &[&[1.0, -2.0, 3.0], &[4.0, 4.0], &[-3.0, 2.0]];
        for alpha in cases {
            let phi = unconstrained_to_coeffs(alpha);
            let c: Vec<f64> = phi.iter().map(|x| -x).collect();
            assert!(is_stationary_block(&c), "alpha = {alpha:?}");
        }
    }

    #[test]
    fn step_down_rejects_unit_root() {
        assert!(coeffs_to_pacf(&[1.0]).is_none());
        assert!(coeffs_to_pacf(&[0.5, 0.6]).is_none());
        assert!(coeffs_to_pacf(&[0.5, 0.3]).is_some());
    }

    #[test]
    fn sarima_mapping_round_trip() {
        let spec = SarimaSpec::airline(12);
        let mapping = SarimaMapping::new(spec);
        assert_eq!(mapping.dim(), 2);
        let model = mapping.to_model(&[0.4, -0.9]).unwrap();
        assert_abs_diff_eq!(model.theta()[0], -f64::tanh(0.4), epsilon = 1e-14);
        assert_abs_diff_eq!(model.btheta()[0], f64::tanh(0.9), epsilon = 1e-14);
        let back = mapping.from_model(&model).unwrap();
        assert_abs_diff_eq!(back[0], 0.4, epsilon = 1e-12);
        assert_abs_diff_eq!(back[1], -0.9, epsilon = 1e-12);
    }

    #[test]
    fn sarima_mapping_rejects_boundary() {
        let spec = SarimaSpec::new(12).with_regular(1, 0, 1);
        let mapping = SarimaMapping::new(spec);
        let nonstationary = SarimaModel::new(spec).with_parameters(&[-1.0, 0.2]).unwrap();
        assert_eq!(
            mapping.from_model(&nonstationary).unwrap_err(),
            ArimaError::NonStationary
        );
        let noninvertible = SarimaModel::new(spec).with_parameters(&[0.2, 1.5]).unwrap();
        assert_eq!(
            mapping.from_model(&noninvertible).unwrap_err(),
            ArimaError::NonInvertible
        );
        assert!(matches!(
            mapping.to_model(&[0.0]),
            Err(ArimaError::ParameterCount { expected: 2, found: 1 })
        ));
    }
}
