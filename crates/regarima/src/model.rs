//! Regression models with ARIMA errors.

use ndarray::{Array1, Array2, ArrayView1, ArrayView2};
use sadec_arima::{Polynomial, SarimaModel};

use crate::error::RegArimaError;

/// `y_t = β_0·μ + Σ β_i·x_{i,t} + z_t` with `z_t` following a SARIMA model.
///
/// When `mean` is set, `μ` is a constant in the differenced model, i.e. a
/// polynomial trend of degree `d` in levels.
///
/// A NaN in `y` marks a missing value. Each one is handled as an additive
/// outlier: the observation is set to zero and a unit dummy at its position
/// joins the regression, so its coefficient is minus the interpolated value.
#[derive(Clone, Debug, PartialEq)]
pub struct RegArimaModel {
    y: Vec<f64>,
    mean: bool,
    regressors: Vec<Vec<f64>>,
    arima: SarimaModel,
}

impl RegArimaModel {
    pub fn new(y: Vec<f64>, arima: SarimaModel) -> Self {
        Self {
            y,
            mean: false,
            regressors: Vec::new(),
            arima,
        }
    }

    pub fn with_mean(mut self, mean: bool) -> Self {
        self.mean = mean;
        self
    }

    pub fn with_regressor(mut self, x: Vec<f64>) -> Self {
        self.regressors.push(x);
        self
    }

    /// Replaces the stochastic part.
    pub fn with_arima(mut self, arima: SarimaModel) -> Self {
        self.arima = arima;
        self
    }

    pub fn y(&self) -> &[f64] {
        &self.y
    }

    pub fn is_mean(&self) -> bool {
        self.mean
    }

    pub fn regressors(&self) -> &[Vec<f64>] {
        &self.regressors
    }

    pub fn arima(&self) -> &SarimaModel {
        &self.arima
    }

    /// Number of regression coefficients, the mean included. Missing-value
    /// dummies are not counted.
    pub fn variables_count(&self) -> usize {
        usize::from(self.mean) + self.regressors.len()
    }

    /// Positions of the missing (NaN) observations.
    pub fn missing_positions(&self) -> Vec<usize> {
        self.y
            .iter()
            .enumerate()
            .filter_map(|(t, v)| v.is_nan().then_some(t))
            .collect()
    }

    /// Number of positions left after differencing, missing ones included.
    pub fn differenced_len(&self) -> usize {
        self.y
            .len()
            .saturating_sub(self.arima.spec().differencing_order())
    }

    /// Checks lengths and values.
    ///
    /// # Errors
    ///
    /// | Variant | Trigger |
    /// |---------|---------|
    /// | [`RegArimaError::Arima`] | invalid SARIMA orders |
    /// | [`RegArimaError::NonFiniteData`] | infinity in `y`, NaN or infinity in a regressor |
    /// | [`RegArimaError::RegressorLength`] | regressor length differs from `y` |
    /// | [`RegArimaError::InsufficientData`] | not more observed differenced values than parameters |
    pub fn validate(&self) -> Result<(), RegArimaError> {
        self.arima.spec().validate()?;
        if self.y.iter().any(|v| v.is_infinite()) {
            return Err(RegArimaError::NonFiniteData);
        }
        for (index, x) in self.regressors.iter().enumerate() {
            if x.len() != self.y.len() {
                return Err(RegArimaError::RegressorLength {
                    index,
                    expected: self.y.len(),
                    found: x.len(),
                });
            }
            if x.iter().any(|v| !v.is_finite()) {
                return Err(RegArimaError::NonFiniteData);
            }
        }
        let parameters = self.variables_count() + self.arima.spec().parameters_count();
        let observations = self
            .differenced_len()
            .saturating_sub(self.missing_positions().len());
        if observations <= parameters {
            return Err(RegArimaError::InsufficientData {
                observations,
                parameters,
            });
        }
        Ok(())
    }

    /// Applies the differencing polynomial to `y` and to every regressor.
    /// Missing-value dummies come first, then the mean as a column of ones.
    pub fn differenced(&self) -> DifferencedData {
        let delta = self.arima.spec().differencing();
        let n = self.differenced_len();
        let missing = self.missing_positions();
        let filled: Vec<f64> = self
            .y
            .iter()
            .map(|&v| if v.is_nan() { 0.0 } else { v })
            .collect();
        let y = apply(&delta, &filled, n);

        let mut x = Array2::zeros((n, missing.len() + self.variables_count()));
        let mut col = 0;
        for &pos in &missing {
            let mut dummy = vec![0.0; self.y.len()];
            dummy[pos] = 1.0;
            x.column_mut(col).assign(&apply(&delta, &dummy, n));
            col += 1;
        }
        if self.mean {
            x.column_mut(col).fill(1.0);
            col += 1;
        }
        for r in &self.regressors {
            x.column_mut(col).assign(&apply(&delta, r, n));
            col += 1;
        }
        DifferencedData {
            y,
            x,
            missing: missing.len(),
        }
    }
}

/// `δ(B)·v` over the `n` positions where it is defined.
fn apply(delta: &Polynomial, v: &[f64], n: usize) -> Array1<f64> {
    let d = delta.degree();
    (0..n)
        .map(|t| {
            (0..=d)
                .map(|i| delta.get(i) * v[t + d - i])
                .sum::<f64>()
        })
        .collect()
}

/// Differenced series and regression matrix.
#[derive(Clone, Debug, PartialEq)]
pub struct DifferencedData {
    pub y: Array1<f64>,
    pub x: Array2<f64>,
    /// Leading columns of `x` that are missing-value dummies.
    pub missing: usize,
}

/// Regression with stationary ARMA errors on already differenced data.
#[derive(Clone, Debug)]
pub struct RegArmaModel<'a> {
    y: ArrayView1<'a, f64>,
    x: ArrayView2<'a, f64>,
    missing: usize,
    ar: Polynomial,
    ma: Polynomial,
}

impl<'a> RegArmaModel<'a> {
    pub fn new(data: &'a DifferencedData, ar: Polynomial, ma: Polynomial) -> Self {
        Self {
            y: data.y.view(),
            x: data.x.view(),
            missing: data.missing,
            ar,
            ma,
        }
    }

    /// Stationary part of `arima` applied to `data`.
    pub fn from_sarima(data: &'a DifferencedData, arima: &SarimaModel) -> Self {
        Self::new(data, arima.stationary_ar(), arima.ma())
    }

    pub fn y(&self) -> ArrayView1<'a, f64> {
        self.y
    }

    pub fn x(&self) -> ArrayView2<'a, f64> {
        self.x
    }

    /// Leading columns of `x` that are missing-value dummies.
    pub fn missing(&self) -> usize {
        self.missing
    }

    pub fn ar(&self) -> &Polynomial {
        &self.ar
    }

    pub fn ma(&self) -> &Polynomial {
        &self.ma
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;
    use sadec_arima::SarimaSpec;

    #[test]
    fn differencing_with_mean_and_regressor() {
        let spec = SarimaSpec::new(1).with_regular(0, 1, 0);
        let model = RegArimaModel::new(vec![1.0, 3.0, 6.0, 10.0], SarimaModel::new(spec))
            .with_mean(true)
            .with_regressor(vec![0.0, 1.0, 0.0, 0.0]);
        assert_eq!(model.variables_count(), 2);
        let data = model.differenced();
        assert_eq!(data.missing, 0);
        assert_eq!(data.y, array![2.0, 3.0, 4.0]);
        assert_eq!(data.x, array![[1.0, 1.0], [1.0, -1.0], [1.0, 0.0]]);
    }

    #[test]
    fn validation() {
        let spec = SarimaSpec::new(1).with_regular(1, 1, 1);
        let short = RegArimaModel::new(vec![1.0, 2.0, 3.0], SarimaModel::new(spec));
        assert_eq!(
            short.validate(),
            Err(RegArimaError::InsufficientData {
                observations: 2,
                parameters: 2
            })
        );

        let y: Vec<f64> = (0..20).map(f64::from).collect();
        let bad = RegArimaModel::new(y.clone(), SarimaModel::new(spec)).with_regressor(vec![0.0; 19]);
        assert_eq!(
            bad.validate(),
            Err(RegArimaError::RegressorLength {
                index: 0,
                expected: 20,
                found: 19
            })
        );

        let mut with_inf = y.clone();
        with_inf[4] = f64::INFINITY;
        let inf = RegArimaModel::new(with_inf, SarimaModel::new(spec));
        assert_eq!(inf.validate(), Err(RegArimaError::NonFiniteData));

        let mut bad_x = vec![0.0; 20];
        bad_x[3] = f64::NAN;
        let nan_x = RegArimaModel::new(y.clone(), SarimaModel::new(spec)).with_regressor(bad_x);
        assert_eq!(nan_x.validate(), Err(RegArimaError::NonFiniteData));

        // missing values are allowed but leave fewer observations
        let mut sparse = y;
        for v in sparse.iter_mut().skip(3) {
            *v = f64::NAN;
        }
        let model = RegArimaModel::new(sparse, SarimaModel::new(spec));
        assert_eq!(
            model.validate(),
            Err(RegArimaError::InsufficientData {
                observations: 2,
                parameters: 2
            })
        );
    }

    #[test]
    fn missing_values_become_leading_dummies() {
        let spec = SarimaSpec::new(1).with_regular(0, 1, 0);
        let model = RegArimaModel::new(vec![1.0, 3.0, f64::NAN, 10.0], SarimaModel::new(spec))
            .with_mean(true);
        assert_eq!(model.missing_positions(), vec![2]);
        assert!(model.validate().is_ok());
        let data = model.differenced();
        assert_eq!(data.missing, 1);
        assert_eq!(data.y, array![2.0, -3.0, 10.0]);
        assert_eq!(data.x, array![[0.0, 1.0], [1.0, 1.0], [-1.0, 1.0]]);
    }
}
