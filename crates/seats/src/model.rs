//! Input of a decomposition request.

use sadec_arima::UcarimaModel;

use crate::component::ComponentType;
use crate::error::DecompositionError;

/// A series together with the UCARIMA model to decompose it with.
///
/// `innovation_variance` is the variance scale estimated with the ARIMA
/// model; smoothed variances are multiplied by it. Defaults to 1, with no
/// backcasts nor forecasts.
#[derive(Clone, Debug)]
pub struct SeatsModel {
    series: Vec<f64>,
    ucarima: UcarimaModel,
    types: Vec<ComponentType>,
    forecasts: usize,
    backcasts: usize,
    innovation_variance: f64,
}

impl SeatsModel {
    /// Creates a model; `types[i]` tags the `i`-th component of `ucarima`.
    pub fn new(series: Vec<f64>, ucarima: UcarimaModel, types: Vec<ComponentType>) -> Self {
        Self {
            series,
            ucarima,
            types,
            forecasts: 0,
            backcasts: 0,
            innovation_variance: 1.0,
        }
    }

    pub fn with_forecasts(mut self, nf: usize) -> Self {
        self.forecasts = nf;
        self
    }

    pub fn with_backcasts(mut self, nb: usize) -> Self {
        self.backcasts = nb;
        self
    }

    pub fn with_innovation_variance(mut self, variance: f64) -> Self {
        self.innovation_variance = variance;
        self
    }

    pub fn series(&self) -> &[f64] {
        &self.series
    }

    pub fn ucarima(&self) -> &UcarimaModel {
        &self.ucarima
    }

    pub fn types(&self) -> &[ComponentType] {
        &self.types
    }

    pub fn forecasts_count(&self) -> usize {
        self.forecasts
    }

    pub fn backcasts_count(&self) -> usize {
        self.backcasts
    }

    pub fn innovation_variance(&self) -> f64 {
        self.innovation_variance
    }

    /// Checks the model is usable.
    ///
    /// # Errors
    ///
    /// | Variant | Trigger |
    /// |---------|---------|
    /// | [`DecompositionError::EmptySeries`] | no observations |
    /// | [`DecompositionError::TypeCount`] | one type per component not respected |
    /// | [`DecompositionError::InvalidVariance`] | variance not positive and finite |
    pub fn validate(&self) -> Result<(), DecompositionError> {
        if self.series.is_empty() {
            return Err(DecompositionError::EmptySeries);
        }
        let expected = self.ucarima.components_count();
        if self.types.len() != expected {
            return Err(DecompositionError::TypeCount {
                expected,
                found: self.types.len(),
            });
        }
        if !(self.innovation_variance.is_finite() && self.innovation_variance > 0.0) {
            return Err(DecompositionError::InvalidVariance(
                self.innovation_variance,
            ));
        }
        Ok(())
    }
}
