//! Objective function of the ARMA parameters.
//!
//! Each evaluation maps a parameter vector to a SARIMA model, whitens the
//! differenced data with it and profiles out the regression coefficients.
//! Evaluations share only immutable inputs, so a batch of points can be
//! evaluated on a thread pool in any order.

use ndarray::Array1;
use rayon::ThreadPool;
use rayon::prelude::*;
use sadec_arima::{SarimaMapping, SarimaModel};
use serde::{Deserialize, Serialize};

use crate::error::RegArimaError;
use crate::likelihood::{ConcentratedLikelihood, ConcentratedLikelihoodComputer};
use crate::model::{DifferencedData, RegArimaModel, RegArmaModel};

/// What the objective measures.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EstimationMode {
    /// Deviance `ssq·|Ω|^(1/n)`, residuals scaled by `|Ω|^(1/2n)`.
    #[default]
    #[serde(alias = "ml")]
    MaximumLikelihood,
    /// Plain `ssq` of the standardized prediction errors.
    #[serde(alias = "ls")]
    LeastSquares,
}

/// Result of one evaluation of the objective.
#[derive(Clone, Debug)]
pub struct SsqEvaluation {
    model: SarimaModel,
    likelihood: ConcentratedLikelihood,
    mode: EstimationMode,
}

impl SsqEvaluation {
    /// SARIMA model at the evaluated point.
    pub fn model(&self) -> &SarimaModel {
        &self.model
    }

    pub fn likelihood(&self) -> &ConcentratedLikelihood {
        &self.likelihood
    }

    /// Value to minimise.
    pub fn objective(&self) -> f64 {
        match self.mode {
            EstimationMode::MaximumLikelihood => self.likelihood.ssq() * self.likelihood.factor(),
            EstimationMode::LeastSquares => self.likelihood.ssq(),
        }
    }

    /// Residuals whose sum of squares is [`objective`](Self::objective).
    pub fn residuals(&self) -> Array1<f64> {
        match self.mode {
            EstimationMode::MaximumLikelihood => {
                self.likelihood.residuals() * self.likelihood.factor().sqrt()
            }
            EstimationMode::LeastSquares => self.likelihood.residuals().clone(),
        }
    }
}

/// Concentrated objective over the unconstrained parameters of a
/// [`SarimaMapping`].
#[derive(Debug)]
pub struct RegArmaSsqFunction {
    data: DifferencedData,
    mapping: SarimaMapping,
    mode: EstimationMode,
    computer: ConcentratedLikelihoodComputer,
}

impl RegArmaSsqFunction {
    /// Differences the data of `model` once for all evaluations.
    pub fn new(model: &RegArimaModel, mode: EstimationMode) -> Self {
        Self {
            data: model.differenced(),
            mapping: SarimaMapping::new(model.arima().spec()),
            mode,
            computer: ConcentratedLikelihoodComputer::new(),
        }
    }

    pub fn mapping(&self) -> &SarimaMapping {
        &self.mapping
    }

    pub fn mode(&self) -> EstimationMode {
        self.mode
    }

    /// Number of observed positions after differencing.
    pub fn observations(&self) -> usize {
        self.data.y.len() - self.data.missing
    }

    /// Evaluates at the unconstrained point `x`.
    ///
    /// # Errors
    ///
    /// Mapping and likelihood failures.
    pub fn evaluate(&self, x: &[f64]) -> Result<SsqEvaluation, RegArimaError> {
        let model = self.mapping.to_model(x)?;
        self.evaluate_model(model)
    }

    /// Evaluates at a model given directly by its coefficients.
    ///
    /// # Errors
    ///
    /// Likelihood failures (e.g. a non-stationary AR part).
    pub fn evaluate_model(&self, model: SarimaModel) -> Result<SsqEvaluation, RegArimaError> {
        let likelihood = self
            .computer
            .compute(&RegArmaModel::from_sarima(&self.data, &model))?;
        Ok(SsqEvaluation {
            model,
            likelihood,
            mode: self.mode,
        })
    }

    /// Objective at `x`, `f64::MAX` when the evaluation fails.
    pub fn cost(&self, x: &[f64]) -> f64 {
        match self.evaluate(x) {
            Ok(eval) if eval.objective().is_finite() => eval.objective(),
            _ => f64::MAX,
        }
    }

    /// [`cost`](Self::cost) at every point, on `pool` when given. Results keep
    /// the order of `points`.
    pub fn cost_all(&self, points: &[Vec<f64>], pool: Option<&ThreadPool>) -> Vec<f64> {
        match pool {
            Some(pool) => pool.install(|| points.par_iter().map(|x| self.cost(x)).collect()),
            None => points.iter().map(|x| self.cost(x)).collect(),
        }
    }

    /// Evaluates every model, on `pool` when given. Results keep the order
    /// of `models`.
    pub fn evaluate_all(
        &self,
        models: Vec<SarimaModel>,
        pool: Option<&ThreadPool>,
    ) -> Vec<Result<SsqEvaluation, RegArimaError>> {
        match pool {
            Some(pool) => pool.install(|| {
                models
                    .into_par_iter()
                    .map(|m| self.evaluate_model(m))
                    .collect()
            }),
            None => models.into_iter().map(|m| self.evaluate_model(m)).collect(),
        }
    }
}
