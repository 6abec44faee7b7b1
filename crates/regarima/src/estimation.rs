//! Estimation of RegARIMA models.
//!
//! Two strategies share the concentrated objective of [`RegArmaSsqFunction`]:
//!
//! - **fast**: a single GLS evaluation at the ARIMA parameters of the model,
//!   which are kept fixed;
//! - **robust**: Nelder-Mead over the unconstrained parameters of the SARIMA
//!   mapping, followed by standard errors from a finite-difference Hessian.

use std::collections::HashMap;
use std::sync::Arc;

use argmin::core::{CostFunction, Executor, State};
use argmin::solver::neldermead::NelderMead;
use ndarray::{Array1, Array2};
use rayon::ThreadPool;
use sadec_arima::{ArimaModel, ParameterSpec, SarimaModel};
use sadec_linalg::{LinearSystemSolver, SolverConfig};
use tracing::{debug, instrument, warn};

use crate::error::RegArimaError;
use crate::likelihood::ConcentratedLikelihood;
use crate::model::RegArimaModel;
use crate::ssq::{EstimationMode, RegArmaSsqFunction, SsqEvaluation};

/// Edge of the initial Nelder-Mead simplex in the unconstrained space.
const SIMPLEX_STEP: f64 = 0.5;

/// Step of the central differences of the Hessian.
const HESSIAN_STEP: f64 = 1e-4;

/// Settings of [`RegArimaEstimator`].
///
/// Defaults: maximum likelihood, 1000 iterations, simplex tolerance 1e-8,
/// sequential evaluation.
#[derive(Clone, Debug)]
pub struct EstimationConfig {
    mode: EstimationMode,
    max_iter: u64,
    tolerance: f64,
    thread_pool: Option<Arc<ThreadPool>>,
}

impl Default for EstimationConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl EstimationConfig {
    pub fn new() -> Self {
        Self {
            mode: EstimationMode::MaximumLikelihood,
            max_iter: 1000,
            tolerance: 1e-8,
            thread_pool: None,
        }
    }

    pub fn with_mode(mut self, mode: EstimationMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_max_iter(mut self, max_iter: u64) -> Self {
        self.max_iter = max_iter;
        self
    }

    /// Standard deviation of the simplex values below which the search stops.
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Pool on which independent objective evaluations run: the vertices of
    /// the initial simplex and the Hessian stencil. The simplex moves
    /// themselves are sequential.
    pub fn with_thread_pool(mut self, pool: Arc<ThreadPool>) -> Self {
        self.thread_pool = Some(pool);
        self
    }

    pub fn mode(&self) -> EstimationMode {
        self.mode
    }

    pub fn max_iter(&self) -> u64 {
        self.max_iter
    }

    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    pub fn thread_pool(&self) -> Option<&ThreadPool> {
        self.thread_pool.as_deref()
    }

    /// # Errors
    ///
    /// [`RegArimaError::InvalidConfig`] when `max_iter` is zero or the
    /// tolerance is not positive and finite.
    pub fn validate(&self) -> Result<(), RegArimaError> {
        if self.max_iter == 0 {
            return Err(RegArimaError::InvalidConfig {
                reason: "max_iter must be positive".to_string(),
            });
        }
        if !(self.tolerance.is_finite() && self.tolerance > 0.0) {
            return Err(RegArimaError::InvalidConfig {
                reason: format!("tolerance must be positive, got {}", self.tolerance),
            });
        }
        Ok(())
    }
}

/// Outcome of an estimation.
#[derive(Clone, Debug)]
pub struct RegArimaEstimation {
    model: RegArimaModel,
    arma: Vec<ParameterSpec>,
    coefficients: Vec<ParameterSpec>,
    missing: Vec<ParameterSpec>,
    likelihood: ConcentratedLikelihood,
    residuals: Array1<f64>,
    mode: EstimationMode,
    iterations: u64,
    estimated_arma: usize,
}

impl RegArimaEstimation {
    /// Input model with the estimated ARIMA coefficients.
    pub fn model(&self) -> &RegArimaModel {
        &self.model
    }

    /// Full ARIMA model of the errors at the estimated coefficients, with the
    /// estimated innovation variance.
    ///
    /// # Errors
    ///
    /// [`RegArimaError::Arima`] when the variance estimate is not finite.
    pub fn arima(&self) -> Result<ArimaModel, RegArimaError> {
        Ok(self.model.arima().to_arima(self.sigma2())?)
    }

    /// ARMA coefficients ordered `phi, bphi, theta, btheta`.
    pub fn arma_parameters(&self) -> &[ParameterSpec] {
        &self.arma
    }

    /// Regression coefficients, the mean first when present.
    pub fn coefficients(&self) -> &[ParameterSpec] {
        &self.coefficients
    }

    /// Interpolated values at [`RegArimaModel::missing_positions`], in the
    /// same order.
    pub fn missing(&self) -> &[ParameterSpec] {
        &self.missing
    }

    pub fn likelihood(&self) -> &ConcentratedLikelihood {
        &self.likelihood
    }

    /// Residuals in the scale of the estimation mode.
    pub fn residuals(&self) -> &Array1<f64> {
        &self.residuals
    }

    pub fn mode(&self) -> EstimationMode {
        self.mode
    }

    /// Nelder-Mead iterations; 0 for the fast path.
    pub fn iterations(&self) -> u64 {
        self.iterations
    }

    pub fn log_likelihood(&self) -> f64 {
        self.likelihood.log_likelihood()
    }

    pub fn sigma2(&self) -> f64 {
        self.likelihood.sigma2()
    }

    /// Observed positions after differencing.
    pub fn effective_observations(&self) -> usize {
        self.likelihood.observations()
    }

    /// Estimated ARMA coefficients, regression coefficients and variance.
    pub fn parameters_count(&self) -> usize {
        self.estimated_arma + self.coefficients.len() + 1
    }

    pub fn aic(&self) -> f64 {
        2.0 * self.parameters_count() as f64 - 2.0 * self.log_likelihood()
    }

    /// AIC with the small-sample correction.
    pub fn aicc(&self) -> f64 {
        let np = self.parameters_count() as f64;
        let n = self.effective_observations() as f64;
        self.aic() + 2.0 * np * (np + 1.0) / (n - np - 1.0)
    }

    pub fn bic(&self) -> f64 {
        let n = self.effective_observations() as f64;
        self.parameters_count() as f64 * n.ln() - 2.0 * self.log_likelihood()
    }
}

/// Estimator of [`RegArimaModel`]s.
///
/// # Workflow
///
/// ```mermaid
/// graph LR
///     A["EstimationConfig::new()"] -->|".with_thread_pool(pool)"| B["RegArimaEstimator::new(config)"]
///     B -->|".fast_estimation(&model)?"| C["RegArimaEstimation"]
///     B -->|".robust_estimation(&model)?"| C
///     C --> D[".arma_parameters()"]
///     C --> E[".coefficients()"]
///     C --> F[".aic() / .bic()"]
/// ```
#[derive(Clone, Debug, Default)]
pub struct RegArimaEstimator {
    config: EstimationConfig,
}

impl RegArimaEstimator {
    pub fn new(config: EstimationConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EstimationConfig {
        &self.config
    }

    /// One concentrated-likelihood solve at the current ARIMA parameters,
    /// reported as fixed.
    ///
    /// # Errors
    ///
    /// Configuration, model validation and likelihood failures.
    #[instrument(skip_all, fields(n = model.y().len(), k = model.variables_count()))]
    pub fn fast_estimation(
        &self,
        model: &RegArimaModel,
    ) -> Result<RegArimaEstimation, RegArimaError> {
        self.config.validate()?;
        model.validate()?;
        let function = RegArmaSsqFunction::new(model, self.config.mode);
        let eval = function.evaluate_model(model.arima().clone())?;
        let arma = eval
            .model()
            .parameters()
            .into_iter()
            .map(ParameterSpec::fixed)
            .collect();
        debug!(objective = eval.objective(), "fast estimation done");
        Ok(self.package(model, &eval, arma, 0, 0))
    }

    /// Nelder-Mead search of the ARMA parameters, starting from those of
    /// `model` (or from white noise when they lie outside the domain).
    ///
    /// # Errors
    ///
    /// | Variant | Trigger |
    /// |---------|---------|
    /// | [`RegArimaError::InvalidConfig`] | bad settings |
    /// | [`RegArimaError::OptimizationFailed`] | no admissible point found |
    /// | others | model validation and likelihood failures at the optimum |
    #[instrument(skip_all, fields(n = model.y().len(), k = model.variables_count()))]
    pub fn robust_estimation(
        &self,
        model: &RegArimaModel,
    ) -> Result<RegArimaEstimation, RegArimaError> {
        self.config.validate()?;
        model.validate()?;
        let function = RegArmaSsqFunction::new(model, self.config.mode);
        let mapping = *function.mapping();
        let dim = mapping.dim();
        if dim == 0 {
            let eval = function.evaluate_model(model.arima().clone())?;
            return Ok(self.package(model, &eval, Vec::new(), 0, 0));
        }

        let x0 = mapping.from_model(model.arima()).unwrap_or_else(|err| {
            warn!(%err, "initial parameters outside the domain, starting from white noise");
            vec![0.0; dim]
        });
        let simplex = initial_simplex(&x0);
        let known = function
            .cost_all(&simplex, self.config.thread_pool())
            .into_iter()
            .zip(&simplex)
            .map(|(cost, x)| (param_key(x), cost))
            .collect();
        let solver = NelderMead::new(simplex)
            .with_sd_tolerance(self.config.tolerance)
            .map_err(|e| RegArimaError::OptimizationFailed {
                reason: e.to_string(),
            })?;
        let max_iter = self.config.max_iter;
        let cost = SsqCost {
            function: &function,
            known,
        };
        let result = Executor::new(cost, solver)
            .configure(|state| state.max_iters(max_iter))
            .run()
            .map_err(|e| RegArimaError::OptimizationFailed {
                reason: e.to_string(),
            })?;

        let state = result.state();
        let iterations = state.get_iter();
        if state.get_best_cost() >= f64::MAX {
            return Err(RegArimaError::OptimizationFailed {
                reason: "no admissible parameters".to_string(),
            });
        }
        let best = state
            .best_param
            .as_ref()
            .ok_or_else(|| RegArimaError::OptimizationFailed {
                reason: "optimizer returned no parameters".to_string(),
            })?;
        if iterations >= max_iter {
            warn!(iterations, "optimizer stopped at the iteration cap");
        }

        let eval = function.evaluate(best)?;
        let stderr = hessian_stderr(&function, eval.model(), self.config.thread_pool())
            .unwrap_or_else(|err| {
                warn!(%err, "hessian not usable, standard errors unavailable");
                vec![f64::NAN; dim]
            });
        let arma = eval
            .model()
            .parameters()
            .into_iter()
            .zip(stderr)
            .map(|(v, se)| ParameterSpec::estimated(v, se))
            .collect();
        debug!(
            iterations,
            objective = eval.objective(),
            "robust estimation done"
        );
        Ok(self.package(model, &eval, arma, dim, iterations))
    }

    fn package(
        &self,
        model: &RegArimaModel,
        eval: &SsqEvaluation,
        arma: Vec<ParameterSpec>,
        estimated_arma: usize,
        iterations: u64,
    ) -> RegArimaEstimation {
        let likelihood = eval.likelihood().clone();
        let coefficients = likelihood
            .coefficients()
            .iter()
            .zip(likelihood.coefficient_stderr(estimated_arma).iter())
            .map(|(&b, &se)| ParameterSpec::estimated(b, se))
            .collect();
        // the dummy coefficient is minus the interpolated value
        let missing = likelihood
            .missing_effects()
            .iter()
            .zip(likelihood.missing_stderr(estimated_arma).iter())
            .map(|(&g, &se)| ParameterSpec::estimated(-g, se))
            .collect();
        RegArimaEstimation {
            model: model.clone().with_arima(eval.model().clone()),
            arma,
            coefficients,
            missing,
            residuals: eval.residuals(),
            likelihood,
            mode: self.config.mode,
            iterations,
            estimated_arma,
        }
    }
}

/// Cost function for argmin: the concentrated objective. Points evaluated
/// ahead of the search are looked up in `known`.
struct SsqCost<'a> {
    function: &'a RegArmaSsqFunction,
    known: HashMap<Vec<u64>, f64>,
}

impl CostFunction for SsqCost<'_> {
    type Param = Vec<f64>;
    type Output = f64;

    fn cost(&self, params: &Self::Param) -> Result<Self::Output, argmin::core::Error> {
        match self.known.get(&param_key(params)) {
            Some(&cost) => Ok(cost),
            None => Ok(self.function.cost(params)),
        }
    }
}

fn param_key(x: &[f64]) -> Vec<u64> {
    x.iter().map(|v| v.to_bits()).collect()
}

fn initial_simplex(x0: &[f64]) -> Vec<Vec<f64>> {
    let mut simplex = Vec::with_capacity(x0.len() + 1);
    simplex.push(x0.to_vec());
    for i in 0..x0.len() {
        let mut vertex = x0.to_vec();
        vertex[i] += SIMPLEX_STEP;
        simplex.push(vertex);
    }
    simplex
}

/// Standard errors of the coefficients of `model` from the central-difference
/// Hessian of `(n/2)·ln(objective)`, i.e. minus the concentrated
/// log-likelihood up to a constant.
fn hessian_stderr(
    function: &RegArmaSsqFunction,
    model: &SarimaModel,
    pool: Option<&ThreadPool>,
) -> Result<Vec<f64>, RegArimaError> {
    let p = model.parameters();
    let d = p.len();
    let h = HESSIAN_STEP;
    let shifted = |moves: &[(usize, f64)]| {
        let mut x = p.clone();
        for &(i, dx) in moves {
            x[i] += dx;
        }
        model.clone().with_parameters(&x)
    };

    let mut stencil = vec![model.clone()];
    for i in 0..d {
        stencil.push(shifted(&[(i, h)])?);
        stencil.push(shifted(&[(i, -h)])?);
    }
    for i in 0..d {
        for j in 0..i {
            for (si, sj) in [(h, h), (h, -h), (-h, h), (-h, -h)] {
                stencil.push(shifted(&[(i, si), (j, sj)])?);
            }
        }
    }

    let half_n = 0.5 * function.observations() as f64;
    let values = function
        .evaluate_all(stencil, pool)
        .into_iter()
        .map(|r| r.map(|e| half_n * e.objective().ln()))
        .collect::<Result<Vec<f64>, _>>()?;

    let f0 = values[0];
    let mut hessian = Array2::<f64>::zeros((d, d));
    for i in 0..d {
        hessian[[i, i]] = (values[1 + 2 * i] - 2.0 * f0 + values[2 + 2 * i]) / (h * h);
    }
    let mut idx = 1 + 2 * d;
    for i in 0..d {
        for j in 0..i {
            let v = &values[idx..idx + 4];
            let hij = (v[0] - v[1] - v[2] + v[3]) / (4.0 * h * h);
            hessian[[i, j]] = hij;
            hessian[[j, i]] = hij;
            idx += 4;
        }
    }

    let mut covariance = Array2::eye(d);
    LinearSystemSolver::new(SolverConfig::new().with_normalize(true))
        .solve_matrix(hessian.view(), covariance.view_mut())?;
    Ok(covariance
        .diag()
        .iter()
        .map(|&c| if c > 0.0 { c.sqrt() } else { f64::NAN })
        .collect())
}
