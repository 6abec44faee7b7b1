//! Estimate command: fit a regression with seasonal ARIMA errors.

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::{info, info_span};

use sadec_arima::{ArimaModel, ParameterSpec, SarimaSpec};
use sadec_regarima::{EstimationMode, RegArimaEstimation, RegArimaEstimator};

use crate::cli::EstimateArgs;
use crate::config::SadecConfig;
use crate::convert::{self, EstimationMethod};
use crate::output;

/// Interpolation of one missing observation.
#[derive(Debug, Serialize)]
struct MissingValue {
    position: usize,
    #[serde(flatten)]
    estimate: ParameterSpec,
}

/// JSON report of one estimation.
#[derive(Debug, Serialize)]
struct EstimationReport {
    method: &'static str,
    mode: EstimationMode,
    spec: SarimaSpec,
    arma: Vec<ParameterSpec>,
    /// Estimated error model in the coefficient form `decompose` reads.
    arima: ArimaModel,
    coefficients: Vec<ParameterSpec>,
    missing: Vec<MissingValue>,
    iterations: u64,
    effective_observations: usize,
    parameters: usize,
    sigma2: f64,
    log_likelihood: f64,
    aic: f64,
    aicc: f64,
    bic: f64,
    residuals: Vec<f64>,
}

impl EstimationReport {
    fn new(method: EstimationMethod, estimation: &RegArimaEstimation) -> Result<Self> {
        Ok(Self {
            method: match method {
                EstimationMethod::Fast => "fast",
                EstimationMethod::Robust => "robust",
            },
            mode: estimation.mode(),
            spec: estimation.model().arima().spec(),
            arma: estimation.arma_parameters().to_vec(),
            arima: estimation
                .arima()
                .context("estimated model has no finite variance")?,
            coefficients: estimation.coefficients().to_vec(),
            missing: estimation
                .model()
                .missing_positions()
                .into_iter()
                .zip(estimation.missing())
                .map(|(position, &estimate)| MissingValue { position, estimate })
                .collect(),
            iterations: estimation.iterations(),
            effective_observations: estimation.effective_observations(),
            parameters: estimation.parameters_count(),
            sigma2: estimation.sigma2(),
            log_likelihood: estimation.log_likelihood(),
            aic: estimation.aic(),
            aicc: estimation.aicc(),
            bic: estimation.bic(),
            residuals: estimation.residuals().to_vec(),
        })
    }
}

/// Run the estimation pipeline.
pub fn run(args: EstimateArgs) -> Result<()> {
    let _cmd = info_span!("estimate").entered();
    // 1. Load project TOML
    let toml_str = std::fs::read_to_string(&args.config)
        .with_context(|| format!("failed to read config file: {}", args.config.display()))?;
    let config: SadecConfig = toml::from_str(&toml_str).context("failed to parse TOML config")?;

    // 2. Build model and estimator
    let model = convert::build_regarima_model(&config)?;
    let method = convert::parse_method(&config.estimation.method)?;
    let estimator =
        RegArimaEstimator::new(convert::build_estimation_config(&config.estimation, args.threads)?);
    info!(
        n = model.y().len(),
        missing = model.missing_positions().len(),
        variables = model.variables_count(),
        ?method,
        "estimating RegARIMA model"
    );

    // 3. Estimate
    let estimation = match method {
        EstimationMethod::Fast => estimator.fast_estimation(&model),
        EstimationMethod::Robust => estimator.robust_estimation(&model),
    }
    .context("estimation failed")?;
    info!(
        log_likelihood = estimation.log_likelihood(),
        aic = estimation.aic(),
        iterations = estimation.iterations(),
        "estimation done"
    );

    // 4. Write report
    output::write_json(
        &EstimationReport::new(method, &estimation)?,
        args.output.as_deref(),
    )
}
