//! Pure conversion functions: TOML config structs -> crate API types.

use std::sync::Arc;

use anyhow::{Context, Result, bail};

use sadec_arima::{ArimaModel, Polynomial, SarimaModel, SarimaSpec, UcarimaModel};
use sadec_regarima::{EstimationConfig, EstimationMode, RegArimaModel};
use sadec_seats::{ComponentType, SeatsModel};

use crate::config::*;

/// Which estimation path `sadec estimate` runs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EstimationMethod {
    /// One likelihood evaluation at the configured parameters.
    Fast,
    /// Full Nelder-Mead search of the ARMA parameters.
    Robust,
}

/// Parses an estimation method name.
pub fn parse_method(s: &str) -> Result<EstimationMethod> {
    match s.to_lowercase().as_str() {
        "fast" => Ok(EstimationMethod::Fast),
        "robust" => Ok(EstimationMethod::Robust),
        other => bail!("unknown estimation method: {other:?}"),
    }
}

/// Parses an objective name (`ml` or `ls`, long forms accepted).
pub fn parse_mode(s: &str) -> Result<EstimationMode> {
    match s.to_lowercase().as_str() {
        "ml" | "maximumlikelihood" => Ok(EstimationMode::MaximumLikelihood),
        "ls" | "leastsquares" => Ok(EstimationMode::LeastSquares),
        other => bail!("unknown estimation mode: {other:?}"),
    }
}

/// Parses a component type name.
pub fn parse_component_type(s: &str) -> Result<ComponentType> {
    match s.to_lowercase().as_str() {
        "trend" => Ok(ComponentType::Trend),
        "seasonal" => Ok(ComponentType::Seasonal),
        "transitory" => Ok(ComponentType::Transitory),
        "irregular" => Ok(ComponentType::Irregular),
        other => bail!("unknown component type: {other:?}"),
    }
}

/// Builds the SARIMA model of `[model]`, with its initial parameters when
/// given.
pub fn build_sarima_model(model: &ModelToml, period: usize) -> Result<SarimaModel> {
    let [p, d, q] = model.regular;
    let [bp, bd, bq] = model.seasonal;
    let spec = SarimaSpec::new(period)
        .with_regular(p, d, q)
        .with_seasonal(bp, bd, bq);
    spec.validate().context("invalid SARIMA orders")?;

    let sarima = SarimaModel::new(spec);
    match &model.parameters {
        Some(parameters) => sarima
            .with_parameters(parameters)
            .context("invalid initial ARMA parameters"),
        None => Ok(sarima),
    }
}

/// Builds the regression model from `[series]` and `[model]`.
pub fn build_regarima_model(config: &SadecConfig) -> Result<RegArimaModel> {
    let sarima = build_sarima_model(&config.model, config.series.period)?;
    let model = config.model.regressors.iter().fold(
        RegArimaModel::new(config.series.values.clone(), sarima).with_mean(config.model.mean),
        |model, x| model.with_regressor(x.clone()),
    );
    Ok(model)
}

/// Builds the estimator configuration.
///
/// A rayon pool is created when `[estimation].parallel` is set or a thread
/// count is given on the command line.
pub fn build_estimation_config(
    estimation: &EstimationToml,
    threads: Option<usize>,
) -> Result<EstimationConfig> {
    let mut cfg = EstimationConfig::new()
        .with_mode(parse_mode(&estimation.mode)?)
        .with_max_iter(estimation.max_iter)
        .with_tolerance(estimation.tolerance);
    if estimation.parallel || threads.is_some() {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads.unwrap_or(0))
            .build()
            .context("failed to build thread pool")?;
        cfg = cfg.with_thread_pool(Arc::new(pool));
    }
    cfg.validate().context("invalid [estimation] settings")?;
    Ok(cfg)
}

/// Builds one UCARIMA component.
pub fn build_component(component: &ComponentToml) -> Result<(ComponentType, ArimaModel)> {
    let kind = parse_component_type(&component.kind)?;
    let polynomial = |name: &str, c: &[f64]| {
        Polynomial::checked(c).with_context(|| format!("invalid {name} polynomial of {kind}"))
    };
    let model = ArimaModel::new(
        polynomial("ar", &component.ar)?,
        polynomial("differencing", &component.differencing)?,
        polynomial("ma", &component.ma)?,
        component.variance,
    )
    .with_context(|| format!("invalid {kind} component"))?;
    Ok((kind, model))
}

/// Builds the decomposition model from `[series]` and `[decomposition]`.
pub fn build_seats_model(config: &SadecConfig) -> Result<SeatsModel> {
    let Some(decomposition) = &config.decomposition else {
        bail!("no [decomposition] section in config");
    };
    if decomposition.components.is_empty() {
        bail!("[decomposition] needs at least one [[decomposition.components]] entry");
    }

    let (types, components): (Vec<_>, Vec<_>) = decomposition
        .components
        .iter()
        .map(build_component)
        .collect::<Result<Vec<_>>>()?
        .into_iter()
        .unzip();
    let ucarima = UcarimaModel::new(components).context("invalid UCARIMA model")?;

    let model = SeatsModel::new(config.series.values.clone(), ucarima, types)
        .with_backcasts(decomposition.backcasts)
        .with_forecasts(decomposition.forecasts)
        .with_innovation_variance(decomposition.innovation_variance);
    model.validate().context("invalid [decomposition] settings")?;
    Ok(model)
}
