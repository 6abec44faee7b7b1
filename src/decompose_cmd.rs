//! Decompose command: split a series into its components.

use anyhow::{Context, Result};
use tracing::{info, info_span};

use sadec_seats::{ComponentsEstimator, KalmanEstimator};

use crate::cli::DecomposeArgs;
use crate::config::SadecConfig;
use crate::convert;
use crate::output;

/// Run the decomposition pipeline.
pub fn run(args: DecomposeArgs) -> Result<()> {
    let _cmd = info_span!("decompose").entered();
    // 1. Load project TOML
    let toml_str = std::fs::read_to_string(&args.config)
        .with_context(|| format!("failed to read config file: {}", args.config.display()))?;
    let config: SadecConfig = toml::from_str(&toml_str).context("failed to parse TOML config")?;

    // 2. Build model
    let model = convert::build_seats_model(&config)?;
    info!(
        n = model.series().len(),
        components = model.types().len(),
        nb = model.backcasts_count(),
        nf = model.forecasts_count(),
        "decomposing series"
    );

    // 3. Smooth
    let decomposition = KalmanEstimator::new()
        .decompose(&model)
        .context("decomposition failed")?;
    info!(entries = decomposition.entries().len(), "decomposition done");

    // 4. Write decomposition
    output::write_json(&decomposition, args.output.as_deref())
}
