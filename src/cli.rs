use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Seasonal-adjustment estimation core.
#[derive(Parser)]
#[command(
    name = "sadec",
    version,
    about = "RegARIMA estimation and state-space component decomposition"
)]
pub struct Cli {
    /// Increase verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Only log errors.
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Available subcommands.
#[derive(Subcommand)]
pub enum Command {
    /// Fit a regression with seasonal ARIMA errors.
    Estimate(EstimateArgs),
    /// Split a series into components with the diffuse smoother.
    Decompose(DecomposeArgs),
}

/// Arguments for the `estimate` subcommand.
#[derive(clap::Args)]
pub struct EstimateArgs {
    /// Path to TOML configuration file.
    #[arg(short, long, default_value = "sadec.toml")]
    pub config: PathBuf,

    /// Path for the JSON report (stdout when absent).
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Worker threads for parallel likelihood evaluations. Implies
    /// `[estimation].parallel = true`; 0 lets rayon decide.
    #[arg(short, long)]
    pub threads: Option<usize>,
}

/// Arguments for the `decompose` subcommand.
#[derive(clap::Args)]
pub struct DecomposeArgs {
    /// Path to TOML configuration file.
    #[arg(short, long, default_value = "sadec.toml")]
    pub config: PathBuf,

    /// Path for the JSON decomposition (stdout when absent).
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}
