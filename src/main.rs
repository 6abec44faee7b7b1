mod cli;
mod config;
mod convert;
mod decompose_cmd;
mod estimate_cmd;
mod logging;
mod output;

use std::process::ExitCode;

use clap::Parser;

use crate::cli::{Cli, Command};

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.verbose, cli.quiet);

    let result = match cli.command {
        Command::Estimate(args) => estimate_cmd::run(args),
        Command::Decompose(args) => decompose_cmd::run(args),
    };
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("sadec: {e:#}");
            ExitCode::FAILURE
        }
    }
}
