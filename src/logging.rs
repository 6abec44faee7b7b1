use std::io::IsTerminal;

use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

/// Workspace crates whose events reach the terminal.
const CRATE_TARGETS: &[&str] = &[
    "sadec",
    "sadec_linalg",
    "sadec_arima",
    "sadec_ssf",
    "sadec_seats",
    "sadec_regarima",
];

/// Level for `-v` counts: warn by default, then info, debug and trace.
/// `--quiet` keeps errors only.
fn level(verbose: u8, quiet: bool) -> LevelFilter {
    match (quiet, verbose) {
        (true, _) => LevelFilter::ERROR,
        (false, 0) => LevelFilter::WARN,
        (false, 1) => LevelFilter::INFO,
        (false, 2) => LevelFilter::DEBUG,
        (false, _) => LevelFilter::TRACE,
    }
}

fn directives(level: LevelFilter) -> String {
    CRATE_TARGETS
        .iter()
        .map(|t| format!("{t}={level}"))
        .collect::<Vec<_>>()
        .join(",")
}

/// Installs the stderr subscriber. Reports go to stdout, so logs never mix
/// with the JSON. `RUST_LOG` replaces the flag-derived filter when set.
///
/// Targets are shown from `-vv` on, when events from several crates
/// interleave; colours only when stderr is a terminal.
pub fn init(verbose: u8, quiet: bool) {
    let level = level(verbose, quiet);
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(directives(level)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .with_target(level >= LevelFilter::DEBUG)
        .without_time()
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbosity_levels() {
        assert_eq!(level(0, false), LevelFilter::WARN);
        assert_eq!(level(1, false), LevelFilter::INFO);
        assert_eq!(level(2, false), LevelFilter::DEBUG);
        assert_eq!(level(7, false), LevelFilter::TRACE);
        assert_eq!(level(3, true), LevelFilter::ERROR);
    }

    #[test]
    fn directives_cover_every_crate() {
        let d = directives(LevelFilter::DEBUG);
        assert!(d.starts_with("sadec=debug,"));
        assert!(d.contains("sadec_regarima=debug"));
        assert_eq!(d.split(',').count(), CRATE_TARGETS.len());
        assert!(EnvFilter::try_new(d).is_ok());
    }
}
