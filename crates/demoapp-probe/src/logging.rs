//! Logging setup.

use tracing_subscriber::{fmt, EnvFilter};

/// Install a formatted subscriber. `RUST_LOG` overrides `default_filter`.
///
/// Calling this more than once is harmless: later calls leave the first
/// subscriber in place and return `false`.
pub fn init(default_filter: &str) -> bool {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
        .is_ok()
}

/// Default filter for a CLI verbosity count
#[must_use]
pub const fn filter_for_verbosity(verbose: u8, quiet: bool) -> &'static str {
    if quiet {
        return "error";
    }
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}
