//! Tracing setup for GlucoTwin.
//!
//! Engines log each forecast pass, dose and food verdict at `debug`; profile
//! and config file access logs at `info`. Everything goes to stderr so the
//! CLI's stdout (text or `--json`) is never mixed with log lines.

use crate::{Error, Result};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Default level for the `glucotwin` binary: only odd inputs and failures
pub const CLI_LOG_LEVEL: &str = "warn";

/// Install the subscriber at `info`, showing profile and config file access
///
/// `RUST_LOG` takes precedence, e.g. `RUST_LOG=twin_core::predictor=debug`
/// to trace every forecast pass.
pub fn init() -> Result<()> {
    init_with_level("info")
}

/// Install the subscriber with a fallback filter used when `RUST_LOG` is unset
///
/// Fails if a global subscriber is already installed.
pub fn init_with_level(default_level: &str) -> Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact().with_writer(std::io::stderr))
        .try_init()
        .map_err(|e| Error::Other(format!("Logging already initialized: {}", e)))
}

/// Route engine logs into the test harness output
#[cfg(test)]
pub fn init_test() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter(EnvFilter::new("debug"))
        .try_init();
}
