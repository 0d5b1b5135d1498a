//! Tracing setup for binaries.

use anyhow::{Context, Result, anyhow};
use tracing_subscriber::EnvFilter;

/// Env var holding the log filter (e.g. `idflow=debug`).
pub const LOG_ENV: &str = "IDFLOW_LOG";

const DEFAULT_FILTER: &str = "warn";

/// Installs a stderr `fmt` subscriber filtered by `IDFLOW_LOG`.
///
/// # Errors
/// Returns an error if the filter is invalid or a subscriber is already set.
pub fn init_tracing() -> Result<()> {
    let directives = std::env::var(LOG_ENV).unwrap_or_else(|_| DEFAULT_FILTER.to_string());
    let filter = EnvFilter::try_new(&directives).context("invalid log filter")?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .map_err(|err| anyhow!(err))
        .context("initialize tracing subscriber")?;
    Ok(())
}
