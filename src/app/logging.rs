//! logging setup (A4)
use crate::error::{AppError, Result};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::util::SubscriberInitExt;

/// initializes the global `tracing` subscriber once, env-filter driven
/// (`RUST_LOG`, default `info`)
pub fn setup() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .finish()
        .try_init()
        .map_err(|e| AppError::ConfigError(format!("failed to install logger: {e}")))?;

    tracing::info!("logging initialized");
    Ok(())
}
