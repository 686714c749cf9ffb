//! Structured logging setup

use tracing_subscriber::EnvFilter;

use crate::{
    config::Config,
    error::{Error, Result},
};

/// Install the JSON subscriber filtered by `service.log_level`
///
/// The value is an `EnvFilter` directive list, e.g. `info` or
/// `info,address_service=debug`; `Config::validate` has already checked it.
pub fn init_tracing(config: &Config) -> Result<()> {
    let directives: Vec<&str> = config.service.log_level.split(',').map(str::trim).collect();
    let filter = EnvFilter::try_new(directives.join(","))
        .map_err(|e| Error::Internal(format!("Invalid log filter: {}", e)))?;

    tracing_subscriber::fmt()
        .json()
        .with_env_filter(filter)
        .try_init()
        .map_err(|e| Error::Internal(format!("Failed to install tracing subscriber: {}", e)))?;

    tracing::info!(
        environment = %config.service.environment,
        "Tracing initialized for service: {}",
        config.service.name
    );

    Ok(())
}
