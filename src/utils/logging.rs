//! Structured logging setup driven by [`LoggingConfig`].
//!
//! `RUST_LOG` takes precedence over the configured level so operators can
//! raise verbosity without touching the config file.

use crate::config::LoggingConfig;
use crate::error::{RconError, Result};
use tracing_subscriber::EnvFilter;

/// Install the global subscriber; ignores a second initialization.
pub fn init(config: &LoggingConfig) {
    let _ = try_init(config);
}

/// Install the global subscriber, reporting failure.
pub fn try_init(config: &LoggingConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.to_string()));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false);

    let result = if config.json_format {
        builder.json().try_init()
    } else {
        builder.try_init()
    };

    result.map_err(|e| RconError::ConfigError(format!("Failed to install subscriber: {e}")))
}
