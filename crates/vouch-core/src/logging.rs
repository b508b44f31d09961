//! Tracing subscriber setup for processes embedding the protocol.

use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;
use crate::error::CoreError;

/// Install the global fmt subscriber.
///
/// `RUST_LOG` wins over the configured level. Returns an error for an unknown
/// format; a second call is a no-op because a global subscriber is already set.
pub fn init(config: &LoggingConfig) -> Result<(), CoreError> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    let result = match config.format.as_str() {
        "text" => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .try_init(),
        "json" => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .try_init(),
        other => return Err(CoreError::InvalidLogFormat(other.to_string())),
    };

    if result.is_err() {
        tracing::debug!("global subscriber already installed");
    }
    Ok(())
}
