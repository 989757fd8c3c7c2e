//! Tracing subscriber setup.
//!
//! `RUST_LOG` wins over the configured level when it is set.

use colony_core::config::GeneralConfig;
use tracing_subscriber::EnvFilter;

use crate::error::ServerError;

/// Install the global subscriber.
///
/// # Errors
/// Returns `ServerError::Logging` if the level directive does not parse or a
/// global subscriber is already installed.
pub fn init(general: &GeneralConfig) -> Result<(), ServerError> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&general.log_level)
            .map_err(|e| ServerError::Logging(e.to_string()))?,
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);

    let installed = if general.json_logs {
        builder.json().try_init()
    } else {
        builder.try_init()
    };

    installed.map_err(|e| ServerError::Logging(e.to_string()))
}
