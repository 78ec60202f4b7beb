//! Log output setup.
//!
//! Logs go to stderr so they never interleave with console output on
//! stdout. `RUST_LOG` takes precedence over the configured filter.

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Layer};

use crate::error::{RadiowireError, Result};

/// Environment variable that overrides the configured filter.
pub const LOG_FILTER_ENV: &str = "RUST_LOG";

/// Build the filter: `RUST_LOG` if set and valid, else `default_filter`.
pub fn env_filter(default_filter: &str) -> EnvFilter {
    EnvFilter::try_from_env(LOG_FILTER_ENV).unwrap_or_else(|_| EnvFilter::new(default_filter))
}

/// Install the global subscriber.
///
/// Fails if a subscriber is already installed.
pub fn init(default_filter: &str) -> Result<()> {
    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_filter(env_filter(default_filter));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .try_init()
        .map_err(|e| RadiowireError::Config(format!("failed to initialise logging: {}", e)))
}
