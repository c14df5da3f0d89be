//! Tracing setup with a runtime-adjustable level.

use crate::error::{BridgeError, BridgeResult};
use lockbridge_core::LogLevel;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Registry, reload};

/// Handle for changing the log level after the subscriber is installed.
#[derive(Clone)]
pub struct LogHandle {
    filter: reload::Handle<EnvFilter, Registry>,
}

impl std::fmt::Debug for LogHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LogHandle").finish_non_exhaustive()
    }
}

impl LogHandle {
    /// Replace the active filter with one for `level`.
    ///
    /// `RUST_LOG`, when set, still takes precedence.
    pub fn set_level(&self, level: LogLevel) -> BridgeResult<()> {
        self.filter
            .reload(filter_for(level))
            .map_err(|e| BridgeError::Logging(e.to_string()))?;
        tracing::info!(%level, "Log level changed");
        Ok(())
    }
}

/// Build the filter for a configured level.
pub fn filter_for(level: LogLevel) -> EnvFilter {
    // Only apply the configured level if RUST_LOG is not set
    match std::env::var("RUST_LOG") {
        Ok(_) => EnvFilter::from_default_env(),
        Err(_) => EnvFilter::new(level.as_filter_directive()),
    }
}

/// Install the global subscriber.
///
/// Fails if a subscriber is already installed.
pub fn init_tracing(level: LogLevel) -> BridgeResult<LogHandle> {
    let (filter, handle) = reload::Layer::new(filter_for(level));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .try_init()
        .map_err(|e| BridgeError::Logging(e.to_string()))?;

    Ok(LogHandle { filter: handle })
}
