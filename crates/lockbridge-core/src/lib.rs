//! Shared vocabulary for the lockbridge workspace.
//!
//! Identifiers, lock snapshots, command intents, configuration and the core
//! error type used by the vendor and sync crates.

pub mod config;
pub mod constants;
pub mod error;
pub mod types;

pub use config::{BridgeConfig, ConfigDelta, ConfigIssue, LogLevel};
pub use error::{Error, Result};
pub use types::*;

/// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
