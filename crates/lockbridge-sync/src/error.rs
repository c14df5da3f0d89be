use lockbridge_vendor::VendorError;
use thiserror::Error;

/// Errors surfaced by the bridge to its host.
///
/// Per-device sync and dispatch failures are logged and reported through
/// outcomes, not through this type; only startup discovery, precondition
/// violations and configuration problems reach the caller.
#[derive(Debug, Error)]
pub enum BridgeError {
    /// Lock discovery or authentication failed.
    #[error("Vendor error: {0}")]
    Vendor(#[from] VendorError),

    /// Identifier, binding or configuration error.
    #[error(transparent)]
    Core(#[from] lockbridge_core::Error),

    /// The tracing subscriber could not be installed or reloaded.
    #[error("Logging error: {0}")]
    Logging(String),
}

impl BridgeError {
    /// Returns `true` for errors caused by a misbehaving host integration.
    pub fn is_programming_error(&self) -> bool {
        matches!(self, Self::Core(core) if core.is_programming_error())
    }
}

/// Specialized result type for bridge operations
pub type BridgeResult<T> = Result<T, BridgeError>;
