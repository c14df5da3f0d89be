//! Error types for vendor service operations.
//!
//! The bridge only distinguishes the failure classes it reacts to
//! differently in logs: rejected credentials, a broken transport, a call
//! that never answered, and everything else the vendor reports.

/// Result type alias for vendor operations.
pub type Result<T> = std::result::Result<T, VendorError>;

/// Errors returned by the vendor lock service.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VendorError {
    /// Credentials were rejected or the session expired.
    #[error("Authentication failed: {message}")]
    Auth { message: String },

    /// The service could not be reached.
    #[error("Transport error: {message}")]
    Transport { message: String },

    /// The call did not complete within the allowed time.
    #[error("Remote call timeout after {duration_ms}ms")]
    Timeout { duration_ms: u64 },

    /// The service reported a failure without further detail.
    #[error("Remote call failed: {message}")]
    Unknown { message: String },
}

impl VendorError {
    /// Create a new authentication error.
    pub fn auth(message: impl Into<String>) -> Self {
        Self::Auth {
            message: message.into(),
        }
    }

    /// Create a new transport error.
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    /// Create a new timeout error.
    pub fn timeout(duration_ms: u64) -> Self {
        Self::Timeout { duration_ms }
    }

    /// Create a new unknown error.
    pub fn unknown(message: impl Into<String>) -> Self {
        Self::Unknown {
            message: message.into(),
        }
    }

    /// Returns `true` if the failure is due to credentials.
    pub fn is_auth(&self) -> bool {
        matches!(self, Self::Auth { .. })
    }
}
