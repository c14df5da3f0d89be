use crate::config::ConfigIssue;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    // Identifier errors
    #[error("Invalid lock address: {0}")]
    InvalidAddress(String),

    #[error("Invalid device ID: {0}")]
    InvalidDeviceId(String),

    // Binding errors
    #[error("Lock not found in directory: {0}")]
    UnknownLock(String),

    /// The host integration called an operation out of order, e.g. syncing a
    /// device that was never started.
    #[error("Precondition violated: {0}")]
    Precondition(String),

    // Configuration errors
    #[error("Invalid configuration: {}", join_issues(.0))]
    InvalidConfig(Vec<ConfigIssue>),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create a new precondition violation.
    pub fn precondition(message: impl Into<String>) -> Self {
        Self::Precondition(message.into())
    }

    /// Returns `true` for errors caused by a misbehaving host integration.
    pub fn is_programming_error(&self) -> bool {
        matches!(self, Self::Precondition(_))
    }
}

fn join_issues(issues: &[ConfigIssue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

pub type Result<T> = std::result::Result<T, Error>;
