//! Mock vendor implementations for testing and development.
//!
//! This module provides a simulated vendor account and locks that can be
//! controlled programmatically without a cloud account.

pub mod lock;
pub mod service;

// Re-export commonly used types
pub use lock::{MockFailure, MockLock, MockLockHandle};
pub use service::{MockLockService, MockServiceHandle};
