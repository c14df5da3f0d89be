//! Vendor service abstraction layer for lockbridge.
//!
//! This crate defines the narrow contract the bridge needs from a cloud lock
//! vendor: authenticate, list the account's locks, and for each lock refresh
//! its state or send a lock/unlock command. Everything below that contract
//! (tokens, HTTP, push channels) belongs to the vendor client.
//!
//! # Design Philosophy
//!
//! - **Async-first**: all remote operations are native `async fn` in traits
//!   (Rust 1.90 + Edition 2024 RPITIT).
//! - **Enum dispatch**: [`AnyLockService`] and [`AnyRemoteLock`] give callers
//!   concrete types whose futures are `Send`.
//! - **Error-aware**: every operation returns [`Result<T>`][error::Result]
//!   with a [`VendorError`] the bridge can classify.
//!
//! # Example
//!
//! ```no_run
//! use lockbridge_core::Credentials;
//! use lockbridge_vendor::traits::{LockService, RemoteLock};
//! use lockbridge_vendor::Result;
//!
//! async fn unlock_all<S: LockService>(service: &S, credentials: &Credentials) -> Result<()> {
//!     service.authenticate(credentials).await?;
//!
//!     for lock in service.list_locks().await? {
//!         lock.unlock().await?;
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! # Mock Implementations
//!
//! [`mock::MockLockService`] and [`mock::MockLock`] simulate an account
//! in memory, with handles for changing lock state, injecting failures and
//! counting calls.

pub mod devices;
pub mod error;
pub mod mock;
pub mod timeout;
pub mod traits;

// Re-export commonly used types for convenience
pub use devices::{AnyLockService, AnyRemoteLock};
pub use error::{Result, VendorError};
pub use traits::{LockService, RemoteLock};
