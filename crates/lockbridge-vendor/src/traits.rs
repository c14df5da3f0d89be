//! Vendor service trait definitions.
//!
//! These traits are the whole contract between the bridge and the vendor's
//! cloud API. Authentication tokens, HTTP and push transports stay behind
//! them.
//!
//! All traits use native `async fn` methods (Rust 1.90 + Edition 2024 RPITIT),
//! eliminating the need for the `async_trait` macro. As with any RPITIT trait
//! they are not object-safe; use the enum wrappers in
//! [`devices`](crate::devices) where a single concrete type is needed.

#![allow(async_fn_in_trait)]

use crate::error::Result;
use lockbridge_core::{Credentials, LockAddress, LockIntent, LockSnapshot};

/// Handle to one lock registered to the vendor account.
///
/// Handles are cheap to clone and all clones refer to the same remote lock.
/// The vendor owns the lock's state; the bridge only reads it through
/// [`refresh`](RemoteLock::refresh).
///
/// # Examples
///
/// ```no_run
/// use lockbridge_vendor::traits::RemoteLock;
/// use lockbridge_vendor::Result;
///
/// async fn report<L: RemoteLock>(lock: &L) -> Result<()> {
///     let state = lock.refresh().await?;
///     println!("{} locked={} battery={}", state.name, state.is_locked, state.battery_display());
///     Ok(())
/// }
/// ```
pub trait RemoteLock: Clone + Send + Sync {
    /// Stable identifier of the lock.
    fn address(&self) -> &LockAddress;

    /// State as of the last successful refresh (or discovery).
    fn snapshot(&self) -> LockSnapshot;

    /// Fetch the current state from the vendor.
    ///
    /// # Errors
    ///
    /// Returns [`VendorError::Auth`](crate::VendorError::Auth) when the
    /// session is no longer valid and another variant for any other failure.
    async fn refresh(&self) -> Result<LockSnapshot>;

    /// Ask the lock to lock. Returns once the vendor accepted the command,
    /// not once the bolt moved.
    async fn lock(&self) -> Result<()>;

    /// Ask the lock to unlock. Same completion semantics as [`lock`](RemoteLock::lock).
    async fn unlock(&self) -> Result<()>;

    /// Issue the remote call matching `intent`.
    async fn send_intent(&self, intent: LockIntent) -> Result<()> {
        match intent {
            LockIntent::Lock => self.lock().await,
            LockIntent::Unlock => self.unlock().await,
        }
    }
}

/// The vendor account: authentication and lock discovery.
///
/// # Examples
///
/// ```no_run
/// use lockbridge_vendor::traits::{LockService, RemoteLock};
/// use lockbridge_vendor::Result;
/// use lockbridge_core::Credentials;
///
/// async fn list<S: LockService>(service: &S, credentials: &Credentials) -> Result<Vec<String>> {
///     service.authenticate(credentials).await?;
///     let locks = service.list_locks().await?;
///     Ok(locks.iter().map(|lock| lock.snapshot().display_label()).collect())
/// }
/// ```
pub trait LockService: Send + Sync {
    /// Lock handle type produced by discovery.
    type Lock: RemoteLock;

    /// Establish (or replace) the account session.
    async fn authenticate(&self, credentials: &Credentials) -> Result<()>;

    /// List every lock registered to the account.
    async fn list_locks(&self) -> Result<Vec<Self::Lock>>;
}
