//! Enum wrappers for vendor dispatch.
//!
//! Native `async fn` in traits (RPITIT) is not object-safe, so the bridge
//! cannot hold a `Box<dyn LockService>`. These enums give it one concrete
//! service type and one concrete lock type instead, which also keeps the
//! futures they return `Send` for use in spawned tasks.
//!
//! # Examples
//!
//! ```
//! use lockbridge_vendor::devices::AnyLockService;
//! use lockbridge_vendor::mock::MockLockService;
//!
//! let (service, _handle) = MockLockService::new();
//! let any_service = AnyLockService::Mock(service);
//! ```

use crate::mock::{MockLock, MockLockService};
use crate::traits::{LockService, RemoteLock};
use crate::Result;
use lockbridge_core::{Credentials, LockAddress, LockSnapshot};

/// Enum wrapper for vendor service dispatch.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub enum AnyLockService {
    /// Mock account for development and testing.
    Mock(MockLockService),
    // TODO: add a `Cloud` variant backed by the vendor's HTTPS API once its
    // client crate exists; the bridge only needs the two `LockService` calls.
}

impl LockService for AnyLockService {
    type Lock = AnyRemoteLock;

    async fn authenticate(&self, credentials: &Credentials) -> Result<()> {
        match self {
            Self::Mock(service) => service.authenticate(credentials).await,
        }
    }

    async fn list_locks(&self) -> Result<Vec<AnyRemoteLock>> {
        match self {
            Self::Mock(service) => Ok(service
                .list_locks()
                .await?
                .into_iter()
                .map(AnyRemoteLock::Mock)
                .collect()),
        }
    }
}

impl From<MockLockService> for AnyLockService {
    fn from(service: MockLockService) -> Self {
        Self::Mock(service)
    }
}

/// Enum wrapper for remote lock dispatch.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub enum AnyRemoteLock {
    /// Mock lock for development and testing.
    Mock(MockLock),
}

impl RemoteLock for AnyRemoteLock {
    fn address(&self) -> &LockAddress {
        match self {
            Self::Mock(lock) => lock.address(),
        }
    }

    fn snapshot(&self) -> LockSnapshot {
        match self {
            Self::Mock(lock) => lock.snapshot(),
        }
    }

    async fn refresh(&self) -> Result<LockSnapshot> {
        match self {
            Self::Mock(lock) => lock.refresh().await,
        }
    }

    async fn lock(&self) -> Result<()> {
        match self {
            Self::Mock(lock) => lock.lock().await,
        }
    }

    async fn unlock(&self) -> Result<()> {
        match self {
            Self::Mock(lock) => lock.unlock().await,
        }
    }
}

impl From<MockLock> for AnyRemoteLock {
    fn from(lock: MockLock) -> Self {
        Self::Mock(lock)
    }
}
