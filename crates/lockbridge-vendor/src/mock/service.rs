//! Mock vendor account for testing and development.

use super::lock::{MockFailure, MockLock, MockLockHandle};
use crate::{
    Result, VendorError,
    traits::{LockService, RemoteLock},
};
use lockbridge_core::{Credentials, LockAddress, LockSnapshot};
use parking_lot::Mutex;
use std::sync::Arc;

#[derive(Debug, Default)]
struct ServiceState {
    /// Registered locks, in registration order.
    locks: Vec<MockLock>,

    /// When set, only these credentials authenticate.
    accepted_credentials: Option<Credentials>,

    authenticated: bool,
    listing_failure: Option<MockFailure>,
    authenticate_calls: usize,
    list_calls: usize,
}

/// Mock vendor account holding a set of [`MockLock`]s.
///
/// # Examples
///
/// ```
/// use lockbridge_core::Credentials;
/// use lockbridge_vendor::mock::MockLockService;
/// use lockbridge_vendor::traits::LockService;
///
/// #[tokio::main]
/// async fn main() -> lockbridge_vendor::Result<()> {
///     let (service, handle) = MockLockService::new();
///     handle.require_credentials(Credentials::new("me", "secret"));
///
///     assert!(service.authenticate(&Credentials::new("me", "wrong")).await.is_err());
///     service.authenticate(&Credentials::new("me", "secret")).await?;
///     assert!(service.list_locks().await?.is_empty());
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct MockLockService {
    state: Arc<Mutex<ServiceState>>,
}

impl MockLockService {
    /// Create an empty mock account.
    ///
    /// Without [`MockServiceHandle::require_credentials`] any credentials are
    /// accepted.
    pub fn new() -> (Self, MockServiceHandle) {
        let state = Arc::new(Mutex::new(ServiceState::default()));
        (
            Self {
                state: Arc::clone(&state),
            },
            MockServiceHandle { state },
        )
    }
}

impl LockService for MockLockService {
    type Lock = MockLock;

    async fn authenticate(&self, credentials: &Credentials) -> Result<()> {
        let mut state = self.state.lock();
        state.authenticate_calls += 1;

        let rejected = state
            .accepted_credentials
            .as_ref()
            .is_some_and(|accepted| accepted != credentials);

        if rejected {
            state.authenticated = false;
            return Err(VendorError::auth(format!(
                "invalid credentials for {}",
                credentials.username
            )));
        }

        state.authenticated = true;
        Ok(())
    }

    async fn list_locks(&self) -> Result<Vec<MockLock>> {
        let mut state = self.state.lock();
        state.list_calls += 1;

        if let Some(failure) = state.listing_failure {
            return Err(failure.into_error("list locks"));
        }

        if state.accepted_credentials.is_some() && !state.authenticated {
            return Err(VendorError::auth("not authenticated"));
        }

        Ok(state.locks.clone())
    }
}

/// Handle for controlling a [`MockLockService`].
#[derive(Debug, Clone)]
pub struct MockServiceHandle {
    state: Arc<Mutex<ServiceState>>,
}

impl MockServiceHandle {
    /// Register a lock with the account and return its control handle.
    ///
    /// Registering an address twice replaces the earlier lock.
    pub fn add_lock(&self, snapshot: LockSnapshot) -> MockLockHandle {
        let (lock, handle) = MockLock::new(snapshot);
        let mut state = self.state.lock();
        state
            .locks
            .retain(|existing| existing.address() != lock.address());
        state.locks.push(lock);
        handle
    }

    /// Remove a lock from the account. Returns `true` if it was registered.
    pub fn remove_lock(&self, address: &LockAddress) -> bool {
        let mut state = self.state.lock();
        let before = state.locks.len();
        state.locks.retain(|lock| lock.address() != address);
        state.locks.len() != before
    }

    /// Only accept `credentials` from now on; the current session is dropped.
    pub fn require_credentials(&self, credentials: Credentials) {
        let mut state = self.state.lock();
        state.accepted_credentials = Some(credentials);
        state.authenticated = false;
    }

    /// Make every listing fail with `failure` until cleared with `None`.
    pub fn fail_listing(&self, failure: Option<MockFailure>) {
        self.state.lock().listing_failure = failure;
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.lock().authenticated
    }

    pub fn authenticate_calls(&self) -> usize {
        self.state.lock().authenticate_calls
    }

    pub fn list_calls(&self) -> usize {
        self.state.lock().list_calls
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(address: &str, name: &str) -> LockSnapshot {
        LockSnapshot {
            address: LockAddress::new(address).unwrap(),
            name: name.to_string(),
            model_name: "X".to_string(),
            is_connected: true,
            is_locked: true,
            is_jammed: false,
            battery_level: 100,
            firmware_version: "1.0".to_string(),
            beeper_enabled: false,
            auto_lock_time: 0,
            lock_and_leave_enabled: false,
        }
    }

    #[tokio::test]
    async fn test_list_locks_in_registration_order() {
        let (service, handle) = MockLockService::new();
        handle.add_lock(snapshot("AA:BB", "Front Door"));
        handle.add_lock(snapshot("CC:DD", "Garage"));

        let locks = service.list_locks().await.unwrap();
        let names: Vec<_> = locks.iter().map(|lock| lock.snapshot().name).collect();
        assert_eq!(names, vec!["Front Door", "Garage"]);
        assert_eq!(handle.list_calls(), 1);
    }

    #[tokio::test]
    async fn test_add_lock_replaces_same_address() {
        let (service, handle) = MockLockService::new();
        handle.add_lock(snapshot("AA:BB", "Old"));
        handle.add_lock(snapshot("aa:bb", "New"));

        let locks = service.list_locks().await.unwrap();
        assert_eq!(locks.len(), 1);
        assert_eq!(locks[0].snapshot().name, "New");
    }

    #[tokio::test]
    async fn test_remove_lock() {
        let (service, handle) = MockLockService::new();
        let lock = handle.add_lock(snapshot("AA:BB", "Front Door"));

        assert!(handle.remove_lock(lock.address()));
        assert!(!handle.remove_lock(lock.address()));
        assert!(service.list_locks().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_listing_requires_session_when_credentials_required() {
        let (service, handle) = MockLockService::new();
        handle.require_credentials(Credentials::new("me", "secret"));

        let error = service.list_locks().await.unwrap_err();
        assert!(error.is_auth());

        service
            .authenticate(&Credentials::new("me", "secret"))
            .await
            .unwrap();
        assert!(handle.is_authenticated());
        assert!(service.list_locks().await.is_ok());
    }

    #[tokio::test]
    async fn test_listing_failure() {
        let (service, handle) = MockLockService::new();
        handle.fail_listing(Some(MockFailure::Transport));

        let error = service.list_locks().await.unwrap_err();
        assert!(matches!(error, VendorError::Transport { .. }));
    }
}
