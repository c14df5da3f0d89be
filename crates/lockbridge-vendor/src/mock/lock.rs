//! Mock remote lock for testing and development.
//!
//! A [`MockLock`] keeps two copies of the lock's state: the "physical" state
//! the vendor would report right now, and the cached snapshot from the last
//! refresh. The paired [`MockLockHandle`] edits the physical state, injects
//! failures and counts calls.

use crate::{
    Result, VendorError,
    traits::RemoteLock,
};
use lockbridge_core::{LockAddress, LockSnapshot};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;

/// Failure a mock can be told to return.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockFailure {
    Auth,
    Transport,
    Unknown,
}

impl MockFailure {
    pub(crate) fn into_error(self, operation: &str) -> VendorError {
        match self {
            MockFailure::Auth => VendorError::auth(format!("{operation}: session expired")),
            MockFailure::Transport => {
                VendorError::transport(format!("{operation}: connection refused"))
            }
            MockFailure::Unknown => VendorError::unknown(format!("{operation}: service error")),
        }
    }
}

#[derive(Debug)]
struct MockLockState {
    /// What the vendor would report now.
    remote: LockSnapshot,

    /// What the last refresh returned.
    cached: LockSnapshot,

    refresh_failure: Option<MockFailure>,
    command_failure: Option<MockFailure>,

    /// Simulated round-trip time of every call.
    latency: Duration,

    /// Whether lock/unlock immediately change `remote.is_locked`.
    actuate_on_command: bool,

    refresh_calls: usize,
    lock_calls: usize,
    unlock_calls: usize,
}

/// Mock remote lock.
///
/// # Examples
///
/// ```
/// use lockbridge_core::{LockAddress, LockSnapshot};
/// use lockbridge_vendor::mock::MockLock;
/// use lockbridge_vendor::traits::RemoteLock;
///
/// #[tokio::main]
/// async fn main() -> lockbridge_vendor::Result<()> {
///     let snapshot = LockSnapshot {
///         address: LockAddress::new("AA:BB").unwrap(),
///         name: "Front Door".to_string(),
///         model_name: "X".to_string(),
///         is_connected: true,
///         is_locked: true,
///         is_jammed: false,
///         battery_level: 90,
///         firmware_version: "1.0".to_string(),
///         beeper_enabled: false,
///         auto_lock_time: 0,
///         lock_and_leave_enabled: false,
///     };
///     let (lock, handle) = MockLock::new(snapshot);
///
///     lock.unlock().await?;
///     assert!(!lock.refresh().await?.is_locked);
///     assert_eq!(handle.unlock_calls(), 1);
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct MockLock {
    address: LockAddress,
    state: Arc<Mutex<MockLockState>>,
}

impl MockLock {
    /// Create a new mock lock reporting `snapshot`.
    ///
    /// Returns the lock and a handle for controlling it.
    pub fn new(snapshot: LockSnapshot) -> (Self, MockLockHandle) {
        let state = Arc::new(Mutex::new(MockLockState {
            remote: snapshot.clone(),
            cached: snapshot.clone(),
            refresh_failure: None,
            command_failure: None,
            latency: Duration::ZERO,
            actuate_on_command: true,
            refresh_calls: 0,
            lock_calls: 0,
            unlock_calls: 0,
        }));

        let lock = Self {
            address: snapshot.address.clone(),
            state: Arc::clone(&state),
        };

        let handle = MockLockHandle {
            address: snapshot.address,
            state,
        };

        (lock, handle)
    }

    async fn simulate_latency(&self) {
        let latency = self.state.lock().latency;
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }
    }

    async fn command(&self, locked: bool) -> Result<()> {
        self.simulate_latency().await;

        let mut state = self.state.lock();
        if locked {
            state.lock_calls += 1;
        } else {
            state.unlock_calls += 1;
        }

        if let Some(failure) = state.command_failure {
            let operation = if locked { "lock" } else { "unlock" };
            return Err(failure.into_error(operation));
        }

        if state.actuate_on_command {
            state.remote.is_locked = locked;
        }
        Ok(())
    }
}

impl RemoteLock for MockLock {
    fn address(&self) -> &LockAddress {
        &self.address
    }

    fn snapshot(&self) -> LockSnapshot {
        self.state.lock().cached.clone()
    }

    async fn refresh(&self) -> Result<LockSnapshot> {
        self.simulate_latency().await;

        let mut state = self.state.lock();
        state.refresh_calls += 1;

        if let Some(failure) = state.refresh_failure {
            return Err(failure.into_error("refresh"));
        }

        state.cached = state.remote.clone();
        Ok(state.cached.clone())
    }

    async fn lock(&self) -> Result<()> {
        self.command(true).await
    }

    async fn unlock(&self) -> Result<()> {
        self.command(false).await
    }
}

/// Handle for controlling a [`MockLock`].
///
/// Cloning the handle is cheap; every clone controls the same lock.
#[derive(Debug, Clone)]
pub struct MockLockHandle {
    address: LockAddress,
    state: Arc<Mutex<MockLockState>>,
}

impl MockLockHandle {
    pub fn address(&self) -> &LockAddress {
        &self.address
    }

    /// Edit the state the vendor will report on the next refresh.
    pub fn update(&self, edit: impl FnOnce(&mut LockSnapshot)) {
        edit(&mut self.state.lock().remote);
    }

    pub fn set_locked(&self, locked: bool) {
        self.update(|remote| remote.is_locked = locked);
    }

    pub fn set_jammed(&self, jammed: bool) {
        self.update(|remote| remote.is_jammed = jammed);
    }

    pub fn set_battery_level(&self, level: u8) {
        self.update(|remote| remote.battery_level = level.min(100));
    }

    /// Make every refresh fail with `failure` until cleared with `None`.
    pub fn fail_refresh(&self, failure: Option<MockFailure>) {
        self.state.lock().refresh_failure = failure;
    }

    /// Make every lock/unlock fail with `failure` until cleared with `None`.
    pub fn fail_commands(&self, failure: Option<MockFailure>) {
        self.state.lock().command_failure = failure;
    }

    /// Delay every call by `latency`.
    pub fn set_latency(&self, latency: Duration) {
        self.state.lock().latency = latency;
    }

    /// Control whether commands move the bolt. When disabled, commands are
    /// accepted but the reported state only changes through [`update`](Self::update).
    pub fn set_actuate_on_command(&self, actuate: bool) {
        self.state.lock().actuate_on_command = actuate;
    }

    pub fn remote_state(&self) -> LockSnapshot {
        self.state.lock().remote.clone()
    }

    pub fn refresh_calls(&self) -> usize {
        self.state.lock().refresh_calls
    }

    pub fn lock_calls(&self) -> usize {
        self.state.lock().lock_calls
    }

    pub fn unlock_calls(&self) -> usize {
        self.state.lock().unlock_calls
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot() -> LockSnapshot {
        LockSnapshot {
            address: LockAddress::new("AA:BB").unwrap(),
            name: "Front Door".to_string(),
            model_name: "X".to_string(),
            is_connected: true,
            is_locked: true,
            is_jammed: false,
            battery_level: 90,
            firmware_version: "1.0".to_string(),
            beeper_enabled: false,
            auto_lock_time: 0,
            lock_and_leave_enabled: false,
        }
    }

    #[tokio::test]
    async fn test_refresh_reads_remote_state() {
        let (lock, handle) = MockLock::new(snapshot());

        handle.set_jammed(true);
        handle.set_battery_level(42);
        assert!(!lock.snapshot().is_jammed);

        let refreshed = lock.refresh().await.unwrap();
        assert!(refreshed.is_jammed);
        assert_eq!(refreshed.battery_level, 42);
        assert_eq!(lock.snapshot(), refreshed);
        assert_eq!(handle.refresh_calls(), 1);
    }

    #[tokio::test]
    async fn test_refresh_failure_keeps_cached_snapshot() {
        let (lock, handle) = MockLock::new(snapshot());

        handle.fail_refresh(Some(MockFailure::Auth));
        handle.set_locked(false);

        let error = lock.refresh().await.unwrap_err();
        assert!(error.is_auth());
        assert!(lock.snapshot().is_locked);

        handle.fail_refresh(None);
        assert!(!lock.refresh().await.unwrap().is_locked);
    }

    #[tokio::test]
    async fn test_commands_actuate() {
        let (lock, handle) = MockLock::new(snapshot());

        lock.unlock().await.unwrap();
        assert!(!handle.remote_state().is_locked);

        lock.lock().await.unwrap();
        assert!(handle.remote_state().is_locked);

        assert_eq!(handle.lock_calls(), 1);
        assert_eq!(handle.unlock_calls(), 1);
    }

    #[tokio::test]
    async fn test_commands_without_actuation() {
        let (lock, handle) = MockLock::new(snapshot());
        handle.set_actuate_on_command(false);

        lock.unlock().await.unwrap();
        assert!(handle.remote_state().is_locked);
        assert_eq!(handle.unlock_calls(), 1);
    }

    #[tokio::test]
    async fn test_command_failure_is_counted() {
        let (lock, handle) = MockLock::new(snapshot());
        handle.fail_commands(Some(MockFailure::Transport));

        let error = lock.lock().await.unwrap_err();
        assert!(matches!(error, VendorError::Transport { .. }));
        assert_eq!(handle.lock_calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_latency_is_simulated() {
        let (lock, handle) = MockLock::new(snapshot());
        handle.set_latency(Duration::from_secs(5));

        let start = tokio::time::Instant::now();
        lock.refresh().await.unwrap();
        assert!(start.elapsed() >= Duration::from_secs(5));
    }
}
