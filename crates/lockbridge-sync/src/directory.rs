//! Lock directory.
//!
//! Maps each lock address discovered on the vendor account to its remote
//! handle. Built at startup and rebuilt when the credentials change.

use lockbridge_core::LockAddress;
use lockbridge_vendor::timeout::with_timeout;
use lockbridge_vendor::traits::{LockService, RemoteLock};
use lockbridge_vendor::{AnyLockService, AnyRemoteLock};
use std::collections::BTreeMap;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::info;

/// Locks known on the vendor account, keyed by address.
#[derive(Debug, Default)]
pub struct LockDirectory {
    locks: RwLock<BTreeMap<LockAddress, AnyRemoteLock>>,
}

impl LockDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// List the account's locks and replace the directory contents.
    ///
    /// On failure the previous contents are kept. Returns the number of
    /// locks discovered.
    pub async fn discover(
        &self,
        service: &AnyLockService,
        call_timeout: Duration,
    ) -> lockbridge_vendor::Result<usize> {
        let discovered = with_timeout(call_timeout, service.list_locks()).await?;

        let mut locks = BTreeMap::new();
        for lock in discovered {
            let snapshot = lock.snapshot();
            info!(
                "Discovered lock: {}@{} ({})",
                snapshot.name, snapshot.address, snapshot.model_name
            );
            locks.insert(snapshot.address.clone(), lock);
        }

        let count = locks.len();
        *self.locks.write().await = locks;
        info!(count, "Lock discovery complete");

        Ok(count)
    }

    /// Remote handle for an address, if the lock was discovered.
    pub async fn lookup(&self, address: &LockAddress) -> Option<AnyRemoteLock> {
        self.locks.read().await.get(address).cloned()
    }

    /// `(address, "name (model)")` pairs for device configuration, ordered
    /// by address.
    pub async fn list_all(&self) -> Vec<(LockAddress, String)> {
        self.locks
            .read()
            .await
            .iter()
            .map(|(address, lock)| (address.clone(), lock.snapshot().display_label()))
            .collect()
    }

    pub async fn len(&self) -> usize {
        self.locks.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.locks.read().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lockbridge_core::LockSnapshot;
    use lockbridge_vendor::mock::{MockFailure, MockLockService};

    fn snapshot(address: &str, name: &str, model: &str) -> LockSnapshot {
        LockSnapshot {
            address: LockAddress::new(address).unwrap(),
            name: name.to_string(),
            model_name: model.to_string(),
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

    const TIMEOUT: Duration = Duration::from_secs(30);

    #[tokio::test]
    async fn test_discover_and_list_labels() {
        let (service, handle) = MockLockService::new();
        handle.add_lock(snapshot("CC:DD", "Back Door", "BE489"));
        handle.add_lock(snapshot("AA:BB", "Front Door", "X"));

        let directory = LockDirectory::new();
        let count = directory.discover(&service.into(), TIMEOUT).await.unwrap();

        assert_eq!(count, 2);
        assert_eq!(
            directory.list_all().await,
            vec![
                (LockAddress::new("AA:BB").unwrap(), "Front Door (X)".to_string()),
                (LockAddress::new("CC:DD").unwrap(), "Back Door (BE489)".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_lookup_unknown_address() {
        let (service, handle) = MockLockService::new();
        handle.add_lock(snapshot("AA:BB", "Front Door", "X"));

        let directory = LockDirectory::new();
        directory.discover(&service.into(), TIMEOUT).await.unwrap();

        assert!(directory.lookup(&LockAddress::new("aa:bb").unwrap()).await.is_some());
        assert!(directory.lookup(&LockAddress::new("EE:FF").unwrap()).await.is_none());
    }

    #[tokio::test]
    async fn test_failed_discovery_keeps_previous_contents() {
        let (service, handle) = MockLockService::new();
        handle.add_lock(snapshot("AA:BB", "Front Door", "X"));
        let service = AnyLockService::from(service);

        let directory = LockDirectory::new();
        directory.discover(&service, TIMEOUT).await.unwrap();

        handle.fail_listing(Some(MockFailure::Transport));
        assert!(directory.discover(&service, TIMEOUT).await.is_err());
        assert_eq!(directory.len().await, 1);
    }

    #[tokio::test]
    async fn test_empty_account() {
        let (service, _handle) = MockLockService::new();
        let directory = LockDirectory::new();

        assert_eq!(directory.discover(&service.into(), TIMEOUT).await.unwrap(), 0);
        assert!(directory.is_empty().await);
        assert!(directory.list_all().await.is_empty());
    }
}
