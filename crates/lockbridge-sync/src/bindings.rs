//! Device binding table.
//!
//! Associates each started local device with the remote lock its address
//! names. A device is bound between `bind` (device start) and `unbind`
//! (device stop); only bound devices are synced and dispatched to.

use crate::directory::LockDirectory;
use crate::host::LocalDevice;
use lockbridge_core::{DeviceId, Error, LockAddress, Result};
use lockbridge_vendor::AnyRemoteLock;
use std::collections::BTreeMap;
use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};

/// A bound device and the remote handle it mirrors.
#[derive(Debug, Clone)]
pub struct Binding {
    pub address: LockAddress,
    pub lock: AnyRemoteLock,
}

/// Local devices currently bound to remote locks.
#[derive(Debug, Default)]
pub struct BindingTable {
    bindings: RwLock<BTreeMap<DeviceId, Binding>>,
}

impl BindingTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a device to the directory entry for its address.
    ///
    /// Fails with [`Error::UnknownLock`] without touching the table when the
    /// address was not discovered. Re-binding a bound device replaces its
    /// entry.
    pub async fn bind(&self, device: &LocalDevice, directory: &LockDirectory) -> Result<Binding> {
        let Some(lock) = directory.lookup(&device.address).await else {
            warn!(device = %device, address = %device.address, "No discovered lock for device");
            return Err(Error::UnknownLock(device.address.to_string()));
        };

        let binding = Binding {
            address: device.address.clone(),
            lock,
        };

        let previous = self
            .bindings
            .write()
            .await
            .insert(device.id, binding.clone());
        if previous.is_some() {
            debug!(device = %device, "Replaced existing binding");
        }
        info!(device = %device, address = %device.address, "Device bound");

        Ok(binding)
    }

    /// Remove a device's binding.
    ///
    /// Unbinding a device that is not bound is a precondition violation.
    pub async fn unbind(&self, device: DeviceId) -> Result<()> {
        match self.bindings.write().await.remove(&device) {
            Some(binding) => {
                info!(device = %device, address = %binding.address, "Device unbound");
                Ok(())
            }
            None => {
                error!(device = %device, "Device stopped while not bound");
                Err(Error::precondition(format!(
                    "device {device} stopped while not bound"
                )))
            }
        }
    }

    pub async fn get(&self, device: DeviceId) -> Option<Binding> {
        self.bindings.read().await.get(&device).cloned()
    }

    pub async fn contains(&self, device: DeviceId) -> bool {
        self.bindings.read().await.contains_key(&device)
    }

    pub async fn bound_devices(&self) -> Vec<DeviceId> {
        self.bindings.read().await.keys().copied().collect()
    }

    pub async fn len(&self) -> usize {
        self.bindings.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.bindings.read().await.is_empty()
    }

    /// Point existing bindings at the directory's current handles.
    ///
    /// Called after rediscovery. Devices whose lock disappeared keep their
    /// old handle. Returns the number of bindings refreshed.
    pub async fn rebind_all(&self, directory: &LockDirectory) -> usize {
        let mut bindings = self.bindings.write().await;
        let mut refreshed = 0;

        for (device, binding) in bindings.iter_mut() {
            match directory.lookup(&binding.address).await {
                Some(lock) => {
                    binding.lock = lock;
                    refreshed += 1;
                }
                None => {
                    warn!(device = %device, address = %binding.address, "Bound lock no longer on account");
                }
            }
        }

        refreshed
    }
}

/// Whether a device edit changed the lock it points at.
///
/// The host restarts the device (unbind then bind) when this returns `true`.
pub fn address_changed(old: &LocalDevice, new: &LocalDevice) -> bool {
    old.address != new.address
}
