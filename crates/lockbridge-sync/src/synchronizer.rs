//! Lock state synchronization.
//!
//! A sync refreshes one bound lock from the vendor, mirrors every field onto
//! the host device and fires jam triggers while the lock reports a jam.
//! Vendor failures are logged and reported in the outcome; they never abort
//! a refresh cycle.

use crate::bindings::{Binding, BindingTable};
use crate::host::{HostPlatform, state_updates};
use crate::triggers::{JamEvent, TriggerRegistry};
use lockbridge_core::{DeviceId, Error, LockSnapshot, Result};
use lockbridge_vendor::timeout::with_timeout;
use lockbridge_vendor::{RemoteLock, VendorError};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, error, warn};

/// Result of syncing one device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    /// States were written from a fresh snapshot.
    Synced {
        snapshot: LockSnapshot,
        /// Number of jam triggers executed.
        triggers_fired: usize,
    },
    /// The refresh failed; states were left untouched.
    Failed(VendorError),
}

impl SyncOutcome {
    pub fn is_synced(&self) -> bool {
        matches!(self, Self::Synced { .. })
    }
}

/// Summary of one pass over all bound devices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct CycleReport {
    pub synced: usize,
    pub failed: usize,
    /// Devices unbound while the cycle was running.
    pub skipped: usize,
    pub jam_triggers_fired: usize,
    #[serde(skip)]
    pub elapsed: Duration,
}

/// Refreshes bound locks and mirrors them onto host devices.
pub struct LockSynchronizer {
    bindings: Arc<BindingTable>,
    host: Arc<dyn HostPlatform>,
    triggers: Arc<TriggerRegistry>,
    call_timeout: Duration,
}

impl LockSynchronizer {
    pub fn new(
        bindings: Arc<BindingTable>,
        host: Arc<dyn HostPlatform>,
        triggers: Arc<TriggerRegistry>,
        call_timeout: Duration,
    ) -> Self {
        Self {
            bindings,
            host,
            triggers,
            call_timeout,
        }
    }

    /// Sync one bound device.
    ///
    /// Syncing a device that is not bound is a precondition violation.
    pub async fn sync_device(&self, device: DeviceId) -> Result<SyncOutcome> {
        let Some(binding) = self.bindings.get(device).await else {
            error!(device = %device, "Device synced while not bound");
            return Err(Error::precondition(format!(
                "device {device} synced while not bound"
            )));
        };

        Ok(self.sync_binding(device, &binding).await)
    }

    /// Sync a device using a binding the caller already holds.
    pub async fn sync_binding(&self, device: DeviceId, binding: &Binding) -> SyncOutcome {
        let snapshot = match with_timeout(self.call_timeout, binding.lock.refresh()).await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                self.log_failure(device, binding, &e);
                return SyncOutcome::Failed(e);
            }
        };

        self.host
            .update_device_states(device, state_updates(&snapshot));
        debug!(
            device = %device,
            locked = snapshot.is_locked,
            battery = snapshot.battery_level,
            "Device states updated"
        );

        // Fires on every sync while jammed, not only on the transition.
        let triggers_fired = if snapshot.is_jammed {
            let event = JamEvent::new(device, snapshot.name.clone());
            self.triggers.fire_jam(&event, self.host.as_ref())
        } else {
            0
        };

        SyncOutcome::Synced {
            snapshot,
            triggers_fired,
        }
    }

    /// Sync every bound device in turn.
    pub async fn sync_all(&self) -> CycleReport {
        let started = Instant::now();
        let mut report = CycleReport::default();

        for device in self.bindings.bound_devices().await {
            // Re-check each device so one stopped mid-cycle is skipped.
            let Some(binding) = self.bindings.get(device).await else {
                report.skipped += 1;
                continue;
            };

            match self.sync_binding(device, &binding).await {
                SyncOutcome::Synced { triggers_fired, .. } => {
                    report.synced += 1;
                    report.jam_triggers_fired += triggers_fired;
                }
                SyncOutcome::Failed(_) => report.failed += 1,
            }
        }

        report.elapsed = started.elapsed();
        report
    }

    fn log_failure(&self, device: DeviceId, binding: &Binding, e: &VendorError) {
        match e {
            VendorError::Auth { .. } => {
                error!(device = %device, address = %binding.address, error = %e, "Authentication failed during refresh");
            }
            VendorError::Unknown { .. } => {
                error!(device = %device, address = %binding.address, error = %e, "Unexpected error during refresh");
            }
            VendorError::Transport { .. } | VendorError::Timeout { .. } => {
                warn!(device = %device, address = %binding.address, error = %e, "Refresh failed");
            }
        }
    }
}
