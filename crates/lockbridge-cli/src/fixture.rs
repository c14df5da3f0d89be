//! Account fixture for running the bridge without a vendor connection.
//!
//! ```json
//! {
//!   "locks": [{ "address": "AA:BB", "name": "Front Door", "modelName": "X", ... }],
//!   "devices": [{ "id": 42, "name": "Front Door", "address": "AA:BB" }],
//!   "triggers": [{ "id": 1, "type": "lockJammed", "device": 42 }]
//! }
//! ```

use anyhow::Context;
use lockbridge_core::constants::LOCK_DEVICE_TYPE_ID;
use lockbridge_core::{DeviceId, DeviceKind, LockAddress, LockSnapshot};
use lockbridge_sync::{DeviceFilter, LocalDevice, TriggerId, TriggerKind};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Fixture {
    #[serde(default)]
    pub locks: Vec<FixtureLock>,
    #[serde(default)]
    pub devices: Vec<FixtureDevice>,
    #[serde(default)]
    pub triggers: Vec<FixtureTrigger>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FixtureLock {
    pub address: LockAddress,
    pub name: String,
    pub model_name: String,
    #[serde(default = "yes")]
    pub is_connected: bool,
    #[serde(default = "yes")]
    pub is_locked: bool,
    #[serde(default)]
    pub is_jammed: bool,
    #[serde(default = "full_battery")]
    pub battery_level: u8,
    #[serde(default)]
    pub firmware_version: String,
    #[serde(default)]
    pub beeper_enabled: bool,
    #[serde(default)]
    pub auto_lock_time: u32,
    #[serde(default)]
    pub lock_and_leave_enabled: bool,
}

#[derive(Debug, Deserialize)]
pub struct FixtureDevice {
    pub id: DeviceId,
    pub name: String,
    pub address: LockAddress,
    #[serde(rename = "type", default = "lock_type")]
    pub type_id: String,
}

#[derive(Debug, Deserialize)]
pub struct FixtureTrigger {
    pub id: u64,
    #[serde(rename = "type")]
    pub type_id: String,
    /// Restrict the trigger to one device; any device when absent.
    pub device: Option<DeviceId>,
}

fn yes() -> bool {
    true
}

fn full_battery() -> u8 {
    100
}

fn lock_type() -> String {
    LOCK_DEVICE_TYPE_ID.to_string()
}

impl Fixture {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading fixture {}", path.display()))?;
        serde_json::from_str(&raw).with_context(|| format!("parsing fixture {}", path.display()))
    }
}

impl From<FixtureLock> for LockSnapshot {
    fn from(lock: FixtureLock) -> Self {
        LockSnapshot {
            address: lock.address,
            name: lock.name,
            model_name: lock.model_name,
            is_connected: lock.is_connected,
            is_locked: lock.is_locked,
            is_jammed: lock.is_jammed,
            battery_level: lock.battery_level.min(100),
            firmware_version: lock.firmware_version,
            beeper_enabled: lock.beeper_enabled,
            auto_lock_time: lock.auto_lock_time,
            lock_and_leave_enabled: lock.lock_and_leave_enabled,
        }
    }
}

impl From<FixtureDevice> for LocalDevice {
    fn from(device: FixtureDevice) -> Self {
        LocalDevice {
            id: device.id,
            name: device.name,
            address: device.address,
            kind: DeviceKind::from_type_id(&device.type_id),
        }
    }
}

impl FixtureTrigger {
    pub fn registration(&self) -> (TriggerId, TriggerKind, DeviceFilter) {
        let filter = match self.device {
            Some(device) => DeviceFilter::Device(device),
            None => DeviceFilter::AnyDevice,
        };
        (
            TriggerId::new(self.id),
            TriggerKind::from_type_id(&self.type_id),
            filter,
        )
    }
}
