//! Host platform contract.
//!
//! The host owns devices and triggers. The bridge only ever writes device
//! state fields and asks the host to run a trigger; both calls are
//! synchronous and must not block for long.

use crate::triggers::{JamEvent, TriggerId};
use lockbridge_core::constants::*;
use lockbridge_core::{DeviceId, DeviceKind, LockAddress, LockSnapshot};
use parking_lot::Mutex;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// A device as the host describes it when starting it or sending it an
/// action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalDevice {
    pub id: DeviceId,
    pub name: String,
    /// Address of the remote lock this device mirrors.
    pub address: LockAddress,
    pub kind: DeviceKind,
}

impl LocalDevice {
    /// Create a lock-capable device.
    pub fn lock(id: DeviceId, name: impl Into<String>, address: LockAddress) -> Self {
        Self {
            id,
            name: name.into(),
            address,
            kind: DeviceKind::Lock,
        }
    }
}

impl fmt::Display for LocalDevice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.id)
    }
}

/// Value of a single device state field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum StateValue {
    Bool(bool),
    Int(i64),
    Text(String),
}

impl StateValue {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            StateValue::Bool(value) => Some(*value),
            _ => None,
        }
    }
}

/// One state field write, optionally with a display form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceStateUpdate {
    pub key: &'static str,
    pub value: StateValue,
    /// Human-readable form shown by the host instead of the raw value.
    pub ui_value: Option<String>,
}

impl DeviceStateUpdate {
    pub fn new(key: &'static str, value: StateValue) -> Self {
        Self {
            key,
            value,
            ui_value: None,
        }
    }

    pub fn with_ui_value(mut self, ui_value: impl Into<String>) -> Self {
        self.ui_value = Some(ui_value.into());
        self
    }
}

/// Map every snapshot field onto the device state it mirrors.
///
/// `onOffState` carries the locked flag for the host's generic on/off model.
pub fn state_updates(snapshot: &LockSnapshot) -> Vec<DeviceStateUpdate> {
    vec![
        DeviceStateUpdate::new(STATE_ON_OFF, StateValue::Bool(snapshot.is_locked)),
        DeviceStateUpdate::new(STATE_IS_LOCKED, StateValue::Bool(snapshot.is_locked)),
        DeviceStateUpdate::new(STATE_IS_JAMMED, StateValue::Bool(snapshot.is_jammed)),
        DeviceStateUpdate::new(STATE_IS_CONNECTED, StateValue::Bool(snapshot.is_connected)),
        DeviceStateUpdate::new(
            STATE_BATTERY_LEVEL,
            StateValue::Int(i64::from(snapshot.battery_level)),
        )
        .with_ui_value(snapshot.battery_display()),
        DeviceStateUpdate::new(
            STATE_FIRMWARE_VERSION,
            StateValue::Text(snapshot.firmware_version.clone()),
        ),
        DeviceStateUpdate::new(STATE_BEEPER_ENABLED, StateValue::Bool(snapshot.beeper_enabled)),
        DeviceStateUpdate::new(
            STATE_AUTO_LOCK_TIME,
            StateValue::Int(i64::from(snapshot.auto_lock_time)),
        ),
        DeviceStateUpdate::new(
            STATE_LOCK_AND_LEAVE_ENABLED,
            StateValue::Bool(snapshot.lock_and_leave_enabled),
        ),
        DeviceStateUpdate::new(STATE_NAME, StateValue::Text(snapshot.name.clone())),
        DeviceStateUpdate::new(STATE_MODEL_NAME, StateValue::Text(snapshot.model_name.clone())),
    ]
}

/// Operations the bridge needs from the host platform.
pub trait HostPlatform: Send + Sync {
    /// Write a batch of state fields on one device.
    fn update_device_states(&self, device: DeviceId, updates: Vec<DeviceStateUpdate>);

    /// Run a trigger the user configured, passing the event that fired it.
    fn execute_trigger(&self, trigger: TriggerId, event: &JamEvent);
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct StoredState {
    value: StateValue,
    ui_value: Option<String>,
}

/// Host that keeps device states and fired triggers in memory.
///
/// Used by tests and by the standalone daemon.
#[derive(Debug, Default)]
pub struct InMemoryHost {
    states: Mutex<HashMap<DeviceId, BTreeMap<&'static str, StoredState>>>,
    update_batches: Mutex<HashMap<DeviceId, usize>>,
    fired: Mutex<Vec<(TriggerId, JamEvent)>>,
}

impl InMemoryHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self, device: DeviceId, key: &str) -> Option<StateValue> {
        self.states
            .lock()
            .get(&device)
            .and_then(|states| states.get(key))
            .map(|stored| stored.value.clone())
    }

    pub fn bool_state(&self, device: DeviceId, key: &str) -> Option<bool> {
        self.state(device, key).and_then(|value| value.as_bool())
    }

    pub fn ui_value(&self, device: DeviceId, key: &str) -> Option<String> {
        self.states
            .lock()
            .get(&device)
            .and_then(|states| states.get(key))
            .and_then(|stored| stored.ui_value.clone())
    }

    /// Every state of a device, keyed by field name.
    pub fn device_states(&self, device: DeviceId) -> BTreeMap<&'static str, StateValue> {
        self.states
            .lock()
            .get(&device)
            .map(|states| {
                states
                    .iter()
                    .map(|(key, stored)| (*key, stored.value.clone()))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Number of `update_device_states` calls received for a device.
    pub fn update_count(&self, device: DeviceId) -> usize {
        self.update_batches
            .lock()
            .get(&device)
            .copied()
            .unwrap_or_default()
    }

    pub fn fired_triggers(&self) -> Vec<(TriggerId, JamEvent)> {
        self.fired.lock().clone()
    }
}

impl HostPlatform for InMemoryHost {
    fn update_device_states(&self, device: DeviceId, updates: Vec<DeviceStateUpdate>) {
        let mut states = self.states.lock();
        let device_states = states.entry(device).or_default();
        for update in updates {
            device_states.insert(
                update.key,
                StoredState {
                    value: update.value,
                    ui_value: update.ui_value,
                },
            );
        }
        drop(states);

        *self.update_batches.lock().entry(device).or_default() += 1;
    }

    fn execute_trigger(&self, trigger: TriggerId, event: &JamEvent) {
        self.fired.lock().push((trigger, event.clone()));
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
            is_locked: false,
            is_jammed: true,
            battery_level: 64,
            firmware_version: "10.00".to_string(),
            beeper_enabled: true,
            auto_lock_time: 180,
            lock_and_leave_enabled: false,
        }
    }

    #[test]
    fn test_state_updates_mirror_every_field() {
        let updates = state_updates(&snapshot());
        let keys: Vec<_> = updates.iter().map(|update| update.key).collect();

        assert_eq!(
            keys,
            vec![
                STATE_ON_OFF,
                STATE_IS_LOCKED,
                STATE_IS_JAMMED,
                STATE_IS_CONNECTED,
                STATE_BATTERY_LEVEL,
                STATE_FIRMWARE_VERSION,
                STATE_BEEPER_ENABLED,
                STATE_AUTO_LOCK_TIME,
                STATE_LOCK_AND_LEAVE_ENABLED,
                STATE_NAME,
                STATE_MODEL_NAME,
            ]
        );
    }

    #[test]
    fn test_on_off_follows_locked_flag() {
        let updates = state_updates(&snapshot());
        assert_eq!(updates[0].value, StateValue::Bool(false));
    }

    #[test]
    fn test_battery_has_display_form() {
        let updates = state_updates(&snapshot());
        let battery = updates
            .iter()
            .find(|update| update.key == STATE_BATTERY_LEVEL)
            .unwrap();

        assert_eq!(battery.value, StateValue::Int(64));
        assert_eq!(battery.ui_value.as_deref(), Some("64%"));
    }

    #[test]
    fn test_in_memory_host_records_states() {
        let host = InMemoryHost::new();
        let device = DeviceId::new(42);

        host.update_device_states(device, state_updates(&snapshot()));

        assert_eq!(host.bool_state(device, STATE_ON_OFF), Some(false));
        assert_eq!(host.ui_value(device, STATE_BATTERY_LEVEL).as_deref(), Some("64%"));
        assert_eq!(
            host.state(device, STATE_MODEL_NAME),
            Some(StateValue::Text("X".to_string()))
        );
        assert_eq!(host.device_states(device).len(), 11);
        assert_eq!(host.update_count(device), 1);
        assert_eq!(host.update_count(DeviceId::new(7)), 0);
    }
}
