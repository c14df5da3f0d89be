//! Jam trigger registry.
//!
//! The host tells the bridge which triggers the user has enabled; when a
//! synced lock reports a jam, every matching trigger is executed.

use crate::host::HostPlatform;
use chrono::{DateTime, Utc};
use lockbridge_core::constants::JAM_TRIGGER_TYPE_ID;
use lockbridge_core::DeviceId;
use parking_lot::RwLock;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use tracing::{debug, warn};

/// Host-assigned trigger identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct TriggerId(u64);

impl TriggerId {
    pub const fn new(id: u64) -> Self {
        Self(id)
    }
}

impl fmt::Display for TriggerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Event type a trigger listens for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TriggerKind {
    LockJammed,
    /// A trigger type this bridge does not fire.
    Other(String),
}

impl TriggerKind {
    pub fn from_type_id(type_id: &str) -> Self {
        if type_id == JAM_TRIGGER_TYPE_ID {
            Self::LockJammed
        } else {
            Self::Other(type_id.to_string())
        }
    }
}

/// Which devices a trigger applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeviceFilter {
    #[default]
    AnyDevice,
    Device(DeviceId),
}

impl DeviceFilter {
    pub fn matches(&self, device: DeviceId) -> bool {
        match self {
            Self::AnyDevice => true,
            Self::Device(id) => *id == device,
        }
    }
}

/// Payload handed to the host when a jam trigger fires.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JamEvent {
    pub jammed: bool,
    pub lock_id: DeviceId,
    pub lock_name: String,
    pub detected_at: DateTime<Utc>,
}

impl JamEvent {
    pub fn new(lock_id: DeviceId, lock_name: impl Into<String>) -> Self {
        Self {
            jammed: true,
            lock_id,
            lock_name: lock_name.into(),
            detected_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone)]
struct RegisteredTrigger {
    kind: TriggerKind,
    filter: DeviceFilter,
}

/// Triggers currently enabled on the host.
#[derive(Debug, Default)]
pub struct TriggerRegistry {
    triggers: RwLock<BTreeMap<TriggerId, RegisteredTrigger>>,
}

impl TriggerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) a trigger.
    pub fn start(&self, id: TriggerId, kind: TriggerKind, filter: DeviceFilter) {
        debug!(trigger = %id, ?kind, ?filter, "Trigger started");
        self.triggers
            .write()
            .insert(id, RegisteredTrigger { kind, filter });
    }

    /// Remove a trigger. Returns `false` if it was not registered.
    pub fn stop(&self, id: TriggerId) -> bool {
        debug!(trigger = %id, "Trigger stopped");
        self.triggers.write().remove(&id).is_some()
    }

    pub fn len(&self) -> usize {
        self.triggers.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.triggers.read().is_empty()
    }

    /// Execute every jam trigger matching the event's device.
    ///
    /// Returns the number of triggers executed.
    pub fn fire_jam(&self, event: &JamEvent, host: &dyn HostPlatform) -> usize {
        warn!(
            device = %event.lock_id,
            lock = %event.lock_name,
            "Lock reports a jam"
        );

        let matching: Vec<TriggerId> = self
            .triggers
            .read()
            .iter()
            .filter(|(_, trigger)| {
                trigger.kind == TriggerKind::LockJammed && trigger.filter.matches(event.lock_id)
            })
            .map(|(id, _)| *id)
            .collect();

        for id in &matching {
            host.execute_trigger(*id, event);
        }

        matching.len()
    }
}
