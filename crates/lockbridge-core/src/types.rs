use crate::{Result, constants::LOCK_DEVICE_TYPE_ID, error::Error};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Host-assigned identifier of a local device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DeviceId(u64);

impl DeviceId {
    #[must_use]
    pub const fn new(id: u64) -> Self {
        DeviceId(id)
    }

    #[must_use]
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for DeviceId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        s.trim()
            .parse()
            .map(DeviceId)
            .map_err(|_| Error::InvalidDeviceId(s.to_string()))
    }
}

/// Stable identifier of a remote lock (the vendor reports a MAC address).
///
/// Addresses are normalized (trimmed, uppercased) so that the value typed
/// into a device's configuration matches the one reported by discovery.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct LockAddress(String);

impl LockAddress {
    /// Create a new lock address with normalization.
    ///
    /// # Errors
    /// Returns `Error::InvalidAddress` if the address is empty or contains
    /// whitespace or non-ASCII characters.
    pub fn new(address: &str) -> Result<Self> {
        let address = address.trim().to_uppercase();

        if address.is_empty() {
            return Err(Error::InvalidAddress("address must not be empty".to_string()));
        }

        if !address.is_ascii() || address.chars().any(char::is_whitespace) {
            return Err(Error::InvalidAddress(address));
        }

        Ok(LockAddress(address))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LockAddress {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for LockAddress {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        LockAddress::new(s)
    }
}

impl TryFrom<String> for LockAddress {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        LockAddress::new(&value)
    }
}

impl From<LockAddress> for String {
    fn from(value: LockAddress) -> Self {
        value.0
    }
}

/// Point-in-time view of everything the vendor reports about a lock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockSnapshot {
    pub address: LockAddress,
    pub name: String,
    pub model_name: String,
    pub is_connected: bool,
    pub is_locked: bool,
    pub is_jammed: bool,
    /// Battery charge, 0-100.
    pub battery_level: u8,
    pub firmware_version: String,
    pub beeper_enabled: bool,
    /// Seconds before the lock re-locks itself; 0 disables auto-lock.
    pub auto_lock_time: u32,
    pub lock_and_leave_enabled: bool,
}

impl LockSnapshot {
    /// Label shown in the host's lock picker: `"{name} ({model})"`.
    #[must_use]
    pub fn display_label(&self) -> String {
        format!("{} ({})", self.name, self.model_name)
    }

    /// Battery level formatted for display, e.g. `"87%"`.
    #[must_use]
    pub fn battery_display(&self) -> String {
        format!("{}%", self.battery_level)
    }
}

/// What the user asked a lock to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LockIntent {
    Lock,
    Unlock,
}

impl LockIntent {
    /// Intent that reverses the given locked state.
    #[inline]
    #[must_use]
    pub fn toggle_from(is_locked: bool) -> Self {
        if is_locked {
            LockIntent::Unlock
        } else {
            LockIntent::Lock
        }
    }
}

impl fmt::Display for LockIntent {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            LockIntent::Lock => write!(f, "Lock"),
            LockIntent::Unlock => write!(f, "Unlock"),
        }
    }
}

/// Host device type, reduced to the single capability the bridge cares about.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceKind {
    /// A lock device that accepts lock/unlock commands.
    Lock,
    /// Any other host device type, kept by its type id for log messages.
    Other(String),
}

impl DeviceKind {
    /// Map a host device type id onto a kind.
    pub fn from_type_id(type_id: &str) -> Self {
        if type_id == LOCK_DEVICE_TYPE_ID {
            DeviceKind::Lock
        } else {
            DeviceKind::Other(type_id.to_string())
        }
    }

    #[inline]
    #[must_use]
    pub fn is_lock_capable(&self) -> bool {
        matches!(self, DeviceKind::Lock)
    }
}

impl fmt::Display for DeviceKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            DeviceKind::Lock => write!(f, "{LOCK_DEVICE_TYPE_ID}"),
            DeviceKind::Other(type_id) => write!(f, "{type_id}"),
        }
    }
}

/// Vendor account credentials.
///
/// The password is never printed by `Debug`.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}
