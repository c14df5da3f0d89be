//! Timing limits, defaults and host-facing identifiers.
//!
//! Durations are stored as plain integers so they can be used in `const`
//! contexts and in configuration validation; convert with
//! [`std::time::Duration::from_secs`] at the call site.
//!
//! # Examples
//!
//! ```
//! use lockbridge_core::constants::*;
//! use std::time::Duration;
//!
//! let settle = Duration::from_secs(POST_ACTION_SETTLE_SECS);
//! assert_eq!(settle.as_secs(), 10);
//! assert!(SCHEDULER_TICK_SECS <= 10);
//! ```

// ============================================================================
// Refresh Scheduling
// ============================================================================

/// Smallest accepted polling interval (minutes).
pub const MIN_UPDATE_FREQUENCY_MINUTES: u32 = 3;

/// Largest accepted polling interval (minutes).
pub const MAX_UPDATE_FREQUENCY_MINUTES: u32 = 60;

/// Polling interval used by [`BridgeConfig::default`](crate::BridgeConfig).
pub const DEFAULT_UPDATE_FREQUENCY_MINUTES: u32 = 15;

/// Sleep increment of the background refresh loop (seconds).
///
/// Shutdown is observed at most this long after it is requested. Must stay
/// at or below 10 seconds.
pub const SCHEDULER_TICK_SECS: u64 = 2;

/// Delay between a lock/unlock command and the refresh that picks up its
/// result (seconds).
///
/// The vendor acknowledges commands before the bolt has moved, so polling
/// immediately would read the old state.
pub const POST_ACTION_SETTLE_SECS: u64 = 10;

/// Upper bound on any single call into the vendor service (seconds).
pub const REMOTE_CALL_TIMEOUT_SECS: u64 = 30;

// ============================================================================
// Host Device States
// ============================================================================

/// Generic on/off state of the host's relay model. `true` means locked.
pub const STATE_ON_OFF: &str = "onOffState";

pub const STATE_IS_LOCKED: &str = "is_locked";
pub const STATE_IS_JAMMED: &str = "is_jammed";
pub const STATE_IS_CONNECTED: &str = "is_connected";

/// Battery percentage; carries a `"<n>%"` display form.
pub const STATE_BATTERY_LEVEL: &str = "batteryLevel";

pub const STATE_FIRMWARE_VERSION: &str = "firmware_version";
pub const STATE_BEEPER_ENABLED: &str = "beeper_enabled";
pub const STATE_AUTO_LOCK_TIME: &str = "auto_lock_time";
pub const STATE_LOCK_AND_LEAVE_ENABLED: &str = "lock_and_leave_enabled";
pub const STATE_NAME: &str = "name";
pub const STATE_MODEL_NAME: &str = "model_name";

// ============================================================================
// Host Identifiers
// ============================================================================

/// Host device type id of lock-capable devices.
pub const LOCK_DEVICE_TYPE_ID: &str = "lock";

/// Host trigger type id fired when a lock reports a jam.
pub const JAM_TRIGGER_TYPE_ID: &str = "lockJammed";
