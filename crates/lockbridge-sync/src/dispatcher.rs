//! Command dispatch.
//!
//! Maps host device actions onto remote lock commands. After a command is
//! sent the next refresh is pulled forward so the host sees the lock's new
//! state once it has had time to actuate.

use crate::bindings::BindingTable;
use crate::host::LocalDevice;
use crate::schedule::ScheduleState;
use lockbridge_core::{Error, LockIntent, Result};
use lockbridge_vendor::timeout::with_timeout;
use lockbridge_vendor::{RemoteLock, VendorError};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

/// Action the host sends to a device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceAction {
    TurnOn,
    TurnOff,
    Toggle,
    RequestStatus,
    /// Any action this bridge does not implement.
    Unsupported(String),
}

impl DeviceAction {
    /// Parse the host's action name.
    pub fn from_name(name: &str) -> Self {
        match name {
            "turnOn" => Self::TurnOn,
            "turnOff" => Self::TurnOff,
            "toggle" => Self::Toggle,
            "requestStatus" => Self::RequestStatus,
            other => Self::Unsupported(other.to_string()),
        }
    }

    /// The lock intent this action maps to, given the mirrored locked state.
    ///
    /// `RequestStatus` and unsupported actions have no intent.
    pub fn intent(&self, is_locked: bool) -> Option<LockIntent> {
        match self {
            Self::TurnOn => Some(LockIntent::Lock),
            Self::TurnOff => Some(LockIntent::Unlock),
            Self::Toggle => Some(LockIntent::toggle_from(is_locked)),
            Self::RequestStatus | Self::Unsupported(_) => None,
        }
    }
}

impl fmt::Display for DeviceAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TurnOn => write!(f, "turnOn"),
            Self::TurnOff => write!(f, "turnOff"),
            Self::Toggle => write!(f, "toggle"),
            Self::RequestStatus => write!(f, "requestStatus"),
            Self::Unsupported(name) => write!(f, "{name}"),
        }
    }
}

/// Result of a dispatched action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// The command reached the vendor; the next refresh is due at the
    /// settle delay.
    Sent(LockIntent),
    /// A status request re-synced the device; nothing was sent.
    StatusRefreshed,
    /// The action was refused with a usage warning; nothing was sent.
    Ignored { reason: String },
    /// The vendor rejected the command; the schedule was left alone.
    Failed(VendorError),
}

/// Sends lock and unlock commands for bound devices.
pub struct CommandDispatcher {
    bindings: Arc<BindingTable>,
    schedule: Arc<ScheduleState>,
    settle_delay: Duration,
    call_timeout: Duration,
}

impl CommandDispatcher {
    pub fn new(
        bindings: Arc<BindingTable>,
        schedule: Arc<ScheduleState>,
        settle_delay: Duration,
        call_timeout: Duration,
    ) -> Self {
        Self {
            bindings,
            schedule,
            settle_delay,
            call_timeout,
        }
    }

    /// Send `intent` to the device's lock.
    ///
    /// A device that cannot lock is refused with a usage warning before its
    /// binding is checked. A lock-capable device that is not bound is a
    /// precondition violation.
    pub async fn dispatch(&self, device: &LocalDevice, intent: LockIntent) -> Result<DispatchOutcome> {
        if !device.kind.is_lock_capable() {
            return Ok(self.ignore(
                device,
                format!("device type {} does not support lock commands", device.kind),
            ));
        }

        let Some(binding) = self.bindings.get(device.id).await else {
            error!(device = %device, %intent, "Command sent to device while not bound");
            return Err(Error::precondition(format!(
                "command sent to device {} while not bound",
                device.id
            )));
        };

        info!(device = %device, %intent, "Sending lock command");
        match with_timeout(self.call_timeout, binding.lock.send_intent(intent)).await {
            Ok(()) => {
                // No refresh now; the lock needs time to actuate.
                self.schedule.pull_forward(self.settle_delay);
                Ok(DispatchOutcome::Sent(intent))
            }
            Err(e) => {
                error!(device = %device, %intent, error = %e, "Lock command failed");
                Ok(DispatchOutcome::Failed(e))
            }
        }
    }

    /// Dispatch a host action that maps onto a lock intent.
    ///
    /// `Toggle` reads the locked state mirrored by the last sync.
    /// `RequestStatus` is handled by the synchronizer and is ignored here.
    pub async fn dispatch_action(
        &self,
        device: &LocalDevice,
        action: &DeviceAction,
    ) -> Result<DispatchOutcome> {
        let is_locked = match action {
            DeviceAction::Toggle => match self.bindings.get(device.id).await {
                Some(binding) => binding.lock.snapshot().is_locked,
                None => false,
            },
            _ => false,
        };

        match action.intent(is_locked) {
            Some(intent) => self.dispatch(device, intent).await,
            None => Ok(self.ignore(device, format!("unsupported action {action}"))),
        }
    }

    fn ignore(&self, device: &LocalDevice, reason: String) -> DispatchOutcome {
        warn!(device = %device, "Ignoring command: {reason}");
        DispatchOutcome::Ignored { reason }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::LockDirectory;
    use lockbridge_core::{DeviceId, DeviceKind, LockAddress, LockSnapshot};
    use lockbridge_vendor::mock::{MockFailure, MockLockHandle, MockLockService};
    use rstest::rstest;
    use tokio::time::Instant;

    const TIMEOUT: Duration = Duration::from_secs(30);
    const SETTLE: Duration = Duration::from_secs(10);
    const INTERVAL: Duration = Duration::from_secs(15 * 60);

    struct Fixture {
        dispatcher: CommandDispatcher,
        schedule: Arc<ScheduleState>,
        lock: MockLockHandle,
        device: LocalDevice,
    }

    fn snapshot(locked: bool) -> LockSnapshot {
        LockSnapshot {
            address: LockAddress::new("AA:BB").unwrap(),
            name: "Front Door".to_string(),
            model_name: "X".to_string(),
            is_connected: true,
            is_locked: locked,
            is_jammed: false,
            battery_level: 80,
            firmware_version: "1.0".to_string(),
            beeper_enabled: false,
            auto_lock_time: 0,
            lock_and_leave_enabled: false,
        }
    }

    async fn fixture(locked: bool) -> Fixture {
        let (service, handle) = MockLockService::new();
        let lock = handle.add_lock(snapshot(locked));

        let directory = LockDirectory::new();
        directory.discover(&service.into(), TIMEOUT).await.unwrap();

        let device = LocalDevice::lock(DeviceId::new(42), "Front Door", LockAddress::new("AA:BB").unwrap());
        let bindings = Arc::new(BindingTable::new());
        bindings.bind(&device, &directory).await.unwrap();

        let schedule = Arc::new(ScheduleState::new(INTERVAL));
        schedule.begin_cycle();
        schedule.end_cycle();

        Fixture {
            dispatcher: CommandDispatcher::new(bindings, schedule.clone(), SETTLE, TIMEOUT),
            schedule,
            lock,
            device,
        }
    }

    #[rstest]
    #[case::turn_on("turnOn", DeviceAction::TurnOn)]
    #[case::turn_off("turnOff", DeviceAction::TurnOff)]
    #[case::toggle("toggle", DeviceAction::Toggle)]
    #[case::status("requestStatus", DeviceAction::RequestStatus)]
    #[case::beep("beep", DeviceAction::Unsupported("beep".to_string()))]
    fn test_action_from_name(#[case] name: &str, #[case] expected: DeviceAction) {
        assert_eq!(DeviceAction::from_name(name), expected);
        assert_eq!(expected.to_string(), name);
    }

    #[rstest]
    #[case(DeviceAction::TurnOn, true, Some(LockIntent::Lock))]
    #[case(DeviceAction::TurnOff, true, Some(LockIntent::Unlock))]
    #[case(DeviceAction::Toggle, true, Some(LockIntent::Unlock))]
    #[case(DeviceAction::Toggle, false, Some(LockIntent::Lock))]
    #[case(DeviceAction::RequestStatus, false, None)]
    fn test_action_intent(
        #[case] action: DeviceAction,
        #[case] is_locked: bool,
        #[case] expected: Option<LockIntent>,
    ) {
        assert_eq!(action.intent(is_locked), expected);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unlock_sends_once_and_pulls_forward() {
        let f = fixture(true).await;

        let outcome = f.dispatcher.dispatch(&f.device, LockIntent::Unlock).await.unwrap();

        assert_eq!(outcome, DispatchOutcome::Sent(LockIntent::Unlock));
        assert_eq!(f.lock.unlock_calls(), 1);
        assert_eq!(f.lock.lock_calls(), 0);
        assert_eq!(f.schedule.next_refresh_deadline(), Instant::now() + SETTLE);
    }

    #[tokio::test(start_paused = true)]
    async fn test_non_lock_device_is_ignored() {
        let f = fixture(true).await;
        let before = f.schedule.next_refresh_deadline();
        let mut device = f.device.clone();
        device.kind = DeviceKind::Other("relay".to_string());

        let outcome = f.dispatcher.dispatch(&device, LockIntent::Lock).await.unwrap();

        assert!(matches!(outcome, DispatchOutcome::Ignored { .. }));
        assert_eq!(f.lock.lock_calls(), 0);
        assert_eq!(f.schedule.next_refresh_deadline(), before);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unsupported_action_is_ignored() {
        let f = fixture(true).await;
        let before = f.schedule.next_refresh_deadline();

        let outcome = f
            .dispatcher
            .dispatch_action(&f.device, &DeviceAction::Unsupported("beep".to_string()))
            .await
            .unwrap();

        assert!(matches!(outcome, DispatchOutcome::Ignored { .. }));
        assert_eq!(f.lock.lock_calls() + f.lock.unlock_calls(), 0);
        assert_eq!(f.schedule.next_refresh_deadline(), before);
    }

    #[tokio::test(start_paused = true)]
    async fn test_toggle_uses_mirrored_state() {
        let f = fixture(false).await;

        let outcome = f
            .dispatcher
            .dispatch_action(&f.device, &DeviceAction::Toggle)
            .await
            .unwrap();

        assert_eq!(outcome, DispatchOutcome::Sent(LockIntent::Lock));
        assert_eq!(f.lock.lock_calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_vendor_failure_leaves_schedule() {
        let f = fixture(true).await;
        let before = f.schedule.next_refresh_deadline();
        f.lock.fail_commands(Some(MockFailure::Transport));

        let outcome = f.dispatcher.dispatch(&f.device, LockIntent::Lock).await.unwrap();

        assert!(matches!(outcome, DispatchOutcome::Failed(_)));
        assert_eq!(f.lock.lock_calls(), 1);
        assert_eq!(f.schedule.next_refresh_deadline(), before);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unbound_lock_device_is_precondition_violation() {
        let f = fixture(true).await;
        let stranger = LocalDevice::lock(DeviceId::new(7), "Gate", LockAddress::new("AA:BB").unwrap());

        let err = f.dispatcher.dispatch(&stranger, LockIntent::Lock).await.unwrap_err();

        assert!(err.is_programming_error());
    }
}
