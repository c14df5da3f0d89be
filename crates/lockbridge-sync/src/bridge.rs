//! Bridge facade.
//!
//! [`Bridge`] owns every component and exposes the entry points the host
//! calls: startup and shutdown, device start/stop, device actions, trigger
//! start/stop and configuration changes.
//!
//! # Examples
//!
//! ```no_run
//! use lockbridge_core::BridgeConfig;
//! use lockbridge_sync::bridge::Bridge;
//! use lockbridge_sync::host::InMemoryHost;
//! use lockbridge_vendor::mock::MockLockService;
//! use std::sync::Arc;
//!
//! # async fn run() -> Result<(), lockbridge_sync::BridgeError> {
//! let config = BridgeConfig {
//!     username: "me@example.com".to_string(),
//!     password: "secret".to_string(),
//!     ..Default::default()
//! };
//! let (service, _handle) = MockLockService::new();
//! let bridge = Bridge::builder(config, service.into(), Arc::new(InMemoryHost::new())).build()?;
//!
//! bridge.startup().await?;
//! // ... host drives devices ...
//! bridge.shutdown().await;
//! # Ok(())
//! # }
//! ```

use crate::bindings::{self, BindingTable};
use crate::directory::LockDirectory;
use crate::dispatcher::{CommandDispatcher, DeviceAction, DispatchOutcome};
use crate::error::BridgeResult;
use crate::host::{HostPlatform, LocalDevice};
use crate::logging::LogHandle;
use crate::schedule::{RefreshScheduler, ScheduleState, ScheduleStatus, SchedulerHandle};
use crate::synchronizer::{LockSynchronizer, SyncOutcome};
use crate::triggers::{DeviceFilter, TriggerId, TriggerKind, TriggerRegistry};
use lockbridge_core::constants::{POST_ACTION_SETTLE_SECS, REMOTE_CALL_TIMEOUT_SECS, SCHEDULER_TICK_SECS};
use lockbridge_core::{BridgeConfig, ConfigDelta, DeviceId, Error, LockAddress, LockIntent};
use lockbridge_vendor::timeout::with_timeout;
use lockbridge_vendor::{AnyLockService, LockService};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

/// Builder for [`Bridge`].
pub struct BridgeBuilder {
    config: BridgeConfig,
    service: AnyLockService,
    host: Arc<dyn HostPlatform>,
    log_handle: Option<LogHandle>,
    tick: Duration,
    settle_delay: Duration,
    call_timeout: Duration,
}

impl BridgeBuilder {
    /// Attach a handle so configuration changes can adjust the log level.
    pub fn log_handle(mut self, handle: LogHandle) -> Self {
        self.log_handle = Some(handle);
        self
    }

    pub fn tick(mut self, tick: Duration) -> Self {
        self.tick = tick;
        self
    }

    /// Delay between a dispatched command and the refresh that follows it.
    pub fn settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay = delay;
        self
    }

    pub fn call_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout = timeout;
        self
    }

    /// Validate the configuration and assemble the bridge.
    pub fn build(self) -> BridgeResult<Bridge> {
        self.config.validate().map_err(Error::InvalidConfig)?;

        let directory = Arc::new(LockDirectory::new());
        let bindings = Arc::new(BindingTable::new());
        let triggers = Arc::new(TriggerRegistry::new());
        let schedule = Arc::new(ScheduleState::new(self.config.update_interval()));
        let synchronizer = Arc::new(LockSynchronizer::new(
            bindings.clone(),
            self.host,
            triggers.clone(),
            self.call_timeout,
        ));
        let dispatcher = CommandDispatcher::new(
            bindings.clone(),
            schedule.clone(),
            self.settle_delay,
            self.call_timeout,
        );

        Ok(Bridge {
            config: parking_lot::RwLock::new(self.config),
            service: self.service,
            directory,
            bindings,
            triggers,
            schedule,
            synchronizer,
            dispatcher,
            log_handle: self.log_handle,
            tick: self.tick,
            call_timeout: self.call_timeout,
            scheduler: Mutex::new(None),
        })
    }
}

/// Bridge between the host and a lock vendor account.
pub struct Bridge {
    config: parking_lot::RwLock<BridgeConfig>,
    service: AnyLockService,
    directory: Arc<LockDirectory>,
    bindings: Arc<BindingTable>,
    triggers: Arc<TriggerRegistry>,
    schedule: Arc<ScheduleState>,
    synchronizer: Arc<LockSynchronizer>,
    dispatcher: CommandDispatcher,
    log_handle: Option<LogHandle>,
    tick: Duration,
    call_timeout: Duration,
    scheduler: Mutex<Option<SchedulerHandle>>,
}

impl Bridge {
    pub fn builder(
        config: BridgeConfig,
        service: AnyLockService,
        host: Arc<dyn HostPlatform>,
    ) -> BridgeBuilder {
        BridgeBuilder {
            config,
            service,
            host,
            log_handle: None,
            tick: Duration::from_secs(SCHEDULER_TICK_SECS),
            settle_delay: Duration::from_secs(POST_ACTION_SETTLE_SECS),
            call_timeout: Duration::from_secs(REMOTE_CALL_TIMEOUT_SECS),
        }
    }

    /// Authenticate, discover locks and start the refresh loop.
    ///
    /// Any failure here is fatal to the bridge. Calling it again while the
    /// loop runs only rediscovers.
    pub async fn startup(&self) -> BridgeResult<usize> {
        let count = self.discover().await?;

        let mut scheduler = self.scheduler.lock().await;
        if scheduler.is_none() {
            let handle = RefreshScheduler::new(self.schedule.clone(), self.synchronizer.clone())
                .with_tick(self.tick)
                .spawn(CancellationToken::new());
            *scheduler = Some(handle);
        }

        Ok(count)
    }

    async fn discover(&self) -> BridgeResult<usize> {
        let credentials = self.config.read().credentials();
        with_timeout(self.call_timeout, self.service.authenticate(&credentials)).await?;
        Ok(self.directory.discover(&self.service, self.call_timeout).await?)
    }

    /// Stop the refresh loop, letting an in-flight cycle finish.
    pub async fn shutdown(&self) {
        if let Some(handle) = self.scheduler.lock().await.take() {
            handle.shutdown().await;
        }
        info!("Bridge stopped");
    }

    /// Bind a started device and sync it immediately.
    pub async fn device_started(&self, device: &LocalDevice) -> BridgeResult<SyncOutcome> {
        let binding = self.bindings.bind(device, &self.directory).await?;
        Ok(self.synchronizer.sync_binding(device.id, &binding).await)
    }

    pub async fn device_stopped(&self, device: DeviceId) -> BridgeResult<()> {
        Ok(self.bindings.unbind(device).await?)
    }

    /// Whether an edited device must be restarted to pick up a new lock.
    pub fn device_address_changed(&self, old: &LocalDevice, new: &LocalDevice) -> bool {
        bindings::address_changed(old, new)
    }

    /// Handle a host action on a device.
    pub async fn device_action(
        &self,
        device: &LocalDevice,
        action: DeviceAction,
    ) -> BridgeResult<DispatchOutcome> {
        if action == DeviceAction::RequestStatus {
            let outcome = self.synchronizer.sync_device(device.id).await?;
            info!(device = %device, synced = outcome.is_synced(), "Status requested");
            return Ok(match outcome {
                SyncOutcome::Synced { .. } => DispatchOutcome::StatusRefreshed,
                SyncOutcome::Failed(e) => DispatchOutcome::Failed(e),
            });
        }

        Ok(self.dispatcher.dispatch_action(device, &action).await?)
    }

    /// Send a lock intent directly.
    pub async fn dispatch(
        &self,
        device: &LocalDevice,
        intent: LockIntent,
    ) -> BridgeResult<DispatchOutcome> {
        Ok(self.dispatcher.dispatch(device, intent).await?)
    }

    pub async fn sync_device(&self, device: DeviceId) -> BridgeResult<SyncOutcome> {
        Ok(self.synchronizer.sync_device(device).await?)
    }

    /// Locks available for device configuration.
    pub async fn lock_list(&self) -> Vec<(LockAddress, String)> {
        self.directory.list_all().await
    }

    pub fn trigger_started(&self, id: TriggerId, kind: TriggerKind, filter: DeviceFilter) {
        self.triggers.start(id, kind, filter);
    }

    pub fn trigger_stopped(&self, id: TriggerId) -> bool {
        self.triggers.stop(id)
    }

    pub fn config(&self) -> BridgeConfig {
        self.config.read().clone()
    }

    /// Apply a confirmed configuration change.
    ///
    /// The new interval takes effect at once and the next refresh is pulled
    /// to now. New credentials trigger re-authentication and rediscovery;
    /// a failure there is logged and the previous directory is kept.
    pub async fn apply_config(&self, updated: BridgeConfig) -> BridgeResult<ConfigDelta> {
        updated.validate().map_err(Error::InvalidConfig)?;

        let delta = {
            let mut config = self.config.write();
            let delta = config.delta(&updated);
            *config = updated.clone();
            delta
        };

        if delta.log_level_changed {
            match &self.log_handle {
                Some(handle) => {
                    if let Err(e) = handle.set_level(updated.log_level) {
                        warn!(error = %e, "Could not change log level");
                    }
                }
                None => warn!("Log level changed but logging is not reloadable"),
            }
        }

        if delta.credentials_changed {
            match self.discover().await {
                Ok(count) => {
                    let rebound = self.bindings.rebind_all(&self.directory).await;
                    info!(locks = count, rebound, "Rediscovered locks after credential change");
                }
                Err(e) => error!(error = %e, "Rediscovery after credential change failed"),
            }
        }

        if delta.interval_changed {
            self.schedule.set_interval(updated.update_interval());
        }
        self.schedule.pull_forward(Duration::ZERO);

        Ok(delta)
    }

    pub fn schedule_status(&self) -> ScheduleStatus {
        self.schedule.status()
    }

    pub fn schedule(&self) -> &Arc<ScheduleState> {
        &self.schedule
    }

    pub async fn is_running(&self) -> bool {
        self.scheduler
            .lock()
            .await
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }
}
