//! Lock synchronization engine for lockbridge.
//!
//! Keeps host devices mirroring the locks on a vendor account:
//!
//! - [`directory`]: locks discovered on the account
//! - [`bindings`]: which started device mirrors which lock
//! - [`schedule`]: the periodic refresh loop and its shared deadline
//! - [`synchronizer`]: refresh one lock and write its state to the host
//! - [`dispatcher`]: send lock/unlock commands for device actions
//! - [`triggers`]: jam triggers the host has enabled
//! - [`bridge`]: the facade the host talks to
//!
//! The host itself is abstracted behind [`host::HostPlatform`].

pub mod bindings;
pub mod bridge;
pub mod directory;
pub mod dispatcher;
pub mod error;
pub mod host;
pub mod logging;
pub mod schedule;
pub mod synchronizer;
pub mod triggers;

pub use bridge::{Bridge, BridgeBuilder};
pub use dispatcher::{DeviceAction, DispatchOutcome};
pub use error::{BridgeError, BridgeResult};
pub use host::{HostPlatform, InMemoryHost, LocalDevice};
pub use synchronizer::{CycleReport, SyncOutcome};
pub use triggers::{DeviceFilter, JamEvent, TriggerId, TriggerKind};
