//! Lockbridge daemon (`lockbridged`)
//!
//! Runs the bridge against a fixture-backed mock vendor account with an
//! in-memory host. Useful for exercising the refresh loop and command path
//! without a vendor connection.

mod fixture;

use anyhow::Context;
use clap::Parser;
use fixture::Fixture;
use lockbridge_core::{BridgeConfig, LogLevel};
use lockbridge_sync::logging::init_tracing;
use lockbridge_sync::{Bridge, InMemoryHost, LocalDevice};
use lockbridge_vendor::mock::MockLockService;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(name = "lockbridged", version, about = "Smart lock bridge daemon")]
struct Args {
    /// Bridge settings (JSON: username, password, updateFrequency, logLevel)
    #[arg(long, short)]
    config: PathBuf,

    /// Mock account fixture with locks, devices and triggers
    #[arg(long, short)]
    locks: PathBuf,

    /// Override the configured log level
    #[arg(long)]
    log_level: Option<LogLevel>,

    /// Print the discovered locks and exit
    #[arg(long)]
    list: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config = BridgeConfig::from_path(&args.config)
        .with_context(|| format!("loading config {}", args.config.display()))?;
    if let Some(level) = args.log_level {
        config.log_level = level;
    }

    let log_handle = init_tracing(config.log_level)?;
    tracing::info!("lockbridged v{} starting...", env!("CARGO_PKG_VERSION"));

    let fixture = Fixture::load(&args.locks)?;
    let (service, account) = MockLockService::new();
    for lock in fixture.locks {
        account.add_lock(lock.into());
    }

    let bridge = Bridge::builder(config, service.into(), Arc::new(InMemoryHost::new()))
        .log_handle(log_handle)
        .build()?;

    let count = bridge.startup().await.map_err(|e| {
        tracing::error!("Failed to start: {}", e);
        anyhow::anyhow!("{}", e)
    })?;
    tracing::info!("Discovered {} lock(s)", count);

    if args.list {
        for (address, label) in bridge.lock_list().await {
            println!("{address}\t{label}");
        }
        bridge.shutdown().await;
        return Ok(());
    }

    for trigger in &fixture.triggers {
        let (id, kind, filter) = trigger.registration();
        bridge.trigger_started(id, kind, filter);
    }

    for device in fixture.devices {
        let device = LocalDevice::from(device);
        if let Err(e) = bridge.device_started(&device).await {
            tracing::error!(device = %device, error = %e, "Device failed to start");
        }
    }

    tracing::info!("Bridge ready. Press Ctrl+C to stop.");
    shutdown_signal().await;
    tracing::info!("Shutdown signal received...");

    bridge.shutdown().await;
    let status = serde_json::to_string(&bridge.schedule_status())?;
    tracing::info!(%status, "Daemon stopped");
    Ok(())
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};
        match (signal(SignalKind::interrupt()), signal(SignalKind::terminate())) {
            (Ok(mut sigint), Ok(mut sigterm)) => {
                tokio::select! {
                    _ = sigint.recv() => {}
                    _ = sigterm.recv() => {}
                }
                return;
            }
            (Err(e), _) | (_, Err(e)) => {
                tracing::warn!("Signal handlers unavailable ({}), falling back to Ctrl+C", e);
            }
        }
    }

    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for Ctrl+C: {}", e);
    }
}
