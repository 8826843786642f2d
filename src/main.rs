use anyhow::{Context, Result};
use chargeguard::bus::SimulatedBus;
use chargeguard::config::Config;
use chargeguard::controller::Controller;
use chargeguard::history::HistoryLog;
use chargeguard::logging::init_logging;
use chargeguard::notify::SubscriberHub;
use chargeguard::settings::JsonSettingsStore;
use chargeguard::writer::ValidatedWriter;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    let config = match std::env::args().nth(1) {
        Some(path) => Config::from_file(&path)
            .with_context(|| format!("Failed to load configuration from {}", path))?,
        None => Config::load().context("Failed to load configuration")?,
    };
    config.validate().context("Invalid configuration")?;
    init_logging(&config.logging).context("Failed to initialise logging")?;

    info!(
        "ChargeGuard {} starting (charger at 0x{:02X})",
        env!("APP_VERSION"),
        config.bus.i2c_address
    );

    // Bench mode: simulated register file. Hardware builds pass
    // `I2cBus::from_config(peripheral, &config.bus)` to the writer instead.
    let bus = SimulatedBus::new();
    let store = JsonSettingsStore::open(&config.storage.settings_file);
    let writer = ValidatedWriter::new(Box::new(bus), Box::new(store));
    let history = HistoryLog::open(
        &config.storage.history_file,
        config.storage.history_capacity,
    );
    let hub = SubscriberHub::new();

    let (mut controller, handle) = Controller::new(&config, writer, history, hub.clone());
    let report = controller.boot().await;
    info!(
        "Boot complete: {} settings applied, {} failed",
        report.applied.len(),
        report.failed.len()
    );

    let mut notifications = hub.subscribe();
    let notify_task = tokio::spawn(async move {
        while let Some(message) = notifications.recv().await {
            info!("notify: {}", message);
        }
    });

    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl-C: {}", e);
            return;
        }
        info!("Ctrl-C received, stopping");
        if let Err(e) = handle.shutdown().await {
            error!("Failed to stop controller: {}", e);
        }
    });

    controller.run().await;
    notify_task.abort();
    info!("ChargeGuard shutdown complete");
    Ok(())
}
