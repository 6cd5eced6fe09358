use std::time::Duration;
use tokio::time::sleep;
use tracing::{error, info, warn};
use zenmat::{Connectivity, Result, SimulationConfig, ZenMatError};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    info!("🧘 ZenMat Connect Cycle Example");

    let mat = Connectivity::simulated(SimulationConfig::default())?;

    // Log every status transition as it happens
    let mut subscription = mat.subscribe();
    let watcher = tokio::spawn(async move {
        while let Ok(state) = subscription.changed().await {
            match &state.last_error {
                Some(message) => warn!("📡 Status: {} ({})", state.status, message),
                None => info!("📡 Status: {}", state.status),
            }
        }
    });

    // Retry until the simulated handshake succeeds
    for attempt in 1..=5 {
        info!("🔗 Connecting (attempt {})...", attempt);
        match mat.connect().await {
            Ok(()) => {
                info!("✅ Connected");
                break;
            }
            Err(e) if e.is_recoverable() => {
                warn!("❌ {}", e.user_message());
            }
            Err(e) => {
                error!("❌ Unrecoverable error: {}", e);
                return Err(e);
            }
        }
    }

    if !mat.is_connected() {
        error!("❌ Giving up after 5 attempts");
        return Err(ZenMatError::ConnectionFailed(
            zenmat::CONNECTION_FAILED_MESSAGE.to_string(),
        ));
    }

    let telemetry = mat.telemetry().await?;
    info!("📊 Mat Telemetry:");
    info!("  Signal: {}", telemetry.signal);
    info!("  Battery: {}%", telemetry.battery_percent);

    sleep(Duration::from_secs(1)).await;

    // A connect issued while a disconnect is in flight wins
    info!("🔌 Disconnecting, then changing our mind...");
    let disconnect = mat.begin_disconnect();
    sleep(Duration::from_millis(200)).await;
    let reconnect = mat.begin_connect();

    if let Err(e) = disconnect.wait().await {
        info!("↩️  Disconnect finished as: {}", e);
    }
    match reconnect.wait().await {
        Ok(()) => info!("✅ Reconnected"),
        Err(e) => warn!("❌ Reconnect failed: {}", e.user_message()),
    }

    // Cancelling a connect leaves the mat disconnected without an error
    mat.disconnect().await?;
    let pending = mat.begin_connect();
    sleep(Duration::from_millis(500)).await;
    info!("🛑 Cancelling connect...");
    pending.cancel();
    if let Err(e) = pending.wait().await {
        info!("  Connect ended: {}", e);
    }
    info!("  Final status: {}", mat.status());

    drop(mat);
    let _ = watcher.await;

    info!("🎉 Connect cycle example completed!");
    Ok(())
}
