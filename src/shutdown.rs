use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Cancel `token` on the first interrupt or termination request.
///
/// The token never resets, so later signals are no-ops.
pub fn install(token: CancellationToken) {
    tokio::spawn(cancel_on(token, wait_for_signal()));
}

async fn cancel_on(token: CancellationToken, signal: impl Future<Output = &'static str>) {
    let signal = signal.await;
    info!(signal, "Shutdown requested");
    token.cancel();
}

#[cfg(unix)]
async fn wait_for_signal() -> &'static str {
    use tokio::signal::unix::{signal, SignalKind};

    let mut terminate = match signal(SignalKind::terminate()) {
        Ok(s) => s,
        Err(e) => {
            warn!("Failed to listen for SIGTERM: {}", e);
            return wait_for_interrupt().await;
        }
    };

    tokio::select! {
        name = wait_for_interrupt() => name,
        _ = terminate.recv() => "SIGTERM",
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() -> &'static str {
    wait_for_interrupt().await
}

async fn wait_for_interrupt() -> &'static str {
    if let Err(e) = tokio::signal::ctrl_c().await {
        // Without an interrupt hook the process can only be stopped by SIGTERM.
        warn!("Failed to listen for interrupt: {}", e);
        std::future::pending::<()>().await;
    }
    "SIGINT"
}
