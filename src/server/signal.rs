// Signal handling module
//
// SIGTERM and SIGINT (Ctrl+C) both request a graceful shutdown.

use crate::logger;

/// Resolves once the process has been asked to stop
#[cfg(unix)]
pub async fn shutdown_signal() {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigterm = match signal(SignalKind::terminate()) {
        Ok(s) => s,
        Err(e) => {
            logger::log_warning(&format!("Failed to register SIGTERM handler: {e}"));
            ctrl_c().await;
            return;
        }
    };

    tokio::select! {
        _ = sigterm.recv() => logger::log_shutdown("SIGTERM"),
        () = ctrl_c() => logger::log_shutdown("SIGINT"),
    }
}

/// Windows fallback - only handles Ctrl+C
#[cfg(not(unix))]
pub async fn shutdown_signal() {
    ctrl_c().await;
    logger::log_shutdown("Ctrl+C");
}

async fn ctrl_c() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        logger::log_warning(&format!("Failed to listen for Ctrl+C: {e}"));
        std::future::pending::<()>().await;
    }
}
