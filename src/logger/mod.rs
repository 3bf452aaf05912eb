//! Logger module
//!
//! Installs the `tracing` subscriber and provides the logging helpers the
//! server uses for lifecycle, access and error messages.

use hyper::{Method, StatusCode};
use std::net::SocketAddr;
use std::time::Duration;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::config::{Config, LogFormat, LoggingConfig};

/// Initialize the global subscriber
///
/// Should be called once at application startup. `RUST_LOG` takes precedence
/// over `logging.level`.
pub fn init(config: &LoggingConfig) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&config.level)?,
    };

    match config.format {
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(env_filter)
            .try_init(),
        LogFormat::Pretty => tracing_subscriber::fmt().with_env_filter(env_filter).try_init(),
    }
}

pub fn log_server_start(addr: &SocketAddr, api_addr: &SocketAddr, config: &Config) {
    info!(
        %addr,
        %api_addr,
        content_root = %config.content_root(),
        max_chunk_size = config.delivery.max_chunk_size,
        workers = ?config.server.workers,
        max_connections = ?config.performance.max_connections,
        "Content server started"
    );
}

pub fn log_shutdown(signal: &str) {
    info!(signal, "Shutdown requested");
}

pub fn log_startup_published(listeners: usize) {
    info!(listeners, "Startup message published");
}

pub fn log_access(method: &Method, path: &str, status: StatusCode, elapsed: Duration) {
    info!(
        target: "access",
        %method,
        path,
        status = status.as_u16(),
        elapsed_us = u64::try_from(elapsed.as_micros()).unwrap_or(u64::MAX),
        "request"
    );
}

pub fn log_pass_through(path: &str) {
    info!(target: "access", path, "No entity, handing to next handler");
}

pub fn log_api_request(method: &str, path: &str, status: u16) {
    info!(target: "api", method, path, status, "management request");
}

pub fn log_connection_error(err: &impl std::fmt::Display) {
    warn!(error = %err, "Failed to serve connection");
}

pub fn log_error(message: &str) {
    error!("{message}");
}

pub fn log_warning(message: &str) {
    warn!("{message}");
}
