// Configuration types module
// Defines all configuration-related data structures

use serde::{Deserialize, Serialize};

/// Main configuration structure
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub performance: PerformanceConfig,
    pub delivery: DeliveryConfig,
}

/// Server configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Management API bind address
    pub api_host: String,
    pub api_port: u16,
    /// Tokio worker threads, CPU count when unset
    #[serde(default)]
    pub workers: Option<usize>,
}

/// Logging configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoggingConfig {
    /// Default filter directive, overridden by `RUST_LOG`
    pub level: String,
    pub access_log: bool,
    #[serde(default)]
    pub format: LogFormat,
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Performance configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct PerformanceConfig {
    pub keep_alive: bool,
    /// Seconds a single connection may stay open
    pub connection_timeout: u64,
    #[serde(default)]
    pub max_connections: Option<u64>,
}

/// Content delivery configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct DeliveryConfig {
    /// Root request paths resolve against; `<cwd>/Files` when unset
    #[serde(default)]
    pub content_root: Option<String>,
    /// Upper bound for open-ended and suffix range windows
    pub max_chunk_size: u64,
    /// Register files under the content root at startup
    pub scan_on_startup: bool,
}
