// Configuration module entry point
// Loads layered configuration and builds the runtime state

mod state;
mod types;

use std::net::SocketAddr;
use std::path::PathBuf;

use crate::error::ConfigError;

// Re-export public types
pub use state::AppState;
pub use types::{
    Config, DeliveryConfig, LogFormat, LoggingConfig, PerformanceConfig, ServerConfig,
};

/// Default maximum bytes served for an open-ended range
pub const DEFAULT_MAX_CHUNK_SIZE: u64 = 1_000_000;

/// Directory under the working directory used when no content root is set
const DEFAULT_CONTENT_DIR: &str = "Files";

impl Config {
    /// Load from `config.toml` (optional) and `SERVER__*` environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var("RANGESERVE_CONFIG").unwrap_or_else(|_| "config".to_string());
        Self::load_from(&path)
    }

    /// Load configuration from specified file path (without extension)
    pub fn load_from(config_path: &str) -> Result<Self, ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(config::Environment::with_prefix("SERVER").separator("__"))
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8080)?
            .set_default("server.api_host", "127.0.0.1")?
            .set_default("server.api_port", 8000)?
            .set_default("logging.level", "info")?
            .set_default("logging.access_log", true)?
            .set_default("logging.format", "pretty")?
            .set_default("performance.keep_alive", true)?
            .set_default("performance.connection_timeout", 60)?
            .set_default("delivery.max_chunk_size", DEFAULT_MAX_CHUNK_SIZE)?
            .set_default("delivery.scan_on_startup", true)?
            .build()?;

        let config: Self = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.delivery.max_chunk_size == 0 {
            return Err(ConfigError::Invalid(
                "delivery.max_chunk_size must be positive".to_string(),
            ));
        }
        self.get_socket_addr()?;
        self.get_api_socket_addr()?;
        Ok(())
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| ConfigError::Invalid(format!("Invalid address: {e}")))
    }

    pub fn get_api_socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        format!("{}:{}", self.server.api_host, self.server.api_port)
            .parse()
            .map_err(|e| ConfigError::Invalid(format!("Invalid API address: {e}")))
    }

    /// Configured content root, or `Files` under the working directory
    pub fn content_root(&self) -> String {
        if let Some(root) = &self.delivery.content_root {
            return root.clone();
        }
        std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(DEFAULT_CONTENT_DIR)
            .to_string_lossy()
            .into_owned()
    }
}
