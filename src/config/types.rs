//! Configuration Types

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::time::Duration;

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub collector: CollectorConfig,
    pub logging: LoggingConfig,
}

/// HTTP endpoint configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    pub metrics_path: String,
    #[serde(with = "humantime_serde")]
    pub shutdown_timeout: Duration,
}

/// Status command configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CollectorConfig {
    /// Program and arguments, e.g. `["sudo", "wg", "show"]`
    pub command: Vec<String>,
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub log_level: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 9586)),
            metrics_path: "/metrics".to_string(),
            shutdown_timeout: Duration::from_secs(10),
        }
    }
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            command: vec!["wg".to_string(), "show".to_string()],
            timeout: Duration::from_secs(5),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}
