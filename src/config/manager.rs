//! Configuration Manager

use super::Config;
use crate::Result;
use anyhow::{bail, Context};
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

/// Upper bound for a single status command run
const MAX_COMMAND_TIMEOUT: Duration = Duration::from_secs(300);

const VALID_LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Manages configuration loading and validation
pub struct ConfigManager;

impl ConfigManager {
    /// Load configuration from file
    pub fn load_from_file(path: &Path) -> Result<Config> {
        if path.exists() {
            tracing::info!("Loading configuration from: {}", path.display());
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;

            let config: Config = toml::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

            config
                .validate()
                .with_context(|| "Configuration validation failed")?;

            tracing::info!("Configuration loaded and validated successfully");
            Ok(config)
        } else {
            tracing::warn!("Configuration file not found at {}, using defaults", path.display());
            let config = Config::default();
            config.validate()?;
            Ok(config)
        }
    }

    /// Load configuration from environment variables
    pub fn load_from_env() -> Result<Config> {
        Self::load_from_vars(|key| std::env::var(key).ok())
    }

    /// Same as [`load_from_env`](Self::load_from_env) with an injectable lookup
    pub fn load_from_vars<F>(lookup: F) -> Result<Config>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Config::default();

        if let Some(bind_addr) = lookup("WG_EXPORTER_BIND_ADDR") {
            config.server.bind_addr = bind_addr
                .parse::<SocketAddr>()
                .with_context(|| format!("Invalid WG_EXPORTER_BIND_ADDR: {}", bind_addr))?;
        }

        if let Some(command) = lookup("WG_EXPORTER_COMMAND") {
            config.collector.command = command.split_whitespace().map(String::from).collect();
        }

        if let Some(timeout) = lookup("WG_EXPORTER_COMMAND_TIMEOUT") {
            config.collector.timeout = humantime::parse_duration(&timeout)
                .with_context(|| format!("Invalid WG_EXPORTER_COMMAND_TIMEOUT: {}", timeout))?;
        }

        if let Some(log_level) = lookup("WG_EXPORTER_LOG_LEVEL") {
            config.logging.log_level = log_level;
        }

        config.validate()?;
        Ok(config)
    }
}

impl Config {
    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        self.validate_server_config()
            .with_context(|| "Server configuration validation failed")?;

        self.validate_collector_config()
            .with_context(|| "Collector configuration validation failed")?;

        self.validate_logging_config()
            .with_context(|| "Logging configuration validation failed")?;

        Ok(())
    }

    fn validate_server_config(&self) -> Result<()> {
        let path = &self.server.metrics_path;
        if !path.starts_with('/') {
            bail!("metrics_path must start with '/'");
        }

        if path == "/health" {
            bail!("metrics_path cannot be /health, it is reserved for health checks");
        }

        if self.server.shutdown_timeout.is_zero() {
            bail!("shutdown_timeout must be greater than 0");
        }

        Ok(())
    }

    fn validate_collector_config(&self) -> Result<()> {
        match self.collector.command.first() {
            None => bail!("collector.command must not be empty"),
            Some(program) if program.trim().is_empty() => {
                bail!("collector.command has an empty program name")
            }
            Some(_) => {}
        }

        if self.collector.timeout.is_zero() {
            bail!("collector.timeout must be greater than 0");
        }

        if self.collector.timeout > MAX_COMMAND_TIMEOUT {
            bail!("collector.timeout cannot exceed 5 minutes");
        }

        Ok(())
    }

    fn validate_logging_config(&self) -> Result<()> {
        if !VALID_LOG_LEVELS.contains(&self.logging.log_level.as_str()) {
            bail!("logging.log_level must be one of: {}", VALID_LOG_LEVELS.join(", "));
        }

        Ok(())
    }

    /// Merge with CLI arguments
    pub fn merge_with_cli_args(
        &mut self,
        bind: Option<&str>,
        port: Option<u16>,
        timeout: Option<u64>,
        log_level: Option<&str>,
    ) -> Result<()> {
        if let Some(bind_str) = bind {
            let addr = bind_str
                .parse::<SocketAddr>()
                .with_context(|| format!("Invalid bind address provided: {}", bind_str))?;
            self.server.bind_addr = addr;
            tracing::info!("CLI override: bind address set to {}", addr);
        }

        if let Some(port) = port {
            self.server.bind_addr.set_port(port);
            tracing::info!("CLI override: port set to {}", port);
        }

        if let Some(timeout_secs) = timeout {
            self.collector.timeout = Duration::from_secs(timeout_secs);
            tracing::info!("CLI override: command timeout set to {}s", timeout_secs);
        }

        if let Some(level) = log_level {
            self.logging.log_level = level.to_string();
            tracing::info!("CLI override: log level set to {}", level);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.collector.command, vec!["wg", "show"]);
        assert_eq!(config.server.bind_addr.port(), 9586);
    }

    #[test]
    fn test_env_overrides() {
        let config = ConfigManager::load_from_vars(vars(&[
            ("WG_EXPORTER_BIND_ADDR", "127.0.0.1:9999"),
            ("WG_EXPORTER_COMMAND", "sudo wg show all"),
            ("WG_EXPORTER_COMMAND_TIMEOUT", "2s"),
            ("WG_EXPORTER_LOG_LEVEL", "debug"),
        ]))
        .unwrap();

        assert_eq!(config.server.bind_addr, "127.0.0.1:9999".parse::<SocketAddr>().unwrap());
        assert_eq!(config.collector.command, vec!["sudo", "wg", "show", "all"]);
        assert_eq!(config.collector.timeout, Duration::from_secs(2));
        assert_eq!(config.logging.log_level, "debug");
    }

    #[test]
    fn test_env_invalid_values() {
        assert!(ConfigManager::load_from_vars(vars(&[("WG_EXPORTER_BIND_ADDR", "nope")])).is_err());
        assert!(ConfigManager::load_from_vars(vars(&[("WG_EXPORTER_COMMAND", "   ")])).is_err());
        assert!(
            ConfigManager::load_from_vars(vars(&[("WG_EXPORTER_LOG_LEVEL", "loud")])).is_err()
        );
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let mut config = Config::default();
        config.collector.timeout = Duration::from_secs(600);
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.collector.timeout = Duration::ZERO;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.server.metrics_path = "metrics".to_string();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.server.metrics_path = "/health".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_cli_overrides() {
        let mut config = Config::default();
        config
            .merge_with_cli_args(Some("127.0.0.1:1234"), Some(4321), Some(9), Some("warn"))
            .unwrap();

        assert_eq!(config.server.bind_addr, "127.0.0.1:4321".parse::<SocketAddr>().unwrap());
        assert_eq!(config.collector.timeout, Duration::from_secs(9));
        assert_eq!(config.logging.log_level, "warn");
    }

    #[test]
    fn test_invalid_cli_bind_is_rejected() {
        let mut config = Config::default();
        let result = config.merge_with_cli_args(Some("not-an-addr"), Some(4321), None, None);

        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("not-an-addr"));
        assert_eq!(config.server.bind_addr.port(), 9586);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: Config = toml::from_str(
            r#"
            [collector]
            command = ["sudo", "wg", "show"]
            timeout = "3s"
            "#,
        )
        .unwrap();

        assert_eq!(config.collector.command, vec!["sudo", "wg", "show"]);
        assert_eq!(config.collector.timeout, Duration::from_secs(3));
        assert_eq!(config.server.metrics_path, "/metrics");
        assert_eq!(config.logging.log_level, "info");
    }
}
