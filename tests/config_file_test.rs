//! Configuration File Integration Tests

use anyhow::Result;
use std::fs;
use std::time::Duration;
use tempfile::TempDir;
use wg_exporter::collector::WgCommand;
use wg_exporter::config::ConfigManager;

#[test]
fn test_load_full_config_file() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let config_path = temp_dir.path().join("wg-exporter.toml");

    fs::write(
        &config_path,
        r#"
[server]
bind_addr = "127.0.0.1:9100"
metrics_path = "/wireguard"
shutdown_timeout = "3s"

[collector]
command = ["sudo", "-n", "wg", "show"]
timeout = "1500ms"

[logging]
log_level = "debug"
"#,
    )?;

    let config = ConfigManager::load_from_file(&config_path)?;

    assert_eq!(config.server.bind_addr.port(), 9100);
    assert_eq!(config.server.metrics_path, "/wireguard");
    assert_eq!(config.server.shutdown_timeout, Duration::from_secs(3));
    assert_eq!(config.collector.command, vec!["sudo", "-n", "wg", "show"]);
    assert_eq!(config.collector.timeout, Duration::from_millis(1500));
    assert_eq!(config.logging.log_level, "debug");

    let command = WgCommand::from_config(&config.collector)?;
    assert_eq!(command.display(), "sudo -n wg show");

    Ok(())
}

#[test]
fn test_missing_config_file_uses_defaults() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let config = ConfigManager::load_from_file(&temp_dir.path().join("absent.toml"))?;

    assert_eq!(config.collector.command, vec!["wg", "show"]);
    assert_eq!(config.collector.timeout, Duration::from_secs(5));
    assert_eq!(config.server.metrics_path, "/metrics");

    Ok(())
}

#[test]
fn test_invalid_config_file_is_rejected() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let config_path = temp_dir.path().join("bad.toml");

    fs::write(&config_path, "[collector]\ncommand = []\n")?;
    assert!(ConfigManager::load_from_file(&config_path).is_err());

    fs::write(&config_path, "[server]\nbind_addr = \"not an address\"\n")?;
    assert!(ConfigManager::load_from_file(&config_path).is_err());

    fs::write(&config_path, "[collector]\ntimeout = \"forever\"\n")?;
    assert!(ConfigManager::load_from_file(&config_path).is_err());

    Ok(())
}
