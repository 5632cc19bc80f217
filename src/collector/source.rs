//! Status Sources
//!
//! Where raw `wg show` text comes from. The exporter runs the command; tests
//! plug in fixed text.

use crate::config::CollectorConfig;
use crate::Result;
use anyhow::{anyhow, bail, Context};
use std::future::Future;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::debug;

/// Produces the raw peer status text for one scrape
pub trait StatusSource: Send + Sync {
    fn fetch(&self) -> impl Future<Output = Result<String>> + Send;
}

/// Runs an external status command such as `wg show`
#[derive(Debug, Clone)]
pub struct WgCommand {
    program: String,
    args: Vec<String>,
    timeout: Duration,
}

impl WgCommand {
    /// Build from an argv list; the first element is the program.
    pub fn new(command: &[String], timeout: Duration) -> Result<Self> {
        let Some((program, args)) = command.split_first() else {
            bail!("status command must not be empty");
        };

        Ok(Self {
            program: program.clone(),
            args: args.to_vec(),
            timeout,
        })
    }

    pub fn from_config(config: &CollectorConfig) -> Result<Self> {
        Self::new(&config.command, config.timeout)
    }

    /// The command line, for logs
    pub fn display(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl StatusSource for WgCommand {
    async fn fetch(&self) -> Result<String> {
        debug!(command = %self.display(), timeout = ?self.timeout, "Running status command");

        let output = tokio::time::timeout(
            self.timeout,
            Command::new(&self.program)
                .args(&self.args)
                .stdin(Stdio::null())
                .kill_on_drop(true)
                .output(),
        )
        .await
        .map_err(|_| anyhow!("`{}` timed out after {:?}", self.display(), self.timeout))?
        .with_context(|| format!("Failed to execute `{}`", self.display()))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            bail!("`{}` exited with {}: {}", self.display(), output.status, stderr.trim());
        }

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        debug!(bytes = stdout.len(), "Status command finished");
        Ok(stdout)
    }
}

/// Serves the same text on every scrape
#[derive(Debug, Clone)]
pub struct StaticSource {
    text: String,
}

impl StaticSource {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

impl StatusSource for StaticSource {
    async fn fetch(&self) -> Result<String> {
        Ok(self.text.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(parts: &[&str]) -> Vec<String> {
        parts.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_empty_command_rejected() {
        assert!(WgCommand::new(&[], Duration::from_secs(1)).is_err());
    }

    #[test]
    fn test_display() {
        let cmd = WgCommand::new(&argv(&["wg", "show", "all"]), Duration::from_secs(1)).unwrap();
        assert_eq!(cmd.display(), "wg show all");
    }

    #[tokio::test]
    async fn test_command_stdout_is_returned() {
        let cmd = WgCommand::new(
            &argv(&["sh", "-c", "printf 'interface: wg0\\n'"]),
            Duration::from_secs(5),
        )
        .unwrap();

        assert_eq!(cmd.fetch().await.unwrap(), "interface: wg0\n");
    }

    #[tokio::test]
    async fn test_non_zero_exit_is_error() {
        let cmd = WgCommand::new(
            &argv(&["sh", "-c", "echo denied >&2; exit 1"]),
            Duration::from_secs(5),
        )
        .unwrap();

        let err = cmd.fetch().await.unwrap_err();
        assert!(err.to_string().contains("denied"));
    }

    #[tokio::test]
    async fn test_missing_program_is_error() {
        let cmd = WgCommand::new(
            &argv(&["wg-exporter-no-such-binary"]),
            Duration::from_secs(5),
        )
        .unwrap();

        assert!(cmd.fetch().await.is_err());
    }

    #[tokio::test]
    async fn test_timeout_is_error() {
        let cmd = WgCommand::new(&argv(&["sleep", "5"]), Duration::from_millis(100)).unwrap();

        let err = cmd.fetch().await.unwrap_err();
        assert!(err.to_string().contains("timed out"));
    }
}
