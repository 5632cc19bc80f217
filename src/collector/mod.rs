//! Collector Module
//!
//! Fetches peer status and drives it through the parser and formatter.

pub mod source;

pub use source::{StaticSource, StatusSource, WgCommand};

use crate::metrics::format_metrics;
use crate::parser::{parse_status, PeerRecord};
use chrono::{Local, NaiveDateTime};
use tracing::{error, info, warn};

/// Body served in place of metrics when the status command fails
pub const UNAVAILABLE_MESSAGE: &str = "Failed to retrieve WireGuard metrics.";

/// Result of a single scrape
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScrapeOutcome {
    /// Exposition text, possibly empty when no peer qualified
    Metrics(String),
    /// The status command failed or printed nothing
    Unavailable,
}

impl ScrapeOutcome {
    pub fn is_available(&self) -> bool {
        matches!(self, ScrapeOutcome::Metrics(_))
    }

    pub fn into_body(self) -> String {
        match self {
            ScrapeOutcome::Metrics(text) => text,
            ScrapeOutcome::Unavailable => UNAVAILABLE_MESSAGE.to_string(),
        }
    }
}

/// Reference time used to resolve "N minutes ago" handshakes
#[derive(Debug, Clone, Copy, Default)]
pub enum Clock {
    /// Local wall clock, read once per scrape
    #[default]
    Local,
    Fixed(NaiveDateTime),
}

impl Clock {
    pub fn now(&self) -> NaiveDateTime {
        match self {
            Clock::Local => Local::now().naive_local(),
            Clock::Fixed(reference) => *reference,
        }
    }
}

/// Runs the status source and turns its output into metrics
pub struct Collector<S> {
    source: S,
    clock: Clock,
}

impl<S: StatusSource> Collector<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            clock: Clock::Local,
        }
    }

    /// Resolve handshakes against a fixed time instead of the wall clock
    pub fn with_clock(mut self, reference: NaiveDateTime) -> Self {
        self.clock = Clock::Fixed(reference);
        self
    }

    /// Parsed peers, or `None` when no status text could be obtained.
    ///
    /// Output that is empty or only whitespace (a bare `"\n"` included) counts
    /// as unavailable, not as a scrape with zero peers.
    pub async fn collect_records(&self) -> Option<Vec<PeerRecord>> {
        let text = match self.source.fetch().await {
            Ok(text) => text,
            Err(e) => {
                error!(error = %e, "Failed to fetch WireGuard status");
                return None;
            }
        };

        if text.trim().is_empty() {
            warn!("WireGuard status command produced no output");
            return None;
        }

        Some(parse_status(&text, self.clock.now()))
    }

    pub async fn scrape(&self) -> ScrapeOutcome {
        match self.collect_records().await {
            Some(records) => {
                info!(peers = records.len(), "Collected WireGuard peer metrics");
                ScrapeOutcome::Metrics(format_metrics(&records))
            }
            None => ScrapeOutcome::Unavailable,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Result;
    use chrono::NaiveDate;

    struct FailingSource;

    impl StatusSource for FailingSource {
        async fn fetch(&self) -> Result<String> {
            anyhow::bail!("wg: permission denied")
        }
    }

    fn new_year() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    const ONE_PEER: &str = "\
interface: wg0
peer: AAAA=
  endpoint: 10.0.0.2:51820
  latest handshake: 5 minutes, 30 seconds ago
  transfer: 10 MiB received, 1 KiB sent
";

    #[tokio::test]
    async fn test_scrape_formats_peers() {
        let collector = Collector::new(StaticSource::new(ONE_PEER)).with_clock(new_year());

        let outcome = collector.scrape().await;
        assert!(outcome.is_available());

        let body = outcome.into_body();
        assert_eq!(body.lines().count(), 3);
        assert!(body.contains(r#"last_handshake="2023-12-31T23:54:30""#));
        assert!(body.contains(r#"wg_peer_rx_bytes{interface="wg0",peer="AAAA="} 10485760"#));
        assert!(body.contains(r#"wg_peer_tx_bytes{interface="wg0",peer="AAAA="} 1024"#));
    }

    #[tokio::test]
    async fn test_source_failure_is_unavailable() {
        let collector = Collector::new(FailingSource);

        let outcome = collector.scrape().await;
        assert_eq!(outcome, ScrapeOutcome::Unavailable);
        assert_eq!(outcome.into_body(), UNAVAILABLE_MESSAGE);
    }

    #[tokio::test]
    async fn test_empty_output_is_unavailable() {
        for text in ["", "\n", "\n  \n"] {
            let collector = Collector::new(StaticSource::new(text));
            assert_eq!(collector.scrape().await, ScrapeOutcome::Unavailable);
        }
    }

    #[tokio::test]
    async fn test_output_without_peers_is_empty_metrics() {
        let status = "interface: wg0\n  listening port: 51820\n";
        let collector = Collector::new(StaticSource::new(status));

        assert_eq!(collector.scrape().await, ScrapeOutcome::Metrics(String::new()));
        assert_eq!(collector.collect_records().await, Some(vec![]));
    }

    #[test]
    fn test_fixed_clock() {
        assert_eq!(Clock::Fixed(new_year()).now(), new_year());
    }
}
