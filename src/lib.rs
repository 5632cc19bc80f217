//! wg-exporter Library
//!
//! Parses the human-readable output of `wg show` into peer records and
//! renders them in the Prometheus text exposition format.

pub mod collector;
pub mod config;
pub mod metrics;
pub mod parser;
pub mod shutdown;

pub use collector::{Collector, ScrapeOutcome, UNAVAILABLE_MESSAGE};
pub use config::Config;
pub use parser::PeerRecord;
pub use shutdown::ShutdownCoordinator;

/// Common error type for the exporter
pub type Result<T> = anyhow::Result<T>;
