//! Metrics Module
//!
//! Renders peer records and serves them for scraping.

pub mod exposition;
pub mod server;

pub use exposition::{escape_label_value, format_metrics, peer_samples};
pub use server::MetricsServer;
