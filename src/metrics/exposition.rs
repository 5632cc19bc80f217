//! Exposition Formatter
//!
//! Renders peer records in the Prometheus text exposition format.

use crate::parser::{format_timestamp, PeerRecord};
use tracing::debug;

pub const PEER_INFO: &str = "wg_peer_info";
pub const PEER_RX_BYTES: &str = "wg_peer_rx_bytes";
pub const PEER_TX_BYTES: &str = "wg_peer_tx_bytes";

/// Escape a label value: backslash, double quote and line feed.
pub fn escape_label_value(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => escaped.push_str(r"\\"),
            '"' => escaped.push_str("\\\""),
            '\n' => escaped.push_str(r"\n"),
            other => escaped.push(other),
        }
    }
    escaped
}

fn sample(name: &str, labels: &[(&str, &str)], value: impl std::fmt::Display) -> String {
    let labels = labels
        .iter()
        .map(|(key, label_value)| format!("{}=\"{}\"", key, escape_label_value(label_value)))
        .collect::<Vec<_>>()
        .join(",");
    format!("{name}{{{labels}}} {value}")
}

/// The info, received and sent samples for one peer, in that order
pub fn peer_samples(record: &PeerRecord) -> [String; 3] {
    let handshake = format_timestamp(&record.last_handshake);
    let identity = [
        ("interface", record.interface.as_str()),
        ("peer", record.peer_id.as_str()),
    ];

    [
        sample(
            PEER_INFO,
            &[
                identity[0],
                identity[1],
                ("endpoint", record.endpoint.as_str()),
                ("last_handshake", handshake.as_str()),
            ],
            1,
        ),
        sample(PEER_RX_BYTES, &identity, record.rx_bytes),
        sample(PEER_TX_BYTES, &identity, record.tx_bytes),
    ]
}

/// Render all records, three lines each, joined by newlines.
///
/// An empty slice renders as an empty string; there is no trailing newline.
pub fn format_metrics(records: &[PeerRecord]) -> String {
    let lines: Vec<String> = records.iter().flat_map(peer_samples).collect();
    debug!(samples = lines.len(), "Formatted peer metrics");
    lines.join("\n")
}
