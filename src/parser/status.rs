//! Status Parser
//!
//! Walks `wg show` text into [`PeerRecord`]s. Each field is looked up on its
//! own, so reordered or extra lines in newer `wg` releases do not break
//! extraction.

use super::extract::{find_first, find_first_multi};
use super::quantity::{parse_bytes, resolve_handshake};
use super::split::split_blocks;
use super::types::PeerRecord;
use chrono::NaiveDateTime;
use regex::Regex;
use std::sync::LazyLock;
use tracing::debug;

/// Marker opening an interface section
pub const INTERFACE_MARKER: &str = "interface:";
/// Marker opening a peer section
pub const PEER_MARKER: &str = "peer:";

fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).expect("status field pattern is valid")
}

static INTERFACE_RE: LazyLock<Regex> = LazyLock::new(|| compile(r"interface:\s*(\w+)"));
static PEER_RE: LazyLock<Regex> = LazyLock::new(|| compile(r"peer:\s*([\w+/=]+)"));
static ENDPOINT_RE: LazyLock<Regex> = LazyLock::new(|| compile(r"endpoint:\s*([\d.]+:\d+)"));
static HANDSHAKE_RE: LazyLock<Regex> =
    LazyLock::new(|| compile(r"latest handshake:\s*(.+ ago)"));
static TRANSFER_RE: LazyLock<Regex> =
    LazyLock::new(|| compile(r"transfer:\s*([\d.]+ \w+) received, ([\d.]+ \w+) sent"));

/// Parse the full output of `wg show`.
///
/// Peers lacking an id, endpoint, handshake or transfer line are skipped, as
/// are interface sections without a name. Output order follows the input.
pub fn parse_status(text: &str, reference: NaiveDateTime) -> Vec<PeerRecord> {
    let lines: Vec<&str> = text.lines().collect();
    let mut records = Vec::new();

    for interface_lines in split_blocks(&lines, INTERFACE_MARKER) {
        let Some(interface) = find_first(&INTERFACE_RE, interface_lines) else {
            debug!(first_line = %interface_lines[0], "Skipping interface block without a name");
            continue;
        };

        for peer_lines in split_blocks(interface_lines, PEER_MARKER) {
            match parse_peer(&interface, peer_lines, reference) {
                Some(record) => records.push(record),
                None => debug!(
                    interface = %interface,
                    first_line = %peer_lines[0],
                    "Skipping incomplete peer block"
                ),
            }
        }
    }

    debug!(peers = records.len(), "Parsed WireGuard status");
    records
}

fn parse_peer(interface: &str, lines: &[&str], reference: NaiveDateTime) -> Option<PeerRecord> {
    let peer_id = find_first(&PEER_RE, lines)?;
    let endpoint = find_first(&ENDPOINT_RE, lines)?;
    let handshake = find_first(&HANDSHAKE_RE, lines)?;
    let transfer = find_first_multi(&TRANSFER_RE, lines)?;

    // Unreadable transfer amounts count as zero rather than dropping the peer
    let rx_bytes = transfer.first().and_then(|s| parse_bytes(s)).unwrap_or(0);
    let tx_bytes = transfer.get(1).and_then(|s| parse_bytes(s)).unwrap_or(0);

    Some(PeerRecord {
        interface: interface.to_string(),
        peer_id,
        endpoint,
        last_handshake: resolve_handshake(&handshake, reference),
        rx_bytes,
        tx_bytes,
    })
}
