//! Parser Types

use chrono::NaiveDateTime;

/// One peer extracted from `wg show` output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeerRecord {
    /// Name of the interface block the peer was found under
    pub interface: String,
    /// Public key of the peer, kept verbatim
    pub peer_id: String,
    pub endpoint: String,
    /// Absolute time of the latest handshake, resolved against a reference time
    pub last_handshake: NaiveDateTime,
    pub rx_bytes: u64,
    pub tx_bytes: u64,
}

/// A transfer quantity such as `1.5 GiB`, before conversion to bytes
#[derive(Debug, Clone, PartialEq)]
pub struct ByteQuantity {
    pub magnitude: f64,
    pub unit: String,
}

/// Total age of a handshake phrase, in seconds
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HandshakeAge {
    pub seconds: i64,
}
