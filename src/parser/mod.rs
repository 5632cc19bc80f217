//! Parser Module
//!
//! Turns human-readable `wg show` output into typed peer records.

pub mod extract;
pub mod quantity;
pub mod split;
pub mod status;
pub mod types;

pub use extract::{find_first, find_first_multi};
pub use quantity::{format_timestamp, parse_bytes, resolve_handshake};
pub use split::split_blocks;
pub use status::parse_status;
pub use types::{ByteQuantity, HandshakeAge, PeerRecord};
