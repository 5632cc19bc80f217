//! Quantity Converters
//!
//! `wg show` prints handshakes as "1 minute, 5 seconds ago" and transfer
//! totals as "1.20 MiB". These helpers turn both into numbers.

use super::types::{ByteQuantity, HandshakeAge};
use chrono::{NaiveDateTime, SubsecRound, TimeDelta, Timelike};
use regex::Regex;
use std::sync::LazyLock;

/// Units recognised in a handshake phrase, with their length in seconds
static TIME_UNITS: LazyLock<Vec<(Regex, i64)>> = LazyLock::new(|| {
    [("day", 86_400), ("hour", 3_600), ("minute", 60), ("second", 1)]
        .into_iter()
        .map(|(unit, seconds)| {
            let pattern = Regex::new(&format!(r"(\d+)\s+{unit}"))
                .expect("time unit pattern is valid");
            (pattern, seconds)
        })
        .collect()
});

static BYTE_READING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([\d.]+) (\w+)").expect("byte reading pattern is valid"));

impl HandshakeAge {
    /// Sum every `<N> <unit>` occurrence in `phrase`.
    ///
    /// Each unit is searched independently; phrases with no recognised unit
    /// (such as "Now") give an age of zero. Returns `None` as soon as any
    /// matched count does not fit in the total.
    pub fn from_phrase(phrase: &str) -> Option<Self> {
        let mut seconds = 0i64;

        for (pattern, unit_seconds) in TIME_UNITS.iter() {
            let Some(caps) = pattern.captures(phrase) else {
                continue;
            };
            let count: i64 = caps[1].parse().ok()?;
            seconds = seconds.checked_add(count.checked_mul(*unit_seconds)?)?;
        }

        Some(Self { seconds })
    }
}

/// Resolve a handshake phrase to an absolute time relative to `reference`.
///
/// Ages that cannot be represented fall back to `reference` itself.
pub fn resolve_handshake(phrase: &str, reference: NaiveDateTime) -> NaiveDateTime {
    HandshakeAge::from_phrase(phrase)
        .and_then(|age| TimeDelta::try_seconds(age.seconds))
        .and_then(|delta| reference.checked_sub_signed(delta))
        .unwrap_or(reference)
}

/// ISO 8601 rendering without offset, at microsecond precision.
///
/// The fraction is printed as six digits, and only when it is non-zero.
pub fn format_timestamp(timestamp: &NaiveDateTime) -> String {
    let timestamp = timestamp.trunc_subsecs(6);
    if timestamp.nanosecond() == 0 {
        timestamp.format("%Y-%m-%dT%H:%M:%S").to_string()
    } else {
        timestamp.format("%Y-%m-%dT%H:%M:%S%.6f").to_string()
    }
}

impl ByteQuantity {
    /// Pick the first `<number> <unit>` pair out of `text`.
    pub fn parse(text: &str) -> Option<Self> {
        let caps = BYTE_READING.captures(text)?;
        let magnitude = caps.get(1)?.as_str().parse::<f64>().ok()?;
        let unit = caps.get(2)?.as_str().to_string();
        Some(Self { magnitude, unit })
    }

    /// Binary (1024-based) multiplier for the unit, or `None` when unknown
    pub fn multiplier(&self) -> Option<u64> {
        let power = match self.unit.as_str() {
            "B" => 0,
            "KiB" => 1,
            "MiB" => 2,
            "GiB" => 3,
            "TiB" => 4,
            "PiB" => 5,
            _ => return None,
        };
        Some(1024u64.pow(power))
    }

    /// Whole number of bytes, rounded down
    pub fn to_bytes(&self) -> Option<u64> {
        let multiplier = self.multiplier()?;
        Some((self.magnitude * multiplier as f64) as u64)
    }
}

/// Convert a transfer reading such as `"10 MiB"` to bytes.
///
/// Returns `None` when the text has no `<number> <unit>` shape or the unit is
/// not a binary byte unit.
pub fn parse_bytes(text: &str) -> Option<u64> {
    ByteQuantity::parse(text)?.to_bytes()
}
