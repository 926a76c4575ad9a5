//! Response artifact codec.
//!
//! The automation process writes each response artifact as zero or more
//! units embedded in arbitrary surrounding text:
//!
//! ```text
//! <response>0,4</response><response>0,end batched automation command 0</response>
//! ```
//!
//! Each unit's inner text is split on the FIRST comma into a status code and
//! a payload; payloads may themselves contain commas and are never re-split.
//!
//! # Malformed Units
//!
//! A unit with no comma cannot be split into (code, payload). The codec
//! skips it, keeps decoding the rest of the record, and counts the skip in
//! [`ResponseRecord::malformed_units`]. Decoding never fails as a whole.

// ============================================================================
// Imports
// ============================================================================

use tracing::warn;

// ============================================================================
// Constants
// ============================================================================

/// Opening marker of a response unit.
pub const OPEN_MARKER: &str = "<response>";

/// Closing marker of a response unit.
pub const CLOSE_MARKER: &str = "</response>";

// ============================================================================
// ResponseUnit
// ============================================================================

/// One decoded (code, payload) pair from a response artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseUnit {
    /// Status code reported by the automation script (`"0"` on success).
    pub code: String,
    /// Result payload; may contain commas, markers are not allowed inside.
    pub payload: String,
}

impl ResponseUnit {
    /// Creates a unit from code and payload.
    #[inline]
    pub fn new(code: impl Into<String>, payload: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            payload: payload.into(),
        }
    }
}

// ============================================================================
// ResponseRecord
// ============================================================================

/// Ordered sequence of units decoded from one response artifact.
///
/// A record may be empty: the automation process acknowledges some commands
/// (and the liveness probe) without producing any unit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResponseRecord {
    units: Vec<ResponseUnit>,
    malformed: usize,
}

impl ResponseRecord {
    /// Creates a record from already-decoded units.
    #[must_use]
    pub fn from_units(units: Vec<ResponseUnit>) -> Self {
        Self {
            units,
            malformed: 0,
        }
    }

    /// Returns the decoded units in artifact order.
    #[inline]
    #[must_use]
    pub fn units(&self) -> &[ResponseUnit] {
        &self.units
    }

    /// Consumes the record, returning its units.
    #[inline]
    #[must_use]
    pub fn into_units(self) -> Vec<ResponseUnit> {
        self.units
    }

    /// Returns the first unit, if any.
    #[inline]
    #[must_use]
    pub fn first(&self) -> Option<&ResponseUnit> {
        self.units.first()
    }

    /// Returns the first unit's payload, if any.
    #[inline]
    #[must_use]
    pub fn first_payload(&self) -> Option<&str> {
        self.units.first().map(|u| u.payload.as_str())
    }

    /// Returns the number of decoded units.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.units.len()
    }

    /// Returns `true` if no units were decoded.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Returns the number of malformed units skipped during decode.
    #[inline]
    #[must_use]
    pub fn malformed_units(&self) -> usize {
        self.malformed
    }
}

// ============================================================================
// Decode
// ============================================================================

/// Decodes a raw response artifact into a [`ResponseRecord`].
///
/// Units are found by repeated scanning for [`OPEN_MARKER`]; any prefix
/// before the first occurrence is discarded. A unit without a closing
/// marker consumes the remainder of the input.
///
/// Malformed units (no comma) are skipped and counted, never fatal.
#[must_use]
pub fn decode(raw: &str) -> ResponseRecord {
    let mut units = Vec::new();
    let mut malformed = 0;

    for segment in raw.split(OPEN_MARKER).skip(1) {
        let inner = segment
            .split_once(CLOSE_MARKER)
            .map_or(segment, |(inner, _)| inner);

        match inner.split_once(',') {
            Some((code, payload)) => units.push(ResponseUnit::new(code, payload)),
            None => {
                warn!(unit = %inner, "Skipping malformed response unit");
                malformed += 1;
            }
        }
    }

    ResponseRecord { units, malformed }
}

// ============================================================================
// Encode
// ============================================================================

/// Encodes units into the wire format.
///
/// This is the inverse of [`decode`] for well-formed units. The bridge never
/// writes response artifacts itself; this exists for tests and for fake
/// automation processes standing in for Instruments.
#[must_use]
pub fn encode(units: &[ResponseUnit]) -> String {
    let mut out = String::new();
    for unit in units {
        out.push_str(OPEN_MARKER);
        out.push_str(&unit.code);
        out.push(',');
        out.push_str(&unit.payload);
        out.push_str(CLOSE_MARKER);
    }
    out
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_single_unit() {
        let record = decode("<response>0,4</response>");
        assert_eq!(record.len(), 1);
        assert_eq!(record.first_payload(), Some("4"));
        assert_eq!(record.units()[0].code, "0");
    }

    #[test]
    fn test_decode_empty_input() {
        let record = decode("");
        assert!(record.is_empty());
        assert_eq!(record.malformed_units(), 0);
    }

    #[test]
    fn test_decode_discards_prefix() {
        let record = decode("instruments noise\n<response>0,ok</response>");
        assert_eq!(record.len(), 1);
        assert_eq!(record.first_payload(), Some("ok"));
    }

    #[test]
    fn test_decode_payload_with_commas() {
        let record = decode("<response>0,a,b,c</response>");
        assert_eq!(record.len(), 1);
        assert_eq!(record.first_payload(), Some("a,b,c"));
    }

    #[test]
    fn test_decode_multiple_units_in_order() {
        let raw = "<response>0,first</response><response>1,second</response>";
        let record = decode(raw);
        assert_eq!(record.len(), 2);
        assert_eq!(record.units()[0].payload, "first");
        assert_eq!(record.units()[1].code, "1");
    }

    #[test]
    fn test_decode_missing_close_marker_takes_remainder() {
        let record = decode("<response>0,tail without close");
        assert_eq!(record.first_payload(), Some("tail without close"));
    }

    #[test]
    fn test_decode_skips_malformed_unit() {
        let raw = "<response>no comma here</response><response>0,good</response>";
        let record = decode(raw);
        assert_eq!(record.len(), 1);
        assert_eq!(record.first_payload(), Some("good"));
        assert_eq!(record.malformed_units(), 1);
    }

    #[test]
    fn test_encode_decode_round_trip() {
        let units = vec![
            ResponseUnit::new("0", "plain"),
            ResponseUnit::new("0", "with,embedded,commas"),
            ResponseUnit::new("1", ""),
        ];

        let decoded = decode(&encode(&units));
        assert_eq!(decoded.units(), units.as_slice());
        assert_eq!(decoded.malformed_units(), 0);
    }
}
