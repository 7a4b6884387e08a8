//! Human-readable export
//!
//! Turns scanned records into absolute-time events and renders them as
//! one line each:
//!
//! ```text
//! #-<code>-<severity>-<channel>-<HH:MM:SS.mmm>[ BAD_CRC] <payload json>
//! ```

use std::fmt;

use chrono::{DateTime, Utc};
use tracing::warn;

use crate::record::{DecodedRecord, Payload};
use crate::scan::{ScanEvent, Scanner};
use crate::symbol::{Channel, Severity, Symbol, SymbolName};

/// Which records an export lets through
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExportFilter {
    /// Records below this severity are dropped
    pub min_severity: Severity,
    /// Records stamped before this instant are dropped
    pub since: Option<DateTime<Utc>>,
}

impl ExportFilter {
    /// Create a filter from a severity floor and optional start time
    pub fn new(min_severity: Severity, since: Option<DateTime<Utc>>) -> Self {
        Self {
            min_severity,
            since,
        }
    }

    /// Severity check, applied before anything else
    pub fn accepts_severity(&self, severity: u64) -> bool {
        severity >= u64::from(self.min_severity.code())
    }

    /// Time check against `since`
    pub fn accepts_time(&self, timestamp: DateTime<Utc>) -> bool {
        self.since.is_none_or(|since| timestamp >= since)
    }
}

/// A decoded record placed on the wall clock
#[derive(Debug, Clone, PartialEq)]
pub struct ExportedRecord {
    pub code: u64,
    pub severity: u64,
    pub channel: u64,
    pub timestamp: DateTime<Utc>,
    /// Parsed payload, empty when the bytes were not a JSON object
    pub payload: Payload,
    pub bad_crc: bool,
    /// Byte offset of the record in the log file
    pub offset: usize,
}

impl ExportedRecord {
    /// Place a decoded record at `timestamp`
    pub fn new(decoded: &DecodedRecord, timestamp: DateTime<Utc>) -> Self {
        let payload = decoded.record.payload_map().unwrap_or_else(|e| {
            warn!(offset = decoded.offset, error = %e, "Unreadable payload, using empty map");
            Payload::new()
        });

        Self {
            code: decoded.record.code,
            severity: decoded.record.severity,
            channel: decoded.record.channel,
            timestamp,
            payload,
            bad_crc: decoded.bad_crc(),
            offset: decoded.offset,
        }
    }
}

impl fmt::Display for ExportedRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "#-{}-{}-{}-{}",
            self.code,
            SymbolName::<Severity>::new(self.severity),
            SymbolName::<Channel>::new(self.channel),
            self.timestamp.format("%H:%M:%S%.3f"),
        )?;
        if self.bad_crc {
            f.write_str(" BAD_CRC")?;
        }
        let payload = serde_json::to_string(&self.payload).map_err(|_| fmt::Error)?;
        write!(f, " {payload}")
    }
}

/// Counters returned by an export
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExportSummary {
    /// Lines written to the sink
    pub emitted: usize,
    /// Records dropped by severity or time
    pub filtered: usize,
    /// Emitted lines carrying `BAD_CRC`
    pub bad_crc: usize,
    /// Whether the scan ended on an incomplete trailing record
    pub truncated: bool,
}

/// Shape of a log file, for triage
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LogStats {
    /// File size in bytes
    pub bytes: usize,
    pub blocks: usize,
    pub records: usize,
    pub bad_crc: usize,
    /// Records whose payload was not a JSON object
    pub bad_payload: usize,
    pub truncated: bool,
}

/// Absolute time for a delta within a block
pub fn absolute_time(anchor_ms: i64, delta_ms: u64) -> DateTime<Utc> {
    let delta = i64::try_from(delta_ms).unwrap_or(i64::MAX);
    DateTime::from_timestamp_millis(anchor_ms.saturating_add(delta)).unwrap_or_default()
}

/// Walks a log buffer, pairing each record with its absolute timestamp.
///
/// Records that precede the first header are anchored at
/// `fallback_anchor_ms`, which is only evaluated if such a record exists.
pub struct Timeline<'a, F: FnOnce() -> i64> {
    scanner: Scanner<'a>,
    anchor_ms: Option<i64>,
    fallback: Option<F>,
    blocks: usize,
}

impl<'a, F: FnOnce() -> i64> Timeline<'a, F> {
    /// Create a timeline over `buf`
    pub fn new(buf: &'a [u8], fallback_anchor_ms: F) -> Self {
        Self {
            scanner: Scanner::new(buf),
            anchor_ms: None,
            fallback: Some(fallback_anchor_ms),
            blocks: 0,
        }
    }

    /// Headers seen so far
    pub fn blocks(&self) -> usize {
        self.blocks
    }

    /// Whether the scan ended on an incomplete record
    pub fn truncated(&self) -> bool {
        self.scanner.truncated_at().is_some()
    }

    fn active_anchor(&mut self) -> i64 {
        if let Some(anchor) = self.anchor_ms {
            return anchor;
        }
        let anchor = self.fallback.take().map(|f| f()).unwrap_or_default();
        self.anchor_ms = Some(anchor);
        anchor
    }
}

impl<F: FnOnce() -> i64> Iterator for Timeline<'_, F> {
    type Item = (DecodedRecord, DateTime<Utc>);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match self.scanner.next()? {
                ScanEvent::Header(header) => {
                    self.blocks += 1;
                    self.anchor_ms = Some(i64::try_from(header.anchor_ms).unwrap_or(i64::MAX));
                }
                ScanEvent::Record(decoded) => {
                    let anchor = self.active_anchor();
                    let timestamp = absolute_time(anchor, decoded.record.delta_ms);
                    return Some((decoded, timestamp));
                }
            }
        }
    }
}
