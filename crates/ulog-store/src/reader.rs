//! Read side of a log file
//!
//! A [`LogReader`] never writes, so it can inspect a file without opening a
//! new block the way [`Store`](crate::Store) does.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use tracing::{debug, instrument, warn};

use crate::error::StoreError;
use crate::export::{ExportFilter, ExportSummary, ExportedRecord, LogStats, Timeline};
use crate::symbol::Severity;

/// Read-only view of a log file
#[derive(Debug, Clone)]
pub struct LogReader {
    path: PathBuf,
}

impl LogReader {
    /// Create a reader for `path`; the file is read on each call
    pub fn open(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Path of the log file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write one line per record at or above `min_severity` to `sink`.
    ///
    /// Corrupt records are emitted with a `BAD_CRC` tag; an incomplete
    /// trailing record ends the export quietly. Only I/O failures are errors.
    pub fn export<W: Write>(
        &self,
        sink: &mut W,
        min_severity: Severity,
        since: Option<DateTime<Utc>>,
    ) -> Result<ExportSummary, StoreError> {
        self.export_filtered(sink, ExportFilter::new(min_severity, since))
    }

    /// Like [`export`](Self::export), with a prebuilt filter
    #[instrument(skip(self, sink), fields(path = %self.path.display()))]
    pub fn export_filtered<W: Write>(
        &self,
        sink: &mut W,
        filter: ExportFilter,
    ) -> Result<ExportSummary, StoreError> {
        let buf = fs::read(&self.path)?;
        let mut timeline = Timeline::new(&buf, || self.fallback_anchor_ms());
        let mut summary = ExportSummary::default();

        for (decoded, timestamp) in timeline.by_ref() {
            if !filter.accepts_severity(decoded.record.severity) || !filter.accepts_time(timestamp)
            {
                summary.filtered += 1;
                continue;
            }

            let exported = ExportedRecord::new(&decoded, timestamp);
            writeln!(sink, "{exported}")?;

            summary.emitted += 1;
            if exported.bad_crc {
                summary.bad_crc += 1;
            }
        }
        summary.truncated = timeline.truncated();

        debug!(
            emitted = summary.emitted,
            filtered = summary.filtered,
            bad_crc = summary.bad_crc,
            truncated = summary.truncated,
            "Export finished"
        );
        Ok(summary)
    }

    /// Every complete record in file order, unfiltered
    pub fn records(&self) -> Result<Vec<ExportedRecord>, StoreError> {
        let buf = fs::read(&self.path)?;
        let records = Timeline::new(&buf, || self.fallback_anchor_ms())
            .map(|(decoded, timestamp)| ExportedRecord::new(&decoded, timestamp))
            .collect();
        Ok(records)
    }

    /// Count blocks, records and damage without formatting anything
    pub fn stats(&self) -> Result<LogStats, StoreError> {
        let buf = fs::read(&self.path)?;
        let mut timeline = Timeline::new(&buf, || 0);
        let mut stats = LogStats {
            bytes: buf.len(),
            ..LogStats::default()
        };

        for (decoded, _) in timeline.by_ref() {
            stats.records += 1;
            if decoded.bad_crc() {
                stats.bad_crc += 1;
            }
            if decoded.record.payload_map().is_err() {
                stats.bad_payload += 1;
            }
        }
        stats.blocks = timeline.blocks();
        stats.truncated = timeline.truncated();

        Ok(stats)
    }

    /// Anchor for records written before any header: the file's creation
    /// time, or its modification time where creation time is unavailable
    fn fallback_anchor_ms(&self) -> i64 {
        let born = fs::metadata(&self.path).and_then(|meta| meta.created().or_else(|_| meta.modified()));

        match born {
            Ok(time) => DateTime::<Utc>::from(time).timestamp_millis(),
            Err(e) => {
                warn!(error = %e, "No file timestamp for headerless records, using now");
                Utc::now().timestamp_millis()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::BlockHeader;
    use crate::record::Record;
    use tempfile::TempDir;

    fn write_raw(dir: &TempDir, bytes: &[u8]) -> PathBuf {
        let path = dir.path().join("raw.ulog");
        fs::write(&path, bytes).unwrap();
        path
    }

    #[test]
    fn test_export_raw_file() {
        let dir = TempDir::new().unwrap();
        let mut bytes = BlockHeader::new(0).encode();
        bytes.extend(Record::new(7, 5, 7, 1_500, br#"{"k":"v"}"#.to_vec()).encode());
        let path = write_raw(&dir, &bytes);

        let mut out = Vec::new();
        let summary = LogReader::open(&path)
            .export(&mut out, Severity::Trace, None)
            .unwrap();

        assert_eq!(summary.emitted, 1);
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "#-7-error-db-00:00:01.500 {\"k\":\"v\"}\n"
        );
    }

    #[test]
    fn test_headerless_records_use_file_time() {
        let dir = TempDir::new().unwrap();
        let bytes = Record::new(1, 2, 6, 0, b"{}".to_vec()).encode();
        let path = write_raw(&dir, &bytes);

        let before = Utc::now().timestamp_millis() - 60_000;
        let records = LogReader::open(&path).records().unwrap();
        assert_eq!(records.len(), 1);
        assert!(records[0].timestamp.timestamp_millis() >= before);
    }

    #[test]
    fn test_empty_file() {
        let dir = TempDir::new().unwrap();
        let path = write_raw(&dir, &[]);

        let mut out = Vec::new();
        let summary = LogReader::open(&path)
            .export(&mut out, Severity::Trace, None)
            .unwrap();
        assert_eq!(summary, ExportSummary::default());
        assert!(out.is_empty());
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = TempDir::new().unwrap();
        let reader = LogReader::open(dir.path().join("absent.ulog"));
        assert!(matches!(reader.stats(), Err(StoreError::Io(_))));
    }

    #[test]
    fn test_stats() {
        let dir = TempDir::new().unwrap();
        let mut bytes = BlockHeader::new(1).encode();
        bytes.extend(Record::new(1, 2, 6, 0, b"{}".to_vec()).encode());
        bytes.extend(Record::new(2, 2, 6, 0, b"nope".to_vec()).encode());
        let mut bad = Record::new(3, 2, 6, 0, b"{}".to_vec()).encode();
        let last = bad.len() - 1;
        bad[last] ^= 0x40;
        bytes.extend(bad);
        bytes.extend(BlockHeader::new(2).encode());
        bytes.push(0x80);
        let path = write_raw(&dir, &bytes);

        let stats = LogReader::open(&path).stats().unwrap();
        assert_eq!(stats.blocks, 2);
        assert_eq!(stats.records, 3);
        assert_eq!(stats.bad_crc, 1);
        assert_eq!(stats.bad_payload, 1);
        assert!(stats.truncated);
        assert_eq!(stats.bytes, bytes.len());
    }
}
