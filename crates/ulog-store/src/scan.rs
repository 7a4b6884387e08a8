//! Sequential scanner over a raw log buffer
//!
//! At every position the scanner first looks for a block header. If the
//! three prefix bytes do not all match it backs up to where it started and
//! reads a record there instead; a record whose first bytes happen to look
//! like `0x55 ..` is therefore still decoded.
//!
//! Checksum failures do not stop the scan. A record or header cut short by
//! the end of the buffer ends it, and nothing partial is yielded.

use tracing::warn;

use crate::block::BlockHeader;
use crate::cursor::ByteCursor;
use crate::record::{DecodedRecord, Record};

/// One item found in the log
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanEvent {
    Header(BlockHeader),
    Record(DecodedRecord),
}

/// Iterator over the headers and records of a log buffer
pub struct Scanner<'a> {
    cursor: ByteCursor<'a>,
    truncated_at: Option<usize>,
}

impl<'a> Scanner<'a> {
    /// Create a scanner at the start of `buf`
    pub fn new(buf: &'a [u8]) -> Self {
        Self {
            cursor: ByteCursor::new(buf),
            truncated_at: None,
        }
    }

    /// Offset of the incomplete trailing item, if the scan hit one
    pub fn truncated_at(&self) -> Option<usize> {
        self.truncated_at
    }

    fn stop(&mut self, offset: usize) -> Option<ScanEvent> {
        warn!(
            offset = offset,
            dropped = self.cursor.remaining(),
            "Truncated trailing entry, stopping scan"
        );
        self.truncated_at = Some(offset);
        None
    }
}

impl Iterator for Scanner<'_> {
    type Item = ScanEvent;

    fn next(&mut self) -> Option<Self::Item> {
        if self.truncated_at.is_some() || self.cursor.is_empty() {
            return None;
        }

        let start = self.cursor.position();

        match BlockHeader::probe(&mut self.cursor) {
            Ok(Some(header)) => return Some(ScanEvent::Header(header)),
            Ok(None) => {}
            Err(_) => return self.stop(start),
        }

        match Record::read_from(&mut self.cursor) {
            Ok(decoded) => {
                if decoded.bad_crc() {
                    warn!(
                        offset = decoded.offset,
                        code = decoded.record.code,
                        stored = ?decoded.stored_crc,
                        computed = decoded.computed_crc,
                        "Record checksum mismatch"
                    );
                }
                Some(ScanEvent::Record(decoded))
            }
            Err(_) => self.stop(start),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn records(events: &[ScanEvent]) -> Vec<&DecodedRecord> {
        events
            .iter()
            .filter_map(|event| match event {
                ScanEvent::Record(decoded) => Some(decoded),
                ScanEvent::Header(_) => None,
            })
            .collect()
    }

    #[test]
    fn test_headers_and_records() {
        let mut buf = BlockHeader::new(1_000).encode();
        buf.extend(Record::new(1, 2, 6, 10, b"{}".to_vec()).encode());
        buf.extend(Record::new(2, 3, 0, 20, b"{}".to_vec()).encode());
        buf.extend(BlockHeader::new(5_000).encode());
        buf.extend(Record::new(3, 5, 1, 0, b"{}".to_vec()).encode());

        let events: Vec<_> = Scanner::new(&buf).collect();
        assert_eq!(events.len(), 5);
        assert_eq!(events[0], ScanEvent::Header(BlockHeader::new(1_000)));
        assert_eq!(events[3], ScanEvent::Header(BlockHeader::new(5_000)));

        let codes: Vec<_> = records(&events).iter().map(|r| r.record.code).collect();
        assert_eq!(codes, vec![1, 2, 3]);
        assert!(records(&events).iter().all(|r| !r.bad_crc()));
    }

    #[test]
    fn test_header_lookalike_record() {
        // Code 85 encodes as 0x55, the first magic byte
        let mut buf = BlockHeader::new(1).encode();
        buf.extend(Record::new(0x55, 2, 6, 0, b"{}".to_vec()).encode());

        let events: Vec<_> = Scanner::new(&buf).collect();
        let found = records(&events);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].record.code, 0x55);
        assert!(!found[0].bad_crc());
    }

    #[test]
    fn test_truncated_tail_is_dropped() {
        let mut buf = BlockHeader::new(1).encode();
        buf.extend(Record::new(1, 2, 6, 0, b"{\"a\":1}".to_vec()).encode());
        let complete = buf.len();
        let tail = Record::new(2, 2, 6, 0, b"{\"b\":2}".to_vec()).encode();
        buf.extend(&tail[..tail.len() - 3]);

        let mut scanner = Scanner::new(&buf);
        let events: Vec<_> = scanner.by_ref().collect();
        assert_eq!(records(&events).len(), 1);
        assert_eq!(scanner.truncated_at(), Some(complete));
    }

    #[test]
    fn test_truncated_header_anchor() {
        let mut buf = Record::new(1, 2, 6, 0, b"{}".to_vec()).encode();
        buf.extend([0x55, 0x4C, 0x01, 0xFF]);

        let mut scanner = Scanner::new(&buf);
        assert_eq!(scanner.by_ref().count(), 1);
        assert!(scanner.truncated_at().is_some());
    }

    #[test]
    fn test_corrupt_record_does_not_stop_scan() {
        let first = Record::new(1, 2, 6, 0, b"{\"a\":1}".to_vec()).encode();
        let mut buf = first.clone();
        buf.extend(Record::new(2, 2, 6, 0, b"{\"b\":2}".to_vec()).encode());
        buf[first.len() - 1] ^= 0x01;

        let events: Vec<_> = Scanner::new(&buf).collect();
        let found = records(&events);
        assert_eq!(found.len(), 2);
        assert!(found[0].bad_crc());
        assert!(!found[1].bad_crc());
    }

    #[test]
    fn test_missing_final_crc_is_flagged() {
        let mut buf = BlockHeader::new(1).encode();
        let record = Record::new(4, 2, 6, 0, b"{}".to_vec()).encode();
        buf.extend(&record[..record.len() - 1]);

        let mut scanner = Scanner::new(&buf);
        let events: Vec<_> = scanner.by_ref().collect();
        let found = records(&events);
        assert_eq!(found.len(), 1);
        assert!(found[0].bad_crc());
        assert_eq!(scanner.truncated_at(), None);
    }

    #[test]
    fn test_empty_buffer() {
        assert_eq!(Scanner::new(&[]).count(), 0);
    }
}
