//! Append-only event store
//!
//! Every write opens the file in append mode, writes one complete record and
//! closes it again. No handle is held between calls, so a crash loses at most
//! the record being written.
//!
//! The active block's anchor and byte count live only in memory. Opening a
//! store always begins a new block, even on a file that already has some.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use tracing::{debug, info, instrument, warn};

use crate::block::{BlockFramer, BlockHeader};
use crate::clock::{Clock, SystemClock};
use crate::config::StoreConfig;
use crate::error::StoreError;
use crate::export::{ExportSummary, ExportedRecord, LogStats};
use crate::reader::LogReader;
use crate::record::{Payload, Record};
use crate::symbol::{Channel, Severity, Token};

/// Payload bytes written when the caller passes none
const EMPTY_PAYLOAD: &[u8] = b"{}";

/// Single-writer handle on a log file
pub struct Store<C: Clock = SystemClock> {
    path: PathBuf,
    config: StoreConfig,
    framer: BlockFramer,
    clock: C,
}

impl Store<SystemClock> {
    /// Open `path` with the given rotation target and default settings
    pub fn new(path: impl AsRef<Path>, block_target_bytes: u64) -> Result<Self, StoreError> {
        Self::open(
            path,
            StoreConfig::default().with_block_target(block_target_bytes),
        )
    }

    /// Open `path` with `config` and the system clock
    pub fn open(path: impl AsRef<Path>, config: StoreConfig) -> Result<Self, StoreError> {
        Self::with_clock(path, config, SystemClock)
    }
}

impl<C: Clock> Store<C> {
    /// Open `path`, creating it if needed, and start a new block
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn with_clock(
        path: impl AsRef<Path>,
        config: StoreConfig,
        clock: C,
    ) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let mut store = Self {
            path,
            framer: BlockFramer::new(config.block_target_bytes),
            config,
            clock,
        };
        store.start_block()?;

        info!(
            block_target_bytes = store.config.block_target_bytes,
            anchor_ms = store.framer.anchor_ms(),
            "Opened event store"
        );
        Ok(store)
    }

    /// Append one event.
    ///
    /// `severity` and `channel` accept a table entry, a raw code, or a name;
    /// unknown names are written as their integer value, or 0. `at` defaults
    /// to the store's clock. Returns the record's encoded length.
    #[instrument(skip_all, fields(code = code))]
    pub fn write(
        &mut self,
        code: u64,
        severity: impl Into<Token>,
        channel: impl Into<Token>,
        payload: Option<&Payload>,
        at: Option<DateTime<Utc>>,
    ) -> Result<usize, StoreError> {
        if self.framer.needs_rotation() {
            self.start_block()?;
        }

        let at_ms = at.map_or_else(|| self.clock.now_ms(), |t| t.timestamp_millis());
        let delta_ms = self.delta_ms(at_ms);
        let severity = severity.into().resolve::<Severity>();
        let channel = channel.into().resolve::<Channel>();

        let record = match payload {
            Some(payload) => Record::with_payload(code, severity, channel, delta_ms, payload)?,
            None => Record::new(code, severity, channel, delta_ms, EMPTY_PAYLOAD.to_vec()),
        };
        let bytes = record.encode();

        self.append(&bytes)?;
        self.framer.account(bytes.len());

        debug!(
            severity = severity,
            channel = channel,
            delta_ms = delta_ms,
            len = bytes.len(),
            "Appended record"
        );
        Ok(bytes.len())
    }

    /// Write every record at or above `min_severity` (and not before `since`)
    /// to `sink` as one line each
    pub fn export<W: Write>(
        &self,
        sink: &mut W,
        min_severity: Severity,
        since: Option<DateTime<Utc>>,
    ) -> Result<ExportSummary, StoreError> {
        self.reader().export(sink, min_severity, since)
    }

    /// All complete records in the file, oldest first
    pub fn records(&self) -> Result<Vec<ExportedRecord>, StoreError> {
        self.reader().records()
    }

    /// Block, record and damage counts for the file
    pub fn stats(&self) -> Result<LogStats, StoreError> {
        self.reader().stats()
    }

    /// Read-only view of the same file
    pub fn reader(&self) -> LogReader {
        LogReader::open(&self.path)
    }

    /// Path of the log file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Settings the store was opened with
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Anchor of the block the next record lands in, unless it rotates first
    pub fn anchor_ms(&self) -> u64 {
        self.framer.anchor_ms()
    }

    /// Record bytes written into the active block
    pub fn block_bytes(&self) -> u64 {
        self.framer.bytes_written()
    }

    /// Append a header anchored at the clock's now, then switch to it
    fn start_block(&mut self) -> Result<(), StoreError> {
        let now_ms = u64::try_from(self.clock.now_ms()).unwrap_or(0);
        self.append(&BlockHeader::new(now_ms).encode())?;
        self.framer.start_block(now_ms);
        Ok(())
    }

    fn delta_ms(&self, at_ms: i64) -> u64 {
        let anchor_ms = i64::try_from(self.framer.anchor_ms()).unwrap_or(i64::MAX);
        let delta = at_ms.saturating_sub(anchor_ms);

        u64::try_from(delta).unwrap_or_else(|_| {
            warn!(
                at_ms = at_ms,
                anchor_ms = anchor_ms,
                "Event time precedes block anchor, clamping delta to 0"
            );
            0
        })
    }

    fn append(&self, bytes: &[u8]) -> Result<(), StoreError> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;

        file.write_all(bytes)?;

        if self.config.sync_on_write {
            file.sync_data()?;
        }

        Ok(())
    }
}
