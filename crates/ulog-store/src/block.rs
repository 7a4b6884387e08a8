//! Block headers and rotation accounting
//!
//! ## Header Format
//!
//! ```text
//! [0x55 0x4C][version:1][anchor_ms:varint]
//! ```
//!
//! Every record after a header belongs to that block and stores its timestamp
//! as a delta from `anchor_ms`.

use tracing::debug;

use crate::cursor::ByteCursor;
use crate::error::CodecError;
use crate::varint;

/// Block header preceding a run of records
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockHeader {
    /// Absolute wall-clock time in milliseconds since the Unix epoch
    pub anchor_ms: u64,
}

impl BlockHeader {
    /// "UL"
    pub const MAGIC: [u8; 2] = [0x55, 0x4C];
    pub const VERSION: u8 = 0x01;
    /// Magic plus version
    pub const PREFIX_LEN: usize = 3;

    /// Create a header anchored at `anchor_ms`
    pub fn new(anchor_ms: u64) -> Self {
        Self { anchor_ms }
    }

    /// Encode to bytes
    pub fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(Self::PREFIX_LEN + varint::encoded_len(self.anchor_ms));
        buf.extend_from_slice(&Self::MAGIC);
        buf.push(Self::VERSION);
        buf.extend_from_slice(&varint::encode_to_vec(self.anchor_ms));
        buf
    }

    /// Try to read a header at the cursor.
    ///
    /// Returns `Ok(None)` with the cursor rewound to where it started when the
    /// three prefix bytes do not all match. A full prefix followed by a cut
    /// short anchor is reported as truncation.
    pub fn probe(cursor: &mut ByteCursor<'_>) -> Result<Option<Self>, CodecError> {
        cursor.mark();

        let matched = cursor.read_u8() == Some(Self::MAGIC[0])
            && cursor.read_u8() == Some(Self::MAGIC[1])
            && cursor.read_u8() == Some(Self::VERSION);

        if !matched {
            cursor.rewind();
            return Ok(None);
        }

        let anchor_ms = varint::decode_u(cursor)?;
        Ok(Some(Self { anchor_ms }))
    }
}

/// In-memory state of the block currently being written.
///
/// Not persisted: a reopened store always starts a new block.
#[derive(Debug, Clone)]
pub struct BlockFramer {
    target_bytes: u64,
    anchor_ms: u64,
    bytes_written: u64,
}

impl BlockFramer {
    /// Create a framer that rotates after `target_bytes` record bytes
    pub fn new(target_bytes: u64) -> Self {
        Self {
            target_bytes,
            anchor_ms: 0,
            bytes_written: 0,
        }
    }

    /// Anchor of the active block
    pub fn anchor_ms(&self) -> u64 {
        self.anchor_ms
    }

    /// Record bytes appended since the active header
    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }

    /// True once the active block has reached its byte target
    pub fn needs_rotation(&self) -> bool {
        self.bytes_written >= self.target_bytes
    }

    /// Make the block anchored at `anchor_ms` the active one.
    ///
    /// Call only once its header is on disk; until then records keep
    /// accounting against the previous block.
    pub fn start_block(&mut self, anchor_ms: u64) {
        debug!(
            anchor_ms = anchor_ms,
            previous_bytes = self.bytes_written,
            "Starting block"
        );
        self.anchor_ms = anchor_ms;
        self.bytes_written = 0;
    }

    /// Count `len` record bytes against the active block
    pub fn account(&mut self, len: usize) {
        self.bytes_written = self.bytes_written.saturating_add(len as u64);
    }
}
