//! # ulog Store
//!
//! Append-only, self-describing binary event log for constrained loggers.
//!
//! A log file is a sequence of blocks. Each block starts with a small header
//! carrying an absolute anchor timestamp; the records that follow store only
//! a delta from it. Every record ends in a CRC8, so damaged records are
//! flagged on export instead of taking the rest of the file down with them.
//!
//! ## Features
//!
//! - **Store**: single-writer append path with size-based block rotation
//! - **LogReader**: read-only export, record listing and damage statistics
//! - **Scanner**: header/record iterator over a raw buffer
//! - **Record / BlockHeader**: the wire codecs, usable on their own
//!
//! ## File Format
//!
//! ```text
//! Block header : 0x55 0x4C | 0x01 | varint(anchor_ms)
//! Record       : varint(code) | varint(severity) | varint(channel)
//!                | varint(delta_ms) | varint(len) | len bytes JSON | crc8
//! ```
//!
//! ## Example
//!
//! ```rust,no_run
//! use ulog_store::{Channel, Severity, Store};
//! use serde_json::json;
//!
//! let mut store = Store::new("/var/log/app.ulog", 64 * 1024).unwrap();
//! let payload = json!({"sensor_id": 7, "ms": 850});
//! store
//!     .write(123, Severity::Warn, Channel::Sns, payload.as_object(), None)
//!     .unwrap();
//!
//! store.export(&mut std::io::stdout(), Severity::Trace, None).unwrap();
//! ```

pub mod block;
pub mod clock;
pub mod config;
pub mod crc8;
pub mod cursor;
pub mod error;
pub mod export;
pub mod reader;
pub mod record;
pub mod scan;
pub mod store;
pub mod symbol;
pub mod varint;

// Re-exports
pub use block::{BlockFramer, BlockHeader};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::StoreConfig;
pub use error::{CodecError, StoreError};
pub use export::{ExportFilter, ExportSummary, ExportedRecord, LogStats};
pub use reader::LogReader;
pub use record::{DecodedRecord, Payload, Record};
pub use scan::{ScanEvent, Scanner};
pub use store::Store;
pub use symbol::{Channel, Severity, Symbol, Token};
