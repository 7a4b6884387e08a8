//! Error types for ulog-store
//!
//! Two families live here. [`StoreError`] is fatal and always reaches the
//! caller. [`CodecError`] describes a problem with bytes on the wire; the
//! export path downgrades most of these to flags on the affected record.

use thiserror::Error;

/// Errors that abort a store operation
#[derive(Debug, Error)]
pub enum StoreError {
    /// I/O error while opening, appending to or reading the log file
    #[error("I/O error: {0}")]
    Io(String),

    /// Payload could not be serialized to JSON
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<std::io::Error> for StoreError {
    fn from(err: std::io::Error) -> Self {
        StoreError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Serialization(err.to_string())
    }
}

/// Errors raised while encoding or decoding the binary format
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    /// A varint or payload read ran past the end of the buffer
    #[error("Stream truncated at offset {offset}")]
    StreamTruncated { offset: usize },

    /// Stored CRC8 does not match the recomputed one
    #[error("Checksum mismatch: expected {expected:#04x}, found {actual:#04x}")]
    ChecksumMismatch { expected: u8, actual: u8 },

    /// Payload bytes are not a JSON object
    #[error("Payload decode error: {0}")]
    PayloadDecode(String),

    /// Severity or channel token has no entry in its table
    #[error("Unknown symbol: {0}")]
    UnknownSymbol(String),
}

impl CodecError {
    /// Create a new StreamTruncated error
    pub fn truncated(offset: usize) -> Self {
        Self::StreamTruncated { offset }
    }

    /// Create a new UnknownSymbol error
    pub fn unknown_symbol(token: impl Into<String>) -> Self {
        Self::UnknownSymbol(token.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let store_err: StoreError = io_err.into();
        assert!(matches!(store_err, StoreError::Io(_)));
        assert!(store_err.to_string().contains("file not found"));
    }

    #[test]
    fn test_json_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let store_err: StoreError = json_err.into();
        assert!(matches!(store_err, StoreError::Serialization(_)));
    }

    #[test]
    fn test_checksum_mismatch_display() {
        let err = CodecError::ChecksumMismatch {
            expected: 0x1f,
            actual: 0x20,
        };
        assert_eq!(
            err.to_string(),
            "Checksum mismatch: expected 0x1f, found 0x20"
        );
    }

    #[test]
    fn test_truncated_error() {
        let err = CodecError::truncated(17);
        assert!(matches!(err, CodecError::StreamTruncated { offset: 17 }));
    }
}
