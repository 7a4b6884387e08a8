//! Event record codec
//!
//! ## Wire Format
//!
//! ```text
//! [code:varint][severity:varint][channel:varint][delta_ms:varint][len:varint][payload:len][crc8:1]
//! ```
//!
//! - **code**: application-defined event id
//! - **severity**: 0..=7, see [`Severity`]
//! - **channel**: 0..=8, see [`Channel`]
//! - **delta_ms**: milliseconds since the enclosing block's anchor
//! - **payload**: compact JSON object
//! - **crc8**: checksum over every preceding byte of the record

use serde_json::{Map, Value};

use crate::crc8;
use crate::cursor::ByteCursor;
use crate::error::CodecError;
use crate::symbol::{Channel, Severity, SymbolName};
use crate::varint;

/// Key/value payload carried by a record
pub type Payload = Map<String, Value>;

/// One event in wire form.
///
/// Severity and channel are raw codes so values outside the tables survive
/// a decode/encode cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub code: u64,
    pub severity: u64,
    pub channel: u64,
    pub delta_ms: u64,
    /// Encoded JSON bytes
    pub payload: Vec<u8>,
}

impl Record {
    /// Create a record from raw codes and payload bytes
    pub fn new(code: u64, severity: u64, channel: u64, delta_ms: u64, payload: Vec<u8>) -> Self {
        Self {
            code,
            severity,
            channel,
            delta_ms,
            payload,
        }
    }

    /// Build a record whose payload is `payload` serialized as compact JSON
    pub fn with_payload(
        code: u64,
        severity: u64,
        channel: u64,
        delta_ms: u64,
        payload: &Payload,
    ) -> Result<Self, serde_json::Error> {
        let bytes = serde_json::to_vec(payload)?;
        Ok(Self::new(code, severity, channel, delta_ms, bytes))
    }

    /// Encode to bytes, checksum included
    pub fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(self.encoded_len());

        varint::encode_u(&mut buf, self.code);
        varint::encode_u(&mut buf, self.severity);
        varint::encode_u(&mut buf, self.channel);
        varint::encode_u(&mut buf, self.delta_ms);
        varint::encode_u(&mut buf, self.payload.len() as u64);
        buf.extend_from_slice(&self.payload);

        let crc = crc8::calc(&buf);
        buf.push(crc);

        buf
    }

    /// Get encoded size without actually encoding
    pub fn encoded_len(&self) -> usize {
        varint::encoded_len(self.code)
            + varint::encoded_len(self.severity)
            + varint::encoded_len(self.channel)
            + varint::encoded_len(self.delta_ms)
            + varint::encoded_len(self.payload.len() as u64)
            + self.payload.len()
            + 1
    }

    /// Decode one record from the start of `data`, rejecting bad checksums
    pub fn decode(data: &[u8]) -> Result<Self, CodecError> {
        let mut cursor = ByteCursor::new(data);
        let decoded = Self::read_from(&mut cursor)?;

        match decoded.stored_crc {
            Some(actual) if actual == decoded.computed_crc => Ok(decoded.record),
            Some(actual) => Err(CodecError::ChecksumMismatch {
                expected: decoded.computed_crc,
                actual,
            }),
            None => Err(CodecError::truncated(cursor.position())),
        }
    }

    /// Read one record at the cursor without rejecting it on checksum errors.
    ///
    /// Fails only when a varint or the payload runs past the end of the
    /// buffer. A missing checksum byte is reported through
    /// [`DecodedRecord::stored_crc`].
    pub fn read_from(cursor: &mut ByteCursor<'_>) -> Result<DecodedRecord, CodecError> {
        let offset = cursor.position();

        let code = varint::decode_u(cursor)?;
        let severity = varint::decode_u(cursor)?;
        let channel = varint::decode_u(cursor)?;
        let delta_ms = varint::decode_u(cursor)?;
        let len = varint::decode_u(cursor)?;

        let len = usize::try_from(len).map_err(|_| CodecError::truncated(cursor.position()))?;
        let payload = cursor
            .read_slice(len)
            .ok_or_else(|| CodecError::truncated(cursor.position()))?
            .to_vec();

        let computed_crc = crc8::calc(cursor.since(offset));
        let stored_crc = cursor.read_u8();

        Ok(DecodedRecord {
            record: Self::new(code, severity, channel, delta_ms, payload),
            offset,
            len: cursor.position() - offset,
            stored_crc,
            computed_crc,
        })
    }

    /// Parse the payload as a JSON object
    pub fn payload_map(&self) -> Result<Payload, CodecError> {
        match serde_json::from_slice::<Value>(&self.payload) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(other) => Err(CodecError::PayloadDecode(format!(
                "expected object, found {}",
                json_kind(&other)
            ))),
            Err(e) => Err(CodecError::PayloadDecode(e.to_string())),
        }
    }

    /// Severity as its table name, or the raw code
    pub fn severity_name(&self) -> SymbolName<Severity> {
        SymbolName::new(self.severity)
    }

    /// Channel as its table name, or the raw code
    pub fn channel_name(&self) -> SymbolName<Channel> {
        SymbolName::new(self.channel)
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// A record read back from a log, with its checksum verdict
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedRecord {
    pub record: Record,
    /// Byte offset of the record in the scanned buffer
    pub offset: usize,
    /// Bytes consumed, checksum included when present
    pub len: usize,
    /// Checksum byte found on disk, `None` at end of stream
    pub stored_crc: Option<u8>,
    /// Checksum recomputed over the record bytes
    pub computed_crc: u8,
}

impl DecodedRecord {
    /// True when the checksum byte is missing or disagrees
    pub fn bad_crc(&self) -> bool {
        self.stored_crc != Some(self.computed_crc)
    }
}
