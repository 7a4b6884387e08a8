//! Unsigned varint codec
//!
//! Seven payload bits per byte, least significant group first. The high bit
//! of each byte is set when more bytes follow.
//!
//! ```text
//! 300 => [0b1010_1100, 0b0000_0010]
//! ```

use bytes::BufMut;

use crate::cursor::ByteCursor;
use crate::error::CodecError;

/// Encode `value` onto the end of `buf`
pub fn encode_u<B: BufMut>(buf: &mut B, mut value: u64) {
    loop {
        let mut byte = (value & 0x7F) as u8;
        value >>= 7;
        if value != 0 {
            byte |= 0x80;
        }
        buf.put_u8(byte);
        if value == 0 {
            break;
        }
    }
}

/// Encode `value` into a fresh buffer
pub fn encode_to_vec(value: u64) -> Vec<u8> {
    let mut buf = Vec::with_capacity(encoded_len(value));
    encode_u(&mut buf, value);
    buf
}

/// Encoded size of `value` in bytes
pub fn encoded_len(value: u64) -> usize {
    if value == 0 {
        1
    } else {
        (64 - value.leading_zeros() as usize).div_ceil(7)
    }
}

/// Decode one varint from the cursor.
///
/// Consumes bytes until one arrives with the continuation bit clear. Groups
/// beyond bit 63 are read and dropped, so an overlong (corrupt) varint still
/// leaves the cursor just past its terminating byte.
pub fn decode_u(cursor: &mut ByteCursor<'_>) -> Result<u64, CodecError> {
    let mut result = 0u64;
    let mut shift = 0u32;

    loop {
        let byte = cursor
            .read_u8()
            .ok_or_else(|| CodecError::truncated(cursor.position()))?;

        if shift < 64 {
            result |= u64::from(byte & 0x7F) << shift;
        }

        if byte & 0x80 == 0 {
            return Ok(result);
        }
        shift = shift.saturating_add(7);
    }
}
