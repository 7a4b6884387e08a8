//! CRC-8 checksum (polynomial 0x07, init 0x00, no final XOR)
//!
//! Detects accidental corruption only. Any single-byte change within a
//! record is guaranteed to alter the checksum.

const POLY: u8 = 0x07;

/// Checksum over `data`, MSB first
pub fn calc(data: &[u8]) -> u8 {
    let mut crc = 0u8;
    for byte in data {
        crc ^= byte;
        for _ in 0..8 {
            if crc & 0x80 != 0 {
                crc = (crc << 1) ^ POLY;
            } else {
                crc <<= 1;
            }
        }
    }
    crc
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_value() {
        // Standard CRC-8 check value for "123456789"
        assert_eq!(calc(b"123456789"), 0xF4);
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(calc(&[]), 0x00);
    }

    #[test]
    fn test_deterministic() {
        let data = b"{\"sensor_id\":7,\"ms\":850}";
        assert_eq!(calc(data), calc(data));
    }

    #[test]
    fn test_single_bit_flip_detected() {
        let data: Vec<u8> = (0u8..32).map(|i| i.wrapping_mul(37)).collect();
        let original = calc(&data);

        for index in 0..data.len() {
            for bit in 0..8 {
                let mut flipped = data.clone();
                flipped[index] ^= 1 << bit;
                assert_ne!(calc(&flipped), original, "byte {index} bit {bit}");
            }
        }
    }
}
