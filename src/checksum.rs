//! CRC16-CCITT (XMODEM variant) used by the EMS frame trailer.
//!
//! Polynomial 0x1021, initial value 0x0000, MSB-first, no reflection and no
//! final XOR. Must stay bit-exact with the firmware.

/// Generator polynomial.
pub const POLYNOMIAL: u16 = 0x1021;

/// Initial register value.
pub const INITIAL: u16 = 0x0000;

/// Compute the CRC of `data`.
///
/// # Example
///
/// ```
/// use massager_protocol::checksum;
///
/// assert_eq!(checksum::compute(b"123456789"), 0x31C3);
/// ```
#[inline]
pub fn compute(data: &[u8]) -> u16 {
    update(INITIAL, data)
}

/// Continue a running CRC over more bytes.
///
/// `update(update(INITIAL, a), b)` equals `compute(a ++ b)`.
pub fn update(mut crc: u16, data: &[u8]) -> u16 {
    for &byte in data {
        crc ^= (byte as u16) << 8;
        for _ in 0..8 {
            if crc & 0x8000 != 0 {
                crc = (crc << 1) ^ POLYNOMIAL;
            } else {
                crc <<= 1;
            }
        }
    }
    crc
}

/// Check `data` against a stored CRC in either byte order.
///
/// Older firmware writes the CRC little-endian.
pub fn matches(data: &[u8], stored: [u8; 2]) -> bool {
    let crc = compute(data);
    crc == u16::from_be_bytes(stored) || crc == u16::from_le_bytes(stored)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_xmodem_check_value() {
        assert_eq!(compute(b"123456789"), 0x31C3);
    }

    #[test]
    fn test_single_byte() {
        assert_eq!(compute(&[0x01]), 0x1021);
    }

    #[test]
    fn test_matches_either_byte_order() {
        let crc = compute(b"123456789");
        assert!(matches(b"123456789", crc.to_be_bytes()));
        assert!(matches(b"123456789", crc.to_le_bytes()));
        assert!(!matches(b"123456780", crc.to_be_bytes()));
    }

    #[test]
    fn test_empty_is_initial() {
        assert_eq!(compute(&[]), INITIAL);
    }

    #[test]
    fn test_incremental_matches_one_shot() {
        let data = b"\x68\x79\x00\x0b\x01\x02\x05";
        let split = update(update(INITIAL, &data[..3]), &data[3..]);
        assert_eq!(split, compute(data));
    }

    #[test]
    fn test_deterministic() {
        let data = [0x68, 0x79, 0x00, 0x0B, 0x02, 0x00];
        assert_eq!(compute(&data), compute(&data));
    }

    #[test]
    fn test_single_bit_flip_changes_crc() {
        let data: Vec<u8> = (0u8..32).collect();
        let reference = compute(&data);

        for byte in 0..data.len() {
            for bit in 0..8 {
                let mut flipped = data.clone();
                flipped[byte] ^= 1 << bit;
                assert_ne!(compute(&flipped), reference, "byte {} bit {}", byte, bit);
            }
        }
    }
}
