//! # CRC-16/X.25 Implementation
//!
//! Frame check sequence for AX.25 frames.
//!
//! **Polynomial**: 0x1021, processed reflected as 0x8408
//! **Initial Value**: 0xFFFF
//! **Final XOR**: 0xFFFF

/// CRC-16/X.25 polynomial (reflected)
const CRC16_POLY: u16 = 0x8408;

/// Precomputed CRC16 lookup table for fast calculation
const CRC16_TABLE: [u16; 256] = generate_crc16_table();

/// Generate CRC16 lookup table at compile time
const fn generate_crc16_table() -> [u16; 256] {
    let mut table = [0u16; 256];
    let mut i = 0;

    while i < 256 {
        let mut crc = i as u16;
        let mut j = 0;

        while j < 8 {
            if (crc & 0x0001) != 0 {
                crc = (crc >> 1) ^ CRC16_POLY;
            } else {
                crc >>= 1;
            }
            j += 1;
        }

        table[i] = crc;
        i += 1;
    }

    table
}

/// Calculate the AX.25 FCS using the lookup table
///
/// # Arguments
///
/// * `data` - Address, control, PID and information field bytes
///
/// # Returns
///
/// * `u16` - FCS, transmitted low byte first
///
/// # Examples
///
/// ```
/// use aprs_beacon::ax25::crc::crc16_x25;
///
/// assert_eq!(crc16_x25(b"123456789"), 0x906E);
/// ```
pub fn crc16_x25(data: &[u8]) -> u16 {
    let mut crc: u16 = 0xFFFF;

    for &byte in data {
        crc = (crc >> 8) ^ CRC16_TABLE[((crc ^ byte as u16) & 0xFF) as usize];
    }

    !crc
}

/// Bitwise CRC-16/X.25, used to verify the lookup table
#[cfg(test)]
fn crc16_x25_slow(data: &[u8]) -> u16 {
    let mut crc: u16 = 0xFFFF;

    for &byte in data {
        crc ^= byte as u16;

        for _ in 0..8 {
            if (crc & 0x0001) != 0 {
                crc = (crc >> 1) ^ CRC16_POLY;
            } else {
                crc >>= 1;
            }
        }
    }

    !crc
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crc16_empty() {
        assert_eq!(crc16_x25(&[]), 0x0000);
    }

    #[test]
    fn test_crc16_check_value() {
        // Standard check value for CRC-16/X-25
        assert_eq!(crc16_x25(b"123456789"), 0x906E);
        assert_eq!(crc16_x25_slow(b"123456789"), 0x906E);
    }

    #[test]
    fn test_crc16_single_byte() {
        assert_eq!(crc16_x25(&[0x00]), 0xF078);
        assert_eq!(crc16_x25(&[0x00]), crc16_x25_slow(&[0x00]));
    }

    #[test]
    fn test_crc16_lookup_table_matches_slow() {
        let test_data = [
            vec![0x01, 0x02, 0x03],
            vec![0xFF, 0xFE, 0xFD],
            vec![0x82, 0xA0, 0x98, 0xA8, 0x60, 0x60, 0x60, 0x03, 0xF0],
            vec![0x00; 24],
            b"!4903.50N/07201.75WO123/045/A=001234".to_vec(),
        ];

        for data in test_data.iter() {
            assert_eq!(
                crc16_x25(data),
                crc16_x25_slow(data),
                "CRC mismatch for data: {:?}",
                data
            );
        }
    }

    #[test]
    fn test_crc16_changes_with_data() {
        assert_ne!(crc16_x25(b"N0CALL"), crc16_x25(b"N0CALM"));
    }
}
