//! # KISS Framing
//!
//! Wraps AX.25 frames for a serial KISS TNC.

/// Frame delimiter
pub const KISS_FEND: u8 = 0xC0;

/// Escape byte
pub const KISS_FESC: u8 = 0xDB;

/// Escaped FEND
pub const KISS_TFEND: u8 = 0xDC;

/// Escaped FESC
pub const KISS_TFESC: u8 = 0xDD;

/// Data frame command (low nibble of the type byte)
pub const KISS_CMD_DATA: u8 = 0x00;

/// Wrap an AX.25 frame (without FCS) into a KISS data frame
///
/// # Arguments
///
/// * `port` - TNC port (0-15)
/// * `frame` - AX.25 frame bytes
///
/// # Returns
///
/// * `Vec<u8>` - `FEND, type, escaped frame, FEND`
pub fn encode_kiss_frame(port: u8, frame: &[u8]) -> Vec<u8> {
    let mut encoded = Vec::with_capacity(frame.len() + 4);
    encoded.push(KISS_FEND);
    encoded.push(((port & 0x0F) << 4) | KISS_CMD_DATA);

    for &byte in frame {
        match byte {
            KISS_FEND => encoded.extend_from_slice(&[KISS_FESC, KISS_TFEND]),
            KISS_FESC => encoded.extend_from_slice(&[KISS_FESC, KISS_TFESC]),
            _ => encoded.push(byte),
        }
    }

    encoded.push(KISS_FEND);
    encoded
}
