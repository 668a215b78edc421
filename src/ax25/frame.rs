//! # AX.25 UI Frame Encoder
//!
//! Wraps an APRS information field into an unnumbered-information frame.
//!
//! ```text
//! | destination (7) | source (7) | control 0x03 | PID 0xF0 | info (N) | FCS (2, LE) |
//! ```
//!
//! HDLC flags, bit stuffing and NRZI are left to the modem.

use bytes::{BufMut, Bytes, BytesMut};

use super::address::{Address, AX25_ADDRESS_LEN};
use super::crc::crc16_x25;

/// Control field of an unnumbered information frame
pub const AX25_CONTROL_UI: u8 = 0x03;

/// Protocol identifier: no layer 3
pub const AX25_PID_NO_LAYER3: u8 = 0xF0;

/// Header length for a destination/source frame without digipeaters
pub const AX25_HEADER_LEN: usize = 2 * AX25_ADDRESS_LEN + 2;

/// FCS length
pub const AX25_FCS_LEN: usize = 2;

/// Encode a UI frame without FCS (the form KISS TNCs expect)
///
/// # Arguments
///
/// * `destination` - Destination address (APRS tocall)
/// * `source` - Source station address
/// * `info` - Information field (the APRS packet body)
///
/// # Returns
///
/// * `Bytes` - Address field, control, PID and information field
pub fn encode_ui_frame(destination: &Address, source: &Address, info: &[u8]) -> Bytes {
    let mut frame = BytesMut::with_capacity(AX25_HEADER_LEN + info.len() + AX25_FCS_LEN);

    frame.put_slice(&destination.encode(false));
    frame.put_slice(&source.encode(true));
    frame.put_u8(AX25_CONTROL_UI);
    frame.put_u8(AX25_PID_NO_LAYER3);
    frame.put_slice(info);

    frame.freeze()
}

/// Encode a complete UI frame with FCS appended low byte first
///
/// # Examples
///
/// ```
/// use aprs_beacon::ax25::address::Address;
/// use aprs_beacon::ax25::frame::encode_ui_frame_with_fcs;
///
/// let dest: Address = "APLT00".parse()?;
/// let src: Address = "N0CALL-11".parse()?;
/// let frame = encode_ui_frame_with_fcs(&dest, &src, b"!4903.50N/07201.75WO");
/// assert_eq!(frame.len(), 16 + 20 + 2);
/// # Ok::<(), aprs_beacon::error::BeaconError>(())
/// ```
pub fn encode_ui_frame_with_fcs(destination: &Address, source: &Address, info: &[u8]) -> Bytes {
    let frame = encode_ui_frame(destination, source, info);
    let fcs = crc16_x25(&frame);

    let mut complete_frame = BytesMut::with_capacity(frame.len() + AX25_FCS_LEN);
    complete_frame.put_slice(&frame);
    complete_frame.put_u16_le(fcs);

    complete_frame.freeze()
}
