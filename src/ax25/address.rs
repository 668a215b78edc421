//! # AX.25 Addresses
//!
//! Callsign/SSID pairs and their 7-byte on-air encoding.

use std::fmt;
use std::str::FromStr;

use crate::error::{BeaconError, Result};

/// Maximum callsign length in an AX.25 address field
pub const AX25_CALLSIGN_LEN: usize = 6;

/// Encoded address length (6 callsign bytes + SSID byte)
pub const AX25_ADDRESS_LEN: usize = 7;

/// Highest SSID value (4 bits)
pub const AX25_SSID_MAX: u8 = 15;

/// Reserved bits of the SSID byte, both set
const SSID_RESERVED_BITS: u8 = 0b0110_0000;

/// Address extension bit, set on the last address of the field
const ADDRESS_EXTENSION_BIT: u8 = 0b0000_0001;

/// Station address: callsign plus secondary station identifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Address {
    callsign: String,
    ssid: u8,
}

impl Address {
    /// Create an address, upper-casing the callsign
    ///
    /// # Errors
    ///
    /// Returns `InvalidAddress` if the callsign is empty, longer than six
    /// characters, not ASCII alphanumeric, or the SSID exceeds 15.
    pub fn new(callsign: &str, ssid: u8) -> Result<Self> {
        if callsign.is_empty() || callsign.len() > AX25_CALLSIGN_LEN {
            return Err(BeaconError::InvalidAddress(format!(
                "callsign '{}' must be 1-{} characters",
                callsign, AX25_CALLSIGN_LEN
            )));
        }

        if !callsign.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(BeaconError::InvalidAddress(format!(
                "callsign '{}' must be ASCII letters and digits",
                callsign
            )));
        }

        if ssid > AX25_SSID_MAX {
            return Err(BeaconError::InvalidAddress(format!(
                "SSID {} exceeds {}",
                ssid, AX25_SSID_MAX
            )));
        }

        Ok(Self {
            callsign: callsign.to_ascii_uppercase(),
            ssid,
        })
    }

    pub fn callsign(&self) -> &str {
        &self.callsign
    }

    pub fn ssid(&self) -> u8 {
        self.ssid
    }

    /// Encode into the 7-byte address field format
    ///
    /// Each callsign character (space-padded to six) is shifted left by one
    /// bit. The SSID byte carries the reserved bits, the SSID in bits 1-4 and
    /// the extension bit when `last` is set.
    pub fn encode(&self, last: bool) -> [u8; AX25_ADDRESS_LEN] {
        let mut encoded = [b' ' << 1; AX25_ADDRESS_LEN];

        for (slot, byte) in encoded.iter_mut().zip(self.callsign.bytes()) {
            *slot = byte << 1;
        }

        let mut ssid_byte = SSID_RESERVED_BITS | (self.ssid << 1);
        if last {
            ssid_byte |= ADDRESS_EXTENSION_BIT;
        }
        encoded[AX25_CALLSIGN_LEN] = ssid_byte;

        encoded
    }
}

impl FromStr for Address {
    type Err = BeaconError;

    /// Parse `CALL` or `CALL-SSID`
    fn from_str(s: &str) -> Result<Self> {
        match s.split_once('-') {
            Some((callsign, ssid)) => {
                let ssid = ssid.parse::<u8>().map_err(|_| {
                    BeaconError::InvalidAddress(format!("invalid SSID in '{}'", s))
                })?;
                Self::new(callsign, ssid)
            }
            None => Self::new(s, 0),
        }
    }
}

impl fmt::Display for Address {
    /// TNC2 notation; SSID 0 is omitted
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.ssid == 0 {
            write!(f, "{}", self.callsign)
        } else {
            write!(f, "{}-{}", self.callsign, self.ssid)
        }
    }
}
