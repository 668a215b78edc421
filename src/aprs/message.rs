//! # TNC2 Messages
//!
//! The `SRC>DEST:body` text form of an APRS packet, as used on APRS-IS and
//! by LoRa APRS trackers.

use std::fmt;

use crate::ax25::Address;

/// Header prepended to LoRa APRS packets (`<`, 0xFF, 0x01)
pub const LORA_APRS_HEADER: [u8; 3] = [b'<', 0xFF, 0x01];

/// Addressed APRS packet in TNC2 notation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AprsMessage {
    pub source: Address,
    pub destination: Address,
    pub body: String,
}

impl AprsMessage {
    pub fn new(source: Address, destination: Address, body: String) -> Self {
        Self {
            source,
            destination,
            body,
        }
    }

    /// Encode as a LoRa APRS packet: header followed by the TNC2 line
    pub fn encode_lora(&self) -> Vec<u8> {
        let line = self.to_string();
        let mut packet = Vec::with_capacity(LORA_APRS_HEADER.len() + line.len());
        packet.extend_from_slice(&LORA_APRS_HEADER);
        packet.extend_from_slice(line.as_bytes());
        packet
    }
}

impl fmt::Display for AprsMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}>{}:{}", self.source, self.destination, self.body)
    }
}
