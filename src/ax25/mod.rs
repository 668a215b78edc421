//! # AX.25 Module
//!
//! Link-layer framing for APRS packets sent over RF.
//!
//! This module handles:
//! - Callsign/SSID address encoding
//! - UI frame construction (control 0x03, PID 0xF0)
//! - CRC-16/X.25 frame check sequence
//! - KISS wrapping for serial TNCs

pub mod address;
pub mod frame;
pub mod crc;
pub mod kiss;

pub use address::Address;
