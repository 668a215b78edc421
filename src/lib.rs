//! # APRS Beacon Library
//!
//! Encode GPS fixes as APRS position reports and beacon them over a radio.
//!
//! This library provides the position report encoder (degree-minute fields,
//! the `!DAO!` precision extension, course/speed and altitude), AX.25/KISS
//! and LoRa APRS framing, and the periodic beacon service around them.

pub mod config;
pub mod error;
pub mod aprs;
pub mod ax25;
pub mod beacon;
pub mod gps;
pub mod radio;
pub mod telemetry;
