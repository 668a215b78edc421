//! # APRS Module
//!
//! APRS position report encoding.
//!
//! This module handles:
//! - Degree-minute latitude/longitude fields with overflow-safe rounding
//! - The `!DAO!` high-precision extension (base91)
//! - Course/speed and altitude fields
//! - Assembling the position report body and its TNC2 message form

pub mod protocol;
pub mod encoder;
pub mod message;
pub mod timestamp;
