//! # Error Types
//!
//! Custom error types for the APRS beacon using `thiserror`.
//!
//! The encoding core never fails; errors only come from configuration,
//! addressing, the GPS fix feed and the radio transport.

use thiserror::Error;

/// Main error type for the APRS beacon
#[derive(Debug, Error)]
pub enum BeaconError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serial port errors
    #[error("Serial error: {0}")]
    Serial(String),

    /// None of the candidate serial devices could be opened
    #[error("No serial device found (tried: {0})")]
    SerialPortNotFound(String),

    /// Malformed callsign or SSID
    #[error("Invalid AX.25 address: {0}")]
    InvalidAddress(String),

    /// Malformed GPS fix record
    #[error("Fix feed error: {0}")]
    FixFeed(#[from] serde_json::Error),

    /// Radio transmit failures
    #[error("Radio error: {0}")]
    Radio(String),
}

/// Result type alias for the APRS beacon
pub type Result<T> = std::result::Result<T, BeaconError>;
