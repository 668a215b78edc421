//! # Configuration Module
//!
//! Handles loading and validating configuration from TOML files.

use serde::de::Error;
use serde::Deserialize;
use std::fmt::Display;
use std::fs;
use std::path::Path;

use crate::aprs::protocol::{Precision, DEFAULT_DESTINATION, DEFAULT_OVERLAY, DEFAULT_SYMBOL};
use crate::ax25::Address;
use crate::error::{BeaconError, Result};

/// Default configuration file location
pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// Main configuration structure
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub station: StationConfig,
    pub radio: RadioConfig,
    #[serde(default)]
    pub gps: GpsConfig,
    pub beacon: BeaconConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Station identity and map symbol
#[derive(Debug, Deserialize, Clone)]
pub struct StationConfig {
    pub callsign: String,

    #[serde(default)]
    pub ssid: u8,

    #[serde(default = "default_destination")]
    pub destination: String,

    #[serde(default = "default_symbol")]
    pub symbol: char,

    #[serde(default = "default_overlay")]
    pub overlay: char,
}

/// Serial radio configuration
#[derive(Debug, Deserialize, Clone)]
pub struct RadioConfig {
    #[serde(default = "default_radio_port")]
    pub port: String,

    #[serde(default = "default_baud_rate")]
    pub baud_rate: u32,

    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    #[serde(default = "default_reconnect_interval_ms")]
    pub reconnect_interval_ms: u64,

    #[serde(default = "default_max_open_attempts")]
    pub max_open_attempts: u32,

    /// Transmit frequency in MHz
    ///
    /// Informational only: tune the radio itself. The value is checked
    /// against the APRS bands and logged at startup.
    #[serde(default = "default_frequency_mhz")]
    pub frequency_mhz: f64,
}

/// GPS fix feed configuration
#[derive(Debug, Deserialize, Clone)]
pub struct GpsConfig {
    /// `-` for stdin, otherwise a file path
    #[serde(default = "default_gps_feed")]
    pub feed: String,
}

/// How the position report is framed for the radio
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Framing {
    /// TNC2 text line
    Text,
    /// LoRa APRS header + TNC2 text line
    #[default]
    Lora,
    /// AX.25 UI frame with FCS
    Ax25,
    /// AX.25 UI frame in a KISS data frame
    Kiss,
}

/// Beacon behaviour
#[derive(Debug, Deserialize, Clone)]
pub struct BeaconConfig {
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,

    #[serde(default)]
    pub framing: Framing,

    /// Send DAO-precision coordinates and the `!wXY!` token
    #[serde(default)]
    pub dao: bool,

    /// Static text appended to every report
    #[serde(default)]
    pub comment: String,
}

impl BeaconConfig {
    pub fn precision(&self) -> Precision {
        if self.dao {
            Precision::Dao
        } else {
            Precision::Standard
        }
    }
}

/// Log output configuration
#[derive(Debug, Deserialize, Clone, Default)]
pub struct LoggingConfig {
    /// Directory for daily rolling log files; stdout only when unset
    #[serde(default)]
    pub dir: Option<String>,
}

impl Default for GpsConfig {
    fn default() -> Self {
        Self {
            feed: default_gps_feed(),
        }
    }
}

// Default value functions
fn default_destination() -> String { DEFAULT_DESTINATION.to_string() }
fn default_symbol() -> char { DEFAULT_SYMBOL }
fn default_overlay() -> char { DEFAULT_OVERLAY }

fn default_radio_port() -> String { "/dev/ttyUSB0".to_string() }
fn default_baud_rate() -> u32 { 9600 }
fn default_timeout_ms() -> u64 { 1000 }
fn default_reconnect_interval_ms() -> u64 { 2000 }
fn default_max_open_attempts() -> u32 { 5 }
fn default_frequency_mhz() -> f64 { 443.775 }

fn default_gps_feed() -> String { "-".to_string() }

fn default_interval_ms() -> u64 { 5000 }

/// Supported serial baud rates
const BAUD_RATES: &[u32] = &[1200, 4800, 9600, 19200, 38400, 57600, 115200];

/// Amateur bands APRS is operated on (MHz)
const APRS_BANDS_MHZ: &[(f64, f64)] = &[(144.0, 148.0), (420.0, 450.0)];

/// Build a configuration error
fn invalid(msg: impl Display) -> BeaconError {
    BeaconError::Config(toml::de::Error::custom(msg))
}

fn is_printable_ascii(c: char) -> bool {
    c.is_ascii_graphic()
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - File cannot be read
    /// - TOML parsing fails
    /// - Validation fails
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use aprs_beacon::config::Config;
    ///
    /// let config = Config::load("config/default.toml")?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Source address built from callsign and SSID
    pub fn source_address(&self) -> Result<Address> {
        Address::new(&self.station.callsign, self.station.ssid)
    }

    /// Destination (tocall) address
    pub fn destination_address(&self) -> Result<Address> {
        self.station.destination.parse()
    }

    /// Validate configuration values
    ///
    /// # Errors
    ///
    /// Returns error if any configuration value is out of valid range
    pub fn validate(&self) -> Result<()> {
        // Station
        self.source_address()?;
        self.destination_address()?;

        if !is_printable_ascii(self.station.symbol) {
            return Err(invalid("symbol must be a printable ASCII character"));
        }

        if !is_printable_ascii(self.station.overlay) {
            return Err(invalid("overlay must be a printable ASCII character"));
        }

        // Radio
        if self.radio.port.is_empty() {
            return Err(invalid("radio port cannot be empty"));
        }

        if !BAUD_RATES.contains(&self.radio.baud_rate) {
            return Err(invalid(format!(
                "baud_rate must be one of: {}",
                BAUD_RATES.iter().map(u32::to_string).collect::<Vec<_>>().join(", ")
            )));
        }

        if self.radio.timeout_ms == 0 || self.radio.timeout_ms > 10000 {
            return Err(invalid("timeout_ms must be between 1 and 10000"));
        }

        if self.radio.reconnect_interval_ms == 0 || self.radio.reconnect_interval_ms > 60000 {
            return Err(invalid("reconnect_interval_ms must be between 1 and 60000"));
        }

        if self.radio.max_open_attempts == 0 {
            return Err(invalid("max_open_attempts must be greater than 0"));
        }

        let frequency = self.radio.frequency_mhz;
        if !APRS_BANDS_MHZ.iter().any(|&(low, high)| frequency >= low && frequency <= high) {
            return Err(invalid("frequency_mhz must be within 144-148 or 420-450 MHz"));
        }

        // GPS
        if self.gps.feed.is_empty() {
            return Err(invalid("gps feed cannot be empty (use \"-\" for stdin)"));
        }

        // Beacon
        if self.beacon.interval_ms < 1000 || self.beacon.interval_ms > 3_600_000 {
            return Err(invalid("interval_ms must be between 1000 and 3600000"));
        }

        if self.beacon.comment.contains(|c| c == '\r' || c == '\n') {
            return Err(invalid("comment cannot contain line breaks"));
        }

        if let Some(dir) = &self.logging.dir {
            if dir.is_empty() {
                return Err(invalid("logging dir cannot be empty when set"));
            }
        }

        Ok(())
    }
}
