//! # GPS Module
//!
//! GPS receiver interface and a JSON-lines fix feed.
//!
//! This module handles:
//! - The `GpsReceiver` seam the beacon reads positions through
//! - Fix snapshots (`GpsFix`) decoded from JSON Lines
//! - Tracking whether a new fix arrived since the last transmission

use chrono::{DateTime, Utc};
use serde::Deserialize;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, Lines};
use tracing::{debug, warn};

use crate::aprs::protocol::RawCoordinate;
use crate::error::Result;
use crate::telemetry::BatteryTelemetry;

/// Feet per meter, as used by common NMEA decoders
pub const FEET_PER_METER: f64 = 3.2808399;

/// Position source the beacon reads from
#[cfg_attr(test, mockall::automock)]
pub trait GpsReceiver {
    fn raw_latitude(&self) -> RawCoordinate;
    fn raw_longitude(&self) -> RawCoordinate;
    fn altitude_feet(&self) -> f64;
    fn speed_knots(&self) -> f64;
    fn course_degrees(&self) -> f64;

    /// A fix arrived since the last transmission
    fn fix_updated(&self) -> bool;

    /// Satellites in use, if the receiver reports it
    fn satellite_count(&self) -> Option<u32>;
}

/// One GPS fix snapshot
///
/// ```json
/// {"latitude": 49.058333, "longitude": -72.029167, "altitude_m": 376.1,
///  "speed_knots": 45.0, "course_degrees": 123.0, "satellites": 9}
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GpsFix {
    /// Latitude in decimal degrees, negative south
    pub latitude: f64,

    /// Longitude in decimal degrees, negative west
    pub longitude: f64,

    #[serde(default)]
    pub altitude_m: f64,

    #[serde(default)]
    pub speed_knots: f64,

    #[serde(default)]
    pub course_degrees: f64,

    #[serde(default)]
    pub satellites: Option<u32>,

    /// UTC time of the fix
    #[serde(default)]
    pub time: Option<DateTime<Utc>>,

    #[serde(default)]
    pub battery_volts: Option<f32>,

    #[serde(default)]
    pub current_ma: Option<u32>,
}

impl GpsFix {
    /// Battery telemetry, present when the record carries a voltage
    pub fn battery(&self) -> Option<BatteryTelemetry> {
        self.battery_volts
            .map(|volts| BatteryTelemetry::new(volts, self.current_ma.unwrap_or(0)))
    }
}

impl GpsReceiver for GpsFix {
    fn raw_latitude(&self) -> RawCoordinate {
        RawCoordinate::from_degrees(self.latitude)
    }

    fn raw_longitude(&self) -> RawCoordinate {
        RawCoordinate::from_degrees(self.longitude)
    }

    fn altitude_feet(&self) -> f64 {
        self.altitude_m * FEET_PER_METER
    }

    fn speed_knots(&self) -> f64 {
        self.speed_knots
    }

    fn course_degrees(&self) -> f64 {
        self.course_degrees
    }

    fn fix_updated(&self) -> bool {
        true
    }

    fn satellite_count(&self) -> Option<u32> {
        self.satellites
    }
}

/// Parse a single JSON fix record
pub fn parse_fix(line: &str) -> Result<GpsFix> {
    Ok(serde_json::from_str(line)?)
}

/// Latest fix plus the "updated since last transmission" flag
#[derive(Debug, Clone, Default)]
pub struct FixTracker {
    latest: Option<GpsFix>,
    updated: bool,
}

impl FixTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a new fix and mark it as not yet transmitted
    pub fn update(&mut self, fix: GpsFix) {
        self.latest = Some(fix);
        self.updated = true;
    }

    pub fn latest(&self) -> Option<&GpsFix> {
        self.latest.as_ref()
    }

    /// Mark the current fix as transmitted
    pub fn clear_updated(&mut self) {
        self.updated = false;
    }
}

impl GpsReceiver for FixTracker {
    fn raw_latitude(&self) -> RawCoordinate {
        self.latest.as_ref().map(GpsFix::raw_latitude).unwrap_or_default()
    }

    fn raw_longitude(&self) -> RawCoordinate {
        self.latest.as_ref().map(GpsFix::raw_longitude).unwrap_or_default()
    }

    fn altitude_feet(&self) -> f64 {
        self.latest.as_ref().map_or(0.0, GpsFix::altitude_feet)
    }

    fn speed_knots(&self) -> f64 {
        self.latest.as_ref().map_or(0.0, |fix| fix.speed_knots)
    }

    fn course_degrees(&self) -> f64 {
        self.latest.as_ref().map_or(0.0, |fix| fix.course_degrees)
    }

    fn fix_updated(&self) -> bool {
        self.updated && self.latest.is_some()
    }

    fn satellite_count(&self) -> Option<u32> {
        self.latest.as_ref().and_then(|fix| fix.satellites)
    }
}

/// Reads GPS fixes, one JSON object per line
pub struct FixFeed<R> {
    lines: Lines<R>,
}

impl<R: AsyncBufRead + Unpin> FixFeed<R> {
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
        }
    }

    /// Next valid fix, or `None` at end of input
    ///
    /// Blank lines are skipped; malformed records are logged and skipped.
    /// Cancel-safe: dropping the future never loses a complete line.
    ///
    /// # Errors
    ///
    /// Returns error if the underlying reader fails
    pub async fn next_fix(&mut self) -> Result<Option<GpsFix>> {
        while let Some(line) = self.lines.next_line().await? {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            match parse_fix(line) {
                Ok(fix) => {
                    debug!("Received fix: {:.6}, {:.6}", fix.latitude, fix.longitude);
                    return Ok(Some(fix));
                }
                Err(e) => {
                    warn!("Skipping malformed fix record: {}", e);
                    continue;
                }
            }
        }

        Ok(None)
    }
}

impl<R> std::fmt::Debug for FixFeed<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FixFeed").finish_non_exhaustive()
    }
}
