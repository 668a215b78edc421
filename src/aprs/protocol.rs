//! # APRS Protocol Constants and Types
//!
//! Core definitions for APRS position reports without timestamp (`!` data type).

/// Data type identifier for a position report without timestamp
pub const APRS_POSITION_NO_TIMESTAMP: char = '!';

/// Altitude range representable by the `/A=` comment token (feet)
pub const APRS_ALTITUDE_MIN_FEET: i32 = -99_999;
pub const APRS_ALTITUDE_MAX_FEET: i32 = 999_999;

/// Speed range of the course/speed extension (knots)
pub const APRS_SPEED_MAX_KNOTS: i32 = 999;

/// Course range of the course/speed extension (degrees).
/// APRS reserves 000 for "no course", so a heading of 0 is sent as 360.
pub const APRS_COURSE_MAX_DEGREES: i32 = 360;

/// One degree expressed in hundred-thousandths of a minute (60.00000')
pub const MINUTES_PER_DEGREE_SCALED: u32 = 6_000_000;

/// First printable character of the base91 alphabet (`!`)
pub const BASE91_OFFSET: u8 = 33;

/// Datum byte of the `!DAO!` extension: `w` = WGS84, base91 encoded
pub const DAO_DATUM_WGS84_BASE91: char = 'w';

/// Default APRS destination (tocall) of the beacon
pub const DEFAULT_DESTINATION: &str = "APLT00";

/// Default symbol and overlay; this combination is a rocket
pub const DEFAULT_SYMBOL: char = 'O';
pub const DEFAULT_OVERLAY: char = '/';

/// Billionths of a degree in one whole degree
const BILLIONTHS_PER_DEGREE: u64 = 1_000_000_000;

/// Minute rendering mode of the minute precision encoder
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MinuteMode {
    /// `MM.mm`, rounded at the second fractional digit
    Low,
    /// `MM.mm`, rounded at the fourth fractional digit (digits 3-4 go to DAO)
    High,
    /// Single base91 character carrying fractional digits 3-4
    Base91,
}

/// Coordinate precision of a position report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Precision {
    /// Plain APRS position, minutes rounded to two decimals
    #[default]
    Standard,
    /// Minutes rounded at four decimals; paired with a `!wXY!` token
    Dao,
}

impl Precision {
    /// Minute mode used for the human-readable coordinate fields
    pub fn minute_mode(self) -> MinuteMode {
        match self {
            Precision::Standard => MinuteMode::Low,
            Precision::Dao => MinuteMode::High,
        }
    }
}

/// Coordinate as delivered by the GPS receiver: whole degrees, the
/// fractional part in billionths of a degree and the hemisphere sign
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RawCoordinate {
    /// Whole degrees (0-90 for latitude, 0-180 for longitude)
    pub degrees: u16,

    /// Fractional degree in billionths (0-999,999,999)
    pub subdegree_billionths: u32,

    /// South or West
    pub negative: bool,
}

impl RawCoordinate {
    pub fn new(degrees: u16, subdegree_billionths: u32, negative: bool) -> Self {
        Self {
            degrees,
            subdegree_billionths,
            negative,
        }
    }

    /// Split signed decimal degrees into a raw coordinate
    ///
    /// Whole degrees are truncated and the remainder is rounded to the
    /// nearest billionth. Non-finite input yields the zero coordinate.
    ///
    /// # Examples
    ///
    /// ```
    /// use aprs_beacon::aprs::protocol::RawCoordinate;
    ///
    /// let lat = RawCoordinate::from_degrees(-33.5);
    /// assert_eq!(lat, RawCoordinate::new(33, 500_000_000, true));
    /// ```
    pub fn from_degrees(value: f64) -> Self {
        if !value.is_finite() {
            return Self::default();
        }

        let magnitude = value.abs();
        let mut degrees = magnitude.trunc() as u64;
        let mut billionths = ((magnitude - magnitude.trunc()) * BILLIONTHS_PER_DEGREE as f64).round() as u64;

        // 0.9999999996 rounds up to a full degree
        if billionths >= BILLIONTHS_PER_DEGREE {
            degrees += 1;
            billionths = 0;
        }

        Self {
            degrees: degrees.min(u16::MAX as u64) as u16,
            subdegree_billionths: billionths as u32,
            negative: value < 0.0,
        }
    }
}

/// One position report, built per transmit cycle from a GPS fix snapshot
///
/// Numeric fields carry the receiver's values as-is; clamping to the
/// protocol ranges happens when the report is assembled.
#[derive(Debug, Clone, PartialEq)]
pub struct PositionReport {
    pub latitude: RawCoordinate,
    pub longitude: RawCoordinate,

    /// Altitude in feet
    pub altitude_feet: i32,

    /// Ground speed in knots
    pub speed_knots: i32,

    /// Course over ground in degrees
    pub course_degrees: i32,

    /// Symbol code
    pub symbol: char,

    /// Symbol table identifier / overlay
    pub overlay: char,

    /// Free text appended after the altitude token
    pub comment: String,
}
