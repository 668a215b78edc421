//! # APRS Position Encoder
//!
//! Turns raw GPS coordinates and telemetry into APRS position report fields.
//!
//! Every function here is pure: each call returns a freshly owned `String`
//! and nothing is shared between calls, so reports can be encoded from any
//! number of threads.
//!
//! ## Minute arithmetic
//!
//! Sub-degree values arrive in billionths of a degree. Multiplying by
//! `0.006` gives hundred-thousandths of a minute (`MMmmmmm`), which is the
//! unit all rounding below operates on:
//!
//! ```text
//! 566_688_333 billionths  ->  3_400_129  ->  34.00129'
//! ```
//!
//! Rounding never carries into 60.00', so a coordinate of 53°59.999' is
//! written as `5359.99`, never as the invalid `5360.00`.

use super::protocol::*;

/// Left-pad `value` with zeros to at least `width` digits
///
/// Values wider than `width` are written in full, never truncated.
///
/// # Examples
///
/// ```
/// use aprs_beacon::aprs::encoder::pad;
///
/// assert_eq!(pad(45, 3), "045");
/// assert_eq!(pad(1234567, 6), "1234567");
/// ```
pub fn pad(value: u32, width: usize) -> String {
    format!("{:0width$}", value, width = width)
}

/// Convert billionths of a degree to hundred-thousandths of a minute
///
/// Integer form of `billionths * 0.006`, truncated toward zero.
pub fn scaled_minutes(subdegree_billionths: u32) -> u32 {
    (u64::from(subdegree_billionths) * 6 / 1000) as u32
}

/// Round a scaled minute value for the given mode
///
/// `Low` rounds half-up at the second fractional digit, `High` and `Base91`
/// at the fourth. Values whose rounding would reach 60.00' are left as-is.
fn round_scaled_minutes(minutes: u32, mode: MinuteMode) -> u32 {
    let half_step = match mode {
        MinuteMode::Low => 500,
        MinuteMode::High | MinuteMode::Base91 => 5,
    };

    if minutes % (half_step * 2) >= half_step && minutes < MINUTES_PER_DEGREE_SCALED - half_step {
        minutes + half_step
    } else {
        minutes
    }
}

/// Base91 character for fractional minute digits 3-4
///
/// The three trailing digits (0-999) are scaled by 1/11 onto the 91
/// printable characters `!` (33) to `{` (123).
pub fn base91_minutes(subdegree_billionths: u32) -> char {
    let minutes = round_scaled_minutes(scaled_minutes(subdegree_billionths), MinuteMode::Base91);
    char::from(((minutes % 1000) / 11) as u8 + BASE91_OFFSET)
}

/// Encode the minute part of a coordinate
///
/// # Arguments
///
/// * `subdegree_billionths` - Fractional degree in billionths (0-999,999,999)
/// * `mode` - Rendering mode
///
/// # Returns
///
/// * `String` - `"MM.mm"` for `Low`/`High`, a single base91 character for `Base91`
///
/// # Examples
///
/// ```
/// use aprs_beacon::aprs::encoder::encode_minutes;
/// use aprs_beacon::aprs::protocol::MinuteMode;
///
/// assert_eq!(encode_minutes(500_000_000, MinuteMode::Low), "30.00");
/// assert_eq!(encode_minutes(566_688_333, MinuteMode::Base91), "-");
/// ```
pub fn encode_minutes(subdegree_billionths: u32, mode: MinuteMode) -> String {
    if mode == MinuteMode::Base91 {
        return base91_minutes(subdegree_billionths).to_string();
    }

    let minutes = round_scaled_minutes(scaled_minutes(subdegree_billionths), mode);
    format!(
        "{}.{}",
        pad((minutes / 100_000) % 100, 2),
        pad((minutes / 1000) % 100, 2)
    )
}

/// Format a latitude field: `DDMM.mm` followed by `N` or `S`
///
/// # Examples
///
/// ```
/// use aprs_beacon::aprs::encoder::format_latitude;
/// use aprs_beacon::aprs::protocol::{Precision, RawCoordinate};
///
/// let lat = RawCoordinate::new(49, 58_333_333, false);
/// assert_eq!(format_latitude(&lat, Precision::Standard), "4903.50N");
/// ```
pub fn format_latitude(latitude: &RawCoordinate, precision: Precision) -> String {
    let hemisphere = if latitude.negative { 'S' } else { 'N' };
    format!(
        "{}{}{}",
        pad(u32::from(latitude.degrees), 2),
        encode_minutes(latitude.subdegree_billionths, precision.minute_mode()),
        hemisphere
    )
}

/// Format a longitude field: `DDDMM.mm` followed by `E` or `W`
pub fn format_longitude(longitude: &RawCoordinate, precision: Precision) -> String {
    let hemisphere = if longitude.negative { 'W' } else { 'E' };
    format!(
        "{}{}{}",
        pad(u32::from(longitude.degrees), 3),
        encode_minutes(longitude.subdegree_billionths, precision.minute_mode()),
        hemisphere
    )
}

/// Encode the `!DAO!` extension token for a coordinate pair
///
/// Produces `!wXY!` where `X`/`Y` carry minute digits 3-4 of latitude and
/// longitude. Both use the same rounding as [`Precision::Dao`] fields, so
/// the token and the position never disagree.
///
/// See <http://www.aprs.org/aprs12/datum.txt>.
pub fn encode_dao(latitude: &RawCoordinate, longitude: &RawCoordinate) -> String {
    format!(
        "!{}{}{}!",
        DAO_DATUM_WGS84_BASE91,
        base91_minutes(latitude.subdegree_billionths),
        base91_minutes(longitude.subdegree_billionths)
    )
}

/// Clamp course to 1-360; 0 (and anything below) becomes 360
pub fn clamp_course(course_degrees: i32) -> u32 {
    match course_degrees.clamp(0, APRS_COURSE_MAX_DEGREES) {
        0 => APRS_COURSE_MAX_DEGREES as u32,
        course => course as u32,
    }
}

/// Clamp speed to 0-999 knots
pub fn clamp_speed(speed_knots: i32) -> u32 {
    speed_knots.clamp(0, APRS_SPEED_MAX_KNOTS) as u32
}

/// Encode the altitude comment token, `/A=012345` or `/A=-00150`
pub fn encode_altitude(altitude_feet: i32) -> String {
    let altitude = altitude_feet.clamp(APRS_ALTITUDE_MIN_FEET, APRS_ALTITUDE_MAX_FEET);
    if altitude < 0 {
        format!("/A=-{}", pad(altitude.unsigned_abs(), 5))
    } else {
        format!("/A={}", pad(altitude as u32, 6))
    }
}

/// Assemble a standard-precision position report body
///
/// # Examples
///
/// ```
/// use aprs_beacon::aprs::encoder::assemble;
/// use aprs_beacon::aprs::protocol::{PositionReport, RawCoordinate};
///
/// let report = PositionReport {
///     latitude: RawCoordinate::new(49, 58_333_333, false),
///     longitude: RawCoordinate::new(72, 29_166_667, true),
///     altitude_feet: 1234,
///     speed_knots: 45,
///     course_degrees: 123,
///     symbol: 'O',
///     overlay: '/',
///     comment: String::new(),
/// };
/// assert_eq!(assemble(&report), "!4903.50N/07201.75WO123/045/A=001234");
/// ```
pub fn assemble(report: &PositionReport) -> String {
    assemble_with_precision(report, Precision::Standard)
}

/// Assemble a position report body at the given precision
///
/// Layout: `!` lat overlay lng symbol course `/` speed altitude comment.
/// With [`Precision::Dao`] the `!wXY!` token is appended after the comment.
pub fn assemble_with_precision(report: &PositionReport, precision: Precision) -> String {
    let mut body = String::with_capacity(64 + report.comment.len());

    body.push(APRS_POSITION_NO_TIMESTAMP);
    body.push_str(&format_latitude(&report.latitude, precision));
    body.push(report.overlay);
    body.push_str(&format_longitude(&report.longitude, precision));
    body.push(report.symbol);
    body.push_str(&pad(clamp_course(report.course_degrees), 3));
    body.push('/');
    body.push_str(&pad(clamp_speed(report.speed_knots), 3));
    body.push_str(&encode_altitude(report.altitude_feet));
    body.push_str(&report.comment);

    if precision == Precision::Dao {
        body.push_str(&encode_dao(&report.latitude, &report.longitude));
    }

    body
}
