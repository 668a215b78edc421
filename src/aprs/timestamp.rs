//! # Timestamp Formatting
//!
//! Human-readable date and time strings for fix timestamps.

use chrono::{Datelike, Timelike};

use super::encoder::pad;

/// Format a calendar date as `DD.MM.YYYY`
///
/// # Examples
///
/// ```
/// use aprs_beacon::aprs::timestamp::format_date;
/// use chrono::NaiveDate;
///
/// let date = NaiveDate::from_ymd_opt(2024, 3, 7).unwrap();
/// assert_eq!(format_date(&date), "07.03.2024");
/// ```
pub fn format_date<T: Datelike>(time: &T) -> String {
    format!(
        "{}.{}.{}",
        pad(time.day(), 2),
        pad(time.month(), 2),
        pad(time.year().max(0) as u32, 4)
    )
}

/// Format a time of day as `HH:MM:SS`
pub fn format_time<T: Timelike>(time: &T) -> String {
    format!(
        "{}:{}:{}",
        pad(time.hour(), 2),
        pad(time.minute(), 2),
        pad(time.second(), 2)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone, Utc};

    #[test]
    fn test_format_date() {
        let date = NaiveDate::from_ymd_opt(2026, 10, 15).unwrap();
        assert_eq!(format_date(&date), "15.10.2026");
    }

    #[test]
    fn test_format_date_pads_year() {
        let date = NaiveDate::from_ymd_opt(812, 1, 2).unwrap();
        assert_eq!(format_date(&date), "02.01.0812");
    }

    #[test]
    fn test_format_time() {
        let time = Utc.with_ymd_and_hms(2026, 10, 15, 7, 5, 9).unwrap();
        assert_eq!(format_time(&time), "07:05:09");
        assert_eq!(format_date(&time), "15.10.2026");
    }

    #[test]
    fn test_format_time_end_of_day() {
        let time = Utc.with_ymd_and_hms(1999, 12, 31, 23, 59, 59).unwrap();
        assert_eq!(format_time(&time), "23:59:59");
    }
}
