//! Time window validation for bulk log downloads.
//!
//! Timestamps are accepted only in the exact `YYYY-MM-DDTHH:MM:SSZ` shape.
//! A malformed timestamp with at least 14 digits gets a suggestion rebuilt
//! from those digits (`20240809123456` → `2024-08-09T12:34:56Z`).

use chrono::{DateTime, NaiveDateTime, TimeDelta, Utc};

use crate::logs::LogDownloadError;

/// `chrono` format of a log timestamp.
pub const TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Longest window that can be downloaded at once.
pub const MAX_WINDOW_MINUTES: i64 = 30;

/// Oldest logs kept by the service.
pub const MAX_AGE_DAYS: i64 = 30;

const SHAPE: &[u8; 20] = b"dddd-dd-ddTdd:dd:ddZ";
const SUGGESTION_DIGITS: usize = 14;

/// A validated log window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl LogWindow {
    pub fn start_param(&self) -> String {
        self.start.format(TIME_FORMAT).to_string()
    }

    pub fn end_param(&self) -> String {
        self.end.format(TIME_FORMAT).to_string()
    }
}

/// Parse the value of `flag` as a UTC timestamp.
pub fn parse_timestamp(value: &str, flag: &'static str) -> Result<DateTime<Utc>, LogDownloadError> {
    if !has_timestamp_shape(value) {
        return Err(LogDownloadError::InvalidTimeFormat {
            flag,
            suggestion: suggest_timestamp(value),
        });
    }

    // Right shape, impossible date (month 13, Feb 30).
    NaiveDateTime::parse_from_str(value, TIME_FORMAT)
        .map(|naive| naive.and_utc())
        .map_err(|_| LogDownloadError::InvalidTimeFormat { flag, suggestion: None })
}

/// Rebuild a timestamp from the first 14 digits of `value`.
pub fn suggest_timestamp(value: &str) -> Option<String> {
    let digits: String = value
        .chars()
        .filter(char::is_ascii_digit)
        .take(SUGGESTION_DIGITS)
        .collect();
    if digits.len() < SUGGESTION_DIGITS {
        return None;
    }

    Some(format!(
        "{}-{}-{}T{}:{}:{}Z",
        &digits[0..4],
        &digits[4..6],
        &digits[6..8],
        &digits[8..10],
        &digits[10..12],
        &digits[12..14]
    ))
}

/// Validate `start` and `end` against each other and against `now`.
pub fn validate_window(start: &str, end: &str, now: DateTime<Utc>) -> Result<LogWindow, LogDownloadError> {
    let start = parse_timestamp(start, "startTime")?;
    let end = parse_timestamp(end, "endTime")?;

    if end <= start {
        return Err(LogDownloadError::EndBeforeStart);
    }

    let duration = end - start;
    if duration > TimeDelta::minutes(MAX_WINDOW_MINUTES) {
        let seconds = duration.num_seconds();
        return Err(LogDownloadError::WindowTooLong {
            hours: seconds / 3600,
            minutes: seconds % 3600 / 60,
            seconds: seconds % 60,
        });
    }

    if start < now - TimeDelta::days(MAX_AGE_DAYS) {
        return Err(LogDownloadError::TooOld);
    }

    Ok(LogWindow { start, end })
}

fn has_timestamp_shape(value: &str) -> bool {
    value.len() == SHAPE.len()
        && value.bytes().zip(SHAPE.iter()).all(|(byte, &expected)| match expected {
            b'd' => byte.is_ascii_digit(),
            _ => byte == expected,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(value: &str) -> DateTime<Utc> {
        parse_timestamp(value, "startTime").unwrap()
    }

    fn format(time: DateTime<Utc>) -> String {
        time.format(TIME_FORMAT).to_string()
    }

    #[test]
    fn test_suggestion_from_digits() {
        assert_eq!(suggest_timestamp("20240809123456").as_deref(), Some("2024-08-09T12:34:56Z"));
        assert_eq!(
            suggest_timestamp("2024-08-29:23:45:56Z").as_deref(),
            Some("2024-08-29T23:45:56Z")
        );
        assert_eq!(suggest_timestamp("2024-08-29"), None);
    }

    #[test]
    fn test_invalid_format_message() {
        let err = parse_timestamp("20240809123456", "startTime").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Use the format YYYY-MM-DDTHH:MM:SSZ for startTime. Did you mean 2024-08-09T12:34:56Z?"
        );

        let err = parse_timestamp("yesterday", "endTime").unwrap_err();
        assert_eq!(err.to_string(), "Use the format YYYY-MM-DDTHH:MM:SSZ for endTime.");
    }

    #[test]
    fn test_shape_is_strict() {
        assert!(parse_timestamp("2024-08-29T23:45:56Z", "startTime").is_ok());
        assert!(parse_timestamp("2024-08-29T23:45:56", "startTime").is_err());
        assert!(parse_timestamp("2024-8-29T23:45:56Z", "startTime").is_err());
        assert!(parse_timestamp("2024-08-29 23:45:56Z", "startTime").is_err());
        assert!(parse_timestamp("2024-13-29T23:45:56Z", "startTime").is_err());
    }

    #[test]
    fn test_end_must_follow_start() {
        let now = ts("2024-08-29T13:00:00Z");
        let err = validate_window("2024-08-29T12:30:00Z", "2024-08-29T12:00:00Z", now).unwrap_err();
        assert_eq!(err.to_string(), "endTime must be later than startTime.");

        let err = validate_window("2024-08-29T12:30:00Z", "2024-08-29T12:30:00Z", now).unwrap_err();
        assert!(matches!(err, LogDownloadError::EndBeforeStart));
    }

    #[test]
    fn test_window_too_long() {
        let now = ts("2024-08-29T23:00:00Z");
        let err = validate_window("2024-08-29T12:00:00Z", "2024-08-29T12:45:00Z", now).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Max duration between startTime and endTime should be 30 minutes. \
             Current duration is 0 hours 45 minutes and 0 seconds."
        );

        let err = validate_window("2024-08-29T10:00:00Z", "2024-08-29T12:15:30Z", now).unwrap_err();
        assert!(err.to_string().ends_with("Current duration is 2 hours 15 minutes and 30 seconds."));
    }

    #[test]
    fn test_thirty_minutes_is_allowed() {
        let now = ts("2024-08-29T23:00:00Z");
        let window = validate_window("2024-08-29T12:00:00Z", "2024-08-29T12:30:00Z", now).unwrap();
        assert_eq!(window.start_param(), "2024-08-29T12:00:00Z");
        assert_eq!(window.end_param(), "2024-08-29T12:30:00Z");
    }

    #[test]
    fn test_too_old() {
        let now = Utc::now();
        let start = now - TimeDelta::days(31);
        let end = start + TimeDelta::minutes(10);

        let err = validate_window(&format(start), &format(end), now).unwrap_err();
        assert_eq!(err.to_string(), "Cannot get logs more than 30 days old. Adjust your time range.");

        let start = now - TimeDelta::days(29);
        let end = start + TimeDelta::minutes(10);
        assert!(validate_window(&format(start), &format(end), now).is_ok());
    }
}
