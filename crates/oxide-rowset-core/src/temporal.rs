//! Date and time text parsing.
//!
//! Each parser tries the ISO form first, then the common formats in
//! order: full date-time, compact date-time, date only.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

/// Date-time formats tried after the ISO fast path.
pub const DATE_TIME_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M:%S", "%Y%m%d %H%M%S", "%Y%m%d%H%M%S"];

/// Date-only formats, tried last.
pub const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%Y%m%d"];

/// Anchor date for times promoted to a date or timestamp.
#[must_use]
pub fn epoch() -> NaiveDate {
    NaiveDate::default()
}

/// Parses a timestamp.
#[must_use]
pub fn parse_timestamp(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();
    ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"]
        .iter()
        .chain(DATE_TIME_FORMATS.iter())
        .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|format| NaiveDate::parse_from_str(text, format).ok())
                .map(|date| date.and_time(NaiveTime::MIN))
        })
}

/// Parses a date. Date-time text is truncated to its date.
#[must_use]
pub fn parse_date(text: &str) -> Option<NaiveDate> {
    let trimmed = text.trim();
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .or_else(|| parse_timestamp(trimmed).map(|ts| ts.date()))
}

/// Parses a time of day. Date-time text keeps its time part.
#[must_use]
pub fn parse_time(text: &str) -> Option<NaiveTime> {
    let trimmed = text.trim();
    NaiveTime::parse_from_str(trimmed, "%H:%M:%S%.f")
        .ok()
        .or_else(|| parse_timestamp(trimmed).map(|ts| ts.time()))
}
