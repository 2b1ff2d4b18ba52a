//! Time types for calendar queries.
//!
//! This module provides [`TimeRange`] for bounding CalDAV `calendar-query`
//! filters, plus helpers for the compact UTC form iCalendar uses in
//! `time-range` attributes (`20240101T120000Z`).

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// strftime pattern for iCalendar UTC date-times.
const ICAL_UTC_FORMAT: &str = "%Y%m%dT%H%M%SZ";

/// A time range for querying calendar events.
///
/// The lower bound is inclusive. The upper bound is optional; without it the
/// range is open-ended and matches everything starting at or after `start`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    /// Start of the range (inclusive).
    pub start: DateTime<Utc>,
    /// End of the range, if bounded.
    pub end: Option<DateTime<Utc>>,
}

impl TimeRange {
    /// Creates an open-ended range starting at `start`.
    pub fn starting_at(start: DateTime<Utc>) -> Self {
        Self { start, end: None }
    }

    /// Creates a bounded range.
    ///
    /// Returns `None` if `start` is after `end`.
    pub fn between(start: DateTime<Utc>, end: DateTime<Utc>) -> Option<Self> {
        (start <= end).then_some(Self {
            start,
            end: Some(end),
        })
    }

    /// The start formatted for a CalDAV `time-range` attribute.
    pub fn ical_start(&self) -> String {
        format_ical_utc(self.start)
    }

    /// The end formatted for a CalDAV `time-range` attribute, if bounded.
    pub fn ical_end(&self) -> Option<String> {
        self.end.map(format_ical_utc)
    }
}

/// Formats a datetime in iCalendar UTC form (`YYYYMMDDTHHMMSSZ`).
pub fn format_ical_utc(dt: DateTime<Utc>) -> String {
    dt.format(ICAL_UTC_FORMAT).to_string()
}

/// Parses an iCalendar UTC date-time (`YYYYMMDDTHHMMSSZ`).
pub fn parse_ical_utc(s: &str) -> Option<DateTime<Utc>> {
    let naive = s.trim().strip_suffix('Z')?;
    let dt = NaiveDateTime::parse_from_str(naive, "%Y%m%dT%H%M%S").ok()?;
    Some(Utc.from_utc_datetime(&dt))
}

/// Parses a user-supplied timestamp.
///
/// Accepts RFC 3339 (`2024-01-01T12:00:00+01:00`) or iCalendar UTC form.
pub fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s.trim())
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
        .or_else(|| parse_ical_utc(s))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utc(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, s).unwrap()
    }

    #[test]
    fn format_datetime_for_icalendar() {
        assert_eq!(
            format_ical_utc(utc(2025, 2, 5, 14, 30, 0)),
            "20250205T143000Z"
        );
    }

    #[test]
    fn parse_ical_utc_roundtrip() {
        let dt = utc(2014, 6, 17, 11, 20, 33);
        assert_eq!(parse_ical_utc("20140617T112033Z"), Some(dt));
    }

    #[test]
    fn parse_ical_utc_requires_z_suffix() {
        assert_eq!(parse_ical_utc("20140617T112033"), None);
        assert_eq!(parse_ical_utc("20140617"), None);
    }

    #[test]
    fn parse_timestamp_accepts_rfc3339() {
        let parsed = parse_timestamp("2024-01-01T13:00:00+01:00").unwrap();
        assert_eq!(parsed, utc(2024, 1, 1, 12, 0, 0));
    }

    #[test]
    fn parse_timestamp_accepts_ical_form() {
        let parsed = parse_timestamp("20240101T120000Z").unwrap();
        assert_eq!(parsed, utc(2024, 1, 1, 12, 0, 0));
    }

    #[test]
    fn parse_timestamp_rejects_garbage() {
        assert!(parse_timestamp("next tuesday").is_none());
    }

    #[test]
    fn open_range_has_no_end() {
        let range = TimeRange::starting_at(utc(2024, 1, 1, 0, 0, 0));
        assert_eq!(range.end, None);
        assert_eq!(range.ical_start(), "20240101T000000Z");
        assert_eq!(range.ical_end(), None);
    }

    #[test]
    fn bounded_range_formats_both_ends() {
        let range =
            TimeRange::between(utc(2024, 1, 1, 0, 0, 0), utc(2024, 1, 2, 0, 0, 0)).unwrap();
        assert_eq!(range.ical_start(), "20240101T000000Z");
        assert_eq!(range.ical_end().as_deref(), Some("20240102T000000Z"));
    }

    #[test]
    fn inverted_range_is_rejected() {
        assert!(TimeRange::between(utc(2024, 1, 2, 0, 0, 0), utc(2024, 1, 1, 0, 0, 0)).is_none());
    }

    #[test]
    fn time_range_serialization() {
        let range = TimeRange::starting_at(utc(2024, 1, 1, 0, 0, 0));
        let json = serde_json::to_string(&range).unwrap();
        let back: TimeRange = serde_json::from_str(&json).unwrap();
        assert_eq!(range, back);
    }
}
