//! Core types: time ranges, iCalendar timestamps, tracing setup

pub mod time;
pub mod tracing;

pub use time::{TimeRange, format_ical_utc, parse_ical_utc, parse_timestamp};
pub use tracing::{TracingConfig, TracingError, TracingOutputFormat, init_tracing};
