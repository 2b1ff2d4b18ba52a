//! Line-based `VEVENT` extraction.
//!
//! This is not an RFC 5545 parser. Each `BEGIN:VEVENT` …
//! `END:VEVENT` block becomes a flat map from property name to raw value.
//!
//! Known limitations:
//! - folded continuation lines are not unfolded,
//! - property parameters stay part of the key (`DTSTART;TZID=Europe/Paris`),
//! - escaped characters are not unescaped,
//! - a value is cut at its first colon, so `URL:https://example.com` yields
//!   `https` as the value,
//! - any line containing `BEGIN:` or `END:` is skipped, even inside a value,
//! - a trailing `\r` is stripped, so `SUMMARY:\r\n` counts as empty.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use tracing::trace;

static VEVENT_BLOCK_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)BEGIN:VEVENT.*?END:VEVENT").expect("Invalid VEVENT regex"));

static MARKER_LINE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)BEGIN:|END:").expect("Invalid marker regex"));

/// Properties of one `VEVENT` block, keyed by property name.
///
/// Names are case-sensitive as found in the source; values are raw strings.
/// Serializes as a flat JSON object.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct EventRecord {
    properties: BTreeMap<String, String>,
}

impl EventRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a property, replacing any earlier value for the same name.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.properties.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.properties.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    /// Iterates properties in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.properties
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for EventRecord {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut record = Self::new();
        for (k, v) in iter {
            record.insert(k, v);
        }
        record
    }
}

/// Extracts one [`EventRecord`] per `VEVENT` block in `blob`, in order.
pub fn extract_events(blob: &str) -> Vec<EventRecord> {
    VEVENT_BLOCK_REGEX
        .find_iter(blob)
        .map(|block| parse_block(block.as_str()))
        .collect()
}

/// Extracts events from several blobs, preserving blob then block order.
pub fn extract_all_events<S: AsRef<str>>(blobs: &[S]) -> Vec<EventRecord> {
    blobs
        .iter()
        .flat_map(|blob| extract_events(blob.as_ref()))
        .collect()
}

fn parse_block(block: &str) -> EventRecord {
    let mut record = EventRecord::new();

    for line in block.split('\n') {
        let line = line.strip_suffix('\r').unwrap_or(line);
        if MARKER_LINE_REGEX.is_match(line) {
            continue;
        }

        let mut parts = line.split(':');
        let key = parts.next().unwrap_or_default();
        let value = parts.next().unwrap_or_default();
        if !key.is_empty() && !value.is_empty() {
            record.insert(key, value);
        }
    }

    trace!(properties = record.len(), "Parsed VEVENT block");
    record
}
