//! Output rendering for command results.

use calfetch_dav::{EventRecord, ResourceEntry};

use crate::error::{ClientError, ClientResult};

/// Renders collections, one `name<TAB>href` line each, or as a JSON array.
pub fn render_collections(entries: &[ResourceEntry], json: bool) -> ClientResult<String> {
    if json {
        return to_json(entries);
    }
    Ok(entries
        .iter()
        .map(|entry| format!("{}\t{}\n", entry.display_name, entry.href))
        .collect())
}

/// Renders events as `KEY: value` blocks separated by blank lines, or as a
/// JSON array of flat objects.
pub fn render_events(events: &[EventRecord], json: bool) -> ClientResult<String> {
    if json {
        return to_json(events);
    }
    let blocks: Vec<String> = events
        .iter()
        .map(|event| {
            event
                .iter()
                .map(|(key, value)| format!("{}: {}\n", key, value))
                .collect()
        })
        .collect();
    Ok(blocks.join("\n"))
}

fn to_json<T: serde::Serialize + ?Sized>(value: &T) -> ClientResult<String> {
    serde_json::to_string_pretty(value)
        .map(|mut s| {
            s.push('\n');
            s
        })
        .map_err(|e| ClientError::Io(std::io::Error::other(e)))
}
