//! XML utilities for WebDAV/CalDAV operations.
//!
//! Generates the `PROPFIND` and `REPORT` request bodies and parses the
//! multistatus documents servers answer with. Parsing is namespace-aware:
//! only elements bound to `DAV:` (and `urn:ietf:params:xml:ns:caldav` for
//! `calendar-data`) are matched, whatever prefixes the server picked.

use std::io::Cursor;

use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, Event};
use quick_xml::name::ResolveResult;
use quick_xml::reader::NsReader;
use serde::Serialize;
use tracing::{debug, warn};

use calfetch_core::TimeRange;

use crate::error::{DavError, DavResult};

/// DAV namespace
pub const DAV_NS: &str = "DAV:";
/// CalDAV namespace
pub const CALDAV_NS: &str = "urn:ietf:params:xml:ns:caldav";

/// A collection found by a `PROPFIND` listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceEntry {
    pub display_name: String,
    pub href: String,
}

/// Generates the `PROPFIND` body asking for `displayname` only.
pub fn propfind_displayname_body() -> DavResult<String> {
    let mut body = BodyWriter::new()?;

    // <D:propfind xmlns:D="DAV:">
    let mut propfind = BytesStart::new("D:propfind");
    propfind.push_attribute(("xmlns:D", DAV_NS));
    body.write(Event::Start(propfind))?;

    body.write(Event::Start(BytesStart::new("D:prop")))?;
    body.write(Event::Empty(BytesStart::new("D:displayname")))?;
    body.write(Event::End(BytesEnd::new("D:prop")))?;

    body.write(Event::End(BytesEnd::new("D:propfind")))?;
    body.finish()
}

/// Generates the `REPORT` body for a `calendar-query` over `VEVENT`s.
///
/// The `time-range` always carries `start`; `end` is only emitted when the
/// range is bounded.
pub fn calendar_query_body(range: &TimeRange) -> DavResult<String> {
    let mut body = BodyWriter::new()?;

    // <C:calendar-query xmlns:D="DAV:" xmlns:C="urn:ietf:params:xml:ns:caldav">
    let mut query = BytesStart::new("C:calendar-query");
    query.push_attribute(("xmlns:D", DAV_NS));
    query.push_attribute(("xmlns:C", CALDAV_NS));
    body.write(Event::Start(query))?;

    body.write(Event::Start(BytesStart::new("D:prop")))?;
    body.write(Event::Empty(BytesStart::new("C:calendar-data")))?;
    body.write(Event::End(BytesEnd::new("D:prop")))?;

    body.write(Event::Start(BytesStart::new("C:filter")))?;

    let mut vcal_filter = BytesStart::new("C:comp-filter");
    vcal_filter.push_attribute(("name", "VCALENDAR"));
    body.write(Event::Start(vcal_filter))?;

    let mut vevent_filter = BytesStart::new("C:comp-filter");
    vevent_filter.push_attribute(("name", "VEVENT"));
    body.write(Event::Start(vevent_filter))?;

    // <C:time-range start="..." [end="..."]/>
    let mut time_range = BytesStart::new("C:time-range");
    time_range.push_attribute(("start", range.ical_start().as_str()));
    if let Some(end) = range.ical_end() {
        time_range.push_attribute(("end", end.as_str()));
    }
    body.write(Event::Empty(time_range))?;

    body.write(Event::End(BytesEnd::new("C:comp-filter")))?;
    body.write(Event::End(BytesEnd::new("C:comp-filter")))?;
    body.write(Event::End(BytesEnd::new("C:filter")))?;
    body.write(Event::End(BytesEnd::new("C:calendar-query")))?;
    body.finish()
}

/// Parses a `PROPFIND` multistatus into collection entries.
///
/// One entry per `response` with a non-empty `propstat/prop/displayname`,
/// in document order.
///
/// # Errors
///
/// Returns a [`ResponseParse`](crate::DavErrorCode::ResponseParse) error if
/// the body is not a well-formed `DAV:multistatus` document. No partial
/// result is returned in that case.
pub fn parse_collections(xml: &str) -> DavResult<Vec<ResourceEntry>> {
    let mut entries = Vec::new();
    let mut pending: Option<PendingResponse> = None;

    walk_multistatus(xml, |visit| match visit {
        Visit::Open(path) if at(path, RESPONSE) => pending = Some(PendingResponse::default()),
        Visit::Text(path, text) => {
            if let Some(response) = pending.as_mut() {
                if at(path, RESPONSE_HREF) {
                    response.href.get_or_insert_with(String::new).push_str(text);
                } else if at(path, DISPLAYNAME) {
                    response.display_name.push_str(text);
                }
            }
        }
        Visit::Close(path) if at(path, RESPONSE) => {
            if let Some(entry) = pending.take().and_then(PendingResponse::into_entry) {
                entries.push(entry);
            }
        }
        _ => {}
    })
    .inspect_err(|e| warn!(error = %e, "Failed to parse PROPFIND response"))?;

    debug!(count = entries.len(), "Parsed collection listing");
    Ok(entries)
}

/// Extracts the text of every `response/propstat/prop/calendar-data`.
///
/// # Errors
///
/// Same failure policy as [`parse_collections`].
pub fn extract_calendar_blobs(xml: &str) -> DavResult<Vec<String>> {
    let mut blobs: Vec<String> = Vec::new();

    walk_multistatus(xml, |visit| match visit {
        Visit::Open(path) if at(path, CALENDAR_DATA) => blobs.push(String::new()),
        Visit::Text(path, text) if at(path, CALENDAR_DATA) => {
            if let Some(blob) = blobs.last_mut() {
                blob.push_str(text);
            }
        }
        _ => {}
    })
    .inspect_err(|e| warn!(error = %e, "Failed to parse REPORT response"))?;

    debug!(count = blobs.len(), "Extracted calendar-data blobs");
    Ok(blobs)
}

#[derive(Debug, Default)]
struct PendingResponse {
    href: Option<String>,
    display_name: String,
}

impl PendingResponse {
    fn into_entry(self) -> Option<ResourceEntry> {
        if self.display_name.is_empty() {
            return None;
        }
        match self.href {
            Some(href) => Some(ResourceEntry {
                display_name: self.display_name,
                href,
            }),
            None => {
                warn!(display_name = %self.display_name, "Skipping response without href");
                None
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Ns {
    Dav,
    CalDav,
    Other,
}

#[derive(Debug)]
struct Tag {
    ns: Ns,
    local: String,
}

impl Tag {
    fn new(resolved: &ResolveResult<'_>, local: &[u8]) -> Self {
        let ns = match resolved {
            ResolveResult::Bound(ns) if ns.0 == DAV_NS.as_bytes() => Ns::Dav,
            ResolveResult::Bound(ns) if ns.0 == CALDAV_NS.as_bytes() => Ns::CalDav,
            _ => Ns::Other,
        };
        Self {
            ns,
            local: String::from_utf8_lossy(local).into_owned(),
        }
    }

    fn is(&self, ns: Ns, local: &str) -> bool {
        self.ns == ns && self.local == local
    }
}

/// Element paths relative to the `multistatus` root.
type RelPath = &'static [(Ns, &'static str)];

const RESPONSE: RelPath = &[(Ns::Dav, "response")];
const RESPONSE_HREF: RelPath = &[(Ns::Dav, "response"), (Ns::Dav, "href")];
const DISPLAYNAME: RelPath = &[
    (Ns::Dav, "response"),
    (Ns::Dav, "propstat"),
    (Ns::Dav, "prop"),
    (Ns::Dav, "displayname"),
];
const CALENDAR_DATA: RelPath = &[
    (Ns::Dav, "response"),
    (Ns::Dav, "propstat"),
    (Ns::Dav, "prop"),
    (Ns::CalDav, "calendar-data"),
];

/// Elements whose text is read verbatim, whitespace included.
const TEXT_PATHS: &[RelPath] = &[RESPONSE_HREF, DISPLAYNAME, CALENDAR_DATA];

/// True if `path` (root included) is exactly `root/rel`.
fn at(path: &[Tag], rel: RelPath) -> bool {
    path.len() == rel.len() + 1
        && path[1..]
            .iter()
            .zip(rel)
            .all(|(tag, (ns, local))| tag.is(*ns, local))
}

/// A step of the multistatus walk; each carries the open element path.
enum Visit<'a> {
    Open(&'a [Tag]),
    Text(&'a [Tag], &'a str),
    Close(&'a [Tag]),
}

/// Walks a multistatus document, reporting element opens, text and closes.
///
/// Fails on malformed XML, on a truncated document, and when the root is
/// not `DAV:multistatus`.
fn walk_multistatus<F>(xml: &str, mut visit: F) -> DavResult<()>
where
    F: FnMut(Visit<'_>),
{
    let mut reader = NsReader::from_str(xml);

    let mut path: Vec<Tag> = Vec::new();
    let mut root_seen = false;

    loop {
        let (tag, event) = match reader.read_resolved_event() {
            Ok((resolved, event)) => {
                let tag = match &event {
                    Event::Start(e) | Event::Empty(e) => {
                        Some(Tag::new(&resolved, e.local_name().as_ref()))
                    }
                    _ => None,
                };
                (tag, event)
            }
            Err(e) => return Err(DavError::response_parse("malformed XML").with_source(e)),
        };

        match event {
            Event::Start(_) | Event::Empty(_) => {
                let Some(tag) = tag else { continue };
                if path.is_empty() {
                    check_root(&tag, &mut root_seen)?;
                }
                let self_closing = matches!(event, Event::Empty(_));
                path.push(tag);
                visit(Visit::Open(&path));
                if self_closing {
                    visit(Visit::Close(&path));
                    path.pop();
                }
            }
            Event::End(_) => {
                visit(Visit::Close(&path));
                path.pop();
            }
            Event::Text(e) => {
                let blank = e.iter().all(u8::is_ascii_whitespace);
                if blank && !TEXT_PATHS.iter().any(|&rel| at(&path, rel)) {
                    continue;
                }
                if !path.is_empty() {
                    let text = e.unescape().map_err(|err| {
                        DavError::response_parse("invalid character data").with_source(err)
                    })?;
                    visit(Visit::Text(&path, &text));
                }
            }
            Event::CData(e) => {
                if !path.is_empty() {
                    let text = String::from_utf8_lossy(&e);
                    visit(Visit::Text(&path, &text));
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if let Some(open) = path.last() {
        return Err(DavError::response_parse(format!(
            "document ended inside <{}>",
            open.local
        )));
    }
    if !root_seen {
        return Err(DavError::response_parse("document has no root element"));
    }
    Ok(())
}

fn check_root(tag: &Tag, root_seen: &mut bool) -> DavResult<()> {
    if *root_seen {
        return Err(DavError::response_parse("document has more than one root element"));
    }
    if !tag.is(Ns::Dav, "multistatus") {
        return Err(DavError::response_parse(format!(
            "expected DAV:multistatus root, found <{}>",
            tag.local
        )));
    }
    *root_seen = true;
    Ok(())
}

/// In-memory XML writer for request bodies.
struct BodyWriter {
    writer: Writer<Cursor<Vec<u8>>>,
}

impl BodyWriter {
    fn new() -> DavResult<Self> {
        let mut body = Self {
            writer: Writer::new(Cursor::new(Vec::new())),
        };
        body.write(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))?;
        Ok(body)
    }

    fn write(&mut self, event: Event<'_>) -> DavResult<()> {
        self.writer
            .write_event(event)
            .map_err(|e| DavError::internal("failed to write XML request body").with_source(e))
    }

    fn finish(self) -> DavResult<String> {
        String::from_utf8(self.writer.into_inner().into_inner())
            .map_err(|e| DavError::internal("XML request body is not UTF-8").with_source(e))
    }
}
