//! CalDAV client facade.
//!
//! The two public operations, wired end to end:
//!
//! ```text
//! url ─▶ ConnectionTarget ─▶ DavRequest ─▶ Transport ─▶ multistatus ─▶ result
//! ```
//!
//! Each call resolves its own target and issues exactly one request. The
//! client holds no per-call state, so calls may run concurrently.

use tracing::{debug, info};

use calfetch_core::TimeRange;

use crate::auth::Credentials;
use crate::config::CalDavConfig;
use crate::error::DavResult;
use crate::ics::{EventRecord, extract_all_events};
use crate::request::DavRequest;
use crate::target::ConnectionTarget;
use crate::transport::Transport;
use crate::xml::{ResourceEntry, extract_calendar_blobs, parse_collections};

#[cfg(feature = "http")]
use crate::http::HttpTransport;

/// Read-only CalDAV client.
pub struct CalDavClient<T: Transport> {
    transport: T,
    user_agent: String,
}

/// The client over reqwest.
#[cfg(feature = "http")]
pub type HttpCalDavClient = CalDavClient<HttpTransport>;

#[cfg(feature = "http")]
impl CalDavClient<HttpTransport> {
    /// Creates a client backed by [`HttpTransport`].
    pub fn new(config: CalDavConfig) -> DavResult<Self> {
        let transport = HttpTransport::new(&config)?;
        Ok(Self::with_transport(transport, &config))
    }
}

impl<T: Transport> CalDavClient<T> {
    /// Creates a client over any transport.
    pub fn with_transport(transport: T, config: &CalDavConfig) -> Self {
        Self {
            transport,
            user_agent: config.user_agent.clone(),
        }
    }

    /// Lists the collections under `url` that have a display name.
    ///
    /// # Errors
    ///
    /// `InvalidUrl` before any request is made, then whatever the transport
    /// reports, then `ResponseParse` if the answer is not a multistatus.
    pub async fn get_list(
        &self,
        url: &str,
        credentials: Option<&Credentials>,
    ) -> DavResult<Vec<ResourceEntry>> {
        let target = ConnectionTarget::resolve(url)?;
        debug!(target = %target, "Listing collections via PROPFIND");

        let request =
            DavRequest::list_collections(target, credentials)?.with_user_agent(&self.user_agent);
        let body = self.transport.send(request).await?;
        let entries = parse_collections(&body)?;

        info!(url = %url, count = entries.len(), "Listed collections");
        Ok(entries)
    }

    /// Fetches the `VEVENT`s in `range` from the calendar at `url`.
    ///
    /// Events come back in document order: `calendar-data` blob first, then
    /// block position inside the blob.
    ///
    /// # Errors
    ///
    /// Same as [`get_list`](Self::get_list).
    pub async fn get_events(
        &self,
        url: &str,
        credentials: Option<&Credentials>,
        range: &TimeRange,
    ) -> DavResult<Vec<EventRecord>> {
        let target = ConnectionTarget::resolve(url)?;
        debug!(
            target = %target,
            start = %range.start,
            end = ?range.end,
            "Querying events via REPORT"
        );

        let request = DavRequest::query_events(target, credentials, range)?
            .with_user_agent(&self.user_agent);
        let body = self.transport.send(request).await?;
        let blobs = extract_calendar_blobs(&body)?;
        let events = extract_all_events(&blobs);

        info!(
            url = %url,
            blobs = blobs.len(),
            count = events.len(),
            "Fetched events"
        );
        Ok(events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{DavError, DavErrorCode};
    use crate::request::{AUTHORIZATION, DavMethod};
    use crate::transport::BoxFuture;
    use chrono::{TimeZone, Utc};
    use std::sync::{Arc, Mutex};

    /// Transport that records requests and replays a canned answer.
    struct FakeTransport {
        requests: Mutex<Vec<DavRequest>>,
        response: Result<String, DavErrorCode>,
    }

    impl FakeTransport {
        fn replying(body: &str) -> Arc<Self> {
            Arc::new(Self {
                requests: Mutex::new(Vec::new()),
                response: Ok(body.to_string()),
            })
        }

        fn failing(code: DavErrorCode) -> Arc<Self> {
            Arc::new(Self {
                requests: Mutex::new(Vec::new()),
                response: Err(code),
            })
        }

        fn requests(&self) -> Vec<DavRequest> {
            self.requests.lock().unwrap().clone()
        }
    }

    impl Transport for FakeTransport {
        fn send(&self, request: DavRequest) -> BoxFuture<'_, DavResult<String>> {
            self.requests.lock().unwrap().push(request);
            let response = self
                .response
                .clone()
                .map_err(|code| DavError::new(code, "fake failure"));
            Box::pin(async move { response })
        }
    }

    fn client(transport: &Arc<FakeTransport>) -> CalDavClient<Arc<FakeTransport>> {
        CalDavClient::with_transport(Arc::clone(transport), &CalDavConfig::default())
    }

    const PROPFIND_RESPONSE: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<d:multistatus xmlns:d="DAV:">
  <d:response>
    <d:href>/cal/</d:href>
    <d:propstat><d:prop><d:displayname/></d:prop></d:propstat>
  </d:response>
  <d:response>
    <d:href>/cal/work/</d:href>
    <d:propstat><d:prop><d:displayname>Work</d:displayname></d:prop></d:propstat>
  </d:response>
</d:multistatus>"#;

    const REPORT_RESPONSE: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<d:multistatus xmlns:d="DAV:" xmlns:c="urn:ietf:params:xml:ns:caldav">
  <d:response>
    <d:href>/cal/work/1.ics</d:href>
    <d:propstat><d:prop><c:calendar-data>BEGIN:VCALENDAR
BEGIN:VEVENT
UID:1
SUMMARY:Lunch
DTSTART:20240101T120000Z
END:VEVENT
BEGIN:VEVENT
UID:2
SUMMARY:Review
END:VEVENT
END:VCALENDAR</c:calendar-data></d:prop></d:propstat>
  </d:response>
  <d:response>
    <d:href>/cal/work/3.ics</d:href>
    <d:propstat><d:prop><c:calendar-data>BEGIN:VCALENDAR
BEGIN:VEVENT
UID:3
SUMMARY:Dinner
END:VEVENT
END:VCALENDAR</c:calendar-data></d:prop></d:propstat>
  </d:response>
</d:multistatus>"#;

    fn range() -> TimeRange {
        TimeRange::starting_at(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap())
    }

    #[tokio::test]
    async fn get_list_returns_named_collections() {
        let transport = FakeTransport::replying(PROPFIND_RESPONSE);
        let credentials = Credentials::new("user", "pass");

        let entries = client(&transport)
            .get_list("https://dav.example.com:8443/cal/", Some(&credentials))
            .await
            .unwrap();

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].display_name, "Work");
        assert_eq!(entries[0].href, "/cal/work/");

        let requests = transport.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].method, DavMethod::Propfind);
        assert_eq!(requests[0].target.port, 8443);
        assert_eq!(requests[0].target.path, "/cal/");
        assert!(requests[0].header(AUTHORIZATION).is_some());
    }

    #[tokio::test]
    async fn get_list_invalid_url_skips_transport() {
        let transport = FakeTransport::replying(PROPFIND_RESPONSE);

        let err = client(&transport)
            .get_list("dav.example.com/cal/", None)
            .await
            .unwrap_err();

        assert_eq!(err.code(), DavErrorCode::InvalidUrl);
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn get_list_malformed_response_is_parse_error() {
        let transport = FakeTransport::replying("<html><body>Login</body></html>");

        let err = client(&transport)
            .get_list("https://dav.example.com/cal/", None)
            .await
            .unwrap_err();

        assert_eq!(err.code(), DavErrorCode::ResponseParse);
    }

    #[tokio::test]
    async fn get_events_flattens_blobs_in_order() {
        let transport = FakeTransport::replying(REPORT_RESPONSE);

        let events = client(&transport)
            .get_events("https://dav.example.com/cal/work/", None, &range())
            .await
            .unwrap();

        let uids: Vec<_> = events.iter().filter_map(|e| e.get("UID")).collect();
        assert_eq!(uids, vec!["1", "2", "3"]);
        assert_eq!(events[0].get("SUMMARY"), Some("Lunch"));
        assert_eq!(events[0].get("DTSTART"), Some("20240101T120000Z"));

        let requests = transport.requests();
        assert_eq!(requests[0].method, DavMethod::Report);
        assert_eq!(requests[0].header("Depth"), Some("1"));
        assert!(requests[0].header(AUTHORIZATION).is_none());
        assert!(requests[0].body.contains("20240101T000000Z"));
    }

    #[tokio::test]
    async fn get_events_surfaces_network_error() {
        let transport = FakeTransport::failing(DavErrorCode::Network);

        let err = client(&transport)
            .get_events("https://dav.example.com/cal/work/", None, &range())
            .await
            .unwrap_err();

        assert_eq!(err.code(), DavErrorCode::Network);
        assert_eq!(transport.requests().len(), 1);
    }

    #[tokio::test]
    async fn configured_user_agent_is_sent() {
        let transport = FakeTransport::replying(PROPFIND_RESPONSE);
        let config = CalDavConfig::new().with_user_agent("calfetch/test");
        let client = CalDavClient::with_transport(Arc::clone(&transport), &config);

        client
            .get_list("https://dav.example.com/cal/", None)
            .await
            .unwrap();

        assert_eq!(
            transport.requests()[0].header("User-Agent"),
            Some("calfetch/test")
        );
    }

    #[tokio::test]
    async fn concurrent_calls_are_independent() {
        let transport = FakeTransport::replying(PROPFIND_RESPONSE);
        let client = client(&transport);

        let (a, b) = tokio::join!(
            client.get_list("https://a.example.com/cal/", None),
            client.get_list("https://b.example.com/cal/", None),
        );

        assert_eq!(a.unwrap(), b.unwrap());
        let mut hosts: Vec<_> = transport
            .requests()
            .into_iter()
            .map(|r| r.target.host)
            .collect();
        hosts.sort();
        assert_eq!(hosts, vec!["a.example.com", "b.example.com"]);
    }
}
