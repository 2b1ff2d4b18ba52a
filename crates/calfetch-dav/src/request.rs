//! Request construction for the two CalDAV operations.
//!
//! A [`DavRequest`] is everything a transport needs to perform the call:
//! method, connection target, headers and body. Building one never touches
//! the network.

use std::fmt;

use calfetch_core::TimeRange;

use crate::auth::Credentials;
use crate::error::DavResult;
use crate::target::ConnectionTarget;
use crate::xml::{calendar_query_body, propfind_displayname_body};

/// Client identifier sent in `User-Agent` unless configured otherwise.
pub const DEFAULT_USER_AGENT: &str = "calDavClient";

pub const CONTENT_TYPE: &str = "Content-Type";
pub const CONTENT_LENGTH: &str = "Content-Length";
pub const DEPTH: &str = "Depth";
pub const USER_AGENT: &str = "User-Agent";
pub const CONNECTION: &str = "Connection";
pub const AUTHORIZATION: &str = "Authorization";

/// WebDAV method used by a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DavMethod {
    /// Collection listing.
    Propfind,
    /// Calendar query.
    Report,
}

impl DavMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Propfind => "PROPFIND",
            Self::Report => "REPORT",
        }
    }
}

impl fmt::Display for DavMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A fully built CalDAV request.
#[derive(Clone)]
pub struct DavRequest {
    pub method: DavMethod,
    pub target: ConnectionTarget,
    /// Header name/value pairs in the order they are sent.
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl DavRequest {
    /// `PROPFIND` listing the `displayname` of every member of the collection.
    pub fn list_collections(
        target: ConnectionTarget,
        credentials: Option<&Credentials>,
    ) -> DavResult<Self> {
        let body = propfind_displayname_body()?;
        Ok(Self::new(DavMethod::Propfind, target, body, credentials))
    }

    /// `REPORT` with a `calendar-query` for `VEVENT`s inside `range`.
    pub fn query_events(
        target: ConnectionTarget,
        credentials: Option<&Credentials>,
        range: &TimeRange,
    ) -> DavResult<Self> {
        let body = calendar_query_body(range)?;
        Ok(Self::new(DavMethod::Report, target, body, credentials))
    }

    fn new(
        method: DavMethod,
        target: ConnectionTarget,
        body: String,
        credentials: Option<&Credentials>,
    ) -> Self {
        let mut headers = vec![
            (CONTENT_TYPE.to_string(), "text/xml".to_string()),
            (CONTENT_LENGTH.to_string(), body.len().to_string()),
            (DEPTH.to_string(), "1".to_string()),
            (USER_AGENT.to_string(), DEFAULT_USER_AGENT.to_string()),
            (CONNECTION.to_string(), "close".to_string()),
        ];

        if let Some(authorization) = credentials.and_then(Credentials::authorization) {
            headers.push((AUTHORIZATION.to_string(), authorization));
        }

        Self {
            method,
            target,
            headers,
            body,
        }
    }

    /// Replaces the `User-Agent` header.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        let user_agent = user_agent.into();
        for (name, value) in &mut self.headers {
            if name.eq_ignore_ascii_case(USER_AGENT) {
                *value = user_agent.clone();
            }
        }
        self
    }

    /// Looks up a header value by case-insensitive name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

impl fmt::Debug for DavRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let headers: Vec<(&str, &str)> = self
            .headers
            .iter()
            .map(|(name, value)| {
                if name.eq_ignore_ascii_case(AUTHORIZATION) {
                    (name.as_str(), "<redacted>")
                } else {
                    (name.as_str(), value.as_str())
                }
            })
            .collect();

        f.debug_struct("DavRequest")
            .field("method", &self.method)
            .field("target", &self.target)
            .field("headers", &headers)
            .field("body_len", &self.body.len())
            .finish()
    }
}
