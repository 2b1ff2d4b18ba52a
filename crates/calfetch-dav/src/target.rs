//! Calendar URL resolution.
//!
//! Turns a calendar-collection URL into the scheme/host/port/path tuple the
//! transport connects to.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use url::Url;

use crate::error::{DavError, DavResult};

static CALENDAR_URL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?i:(https?))://([^/:?#@\s]+)(?::(\d+))?(/\S*)?$")
        .expect("Invalid calendar URL regex")
});

/// URL scheme supported by the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scheme {
    Http,
    Https,
}

impl Scheme {
    /// Port used when the URL does not name one.
    pub fn default_port(&self) -> u16 {
        match self {
            Self::Http => 80,
            Self::Https => 443,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Http => "http",
            Self::Https => "https",
        }
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Connection parameters derived from a calendar URL.
///
/// `path` always begins with `/`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionTarget {
    pub scheme: Scheme,
    pub host: String,
    pub port: u16,
    pub path: String,
}

impl ConnectionTarget {
    /// Resolves `scheme://host[:port][/path]` into a connection target.
    ///
    /// The scheme must be `http` or `https`. A missing port defaults to the
    /// scheme's well-known port and a missing path to `/`.
    ///
    /// # Errors
    ///
    /// Returns an [`InvalidUrl`](crate::DavErrorCode::InvalidUrl) error if
    /// the URL does not have that shape or the port is out of range.
    pub fn resolve(url: &str) -> DavResult<Self> {
        let caps = CALENDAR_URL_REGEX
            .captures(url.trim())
            .ok_or_else(|| DavError::invalid_url(format!("not a calendar URL: {url}")))?;

        let scheme = if caps[1].eq_ignore_ascii_case("https") {
            Scheme::Https
        } else {
            Scheme::Http
        };

        let port = match caps.get(3) {
            Some(port) => port.as_str().parse::<u16>().map_err(|e| {
                DavError::invalid_url(format!("invalid port {:?} in {url}", port.as_str()))
                    .with_source(e)
            })?,
            None => scheme.default_port(),
        };

        let path = caps
            .get(4)
            .map_or_else(|| "/".to_string(), |p| p.as_str().to_string());

        Ok(Self {
            scheme,
            host: caps[2].to_string(),
            port,
            path,
        })
    }

    /// Builds the absolute request URL.
    pub fn to_url(&self) -> DavResult<Url> {
        Url::parse(&self.to_string()).map_err(|e| {
            DavError::invalid_url(format!("cannot build request URL for {}", self.host))
                .with_source(e)
        })
    }
}

impl fmt::Display for ConnectionTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}://{}:{}{}",
            self.scheme, self.host, self.port, self.path
        )
    }
}
