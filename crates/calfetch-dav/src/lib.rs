//! Minimal read-only CalDAV client.
//!
//! Lists the collections under a calendar URL (`PROPFIND`) and fetches
//! `VEVENT`s from a calendar (`REPORT` + `calendar-query`), returning them as
//! flat property maps.
//!
//! # Architecture
//!
//! ```text
//!  url ──▶ target::ConnectionTarget
//!              │
//!              ▼
//!         request::DavRequest  (xml bodies, Basic auth)
//!              │
//!              ▼
//!         transport::Transport ──▶ http::HttpTransport (reqwest)
//!              │
//!              ▼
//!         xml::parse_collections / xml::extract_calendar_blobs
//!              │
//!              ▼
//!         ics::extract_events
//! ```
//!
//! # Example
//!
//! ```ignore
//! use calfetch_dav::{CalDavClient, CalDavConfig, Credentials};
//! use calfetch_core::TimeRange;
//! use chrono::Utc;
//!
//! let client = CalDavClient::new(CalDavConfig::new())?;
//! let creds = Credentials::new("me", "secret");
//! let calendars = client.get_list("https://dav.example.com/cal/", Some(&creds)).await?;
//! let range = TimeRange::starting_at(Utc::now());
//! let events = client
//!     .get_events("https://dav.example.com/cal/work/", Some(&creds), &range)
//!     .await?;
//! ```

pub mod auth;
pub mod client;
pub mod config;
pub mod error;
#[cfg(feature = "http")]
pub mod http;
pub mod ics;
pub mod request;
pub mod target;
pub mod transport;
pub mod xml;

pub use auth::Credentials;
pub use client::CalDavClient;
#[cfg(feature = "http")]
pub use client::HttpCalDavClient;
pub use config::CalDavConfig;
pub use error::{DavError, DavErrorCode, DavResult};
#[cfg(feature = "http")]
pub use http::HttpTransport;
pub use ics::{EventRecord, extract_all_events, extract_events};
pub use request::{DavMethod, DavRequest};
pub use target::{ConnectionTarget, Scheme};
pub use transport::{BoxFuture, Transport};
pub use xml::{ResourceEntry, extract_calendar_blobs, parse_collections};
