//! The transport seam.
//!
//! The protocol layer only builds [`DavRequest`]s and parses response text;
//! moving bytes is left to a [`Transport`]. The crate ships
//! [`HttpTransport`](crate::HttpTransport) behind the `http` feature, and
//! tests plug in in-memory fakes.

use std::future::Future;
use std::pin::Pin;

use crate::error::DavResult;
use crate::request::DavRequest;

/// A boxed future that is Send.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Performs a CalDAV request and returns the response body.
///
/// Implementations must be `Send + Sync`; the client shares one transport
/// across concurrent calls.
///
/// # Errors
///
/// Transport failures are reported as
/// [`Network`](crate::DavErrorCode::Network) errors with the cause attached;
/// HTTP error statuses map to their own codes.
pub trait Transport: Send + Sync {
    fn send(&self, request: DavRequest) -> BoxFuture<'_, DavResult<String>>;
}

impl<T: Transport + ?Sized> Transport for std::sync::Arc<T> {
    fn send(&self, request: DavRequest) -> BoxFuture<'_, DavResult<String>> {
        (**self).send(request)
    }
}
