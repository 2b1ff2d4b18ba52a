//! HTTP transport for CalDAV requests.
//!
//! Sends [`DavRequest`]s with reqwest over HTTP/1.1. Certificate
//! verification stays on unless the configuration opts out.

use reqwest::{Client, Method, Response, StatusCode};
use tracing::{debug, trace, warn};

use crate::config::CalDavConfig;
use crate::error::{DavError, DavResult};
use crate::request::DavRequest;
use crate::transport::{BoxFuture, Transport};

/// reqwest-backed [`Transport`].
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    /// Creates a transport with the configured timeout and TLS policy.
    pub fn new(config: &CalDavConfig) -> DavResult<Self> {
        if !config.verify_tls {
            warn!("TLS certificate verification is disabled");
        }

        // Requests carry `Connection: close`, which HTTP/2 forbids.
        let client = Client::builder()
            .danger_accept_invalid_certs(!config.verify_tls)
            .timeout(config.timeout)
            .http1_only()
            .build()
            .map_err(|e| DavError::network("Failed to create HTTP client").with_source(e))?;

        Ok(Self { client })
    }

    async fn execute(&self, request: DavRequest) -> DavResult<String> {
        let method = Method::from_bytes(request.method.as_str().as_bytes()).map_err(|e| {
            DavError::internal(format!("Invalid HTTP method: {}", request.method)).with_source(e)
        })?;
        let url = request.target.to_url()?;

        trace!(method = %request.method, url = %url, "Sending request");

        let mut builder = self.client.request(method, url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        let response = builder
            .body(request.body)
            .send()
            .await
            .map_err(|e| network_error("Request failed", e))?;

        handle_response(response).await
    }
}

impl Transport for HttpTransport {
    fn send(&self, request: DavRequest) -> BoxFuture<'_, DavResult<String>> {
        Box::pin(self.execute(request))
    }
}

/// Maps the HTTP status to a result and reads the body.
async fn handle_response(response: Response) -> DavResult<String> {
    let status = response.status();
    debug!(status = %status, "Received response");

    match status {
        StatusCode::OK | StatusCode::MULTI_STATUS => response
            .text()
            .await
            .map_err(|e| network_error("Failed to read response", e)),
        StatusCode::UNAUTHORIZED => Err(DavError::authentication(
            "Authentication failed: invalid credentials",
        )),
        StatusCode::FORBIDDEN => Err(DavError::authorization("Access denied to calendar")),
        StatusCode::NOT_FOUND => Err(DavError::not_found("Calendar or resource not found")),
        s if s.is_server_error() => {
            let body = response.text().await.unwrap_or_default();
            Err(DavError::server(format!("Server error ({}): {}", s, body)))
        }
        s => {
            let body = response.text().await.unwrap_or_default();
            warn!(status = %s, body = %body, "Unexpected response status");
            Err(DavError::unexpected_status(format!(
                "Unexpected status {}: {}",
                s, body
            )))
        }
    }
}

fn network_error(context: &str, err: reqwest::Error) -> DavError {
    let message = if err.is_timeout() {
        format!("{context}: timed out")
    } else if err.is_connect() {
        format!("{context}: could not connect")
    } else {
        context.to_string()
    };
    DavError::network(message).with_source(err)
}
