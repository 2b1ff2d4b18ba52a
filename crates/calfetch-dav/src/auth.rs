//! HTTP Basic authentication (RFC 7617).

use std::fmt;

use base64::Engine;

/// Username and password supplied for a single request.
///
/// Never stored by the client; only used to compute the `Authorization`
/// header for the call it is passed to.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub user: String,
    pub pass: String,
}

impl Credentials {
    pub fn new(user: impl Into<String>, pass: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            pass: pass.into(),
        }
    }

    /// Basic-Auth header value, or `None` when either part is empty.
    pub fn authorization(&self) -> Option<String> {
        if self.user.is_empty() || self.pass.is_empty() {
            return None;
        }
        Some(basic_auth(&self.user, &self.pass))
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("user", &self.user)
            .field("pass", &"<redacted>")
            .finish()
    }
}

/// Generates a Basic authentication header value.
pub fn basic_auth(username: &str, password: &str) -> String {
    let credentials = format!("{}:{}", username, password);
    let encoded = base64::engine::general_purpose::STANDARD.encode(credentials);
    format!("Basic {}", encoded)
}
