//! LM Studio RPC client handle
//!
//! The websocket protocol lives elsewhere; this handle carries what the RPC
//! client is constructed from: the base URL and the credentials.

use std::fmt;

use lms_core::Credentials;

/// Build the websocket base URL for a host and port
pub fn ws_url(host: &str, port: u16) -> String {
    format!("ws://{}:{}", host, port)
}

/// A client bound to one LM Studio server
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LmStudioClient {
    base_url: String,
    credentials: Credentials,
}

impl LmStudioClient {
    /// Create a client for `base_url` authenticating with `credentials`
    pub fn new(base_url: impl Into<String>, credentials: Credentials) -> Self {
        Self {
            base_url: base_url.into(),
            credentials,
        }
    }

    /// Create a client for `ws://host:port`
    pub fn for_address(host: &str, port: u16, credentials: Credentials) -> Self {
        Self::new(ws_url(host, port), credentials)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }
}

impl fmt::Display for LmStudioClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.base_url, self.credentials)
    }
}
