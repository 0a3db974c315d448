//! Core domain types

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::ConnectError;

/// Loopback address used in local mode
pub const LOOPBACK_HOST: &str = "127.0.0.1";

/// What the user asked to connect to
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionRequest {
    /// Explicit host; absent means local mode
    pub host: Option<String>,
    /// Explicit port
    pub port: Option<u16>,
}

impl ConnectionRequest {
    /// Create a request
    pub fn new(host: Option<String>, port: Option<u16>) -> Self {
        Self { host, port }
    }

    /// Local mode with discovery
    pub fn local() -> Self {
        Self::default()
    }

    /// Reject hosts that carry a scheme or an embedded port
    ///
    /// This is pure string inspection so it can run before any I/O.
    pub fn validate(&self) -> Result<(), ConnectError> {
        let Some(host) = self.host.as_deref() else {
            return Ok(());
        };

        if host.contains("://") {
            return Err(ConnectError::InvalidHost {
                host: host.to_string(),
                reason: "the host must not include a protocol (e.g. http://)",
            });
        }
        if host.contains(':') {
            return Err(ConnectError::InvalidHost {
                host: host.to_string(),
                reason: "the host must not include a port; use --port instead",
            });
        }
        Ok(())
    }

    /// Connection strategy implied by the request
    pub fn mode(&self) -> ConnectionMode {
        if self.host.is_some() {
            ConnectionMode::Remote
        } else {
            ConnectionMode::Local
        }
    }

    /// Host to connect to; loopback in local mode
    pub fn resolved_host(&self) -> &str {
        self.host.as_deref().unwrap_or(LOOPBACK_HOST)
    }

    /// Whether the local discovery sweep applies
    pub fn wants_discovery(&self) -> bool {
        self.port.is_none() && self.resolved_host() == LOOPBACK_HOST
    }
}

/// Local or remote connection strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConnectionMode {
    /// No host given: discover, and launch if needed, a local server
    Local,
    /// Host given: connect to exactly that address
    Remote,
}

impl ConnectionMode {
    pub fn is_remote(self) -> bool {
        self == ConnectionMode::Remote
    }
}

impl fmt::Display for ConnectionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionMode::Local => write!(f, "local"),
            ConnectionMode::Remote => write!(f, "remote"),
        }
    }
}

/// Port on which a sweep found the server
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DiscoveredEndpoint {
    pub port: u16,
}

impl DiscoveredEndpoint {
    pub fn new(port: u16) -> Self {
        Self { port }
    }
}
