//! Endpoint probing trait

use async_trait::async_trait;

use crate::error::ProbeError;

/// Positively identifies an LM Studio server behind a host and port
#[async_trait]
pub trait EndpointProber: Send + Sync {
    /// Probe `host:port`
    ///
    /// Returns the port on success. Every kind of mismatch, including
    /// transport errors and timeouts, is reported as
    /// [`ProbeError::NotLmStudioServer`].
    async fn probe(&self, host: &str, port: u16) -> Result<u16, ProbeError>;
}
