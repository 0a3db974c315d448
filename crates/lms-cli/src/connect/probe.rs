//! Greeting probe and port sweep
//!
//! LM Studio answers `GET /lmstudio-greeting` with `{"lmstudio": true}`.
//! Anything else on a candidate port (another service, an error page, a
//! closed socket) counts as "not our server" without further distinction,
//! so an unrelated service can never be mistaken for LM Studio.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use tokio::sync::mpsc;

use lms_core::traits::EndpointProber;
use lms_core::{DiscoveredEndpoint, ProbeError};

/// Path of the greeting endpoint
pub const GREETING_PATH: &str = "/lmstudio-greeting";

/// Marker field that must be exactly `true`
const GREETING_MARKER: &str = "lmstudio";

/// Build the greeting URL for a host and port
pub fn greeting_url(host: &str, port: u16) -> String {
    format!("http://{}:{}{}", host, port, GREETING_PATH)
}

/// HTTP prober for the LM Studio greeting endpoint
#[derive(Debug, Clone)]
pub struct GreetingProber {
    client: reqwest::Client,
}

impl GreetingProber {
    /// Create a prober whose requests give up after `timeout`
    pub fn new(timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .no_proxy()
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!("Failed to build probe client ({}), using defaults", e);
                reqwest::Client::new()
            });
        Self { client }
    }
}

#[async_trait]
impl EndpointProber for GreetingProber {
    async fn probe(&self, host: &str, port: u16) -> Result<u16, ProbeError> {
        let not_ours = ProbeError::NotLmStudioServer { port };
        let url = greeting_url(host, port);

        let response = match self.client.get(&url).send().await {
            Ok(response) => response,
            Err(e) => {
                tracing::debug!(port, "Greeting request failed: {}", e);
                return Err(not_ours);
            }
        };

        if response.status() != StatusCode::OK {
            tracing::debug!(port, status = %response.status(), "Greeting returned non-200");
            return Err(not_ours);
        }

        let body: serde_json::Value = match response.json().await {
            Ok(body) => body,
            Err(e) => {
                tracing::debug!(port, "Greeting body is not JSON: {}", e);
                return Err(not_ours);
            }
        };

        if body.get(GREETING_MARKER) == Some(&serde_json::Value::Bool(true)) {
            Ok(port)
        } else {
            tracing::debug!(port, "Greeting marker missing or not true");
            Err(not_ours)
        }
    }
}

/// Race probes on every port and return the first that answers
///
/// All probes are started at once as independent tasks. The sweep returns
/// as soon as one succeeds; the remaining probes are not cancelled and run
/// to completion in the background, their results discarded. When every
/// probe fails the result is `None`, after roughly one probe timeout.
pub async fn sweep(
    prober: Arc<dyn EndpointProber>,
    host: &str,
    ports: &[u16],
) -> Option<DiscoveredEndpoint> {
    if ports.is_empty() {
        return None;
    }

    // Capacity covers every possible sender, so no task ever waits on a send.
    let (found_tx, mut found_rx) = mpsc::channel::<u16>(ports.len());

    for &port in ports {
        let prober = Arc::clone(&prober);
        let found_tx = found_tx.clone();
        let host = host.to_string();
        tokio::spawn(async move {
            if let Ok(port) = prober.probe(&host, port).await {
                // The sweep may already have returned; that is fine.
                let _ = found_tx.try_send(port);
            }
        });
    }
    drop(found_tx);

    // `recv` yields `None` once every probe task has dropped its sender.
    found_rx.recv().await.map(DiscoveredEndpoint::new)
}

/// Probe every port and keep each result
///
/// Unlike [`sweep`] this waits for all probes and reports per port, in the
/// order given.
pub async fn probe_all(prober: &dyn EndpointProber, host: &str, ports: &[u16]) -> Vec<(u16, bool)> {
    let probes = ports.iter().map(|&port| async move {
        let reachable = prober.probe(host, port).await.is_ok();
        (port, reachable)
    });
    futures::future::join_all(probes).await
}
