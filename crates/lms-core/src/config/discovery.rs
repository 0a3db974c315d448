//! Discovery and polling configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::serde_utils::{duration_millis, duration_secs};

/// Ports LM Studio may pick for its local API server
pub const DEFAULT_CANDIDATE_PORTS: [u16; 5] = [41343, 52993, 16141, 39414, 22931];

/// Port used for explicit targets when none is given
pub const DEFAULT_REMOTE_PORT: u16 = 1234;

/// How the connector finds, wakes and waits for the server
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscoveryConfig {
    /// Ports swept when looking for a local server
    pub candidate_ports: Vec<u16>,

    /// Per-probe request timeout
    #[serde(rename = "probe_timeout_ms", with = "duration_millis")]
    pub probe_timeout: Duration,

    /// Delay between sweeps while waiting for a launched server
    #[serde(with = "duration_secs")]
    pub poll_interval: Duration,

    /// Number of sweeps before giving up
    pub max_poll_attempts: u32,

    /// Port for explicit host targets
    pub default_port: u16,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            candidate_ports: DEFAULT_CANDIDATE_PORTS.to_vec(),
            probe_timeout: Duration::from_millis(1000),
            poll_interval: Duration::from_secs(1),
            max_poll_attempts: 60,
            default_port: DEFAULT_REMOTE_PORT,
        }
    }
}

impl DiscoveryConfig {
    /// Upper bound on the time spent waiting for a launched server
    pub fn poll_budget(&self) -> Duration {
        self.poll_interval * self.max_poll_attempts
    }
}
