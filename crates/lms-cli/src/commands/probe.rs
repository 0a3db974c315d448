//! Probe command implementation

use std::sync::Arc;

use lms_core::config::DiscoveryConfig;
use lms_core::traits::EndpointProber;

use crate::connect::{probe_all, sweep, GreetingProber};
use crate::output::{format_probe_report, print_warning};

/// Probe every candidate port on `host` without launching anything
pub async fn probe_command(discovery: &DiscoveryConfig, host: &str) -> anyhow::Result<()> {
    let prober: Arc<dyn EndpointProber> = Arc::new(GreetingProber::new(discovery.probe_timeout));
    probe_with(prober, discovery, host).await
}

async fn probe_with(
    prober: Arc<dyn EndpointProber>,
    discovery: &DiscoveryConfig,
    host: &str,
) -> anyhow::Result<()> {
    let ports = &discovery.candidate_ports;
    tracing::debug!(host, ?ports, timeout = ?discovery.probe_timeout, "Probing candidate ports");

    let report = probe_all(prober.as_ref(), host, ports).await;
    let winner = if report.iter().any(|&(_, up)| up) {
        sweep(Arc::clone(&prober), host, ports).await.map(|e| e.port)
    } else {
        None
    };

    println!("{}", format_probe_report(host, &report, winner));

    match winner {
        Some(port) => println!("LM Studio found on port {}", port),
        None => print_warning(&format!(
            "No LM Studio server on {} candidate port(s) (timeout {:?})",
            ports.len(),
            discovery.probe_timeout
        )),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use lms_core::ProbeError;

    struct Fixed(u16);

    #[async_trait]
    impl EndpointProber for Fixed {
        async fn probe(&self, _host: &str, port: u16) -> Result<u16, ProbeError> {
            if port == self.0 {
                Ok(port)
            } else {
                Err(ProbeError::NotLmStudioServer { port })
            }
        }
    }

    #[tokio::test]
    async fn test_probe_with_and_without_server() {
        let discovery = DiscoveryConfig {
            candidate_ports: vec![1, 2, 3],
            ..DiscoveryConfig::default()
        };
        assert!(probe_with(Arc::new(Fixed(2)), &discovery, "127.0.0.1").await.is_ok());
        assert!(probe_with(Arc::new(Fixed(9)), &discovery, "127.0.0.1").await.is_ok());
    }
}
