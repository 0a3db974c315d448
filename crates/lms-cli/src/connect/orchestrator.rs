//! Connection orchestration
//!
//! Turns a [`ConnectionRequest`] into an [`LmStudioClient`]:
//!
//! 1. Reject hosts carrying a scheme or a port, before any I/O.
//! 2. No host means local mode on the loopback address; any host is remote.
//! 3. Select credentials (remote, development or privileged local).
//! 4. With no port on loopback, sweep the candidate ports.
//! 5. In local mode a miss launches LM Studio and polls on a fixed interval
//!    within a bounded budget. A privileged client re-reads its secret after
//!    a successful poll since it may have rotated in the meantime.
//! 6. Otherwise connect to exactly `host:port` (default port 1234) after a
//!    single liveness check whose failure is reported but not fatal.
//!
//! The local path runs `Start -> Sweeping -> {Connected | Launching ->
//! Polling -> {Connected | Exhausted}}`; everything else is a single step.

use std::sync::Arc;

use lms_core::config::DiscoveryConfig;
use lms_core::credentials::{derive_credentials, FileSecretSource};
use lms_core::traits::{EndpointProber, SecretSource, ServiceLauncher};
use lms_core::{
    BuildConfig, ConnectError, ConnectionMode, ConnectionRequest, CredentialMode, Credentials,
    DiscoveredEndpoint, LmStudioPaths,
};

use super::launcher::AppLauncher;
use super::probe::{sweep, GreetingProber};
use crate::client::LmStudioClient;
use crate::output::{print_info, print_warning};

/// Builds client handles from connection requests
pub struct Connector {
    discovery: DiscoveryConfig,
    build: BuildConfig,
    force_production: bool,
    prober: Arc<dyn EndpointProber>,
    launcher: Arc<dyn ServiceLauncher>,
    secrets: Arc<dyn SecretSource>,
}

impl Connector {
    /// Create a connector using the real prober, launcher and secret file
    pub fn new(discovery: DiscoveryConfig, paths: &LmStudioPaths, build: BuildConfig) -> Self {
        let prober = Arc::new(GreetingProber::new(discovery.probe_timeout));
        Self {
            discovery,
            build,
            force_production: false,
            prober,
            launcher: Arc::new(AppLauncher::from_paths(paths)),
            secrets: Arc::new(FileSecretSource::new(paths.secret())),
        }
    }

    /// Force privileged local credentials even without a production key
    pub fn with_force_production(mut self, force: bool) -> Self {
        self.force_production = force;
        self
    }

    /// Replace the endpoint prober
    pub fn with_prober(mut self, prober: Arc<dyn EndpointProber>) -> Self {
        self.prober = prober;
        self
    }

    /// Replace the service launcher
    pub fn with_launcher(mut self, launcher: Arc<dyn ServiceLauncher>) -> Self {
        self.launcher = launcher;
        self
    }

    /// Replace the secret source
    pub fn with_secret_source(mut self, secrets: Arc<dyn SecretSource>) -> Self {
        self.secrets = secrets;
        self
    }

    /// Resolve a request into a client handle
    pub async fn connect(&self, request: &ConnectionRequest) -> Result<LmStudioClient, ConnectError> {
        request.validate()?;

        let mode = request.mode();
        let host = request.resolved_host();
        let credential_mode =
            CredentialMode::select(mode.is_remote(), &self.build, self.force_production);

        if credential_mode == CredentialMode::DevLocal {
            tracing::warn!("No production key in this build, connecting as an unprivileged client");
            print_warning("Development build: connecting without privileged credentials");
        }

        let credentials = self.derive(&credential_mode).await?;
        tracing::debug!(%mode, host, credentials = %credentials, "Selected connection strategy");

        if request.wants_discovery() {
            if let Some(endpoint) = self.sweep(host).await {
                tracing::info!(port = endpoint.port, "Found LM Studio");
                return Ok(LmStudioClient::for_address(host, endpoint.port, credentials));
            }

            if mode == ConnectionMode::Local {
                let endpoint = self.wake_and_poll(host).await?;
                let credentials = if credential_mode.requires_secret() {
                    self.derive(&credential_mode).await?
                } else {
                    credentials
                };
                return Ok(LmStudioClient::for_address(host, endpoint.port, credentials));
            }

            tracing::debug!(
                port = self.discovery.default_port,
                "Nothing found on candidate ports, trying the default port"
            );
        }

        let port = request.port.unwrap_or(self.discovery.default_port);
        if self.prober.probe(host, port).await.is_err() {
            tracing::warn!(host, port, "No LM Studio server answered the liveness check");
            print_warning(&format!(
                "Could not reach LM Studio at {}:{}; is the server running?",
                host, port
            ));
        }

        Ok(LmStudioClient::for_address(host, port, credentials))
    }

    /// Derive credentials, reading the secret fresh when the mode needs it
    async fn derive(&self, mode: &CredentialMode) -> Result<Credentials, ConnectError> {
        let secret = if mode.requires_secret() {
            let secret = self
                .secrets
                .read_secret()
                .await
                .map_err(|source| ConnectError::Secret {
                    path: self.secrets.location().to_path_buf(),
                    source,
                })?;
            Some(secret)
        } else {
            None
        };
        Ok(derive_credentials(mode, secret.as_deref()))
    }

    async fn sweep(&self, host: &str) -> Option<DiscoveredEndpoint> {
        sweep(Arc::clone(&self.prober), host, &self.discovery.candidate_ports).await
    }

    /// Launch LM Studio and poll until it answers or the budget runs out
    async fn wake_and_poll(&self, host: &str) -> Result<DiscoveredEndpoint, ConnectError> {
        tracing::info!("LM Studio is not running, launching it in service mode");
        print_info("Waking up LM Studio service...");

        // A failed launch still polls: the app may be starting on its own.
        if !self.launcher.wake_up().await {
            tracing::debug!("Launch attempt failed, polling anyway");
        }

        let attempts = self.discovery.max_poll_attempts;
        for attempt in 1..=attempts {
            tokio::time::sleep(self.discovery.poll_interval).await;
            if let Some(endpoint) = self.sweep(host).await {
                tracing::info!(port = endpoint.port, attempt, "LM Studio is up");
                return Ok(endpoint);
            }
            tracing::debug!(attempt, attempts, "LM Studio not reachable yet");
        }

        tracing::error!(
            attempts,
            "LM Studio did not start within {:?}",
            self.discovery.poll_budget()
        );
        Err(ConnectError::DiscoveryExhausted { attempts })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use lms_core::ProbeError;
    use std::collections::HashSet;
    use std::io;
    use std::path::{Path, PathBuf};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tokio::time::Instant;

    const CANDIDATES: [u16; 3] = [41343, 52993, 16141];

    /// Prober whose servers come up at a given (virtual) time
    struct ScriptedProber {
        live: HashSet<(String, u16)>,
        available_after: Duration,
        started: Instant,
        probes: AtomicUsize,
    }

    impl ScriptedProber {
        fn new(live: &[(&str, u16)], available_after: Duration) -> Arc<Self> {
            Arc::new(Self {
                live: live.iter().map(|(h, p)| (h.to_string(), *p)).collect(),
                available_after,
                started: Instant::now(),
                probes: AtomicUsize::new(0),
            })
        }

        fn nothing() -> Arc<Self> {
            Self::new(&[], Duration::ZERO)
        }

        fn probes(&self) -> usize {
            self.probes.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl EndpointProber for ScriptedProber {
        async fn probe(&self, host: &str, port: u16) -> Result<u16, ProbeError> {
            self.probes.fetch_add(1, Ordering::SeqCst);
            let up = self.started.elapsed() >= self.available_after;
            if up && self.live.contains(&(host.to_string(), port)) {
                Ok(port)
            } else {
                Err(ProbeError::NotLmStudioServer { port })
            }
        }
    }

    struct CountingLauncher {
        succeeds: bool,
        calls: AtomicUsize,
    }

    impl CountingLauncher {
        fn new(succeeds: bool) -> Arc<Self> {
            Arc::new(Self {
                succeeds,
                calls: AtomicUsize::new(0),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ServiceLauncher for CountingLauncher {
        async fn wake_up(&self) -> bool {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.succeeds
        }
    }

    /// Secret that changes on every read
    struct RotatingSecret {
        path: PathBuf,
        reads: AtomicUsize,
        missing: bool,
    }

    impl RotatingSecret {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                path: PathBuf::from("/tmp/lms-key-2"),
                reads: AtomicUsize::new(0),
                missing: false,
            })
        }

        fn missing() -> Arc<Self> {
            Arc::new(Self {
                path: PathBuf::from("/tmp/lms-key-2"),
                reads: AtomicUsize::new(0),
                missing: true,
            })
        }

        fn reads(&self) -> usize {
            self.reads.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl SecretSource for RotatingSecret {
        fn location(&self) -> &Path {
            &self.path
        }

        async fn read_secret(&self) -> io::Result<String> {
            let n = self.reads.fetch_add(1, Ordering::SeqCst) + 1;
            if self.missing {
                return Err(io::Error::new(io::ErrorKind::NotFound, "no secret"));
            }
            Ok(format!("secret-{}", n))
        }
    }

    fn discovery() -> DiscoveryConfig {
        DiscoveryConfig {
            candidate_ports: CANDIDATES.to_vec(),
            ..DiscoveryConfig::default()
        }
    }

    fn connector(
        build: BuildConfig,
        prober: Arc<ScriptedProber>,
        launcher: Arc<CountingLauncher>,
        secrets: Arc<RotatingSecret>,
    ) -> Connector {
        Connector::new(discovery(), &LmStudioPaths::new("/nonexistent"), build)
            .with_prober(prober)
            .with_launcher(launcher)
            .with_secret_source(secrets)
    }

    fn prod_build() -> BuildConfig {
        BuildConfig::from_embedded(Some("key-"))
    }

    fn remote(host: &str, port: Option<u16>) -> ConnectionRequest {
        ConnectionRequest::new(Some(host.to_string()), port)
    }

    #[tokio::test]
    async fn test_malformed_host_rejected_before_io() {
        let prober = ScriptedProber::nothing();
        let launcher = CountingLauncher::new(true);
        let secrets = RotatingSecret::new();
        let c = connector(prod_build(), prober.clone(), launcher.clone(), secrets.clone())
            .with_force_production(true);

        for host in ["http://example.com", "example.com:1234", "ws://127.0.0.1:41343"] {
            let err = c.connect(&remote(host, None)).await.unwrap_err();
            assert!(err.is_user_error(), "{} should be a user error", host);
            assert_eq!(err.exit_code(), 1);
        }

        assert_eq!(prober.probes(), 0);
        assert_eq!(launcher.calls(), 0);
        assert_eq!(secrets.reads(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_local_fast_path_uses_discovered_port() {
        let prober = ScriptedProber::new(&[("127.0.0.1", 16141)], Duration::ZERO);
        let launcher = CountingLauncher::new(true);
        let secrets = RotatingSecret::new();
        let c = connector(BuildConfig::default(), prober, launcher.clone(), secrets.clone());

        let client = c.connect(&ConnectionRequest::local()).await.unwrap();
        assert_eq!(client.base_url(), "ws://127.0.0.1:16141");
        assert!(matches!(client.credentials(), Credentials::DevLocal { .. }));
        assert_eq!(launcher.calls(), 0);
        assert_eq!(secrets.reads(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_local_fast_path_reads_secret_once() {
        let prober = ScriptedProber::new(&[("127.0.0.1", 41343)], Duration::ZERO);
        let secrets = RotatingSecret::new();
        let c = connector(prod_build(), prober, CountingLauncher::new(true), secrets.clone());

        let client = c.connect(&ConnectionRequest::local()).await.unwrap();
        assert_eq!(client.credentials().passkey(), Some("key-secret-1"));
        assert_eq!(secrets.reads(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_wake_and_poll_finds_server_on_fifth_attempt() {
        let prober = ScriptedProber::new(&[("127.0.0.1", 52993)], Duration::from_secs(5));
        let launcher = CountingLauncher::new(true);
        let secrets = RotatingSecret::new();
        let c = connector(prod_build(), prober.clone(), launcher.clone(), secrets.clone());

        let start = Instant::now();
        let client = c.connect(&ConnectionRequest::local()).await.unwrap();

        assert_eq!(client.base_url(), "ws://127.0.0.1:52993");
        assert_eq!(launcher.calls(), 1);
        // initial sweep plus four failed polls, then at least the winner
        assert!(prober.probes() > CANDIDATES.len() * 5);
        assert_eq!(start.elapsed(), Duration::from_secs(5));

        // Secret read at selection and again after the server came up.
        assert_eq!(secrets.reads(), 2);
        assert_eq!(client.credentials().passkey(), Some("key-secret-2"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_dev_credentials_not_rederived_after_poll() {
        let prober = ScriptedProber::new(&[("127.0.0.1", 41343)], Duration::from_secs(2));
        let secrets = RotatingSecret::new();
        let c = connector(
            BuildConfig::default(),
            prober,
            CountingLauncher::new(true),
            secrets.clone(),
        );

        let client = c.connect(&ConnectionRequest::local()).await.unwrap();
        assert!(matches!(client.credentials(), Credentials::DevLocal { .. }));
        assert_eq!(secrets.reads(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_launch_still_polls() {
        let prober = ScriptedProber::new(&[("127.0.0.1", 16141)], Duration::from_secs(3));
        let launcher = CountingLauncher::new(false);
        let c = connector(
            BuildConfig::default(),
            prober,
            launcher.clone(),
            RotatingSecret::new(),
        );

        let client = c.connect(&ConnectionRequest::local()).await.unwrap();
        assert_eq!(client.base_url(), "ws://127.0.0.1:16141");
        assert_eq!(launcher.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_poll_budget_exhausted() {
        let prober = ScriptedProber::nothing();
        let launcher = CountingLauncher::new(true);
        let c = connector(
            BuildConfig::default(),
            prober.clone(),
            launcher.clone(),
            RotatingSecret::new(),
        );

        let start = Instant::now();
        let err = c.connect(&ConnectionRequest::local()).await.unwrap_err();

        assert!(matches!(err, ConnectError::DiscoveryExhausted { attempts: 60 }));
        assert_eq!(launcher.calls(), 1);
        assert_eq!(prober.probes(), CANDIDATES.len() * 61);
        assert_eq!(start.elapsed(), Duration::from_secs(60));
    }

    #[tokio::test(start_paused = true)]
    async fn test_remote_host_defaults_port_and_is_unprivileged() {
        let prober = ScriptedProber::new(&[("example.com", 1234)], Duration::ZERO);
        let launcher = CountingLauncher::new(true);
        let secrets = RotatingSecret::new();
        let c = connector(prod_build(), prober, launcher.clone(), secrets.clone())
            .with_force_production(true);

        let first = c.connect(&remote("example.com", None)).await.unwrap();
        let second = c.connect(&remote("example.com", None)).await.unwrap();

        assert_eq!(first.base_url(), "ws://example.com:1234");
        assert_eq!(second.base_url(), first.base_url());
        assert!(matches!(first.credentials(), Credentials::Remote { .. }));
        assert_ne!(
            first.credentials().client_identifier(),
            second.credentials().client_identifier()
        );
        assert_eq!(launcher.calls(), 0);
        assert_eq!(secrets.reads(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unreachable_explicit_target_still_builds_client() {
        let prober = ScriptedProber::nothing();
        let launcher = CountingLauncher::new(true);
        let c = connector(
            BuildConfig::default(),
            prober.clone(),
            launcher.clone(),
            RotatingSecret::new(),
        );

        let client = c.connect(&remote("127.0.0.1", Some(9999))).await.unwrap();
        assert_eq!(client.base_url(), "ws://127.0.0.1:9999");
        assert_eq!(prober.probes(), 1);
        assert_eq!(launcher.calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_explicit_port_in_local_mode_skips_discovery() {
        let prober = ScriptedProber::new(&[("127.0.0.1", 41343)], Duration::ZERO);
        let launcher = CountingLauncher::new(true);
        let c = connector(
            BuildConfig::default(),
            prober.clone(),
            launcher.clone(),
            RotatingSecret::new(),
        );

        let request = ConnectionRequest::new(None, Some(5555));
        let client = c.connect(&request).await.unwrap();
        assert_eq!(client.base_url(), "ws://127.0.0.1:5555");
        assert!(matches!(client.credentials(), Credentials::DevLocal { .. }));
        assert_eq!(prober.probes(), 1);
        assert_eq!(launcher.calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_explicit_loopback_host_sweeps_but_never_launches() {
        let launcher = CountingLauncher::new(true);

        let found = connector(
            prod_build(),
            ScriptedProber::new(&[("127.0.0.1", 52993)], Duration::ZERO),
            launcher.clone(),
            RotatingSecret::new(),
        );
        let client = found.connect(&remote("127.0.0.1", None)).await.unwrap();
        assert_eq!(client.base_url(), "ws://127.0.0.1:52993");
        assert!(matches!(client.credentials(), Credentials::Remote { .. }));

        let missed = connector(
            prod_build(),
            ScriptedProber::nothing(),
            launcher.clone(),
            RotatingSecret::new(),
        );
        let client = missed.connect(&remote("127.0.0.1", None)).await.unwrap();
        assert_eq!(client.base_url(), "ws://127.0.0.1:1234");

        assert_eq!(launcher.calls(), 0);
    }

    #[tokio::test]
    async fn test_missing_secret_is_typed_error() {
        let c = connector(
            prod_build(),
            ScriptedProber::nothing(),
            CountingLauncher::new(true),
            RotatingSecret::missing(),
        );

        let err = c.connect(&ConnectionRequest::local()).await.unwrap_err();
        assert!(matches!(err, ConnectError::Secret { .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn test_force_production_without_key() {
        let prober = ScriptedProber::new(&[("127.0.0.1", 41343)], Duration::ZERO);
        let c = connector(
            BuildConfig::default(),
            prober,
            CountingLauncher::new(true),
            RotatingSecret::new(),
        )
        .with_force_production(true);

        let client = c.connect(&ConnectionRequest::local()).await.unwrap();
        assert!(client.credentials().is_privileged());
        assert_eq!(client.credentials().passkey(), Some("secret-1"));
    }
}
