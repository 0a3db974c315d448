//! Client credential selection
//!
//! Three kinds of credentials exist:
//!
//! - `Remote`: a fresh random client identifier per connection. Remote
//!   connections are never privileged.
//! - `DevLocal`: a fixed identifier with no passkey, used by builds that carry
//!   no production key.
//! - `ProdLocal`: a fixed identifier plus a passkey made of the key embedded
//!   at build time followed by the secret LM Studio writes to `lms-key-2`.
//!
//! # Secret rotation
//!
//! LM Studio may rewrite the secret file while the connector is waiting for a
//! freshly launched server. The secret is therefore never cached: callers read
//! it once when selecting credentials and again right before building the
//! client after a post-launch reconnect, feeding each read through
//! [`derive_credentials`].

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::traits::SecretSource;

/// Length of a remote client identifier in random bytes (before hex encoding)
const CLIENT_ID_BYTES: usize = 16;

/// Identifier used by local clients
pub const LOCAL_CLIENT_IDENTIFIER: &str = "lms-cli";

/// Prefix of remote client identifiers
const REMOTE_CLIENT_PREFIX: &str = "lms-cli-remote-";

/// Build-time configuration relevant to credentials
#[derive(Clone, Default, PartialEq, Eq)]
pub struct BuildConfig {
    /// Production key embedded into release builds
    pub production_key: Option<String>,
}

impl BuildConfig {
    /// Build configuration from an optionally embedded key
    ///
    /// Empty keys are treated as absent.
    pub fn from_embedded(key: Option<&str>) -> Self {
        Self {
            production_key: key.filter(|k| !k.is_empty()).map(String::from),
        }
    }

    /// Whether this build carries a production key
    pub fn is_production(&self) -> bool {
        self.production_key.is_some()
    }
}

impl fmt::Debug for BuildConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BuildConfig")
            .field("production_key", &self.production_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Which kind of credentials a connection attempt uses
#[derive(Clone, PartialEq, Eq)]
pub enum CredentialMode {
    /// Unprivileged, randomly identified remote client
    Remote,
    /// Unprivileged local client of a development build
    DevLocal,
    /// Privileged local client; `key` is the build-embedded half of the passkey
    ProdLocal { key: String },
}

impl CredentialMode {
    /// Pick the mode for a connection attempt
    ///
    /// Remote connections are always `Remote`. Local connections are
    /// `ProdLocal` when the build carries a production key or production mode
    /// is forced, otherwise `DevLocal`.
    pub fn select(remote: bool, build: &BuildConfig, force_production: bool) -> Self {
        if remote {
            return CredentialMode::Remote;
        }
        match (&build.production_key, force_production) {
            (Some(key), _) => CredentialMode::ProdLocal { key: key.clone() },
            (None, true) => CredentialMode::ProdLocal { key: String::new() },
            (None, false) => CredentialMode::DevLocal,
        }
    }

    /// Whether deriving credentials needs the on-disk secret
    pub fn requires_secret(&self) -> bool {
        matches!(self, CredentialMode::ProdLocal { .. })
    }
}

impl fmt::Debug for CredentialMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CredentialMode::Remote => write!(f, "Remote"),
            CredentialMode::DevLocal => write!(f, "DevLocal"),
            CredentialMode::ProdLocal { .. } => write!(f, "ProdLocal {{ key: <redacted> }}"),
        }
    }
}

/// Credentials presented to the server
#[derive(Clone, PartialEq, Eq)]
pub enum Credentials {
    Remote { client_identifier: String },
    DevLocal { client_identifier: String },
    ProdLocal { client_identifier: String, passkey: String },
}

impl Credentials {
    /// Client identifier sent with every request
    pub fn client_identifier(&self) -> &str {
        match self {
            Credentials::Remote { client_identifier }
            | Credentials::DevLocal { client_identifier }
            | Credentials::ProdLocal {
                client_identifier, ..
            } => client_identifier,
        }
    }

    /// Passkey, only present for privileged clients
    pub fn passkey(&self) -> Option<&str> {
        match self {
            Credentials::ProdLocal { passkey, .. } => Some(passkey),
            _ => None,
        }
    }

    /// Whether these credentials unlock privileged operations
    pub fn is_privileged(&self) -> bool {
        matches!(self, Credentials::ProdLocal { .. })
    }

    /// Short name of the credential kind
    pub fn kind(&self) -> &'static str {
        match self {
            Credentials::Remote { .. } => "remote",
            Credentials::DevLocal { .. } => "local (development)",
            Credentials::ProdLocal { .. } => "local (privileged)",
        }
    }
}

impl fmt::Display for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} as {}", self.kind(), self.client_identifier())
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Credentials::Remote { client_identifier } => f
                .debug_struct("Remote")
                .field("client_identifier", client_identifier)
                .finish(),
            Credentials::DevLocal { client_identifier } => f
                .debug_struct("DevLocal")
                .field("client_identifier", client_identifier)
                .finish(),
            Credentials::ProdLocal {
                client_identifier, ..
            } => f
                .debug_struct("ProdLocal")
                .field("client_identifier", client_identifier)
                .field("passkey", &"<redacted>")
                .finish(),
        }
    }
}

/// Generate a random remote client identifier
///
/// Returns `lms-cli-remote-` followed by 32 hex characters (128 random bits).
pub fn generate_client_identifier() -> String {
    use rand::Rng;
    let mut bytes = [0u8; CLIENT_ID_BYTES];
    rand::thread_rng().fill(&mut bytes);
    format!("{}{}", REMOTE_CLIENT_PREFIX, hex::encode(bytes))
}

/// Turn a credential mode and the current secret into credentials
///
/// `raw_secret` is only consulted for `ProdLocal` and is trimmed of
/// surrounding whitespace. `Remote` gets a new random identifier on every
/// call.
pub fn derive_credentials(mode: &CredentialMode, raw_secret: Option<&str>) -> Credentials {
    match mode {
        CredentialMode::Remote => Credentials::Remote {
            client_identifier: generate_client_identifier(),
        },
        CredentialMode::DevLocal => Credentials::DevLocal {
            client_identifier: LOCAL_CLIENT_IDENTIFIER.to_string(),
        },
        CredentialMode::ProdLocal { key } => Credentials::ProdLocal {
            client_identifier: LOCAL_CLIENT_IDENTIFIER.to_string(),
            passkey: format!("{}{}", key, raw_secret.unwrap_or_default().trim()),
        },
    }
}

/// Read the client secret, trimmed of surrounding whitespace
pub async fn read_secret(path: &Path) -> io::Result<String> {
    let content = tokio::fs::read_to_string(path).await?;
    Ok(content.trim().to_string())
}

/// Secret source backed by the `lms-key-2` file
#[derive(Debug, Clone)]
pub struct FileSecretSource {
    path: PathBuf,
}

impl FileSecretSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl SecretSource for FileSecretSource {
    fn location(&self) -> &Path {
        &self.path
    }

    async fn read_secret(&self) -> io::Result<String> {
        read_secret(&self.path).await
    }
}
