//! Secret storage trait

use std::io;
use std::path::Path;

use async_trait::async_trait;

/// Read access to the rotating privileged-client secret
#[async_trait]
pub trait SecretSource: Send + Sync {
    /// Where the secret lives, for diagnostics
    fn location(&self) -> &Path;

    /// Read the current secret, trimmed; never cached
    async fn read_secret(&self) -> io::Result<String>;
}
