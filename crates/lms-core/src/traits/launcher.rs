//! Service launcher trait

use async_trait::async_trait;

/// Starts the local LM Studio application in the background
#[async_trait]
pub trait ServiceLauncher: Send + Sync {
    /// Try to start the service
    ///
    /// Returns `true` when a process was spawned. Failures are logged by the
    /// implementation and reported as `false`; they never propagate.
    async fn wake_up(&self) -> bool;
}
