//! Core trait definitions
//!
//! These are the seams between the connection orchestrator and the outside
//! world: the network probe, the application launcher and the secret store.

mod launcher;
mod probe;
mod secrets;

pub use launcher::ServiceLauncher;
pub use probe::EndpointProber;
pub use secrets::SecretSource;
