//! Service discovery and connection bootstrap

pub mod launcher;
pub mod orchestrator;
pub mod probe;

pub use launcher::AppLauncher;
pub use orchestrator::Connector;
pub use probe::{probe_all, sweep, GreetingProber};
