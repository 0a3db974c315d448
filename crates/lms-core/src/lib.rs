//! lms-core: Core types and configuration for the LM Studio CLI connector
//!
//! Provides the request and credential types, the install pointer and secret
//! readers, configuration loading, and the traits the connection orchestrator
//! is built on.

pub mod config;
pub mod credentials;
pub mod error;
pub mod install;
pub mod locations;
pub mod traits;
pub mod types;

pub use credentials::{BuildConfig, CredentialMode, Credentials};
pub use error::{ConnectError, LaunchError, LmsError, ProbeError};
pub use locations::LmStudioPaths;
pub use types::{ConnectionMode, ConnectionRequest, DiscoveredEndpoint, LOOPBACK_HOST};
