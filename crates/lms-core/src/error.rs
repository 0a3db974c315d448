//! Core error types for the LM Studio connector

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for the connector crates
#[derive(Error, Debug)]
pub enum LmsError {
    /// Connection bootstrap error
    #[error("Connection error: {0}")]
    Connect(#[from] ConnectError),

    /// Service launch error
    #[error("Launch error: {0}")]
    Launch(#[from] LaunchError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors produced while bootstrapping a client connection
#[derive(Error, Debug)]
pub enum ConnectError {
    /// The host argument carries a scheme or a port
    #[error("Invalid host '{host}': {reason}")]
    InvalidHost { host: String, reason: &'static str },

    /// The wake-and-poll budget ran out without a server answering
    #[error("LM Studio did not become reachable after {attempts} attempts")]
    DiscoveryExhausted { attempts: u32 },

    /// The privileged-client secret could not be read
    #[error("Failed to read client secret from {path:?}: {source}")]
    Secret {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ConnectError {
    /// Process exit code the CLI uses for this failure
    pub fn exit_code(&self) -> i32 {
        1
    }

    /// Whether this is a user input error rather than a connectivity problem
    pub fn is_user_error(&self) -> bool {
        matches!(self, ConnectError::InvalidHost { .. })
    }
}

/// Errors from reading the install pointer or spawning the application
#[derive(Error, Debug)]
pub enum LaunchError {
    /// No install pointer has been written
    #[error("Install pointer not found: {0}")]
    PointerMissing(PathBuf),

    /// Install pointer exists but could not be read or parsed
    #[error("Invalid install pointer at {path:?}: {reason}")]
    PointerInvalid { path: PathBuf, reason: String },

    /// The application process could not be started
    #[error("Failed to spawn {executable:?}: {source}")]
    Spawn {
        executable: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Probe failure; every mismatch collapses into this one variant
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeError {
    /// Whatever is on the port, it is not an LM Studio server
    #[error("No LM Studio server on port {port}")]
    NotLmStudioServer { port: u16 },
}

/// Configuration-related errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Config file not found
    #[error("Config file not found: {0}")]
    NotFound(PathBuf),

    /// Invalid configuration
    #[error("Invalid config: {0}")]
    Invalid(String),

    /// TOML parse error
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),

    /// TOML serialize error
    #[error("TOML serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
}
