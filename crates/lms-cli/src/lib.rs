//! lms-cli: LM Studio service discovery and connection bootstrap
//!
//! Finds a running LM Studio server on the well-known local ports, launches
//! the application headless when none answers, and hands back a client bound
//! to the right address with the right credentials.

pub mod client;
pub mod commands;
pub mod connect;
pub mod output;
