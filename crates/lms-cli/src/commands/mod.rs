//! CLI command implementations

mod config;
mod probe;
mod status;
mod wake;

pub use config::{config_init, config_path, config_show};
pub use probe::probe_command;
pub use status::status_command;
pub use wake::wake_command;
