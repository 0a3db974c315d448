//! Config command implementations

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::output::{print_error, print_info, print_success, print_warning};
use lms_core::config::{self, ConfigFile};

fn resolve_path(config_path: Option<&Path>) -> PathBuf {
    config_path
        .map(Path::to_path_buf)
        .unwrap_or_else(config::default_config_path)
}

/// Print the configuration file location
pub fn config_path(config_path: Option<&Path>) -> Result<()> {
    println!("{}", resolve_path(config_path).display());
    Ok(())
}

/// Show the effective configuration
///
/// Missing files are not an error: the defaults are shown instead.
pub fn config_show(config_path: Option<&Path>) -> Result<()> {
    let path = resolve_path(config_path);

    let effective = if path.exists() {
        print_info(&format!("Configuration file: {}", path.display()));
        config::load_config::<ConfigFile>(&path)
            .with_context(|| format!("Failed to load config file: {}", path.display()))?
    } else {
        print_warning(&format!(
            "No configuration file at {}, showing defaults",
            path.display()
        ));
        ConfigFile::default()
    };

    let rendered =
        toml::to_string_pretty(&effective).context("Failed to render configuration")?;
    println!("{}", rendered);

    Ok(())
}

/// Write a configuration file holding the defaults
pub fn config_init(config_path: Option<&Path>, force: bool) -> Result<()> {
    let path = resolve_path(config_path);

    if path.exists() && !force {
        print_error(&format!("Config file already exists: {}", path.display()));
        print_info("Use --force to overwrite");
        return Ok(());
    }

    config::save_config(&path, &ConfigFile::default())
        .with_context(|| format!("Failed to write config file: {}", path.display()))?;

    print_success(&format!("Created configuration file: {}", path.display()));
    Ok(())
}
