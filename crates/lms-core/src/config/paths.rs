//! Filesystem location settings

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::locations::LmStudioPaths;

/// Where LM Studio keeps its per-user state
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// LM Studio home directory (defaults to `~/.lmstudio`)
    pub lmstudio_home: Option<PathBuf>,
}

impl PathsConfig {
    /// Resolve the LM Studio locations, preferring an explicit override
    pub fn resolve(&self, home_override: Option<PathBuf>) -> LmStudioPaths {
        match home_override.or_else(|| self.lmstudio_home.clone()) {
            Some(home) => LmStudioPaths::new(home),
            None => LmStudioPaths::default(),
        }
    }
}
