//! Well-known files under the LM Studio home directory
//!
//! Both files are written by LM Studio itself; the connector only reads them.

use std::path::{Path, PathBuf};

/// Directory name under the user's home
const HOME_DIR_NAME: &str = ".lmstudio";

/// Subdirectory holding installer-owned state
const INTERNAL_DIR_NAME: &str = ".internal";

/// Install pointer file name
const INSTALL_POINTER_FILENAME: &str = "app-install-location.json";

/// Second-factor client secret file name
const SECRET_FILENAME: &str = "lms-key-2";

/// Resolved LM Studio file locations
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LmStudioPaths {
    home: PathBuf,
}

impl LmStudioPaths {
    /// Locations rooted at the given LM Studio home directory
    pub fn new(home: impl Into<PathBuf>) -> Self {
        Self { home: home.into() }
    }

    /// The LM Studio home directory
    pub fn home(&self) -> &Path {
        &self.home
    }

    /// Path to the install pointer (`app-install-location.json`)
    pub fn install_pointer(&self) -> PathBuf {
        self.home
            .join(INTERNAL_DIR_NAME)
            .join(INSTALL_POINTER_FILENAME)
    }

    /// Path to the privileged-client secret (`lms-key-2`)
    pub fn secret(&self) -> PathBuf {
        self.home.join(INTERNAL_DIR_NAME).join(SECRET_FILENAME)
    }
}

impl Default for LmStudioPaths {
    /// `~/.lmstudio`, or `./.lmstudio` when no home directory is known
    fn default() -> Self {
        let home = dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(HOME_DIR_NAME);
        Self::new(home)
    }
}
