//! Install pointer: how to relaunch the installed LM Studio application
//!
//! The installer records the executable, the argv it was started with and
//! its working directory. The connector rebuilds a headless invocation from
//! that record when it needs to wake the server.

use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::LaunchError;

/// Flag that starts LM Studio without opening a window
pub const SERVICE_FLAG: &str = "--run-as-service";

/// argv[1] of an application started from a development checkout
const DEV_CHECKOUT_MARKER: &str = ".";

/// Persisted launch record written by the LM Studio installer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstallPointer {
    /// Executable to start
    #[serde(rename = "path")]
    pub executable: PathBuf,

    /// argv as recorded at install time (argv[0] is the executable)
    #[serde(rename = "argv", default)]
    pub invocation_args: Vec<String>,

    /// Working directory for the launched process
    #[serde(rename = "cwd")]
    pub working_directory: PathBuf,
}

impl InstallPointer {
    /// Whether the recorded invocation points at a development checkout
    pub fn is_dev_checkout(&self) -> bool {
        self.invocation_args.get(1).map(String::as_str) == Some(DEV_CHECKOUT_MARKER)
    }

    /// Arguments for a headless relaunch
    ///
    /// A development checkout needs its `.` entry point re-supplied ahead of
    /// the service flag.
    pub fn launch_args(&self) -> Vec<String> {
        let mut args = Vec::with_capacity(2);
        if self.is_dev_checkout() {
            args.push(DEV_CHECKOUT_MARKER.to_string());
        }
        args.push(SERVICE_FLAG.to_string());
        args
    }
}

/// Read and parse the install pointer
pub async fn read_install_pointer(path: &Path) -> Result<InstallPointer, LaunchError> {
    let content = match tokio::fs::read_to_string(path).await {
        Ok(content) => content,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Err(LaunchError::PointerMissing(path.to_path_buf()));
        }
        Err(e) => {
            return Err(LaunchError::PointerInvalid {
                path: path.to_path_buf(),
                reason: e.to_string(),
            });
        }
    };

    serde_json::from_str(&content).map_err(|e| LaunchError::PointerInvalid {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}
