//! Headless launch of the installed LM Studio application
//!
//! The launcher rebuilds the invocation recorded in the install pointer,
//! adds the service flag and starts the process detached from this one.
//! The connector never waits on the child: it only cares that a server
//! eventually answers the greeting probe.

use std::path::PathBuf;
use std::process::{Child, Command, Stdio};

use async_trait::async_trait;

use lms_core::install::{read_install_pointer, InstallPointer};
use lms_core::traits::ServiceLauncher;
use lms_core::{LaunchError, LmStudioPaths};

/// Display server variable the GUI runtime needs on Linux
const DISPLAY_VAR: &str = "DISPLAY";

/// Display used when none is set
const DEFAULT_DISPLAY: &str = ":0";

/// Launches LM Studio from its install pointer
#[derive(Debug, Clone)]
pub struct AppLauncher {
    pointer_path: PathBuf,
}

impl AppLauncher {
    /// Create a launcher reading the given install pointer file
    pub fn new(pointer_path: impl Into<PathBuf>) -> Self {
        Self {
            pointer_path: pointer_path.into(),
        }
    }

    /// Create a launcher for the standard install pointer location
    pub fn from_paths(paths: &LmStudioPaths) -> Self {
        Self::new(paths.install_pointer())
    }

    /// Read the install pointer and spawn the application
    ///
    /// Returns the PID of the detached child.
    pub async fn launch(&self) -> Result<u32, LaunchError> {
        let pointer = read_install_pointer(&self.pointer_path).await?;
        tracing::debug!(
            executable = %pointer.executable.display(),
            dev_checkout = pointer.is_dev_checkout(),
            "Launching LM Studio"
        );

        let child = build_command(&pointer)
            .spawn()
            .map_err(|source| LaunchError::Spawn {
                executable: pointer.executable.clone(),
                source,
            })?;

        Ok(detach(child))
    }
}

#[async_trait]
impl ServiceLauncher for AppLauncher {
    async fn wake_up(&self) -> bool {
        match self.launch().await {
            Ok(pid) => {
                tracing::info!(pid, "Started LM Studio in service mode");
                true
            }
            Err(e) => {
                tracing::error!("Could not launch LM Studio: {}", e);
                false
            }
        }
    }
}

/// Build the headless, detached invocation for an install pointer
pub fn build_command(pointer: &InstallPointer) -> Command {
    let mut cmd = Command::new(&pointer.executable);
    cmd.args(pointer.launch_args())
        .current_dir(&pointer.working_directory)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null());

    let display_set = std::env::var_os(DISPLAY_VAR).is_some();
    if let Some((key, value)) = display_default(cfg!(target_os = "linux"), display_set) {
        cmd.env(key, value);
    }

    // Own process group, so terminal signals aimed at the CLI skip the app.
    #[cfg(unix)]
    {
        use std::os::unix::process::CommandExt;
        cmd.process_group(0);
    }

    #[cfg(windows)]
    {
        use std::os::windows::process::CommandExt;
        const DETACHED_PROCESS: u32 = 0x0000_0008;
        const CREATE_NEW_PROCESS_GROUP: u32 = 0x0000_0200;
        cmd.creation_flags(DETACHED_PROCESS | CREATE_NEW_PROCESS_GROUP);
    }

    cmd
}

/// Environment addition for the child, if any
///
/// Headless Linux sessions often lack `DISPLAY`, and the application's GUI
/// runtime refuses to start without one even in service mode.
fn display_default(is_linux: bool, display_set: bool) -> Option<(&'static str, &'static str)> {
    (is_linux && !display_set).then_some((DISPLAY_VAR, DEFAULT_DISPLAY))
}

/// Abandon a spawned child
///
/// Dropping a `std::process::Child` neither kills nor waits for it. The
/// process lives on independently and this one keeps no handle to clean up;
/// it is never reaped by us.
fn detach(child: Child) -> u32 {
    let pid = child.id();
    drop(child);
    pid
}
