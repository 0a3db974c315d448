//! Wake command implementation

use lms_core::traits::ServiceLauncher;
use lms_core::LmStudioPaths;

use crate::connect::AppLauncher;
use crate::output::{print_error, print_info, print_success};

/// Launch LM Studio in service mode without connecting
///
/// Returns whether the spawn succeeded.
pub async fn wake_command(paths: &LmStudioPaths) -> bool {
    let launcher = AppLauncher::from_paths(paths);
    print_info(&format!(
        "Launching LM Studio from {}",
        paths.install_pointer().display()
    ));

    if launcher.wake_up().await {
        print_success("LM Studio launched in service mode");
        true
    } else {
        print_error("Could not launch LM Studio; run with -v for details");
        false
    }
}
