//! Status command implementation

use lms_core::{ConnectError, ConnectionRequest};

use crate::connect::Connector;
use crate::output::{format_connection, print_success};

/// Run the full connection bootstrap and report where it landed
pub async fn status_command(
    connector: &Connector,
    request: &ConnectionRequest,
) -> Result<(), ConnectError> {
    let client = connector.connect(request).await?;

    print_success(&format!("Connected to {}", client.base_url()));
    print!("{}", format_connection(&client));

    Ok(())
}
