use aws_config::SdkConfig;
use aws_sdk_ec2instanceconnect::Client as InstanceConnectClient;
use tracing::debug;

use crate::{Ec2SshError, Result};

/// Authorize `public_key` for `os_user` on the instance through EC2 Instance Connect.
///
/// The key stays valid for a short window (60 seconds), long enough for the
/// SSH handshake that follows.
pub async fn send_ssh_public_key(
    config: &SdkConfig,
    instance_id: &str,
    os_user: &str,
    public_key: &str,
) -> Result<()> {
    let client = InstanceConnectClient::new(config);

    debug!(
        "Sending SSH public key for username: {} instance ID: {}",
        os_user, instance_id
    );

    let output = client
        .send_ssh_public_key()
        .instance_id(instance_id)
        .instance_os_user(os_user)
        .ssh_public_key(public_key)
        .send()
        .await
        .map_err(|e| Ec2SshError::aws("SendSSHPublicKey", e))?;

    debug!(
        "Instance Connect accepted key (request ID: {})",
        output.request_id().unwrap_or("unknown")
    );

    Ok(())
}
