use std::collections::HashMap;
use std::io::ErrorKind;
use std::process::{Command, Stdio};

use aws_config::SdkConfig;
use aws_sdk_ssm::Client as SsmClient;
use serde::Serialize;
use tracing::{debug, warn};

use crate::{Ec2SshError, Result};

/// SSM document that forwards a single port to the instance for SSH
pub const SSH_SESSION_DOCUMENT: &str = "AWS-StartSSHSession";

/// Session credentials returned by StartSession, in the shape the plugin expects
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct SessionResponse {
    pub session_id: String,
    pub token_value: String,
    pub stream_url: String,
}

/// The StartSession request, echoed to the plugin
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct SessionRequest {
    pub target: String,
    pub document_name: String,
    pub parameters: HashMap<String, Vec<String>>,
}

impl SessionRequest {
    pub fn ssh(instance_id: &str, port: u16) -> Self {
        Self {
            target: instance_id.to_string(),
            document_name: SSH_SESSION_DOCUMENT.to_string(),
            parameters: HashMap::from([("portNumber".to_string(), vec![port.to_string()])]),
        }
    }
}

/// Everything needed to hand an open session over to `session-manager-plugin`
#[derive(Debug, Clone)]
pub struct PluginHandoff {
    pub response: SessionResponse,
    pub request: SessionRequest,
    pub region: String,
    pub profile: Option<String>,
    pub endpoint: String,
}

impl PluginHandoff {
    /// Positional arguments in the order the plugin reads them.
    pub fn args(&self) -> Result<Vec<String>> {
        Ok(vec![
            serde_json::to_string(&self.response)?,
            self.region.clone(),
            "StartSession".to_string(),
            self.profile.clone().unwrap_or_default(),
            serde_json::to_string(&self.request)?,
            self.endpoint.clone(),
        ])
    }

    /// Run the plugin attached to this process's stdio until the tunnel closes.
    pub fn run(&self, plugin: &str) -> Result<()> {
        let status = Command::new(plugin)
            .args(self.args()?)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .map_err(|e| match e.kind() {
                ErrorKind::NotFound => Ec2SshError::SessionManagerPluginNotFound,
                _ => Ec2SshError::SessionManagerPlugin(e.to_string()),
            })?;

        if !status.success() {
            return Err(Ec2SshError::SessionManagerPlugin(format!(
                "exited with code: {:?}",
                status.code()
            )));
        }

        Ok(())
    }
}

/// Default public SSM endpoint for a region
pub fn ssm_endpoint(region: &str) -> String {
    format!("https://ssm.{}.amazonaws.com", region)
}

/// Open an `AWS-StartSSHSession` tunnel to `instance_id:port` over this process's stdio.
pub async fn start_ssh_session(
    config: &SdkConfig,
    instance_id: &str,
    port: u16,
    profile: Option<&str>,
    plugin: &str,
) -> Result<()> {
    let region = config
        .region()
        .map(|r| r.to_string())
        .ok_or_else(|| {
            Ec2SshError::Config(
                "No AWS region configured. Pass --region or set AWS_REGION.".to_string(),
            )
        })?;

    let client = SsmClient::new(config);
    let request = SessionRequest::ssh(instance_id, port);

    debug!(
        "Starting SSM session: target={}, document={}, port={}",
        instance_id, SSH_SESSION_DOCUMENT, port
    );

    let output = client
        .start_session()
        .target(&request.target)
        .document_name(&request.document_name)
        .parameters("portNumber", vec![port.to_string()])
        .send()
        .await
        .map_err(|e| Ec2SshError::aws("StartSession", e))?;

    let session_id = output
        .session_id()
        .ok_or_else(|| Ec2SshError::ssm("StartSession returned no session ID"))?
        .to_string();

    let response = SessionResponse {
        session_id: session_id.clone(),
        token_value: output
            .token_value()
            .ok_or_else(|| Ec2SshError::ssm("StartSession returned no token"))?
            .to_string(),
        stream_url: output
            .stream_url()
            .ok_or_else(|| Ec2SshError::ssm("StartSession returned no stream URL"))?
            .to_string(),
    };

    let handoff = PluginHandoff {
        response,
        request,
        endpoint: config
            .endpoint_url()
            .map(String::from)
            .unwrap_or_else(|| ssm_endpoint(&region)),
        region,
        profile: profile.map(String::from),
    };

    debug!("Handing session {} to {}", session_id, plugin);

    if let Err(err) = handoff.run(plugin) {
        if let Err(term_err) = client
            .terminate_session()
            .session_id(&session_id)
            .send()
            .await
        {
            warn!("Failed to terminate session {}: {}", session_id, term_err);
        }
        return Err(err);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    fn handoff(profile: Option<&str>) -> PluginHandoff {
        PluginHandoff {
            response: SessionResponse {
                session_id: "alice-0abc".into(),
                token_value: "token".into(),
                stream_url: "wss://ssmmessages.us-east-1.amazonaws.com/v1/data-channel/alice-0abc"
                    .into(),
            },
            request: SessionRequest::ssh("i-0123456789abcdef0", 2222),
            region: "us-east-1".into(),
            profile: profile.map(String::from),
            endpoint: ssm_endpoint("us-east-1"),
        }
    }

    #[test]
    fn test_plugin_args_shape() {
        let args = handoff(Some("dev")).args().unwrap();
        assert_eq!(args.len(), 6);
        assert_eq!(args[1], "us-east-1");
        assert_eq!(args[2], "StartSession");
        assert_eq!(args[3], "dev");
        assert_eq!(args[5], "https://ssm.us-east-1.amazonaws.com");

        let response: Value = serde_json::from_str(&args[0]).unwrap();
        assert_eq!(response["SessionId"], "alice-0abc");
        assert_eq!(response["TokenValue"], "token");
        assert!(response["StreamUrl"].as_str().unwrap().starts_with("wss://"));

        let request: Value = serde_json::from_str(&args[4]).unwrap();
        assert_eq!(request["Target"], "i-0123456789abcdef0");
        assert_eq!(request["DocumentName"], "AWS-StartSSHSession");
        assert_eq!(request["Parameters"]["portNumber"][0], "2222");
    }

    #[test]
    fn test_plugin_args_without_profile() {
        let args = handoff(None).args().unwrap();
        assert_eq!(args[3], "");
    }

    #[test]
    fn test_missing_plugin_is_reported() {
        let err = handoff(None)
            .run("ec2-ssh-test-no-such-plugin")
            .unwrap_err();
        assert!(matches!(err, Ec2SshError::SessionManagerPluginNotFound));
    }
}
