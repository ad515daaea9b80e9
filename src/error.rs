use std::path::PathBuf;

use aws_sdk_ec2::error::{DisplayErrorContext, ProvideErrorMetadata};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Ec2SshError {
    // AWS Errors
    #[error("AWS {operation} failed: {message}")]
    Aws {
        operation: &'static str,
        code: Option<String>,
        message: String,
    },

    #[error("AWS SSM error: {0}")]
    Ssm(String),

    // Instance Errors
    #[error("there are no running instances with Name tag: {0}")]
    InstanceNotFound(String),

    #[error("there are multiple running instances with Name tag '{name}': [{}]", .ids.join(", "))]
    AmbiguousInstance { name: String, ids: Vec<String> },

    #[error("Invalid target '{0}': expected [user@]instance-id-or-name")]
    InvalidTarget(String),

    // Key Errors
    #[error("SSH private key was not found in ~/.ssh (tried {tried})")]
    PrivateKeyNotFound { tried: String },

    #[error("SSH private key not found: {}", .0.display())]
    KeyFileNotFound(PathBuf),

    #[error("Could not find matching public key for {} (expected {})", .private.display(), .expected.display())]
    PublicKeyNotFound { private: PathBuf, expected: PathBuf },

    #[error("Cannot determine home directory")]
    HomeDirectory,

    // SSH/Session Errors
    #[error("Session Manager plugin not found. Install from: https://docs.aws.amazon.com/systems-manager/latest/userguide/session-manager-working-with-install-plugin.html")]
    SessionManagerPluginNotFound,

    #[error("Session Manager plugin failed: {0}")]
    SessionManagerPlugin(String),

    #[error("ssh failed: {0}")]
    SshCommand(String),

    // Config Errors
    #[error("Configuration error: {0}")]
    Config(String),

    // File/IO Errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Ec2SshError {
    /// Wrap an SDK error, keeping its service error code for classification.
    pub fn aws<E>(operation: &'static str, err: E) -> Self
    where
        E: ProvideErrorMetadata + std::error::Error + 'static,
    {
        Ec2SshError::Aws {
            operation,
            code: err.code().map(String::from),
            message: DisplayErrorContext(&err).to_string(),
        }
    }

    pub fn ssm(err: impl std::fmt::Display) -> Self {
        Ec2SshError::Ssm(err.to_string())
    }

    /// Actionable follow-up lines for provider failures, empty for everything else.
    pub fn hints(&self, profile: Option<&str>) -> Vec<String> {
        let Ec2SshError::Aws { code, message, .. } = self else {
            return Vec::new();
        };

        let profile = profile.unwrap_or("default");
        match AwsFailure::classify(code.as_deref(), message) {
            AwsFailure::ExpiredCredentials => vec![
                "Your AWS credentials have expired or are invalid.".to_string(),
                format!("Run: aws sso login --profile {}", profile),
            ],
            AwsFailure::AccessDenied => vec![format!(
                "Check your IAM permissions or AWS account. (profile: {})",
                profile
            )],
            AwsFailure::Canceled => vec![
                "AWS request was canceled (possible credential/config timeout).".to_string(),
            ],
            AwsFailure::SsoExpired => vec![
                "Your AWS SSO session has expired or is invalid.".to_string(),
                format!("Run: aws sso login --profile {}", profile),
            ],
            AwsFailure::NoCredentials => vec![
                format!("No AWS credentials found for profile '{}'.", profile),
                format!("Configure credentials with: aws configure --profile {}", profile),
            ],
            AwsFailure::Other => Vec::new(),
        }
    }
}

/// Coarse category of a provider failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AwsFailure {
    ExpiredCredentials,
    AccessDenied,
    Canceled,
    SsoExpired,
    NoCredentials,
    Other,
}

const SSO_EXPIRED_PATTERNS: &[&str] = &[
    "the SSO session has expired or is invalid",
    "The SSO session associated with this profile has expired",
    "SSO session token is invalid",
    "SSO token has expired",
];

const NO_CREDENTIALS_PATTERNS: &[&str] = &[
    "Unable to locate credentials",
    "NoCredentialProviders",
    "no providers in chain provided credentials",
];

impl AwsFailure {
    /// Service error codes win over message patterns.
    pub fn classify(code: Option<&str>, message: &str) -> Self {
        match code {
            Some("ExpiredToken" | "ExpiredTokenException" | "InvalidClientTokenId") => {
                return AwsFailure::ExpiredCredentials
            }
            Some(
                "AccessDenied"
                | "AccessDeniedException"
                | "UnauthorizedOperation"
                | "UnrecognizedClientException",
            ) => return AwsFailure::AccessDenied,
            Some("RequestCanceled") => return AwsFailure::Canceled,
            _ => {}
        }

        if SSO_EXPIRED_PATTERNS.iter().any(|p| message.contains(p)) {
            AwsFailure::SsoExpired
        } else if NO_CREDENTIALS_PATTERNS.iter().any(|p| message.contains(p)) {
            AwsFailure::NoCredentials
        } else {
            AwsFailure::Other
        }
    }
}

pub type Result<T> = std::result::Result<T, Ec2SshError>;
