use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::{Ec2SshError, Result};

pub const DEFAULT_USER: &str = "ec2-user";
pub const DEFAULT_SSH_PROGRAM: &str = "ssh";
pub const DEFAULT_SESSION_MANAGER_PLUGIN: &str = "session-manager-plugin";

/// Global settings for ec2-ssh
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Settings {
    /// OS user to connect as when the target has no `user@` prefix
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_user: Option<String>,

    /// SSH client binary
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ssh_program: Option<String>,

    /// Session Manager plugin binary
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_manager_plugin: Option<String>,

    /// Program embedded in the ProxyCommand (defaults to the running executable)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proxy_program: Option<String>,
}

impl Settings {
    /// Get the path to the config file
    pub fn config_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "ec2-ssh").map(|dirs| dirs.config_dir().join("config.json"))
    }

    /// Load settings from the config file, falling back to defaults if it is absent
    pub fn load() -> Result<Self> {
        match Self::config_path() {
            Some(path) => Self::load_from(&path),
            None => Ok(Self::default()),
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        let settings: Settings = serde_json::from_str(&content).map_err(|e| {
            Ec2SshError::Config(format!(
                "Failed to parse config file {}: {}",
                path.display(),
                e
            ))
        })?;
        settings.validate()?;

        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        if let Some(user) = &self.default_user {
            Self::validate_username(user)?;
        }
        for (field, value) in [
            ("ssh_program", &self.ssh_program),
            ("session_manager_plugin", &self.session_manager_plugin),
            ("proxy_program", &self.proxy_program),
        ] {
            if matches!(value, Some(v) if v.trim().is_empty()) {
                return Err(Ec2SshError::Config(format!("{} cannot be empty", field)));
            }
        }
        Ok(())
    }

    /// Validate an OS username
    pub fn validate_username(user: &str) -> Result<()> {
        if user.is_empty() {
            return Err(Ec2SshError::Config("Username cannot be empty".to_string()));
        }
        if user.len() > 32 {
            return Err(Ec2SshError::Config(
                "Username cannot exceed 32 characters".to_string(),
            ));
        }
        if user.contains('@') || user.chars().any(|c| c.is_whitespace() || c.is_control()) {
            return Err(Ec2SshError::Config(format!(
                "Username '{}' must not contain '@' or whitespace",
                user
            )));
        }
        Ok(())
    }

    pub fn default_user(&self) -> &str {
        self.default_user.as_deref().unwrap_or(DEFAULT_USER)
    }

    pub fn ssh_program(&self) -> &str {
        self.ssh_program.as_deref().unwrap_or(DEFAULT_SSH_PROGRAM)
    }

    pub fn session_manager_plugin(&self) -> &str {
        self.session_manager_plugin
            .as_deref()
            .unwrap_or(DEFAULT_SESSION_MANAGER_PLUGIN)
    }

    /// Program `ssh` re-invokes for the `ssh-proxy` subcommand
    pub fn proxy_program(&self) -> Result<PathBuf> {
        match &self.proxy_program {
            Some(program) => Ok(PathBuf::from(program)),
            None => Ok(std::env::current_exe()?),
        }
    }
}
