use std::ffi::OsString;
use std::path::PathBuf;
use std::process::{Command, Stdio};

use tracing::debug;

use crate::{Ec2SshError, Result};

/// One interactive `ssh` run through a ProxyCommand
#[derive(Debug, Clone)]
pub struct SshInvocation {
    pub program: String,
    pub identity_file: PathBuf,
    pub proxy_command: String,
    pub port: u16,
    /// Number of `v`s passed through to ssh
    pub verbosity: u8,
    pub user: String,
    pub host: String,
}

impl SshInvocation {
    pub fn args(&self) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec![
            "-i".into(),
            self.identity_file.clone().into_os_string(),
            "-o".into(),
            format!("ProxyCommand={}", self.proxy_command).into(),
            "-p".into(),
            self.port.to_string().into(),
        ];

        if self.verbosity > 0 {
            args.push(format!("-{}", "v".repeat(self.verbosity as usize)).into());
        }

        args.push(format!("{}@{}", self.user, self.host).into());
        args
    }

    /// Run ssh in the foreground with inherited stdio.
    pub fn run(&self) -> Result<()> {
        let args = self.args();

        debug!(
            "SSH command: {} {}",
            self.program,
            args.iter()
                .map(|a| a.to_string_lossy())
                .collect::<Vec<_>>()
                .join(" ")
        );

        let status = Command::new(&self.program)
            .args(&args)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .map_err(|e| Ec2SshError::SshCommand(format!("{}: {}", self.program, e)))?;

        if !status.success() {
            return Err(Ec2SshError::SshCommand(format!(
                "SSH session exited with code: {:?}",
                status.code()
            )));
        }

        Ok(())
    }
}
