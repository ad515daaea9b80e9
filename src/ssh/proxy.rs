use std::borrow::Cow;
use std::path::{Path, PathBuf};

use shell_escape::unix::escape;

use crate::aws::session::SSH_SESSION_DOCUMENT;
use crate::aws::AwsOptions;

/// What the generated ProxyCommand runs
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProxyStyle {
    /// Re-invoke this tool's `ssh-proxy` subcommand
    Subcommand { program: PathBuf },
    /// Legacy mode: chain two `aws` CLI calls
    AwsCli,
}

/// Inputs for one ProxyCommand
#[derive(Debug, Clone)]
pub struct ProxyCommand<'a> {
    pub public_key: &'a Path,
    pub user: &'a str,
    pub instance_id: &'a str,
    pub aws: &'a AwsOptions,
    pub debug: bool,
}

/// Shell-quote a value and protect literal `%` from ssh's token expansion.
fn quote(value: &str) -> String {
    escape(Cow::Borrowed(value)).replace('%', "%%")
}

fn quote_path(path: &Path) -> String {
    quote(&path.to_string_lossy())
}

impl ProxyCommand<'_> {
    /// Render the command line. ssh substitutes `%p` with the connection port.
    pub fn render(&self, style: &ProxyStyle) -> String {
        match style {
            ProxyStyle::Subcommand { program } => self.render_subcommand(program),
            ProxyStyle::AwsCli => self.render_aws_cli(),
        }
    }

    fn aws_flags(&self) -> String {
        let mut flags = String::new();
        if let Some(profile) = self.aws.profile() {
            flags.push_str(&format!(" --profile {}", quote(profile)));
        }
        if let Some(region) = self.aws.region() {
            flags.push_str(&format!(" --region {}", quote(region)));
        }
        flags
    }

    fn render_subcommand(&self, program: &Path) -> String {
        let mut cmd = format!(
            "{} ssh-proxy --ssh-key {} --username {} --instance-id {} --port %p{}",
            quote_path(program),
            quote_path(self.public_key),
            quote(self.user),
            quote(self.instance_id),
            self.aws_flags(),
        );
        if self.debug {
            cmd.push_str(" --debug");
        }
        cmd
    }

    fn render_aws_cli(&self) -> String {
        let flags = self.aws_flags();
        let instance_id = quote(self.instance_id);
        let inner = format!(
            "aws ec2-instance-connect send-ssh-public-key --instance-id {id} --instance-os-user {user} --ssh-public-key file://{key}{flags} > /dev/null && aws ssm start-session --target {id} --document-name {doc} --parameters portNumber=%p{flags}",
            id = instance_id,
            user = quote(self.user),
            key = quote_path(self.public_key),
            doc = SSH_SESSION_DOCUMENT,
            flags = flags,
        );
        format!("sh -c {}", escape(Cow::Owned(inner)))
    }
}
