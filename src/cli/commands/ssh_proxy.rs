use clap::Args;
use tracing::debug;

use crate::aws::connect::send_ssh_public_key;
use crate::aws::session::start_ssh_session;
use crate::aws::AwsOptions;
use crate::config::Settings;
use crate::ssh::keys::{expand_tilde, find_default_private_key, public_key_path, read_public_key};
use crate::Result;

#[derive(Args, Debug, Clone)]
pub struct SshProxyArgs {
    /// AWS CLI profile to use
    #[arg(short, long, env = "AWS_PROFILE")]
    pub profile: Option<String>,

    /// AWS region (defaults to profile region)
    #[arg(short, long, env = "AWS_REGION")]
    pub region: Option<String>,

    /// SSH username
    #[arg(short, long)]
    pub username: String,

    /// EC2 instance ID
    #[arg(short, long)]
    pub instance_id: String,

    /// SSH port
    #[arg(short = 'P', long, default_value_t = 22)]
    pub port: u16,

    /// SSH public key path (default: first key found in ~/.ssh/, plus .pub)
    #[arg(short = 'k', long)]
    pub ssh_key: Option<String>,

    /// Enable debug logging
    #[arg(short, long)]
    pub debug: bool,
}

pub async fn execute(args: SshProxyArgs, settings: &Settings) -> Result<()> {
    let public_key_file = match args.ssh_key.as_deref() {
        Some(path) => expand_tilde(path)?,
        None => public_key_path(&find_default_private_key()?),
    };

    let aws = AwsOptions::new(args.profile, args.region);
    let config = aws.load().await;

    debug!("Reading SSH public key: {}", public_key_file.display());
    let public_key = read_public_key(&public_key_file)?;

    send_ssh_public_key(&config, &args.instance_id, &args.username, &public_key).await?;

    debug!("Starting SSH session");
    start_ssh_session(
        &config,
        &args.instance_id,
        args.port,
        aws.profile(),
        settings.session_manager_plugin(),
    )
    .await
}
