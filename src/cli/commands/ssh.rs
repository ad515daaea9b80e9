use clap::Args;
use tracing::debug;

use crate::aws::instance::InstanceLookup;
use crate::aws::{resolve_instance_id, AwsOptions};
use crate::config::Settings;
use crate::ssh::keys::{expand_tilde, find_default_private_key};
use crate::ssh::{KeyPair, ProxyCommand, ProxyStyle, SshInvocation, Target};
use crate::{Ec2SshError, Result};

#[derive(Args, Debug, Clone)]
pub struct SshArgs {
    /// AWS CLI profile to use
    #[arg(short, long, env = "AWS_PROFILE")]
    pub profile: Option<String>,

    /// AWS region (defaults to profile region)
    #[arg(short, long, env = "AWS_REGION")]
    pub region: Option<String>,

    /// SSH private key path (default: first found in ~/.ssh/)
    #[arg(short, long)]
    pub key: Option<String>,

    /// SSH port
    #[arg(short = 'P', long, default_value_t = 22)]
    pub port: u16,

    /// Increase SSH verbosity (use: -v, -vv, -vvv)
    #[arg(short, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Enable debug logging
    #[arg(short, long)]
    pub debug: bool,

    /// Instance to connect to
    #[arg(value_name = "[user@]instance-id-or-name", required = true)]
    pub target: Option<String>,
}

pub async fn execute<L>(
    args: SshArgs,
    settings: &Settings,
    style: ProxyStyle,
    lookup: &L,
) -> Result<()>
where
    L: InstanceLookup + ?Sized,
{
    let raw_target = args
        .target
        .ok_or_else(|| Ec2SshError::InvalidTarget(String::new()))?;

    // find the user's key in priority order if they didn't provide one
    let private_key = match args.key.as_deref() {
        Some(key) => expand_tilde(key)?,
        None => {
            let key = find_default_private_key()?;
            debug!("Using automatically detected private key: {}", key.display());
            key
        }
    };

    let aws = AwsOptions::new(args.profile, args.region);
    let target = Target::parse(&raw_target, settings.default_user())?;

    debug!(
        "Parsed flags: profile={}, region={}, user={}, key={}, port={}, target={}",
        aws.profile().unwrap_or_default(),
        aws.region().unwrap_or_default(),
        target.user,
        private_key.display(),
        args.port,
        raw_target
    );

    let instance_id = resolve_instance_id(lookup, &target.instance).await?;

    let keys = KeyPair::from_private(private_key)?;

    let proxy_command = ProxyCommand {
        public_key: &keys.public,
        user: &target.user,
        instance_id: &instance_id,
        aws: &aws,
        debug: args.debug,
    }
    .render(&style);

    debug!("ProxyCommand: {}", proxy_command);

    SshInvocation {
        program: settings.ssh_program().to_string(),
        identity_file: keys.private,
        proxy_command,
        port: args.port,
        verbosity: args.verbose,
        user: target.user,
        host: instance_id,
    }
    .run()
}
