use clap::{Parser, Subcommand};
use tracing::error;
use tracing_subscriber::EnvFilter;

mod aws;
mod cli;
mod config;
mod error;
mod ssh;

pub use error::{Ec2SshError, Result};

use aws::{AwsOptions, Ec2InstanceLookup};
use cli::commands::{self, SshArgs, SshProxyArgs};
use config::Settings;
use ssh::ProxyStyle;

#[derive(Parser)]
#[command(name = "ec2-ssh")]
#[command(about = "SSH into EC2 instances through SSM Session Manager and EC2 Instance Connect")]
#[command(version)]
#[command(propagate_version = true)]
#[command(args_conflicts_with_subcommands = true)]
#[command(subcommand_negates_reqs = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Without a subcommand, connect using the aws CLI as the ProxyCommand
    #[command(flatten)]
    legacy: SshArgs,
}

#[derive(Subcommand)]
enum Commands {
    /// SSH into an instance by ID or Name tag
    Ssh(SshArgs),

    /// Push the SSH key and open the SSM tunnel (used as ssh's ProxyCommand)
    SshProxy(SshProxyArgs),

    /// Inspect ec2-ssh settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Show current configuration
    Show,
}

impl Cli {
    fn debug(&self) -> bool {
        match &self.command {
            Some(Commands::Ssh(args)) => args.debug,
            Some(Commands::SshProxy(args)) => args.debug,
            Some(Commands::Config { .. }) => false,
            None => self.legacy.debug,
        }
    }

    fn profile(&self) -> Option<&str> {
        let profile = match &self.command {
            Some(Commands::Ssh(args)) => args.profile.as_deref(),
            Some(Commands::SshProxy(args)) => args.profile.as_deref(),
            Some(Commands::Config { .. }) => None,
            None => self.legacy.profile.as_deref(),
        };
        profile.filter(|p| !p.is_empty())
    }
}

/// Logs go to stderr: in `ssh-proxy` stdout carries the SSH stream.
fn init_logging(debug: bool) {
    let level = if debug { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("warn,ec2_ssh={}", level)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn instance_lookup(args: &SshArgs) -> Ec2InstanceLookup {
    Ec2InstanceLookup::new(AwsOptions::new(args.profile.clone(), args.region.clone()))
}

async fn run(cli: Cli) -> Result<()> {
    let settings = Settings::load()?;

    match cli.command {
        Some(Commands::Ssh(args)) => {
            let style = ProxyStyle::Subcommand {
                program: settings.proxy_program()?,
            };
            let lookup = instance_lookup(&args);
            commands::ssh::execute(args, &settings, style, &lookup).await
        }
        Some(Commands::SshProxy(args)) => commands::ssh_proxy::execute(args, &settings).await,
        Some(Commands::Config { command }) => match command {
            ConfigCommands::Show => commands::config::show(&settings),
        },
        None => {
            let lookup = instance_lookup(&cli.legacy);
            commands::ssh::execute(cli.legacy, &settings, ProxyStyle::AwsCli, &lookup).await
        }
    }
}

/// Help and version exit 0; every usage error exits 1.
fn parse_exit_code(err: &clap::Error) -> i32 {
    if err.use_stderr() {
        1
    } else {
        0
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let _ = err.print();
            std::process::exit(parse_exit_code(&err));
        }
    };
    init_logging(cli.debug());

    let profile = cli.profile().map(String::from);
    let result = run(cli).await;

    if let Err(err) = &result {
        for hint in err.hints(profile.as_deref()) {
            error!("{}", hint);
        }
    }

    Ok(result?)
}
