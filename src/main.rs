//! aws-ssh-sync: generate ssh_config sections from running EC2 instances
//!
//! Queries each region through the `aws` CLI, names every running instance
//! deterministically and writes the hosts to stdout or merges them into an
//! existing ssh_config file under a `# BEGIN [<key>]` / `# END [<key>]` pair.

mod aws;
mod config;
mod error;
mod models;
mod output;
mod render;
mod section;
mod targets;

use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};
use tracing_subscriber::EnvFilter;

use crate::aws::{AwsCli, InstanceSource};
use crate::config::SyncConfig;
use crate::models::AddressPolicy;
use crate::output::Destination;
use crate::render::Section;

// ── CLI definition ────────────────────────────────────────────────────────────

#[derive(Debug, Parser)]
#[command(
    name = "aws-ssh-sync",
    about = "Generate ssh_config files from AWS.",
    after_help = "Check ssh_config man page for an output format reference.",
    disable_version_flag = true
)]
pub struct Cli {
    /// Print current version number and exit.
    #[arg(short = 'v', long = "version", help_heading = "Docs")]
    pub version: bool,

    /// Use a specific AWS profile. Falls back to AWS_PROFILE, then 'default'.
    #[arg(short, long, env = "AWS_PROFILE", default_value = "default", help_heading = "AWS")]
    pub profile: String,

    /// Connect to region(s). Falls back to AWS_REGION.
    // Checked in `main` so that `--version` works without a region.
    #[arg(short, long, env = "AWS_REGION", num_args = 1.., help_heading = "AWS")]
    pub region: Vec<String>,

    /// Name filter for the EC2 instance query. Use '*' as a wildcard.
    /// Multiple filters are combined with 'OR'.
    #[arg(short = 'f', long, value_name = "FILTER", num_args = 1.., help_heading = "AWS")]
    pub ec2_filter_name: Vec<String>,

    /// Define how EC2 address resolution should work.
    #[arg(short, long, value_enum, default_value_t = AddressPolicy::PublicPrivate, help_heading = "AWS")]
    pub address: AddressPolicy,

    /// Use an explicit key to identify this 'config'. Falls back to the profile.
    #[arg(short = 'k', long, value_name = "KEY", help_heading = "Output")]
    pub config_key: Option<String>,

    /// Output file. Overwrites the relevant `config-key` section if it
    /// exists, appends a new section otherwise.
    #[arg(short, long, value_name = "FILE", help_heading = "Output")]
    pub output_file: Option<String>,

    /// Add a region prefix to all SSH host names.
    #[arg(short = 'R', long, help_heading = "SSH")]
    pub region_prefix: bool,

    /// Add a string prefix to all SSH host names.
    #[arg(short = 'P', long, value_name = "PREF", help_heading = "SSH")]
    pub name_prefix: Option<String>,

    /// Use an explicit port.
    #[arg(long, value_name = "PORT", help_heading = "SSH")]
    pub port: Option<u16>,

    /// Sign in as user.
    #[arg(short = 'U', long, default_value = "ec2-user", help_heading = "SSH")]
    pub user: String,

    /// Use specific identity file.
    #[arg(short = 'I', long, value_name = "FILE", help_heading = "SSH")]
    pub identity_file: Option<String>,

    /// Provide a ServerAliveInterval in seconds.
    #[arg(short = 'A', long, value_name = "SECS", help_heading = "SSH")]
    pub server_alive_interval: Option<u32>,

    /// Don't add an IdentitiesOnly directive.
    #[arg(short = 'O', long, help_heading = "SSH")]
    pub no_identities_only: bool,

    /// Skip strict host key checking and ignore any entries in the `known_hosts` file.
    #[arg(short = 'S', long, help_heading = "SSH")]
    pub skip_strict_host_checking: bool,

    /// Provide a ProxyCommand directive.
    #[arg(long, value_name = "COMMAND", help_heading = "SSH")]
    pub proxy_command: Option<String>,
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() {
    init_tracing();
    let cli = Cli::parse();
    if cli.version {
        println!("{}", env!("CARGO_PKG_VERSION"));
        return;
    }
    if cli.region.is_empty() {
        Cli::command()
            .error(
                ErrorKind::MissingRequiredArgument,
                "the following required arguments were not provided:\n  --region <REGION>...",
            )
            .exit();
    }
    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> error::Result<()> {
    let config = SyncConfig::from_cli(cli)?;
    tracing::debug!(
        profile = %config.profile,
        regions = ?config.regions,
        address = config.address.as_str(),
        key = %config.config_key,
        "resolved configuration"
    );

    let source = AwsCli::new(config.profile.clone());
    let section = build_section(&config, &source)?;
    Destination::new(config.output_file.clone()).write(&section)
}

/// Query every region in order and render the resulting hosts.
fn build_section(config: &SyncConfig, source: &impl InstanceSource) -> error::Result<Section> {
    let mut section = Section::new(config.config_key.clone());
    for region in &config.regions {
        let instances = source.running_instances(region, &config.name_filters)?;
        tracing::debug!(region = %region, instances = instances.len(), "fetched instances");
        let targets = targets::derive(config, region, instances);
        section.push_region(region, &targets);
    }
    Ok(section)
}
