//! Resolution of parsed CLI arguments into an immutable run configuration.

use std::path::PathBuf;

use crate::error::{AppError, Result};
use crate::models::{AddressPolicy, ConnectionOptions};
use crate::Cli;

#[derive(Debug, Clone)]
pub struct SyncConfig {
    pub profile: String,
    pub regions: Vec<String>,
    pub name_filters: Vec<String>,
    pub address: AddressPolicy,
    pub config_key: String,
    pub name_prefix: Option<String>,
    pub region_prefix: bool,
    pub connection: ConnectionOptions,
    pub output_file: Option<PathBuf>,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            profile: "default".into(),
            regions: Vec::new(),
            name_filters: Vec::new(),
            address: AddressPolicy::default(),
            config_key: "default".into(),
            name_prefix: None,
            region_prefix: false,
            connection: ConnectionOptions::default(),
            output_file: None,
        }
    }
}

impl SyncConfig {
    pub fn from_cli(cli: Cli) -> Result<Self> {
        let regions: Vec<String> = cli.region.iter().map(|r| r.trim().to_string()).collect();
        if regions.is_empty() || regions.iter().any(|r| r.is_empty()) {
            return Err(AppError::Config(
                "at least one non-empty region is required (--region or AWS_REGION)".into(),
            ));
        }

        let profile = non_empty(Some(cli.profile)).unwrap_or_else(|| "default".into());
        let config_key = non_empty(cli.config_key).unwrap_or_else(|| profile.clone());

        Ok(Self {
            profile,
            regions,
            name_filters: cli
                .ec2_filter_name
                .into_iter()
                .filter(|f| !f.is_empty())
                .collect(),
            address: cli.address,
            config_key,
            name_prefix: non_empty(cli.name_prefix),
            region_prefix: cli.region_prefix,
            connection: ConnectionOptions {
                port: cli.port,
                user: non_empty(Some(cli.user)),
                identity_file: non_empty(cli.identity_file),
                identities_only: !cli.no_identities_only,
                server_alive_interval: cli.server_alive_interval,
                strict_host_key_checking: !cli.skip_strict_host_checking,
                proxy_command: non_empty(cli.proxy_command),
            },
            output_file: cli.output_file.map(|p| expand_home(&p)),
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.is_empty())
}

/// Expand a leading `~/` (or a bare `~`) to the user's home directory.
fn expand_home(path: &str) -> PathBuf {
    let home = dirs::home_dir();
    match (path, home) {
        ("~", Some(home)) => home,
        (p, Some(home)) if p.starts_with("~/") => home.join(&p[2..]),
        (p, _) => PathBuf::from(p),
    }
}
