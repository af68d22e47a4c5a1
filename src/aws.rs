//! AWS CLI wrapper: all calls shell out to the `aws` binary.
//! Auth (SSO/profiles) is handled transparently by the CLI.

use std::process::Command;

use serde_json::json;

use crate::error::{AppError, Result};
use crate::models::RawInstance;

/// Something that can list the running instances of a region.
pub trait InstanceSource {
    /// `name_filters` are `tag:Name` values combined with OR; empty means no filter.
    fn running_instances(&self, region: &str, name_filters: &[String]) -> Result<Vec<RawInstance>>;
}

pub struct AwsCli {
    profile: String,
}

impl AwsCli {
    pub fn new(profile: impl Into<String>) -> Self {
        Self { profile: profile.into() }
    }

    fn aws_cmd(&self) -> Command {
        let mut cmd = Command::new("aws");
        cmd.args(["--profile", &self.profile]);
        cmd
    }

    fn run_aws(&self, args: &[&str]) -> Result<String> {
        let output = self.aws_cmd()
            .args(args)
            .args(["--output", "json"])
            .output()
            .map_err(|e| AppError::AwsCli(format!("cannot run `aws`: {}", e)))?;
        if !output.status.success() {
            return Err(AppError::AwsCli(
                String::from_utf8_lossy(&output.stderr).trim().to_string(),
            ));
        }
        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }
}

impl InstanceSource for AwsCli {
    fn running_instances(&self, region: &str, name_filters: &[String]) -> Result<Vec<RawInstance>> {
        let filters = describe_filters(name_filters).to_string();
        tracing::debug!(region, profile = %self.profile, %filters, "describe-instances");
        let json = self.run_aws(&[
            "ec2", "describe-instances",
            "--region", region,
            "--filters", &filters,
            "--query", "Reservations[*].Instances[*]",
        ])?;
        parse_instances(&json)
    }
}

fn describe_filters(name_filters: &[String]) -> serde_json::Value {
    let mut filters = vec![json!({"Name": "instance-state-name", "Values": ["running"]})];
    if !name_filters.is_empty() {
        filters.push(json!({"Name": "tag:Name", "Values": name_filters}));
    }
    serde_json::Value::Array(filters)
}

/// Parse `describe-instances` output queried as `Reservations[*].Instances[*]`.
fn parse_instances(json: &str) -> Result<Vec<RawInstance>> {
    let trimmed = json.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Ok(Vec::new());
    }
    let raw: Vec<Vec<RawInstance>> = serde_json::from_str(trimmed)?;
    Ok(raw.into_iter().flatten().collect())
}
