//! Domain models and raw AWS CLI JSON deserialization types.

use chrono::{DateTime, Utc};
use clap::ValueEnum;
use serde::Deserialize;

// ── Domain models ─────────────────────────────────────────────────────────────

/// Which of an instance's addresses becomes the `HostName`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum AddressPolicy {
    /// Public address, falling back to the private one.
    #[default]
    #[value(name = "public_private")]
    PublicPrivate,
    #[value(name = "public")]
    Public,
    #[value(name = "private")]
    Private,
}

impl AddressPolicy {
    pub fn as_str(&self) -> &str {
        match self {
            Self::PublicPrivate => "public_private",
            Self::Public        => "public",
            Self::Private       => "private",
        }
    }

    /// Pick an address from `raw`, ignoring empty strings.
    pub fn select<'a>(&self, raw: &'a RawInstance) -> Option<&'a str> {
        let public = raw.public_ip.as_deref().filter(|s| !s.is_empty());
        let private = raw.private_ip.as_deref().filter(|s| !s.is_empty());
        match self {
            Self::PublicPrivate => public.or(private),
            Self::Public        => public,
            Self::Private       => private,
        }
    }
}

/// Per-host ssh directives, shared by every target of one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionOptions {
    pub port: Option<u16>,
    pub user: Option<String>,
    pub identity_file: Option<String>,
    pub identities_only: bool,
    pub server_alive_interval: Option<u32>,
    pub strict_host_key_checking: bool,
    pub proxy_command: Option<String>,
}

impl Default for ConnectionOptions {
    fn default() -> Self {
        Self {
            port: None,
            user: None,
            identity_file: None,
            identities_only: true,
            server_alive_interval: None,
            strict_host_key_checking: true,
            proxy_command: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginTarget {
    pub id: String,
    pub launch_time: Option<DateTime<Utc>>,
    pub base_name: String,
    pub name_index: usize,
    /// `Host` value; unique within one region.
    pub display_name: String,
    pub address: String,
    pub connection: ConnectionOptions,
}

// ── Raw JSON deserialization structs (aws cli output) ─────────────────────────

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawInstance {
    #[serde(rename = "InstanceId")]
    pub instance_id: String,
    #[serde(rename = "PrivateIpAddress", default)]
    pub private_ip: Option<String>,
    #[serde(rename = "PublicIpAddress", default)]
    pub public_ip: Option<String>,
    #[serde(rename = "LaunchTime", default)]
    pub launch_time: Option<DateTime<Utc>>,
    #[serde(rename = "Tags", default)]
    pub tags: Option<Vec<Tag>>,
}

impl RawInstance {
    /// Value of the first `Name` tag, if any.
    pub fn name_tag(&self) -> Option<&str> {
        self.tags
            .as_ref()?
            .iter()
            .find(|t| t.key == "Name")
            .map(|t| t.value.as_str())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Tag {
    #[serde(rename = "Key")]
    pub key: String,
    #[serde(rename = "Value")]
    pub value: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(public: Option<&str>, private: Option<&str>) -> RawInstance {
        RawInstance {
            instance_id: "i-1".into(),
            public_ip: public.map(Into::into),
            private_ip: private.map(Into::into),
            ..Default::default()
        }
    }

    #[test]
    fn public_private_prefers_public() {
        let r = raw(Some("1.2.3.4"), Some("10.0.0.1"));
        assert_eq!(AddressPolicy::PublicPrivate.select(&r), Some("1.2.3.4"));
        let r = raw(None, Some("10.0.0.1"));
        assert_eq!(AddressPolicy::PublicPrivate.select(&r), Some("10.0.0.1"));
    }

    #[test]
    fn strict_policies_do_not_fall_back() {
        let r = raw(None, Some("10.0.0.1"));
        assert_eq!(AddressPolicy::Public.select(&r), None);
        let r = raw(Some("1.2.3.4"), Some(""));
        assert_eq!(AddressPolicy::Private.select(&r), None);
    }

    #[test]
    fn deserializes_cli_json() {
        let json = r#"{
            "InstanceId": "i-0abc",
            "PrivateIpAddress": "10.0.0.5",
            "LaunchTime": "2019-01-01T09:00:00+00:00",
            "Tags": [{"Key": "Env", "Value": "prod"}, {"Key": "Name", "Value": "web"}],
            "InstanceType": "t3.micro"
        }"#;
        let r: RawInstance = serde_json::from_str(json).unwrap();
        assert_eq!(r.instance_id, "i-0abc");
        assert_eq!(r.public_ip, None);
        assert_eq!(r.name_tag(), Some("web"));
        assert_eq!(
            r.launch_time.unwrap().to_rfc3339(),
            "2019-01-01T09:00:00+00:00"
        );
    }

    #[test]
    fn missing_tags_have_no_name() {
        let r: RawInstance = serde_json::from_str(r#"{"InstanceId": "i-1"}"#).unwrap();
        assert_eq!(r.name_tag(), None);
        assert!(r.launch_time.is_none());
    }
}
