//! ssh_config rendering of derived targets.

use crate::models::LoginTarget;

pub const TOOL_NAME: &str = "aws-ssh-sync";

/// A rendered, key-tagged block of ssh_config lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub key: String,
    pub body: Vec<String>,
}

pub fn header(key: &str) -> String {
    format!("# BEGIN [{}]", key)
}

pub fn footer(key: &str) -> String {
    format!("# END [{}]", key)
}

impl Section {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            body: vec![format!("# Generated automatically by `{}`.", TOOL_NAME), String::new()],
        }
    }

    /// Append a region marker followed by one block per target.
    pub fn push_region(&mut self, region: &str, targets: &[LoginTarget]) {
        self.body.push(format!("## {}", region));
        self.body.push(String::new());
        for target in targets {
            self.body.extend(host_block(target));
            self.body.push(String::new());
        }
    }

    pub fn to_text(&self) -> String {
        section_text(&self.key, &self.body)
    }
}

/// `header \n body... \n footer \n`
pub fn section_text(key: &str, body: &[String]) -> String {
    let mut text = header(key);
    text.push('\n');
    for line in body {
        text.push_str(line);
        text.push('\n');
    }
    text.push_str(&footer(key));
    text.push('\n');
    text
}

fn host_block(target: &LoginTarget) -> Vec<String> {
    let conn = &target.connection;
    let mut lines = vec![
        format!("### {}", target.id),
        format!("Host {}", target.display_name),
        format!("\tHostName {}", target.address),
    ];
    if let Some(port) = conn.port {
        lines.push(format!("\tPort {}", port));
    }
    if let Some(user) = &conn.user {
        lines.push(format!("\tUser {}", user));
    }
    if let Some(identity_file) = &conn.identity_file {
        lines.push(format!("\tIdentityFile {}", identity_file));
    }
    if conn.identities_only {
        lines.push("\tIdentitiesOnly yes".into());
    }
    if let Some(secs) = conn.server_alive_interval {
        lines.push(format!("\tServerAliveInterval {}", secs));
    }
    if !conn.strict_host_key_checking {
        lines.push("\tStrictHostKeyChecking no".into());
        lines.push("\tUserKnownHostsFile=/dev/null".into());
    }
    if let Some(cmd) = &conn.proxy_command {
        lines.push(format!("\tProxyCommand {}", cmd));
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ConnectionOptions;

    fn target(id: &str, name: &str, address: &str, connection: ConnectionOptions) -> LoginTarget {
        LoginTarget {
            id: id.into(),
            launch_time: None,
            base_name: name.into(),
            name_index: 0,
            display_name: name.into(),
            address: address.into(),
            connection,
        }
    }

    #[test]
    fn empty_region_keeps_marker() {
        let mut section = Section::new("default");
        section.push_region("eu-central-1", &[]);
        assert_eq!(
            section.to_text(),
            "# BEGIN [default]\n\
             # Generated automatically by `aws-ssh-sync`.\n\
             \n\
             ## eu-central-1\n\
             \n\
             # END [default]\n"
        );
    }

    #[test]
    fn default_directives() {
        let conn = ConnectionOptions { user: Some("ec2-user".into()), ..Default::default() };
        let mut section = Section::new("default");
        section.push_region("eu-central-1", &[target("i-1", "i-1", "42.42.42.42", conn)]);
        assert_eq!(
            section.to_text(),
            "# BEGIN [default]\n\
             # Generated automatically by `aws-ssh-sync`.\n\
             \n\
             ## eu-central-1\n\
             \n\
             ### i-1\n\
             Host i-1\n\
             \tHostName 42.42.42.42\n\
             \tUser ec2-user\n\
             \tIdentitiesOnly yes\n\
             \n\
             # END [default]\n"
        );
    }

    #[test]
    fn every_directive_in_order() {
        let conn = ConnectionOptions {
            port: Some(2222),
            user: Some("tester".into()),
            identity_file: Some("~/.ssh/id_rsa.test".into()),
            identities_only: true,
            server_alive_interval: Some(100),
            strict_host_key_checking: false,
            proxy_command: Some("ssh -W %h:%p bastion".into()),
        };
        assert_eq!(
            host_block(&target("i-9", "node0", "10.0.0.9", conn)),
            vec![
                "### i-9",
                "Host node0",
                "\tHostName 10.0.0.9",
                "\tPort 2222",
                "\tUser tester",
                "\tIdentityFile ~/.ssh/id_rsa.test",
                "\tIdentitiesOnly yes",
                "\tServerAliveInterval 100",
                "\tStrictHostKeyChecking no",
                "\tUserKnownHostsFile=/dev/null",
                "\tProxyCommand ssh -W %h:%p bastion",
            ]
        );
    }

    #[test]
    fn regions_follow_each_other() {
        let conn = ConnectionOptions { identities_only: false, ..Default::default() };
        let mut section = Section::new("k");
        section.push_region("a", &[target("i-1", "x0", "1.1.1.1", conn)]);
        section.push_region("b", &[]);
        assert_eq!(
            section.body,
            vec![
                "# Generated automatically by `aws-ssh-sync`.",
                "",
                "## a",
                "",
                "### i-1",
                "Host x0",
                "\tHostName 1.1.1.1",
                "",
                "## b",
                "",
            ]
        );
    }
}
