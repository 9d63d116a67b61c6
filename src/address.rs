//! Host specifiers of the form `[user@]host[:port]`.

use std::fmt;
use std::str::FromStr;

use crate::error::AddressError;

/// The IMAP-over-TLS port from RFC 8314.
pub const IMAPS_PORT: u16 = 993;

/// The plaintext IMAP port from RFC 3501.
pub const IMAP_PORT: u16 = 143;

/// Where to connect and, optionally, who to log in as.
///
/// ```
/// # use imapshell::address::HostSpec;
/// let spec: HostSpec = "jane@example.com@imap.example.com:1993".parse().unwrap();
/// assert_eq!(spec.username.as_deref(), Some("jane@example.com"));
/// assert_eq!(spec.host, "imap.example.com");
/// assert_eq!(spec.port, Some(1993));
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HostSpec {
    /// The login name, if one was given before the last `@`.
    pub username: Option<String>,
    /// The server's host name or address.
    pub host: String,
    /// The port, if one was given after the first `:` following the host.
    pub port: Option<u16>,
}

impl HostSpec {
    /// The port to connect to: the explicit one, or the protocol default for the transport.
    pub fn port_or_default(&self, tls: bool) -> u16 {
        self.port
            .unwrap_or(if tls { IMAPS_PORT } else { IMAP_PORT })
    }
}

impl FromStr for HostSpec {
    type Err = AddressError;

    fn from_str(spec: &str) -> Result<Self, Self::Err> {
        // Split from the end in case the username is itself an email address.
        let (username, host_port) = match spec.rfind('@') {
            Some(at) => (Some(spec[..at].to_string()), &spec[at + 1..]),
            None => (None, spec),
        };

        let (host, port) = match host_port.find(':') {
            Some(colon) => {
                let port = &host_port[colon + 1..];
                let port = port
                    .parse::<u16>()
                    .map_err(|_| AddressError::BadPort(port.to_string()))?;
                (&host_port[..colon], Some(port))
            }
            None => (host_port, None),
        };

        if host.is_empty() {
            return Err(AddressError::EmptyHost(spec.to_string()));
        }

        Ok(HostSpec {
            username,
            host: host.to_string(),
            port,
        })
    }
}

impl fmt::Display for HostSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(ref username) = self.username {
            write!(f, "{}@", username)?;
        }
        f.write_str(&self.host)?;
        if let Some(port) = self.port {
            write!(f, ":{}", port)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(s: &str) -> Result<HostSpec, AddressError> {
        s.parse()
    }

    #[test]
    fn host_only() {
        let spec = parse("imap.example.com").unwrap();
        assert_eq!(spec.username, None);
        assert_eq!(spec.host, "imap.example.com");
        assert_eq!(spec.port, None);
        assert_eq!(spec.port_or_default(true), 993);
        assert_eq!(spec.port_or_default(false), 143);
    }

    #[test]
    fn user_host_port() {
        let spec = parse("alice@mail.example.org:10143").unwrap();
        assert_eq!(spec.username.as_deref(), Some("alice"));
        assert_eq!(spec.host, "mail.example.org");
        assert_eq!(spec.port, Some(10143));
        assert_eq!(spec.port_or_default(true), 10143);
    }

    #[test]
    fn splits_on_last_at() {
        let spec = parse("alice@example.com@imap.example.com").unwrap();
        assert_eq!(spec.username.as_deref(), Some("alice@example.com"));
        assert_eq!(spec.host, "imap.example.com");
    }

    #[test]
    fn user_may_contain_colon() {
        let spec = parse("us:er@host:993").unwrap();
        assert_eq!(spec.username.as_deref(), Some("us:er"));
        assert_eq!(spec.host, "host");
        assert_eq!(spec.port, Some(993));
    }

    #[test]
    fn every_user_host_port_round_trips() {
        let users = ["u", "first.last@example.com", "a@b@c", "with space"];
        let hosts = ["h", "imap.example.com", "127.0.0.1"];
        let ports = [1u16, 143, 993, 65535];
        for user in &users {
            for host in &hosts {
                for port in &ports {
                    let text = format!("{}@{}:{}", user, host, port);
                    let spec = parse(&text).unwrap();
                    assert_eq!(spec.username.as_deref(), Some(*user), "{}", text);
                    assert_eq!(spec.host, *host, "{}", text);
                    assert_eq!(spec.port, Some(*port), "{}", text);
                    assert_eq!(spec.to_string(), text);
                }
            }
        }
    }

    #[test]
    fn bad_port() {
        assert_eq!(
            parse("user@host:imaps"),
            Err(AddressError::BadPort("imaps".to_string()))
        );
        assert_eq!(
            parse("host:70000"),
            Err(AddressError::BadPort("70000".to_string()))
        );
        assert_eq!(parse("host:"), Err(AddressError::BadPort(String::new())));
        // only the first colon splits, so the rest is part of the port
        assert_eq!(
            parse("host:143:1"),
            Err(AddressError::BadPort("143:1".to_string()))
        );
    }

    #[test]
    fn empty_host() {
        assert!(matches!(parse("user@"), Err(AddressError::EmptyHost(_))));
        assert!(matches!(parse(":143"), Err(AddressError::EmptyHost(_))));
        assert!(matches!(parse(""), Err(AddressError::EmptyHost(_))));
    }
}
