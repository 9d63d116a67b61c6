use chrono::{DateTime, FixedOffset};
use mail_parser::{Address, MessageParser};

use super::{FlagSet, Seq};

/// The handful of header fields the shell shows for a message.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Headers {
    /// The `From` header, formatted as `Name <address>` entries joined by `, `.
    pub from: Option<String>,
    /// The `To` header, formatted like `from`.
    pub to: Option<String>,
    /// The decoded `Subject` header.
    pub subject: Option<String>,
}

impl Headers {
    /// Parse a raw header block (or a whole message). Anything that does not parse as a header
    /// block yields empty headers rather than an error.
    pub fn parse(raw: &[u8]) -> Headers {
        let message = match MessageParser::default().parse(raw) {
            Some(message) => message,
            None => return Headers::default(),
        };

        Headers {
            from: format_address_list(message.from()),
            to: format_address_list(message.to()),
            subject: message.subject().map(str::to_string),
        }
    }
}

fn format_address_list(addr: Option<&Address<'_>>) -> Option<String> {
    let parts: Vec<String> = addr?
        .iter()
        .map(|a| {
            let email = a.address.as_deref().unwrap_or("");
            match a.name.as_deref() {
                Some(name) if !name.is_empty() => format!("{} <{}>", name, email),
                _ => email.to_string(),
            }
        })
        .collect();

    if parts.is_empty() {
        None
    } else {
        Some(parts.join(", "))
    }
}

/// One row of a message listing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MessageSummary {
    /// The sequence number in the listed folder.
    pub seq: Seq,
    /// The parsed headers.
    pub headers: Headers,
    /// The server's internal date.
    pub internal_date: Option<DateTime<FixedOffset>>,
    /// The flags set on the message.
    pub flags: FlagSet,
}

/// A complete message, as shown by `peek`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Message {
    /// The sequence number in the folder it was fetched from.
    pub seq: Seq,
    /// The parsed headers.
    pub headers: Headers,
    /// The raw message.
    pub body: Vec<u8>,
    /// The server's internal date.
    pub internal_date: Option<DateTime<FixedOffset>>,
    /// The flags set on the message.
    pub flags: FlagSet,
}
