use chrono::{DateTime, FixedOffset};

use super::{FlagSet, Seq};

/// The data items requested by a `FETCH`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FetchItems {
    /// The header block, internal date and flags.
    Headers,
    /// The complete message, internal date and flags.
    Full,
}

impl FetchItems {
    /// The `FETCH` item list. Both use `BODY.PEEK` so that fetching never sets `\Seen`.
    pub fn query(self) -> &'static str {
        match self {
            FetchItems::Headers => "(BODY.PEEK[HEADER] INTERNALDATE FLAGS)",
            FetchItems::Full => "(BODY.PEEK[] INTERNALDATE FLAGS)",
        }
    }
}

/// The data about one message that came back from a `FETCH`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Fetched {
    /// The sequence number of this message in the selection it was fetched from.
    pub seq: Seq,
    /// The header block, if [`FetchItems::Headers`] was requested.
    pub header: Option<Vec<u8>>,
    /// The whole message, byte for byte, if [`FetchItems::Full`] was requested.
    pub body: Option<Vec<u8>>,
    /// The date the server recorded when the message was delivered.
    pub internal_date: Option<DateTime<FixedOffset>>,
    /// The flags set on the message.
    pub flags: FlagSet,
}

impl Fetched {
    /// A fetch result with nothing but a sequence number.
    pub fn new(seq: Seq) -> Self {
        Fetched {
            seq,
            header: None,
            body: None,
            internal_date: None,
            flags: FlagSet::new(),
        }
    }
}
