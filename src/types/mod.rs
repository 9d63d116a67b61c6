//! This module contains the values the shell reads from and hands to an IMAP server.

/// From section [2.3.1.2 of RFC 3501](https://tools.ietf.org/html/rfc3501#section-2.3.1.2).
///
/// A relative position from 1 to the number of messages in the mailbox.
/// This position is ordered by ascending unique identifier.
///
/// Message sequence numbers can be reassigned during the session. For
/// example, when a message is permanently removed (expunged) from the
/// mailbox, the message sequence number for all subsequent messages is
/// decremented. A sequence number is therefore only meaningful for the
/// selection it was obtained in, and is never carried across folders or servers.
pub type Seq = u32;

mod flag;
pub use self::flag::{FlagSet, RECENT};

mod folder;
pub use self::folder::{FolderInfo, FolderStatus};

mod fetch;
pub use self::fetch::{FetchItems, Fetched};

mod message;
pub use self::message::{Headers, Message, MessageSummary};

mod sequence;
pub use self::sequence::SequenceSet;
