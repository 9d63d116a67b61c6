//! The IMAP primitives the shell's operations are built from.
//!
//! [`Mailstore`] is the seam between the shell and the wire: the operations in [`crate::ops`]
//! only ever talk to a `Mailstore`, and this module implements it for an authenticated
//! [`imap::Session`]. Tests substitute the in-memory store from [`crate::testing`].

use std::io::{Read, Write};

use chrono::{DateTime, FixedOffset};
use imap_proto::{Capability, NameAttribute};

use crate::types::{FetchItems, Fetched, FlagSet, FolderInfo, FolderStatus, SequenceSet, Seq};

/// Whether a folder is opened with `EXAMINE` or `SELECT`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Access {
    /// `EXAMINE`: nothing in the folder can change, `\Seen` included.
    ReadOnly,
    /// `SELECT`: flags can be stored and messages expunged.
    ReadWrite,
}

/// An authenticated connection to one IMAP server.
///
/// Every method maps onto one protocol command. Sequence numbers passed in and returned are
/// relative to the currently selected folder.
pub trait Mailstore {
    /// `CAPABILITY`: the names of the capabilities the server advertises.
    fn capabilities(&mut self) -> imap::error::Result<Vec<String>>;

    /// `LIST "" *`: every folder visible to the user.
    fn list_folders(&mut self) -> imap::error::Result<Vec<FolderInfo>>;

    /// `STATUS <folder> (MESSAGES UNSEEN)`. Does not select the folder.
    fn folder_status(&mut self, folder: &str) -> imap::error::Result<FolderStatus>;

    /// `EXAMINE` or `SELECT`. Returns the number of messages in the folder.
    fn select_folder(&mut self, folder: &str, access: Access) -> imap::error::Result<u32>;

    /// `CLOSE`: leave the selected state.
    fn close_folder(&mut self) -> imap::error::Result<()>;

    /// `SEARCH ALL`, sorted by ascending sequence number.
    fn search_all(&mut self) -> imap::error::Result<Vec<Seq>>;

    /// `FETCH <set> <items>`, in ascending sequence order.
    fn fetch(&mut self, set: &SequenceSet, items: FetchItems) -> imap::error::Result<Vec<Fetched>>;

    /// `APPEND`: store `content` unmodified in `folder`, with the given flags and internal date.
    fn append(
        &mut self,
        folder: &str,
        content: &[u8],
        flags: &FlagSet,
        internal_date: Option<DateTime<FixedOffset>>,
    ) -> imap::error::Result<()>;

    /// `COPY <set> <folder>`.
    fn copy_messages(&mut self, set: &SequenceSet, folder: &str) -> imap::error::Result<()>;

    /// `STORE <set> +FLAGS.SILENT (\Deleted)`.
    fn mark_deleted(&mut self, set: &SequenceSet) -> imap::error::Result<()>;

    /// `EXPUNGE`: remove every message marked `\Deleted` from the selected folder.
    fn expunge(&mut self) -> imap::error::Result<()>;

    /// `CREATE <folder>`.
    fn create_folder(&mut self, folder: &str) -> imap::error::Result<()>;

    /// `DELETE <folder>`.
    fn delete_folder(&mut self, folder: &str) -> imap::error::Result<()>;

    /// `LOGOUT`.
    fn logout(&mut self) -> imap::error::Result<()>;
}

impl<T: Read + Write> Mailstore for imap::Session<T> {
    fn capabilities(&mut self) -> imap::error::Result<Vec<String>> {
        let capabilities = imap::Session::capabilities(self)?;
        let mut names: Vec<String> = capabilities
            .iter()
            .map(|capability| match *capability {
                Capability::Imap4rev1 => "IMAP4rev1".to_string(),
                Capability::Auth(ref mechanism) => format!("AUTH={}", mechanism),
                Capability::Atom(ref atom) => atom.to_string(),
            })
            .collect();
        names.sort();
        Ok(names)
    }

    fn list_folders(&mut self) -> imap::error::Result<Vec<FolderInfo>> {
        let names = imap::Session::list(self, Some(""), Some("*"))?;
        Ok(names
            .iter()
            .map(|name| FolderInfo {
                name: name.name().to_string(),
                delimiter: name.delimiter().map(str::to_string),
                attributes: name
                    .attributes()
                    .iter()
                    .filter_map(attribute_label)
                    .collect(),
            })
            .collect())
    }

    fn folder_status(&mut self, folder: &str) -> imap::error::Result<FolderStatus> {
        let mailbox = imap::Session::status(self, folder, "(MESSAGES UNSEEN)")?;
        Ok(FolderStatus {
            messages: mailbox.exists,
            unseen: mailbox.unseen.unwrap_or(0),
        })
    }

    fn select_folder(&mut self, folder: &str, access: Access) -> imap::error::Result<u32> {
        let mailbox = match access {
            Access::ReadOnly => imap::Session::examine(self, folder)?,
            Access::ReadWrite => imap::Session::select(self, folder)?,
        };
        Ok(mailbox.exists)
    }

    fn close_folder(&mut self) -> imap::error::Result<()> {
        imap::Session::close(self)
    }

    fn search_all(&mut self) -> imap::error::Result<Vec<Seq>> {
        let mut seqs: Vec<Seq> = imap::Session::search(self, "ALL")?.into_iter().collect();
        seqs.sort_unstable();
        Ok(seqs)
    }

    fn fetch(&mut self, set: &SequenceSet, items: FetchItems) -> imap::error::Result<Vec<Fetched>> {
        let fetches = imap::Session::fetch(self, set.to_string(), items.query())?;
        let mut fetched: Vec<Fetched> = fetches
            .iter()
            .map(|fetch| Fetched {
                seq: fetch.message,
                header: fetch.header().map(<[u8]>::to_vec),
                body: fetch.body().map(<[u8]>::to_vec),
                internal_date: fetch.internal_date(),
                flags: fetch
                    .flags()
                    .into_iter()
                    .map(|flag| flag.to_string())
                    .collect(),
            })
            .collect();
        fetched.sort_by_key(|f| f.seq);
        Ok(fetched)
    }

    fn append(
        &mut self,
        folder: &str,
        content: &[u8],
        flags: &FlagSet,
        internal_date: Option<DateTime<FixedOffset>>,
    ) -> imap::error::Result<()> {
        let mut append = imap::Session::append(self, folder, content);
        append.flags(flags.to_imap_flags());
        if let Some(date) = internal_date {
            append.internal_date(date);
        }
        append.finish().map(|_| ())
    }

    fn copy_messages(&mut self, set: &SequenceSet, folder: &str) -> imap::error::Result<()> {
        imap::Session::copy(self, set.to_string(), folder)
    }

    fn mark_deleted(&mut self, set: &SequenceSet) -> imap::error::Result<()> {
        imap::Session::store(self, set.to_string(), "+FLAGS.SILENT (\\Deleted)").map(|_| ())
    }

    fn expunge(&mut self) -> imap::error::Result<()> {
        imap::Session::expunge(self).map(|_| ())
    }

    fn create_folder(&mut self, folder: &str) -> imap::error::Result<()> {
        imap::Session::create(self, folder)
    }

    fn delete_folder(&mut self, folder: &str) -> imap::error::Result<()> {
        imap::Session::delete(self, folder)
    }

    fn logout(&mut self) -> imap::error::Result<()> {
        imap::Session::logout(self)
    }
}

/// The attribute as it appears on the wire, e.g. `\Noselect`. `None` for attributes added to
/// `imap-proto` after this was written.
fn attribute_label(attribute: &NameAttribute<'_>) -> Option<String> {
    let label = match *attribute {
        NameAttribute::NoInferiors => "\\Noinferiors",
        NameAttribute::NoSelect => "\\Noselect",
        NameAttribute::Marked => "\\Marked",
        NameAttribute::Unmarked => "\\Unmarked",
        NameAttribute::All => "\\All",
        NameAttribute::Archive => "\\Archive",
        NameAttribute::Drafts => "\\Drafts",
        NameAttribute::Flagged => "\\Flagged",
        NameAttribute::Junk => "\\Junk",
        NameAttribute::Sent => "\\Sent",
        NameAttribute::Trash => "\\Trash",
        NameAttribute::Extension(ref name) => return Some(name.to_string()),
        _ => return None,
    };
    Some(label.to_string())
}
