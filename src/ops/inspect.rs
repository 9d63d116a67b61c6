use log::debug;

use crate::error::{Error, Result};
use crate::folder::with_folder;
use crate::mailstore::{Access, Mailstore};
use crate::types::{
    FetchItems, FolderInfo, FolderStatus, Headers, Message, MessageSummary, Seq, SequenceSet,
};

/// One folder in a folder listing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FolderRow {
    /// What `LIST` said about the folder.
    pub folder: FolderInfo,
    /// The message counts. `None` for folders that cannot hold messages (`\Noselect`).
    pub status: Option<FolderStatus>,
}

/// The capabilities the server advertises once logged in.
pub fn login<M: Mailstore>(store: &mut M) -> Result<Vec<String>> {
    store
        .capabilities()
        .map_err(Error::protocol("CAPABILITY"))
}

/// Every folder on the server with its message counts. No folder is selected.
///
/// Rows come in the order the server listed them, or ordered by name and then delimiter when
/// `sort` is set.
pub fn list_folders<M: Mailstore>(store: &mut M, sort: bool) -> Result<Vec<FolderRow>> {
    let folders = store.list_folders().map_err(Error::protocol("LIST"))?;
    debug!("server listed {} folders", folders.len());

    let mut rows = Vec::with_capacity(folders.len());
    for folder in folders {
        let status = if folder.is_selectable() {
            let status = store
                .folder_status(&folder.name)
                .map_err(|source| Error::FolderUnavailable {
                    folder: folder.name.clone(),
                    source,
                })?;
            Some(status)
        } else {
            debug!("{} cannot be selected, skipping STATUS", folder.name);
            None
        };
        rows.push(FolderRow { folder, status });
    }

    if sort {
        rows.sort_by(|a, b| {
            (&a.folder.name, &a.folder.delimiter).cmp(&(&b.folder.name, &b.folder.delimiter))
        });
    }
    Ok(rows)
}

/// Summaries of every message in `folder`, by ascending sequence number.
///
/// The folder is opened read-only and only headers are fetched, so no message is marked
/// `\Seen`.
pub fn list_messages<M: Mailstore>(store: &mut M, folder: &str) -> Result<Vec<MessageSummary>> {
    with_folder(store, folder, Access::ReadOnly, |selected| {
        let seqs = selected.search_all().map_err(Error::protocol("SEARCH"))?;
        if seqs.is_empty() {
            return Ok(Vec::new());
        }

        let fetched = selected
            .fetch(&SequenceSet::new(seqs), FetchItems::Headers)
            .map_err(Error::protocol("FETCH"))?;
        Ok(fetched
            .into_iter()
            .map(|f| MessageSummary {
                seq: f.seq,
                headers: f.header.as_deref().map(Headers::parse).unwrap_or_default(),
                internal_date: f.internal_date,
                flags: f.flags,
            })
            .collect())
    })
}

/// The complete message `seq` in `folder`, without marking it `\Seen`.
pub fn peek<M: Mailstore>(store: &mut M, folder: &str, seq: Seq) -> Result<Message> {
    let not_found = || Error::MessageNotFound {
        folder: folder.to_string(),
        seq,
    };

    with_folder(store, folder, Access::ReadOnly, |selected| {
        if seq == 0 || seq > selected.exists() {
            return Err(not_found());
        }

        let fetched = selected
            .fetch(&SequenceSet::new(Some(seq)), FetchItems::Full)
            .map_err(Error::protocol("FETCH"))?;
        let message = fetched.into_iter().find(|f| f.seq == seq).ok_or_else(not_found)?;
        let body = message.body.ok_or_else(not_found)?;

        Ok(Message {
            seq,
            headers: Headers::parse(&body),
            body,
            internal_date: message.internal_date,
            flags: message.flags,
        })
    })
}
