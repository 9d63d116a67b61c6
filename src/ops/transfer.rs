use log::{debug, info, warn};

use crate::address::HostSpec;
use crate::connect::Connector;
use crate::error::{Error, Result};
use crate::folder::with_folder;
use crate::mailstore::{Access, Mailstore};
use crate::prompt::CredentialPrompter;
use crate::session::Resolver;
use crate::types::{FetchItems, Fetched, Seq, SequenceSet};

/// A folder on a particular server.
#[derive(Clone, Copy, Debug)]
pub struct Endpoint<'a> {
    /// Where to connect.
    pub host: &'a HostSpec,
    /// Whether to connect with TLS.
    pub tls: bool,
    /// The folder on that server.
    pub folder: &'a str,
}

/// What a [`migrate`] did.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MigrationReport {
    /// Source sequence numbers that were appended to the destination, in order.
    pub appended: Vec<Seq>,
    /// Source sequence numbers that came back without content and were left out.
    pub skipped: Vec<Seq>,
}

/// Copy every message in `from` to `to`, which may be on another server.
///
/// The source folder is read without marking anything `\Seen`, and the source session is logged
/// out before the destination is connected to, so the two sessions are never open together.
/// Messages are appended in ascending sequence order with their original content, internal
/// date and flags (less `\Recent`). The source is never modified.
///
/// If an append fails the run stops with [`Error::PartialMigrationFailure`]. Messages appended
/// before that stay in the destination.
pub fn migrate<C, P>(
    resolver: &mut Resolver<C, P>,
    from: Endpoint<'_>,
    to: Endpoint<'_>,
) -> Result<MigrationReport>
where
    C: Connector,
    P: CredentialPrompter,
{
    let messages = {
        let mut source = resolver.open(from.host, from.tls)?;
        let messages = fetch_all(&mut *source, from.folder)?;
        if let Err(e) = source.logout() {
            warn!("{}", e);
        }
        messages
    };
    debug!("Found {} messages, copying...", messages.len());

    let mut destination = resolver.open(to.host, to.tls)?;
    let total = messages.len();
    let mut report = MigrationReport::default();
    for message in messages {
        let body = match message.body {
            Some(body) => body,
            None => {
                warn!("message {} came back without content, skipping it", message.seq);
                report.skipped.push(message.seq);
                continue;
            }
        };

        destination
            .append(
                to.folder,
                &body,
                &message.flags.without_recent(),
                message.internal_date,
            )
            .map_err(|source| Error::PartialMigrationFailure {
                migrated: report.appended.len(),
                total,
                source,
            })?;
        info!("appended message {}", message.seq);
        report.appended.push(message.seq);
    }

    info!("Copied {} messages", report.appended.len());
    Ok(report)
}

fn fetch_all<M: Mailstore>(store: &mut M, folder: &str) -> Result<Vec<Fetched>> {
    with_folder(store, folder, Access::ReadOnly, |selected| {
        let seqs = selected.search_all().map_err(Error::protocol("SEARCH"))?;
        if seqs.is_empty() {
            return Ok(Vec::new());
        }
        selected
            .fetch(&SequenceSet::new(seqs), FetchItems::Full)
            .map_err(Error::protocol("FETCH"))
    })
}

/// Move every message in `from` to `to` on the same server. Returns how many were moved.
///
/// The messages are copied in one batch, then flagged `\Deleted` and expunged from `from`. If
/// flagging or expunging fails after the copy succeeded, `from` is checked with `STATUS` once it
/// has been closed: `CLOSE` also removes `\Deleted` messages, so a failed `EXPUNGE` may have
/// done no harm. If the copied messages are still there they are in both folders, and the error
/// is [`Error::MergeIncomplete`]. Nothing is undone in `to`.
pub fn merge<M: Mailstore>(store: &mut M, from: &str, to: &str) -> Result<usize> {
    let mut before = 0;
    let moved = with_folder(store, from, Access::ReadWrite, |selected| {
        before = selected.exists();
        let seqs = selected.search_all().map_err(Error::protocol("SEARCH"))?;
        if seqs.is_empty() {
            info!("{} is empty, nothing to merge", from);
            return Ok(0);
        }

        let set = SequenceSet::new(seqs);
        let copied = set.len();
        selected
            .copy_messages(&set, to)
            .map_err(Error::protocol("COPY"))?;
        debug!("copied {} messages from {} to {}", copied, from, to);

        let incomplete = |source| Error::MergeIncomplete {
            copied,
            left_in_source: None,
            source,
        };
        selected.mark_deleted(&set).map_err(incomplete)?;
        selected.expunge().map_err(incomplete)?;
        Ok(copied)
    });

    let moved = match moved {
        Err(Error::MergeIncomplete { copied, source, .. }) => {
            match store.folder_status(from) {
                Ok(status) if status.messages as usize + copied <= before as usize => {
                    warn!("{}, but closing {} removed the copied messages", source, from);
                    copied
                }
                Ok(status) => {
                    return Err(Error::MergeIncomplete {
                        copied,
                        left_in_source: Some(status.messages),
                        source,
                    })
                }
                Err(e) => {
                    warn!("could not check what is left in {}: {}", from, e);
                    return Err(Error::MergeIncomplete {
                        copied,
                        left_in_source: None,
                        source,
                    });
                }
            }
        }
        moved => moved?,
    };

    if moved > 0 {
        info!("Moved {} messages from {} to {}", moved, from, to);
    }
    Ok(moved)
}
