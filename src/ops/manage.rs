use log::info;

use crate::error::{Error, Result};
use crate::mailstore::Mailstore;

/// Create `folder`.
pub fn create_folder<M: Mailstore>(store: &mut M, folder: &str) -> Result<()> {
    store
        .create_folder(folder)
        .map_err(|source| Error::FolderCreationFailed {
            folder: folder.to_string(),
            source,
        })?;
    info!("Created {}", folder);
    Ok(())
}

/// The outcome of [`remove_folder`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Removal {
    /// The folder was deleted. It held this many messages.
    Deleted {
        /// Messages in the folder just before it was deleted.
        messages: u32,
    },
    /// The folder still holds messages and `force` was not given, so nothing was done.
    Refused {
        /// Messages in the folder.
        messages: u32,
    },
}

/// Delete `folder`, but only if it is empty or `force` is set.
///
/// The emptiness check and the `DELETE` are two commands: a message delivered in between is
/// deleted along with the folder.
pub fn remove_folder<M: Mailstore>(store: &mut M, folder: &str, force: bool) -> Result<Removal> {
    let status = store
        .folder_status(folder)
        .map_err(|source| Error::FolderUnavailable {
            folder: folder.to_string(),
            source,
        })?;

    if status.messages > 0 && !force {
        return Ok(Removal::Refused {
            messages: status.messages,
        });
    }

    store
        .delete_folder(folder)
        .map_err(|source| Error::FolderDeletionFailed {
            folder: folder.to_string(),
            source,
        })?;
    info!("Deleted {} ({} messages)", folder, status.messages);
    Ok(Removal::Deleted {
        messages: status.messages,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MemoryStore, StoredMessage};

    fn store() -> MemoryStore {
        MemoryStore::new()
            .with_folder("Full", vec![StoredMessage::new("x", &[]); 4])
            .with_folder("Empty", Vec::new())
    }

    #[test]
    fn creates_folder() {
        let mut store = store();
        create_folder(&mut store, "Projects/2024").unwrap();
        assert!(store.folder_names().contains(&"Projects/2024".to_string()));
    }

    #[test]
    fn refused_creation() {
        let mut store = store();
        match create_folder(&mut store, "Empty") {
            Err(Error::FolderCreationFailed { folder, .. }) => assert_eq!(folder, "Empty"),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn refuses_non_empty_without_force() {
        let mut store = store();
        assert_eq!(
            remove_folder(&mut store, "Full", false).unwrap(),
            Removal::Refused { messages: 4 }
        );
        assert_eq!(store.count("DELETE"), 0);
        assert_eq!(store.messages("Full").unwrap().len(), 4);
    }

    #[test]
    fn force_deletes_non_empty() {
        let mut store = store();
        assert_eq!(
            remove_folder(&mut store, "Full", true).unwrap(),
            Removal::Deleted { messages: 4 }
        );
        assert_eq!(store.messages("Full"), None);
    }

    #[test]
    fn empty_folder_deleted_with_or_without_force() {
        for &force in &[false, true] {
            let mut store = store();
            assert_eq!(
                remove_folder(&mut store, "Empty", force).unwrap(),
                Removal::Deleted { messages: 0 }
            );
            assert_eq!(store.count("DELETE"), 1);
        }
    }

    #[test]
    fn missing_folder_is_unavailable() {
        let mut store = store();
        assert!(matches!(
            remove_folder(&mut store, "Nope", true),
            Err(Error::FolderUnavailable { .. })
        ));
        assert_eq!(store.count("DELETE"), 0);
    }

    #[test]
    fn failed_delete() {
        let mut store = store().failing("DELETE", 1);
        assert!(matches!(
            remove_folder(&mut store, "Empty", false),
            Err(Error::FolderDeletionFailed { .. })
        ));
    }
}
