//! Folder selection scoped to a single operation.

use std::ops::{Deref, DerefMut};

use log::{debug, warn};

use crate::error::{Error, Result};
use crate::mailstore::{Access, Mailstore};

/// A folder that is selected on a store until this guard is closed or dropped.
///
/// The guard borrows the store mutably, so a second folder cannot be selected on the same store
/// while this one is open. Every path out of the guard issues exactly one `CLOSE`.
#[derive(Debug)]
pub struct SelectedFolder<'s, M: Mailstore> {
    store: &'s mut M,
    name: String,
    exists: u32,
    closed: bool,
}

impl<'s, M: Mailstore> SelectedFolder<'s, M> {
    /// Select `name` with `EXAMINE` (read-only) or `SELECT` (read-write).
    pub fn open(store: &'s mut M, name: &str, access: Access) -> Result<Self> {
        debug!("opening {} ({:?})", name, access);
        let exists = store
            .select_folder(name, access)
            .map_err(|source| Error::FolderUnavailable {
                folder: name.to_string(),
                source,
            })?;
        Ok(SelectedFolder {
            store,
            name: name.to_string(),
            exists,
            closed: false,
        })
    }

    /// The selected folder's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The number of messages the folder held when it was selected.
    pub fn exists(&self) -> u32 {
        self.exists
    }

    /// Close the folder now and report whether the server accepted the `CLOSE`.
    pub fn close(mut self) -> Result<()> {
        self.closed = true;
        debug!("closing {}", self.name);
        self.store.close_folder().map_err(Error::protocol("CLOSE"))
    }
}

impl<'s, M: Mailstore> Deref for SelectedFolder<'s, M> {
    type Target = M;

    fn deref(&self) -> &M {
        &*self.store
    }
}

impl<'s, M: Mailstore> DerefMut for SelectedFolder<'s, M> {
    fn deref_mut(&mut self) -> &mut M {
        &mut *self.store
    }
}

impl<'s, M: Mailstore> Drop for SelectedFolder<'s, M> {
    fn drop(&mut self) {
        if !self.closed {
            self.closed = true;
            if let Err(e) = self.store.close_folder() {
                warn!("closing {} failed: {}", self.name, e);
            }
        }
    }
}

/// Select `name`, run `body` on it, and close it again.
///
/// If the folder cannot be selected, `body` does not run and the error is
/// [`Error::FolderUnavailable`]. If `body` fails, its error is returned and a failing `CLOSE` is
/// only logged. If `body` succeeds, a failing `CLOSE` is returned instead of the result.
pub fn with_folder<M, T, F>(store: &mut M, name: &str, access: Access, body: F) -> Result<T>
where
    M: Mailstore,
    F: FnOnce(&mut SelectedFolder<'_, M>) -> Result<T>,
{
    let mut folder = SelectedFolder::open(store, name, access)?;
    match body(&mut folder) {
        Ok(value) => {
            folder.close()?;
            Ok(value)
        }
        Err(e) => {
            if let Err(close) = folder.close() {
                warn!("{}", close);
            }
            Err(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MemoryStore, StoredMessage};

    fn inbox() -> MemoryStore {
        MemoryStore::new().with_folder(
            "INBOX",
            vec![StoredMessage::new("a", &[]), StoredMessage::new("b", &[])],
        )
    }

    #[test]
    fn closes_after_success() {
        let mut store = inbox();
        let exists = with_folder(&mut store, "INBOX", Access::ReadOnly, |f| Ok(f.exists())).unwrap();
        assert_eq!(exists, 2);
        assert_eq!(store.commands(), vec!["EXAMINE INBOX", "CLOSE"]);
    }

    #[test]
    fn closes_after_failure_and_keeps_body_error() {
        let mut store = inbox().failing("CLOSE", 1);
        let result: Result<()> = with_folder(&mut store, "INBOX", Access::ReadWrite, |f| {
            Err(Error::MessageNotFound {
                folder: f.name().to_string(),
                seq: 9,
            })
        });
        match result {
            Err(Error::MessageNotFound { seq: 9, .. }) => {}
            other => panic!("unexpected result: {:?}", other),
        }
        assert_eq!(store.count("CLOSE"), 1);
    }

    #[test]
    fn close_failure_after_success_is_returned() {
        let mut store = inbox().failing("CLOSE", 1);
        match with_folder(&mut store, "INBOX", Access::ReadOnly, |_| Ok(())) {
            Err(Error::Protocol { action: "CLOSE", .. }) => {}
            other => panic!("unexpected result: {:?}", other),
        }
        assert_eq!(store.count("CLOSE"), 1);
    }

    #[test]
    fn unselectable_folder_skips_body() {
        let mut store = inbox();
        let mut ran = false;
        let result = with_folder(&mut store, "Nope", Access::ReadOnly, |_| {
            ran = true;
            Ok(())
        });
        assert!(matches!(result, Err(Error::FolderUnavailable { ref folder, .. }) if folder == "Nope"));
        assert!(!ran);
        assert_eq!(store.count("CLOSE"), 0);
    }

    #[test]
    fn dropped_guard_closes_once() {
        let mut store = inbox();
        {
            let _folder = SelectedFolder::open(&mut store, "INBOX", Access::ReadOnly).unwrap();
        }
        assert_eq!(store.count("CLOSE"), 1);
    }

    #[test]
    fn panicking_body_still_closes() {
        let store = inbox();
        let mut handle = store.clone();
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _ = with_folder(&mut handle, "INBOX", Access::ReadOnly, |_| -> Result<()> {
                panic!("boom")
            });
        }));
        assert!(result.is_err());
        assert_eq!(store.count("CLOSE"), 1);
    }
}
