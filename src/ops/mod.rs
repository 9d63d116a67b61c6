//! The shell's operations.
//!
//! Each operation takes an authenticated [`Mailstore`](crate::mailstore::Mailstore) (or, for
//! [`migrate`], a [`Resolver`](crate::session::Resolver) to open its two sessions with) and
//! returns plain data for the caller to present. None of them print anything.

mod inspect;
pub use self::inspect::{list_folders, list_messages, login, peek, FolderRow};

mod transfer;
pub use self::transfer::{merge, migrate, Endpoint, MigrationReport};

mod manage;
pub use self::manage::{create_folder, remove_folder, Removal};
