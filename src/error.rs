//! IMAP shell error types.

use std::error::Error as StdError;
use std::fmt;
use std::io::Error as IoError;
use std::result;

use crate::types::Seq;

/// A convenience wrapper around `Result` for `imapshell::Error`.
pub type Result<T> = result::Result<T, Error>;

/// Exit code used when `rmfolder` refuses to delete a non-empty folder.
pub const EXIT_FOLDER_NOT_EMPTY: u8 = 8;

/// A set of errors that can occur while running a shell command.
#[derive(Debug)]
#[non_exhaustive]
pub enum Error {
    /// The host specifier could not be parsed.
    MalformedAddress(AddressError),
    /// Reading a username or password from the user failed.
    Prompt(IoError),
    /// The server could not be reached, or the transport could not be set up.
    ConnectionFailed {
        /// The host we were trying to reach.
        host: String,
        /// The underlying transport error.
        source: Box<dyn StdError + 'static>,
    },
    /// The server rejected our credentials, or no acceptable login mechanism was offered.
    AuthenticationFailed {
        /// The host we were logging in to.
        host: String,
        /// What went wrong.
        reason: String,
    },
    /// A folder could not be selected or queried.
    FolderUnavailable {
        /// The folder name.
        folder: String,
        /// The server's answer.
        source: imap::Error,
    },
    /// The requested sequence number is not part of the current selection.
    MessageNotFound {
        /// The folder the message was looked up in.
        folder: String,
        /// The sequence number that did not resolve.
        seq: Seq,
    },
    /// The server refused to create a folder.
    FolderCreationFailed {
        /// The folder name.
        folder: String,
        /// The server's answer.
        source: imap::Error,
    },
    /// The server refused to delete a folder.
    FolderDeletionFailed {
        /// The folder name.
        folder: String,
        /// The server's answer.
        source: imap::Error,
    },
    /// An append failed part way through a migration. Earlier appends are not rolled back.
    PartialMigrationFailure {
        /// Messages appended before the failure.
        migrated: usize,
        /// Messages that were meant to be appended.
        total: usize,
        /// The first (and only) append failure.
        source: imap::Error,
    },
    /// A merge copied messages but could not remove them from the source folder.
    MergeIncomplete {
        /// Messages copied into the destination folder.
        copied: usize,
        /// Messages found in the source folder afterwards. `None` if that could not be checked.
        left_in_source: Option<u32>,
        /// The failing `STORE` or `EXPUNGE`.
        source: imap::Error,
    },
    /// Any other protocol command failed.
    Protocol {
        /// The command that failed.
        action: &'static str,
        /// The server's answer.
        source: imap::Error,
    },
}

impl Error {
    pub(crate) fn protocol(action: &'static str) -> impl FnOnce(imap::Error) -> Error {
        move |source| Error::Protocol { action, source }
    }

    /// The process exit code that corresponds to this class of error.
    pub fn exit_code(&self) -> u8 {
        match *self {
            Error::MalformedAddress(_) => 3,
            Error::ConnectionFailed { .. } => 4,
            Error::AuthenticationFailed { .. } => 5,
            Error::FolderUnavailable { .. } => 6,
            Error::MessageNotFound { .. } => 7,
            Error::FolderCreationFailed { .. } => 9,
            Error::FolderDeletionFailed { .. } => 10,
            Error::PartialMigrationFailure { .. } => 11,
            Error::MergeIncomplete { .. } => 12,
            Error::Protocol { .. } => 13,
            Error::Prompt(_) => 14,
        }
    }
}

impl From<AddressError> for Error {
    fn from(err: AddressError) -> Error {
        Error::MalformedAddress(err)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Error::MalformedAddress(ref e) => fmt::Display::fmt(e, f),
            Error::Prompt(ref e) => write!(f, "Could not read credentials: {}", e),
            Error::ConnectionFailed {
                ref host,
                ref source,
            } => write!(f, "Could not connect to {}: {}", host, source),
            Error::AuthenticationFailed {
                ref host,
                ref reason,
            } => write!(f, "Login to {} failed: {}", host, reason),
            Error::FolderUnavailable {
                ref folder,
                ref source,
            } => write!(f, "Folder {:?} is unavailable: {}", folder, source),
            Error::MessageNotFound { ref folder, seq } => {
                write!(f, "No message {} in folder {:?}", seq, folder)
            }
            Error::FolderCreationFailed {
                ref folder,
                ref source,
            } => write!(f, "Could not create folder {:?}: {}", folder, source),
            Error::FolderDeletionFailed {
                ref folder,
                ref source,
            } => write!(f, "Could not delete folder {:?}: {}", folder, source),
            Error::PartialMigrationFailure {
                migrated,
                total,
                ref source,
            } => write!(
                f,
                "Migration stopped after {} of {} messages: {}",
                migrated, total, source
            ),
            Error::MergeIncomplete {
                copied,
                left_in_source: Some(left),
                ref source,
            } => write!(
                f,
                "Copied {} messages but could not remove them from the source folder, \
                 which still holds {} messages, so they now exist in both folders: {}",
                copied, left, source
            ),
            Error::MergeIncomplete {
                copied,
                left_in_source: None,
                ref source,
            } => write!(
                f,
                "Copied {} messages but could not remove them from the source folder, \
                 and could not check whether they are still there: {}",
                copied, source
            ),
            Error::Protocol { action, ref source } => write!(f, "{} failed: {}", action, source),
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match *self {
            Error::MalformedAddress(ref e) => Some(e),
            Error::Prompt(ref e) => Some(e),
            Error::ConnectionFailed { ref source, .. } => Some(&**source),
            Error::FolderUnavailable { ref source, .. }
            | Error::FolderCreationFailed { ref source, .. }
            | Error::FolderDeletionFailed { ref source, .. }
            | Error::PartialMigrationFailure { ref source, .. }
            | Error::MergeIncomplete { ref source, .. }
            | Error::Protocol { ref source, .. } => Some(source),
            Error::AuthenticationFailed { .. } | Error::MessageNotFound { .. } => None,
        }
    }
}

/// A host specifier that is not of the form `[user@]host[:port]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddressError {
    /// Nothing was left for the host name after removing the user and port.
    EmptyHost(String),
    /// The port was not a number between 0 and 65535.
    BadPort(String),
}

impl fmt::Display for AddressError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            AddressError::EmptyHost(ref spec) => write!(f, "No host name in {:?}", spec),
            AddressError::BadPort(ref port) => write!(f, "Invalid port number {:?}", port),
        }
    }
}

impl StdError for AddressError {}
