//! A shell for poking at IMAP accounts.
//!
//! The `imapshell` binary lists folders and messages, shows single messages, copies a folder
//! from one server to another, merges folders, and creates and deletes them. This library holds
//! everything the binary does, so the same operations can be driven from other programs or
//! tested without a server.
//!
//! # Usage
//!
//! Sessions are opened through a [`Resolver`](session::Resolver), which asks a
//! [`CredentialPrompter`](prompt::CredentialPrompter) for whatever the host specifier leaves
//! out and connects with a [`Connector`](connect::Connector). Operations in [`ops`] then run
//! against the session:
//!
//! ```no_run
//! use imapshell::connect::ImapConnector;
//! use imapshell::prompt::TerminalPrompter;
//! use imapshell::session::Resolver;
//!
//! # fn main() -> imapshell::error::Result<()> {
//! let mut resolver = Resolver::new(ImapConnector::new(), TerminalPrompter);
//! let mut session = resolver.open(&"jane@imap.example.com".parse()?, true)?;
//!
//! for row in imapshell::ops::list_folders(&mut *session, true)? {
//!     println!("{}: {:?}", row.folder.name, row.status);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! The session logs out when it goes out of scope.

pub mod address;
pub mod cli;
pub mod connect;
pub mod error;
pub mod folder;
pub mod mailstore;
pub mod ops;
pub mod output;
pub mod prompt;
pub mod session;
pub mod types;

#[cfg(any(test, feature = "test_helpers"))]
pub mod testing;

#[cfg(test)]
mod mock_stream;
