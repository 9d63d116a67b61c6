//! In-memory stand-ins for a mail server and a terminal.
//!
//! Enable the `test_helpers` feature to use these from outside the crate:
//!
//! ```toml
//! [dev-dependencies]
//! imapshell = { version = "1.0", features = ["test_helpers"] }
//! ```
//!
//! A [`MemoryStore`] is a cheap handle: clones share one server, so a test can keep a handle
//! around and inspect the server after the session that used it has been dropped.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::io;
use std::rc::Rc;

use chrono::{DateTime, FixedOffset};

use crate::connect::{Connector, Login};
use crate::error::{Error, Result};
use crate::mailstore::{Access, Mailstore};
use crate::prompt::CredentialPrompter;
use crate::types::{FetchItems, Fetched, FlagSet, FolderInfo, FolderStatus, Seq, SequenceSet};

const DELIMITER: &str = "/";

/// A message held by a [`MemoryStore`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoredMessage {
    /// The raw message.
    pub body: Vec<u8>,
    /// The flags set on the message.
    pub flags: FlagSet,
    /// The internal date the server recorded.
    pub internal_date: Option<DateTime<FixedOffset>>,
}

impl StoredMessage {
    /// A message with the given content and flags and no internal date.
    pub fn new<B: Into<Vec<u8>>>(body: B, flags: &[&str]) -> Self {
        StoredMessage {
            body: body.into(),
            flags: flags.iter().map(|f| f.to_string()).collect(),
            internal_date: None,
        }
    }

    /// Set the internal date.
    pub fn dated(mut self, date: &str) -> Self {
        self.internal_date = DateTime::parse_from_rfc3339(date).ok();
        self
    }
}

#[derive(Debug, Default)]
struct MemoryFolder {
    name: String,
    attributes: Vec<String>,
    messages: Vec<StoredMessage>,
}

#[derive(Debug, Default)]
struct ServerState {
    name: String,
    password: Option<String>,
    folders: Vec<MemoryFolder>,
    selected: Option<(String, Access)>,
    commands: Vec<String>,
    issued: HashMap<String, usize>,
    failures: Vec<(String, usize)>,
    timeline: Option<Rc<RefCell<Vec<String>>>>,
}

impl ServerState {
    fn folder(&self, name: &str) -> Option<&MemoryFolder> {
        self.folders.iter().find(|f| f.name == name)
    }

    fn folder_mut(&mut self, name: &str) -> Option<&mut MemoryFolder> {
        self.folders.iter_mut().find(|f| f.name == name)
    }

    /// Record `command` and decide whether this issue of it should fail.
    fn issue(&mut self, command: &str, args: &str) -> imap::error::Result<()> {
        let line = if args.is_empty() {
            command.to_string()
        } else {
            format!("{} {}", command, args)
        };
        if let Some(ref timeline) = self.timeline {
            timeline
                .borrow_mut()
                .push(format!("{}: {}", self.name, line));
        }
        self.commands.push(line);

        let n = self.issued.entry(command.to_string()).or_insert(0);
        *n += 1;
        let n = *n;
        if self
            .failures
            .iter()
            .any(|(failing, nth)| failing == command && *nth <= n)
        {
            return Err(refused(command));
        }
        Ok(())
    }

    fn selected(&self, command: &str) -> imap::error::Result<(&MemoryFolder, Access)> {
        let (name, access) = self.selected.as_ref().ok_or_else(|| refused(command))?;
        let folder = self.folder(name).ok_or_else(|| refused(command))?;
        Ok((folder, *access))
    }

    fn selected_mut(&mut self, command: &str) -> imap::error::Result<&mut MemoryFolder> {
        let name = match self.selected {
            Some((ref name, Access::ReadWrite)) => name.clone(),
            _ => return Err(refused(command)),
        };
        self.folder_mut(&name).ok_or_else(|| refused(command))
    }
}

fn refused(command: &str) -> imap::Error {
    imap::Error::Io(io::Error::new(
        io::ErrorKind::Other,
        format!("{} refused by test server", command),
    ))
}

fn header_block(body: &[u8]) -> Vec<u8> {
    match body.windows(4).position(|w| w == b"\r\n\r\n") {
        Some(end) => body[..end + 4].to_vec(),
        None => body.to_vec(),
    }
}

/// A mail server that lives in memory and records every command it is sent.
///
/// Folders are listed in the order they were added. `CLOSE` on a folder opened read-write
/// removes messages flagged `\Deleted`, as a real server does.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore(Rc<RefCell<ServerState>>);

impl MemoryStore {
    /// A server with no folders that accepts any password.
    pub fn new() -> Self {
        MemoryStore::default()
    }

    /// Only accept `password` at login.
    pub fn with_password(self, password: &str) -> Self {
        self.0.borrow_mut().password = Some(password.to_string());
        self
    }

    /// Add a folder holding `messages`, in order.
    pub fn with_folder(self, name: &str, messages: Vec<StoredMessage>) -> Self {
        self.0.borrow_mut().folders.push(MemoryFolder {
            name: name.to_string(),
            attributes: Vec::new(),
            messages,
        });
        self
    }

    /// Add a folder that `LIST` reports with the `\Noselect` attribute.
    pub fn with_noselect_folder(self, name: &str) -> Self {
        self.0.borrow_mut().folders.push(MemoryFolder {
            name: name.to_string(),
            attributes: vec!["\\Noselect".to_string()],
            messages: Vec::new(),
        });
        self
    }

    /// Make the `nth` issue of `command` (counting from 1), and every later one, fail.
    pub fn failing(self, command: &str, nth: usize) -> Self {
        self.0
            .borrow_mut()
            .failures
            .push((command.to_string(), nth));
        self
    }

    /// Every command issued so far, with its arguments, e.g. `"EXAMINE INBOX"`.
    pub fn commands(&self) -> Vec<String> {
        self.0.borrow().commands.clone()
    }

    /// How many times `command` has been issued.
    pub fn count(&self, command: &str) -> usize {
        self.0.borrow().issued.get(command).copied().unwrap_or(0)
    }

    /// The messages currently in `folder`, or `None` if there is no such folder.
    pub fn messages(&self, folder: &str) -> Option<Vec<StoredMessage>> {
        self.0.borrow().folder(folder).map(|f| f.messages.clone())
    }

    /// The names of all folders, in listing order.
    pub fn folder_names(&self) -> Vec<String> {
        self.0
            .borrow()
            .folders
            .iter()
            .map(|f| f.name.clone())
            .collect()
    }

    fn accepts(&self, password: &str) -> bool {
        match self.0.borrow().password {
            Some(ref expected) => expected == password,
            None => true,
        }
    }

    fn attach(&self, name: &str, timeline: &Rc<RefCell<Vec<String>>>) {
        let mut state = self.0.borrow_mut();
        state.name = name.to_string();
        state.timeline = Some(Rc::clone(timeline));
    }

    fn record_login(&self) {
        let state = self.0.borrow();
        if let Some(ref timeline) = state.timeline {
            timeline
                .borrow_mut()
                .push(format!("{}: LOGIN", state.name));
        }
    }
}

impl Mailstore for MemoryStore {
    fn capabilities(&mut self) -> imap::error::Result<Vec<String>> {
        self.0.borrow_mut().issue("CAPABILITY", "")?;
        Ok(vec!["IDLE".to_string(), "IMAP4rev1".to_string()])
    }

    fn list_folders(&mut self) -> imap::error::Result<Vec<FolderInfo>> {
        let mut state = self.0.borrow_mut();
        state.issue("LIST", "")?;
        Ok(state
            .folders
            .iter()
            .map(|f| FolderInfo {
                name: f.name.clone(),
                delimiter: Some(DELIMITER.to_string()),
                attributes: f.attributes.clone(),
            })
            .collect())
    }

    fn folder_status(&mut self, folder: &str) -> imap::error::Result<FolderStatus> {
        let mut state = self.0.borrow_mut();
        state.issue("STATUS", folder)?;
        let folder = state
            .folder(folder)
            .filter(|f| f.attributes.is_empty())
            .ok_or_else(|| refused("STATUS"))?;
        Ok(FolderStatus {
            messages: folder.messages.len() as u32,
            unseen: folder
                .messages
                .iter()
                .filter(|m| !m.flags.contains("\\Seen"))
                .count() as u32,
        })
    }

    fn select_folder(&mut self, folder: &str, access: Access) -> imap::error::Result<u32> {
        let mut state = self.0.borrow_mut();
        let command = match access {
            Access::ReadOnly => "EXAMINE",
            Access::ReadWrite => "SELECT",
        };
        state.issue(command, folder)?;
        let exists = match state.folder(folder) {
            Some(f) if f.attributes.is_empty() => f.messages.len() as u32,
            _ => return Err(refused(command)),
        };
        state.selected = Some((folder.to_string(), access));
        Ok(exists)
    }

    fn close_folder(&mut self) -> imap::error::Result<()> {
        let mut state = self.0.borrow_mut();
        state.issue("CLOSE", "")?;
        match state.selected.take() {
            Some((name, Access::ReadWrite)) => {
                if let Some(folder) = state.folder_mut(&name) {
                    folder.messages.retain(|m| !m.flags.contains("\\Deleted"));
                }
                Ok(())
            }
            Some((_, Access::ReadOnly)) => Ok(()),
            None => Err(refused("CLOSE")),
        }
    }

    fn search_all(&mut self) -> imap::error::Result<Vec<Seq>> {
        let mut state = self.0.borrow_mut();
        state.issue("SEARCH", "ALL")?;
        let (folder, _) = state.selected("SEARCH")?;
        Ok((1..=folder.messages.len() as Seq).collect())
    }

    fn fetch(&mut self, set: &SequenceSet, items: FetchItems) -> imap::error::Result<Vec<Fetched>> {
        let mut state = self.0.borrow_mut();
        state.issue("FETCH", &set.to_string())?;
        let (folder, _) = state.selected("FETCH")?;
        Ok(set
            .as_slice()
            .iter()
            .filter_map(|&seq| {
                let message = folder.messages.get((seq as usize).checked_sub(1)?)?;
                let mut fetched = Fetched::new(seq);
                match items {
                    FetchItems::Headers => fetched.header = Some(header_block(&message.body)),
                    FetchItems::Full => fetched.body = Some(message.body.clone()),
                }
                fetched.internal_date = message.internal_date;
                fetched.flags = message.flags.clone();
                Some(fetched)
            })
            .collect())
    }

    fn append(
        &mut self,
        folder: &str,
        content: &[u8],
        flags: &FlagSet,
        internal_date: Option<DateTime<FixedOffset>>,
    ) -> imap::error::Result<()> {
        let mut state = self.0.borrow_mut();
        state.issue("APPEND", folder)?;
        // servers answer BAD to an APPEND that tries to set \Recent
        if flags.contains(crate::types::RECENT) {
            return Err(refused("APPEND"));
        }
        let folder = state.folder_mut(folder).ok_or_else(|| refused("APPEND"))?;
        folder.messages.push(StoredMessage {
            body: content.to_vec(),
            flags: flags.clone(),
            internal_date,
        });
        Ok(())
    }

    fn copy_messages(&mut self, set: &SequenceSet, folder: &str) -> imap::error::Result<()> {
        let mut state = self.0.borrow_mut();
        state.issue("COPY", &format!("{} {}", set, folder))?;
        let copies: Vec<StoredMessage> = {
            let (source, _) = state.selected("COPY")?;
            set.as_slice()
                .iter()
                .filter_map(|&seq| source.messages.get((seq as usize).checked_sub(1)?))
                .cloned()
                .collect()
        };
        let dest = state.folder_mut(folder).ok_or_else(|| refused("COPY"))?;
        dest.messages.extend(copies);
        Ok(())
    }

    fn mark_deleted(&mut self, set: &SequenceSet) -> imap::error::Result<()> {
        let mut state = self.0.borrow_mut();
        state.issue("STORE", &set.to_string())?;
        let folder = state.selected_mut("STORE")?;
        for &seq in set.as_slice() {
            let index = (seq as usize).checked_sub(1);
            if let Some(message) = index.and_then(|i| folder.messages.get_mut(i)) {
                message.flags.insert("\\Deleted");
            }
        }
        Ok(())
    }

    fn expunge(&mut self) -> imap::error::Result<()> {
        let mut state = self.0.borrow_mut();
        state.issue("EXPUNGE", "")?;
        let folder = state.selected_mut("EXPUNGE")?;
        folder.messages.retain(|m| !m.flags.contains("\\Deleted"));
        Ok(())
    }

    fn create_folder(&mut self, folder: &str) -> imap::error::Result<()> {
        let mut state = self.0.borrow_mut();
        state.issue("CREATE", folder)?;
        if state.folder(folder).is_some() {
            return Err(refused("CREATE"));
        }
        state.folders.push(MemoryFolder {
            name: folder.to_string(),
            ..MemoryFolder::default()
        });
        Ok(())
    }

    fn delete_folder(&mut self, folder: &str) -> imap::error::Result<()> {
        let mut state = self.0.borrow_mut();
        state.issue("DELETE", folder)?;
        let before = state.folders.len();
        state.folders.retain(|f| f.name != folder);
        if state.folders.len() == before {
            return Err(refused("DELETE"));
        }
        Ok(())
    }

    fn logout(&mut self) -> imap::error::Result<()> {
        self.0.borrow_mut().issue("LOGOUT", "")
    }
}

/// What a [`MemoryConnector`] was asked to log in with. `Debug` leaves out the password.
#[derive(Clone, PartialEq, Eq)]
pub struct RecordedLogin {
    /// The host connected to.
    pub host: String,
    /// The port connected to.
    pub port: u16,
    /// Whether TLS was requested.
    pub tls: bool,
    /// The login name.
    pub username: String,
    /// The password.
    pub password: String,
}

impl fmt::Debug for RecordedLogin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordedLogin")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("tls", &self.tls)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Connects to [`MemoryStore`]s by host name.
///
/// Unknown hosts fail with [`Error::ConnectionFailed`], wrong passwords with
/// [`Error::AuthenticationFailed`]. Logins and every command sent to the servers are also
/// recorded on one shared timeline, as `"<host>: <command>"`.
#[derive(Debug, Default)]
pub struct MemoryConnector {
    servers: Vec<(String, MemoryStore)>,
    logins: RefCell<Vec<RecordedLogin>>,
    timeline: Rc<RefCell<Vec<String>>>,
}

impl MemoryConnector {
    /// A connector that knows no servers.
    pub fn new() -> Self {
        MemoryConnector::default()
    }

    /// Serve `store` as `host`.
    pub fn with_server(mut self, host: &str, store: MemoryStore) -> Self {
        store.attach(host, &self.timeline);
        self.servers.push((host.to_string(), store));
        self
    }

    /// Every login attempted so far, successful or not.
    pub fn logins(&self) -> Vec<RecordedLogin> {
        self.logins.borrow().clone()
    }

    /// Logins and commands across all servers, in the order they happened.
    pub fn timeline(&self) -> Vec<String> {
        self.timeline.borrow().clone()
    }
}

impl Connector for MemoryConnector {
    type Store = MemoryStore;

    fn connect(&self, login: &Login<'_>) -> Result<MemoryStore> {
        self.logins.borrow_mut().push(RecordedLogin {
            host: login.host.to_string(),
            port: login.port,
            tls: login.tls,
            username: login.username.to_string(),
            password: login.password.to_string(),
        });

        let store = self
            .servers
            .iter()
            .find(|(host, _)| host == login.host)
            .map(|(_, store)| store.clone())
            .ok_or_else(|| Error::ConnectionFailed {
                host: login.host.to_string(),
                source: Box::new(io::Error::new(
                    io::ErrorKind::ConnectionRefused,
                    "no such test server",
                )),
            })?;

        if !store.accepts(login.password) {
            return Err(Error::AuthenticationFailed {
                host: login.host.to_string(),
                reason: "invalid credentials".to_string(),
            });
        }
        store.record_login();
        Ok(store)
    }
}

/// Answers every prompt with the same credentials and counts how often it was asked.
#[derive(Clone, Debug, Default)]
pub struct FixedPrompter {
    username: String,
    password: String,
    /// Number of times a login name was asked for.
    pub username_prompts: usize,
    /// Number of times a password was asked for.
    pub password_prompts: usize,
}

impl FixedPrompter {
    /// A prompter that always answers `username` and `password`.
    pub fn new(username: &str, password: &str) -> Self {
        FixedPrompter {
            username: username.to_string(),
            password: password.to_string(),
            ..FixedPrompter::default()
        }
    }
}

impl CredentialPrompter for FixedPrompter {
    fn username(&mut self, _host: &str) -> io::Result<String> {
        self.username_prompts += 1;
        Ok(self.username.clone())
    }

    fn password(&mut self, _host: &str, _username: &str) -> io::Result<String> {
        self.password_prompts += 1;
        Ok(self.password.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn close_after_select_drops_deleted() {
        let mut store = MemoryStore::new().with_folder(
            "INBOX",
            vec![
                StoredMessage::new("a", &["\\Deleted"]),
                StoredMessage::new("b", &[]),
            ],
        );
        store.select_folder("INBOX", Access::ReadWrite).unwrap();
        store.close_folder().unwrap();
        assert_eq!(store.messages("INBOX").unwrap().len(), 1);
    }

    #[test]
    fn injected_failures_start_at_nth_issue() {
        let mut store = MemoryStore::new()
            .with_folder("INBOX", Vec::new())
            .failing("APPEND", 2);
        let flags = FlagSet::new();
        assert!(store.append("INBOX", b"1", &flags, None).is_ok());
        assert!(store.append("INBOX", b"2", &flags, None).is_err());
        assert!(store.append("INBOX", b"3", &flags, None).is_err());
        assert_eq!(store.count("APPEND"), 3);
        assert_eq!(store.messages("INBOX").unwrap().len(), 1);
    }

    #[test]
    fn recorded_login_debug_hides_the_password() {
        let login = RecordedLogin {
            host: "imap.example.com".to_string(),
            port: 993,
            tls: true,
            username: "jane".to_string(),
            password: "hunter2".to_string(),
        };
        let text = format!("{:?}", login);
        assert!(text.contains("jane"), "{}", text);
        assert!(!text.contains("hunter2"), "{}", text);
    }

    #[test]
    fn headers_stop_at_blank_line() {
        assert_eq!(
            header_block(b"Subject: x\r\n\r\nbody"),
            b"Subject: x\r\n\r\n".to_vec()
        );
    }
}
