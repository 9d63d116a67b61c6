//! The command-line surface: argument definitions and dispatch to [`crate::ops`].

use std::time::Duration;

use clap::{ArgAction, Parser, Subcommand};
use log::{debug, info, LevelFilter};

use crate::address::HostSpec;
use crate::connect::Connector;
use crate::error::{Result, EXIT_FOLDER_NOT_EMPTY};
use crate::ops::{self, Endpoint, Removal};
use crate::output;
use crate::prompt::CredentialPrompter;
use crate::session::Resolver;
use crate::types::Seq;

/// Debug and migrate IMAP accounts.
#[derive(Debug, Parser)]
#[command(name = "imapshell", version)]
pub struct Cli {
    /// Log more: -v for debug, -vv for trace
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only log warnings and errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Give up on connecting, reading or writing after this many seconds
    #[arg(long, global = true, env = "IMAPSHELL_TIMEOUT", value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Print the IMAP conversation
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// The log level asked for with `-v` and `-q`. `RUST_LOG` can still override it.
    pub fn log_level(&self) -> LevelFilter {
        match (self.quiet, self.verbose) {
            (true, _) => LevelFilter::Warn,
            (false, 0) => LevelFilter::Info,
            (false, 1) => LevelFilter::Debug,
            (false, _) => LevelFilter::Trace,
        }
    }

    /// The network timeout, if one was given.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout.map(Duration::from_secs)
    }
}

/// One subcommand per invocation.
#[derive(Debug, Subcommand, PartialEq, Eq)]
pub enum Command {
    /// Test that a server is reachable and try to log in
    Login {
        /// [user@]host[:port] of the IMAP server
        host: String,
        /// Connect without TLS
        #[arg(long)]
        no_ssl: bool,
    },

    /// List available mail folders
    Folders {
        /// [user@]host[:port] of the IMAP server
        host: String,
        /// Order folders by name
        #[arg(long)]
        sort: bool,
        /// Connect without TLS
        #[arg(long)]
        no_ssl: bool,
    },

    /// List messages in a folder
    #[command(alias = "list")]
    Messages {
        /// [user@]host[:port] of the IMAP server
        host: String,
        /// Name of the folder to list
        folder: String,
        /// Connect without TLS
        #[arg(long)]
        no_ssl: bool,
    },

    /// Show one message in full
    Peek {
        /// [user@]host[:port] of the IMAP server
        host: String,
        /// Name of the folder the message is in
        folder: String,
        /// Sequence number of the message, as shown by `messages`
        #[arg(value_name = "MESSAGEID")]
        messageid: Seq,
        /// Connect without TLS
        #[arg(long)]
        no_ssl: bool,
    },

    /// Copy messages from one server to another
    #[command(alias = "migrate")]
    Copy {
        /// Server to copy messages from
        #[arg(value_name = "FROM")]
        from: String,
        /// Folder on the "from" server to copy messages from
        from_folder: String,
        /// Server to copy messages to
        #[arg(value_name = "TO")]
        to: String,
        /// Folder on the "to" server to copy messages to
        to_folder: String,
        /// Connect to the "from" server without TLS
        #[arg(long)]
        from_no_ssl: bool,
        /// Connect to the "to" server without TLS
        #[arg(long)]
        to_no_ssl: bool,
    },

    /// Move every message from one folder into another on the same server
    Merge {
        /// [user@]host[:port] of the IMAP server
        host: String,
        /// Folder to empty
        from_folder: String,
        /// Folder to move the messages into
        to_folder: String,
        /// Connect without TLS
        #[arg(long)]
        no_ssl: bool,
    },

    /// Create a folder
    #[command(name = "createfolder")]
    CreateFolder {
        /// [user@]host[:port] of the IMAP server
        host: String,
        /// Name of the folder to create
        folder: String,
        /// Connect without TLS
        #[arg(long)]
        no_ssl: bool,
    },

    /// Delete a folder
    #[command(name = "rmfolder")]
    RmFolder {
        /// [user@]host[:port] of the IMAP server
        host: String,
        /// Name of the folder to delete
        folder: String,
        /// Delete the folder even if it still holds messages
        #[arg(long)]
        force: bool,
        /// Connect without TLS
        #[arg(long)]
        no_ssl: bool,
    },
}

/// What a successful command produced.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Outcome {
    /// Bytes for standard output.
    pub stdout: Vec<u8>,
    /// A message for standard error.
    pub notice: Option<String>,
    /// The process exit code.
    pub exit_code: u8,
}

impl Outcome {
    fn print<S: Into<String>>(text: S) -> Self {
        Outcome {
            stdout: text.into().into_bytes(),
            ..Outcome::default()
        }
    }
}

/// Run `command`, opening sessions through `resolver`.
///
/// Every host specifier is parsed before anything is prompted for or connected to. Sessions are
/// logged out before this returns, whether the command succeeded or not.
pub fn run<C, P>(command: &Command, resolver: &mut Resolver<C, P>) -> Result<Outcome>
where
    C: Connector,
    P: CredentialPrompter,
{
    match *command {
        Command::Login { ref host, no_ssl } => {
            let spec: HostSpec = host.parse()?;
            let mut session = resolver.open(&spec, !no_ssl)?;
            let capabilities = ops::login(&mut *session)?;
            info!("Connected successfully");
            debug!("Server capabilities: {:?}", capabilities);
            session.logout()?;

            let mut text = capabilities.join("\n");
            text.push('\n');
            Ok(Outcome::print(text))
        }

        Command::Folders {
            ref host,
            sort,
            no_ssl,
        } => {
            let spec: HostSpec = host.parse()?;
            let mut session = resolver.open(&spec, !no_ssl)?;
            let rows = ops::list_folders(&mut *session, sort)?;
            Ok(Outcome::print(output::folder_table(&rows).to_string()))
        }

        Command::Messages {
            ref host,
            ref folder,
            no_ssl,
        } => {
            let spec: HostSpec = host.parse()?;
            let mut session = resolver.open(&spec, !no_ssl)?;
            let summaries = ops::list_messages(&mut *session, folder)?;
            Ok(Outcome::print(output::message_table(&summaries).to_string()))
        }

        Command::Peek {
            ref host,
            ref folder,
            messageid,
            no_ssl,
        } => {
            let spec: HostSpec = host.parse()?;
            let mut session = resolver.open(&spec, !no_ssl)?;
            let message = ops::peek(&mut *session, folder, messageid)?;

            let mut stdout = output::message_metadata(&message).to_string().into_bytes();
            stdout.push(b'\n');
            stdout.extend_from_slice(&message.body);
            Ok(Outcome {
                stdout,
                ..Outcome::default()
            })
        }

        Command::Copy {
            ref from,
            ref from_folder,
            ref to,
            ref to_folder,
            from_no_ssl,
            to_no_ssl,
        } => {
            let from: HostSpec = from.parse()?;
            let to: HostSpec = to.parse()?;
            let report = ops::migrate(
                resolver,
                Endpoint {
                    host: &from,
                    tls: !from_no_ssl,
                    folder: from_folder,
                },
                Endpoint {
                    host: &to,
                    tls: !to_no_ssl,
                    folder: to_folder,
                },
            )?;

            let mut outcome = Outcome::print(format!(
                "Copied {} messages from {} to {}\n",
                report.appended.len(),
                from_folder,
                to_folder
            ));
            if !report.skipped.is_empty() {
                outcome.notice = Some(format!(
                    "Skipped {} messages that came back without content: {:?}",
                    report.skipped.len(),
                    report.skipped
                ));
            }
            Ok(outcome)
        }

        Command::Merge {
            ref host,
            ref from_folder,
            ref to_folder,
            no_ssl,
        } => {
            let spec: HostSpec = host.parse()?;
            let mut session = resolver.open(&spec, !no_ssl)?;
            let moved = ops::merge(&mut *session, from_folder, to_folder)?;
            Ok(Outcome::print(format!(
                "Moved {} messages from {} to {}\n",
                moved, from_folder, to_folder
            )))
        }

        Command::CreateFolder {
            ref host,
            ref folder,
            no_ssl,
        } => {
            let spec: HostSpec = host.parse()?;
            let mut session = resolver.open(&spec, !no_ssl)?;
            ops::create_folder(&mut *session, folder)?;
            Ok(Outcome::print(format!("Created {}\n", folder)))
        }

        Command::RmFolder {
            ref host,
            ref folder,
            force,
            no_ssl,
        } => {
            let spec: HostSpec = host.parse()?;
            let mut session = resolver.open(&spec, !no_ssl)?;
            match ops::remove_folder(&mut *session, folder, force)? {
                Removal::Deleted { messages } => Ok(Outcome::print(format!(
                    "Deleted {} ({} messages)\n",
                    folder, messages
                ))),
                Removal::Refused { messages } => Ok(Outcome {
                    notice: Some(format!(
                        "{} still holds {} messages, use --force to delete it anyway",
                        folder, messages
                    )),
                    exit_code: EXIT_FOLDER_NOT_EMPTY,
                    ..Outcome::default()
                }),
            }
        }
    }
}
