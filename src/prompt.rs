//! Asking the operator for credentials.

use std::io::{self, BufRead, Write};

/// Supplies the login name and password for a server.
///
/// The password is only ever obtained through this trait, never from the host specifier or the
/// command line.
pub trait CredentialPrompter {
    /// Ask for the login name to use on `host`.
    fn username(&mut self, host: &str) -> io::Result<String>;

    /// Ask for the password of `username` on `host`.
    fn password(&mut self, host: &str, username: &str) -> io::Result<String>;
}

/// Prompts on the controlling terminal. The password is read without echo.
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalPrompter;

impl CredentialPrompter for TerminalPrompter {
    fn username(&mut self, host: &str) -> io::Result<String> {
        let mut stderr = io::stderr();
        write!(stderr, "{} login name: ", host)?;
        stderr.flush()?;

        let mut line = String::new();
        if io::stdin().lock().read_line(&mut line)? == 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "no login name given",
            ));
        }
        Ok(line.trim_end_matches(&['\r', '\n'][..]).to_string())
    }

    fn password(&mut self, host: &str, _username: &str) -> io::Result<String> {
        rpassword::prompt_password(format!("{} password: ", host))
    }
}
