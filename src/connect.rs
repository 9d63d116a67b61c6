//! Opening transports and logging in.

use std::error::Error as StdError;
use std::fmt;
use std::io::{self, Read, Write};
use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;

use log::{debug, warn};
use native_tls::{TlsConnector, TlsStream};

use crate::error::{Error, Result};
use crate::mailstore::Mailstore;

/// Everything needed to open and authenticate one connection.
///
/// The `Debug` output leaves out the password.
#[derive(Clone)]
pub struct Login<'a> {
    /// The server's host name, also used for SNI and certificate checks.
    pub host: &'a str,
    /// The port to connect to.
    pub port: u16,
    /// Whether to wrap the connection in TLS before the greeting.
    pub tls: bool,
    /// The login name.
    pub username: &'a str,
    /// The password.
    pub password: &'a str,
}

impl fmt::Debug for Login<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Login")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("tls", &self.tls)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Turns connection parameters into an authenticated [`Mailstore`].
///
/// Implementations must report transport problems as [`Error::ConnectionFailed`] and rejected
/// credentials as [`Error::AuthenticationFailed`], and must not retry.
pub trait Connector {
    /// The store produced by a successful login.
    type Store: Mailstore;

    /// Connect to `login.host` and log in.
    fn connect(&self, login: &Login<'_>) -> Result<Self::Store>;
}

/// The byte stream under an [`imap::Session`]: plain TCP or TLS over TCP.
#[derive(Debug)]
pub enum Transport {
    /// An unencrypted connection.
    Plain(TcpStream),
    /// A TLS connection.
    Tls(TlsStream<TcpStream>),
}

impl Read for Transport {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match *self {
            Transport::Plain(ref mut s) => s.read(buf),
            Transport::Tls(ref mut s) => s.read(buf),
        }
    }
}

impl Write for Transport {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match *self {
            Transport::Plain(ref mut s) => s.write(buf),
            Transport::Tls(ref mut s) => s.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match *self {
            Transport::Plain(ref mut s) => s.flush(),
            Transport::Tls(ref mut s) => s.flush(),
        }
    }
}

/// Connects to real servers using `native-tls`.
///
/// By default every network call blocks until the server answers. A timeout can be set to bound
/// connecting, and each individual read and write.
///
/// ```no_run
/// # use imapshell::connect::{Connector, ImapConnector, Login};
/// # use std::time::Duration;
/// # fn main() -> imapshell::error::Result<()> {
/// let connector = ImapConnector::new().timeout(Some(Duration::from_secs(30)));
/// let session = connector.connect(&Login {
///     host: "imap.example.com",
///     port: 993,
///     tls: true,
///     username: "jane",
///     password: "hunter2",
/// })?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug, Default)]
pub struct ImapConnector {
    timeout: Option<Duration>,
    debug: bool,
}

impl ImapConnector {
    /// A connector that blocks without limit and does not trace the protocol.
    pub fn new() -> Self {
        ImapConnector::default()
    }

    /// Bound connect, read and write calls by `timeout`. `None` blocks indefinitely.
    pub fn timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Print every protocol line sent and received.
    pub fn debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    fn open_tcp(&self, host: &str, port: u16) -> io::Result<TcpStream> {
        let timeout = match self.timeout {
            Some(timeout) => timeout,
            None => return TcpStream::connect((host, port)),
        };

        // resolve the name and try every address in turn, since `connect_timeout` only takes one
        let mut last_err = None;
        for addr in (host, port).to_socket_addrs()? {
            match TcpStream::connect_timeout(&addr, timeout) {
                Ok(tcp) => {
                    tcp.set_read_timeout(Some(timeout))?;
                    tcp.set_write_timeout(Some(timeout))?;
                    return Ok(tcp);
                }
                Err(e) => {
                    debug!("couldn't connect to {}: {}", addr, e);
                    last_err = Some(e);
                }
            }
        }
        Err(last_err.unwrap_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("{} did not resolve to any address", host),
            )
        }))
    }
}

impl Connector for ImapConnector {
    type Store = imap::Session<Transport>;

    fn connect(&self, login: &Login<'_>) -> Result<Self::Store> {
        let failed = |source: Box<dyn StdError>| Error::ConnectionFailed {
            host: login.host.to_string(),
            source,
        };

        debug!(
            "connecting to {}:{} ({})",
            login.host,
            login.port,
            if login.tls { "TLS" } else { "plaintext" }
        );
        let tcp = self
            .open_tcp(login.host, login.port)
            .map_err(|e| failed(e.into()))?;

        let transport = if login.tls {
            let connector = TlsConnector::new().map_err(|e| failed(e.into()))?;
            let stream = connector
                .connect(login.host, tcp)
                .map_err(|e| failed(e.into()))?;
            Transport::Tls(stream)
        } else {
            warn!(
                "connecting to {} without TLS, the password will be sent in the clear",
                login.host
            );
            Transport::Plain(tcp)
        };

        let mut session = handshake(transport, login)?;
        session.debug = self.debug;
        Ok(session)
    }
}

/// Read the greeting from `stream` and log in.
///
/// On an unencrypted connection `LOGIN` is never sent to a server that advertises
/// `LOGINDISABLED`. If the greeting does not list the capabilities, they are asked for with
/// `CAPABILITY` before the password goes out.
pub(crate) fn handshake<S: Read + Write>(
    mut stream: S,
    login: &Login<'_>,
) -> Result<imap::Session<S>> {
    let failed = |source: Box<dyn StdError>| Error::ConnectionFailed {
        host: login.host.to_string(),
        source,
    };

    let greeting = read_line(&mut stream).map_err(|e| failed(e.into()))?;
    if !greeting.starts_with(b"* OK") && !greeting.starts_with(b"* PREAUTH") {
        return Err(failed(
            format!(
                "unexpected greeting: {}",
                String::from_utf8_lossy(&greeting).trim_end()
            )
            .into(),
        ));
    }

    if !login.tls {
        let capabilities = if lists_capabilities(&greeting) {
            greeting
        } else {
            pre_auth_capabilities(&mut stream).map_err(failed)?
        };
        if advertises(&capabilities, "LOGINDISABLED") {
            return Err(Error::AuthenticationFailed {
                host: login.host.to_string(),
                reason: "the server does not allow LOGIN without TLS".to_string(),
            });
        }
    }

    let mut client = imap::Client::new(stream);
    client.greeting_read = true;
    client
        .login(login.username, login.password)
        .map_err(|(e, _client)| match e {
            imap::Error::No(_) | imap::Error::Bad(_) => Error::AuthenticationFailed {
                host: login.host.to_string(),
                reason: e.to_string(),
            },
            e => failed(Box::new(e)),
        })
}

/// Tag for the one command sent before the `imap` client takes over, which starts at `a1`.
const CAPABILITY_TAG: &[u8] = b"a0 ";

/// Send `CAPABILITY` and return every line of the reply, the tagged status included.
fn pre_auth_capabilities<S: Read + Write>(
    stream: &mut S,
) -> std::result::Result<Vec<u8>, Box<dyn StdError>> {
    stream.write_all(CAPABILITY_TAG)?;
    stream.write_all(b"CAPABILITY\r\n")?;
    stream.flush()?;

    let mut reply = Vec::new();
    loop {
        let line = read_line(stream)?;
        if line.starts_with(CAPABILITY_TAG) {
            if !line[CAPABILITY_TAG.len()..].starts_with(b"OK") {
                return Err(format!(
                    "CAPABILITY was refused: {}",
                    String::from_utf8_lossy(&line).trim_end()
                )
                .into());
            }
            return Ok(reply);
        }
        reply.extend_from_slice(&line);
    }
}

/// Read up to and including the next `\n`, one byte at a time so nothing past the line is
/// consumed before the stream is handed to the `imap` client.
fn read_line<R: Read>(stream: &mut R) -> io::Result<Vec<u8>> {
    let mut line = Vec::new();
    let mut byte = [0u8; 1];
    loop {
        if stream.read(&mut byte)? == 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "connection closed before the end of the line",
            ));
        }
        line.push(byte[0]);
        if byte[0] == b'\n' {
            return Ok(line);
        }
    }
}

/// Whether a greeting carries a `[CAPABILITY ...]` response code.
fn lists_capabilities(greeting: &[u8]) -> bool {
    const CODE: &[u8] = b"[CAPABILITY ";
    greeting
        .windows(CODE.len())
        .any(|window| window.eq_ignore_ascii_case(CODE))
}

fn advertises(capabilities: &[u8], capability: &str) -> bool {
    String::from_utf8_lossy(capabilities)
        .to_ascii_uppercase()
        .split(|c: char| c.is_whitespace() || c == '[' || c == ']')
        .any(|atom| atom == capability)
}
