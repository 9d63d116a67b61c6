//! Authenticated sessions and how they are resolved from a host specifier.

use std::ops::{Deref, DerefMut};

use log::{debug, info, warn};

use crate::address::HostSpec;
use crate::connect::{Connector, Login};
use crate::error::{Error, Result};
use crate::mailstore::Mailstore;
use crate::prompt::CredentialPrompter;

/// An authenticated connection to one server.
///
/// A `Session` only exists once login has succeeded. It logs out when it is dropped, so a session
/// never outlives the block that opened it, whichever way that block is left. Use
/// [`Session::logout`] to log out early and see whether the server acknowledged it.
#[derive(Debug)]
pub struct Session<M: Mailstore> {
    host: String,
    port: u16,
    tls: bool,
    username: String,
    store: M,
    logged_out: bool,
}

impl<M: Mailstore> Session<M> {
    /// Wrap an already authenticated store.
    pub fn new(host: &str, port: u16, tls: bool, username: &str, store: M) -> Self {
        Session {
            host: host.to_string(),
            port,
            tls,
            username: username.to_string(),
            store,
            logged_out: false,
        }
    }

    /// The server this session is connected to.
    pub fn host(&self) -> &str {
        &self.host
    }

    /// The port this session is connected to.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Whether the connection is encrypted.
    pub fn is_tls(&self) -> bool {
        self.tls
    }

    /// The user this session is logged in as.
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Log out now.
    pub fn logout(mut self) -> Result<()> {
        self.logged_out = true;
        debug!("logging out of {}", self.host);
        self.store.logout().map_err(Error::protocol("LOGOUT"))
    }
}

impl<M: Mailstore> Deref for Session<M> {
    type Target = M;

    fn deref(&self) -> &M {
        &self.store
    }
}

impl<M: Mailstore> DerefMut for Session<M> {
    fn deref_mut(&mut self) -> &mut M {
        &mut self.store
    }
}

impl<M: Mailstore> Drop for Session<M> {
    fn drop(&mut self) {
        if !self.logged_out {
            debug!("logging out of {}", self.host);
            if let Err(e) = self.store.logout() {
                warn!("logout from {} failed: {}", self.host, e);
            }
        }
    }
}

/// Opens sessions: asks for whatever credentials the host specifier lacks, then connects.
#[derive(Debug)]
pub struct Resolver<C, P> {
    connector: C,
    prompter: P,
}

impl<C: Connector, P: CredentialPrompter> Resolver<C, P> {
    /// A resolver that connects with `connector` and asks `prompter` for credentials.
    pub fn new(connector: C, prompter: P) -> Self {
        Resolver {
            connector,
            prompter,
        }
    }

    /// The connector sessions are opened with.
    pub fn connector(&self) -> &C {
        &self.connector
    }

    /// Open an authenticated session to `spec`, with TLS unless `tls` is false.
    ///
    /// Each call makes one connection and one login attempt, and nothing is retried.
    pub fn open(&mut self, spec: &HostSpec, tls: bool) -> Result<Session<C::Store>> {
        let username = match spec.username {
            Some(ref username) => username.clone(),
            None => self.prompter.username(&spec.host).map_err(Error::Prompt)?,
        };
        let password = self
            .prompter
            .password(&spec.host, &username)
            .map_err(Error::Prompt)?;

        let port = spec.port_or_default(tls);
        let store = self.connector.connect(&Login {
            host: &spec.host,
            port,
            tls,
            username: &username,
            password: &password,
        })?;
        info!("Connected to {} as {}", spec.host, username);

        Ok(Session::new(&spec.host, port, tls, &username, store))
    }
}
