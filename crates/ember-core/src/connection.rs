//! Connection configuration.
//!
//! A [`Connection`] describes one server connection: where to connect, who
//! to identify as, and which plugins apply to that connection alone on top
//! of the bot's global plugin set. The connection does not own any dispatch
//! state; the dispatcher consults it to resolve which extra handlers apply.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::plugin::Plugin;

static NEXT_CONNECTION_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity of a connection.
///
/// Dispatch scoping compares connections by id only; two connections with
/// identical settings are still distinct subscriber scopes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(u64);

impl std::fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Configuration for one server connection.
pub struct Connection {
    id: ConnectionId,
    server_hostname: String,
    server_port: u16,
    password: Option<String>,
    nickname: String,
    username: String,
    realname: String,
    hostname: Option<String>,
    options: HashMap<String, serde_json::Value>,
    plugins: Vec<Arc<dyn Plugin>>,
}

impl Connection {
    /// Creates a connection to `server_hostname` identifying as `nickname`,
    /// on the default port with username and realname mirroring the nick.
    pub fn new(server_hostname: impl Into<String>, nickname: impl Into<String>) -> Self {
        let nickname = nickname.into();
        Self {
            id: ConnectionId(NEXT_CONNECTION_ID.fetch_add(1, Ordering::Relaxed)),
            server_hostname: server_hostname.into(),
            server_port: 6667,
            password: None,
            username: nickname.clone(),
            realname: nickname.clone(),
            nickname,
            hostname: None,
            options: HashMap::new(),
            plugins: Vec::new(),
        }
    }

    /// Sets the server port (builder pattern).
    pub fn port(mut self, port: u16) -> Self {
        self.server_port = port;
        self
    }

    /// Sets the server password (builder pattern).
    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    /// Sets the username sent in the USER command (builder pattern).
    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = username.into();
        self
    }

    /// Sets the real name sent in the USER command (builder pattern).
    pub fn with_realname(mut self, realname: impl Into<String>) -> Self {
        self.realname = realname.into();
        self
    }

    /// Sets the local hostname sent in the USER command (builder pattern).
    pub fn hostname(mut self, hostname: impl Into<String>) -> Self {
        self.hostname = Some(hostname.into());
        self
    }

    /// Sets a free-form client option (builder pattern).
    pub fn option(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.options.insert(key.into(), value);
        self
    }

    /// Adds a connection-scoped plugin (builder pattern).
    ///
    /// Its handlers fire only for events whose back-reference is this
    /// connection, layered on top of the global plugin set.
    pub fn plugin(mut self, plugin: Arc<dyn Plugin>) -> Self {
        self.plugins.push(plugin);
        self
    }

    /// Replaces the connection-scoped plugin list (builder pattern).
    pub fn plugins(mut self, plugins: Vec<Arc<dyn Plugin>>) -> Self {
        self.plugins = plugins;
        self
    }

    /// This connection's process-unique identity.
    pub fn id(&self) -> ConnectionId {
        self.id
    }

    /// The server hostname to connect to.
    pub fn server_hostname(&self) -> &str {
        &self.server_hostname
    }

    /// The server port to connect to.
    pub fn server_port(&self) -> u16 {
        self.server_port
    }

    /// The server password, if any.
    pub fn server_password(&self) -> Option<&str> {
        self.password.as_deref()
    }

    /// The nickname to identify as.
    pub fn nickname(&self) -> &str {
        &self.nickname
    }

    /// The username sent in the USER command.
    pub fn username(&self) -> &str {
        &self.username
    }

    /// The real name sent in the USER command.
    pub fn realname(&self) -> &str {
        &self.realname
    }

    /// The local hostname sent in the USER command, if set.
    pub fn local_hostname(&self) -> Option<&str> {
        self.hostname.as_deref()
    }

    /// Looks up a free-form client option.
    pub fn get_option(&self, key: &str) -> Option<&serde_json::Value> {
        self.options.get(key)
    }

    /// The plugins scoped to this connection, in declaration order.
    pub fn connection_plugins(&self) -> &[Arc<dyn Plugin>] {
        &self.plugins
    }
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("id", &self.id)
            .field("server", &format_args!("{}:{}", self.server_hostname, self.server_port))
            .field("nickname", &self.nickname)
            .field("plugins", &self.plugins.len())
            .finish()
    }
}
