//! Typed protocol events and their dispatch classification.
//!
//! Every incoming or outgoing message becomes exactly one [`Event`], built
//! by the converter and consumed within a single dispatch pass. The event
//! carries a back-reference to the [`Connection`] it occurred on; the
//! dispatcher sets that reference before fan-out and connection-scoped
//! handler lookup uses nothing else.
//!
//! # Channels
//!
//! Routing is by channel name. A classified event maps to a subtype channel
//! of the form `<direction>.<subtype>`:
//!
//! - CTCP events route as `received.ctcp.action`, `sent.ctcp.version`, ...
//! - user events route by protocol command: `received.privmsg`
//! - server events route by reply code: `received.err_nosuchnick`
//!
//! Alongside the subtype channel, every event of a direction also passes
//! through that direction's catch-all channel (`received.all` / `sent.all`).

use std::sync::Arc;

use crate::connection::Connection;

/// Whether an event was received from or sent to the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// The message arrived from the server.
    Received,
    /// The message was written by this bot.
    Sent,
}

impl Direction {
    /// The channel-name component for this direction.
    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Received => "received",
            Direction::Sent => "sent",
        }
    }

    /// The catch-all channel every event of this direction routes through.
    pub fn catch_all(self) -> String {
        format!("{}.all", self.as_str())
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The structural variant of an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventKind {
    /// A CTCP request or reply embedded in a PRIVMSG or NOTICE.
    Ctcp {
        /// The enclosing protocol command (`PRIVMSG` or `NOTICE`).
        command: String,
        /// The CTCP subcommand (`ACTION`, `VERSION`, ...).
        ctcp_command: String,
        /// The CTCP parameter string, if any.
        ctcp_params: Option<String>,
    },
    /// A user-originated message, classified by protocol command.
    User {
        /// The protocol command (`PRIVMSG`, `JOIN`, `KICK`, ...).
        command: String,
    },
    /// A server reply, classified by its (symbolic) reply code.
    Server {
        /// The reply code, e.g. `ERR_NOSUCHNICK` or `RPL_WELCOME`.
        code: String,
    },
}

impl EventKind {
    /// The lowercase subtype token used to build the routed channel name.
    pub fn subtype(&self) -> String {
        match self {
            EventKind::Ctcp { ctcp_command, .. } => {
                format!("ctcp.{}", ctcp_command.to_lowercase())
            }
            EventKind::User { command } => command.to_lowercase(),
            EventKind::Server { code } => code.to_lowercase(),
        }
    }
}

/// One classified protocol occurrence.
///
/// Created by the converter, consumed synchronously during one dispatch
/// pass, then discarded. Not retained by the core.
#[derive(Debug, Clone)]
pub struct Event {
    kind: EventKind,
    prefix: Option<String>,
    params: Vec<String>,
    connection: Option<Arc<Connection>>,
}

impl Event {
    /// Creates an event of the given kind with no connection attached.
    pub fn new(kind: EventKind) -> Self {
        Self {
            kind,
            prefix: None,
            params: Vec::new(),
            connection: None,
        }
    }

    /// Convenience constructor for a CTCP event.
    pub fn ctcp(command: impl Into<String>, ctcp_command: impl Into<String>) -> Self {
        Self::new(EventKind::Ctcp {
            command: command.into(),
            ctcp_command: ctcp_command.into(),
            ctcp_params: None,
        })
    }

    /// Convenience constructor for a user event.
    pub fn user(command: impl Into<String>) -> Self {
        Self::new(EventKind::User {
            command: command.into(),
        })
    }

    /// Convenience constructor for a server event.
    pub fn server(code: impl Into<String>) -> Self {
        Self::new(EventKind::Server { code: code.into() })
    }

    /// Sets the message prefix (builder pattern).
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    /// Sets the positional parameters (builder pattern).
    pub fn with_params(mut self, params: Vec<String>) -> Self {
        self.params = params;
        self
    }

    /// The structural variant of this event.
    pub fn kind(&self) -> &EventKind {
        &self.kind
    }

    /// The message prefix, if any.
    pub fn prefix(&self) -> Option<&str> {
        self.prefix.as_deref()
    }

    /// The positional parameters.
    pub fn params(&self) -> &[String] {
        &self.params
    }

    /// The lowercase subtype token for this event.
    pub fn subtype(&self) -> String {
        self.kind.subtype()
    }

    /// The subtype channel this event routes through for `direction`.
    pub fn channel(&self, direction: Direction) -> String {
        format!("{}.{}", direction.as_str(), self.subtype())
    }

    /// The connection this event occurred on.
    ///
    /// `None` until the dispatcher has set the back-reference; handlers
    /// always observe `Some`.
    pub fn connection(&self) -> Option<&Arc<Connection>> {
        self.connection.as_ref()
    }

    /// Attaches the owning connection. Called by the dispatcher before
    /// fan-out; the back-reference is used purely for routing lookups.
    pub fn set_connection(&mut self, connection: Arc<Connection>) {
        self.connection = Some(connection);
    }
}
