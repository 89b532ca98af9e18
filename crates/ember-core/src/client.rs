//! Boundary traits for the wire-protocol client and its collaborators.
//!
//! The core performs no socket I/O. Everything network-facing lives behind
//! [`Client`]: the client runs the connections, parses lines, and fires the
//! two generic channels (`received`, `sent`) that the dispatcher listens
//! on. [`WriteHandle`] is the client's write-capable stream handle, passed
//! through to handlers of received events so they can respond.

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tracing::Level;

use crate::connection::Connection;
use crate::event::Event;
use crate::message::RawMessage;

/// A pluggable logger handle.
///
/// The framework logs through `tracing`; this seam exists so the logger
/// handed to dispatch-aware plugins can be substituted in tests. The
/// default implementation is [`TracingLogger`].
pub trait Logger: Send + Sync {
    /// Logs a message at the given level.
    fn log(&self, level: Level, message: &str);

    /// Logs at DEBUG level.
    fn debug(&self, message: &str) {
        self.log(Level::DEBUG, message);
    }

    /// Logs at INFO level.
    fn info(&self, message: &str) {
        self.log(Level::INFO, message);
    }

    /// Logs at WARN level.
    fn warn(&self, message: &str) {
        self.log(Level::WARN, message);
    }

    /// Logs at ERROR level.
    fn error(&self, message: &str) {
        self.log(Level::ERROR, message);
    }
}

/// The default [`Logger`], forwarding to the `tracing` macros.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogger;

impl Logger for TracingLogger {
    fn log(&self, level: Level, message: &str) {
        if level == Level::ERROR {
            tracing::error!("{message}");
        } else if level == Level::WARN {
            tracing::warn!("{message}");
        } else if level == Level::INFO {
            tracing::info!("{message}");
        } else if level == Level::DEBUG {
            tracing::debug!("{message}");
        } else {
            tracing::trace!("{message}");
        }
    }
}

/// The write-capable stream handle for one connection.
///
/// Owned by the client; handlers of received events borrow it to respond.
/// Sent events never carry one.
pub trait WriteHandle: Send + Sync {
    /// Queues one raw protocol line for sending.
    fn write(&self, line: &str);

    /// Sends a PRIVMSG to `target`.
    fn privmsg(&self, target: &str, text: &str) {
        self.write(&format!("PRIVMSG {target} :{text}"));
    }

    /// Sends a NOTICE to `target`.
    fn notice(&self, target: &str, text: &str) {
        self.write(&format!("NOTICE {target} :{text}"));
    }

    /// Sends a CTCP ACTION to `target`.
    fn action(&self, target: &str, text: &str) {
        self.write(&format!("PRIVMSG {target} :\u{1}ACTION {text}\u{1}"));
    }
}

/// The event-emission capability of the client.
///
/// Dispatch-aware plugins receive a handle to this so they can fire custom
/// channels of their own through the same bus the client uses.
pub trait EventEmitter: Send + Sync {
    /// Emits `event` on the named channel.
    fn emit(&self, channel: &str, event: &Event);
}

/// A shareable handle to the client's event-emission capability.
pub type EmitHandle = Arc<dyn EventEmitter>;

/// Listener for the generic `received` channel: structured message, write
/// handle, and the connection the message arrived on.
pub type ReceivedListener =
    Arc<dyn Fn(&RawMessage, &Arc<dyn WriteHandle>, &Arc<Connection>) + Send + Sync>;

/// Listener for the generic `sent` channel: structured message and the
/// connection the message was written to. No write handle.
pub type SentListener = Arc<dyn Fn(&RawMessage, &Arc<Connection>) + Send + Sync>;

/// Errors surfaced by the client boundary.
#[derive(Debug, Clone, Error)]
pub enum ClientError {
    /// A connection attempt failed.
    #[error("connection failed: {server} - {reason}")]
    ConnectionFailed {
        /// The server that failed.
        server: String,
        /// Reason for failure.
        reason: String,
    },

    /// The connection was closed.
    #[error("connection closed: {reason}")]
    ConnectionClosed {
        /// Reason for closure.
        reason: String,
    },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(String),
}

impl From<std::io::Error> for ClientError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

/// The wire-protocol client boundary.
///
/// The client owns the sockets, the line-based event loop, and any
/// reconnection policy. The core only installs its two dispatch listeners
/// and delegates `run`.
#[async_trait]
pub trait Client: EventEmitter {
    /// Installs the dispatch listener for the generic `received` channel,
    /// replacing any previously installed one.
    fn on_received(&self, listener: ReceivedListener);

    /// Installs the dispatch listener for the generic `sent` channel,
    /// replacing any previously installed one.
    fn on_sent(&self, listener: SentListener);

    /// Runs the event loop for the given connections until they close.
    async fn run(&self, connections: Vec<Arc<Connection>>) -> Result<(), ClientError>;

    /// The client's own logger, if it carries one.
    fn logger(&self) -> Option<Arc<dyn Logger>> {
        None
    }
}
