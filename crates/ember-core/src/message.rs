//! Structured message types and the parser/converter boundaries.
//!
//! The wire client hands the core already-parsed messages; this module
//! defines that hand-off. [`RawMessage`] is the parser's output, and the
//! [`Parser`] and [`Converter`] traits are the seams behind which the
//! actual IRC wire handling lives. The core never parses a line itself.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::event::Event;

/// A structured IRC message as produced by the line parser.
///
/// One `RawMessage` corresponds to one protocol line, incoming or outgoing.
/// The core treats it as opaque input for the [`Converter`]; only the
/// converter decides which [`Event`] variant it becomes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawMessage {
    /// The message prefix (server name or `nick!user@host`), without the
    /// leading colon.
    #[serde(default)]
    pub prefix: Option<String>,
    /// The protocol command or numeric reply code.
    pub command: String,
    /// Positional parameters, trailing parameter last.
    #[serde(default)]
    pub params: Vec<String>,
    /// The original line as it appeared on the wire.
    #[serde(default)]
    pub raw: String,
}

impl RawMessage {
    /// Creates a message with just a command, for building up in tests and
    /// harnesses.
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            ..Self::default()
        }
    }

    /// Appends a parameter (builder pattern).
    pub fn param(mut self, param: impl Into<String>) -> Self {
        self.params.push(param.into());
        self
    }
}

/// Errors the line parser can report.
#[derive(Debug, Clone, Error)]
pub enum ParseError {
    /// The line is empty or whitespace only.
    #[error("empty message")]
    Empty,

    /// The line does not follow the IRC message grammar.
    #[error("malformed message: {0}")]
    Malformed(String),
}

/// The line parser boundary.
///
/// Implemented by the wire-protocol package; the core only carries the
/// handle around so integrators can substitute it.
pub trait Parser: Send + Sync {
    /// Parses one raw protocol line into a [`RawMessage`].
    fn parse(&self, line: &str) -> Result<RawMessage, ParseError>;
}

/// The message-to-event converter boundary.
///
/// The converter classifies a [`RawMessage`] into one of the [`Event`]
/// variants. Numeric reply codes are expected to arrive at the core already
/// resolved to their symbolic names (`ERR_NOSUCHNICK`, `RPL_WELCOME`, ...);
/// that resolution is the converter's job.
pub trait Converter: Send + Sync {
    /// Converts a structured message into a typed event.
    fn convert(&self, message: &RawMessage) -> Event;
}
