//! Runtime error types.

use ember_core::ClientError;
use thiserror::Error;

use crate::config::ConfigError;

/// Errors that can occur while running the bot.
#[derive(Debug, Error)]
pub enum RuntimeError {
    /// The configuration failed validation.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// No client has been configured.
    #[error("no client configured")]
    MissingClient,

    /// No converter has been configured.
    #[error("no converter configured")]
    MissingConverter,

    /// The client's event loop failed.
    #[error(transparent)]
    Client(#[from] ClientError),
}

/// Result type for runtime operations.
pub type RuntimeResult<T> = Result<T, RuntimeError>;
