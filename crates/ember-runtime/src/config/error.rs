//! Configuration error types.
//!
//! The message text of each variant is contract: integration tests and
//! downstream tooling match on it verbatim.

use ember_core::PluginError;
use thiserror::Error;

/// Errors reported by configuration validation.
///
/// All of these are fatal and reported synchronously, before any event
/// loop starts. Validation is fail-fast: only the first violation found is
/// ever reported for a given run.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// The `plugins` key is absent.
    #[error("Configuration must contain a \"plugins\" key")]
    MissingPlugins,

    /// The `plugins` value is not a list, or is an empty list.
    #[error("Configuration \"plugins\" key must reference a non-empty array")]
    MalformedPlugins,

    /// The `plugins` list contains something that is not a plugin.
    #[error("All configuration \"plugins\" array values must implement PluginInterface")]
    NotAPlugin,

    /// The `connections` key is absent.
    #[error("Configuration must contain a \"connections\" key")]
    MissingConnections,

    /// The `connections` value is not a list, or is an empty list.
    #[error("Configuration \"connections\" key must reference a non-empty array")]
    MalformedConnections,

    /// The `connections` list contains something that is not a connection.
    #[error("All configuration \"connections\" array values must implement ConnectionInterface")]
    NotAConnection,

    /// A plugin (global or connection-scoped) violated the subscription
    /// contract.
    #[error(transparent)]
    Plugin(#[from] PluginError),
}

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;
