//! Bot configuration.
//!
//! A [`Config`] carries live plugin and connection instances, not file
//! data: integrators construct it in code (or adapt it from a dynamic
//! source) and hand it to the bot. Validation turns it into a
//! [`DispatchTopology`](ember_core::DispatchTopology) or fails fast with
//! the exact rule that was violated.
//!
//! # Example
//!
//! ```rust,ignore
//! use ember_runtime::Config;
//!
//! let config = Config::new()
//!     .plugins(vec![Arc::new(EchoPlugin)])
//!     .connections(vec![Arc::new(
//!         Connection::new("irc.libera.chat", "emberbot"),
//!     )]);
//! ```
//!
//! The `*_value` setters accept arbitrary [`ConfigValue`]s so layers that
//! assemble configuration dynamically keep every validation rule
//! observable, including the malformed shapes.

pub mod error;
pub mod validation;

pub use error::{ConfigError, ConfigResult};
pub use validation::validate;

use std::sync::Arc;

use ember_core::{Connection, Plugin};

/// One element of a configuration list.
#[derive(Clone)]
pub enum ConfigItem {
    /// A plugin instance.
    Plugin(Arc<dyn Plugin>),
    /// A connection instance.
    Connection(Arc<Connection>),
}

impl std::fmt::Debug for ConfigItem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigItem::Plugin(plugin) => write!(f, "Plugin({})", plugin.name()),
            ConfigItem::Connection(connection) => {
                write!(f, "Connection({})", connection.id())
            }
        }
    }
}

/// The value under a configuration key.
///
/// Well-formed configurations use `List`; `Other` carries whatever a
/// dynamic source put there, to be rejected by validation.
#[derive(Clone, Debug)]
pub enum ConfigValue {
    /// A list of plugin or connection instances.
    List(Vec<ConfigItem>),
    /// Anything that is not a list.
    Other(serde_json::Value),
}

/// The bot's declarative configuration.
///
/// Two required keys: `plugins` (global plugins, applied to every
/// connection) and `connections`. Absence or emptiness of either is a
/// validation failure, not a silent default.
#[derive(Clone, Debug, Default)]
pub struct Config {
    plugins: Option<ConfigValue>,
    connections: Option<ConfigValue>,
}

impl Config {
    /// Creates an empty configuration. Invalid until both keys are set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the global plugin list (builder pattern).
    pub fn plugins(mut self, plugins: Vec<Arc<dyn Plugin>>) -> Self {
        self.plugins = Some(ConfigValue::List(
            plugins.into_iter().map(ConfigItem::Plugin).collect(),
        ));
        self
    }

    /// Sets the connection list (builder pattern).
    pub fn connections(mut self, connections: Vec<Arc<Connection>>) -> Self {
        self.connections = Some(ConfigValue::List(
            connections.into_iter().map(ConfigItem::Connection).collect(),
        ));
        self
    }

    /// Sets the raw value under the `plugins` key (builder pattern).
    pub fn plugins_value(mut self, value: ConfigValue) -> Self {
        self.plugins = Some(value);
        self
    }

    /// Sets the raw value under the `connections` key (builder pattern).
    pub fn connections_value(mut self, value: ConfigValue) -> Self {
        self.connections = Some(value);
        self
    }

    /// The value under the `plugins` key, if present.
    pub fn plugins_entry(&self) -> Option<&ConfigValue> {
        self.plugins.as_ref()
    }

    /// The value under the `connections` key, if present.
    pub fn connections_entry(&self) -> Option<&ConfigValue> {
        self.connections.as_ref()
    }
}
