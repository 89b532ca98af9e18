//! The bot: the integrator-facing surface of the framework.
//!
//! A [`Bot`] ties the pieces together: it holds the configuration and the
//! collaborator handles (client, parser, converter, logger), validates the
//! configuration into a dispatch topology, wires the dispatcher onto the
//! client's generic channels, and hands control to the client's event
//! loop.
//!
//! Every collaborator has a setter/getter pair so tests and integrators
//! can substitute implementations.
//!
//! # Example
//!
//! ```rust,ignore
//! use ember_runtime::{Bot, Config};
//!
//! let mut bot = Bot::new();
//! bot.set_config(
//!     Config::new()
//!         .plugins(vec![Arc::new(EchoPlugin)])
//!         .connections(vec![Arc::new(Connection::new("irc.libera.chat", "emberbot"))]),
//! );
//! bot.set_client(client);
//! bot.set_converter(converter);
//! bot.run(None).await?;
//! ```

use std::sync::Arc;

use tracing::info;

use ember_core::{
    Client, Connection, Converter, Dispatcher, EmitHandle, Logger, Parser, TracingLogger,
};

use crate::config::{Config, validate};
use crate::error::{RuntimeError, RuntimeResult};

/// The bot.
///
/// Dispatch setup is rebuilt from scratch on every [`run`](Bot::run), so
/// re-running with the same configuration yields an identical subscription
/// topology.
#[derive(Default)]
pub struct Bot {
    config: Config,
    client: Option<Arc<dyn Client>>,
    parser: Option<Arc<dyn Parser>>,
    converter: Option<Arc<dyn Converter>>,
    logger: Option<Arc<dyn Logger>>,
}

impl Bot {
    /// Creates a bot with an empty configuration and no collaborators.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the configuration.
    pub fn set_config(&mut self, config: Config) {
        self.config = config;
    }

    /// The current configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Sets the wire-protocol client.
    pub fn set_client(&mut self, client: Arc<dyn Client>) {
        self.client = Some(client);
    }

    /// The configured client, if any.
    pub fn client(&self) -> Option<&Arc<dyn Client>> {
        self.client.as_ref()
    }

    /// Sets the line parser.
    pub fn set_parser(&mut self, parser: Arc<dyn Parser>) {
        self.parser = Some(parser);
    }

    /// The configured parser, if any.
    pub fn parser(&self) -> Option<&Arc<dyn Parser>> {
        self.parser.as_ref()
    }

    /// Sets the message-to-event converter.
    pub fn set_converter(&mut self, converter: Arc<dyn Converter>) {
        self.converter = Some(converter);
    }

    /// The configured converter, if any.
    pub fn converter(&self) -> Option<&Arc<dyn Converter>> {
        self.converter.as_ref()
    }

    /// Sets the bot's own logger, overriding the client's.
    pub fn set_logger(&mut self, logger: Arc<dyn Logger>) {
        self.logger = Some(logger);
    }

    /// The effective logger: the bot's own if set, else the client's, else
    /// a [`TracingLogger`].
    pub fn logger(&self) -> Arc<dyn Logger> {
        if let Some(logger) = &self.logger {
            return Arc::clone(logger);
        }
        if let Some(logger) = self.client.as_ref().and_then(|client| client.logger()) {
            return logger;
        }
        Arc::new(TracingLogger)
    }

    /// Validates the configuration, builds the dispatch topology, and
    /// delegates to the client's event loop.
    ///
    /// Any validation failure aborts before the client is engaged. The
    /// optional `connections` list overrides what is handed to the
    /// client's `run` (for composing with externally-driven harnesses);
    /// the dispatch topology always comes from the configuration.
    pub async fn run(&mut self, connections: Option<Vec<Arc<Connection>>>) -> RuntimeResult<()> {
        let topology = validate(&self.config)?;

        let client = self
            .client
            .as_ref()
            .cloned()
            .ok_or(RuntimeError::MissingClient)?;
        let converter = self
            .converter
            .as_ref()
            .cloned()
            .ok_or(RuntimeError::MissingConverter)?;

        let emitter: EmitHandle = client.clone();
        let dispatcher = Dispatcher::new(converter, &topology, emitter, self.logger());
        dispatcher.attach(client.as_ref());

        let connections = connections.unwrap_or_else(|| topology.connection_list());
        info!(
            connections = connections.len(),
            global_plugins = topology.global().len(),
            "starting bot"
        );
        client.run(connections).await?;
        Ok(())
    }
}

impl std::fmt::Debug for Bot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bot")
            .field("has_client", &self.client.is_some())
            .field("has_parser", &self.parser.is_some())
            .field("has_converter", &self.converter.is_some())
            .field("has_logger", &self.logger.is_some())
            .finish()
    }
}
