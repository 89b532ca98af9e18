//! Ember Runtime - orchestration layer for the Ember bot framework.
//!
//! This crate provides:
//! - Bot assembly and lifecycle (`Bot`)
//! - Declarative configuration and its validation (`Config`, `validate`)
//! - Logging setup (`logging`)
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//!
//! use ember_core::Connection;
//! use ember_runtime::{Bot, Config, logging};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     logging::init();
//!
//!     let mut bot = Bot::new();
//!     bot.set_config(
//!         Config::new()
//!             .plugins(vec![Arc::new(EchoPlugin)])
//!             .connections(vec![Arc::new(
//!                 Connection::new("irc.libera.chat", "emberbot"),
//!             )]),
//!     );
//!     bot.set_client(client);
//!     bot.set_converter(converter);
//!     bot.run(None).await?;
//!     Ok(())
//! }
//! ```
//!
//! Configuration is validated up front: every plugin's subscription
//! declaration (global and connection-scoped alike) is checked before any
//! connection is engaged, so a bad plugin fails the whole run rather than
//! failing silently at dispatch time.

pub mod bot;
pub mod config;
pub mod error;
pub mod logging;

// Re-exports
pub use bot::Bot;
pub use config::{Config, ConfigError, ConfigItem, ConfigResult, ConfigValue, validate};
pub use error::{RuntimeError, RuntimeResult};
pub use logging::LoggingBuilder;

// Re-export tracing for use by plugin crates
pub use tracing;
pub use tracing_subscriber;

/// Prelude module for convenient imports.
///
/// This provides the commonly used logging macros alongside the runtime
/// types:
/// - `trace!`, `debug!`, `info!`, `warn!`, `error!`
/// - `Level` for span creation
pub mod prelude {
    pub use tracing::{Level, debug, error, info, instrument, span, trace, warn};

    pub use crate::bot::Bot;
    pub use crate::config::{Config, ConfigError, validate};
    pub use crate::error::{RuntimeError, RuntimeResult};
}
