//! # Ember
//!
//! An event-driven IRC bot framework for Rust.
//!
//! ## Overview
//!
//! Ember separates the bot into three cooperating layers behind trait
//! seams: a wire-protocol client that owns the sockets, a core that
//! classifies messages into typed events and fans them out, and a runtime
//! that validates declarative configuration and ties everything together.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────┐  received/sent   ┌────────────┐  channel fan-out  ┌─────────────────────┐
//! │  Client  │─────────────────▶│ Dispatcher │──────────────────▶│ global plugins      │
//! │ (wire)   │                  │            │──────────────────▶│ per-connection      │
//! └──────────┘                  └────────────┘                   │ plugins             │
//!                                                                └─────────────────────┘
//! ```
//!
//! - **Client**: protocol implementation; parses lines and fires the two
//!   generic channels
//! - **Dispatcher**: classifies events and routes them to subtype channels
//!   (`received.privmsg`, `received.ctcp.action`, ...)
//! - **Plugins**: declare channel subscriptions once; global plugins see
//!   every connection, connection-scoped plugins only their own
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//!
//! use ember::prelude::*;
//!
//! struct EchoPlugin;
//!
//! impl Plugin for EchoPlugin {
//!     fn name(&self) -> &str {
//!         "EchoPlugin"
//!     }
//!
//!     fn subscribed_events(&self) -> Subscriptions {
//!         SubscriptionMap::new()
//!             .on("received.privmsg", |event, write| {
//!                 if let (Some(target), Some(text), Some(write)) =
//!                     (event.params().first(), event.params().get(1), write)
//!                 {
//!                     write.privmsg(target, text);
//!                 }
//!             })
//!             .into()
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     ember::runtime::logging::init();
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

pub use ember_core as core;
pub use ember_runtime as runtime;

/// Prelude module for convenient imports.
///
/// ```rust,ignore
/// use ember::prelude::*;
/// ```
pub mod prelude {
    // Runtime - main entry point
    pub use ember_runtime::{Bot, Config, RuntimeError, RuntimeResult, validate};

    // Plugin system - primary unit of event handling
    pub use ember_core::{
        DispatchAware, DispatchHandles, EventHandler, Plugin, SubscriptionMap, Subscriptions,
    };

    // Event system - what handlers receive
    pub use ember_core::{Direction, Event, EventKind};

    // Connection configuration
    pub use ember_core::{Connection, ConnectionId};

    // Client boundary - for wire-protocol implementations
    pub use ember_core::{
        Client, ClientError, Converter, EmitHandle, EventEmitter, Logger, Parser, RawMessage,
        WriteHandle,
    };
}
