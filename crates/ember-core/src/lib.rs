//! # Ember Core
//!
//! The event-dispatch engine of the Ember IRC bot framework.
//!
//! Ember converts structured protocol messages into typed events and routes
//! each event to the plugins interested in it, honoring both bot-wide and
//! per-connection plugin registration. This crate owns no I/O: the wire
//! client, line parser, and message-to-event converter are boundary traits
//! implemented elsewhere.
//!
//! ## Data flow
//!
//! ```text
//! raw line ──▶ Parser ──▶ RawMessage ──▶ Converter ──▶ Event
//!                                                        │
//!                                  ┌─────────────────────┘
//!                                  ▼
//!                            ┌────────────┐    received.all
//!                            │ Dispatcher │──▶ received.<subtype>
//!                            │  (buses)   │──▶ <scoped> received.all
//!                            └────────────┘    <scoped> received.<subtype>
//! ```
//!
//! A plugin declares its interest as a [`SubscriptionMap`] from channel
//! name to handler; the [`Dispatcher`] derives the tables once at setup and
//! fans each event out synchronously, global handlers before
//! connection-scoped ones.
//!
//! ## Example
//!
//! ```rust,ignore
//! use ember_core::{Plugin, SubscriptionMap, Subscriptions};
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
//! ```

pub mod bus;
pub mod client;
pub mod connection;
pub mod dispatcher;
pub mod event;
pub mod message;
pub mod plugin;

pub use bus::EventBus;
pub use client::{
    Client, ClientError, EmitHandle, EventEmitter, Logger, ReceivedListener, SentListener,
    TracingLogger, WriteHandle,
};
pub use connection::{Connection, ConnectionId};
pub use dispatcher::{ConnectionEntry, DispatchTopology, Dispatcher, PluginEntry};
pub use event::{Direction, Event, EventKind};
pub use message::{Converter, ParseError, Parser, RawMessage};
pub use plugin::{
    DispatchAware, DispatchHandles, EventHandler, HandlerRef, Plugin, PluginError,
    SubscriptionMap, Subscriptions, resolve_subscriptions,
};

/// Prelude for common imports.
pub mod prelude {
    pub use super::{
        Client, Connection, Converter, DispatchAware, DispatchHandles, Dispatcher, Direction,
        Event, EventHandler, EventKind, Logger, Parser, Plugin, RawMessage, SubscriptionMap,
        Subscriptions, WriteHandle,
    };
}
