//! Plugin contract and subscription tables.
//!
//! A plugin declares its interest once, as a mapping from channel name to
//! handler. The declaration is resolved into a table of first-class
//! [`EventHandler`] values at setup time and never consulted again: there
//! is no name lookup or reflection at dispatch time.
//!
//! # Declaring subscriptions
//!
//! ```rust,ignore
//! use ember_core::{Plugin, SubscriptionMap, Subscriptions};
//!
//! struct GreetPlugin;
//!
//! impl Plugin for GreetPlugin {
//!     fn name(&self) -> &str {
//!         "GreetPlugin"
//!     }
//!
//!     fn subscribed_events(&self) -> Subscriptions {
//!         SubscriptionMap::new()
//!             .on("received.join", |event, write| {
//!                 if let (Some(channel), Some(write)) = (event.params().first(), write) {
//!                     write.privmsg(channel, "hello!");
//!                 }
//!             })
//!             .into()
//!     }
//! }
//! ```
//!
//! Handlers that need to reference the plugin itself can be declared by
//! name instead and resolved through [`Plugin::resolve`]; resolution
//! happens exactly once, when the table is built.

use std::sync::Arc;

use parking_lot::RwLock;
use thiserror::Error;

use crate::client::{EmitHandle, Logger, WriteHandle};
use crate::event::Event;

/// A subscribed event handler.
///
/// Receives the event and, for received events only, the write-capable
/// stream handle for the connection the event arrived on.
pub type EventHandler = Arc<dyn Fn(&Event, Option<&Arc<dyn WriteHandle>>) + Send + Sync>;

/// A handler as declared in a subscription mapping.
///
/// Either a first-class callback, or the name of a handler the plugin
/// resolves via [`Plugin::resolve`] when the table is built.
#[derive(Clone)]
pub enum HandlerRef {
    /// A directly supplied callback.
    Callback(EventHandler),
    /// A named handler, resolved once at setup.
    Named(&'static str),
}

impl std::fmt::Debug for HandlerRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HandlerRef::Callback(_) => f.write_str("Callback(..)"),
            HandlerRef::Named(name) => write!(f, "Named({name:?})"),
        }
    }
}

/// An ordered mapping from channel name to handler.
#[derive(Clone, Debug, Default)]
pub struct SubscriptionMap {
    entries: Vec<(String, HandlerRef)>,
}

impl SubscriptionMap {
    /// Creates an empty mapping.
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribes a callback to `channel` (builder pattern).
    pub fn on<F>(mut self, channel: impl Into<String>, handler: F) -> Self
    where
        F: Fn(&Event, Option<&Arc<dyn WriteHandle>>) + Send + Sync + 'static,
    {
        self.entries
            .push((channel.into(), HandlerRef::Callback(Arc::new(handler))));
        self
    }

    /// Subscribes a named handler to `channel` (builder pattern).
    ///
    /// The name is resolved through [`Plugin::resolve`] when the
    /// subscription table is built.
    pub fn on_named(mut self, channel: impl Into<String>, name: &'static str) -> Self {
        self.entries.push((channel.into(), HandlerRef::Named(name)));
        self
    }

    /// The declared entries, in declaration order.
    pub fn entries(&self) -> &[(String, HandlerRef)] {
        &self.entries
    }
}

/// What [`Plugin::subscribed_events`] returns.
///
/// Well-behaved plugins return [`Subscriptions::Map`]. The `Other` variant
/// carries whatever a misbehaving declaration produced, so that dynamic
/// integration layers keep the validator's misdeclaration rule observable.
#[derive(Clone, Debug)]
pub enum Subscriptions {
    /// A proper channel-to-handler mapping.
    Map(SubscriptionMap),
    /// Anything that is not a mapping. Rejected at validation time.
    Other(serde_json::Value),
}

impl From<SubscriptionMap> for Subscriptions {
    fn from(map: SubscriptionMap) -> Self {
        Subscriptions::Map(map)
    }
}

/// Violations of the plugin subscription contract.
///
/// These are fatal at setup time, reported before any connection is
/// engaged. The messages identify the plugin and, where relevant, the
/// offending event key.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PluginError {
    /// The declaration was not a mapping at all.
    #[error(
        "Plugin of class {plugin} has getSubscribedEvents() implementation \
         that does not return an array"
    )]
    NotAMap {
        /// The plugin's class name.
        plugin: String,
    },

    /// An entry had a blank event name or a handler that could not be
    /// resolved into a callback.
    #[error(
        "Plugin of class {plugin} returns non-string event name or invalid \
         callback for event \"{event}\""
    )]
    InvalidEntry {
        /// The plugin's class name.
        plugin: String,
        /// The offending event key.
        event: String,
    },
}

/// The capability a plugin can implement to declare its subscribed events.
///
/// Every plugin, global or connection-scoped, goes through subscription
/// validation before the bot engages any connection.
pub trait Plugin: Send + Sync {
    /// The plugin's class name, used in validation error messages.
    fn name(&self) -> &str;

    /// Declares the channels this plugin subscribes to.
    fn subscribed_events(&self) -> Subscriptions;

    /// Resolves a named handler declared via [`SubscriptionMap::on_named`].
    ///
    /// Returning `None` for a declared name is a contract violation and
    /// fails validation.
    fn resolve(&self, name: &str) -> Option<EventHandler> {
        let _ = name;
        None
    }

    /// The optional dependency-injection capability.
    ///
    /// Plugins that want the client's event-emission handle and logger
    /// return `Some(self)` here; the dispatcher checks once at setup.
    fn as_dispatch_aware(&self) -> Option<&dyn DispatchAware> {
        None
    }
}

/// Optional capability: accept injected dispatch dependencies.
///
/// The dispatcher injects the event-emission handle first, then the
/// logger, once per setup.
pub trait DispatchAware: Send + Sync {
    /// Receives the client's event-emission handle.
    fn set_emitter(&self, emitter: EmitHandle);

    /// Receives the runtime logger.
    fn set_logger(&self, logger: Arc<dyn Logger>);
}

/// Storage for injected dispatch dependencies.
///
/// Plugin implementors embed this and delegate their [`DispatchAware`]
/// methods to it, instead of each carrying their own lock pair:
///
/// ```rust,ignore
/// struct MyPlugin {
///     handles: DispatchHandles,
/// }
///
/// impl DispatchAware for MyPlugin {
///     fn set_emitter(&self, emitter: EmitHandle) {
///         self.handles.set_emitter(emitter);
///     }
///     fn set_logger(&self, logger: Arc<dyn Logger>) {
///         self.handles.set_logger(logger);
///     }
/// }
/// ```
#[derive(Default)]
pub struct DispatchHandles {
    emitter: RwLock<Option<EmitHandle>>,
    logger: RwLock<Option<Arc<dyn Logger>>>,
}

impl DispatchHandles {
    /// Creates empty storage.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores the event-emission handle.
    pub fn set_emitter(&self, emitter: EmitHandle) {
        *self.emitter.write() = Some(emitter);
    }

    /// Stores the logger.
    pub fn set_logger(&self, logger: Arc<dyn Logger>) {
        *self.logger.write() = Some(logger);
    }

    /// The injected event-emission handle, if setup has run.
    pub fn emitter(&self) -> Option<EmitHandle> {
        self.emitter.read().clone()
    }

    /// The injected logger, if setup has run.
    pub fn logger(&self) -> Option<Arc<dyn Logger>> {
        self.logger.read().clone()
    }
}

/// Derives a plugin's subscription table, validating the declaration.
///
/// Called once per plugin at setup time. Named handlers are resolved here;
/// the returned entries hold only first-class callbacks, in declaration
/// order. Fails fast on the first violation.
pub fn resolve_subscriptions(
    plugin: &dyn Plugin,
) -> Result<Vec<(String, EventHandler)>, PluginError> {
    let map = match plugin.subscribed_events() {
        Subscriptions::Map(map) => map,
        Subscriptions::Other(_) => {
            return Err(PluginError::NotAMap {
                plugin: plugin.name().to_string(),
            });
        }
    };

    let mut resolved = Vec::with_capacity(map.entries().len());
    for (channel, handler) in map.entries() {
        if channel.trim().is_empty() {
            return Err(PluginError::InvalidEntry {
                plugin: plugin.name().to_string(),
                event: channel.clone(),
            });
        }
        let callback = match handler {
            HandlerRef::Callback(callback) => callback.clone(),
            HandlerRef::Named(name) => {
                plugin
                    .resolve(name)
                    .ok_or_else(|| PluginError::InvalidEntry {
                        plugin: plugin.name().to_string(),
                        event: channel.clone(),
                    })?
            }
        };
        resolved.push((channel.clone(), callback));
    }
    Ok(resolved)
}
