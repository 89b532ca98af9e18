//! The event dispatcher.
//!
//! The [`Dispatcher`] is the runtime heart of the framework. Built from a
//! validated [`DispatchTopology`], it owns one [`EventBus`] for the global
//! plugin set and one per connection, attaches listeners to the client's
//! two generic channels, and fans every classified event out to the
//! matching handlers.
//!
//! # Fan-out order
//!
//! For every event, handlers fire in this fixed order:
//!
//! 1. global catch-all (`<direction>.all`)
//! 2. global subtype (`<direction>.<subtype>`)
//! 3. catch-all scoped to the event's connection
//! 4. subtype scoped to the event's connection
//!
//! Scoping is resolved per dispatch from the event's connection
//! back-reference: a handler registered against connection A never fires
//! for an event that occurred on connection B. Channels nobody subscribed
//! to are skipped silently.
//!
//! Dispatch is synchronous and runs to completion; a handler that panics
//! is not caught here. Recovery policy belongs to the client's event loop.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{Level, debug, span};

use crate::bus::EventBus;
use crate::client::{Client, EmitHandle, Logger, WriteHandle};
use crate::connection::{Connection, ConnectionId};
use crate::event::Direction;
use crate::message::{Converter, RawMessage};
use crate::plugin::{EventHandler, Plugin, PluginError, resolve_subscriptions};

/// A plugin together with its subscription table, derived once at setup.
pub struct PluginEntry {
    plugin: Arc<dyn Plugin>,
    subscriptions: Vec<(String, EventHandler)>,
}

impl PluginEntry {
    /// Derives the subscription table for `plugin`, validating its
    /// declaration.
    pub fn resolve(plugin: Arc<dyn Plugin>) -> Result<Self, PluginError> {
        let subscriptions = resolve_subscriptions(plugin.as_ref())?;
        Ok(Self {
            plugin,
            subscriptions,
        })
    }

    /// The plugin itself.
    pub fn plugin(&self) -> &Arc<dyn Plugin> {
        &self.plugin
    }

    /// The resolved `(channel, handler)` entries, in declaration order.
    pub fn subscriptions(&self) -> &[(String, EventHandler)] {
        &self.subscriptions
    }
}

impl std::fmt::Debug for PluginEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginEntry")
            .field("plugin", &self.plugin.name())
            .field("subscriptions", &self.subscriptions.len())
            .finish()
    }
}

/// A connection together with its resolved connection-scoped plugins.
#[derive(Debug)]
pub struct ConnectionEntry {
    connection: Arc<Connection>,
    plugins: Vec<PluginEntry>,
}

impl ConnectionEntry {
    /// Derives subscription tables for all of `connection`'s own plugins,
    /// in declaration order, failing on the first violation.
    pub fn resolve(connection: Arc<Connection>) -> Result<Self, PluginError> {
        let plugins = connection
            .connection_plugins()
            .iter()
            .map(|plugin| PluginEntry::resolve(Arc::clone(plugin)))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            connection,
            plugins,
        })
    }

    /// The connection itself.
    pub fn connection(&self) -> &Arc<Connection> {
        &self.connection
    }

    /// The connection's plugin entries.
    pub fn plugins(&self) -> &[PluginEntry] {
        &self.plugins
    }
}

/// The validated runtime topology: global plugins plus the configured
/// connections with their own plugin sets.
///
/// Produced by configuration validation; consumed by [`Dispatcher::new`].
#[derive(Debug, Default)]
pub struct DispatchTopology {
    global: Vec<PluginEntry>,
    connections: Vec<ConnectionEntry>,
}

impl DispatchTopology {
    /// Assembles a topology from already-resolved entries.
    pub fn new(global: Vec<PluginEntry>, connections: Vec<ConnectionEntry>) -> Self {
        Self {
            global,
            connections,
        }
    }

    /// The global plugin entries.
    pub fn global(&self) -> &[PluginEntry] {
        &self.global
    }

    /// The connection entries, in configuration order.
    pub fn connections(&self) -> &[ConnectionEntry] {
        &self.connections
    }

    /// The configured connections, in configuration order.
    pub fn connection_list(&self) -> Vec<Arc<Connection>> {
        self.connections
            .iter()
            .map(|entry| Arc::clone(&entry.connection))
            .collect()
    }

    /// Every plugin in the topology: global plugins first, then each
    /// connection's plugins in configuration order.
    pub fn plugins(&self) -> impl Iterator<Item = &Arc<dyn Plugin>> {
        self.global
            .iter()
            .map(PluginEntry::plugin)
            .chain(
                self.connections
                    .iter()
                    .flat_map(|entry| entry.plugins.iter().map(PluginEntry::plugin)),
            )
    }
}

/// The built dispatch tables: read-only after setup.
struct DispatchTables {
    global: EventBus,
    scoped: HashMap<ConnectionId, EventBus>,
}

/// The central event dispatcher.
///
/// Construction injects dependencies into dispatch-aware plugins and
/// builds the buses from scratch, so constructing twice from the same
/// topology yields an identical subscription layout with no duplicate
/// registrations.
pub struct Dispatcher {
    converter: Arc<dyn Converter>,
    tables: Arc<DispatchTables>,
}

impl Dispatcher {
    /// Builds the dispatch tables from a validated topology.
    ///
    /// Every plugin that implements the dispatch-aware capability receives
    /// `emitter` first and `logger` second, exactly once. Global plugins
    /// are processed before connection-scoped ones.
    pub fn new(
        converter: Arc<dyn Converter>,
        topology: &DispatchTopology,
        emitter: EmitHandle,
        logger: Arc<dyn Logger>,
    ) -> Self {
        for plugin in topology.plugins() {
            if let Some(aware) = plugin.as_dispatch_aware() {
                aware.set_emitter(Arc::clone(&emitter));
                aware.set_logger(Arc::clone(&logger));
                debug!(plugin = plugin.name(), "injected dispatch dependencies");
            }
        }

        let mut global = EventBus::new();
        for entry in topology.global() {
            for (channel, handler) in entry.subscriptions() {
                global.subscribe(channel.clone(), handler.clone());
            }
        }

        let mut scoped = HashMap::new();
        for conn_entry in topology.connections() {
            if conn_entry.plugins().is_empty() {
                continue;
            }
            let bus: &mut EventBus = scoped
                .entry(conn_entry.connection().id())
                .or_insert_with(EventBus::new);
            for entry in conn_entry.plugins() {
                for (channel, handler) in entry.subscriptions() {
                    bus.subscribe(channel.clone(), handler.clone());
                }
            }
        }

        debug!(
            global_channels = global.channel_count(),
            scoped_connections = scoped.len(),
            "dispatch tables built"
        );

        Self {
            converter,
            tables: Arc::new(DispatchTables { global, scoped }),
        }
    }

    /// Installs the two dispatch listeners on the client's generic
    /// channels.
    pub fn attach(&self, client: &dyn Client) {
        let tables = Arc::clone(&self.tables);
        let converter = Arc::clone(&self.converter);
        client.on_received(Arc::new(move |message, write, connection| {
            route(
                &tables,
                converter.as_ref(),
                Direction::Received,
                message,
                Some(write),
                connection,
            );
        }));

        let tables = Arc::clone(&self.tables);
        let converter = Arc::clone(&self.converter);
        client.on_sent(Arc::new(move |message, connection| {
            route(
                &tables,
                converter.as_ref(),
                Direction::Sent,
                message,
                None,
                connection,
            );
        }));
    }

    /// Runs one dispatch pass for a structured message.
    ///
    /// This is the same path the attached listeners take; exposed so
    /// externally-driven harnesses can feed messages directly.
    pub fn dispatch(
        &self,
        direction: Direction,
        message: &RawMessage,
        write: Option<&Arc<dyn WriteHandle>>,
        connection: &Arc<Connection>,
    ) {
        route(
            &self.tables,
            self.converter.as_ref(),
            direction,
            message,
            write,
            connection,
        );
    }

    /// The number of global handlers registered for `channel`.
    pub fn handler_count(&self, channel: &str) -> usize {
        self.tables.global.handler_count(channel)
    }

    /// The number of handlers registered for `channel` scoped to the given
    /// connection.
    pub fn connection_handler_count(&self, id: ConnectionId, channel: &str) -> usize {
        self.tables
            .scoped
            .get(&id)
            .map_or(0, |bus| bus.handler_count(channel))
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("global_channels", &self.tables.global.channel_count())
            .field("scoped_connections", &self.tables.scoped.len())
            .finish()
    }
}

/// One synchronous dispatch pass: convert, attach the connection, classify,
/// fan out in the fixed order.
fn route(
    tables: &DispatchTables,
    converter: &dyn Converter,
    direction: Direction,
    message: &RawMessage,
    write: Option<&Arc<dyn WriteHandle>>,
    connection: &Arc<Connection>,
) {
    let mut event = converter.convert(message);
    event.set_connection(Arc::clone(connection));

    let channel = event.channel(direction);
    let span = span!(Level::DEBUG, "dispatch", channel = %channel, connection = %connection.id());
    let _enter = span.enter();

    let catch_all = direction.catch_all();
    let mut fired = 0;
    fired += tables.global.emit(&catch_all, &event, write);
    fired += tables.global.emit(&channel, &event, write);
    if let Some(bus) = tables.scoped.get(&connection.id()) {
        fired += bus.emit(&catch_all, &event, write);
        fired += bus.emit(&channel, &event, write);
    }

    debug!(fired, "dispatch complete");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::EventEmitter;
    use crate::event::Event;
    use crate::plugin::{DispatchAware, SubscriptionMap, Subscriptions};
    use parking_lot::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CommandConverter;

    impl Converter for CommandConverter {
        fn convert(&self, message: &RawMessage) -> Event {
            Event::user(message.command.clone()).with_params(message.params.clone())
        }
    }

    struct NullEmitter;

    impl EventEmitter for NullEmitter {
        fn emit(&self, _channel: &str, _event: &Event) {}
    }

    struct RecordingPlugin {
        name: &'static str,
        channels: Vec<&'static str>,
        log: Arc<Mutex<Vec<String>>>,
    }

    impl Plugin for RecordingPlugin {
        fn name(&self) -> &str {
            self.name
        }

        fn subscribed_events(&self) -> Subscriptions {
            let mut map = SubscriptionMap::new();
            for channel in &self.channels {
                let log = Arc::clone(&self.log);
                let tag = format!("{}:{}", self.name, channel);
                map = map.on(*channel, move |_, _| log.lock().push(tag.clone()));
            }
            map.into()
        }
    }

    struct AwarePlugin {
        emitter_sets: AtomicUsize,
        logger_sets: AtomicUsize,
        order: Mutex<Vec<&'static str>>,
    }

    impl AwarePlugin {
        fn new() -> Self {
            Self {
                emitter_sets: AtomicUsize::new(0),
                logger_sets: AtomicUsize::new(0),
                order: Mutex::new(Vec::new()),
            }
        }
    }

    impl Plugin for AwarePlugin {
        fn name(&self) -> &str {
            "AwarePlugin"
        }

        fn subscribed_events(&self) -> Subscriptions {
            SubscriptionMap::new().into()
        }

        fn as_dispatch_aware(&self) -> Option<&dyn DispatchAware> {
            Some(self)
        }
    }

    impl DispatchAware for AwarePlugin {
        fn set_emitter(&self, _emitter: EmitHandle) {
            self.emitter_sets.fetch_add(1, Ordering::SeqCst);
            self.order.lock().push("emitter");
        }

        fn set_logger(&self, _logger: Arc<dyn Logger>) {
            self.logger_sets.fetch_add(1, Ordering::SeqCst);
            self.order.lock().push("logger");
        }
    }

    fn build(topology: &DispatchTopology) -> Dispatcher {
        Dispatcher::new(
            Arc::new(CommandConverter),
            topology,
            Arc::new(NullEmitter),
            Arc::new(crate::client::TracingLogger),
        )
    }

    #[test]
    fn fan_out_runs_in_fixed_priority_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let global: Arc<dyn Plugin> = Arc::new(RecordingPlugin {
            name: "global",
            channels: vec!["received.all", "received.privmsg"],
            log: Arc::clone(&log),
        });
        let scoped: Arc<dyn Plugin> = Arc::new(RecordingPlugin {
            name: "scoped",
            channels: vec!["received.all", "received.privmsg"],
            log: Arc::clone(&log),
        });
        let connection = Arc::new(Connection::new("irc.example.net", "ember").plugin(scoped));

        let topology = DispatchTopology::new(
            vec![PluginEntry::resolve(global).unwrap()],
            vec![ConnectionEntry::resolve(Arc::clone(&connection)).unwrap()],
        );
        let dispatcher = build(&topology);

        dispatcher.dispatch(
            Direction::Received,
            &RawMessage::new("PRIVMSG"),
            None,
            &connection,
        );

        assert_eq!(
            *log.lock(),
            [
                "global:received.all",
                "global:received.privmsg",
                "scoped:received.all",
                "scoped:received.privmsg",
            ]
        );
    }

    #[test]
    fn connection_scoped_handlers_never_cross_connections() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let global: Arc<dyn Plugin> = Arc::new(RecordingPlugin {
            name: "global",
            channels: vec!["received.privmsg"],
            log: Arc::clone(&log),
        });
        let first_plugin: Arc<dyn Plugin> = Arc::new(RecordingPlugin {
            name: "one",
            channels: vec!["received.privmsg"],
            log: Arc::clone(&log),
        });
        let second_plugin: Arc<dyn Plugin> = Arc::new(RecordingPlugin {
            name: "two",
            channels: vec!["received.privmsg"],
            log: Arc::clone(&log),
        });
        let first = Arc::new(Connection::new("irc.one.net", "ember").plugin(first_plugin));
        let second = Arc::new(Connection::new("irc.two.net", "ember").plugin(second_plugin));

        let topology = DispatchTopology::new(
            vec![PluginEntry::resolve(global).unwrap()],
            vec![
                ConnectionEntry::resolve(Arc::clone(&first)).unwrap(),
                ConnectionEntry::resolve(Arc::clone(&second)).unwrap(),
            ],
        );
        let dispatcher = build(&topology);
        let message = RawMessage::new("PRIVMSG");

        dispatcher.dispatch(Direction::Received, &message, None, &first);
        assert_eq!(*log.lock(), ["global:received.privmsg", "one:received.privmsg"]);

        log.lock().clear();
        dispatcher.dispatch(Direction::Received, &message, None, &second);
        assert_eq!(*log.lock(), ["global:received.privmsg", "two:received.privmsg"]);
    }

    #[test]
    fn received_events_carry_the_write_handle_and_sent_events_do_not() {
        struct SinkWrite;
        impl WriteHandle for SinkWrite {
            fn write(&self, _line: &str) {}
        }

        let write: Arc<dyn WriteHandle> = Arc::new(SinkWrite);
        let seen = Arc::new(Mutex::new(Vec::new()));

        struct WriteProbe {
            expected: Arc<dyn WriteHandle>,
            seen: Arc<Mutex<Vec<bool>>>,
        }

        impl Plugin for WriteProbe {
            fn name(&self) -> &str {
                "WriteProbe"
            }

            fn subscribed_events(&self) -> Subscriptions {
                let expected = Arc::clone(&self.expected);
                let seen = Arc::clone(&self.seen);
                SubscriptionMap::new()
                    .on("received.privmsg", {
                        let expected = Arc::clone(&expected);
                        let seen = Arc::clone(&seen);
                        move |_, write| {
                            seen.lock()
                                .push(write.is_some_and(|w| Arc::ptr_eq(w, &expected)));
                        }
                    })
                    .on("sent.privmsg", move |_, write| {
                        seen.lock().push(write.is_none());
                    })
                    .into()
            }
        }

        let plugin: Arc<dyn Plugin> = Arc::new(WriteProbe {
            expected: Arc::clone(&write),
            seen: Arc::clone(&seen),
        });
        let connection = Arc::new(Connection::new("irc.example.net", "ember"));
        let topology = DispatchTopology::new(
            vec![PluginEntry::resolve(plugin).unwrap()],
            vec![ConnectionEntry::resolve(Arc::clone(&connection)).unwrap()],
        );
        let dispatcher = build(&topology);
        let message = RawMessage::new("PRIVMSG");

        dispatcher.dispatch(Direction::Received, &message, Some(&write), &connection);
        dispatcher.dispatch(Direction::Sent, &message, None, &connection);

        assert_eq!(*seen.lock(), [true, true]);
    }

    #[test]
    fn events_reach_handlers_with_the_back_reference_set() {
        let seen = Arc::new(Mutex::new(Vec::new()));

        struct BackRefProbe {
            seen: Arc<Mutex<Vec<ConnectionId>>>,
        }

        impl Plugin for BackRefProbe {
            fn name(&self) -> &str {
                "BackRefProbe"
            }

            fn subscribed_events(&self) -> Subscriptions {
                let seen = Arc::clone(&self.seen);
                SubscriptionMap::new()
                    .on("received.all", move |event, _| {
                        seen.lock().push(event.connection().unwrap().id());
                    })
                    .into()
            }
        }

        let plugin: Arc<dyn Plugin> = Arc::new(BackRefProbe {
            seen: Arc::clone(&seen),
        });
        let connection = Arc::new(Connection::new("irc.example.net", "ember"));
        let topology = DispatchTopology::new(
            vec![PluginEntry::resolve(plugin).unwrap()],
            vec![ConnectionEntry::resolve(Arc::clone(&connection)).unwrap()],
        );
        let dispatcher = build(&topology);

        dispatcher.dispatch(
            Direction::Received,
            &RawMessage::new("NOTICE"),
            None,
            &connection,
        );
        assert_eq!(*seen.lock(), [connection.id()]);
    }

    #[test]
    fn rebuilding_from_the_same_topology_is_idempotent() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let global: Arc<dyn Plugin> = Arc::new(RecordingPlugin {
            name: "global",
            channels: vec!["received.all", "received.privmsg"],
            log: Arc::clone(&log),
        });
        let scoped: Arc<dyn Plugin> = Arc::new(RecordingPlugin {
            name: "scoped",
            channels: vec!["received.privmsg"],
            log,
        });
        let connection = Arc::new(Connection::new("irc.example.net", "ember").plugin(scoped));

        let topology = DispatchTopology::new(
            vec![PluginEntry::resolve(global).unwrap()],
            vec![ConnectionEntry::resolve(Arc::clone(&connection)).unwrap()],
        );

        let first = build(&topology);
        let second = build(&topology);

        for channel in ["received.all", "received.privmsg"] {
            assert_eq!(first.handler_count(channel), second.handler_count(channel));
            assert_eq!(
                first.connection_handler_count(connection.id(), channel),
                second.connection_handler_count(connection.id(), channel),
            );
        }
        assert_eq!(second.handler_count("received.privmsg"), 1);
        assert_eq!(
            second.connection_handler_count(connection.id(), "received.privmsg"),
            1
        );
    }

    #[test]
    fn dispatch_aware_plugins_are_injected_once_in_order() {
        let aware = Arc::new(AwarePlugin::new());
        let plugin: Arc<dyn Plugin> = Arc::clone(&aware) as Arc<dyn Plugin>;
        let connection = Arc::new(Connection::new("irc.example.net", "ember"));

        let topology = DispatchTopology::new(
            vec![PluginEntry::resolve(plugin).unwrap()],
            vec![ConnectionEntry::resolve(connection).unwrap()],
        );
        let _dispatcher = build(&topology);

        assert_eq!(aware.emitter_sets.load(Ordering::SeqCst), 1);
        assert_eq!(aware.logger_sets.load(Ordering::SeqCst), 1);
        assert_eq!(*aware.order.lock(), ["emitter", "logger"]);
    }
}
