//! The subscription bus: an explicit publish/subscribe registry keyed by
//! channel name.
//!
//! The dispatcher owns one bus for the global plugin set and one per
//! connection. Buses are built during setup and read-only afterwards, so
//! emission takes no locks. Within a channel, handlers fire in
//! registration order; emitting on a channel nobody subscribed to is a
//! no-op, not an error.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::trace;

use crate::client::WriteHandle;
use crate::event::Event;
use crate::plugin::EventHandler;

/// An ordered handler registry keyed by channel name.
#[derive(Clone, Default)]
pub struct EventBus {
    channels: HashMap<String, Vec<EventHandler>>,
}

impl EventBus {
    /// Creates an empty bus.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `handler` on `channel`, after any handlers already there.
    pub fn subscribe(&mut self, channel: impl Into<String>, handler: EventHandler) {
        self.channels.entry(channel.into()).or_default().push(handler);
    }

    /// Invokes every handler registered for `channel`, in registration
    /// order. Returns the number of handlers invoked.
    pub fn emit(
        &self,
        channel: &str,
        event: &Event,
        write: Option<&Arc<dyn WriteHandle>>,
    ) -> usize {
        let Some(handlers) = self.channels.get(channel) else {
            return 0;
        };
        trace!(channel, handlers = handlers.len(), "firing channel");
        for handler in handlers {
            handler(event, write);
        }
        handlers.len()
    }

    /// The number of handlers registered for `channel`.
    pub fn handler_count(&self, channel: &str) -> usize {
        self.channels.get(channel).map_or(0, Vec::len)
    }

    /// The number of distinct channels with at least one handler.
    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// Whether no handler is registered at all.
    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("channels", &self.channels.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    fn recording_handler(log: Arc<Mutex<Vec<&'static str>>>, tag: &'static str) -> EventHandler {
        Arc::new(move |_, _| log.lock().push(tag))
    }

    #[test]
    fn handlers_fire_in_registration_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut bus = EventBus::new();
        bus.subscribe("received.privmsg", recording_handler(Arc::clone(&log), "first"));
        bus.subscribe("received.privmsg", recording_handler(Arc::clone(&log), "second"));

        let fired = bus.emit("received.privmsg", &Event::user("PRIVMSG"), None);
        assert_eq!(fired, 2);
        assert_eq!(*log.lock(), ["first", "second"]);
    }

    #[test]
    fn unknown_channel_is_a_no_op() {
        let bus = EventBus::new();
        assert_eq!(bus.emit("received.part", &Event::user("PART"), None), 0);
    }

    #[test]
    fn counts_reflect_registrations() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut bus = EventBus::new();
        bus.subscribe("received.all", recording_handler(Arc::clone(&log), "a"));
        bus.subscribe("received.join", recording_handler(Arc::clone(&log), "b"));
        bus.subscribe("received.join", recording_handler(log, "c"));

        assert_eq!(bus.channel_count(), 2);
        assert_eq!(bus.handler_count("received.join"), 2);
        assert_eq!(bus.handler_count("received.quit"), 0);
    }
}
