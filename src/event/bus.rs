use parking_lot::Mutex;

use crate::event::{EventHandler, ExportEvent};

/// A simple event bus for broadcasting export events to registered handlers.
///
/// Events are emitted from export worker threads, so handlers are kept
/// behind a mutex and run while it is held. Handlers must not emit.
pub struct EventBus {
    handlers: Mutex<Vec<Box<dyn EventHandler>>>,
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("handlers", &format!("<{} handlers>", self.handlers.lock().len()))
            .finish()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBus {
    /// Creates a new event bus
    pub fn new() -> Self {
        Self {
            handlers: Mutex::new(Vec::new()),
        }
    }

    /// Subscribe a handler to receive events
    pub fn subscribe(&self, handler: impl EventHandler + 'static) {
        self.handlers.lock().push(Box::new(handler));
    }

    /// Emit an event to all registered handlers
    pub fn emit(&self, event: ExportEvent) {
        for handler in self.handlers.lock().iter_mut() {
            handler.handle_event(&event);
        }
    }
}
