mod bus;
mod events;

pub use bus::EventBus;
pub use events::ExportEvent;

/// Receives export events, on whichever thread emitted them
pub trait EventHandler: Send {
    fn handle_event(&mut self, event: &ExportEvent);
}

impl<F> EventHandler for F
where
    F: FnMut(&ExportEvent) + Send,
{
    fn handle_event(&mut self, event: &ExportEvent) {
        self(event)
    }
}
