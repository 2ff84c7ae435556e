//! Listener bookkeeping shared by the provider adapters.

use std::sync::Mutex;

use crate::observability::metrics;
use crate::provider::types::{same_handler, EventHandler, ProviderEvent, ProviderEventKind};

/// Per-provider registry of event handlers.
#[derive(Default)]
pub struct EventEmitter {
    handlers: Mutex<Vec<(ProviderEventKind, EventHandler)>>,
}

impl EventEmitter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on(&self, event: ProviderEventKind, handler: EventHandler) {
        self.lock().push((event, handler));
    }

    /// Remove the first registration of `handler` for `event`.
    pub fn remove(&self, event: ProviderEventKind, handler: &EventHandler) -> bool {
        let mut handlers = self.lock();
        match handlers
            .iter()
            .position(|(kind, h)| *kind == event && same_handler(h, handler))
        {
            Some(idx) => {
                handlers.remove(idx);
                true
            }
            None => false,
        }
    }

    /// Invoke every handler registered for the event's kind.
    ///
    /// Handlers run after the internal lock is released, so they may
    /// register or remove listeners themselves.
    pub fn emit(&self, event: &ProviderEvent) -> usize {
        let kind = event.kind();
        let targets: Vec<EventHandler> = self
            .lock()
            .iter()
            .filter(|(k, _)| *k == kind)
            .map(|(_, h)| h.clone())
            .collect();

        metrics::record_provider_event(kind.as_str());
        tracing::debug!(event = %kind, listeners = targets.len(), "Dispatching provider event");

        for handler in &targets {
            handler(event);
        }
        targets.len()
    }

    pub fn listener_count(&self, event: ProviderEventKind) -> usize {
        self.lock().iter().filter(|(k, _)| *k == event).count()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<(ProviderEventKind, EventHandler)>> {
        // A panicking handler never runs under this lock, so poisoning is benign.
        self.handlers.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl std::fmt::Debug for EventEmitter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventEmitter")
            .field("accounts_changed", &self.listener_count(ProviderEventKind::AccountsChanged))
            .field("chain_changed", &self.listener_count(ProviderEventKind::ChainChanged))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_emit_routes_by_kind() {
        let emitter = EventEmitter::new();
        let hits = Arc::new(AtomicUsize::new(0));
        let h = hits.clone();
        emitter.on(
            ProviderEventKind::AccountsChanged,
            Arc::new(move |_: &ProviderEvent| {
                h.fetch_add(1, Ordering::SeqCst);
            }),
        );

        assert_eq!(emitter.emit(&ProviderEvent::ChainChanged("0x1".into())), 0);
        assert_eq!(emitter.emit(&ProviderEvent::AccountsChanged(vec![])), 1);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_remove_requires_same_reference() {
        let emitter = EventEmitter::new();
        let handler: EventHandler = Arc::new(|_: &ProviderEvent| {});
        emitter.on(ProviderEventKind::ChainChanged, handler.clone());

        let fresh: EventHandler = Arc::new(|_: &ProviderEvent| {});
        assert!(!emitter.remove(ProviderEventKind::ChainChanged, &fresh));
        assert!(!emitter.remove(ProviderEventKind::AccountsChanged, &handler));
        assert_eq!(emitter.listener_count(ProviderEventKind::ChainChanged), 1);

        assert!(emitter.remove(ProviderEventKind::ChainChanged, &handler));
        assert_eq!(emitter.listener_count(ProviderEventKind::ChainChanged), 0);
    }
}
