//! Scoped listener registration.

use std::sync::Arc;

use crate::provider::eip1193::Eip1193Provider;
use crate::provider::types::{EventHandler, ProviderEventKind};

/// Handlers attached to one provider, detached exactly once.
///
/// Detaching happens on [`ListenerGuard::dispose`] or on drop, whichever
/// comes first. The guard keeps the original `Arc`s so removal hits the
/// registrations that were actually made.
pub struct ListenerGuard {
    provider: Arc<dyn Eip1193Provider>,
    handlers: Vec<(ProviderEventKind, EventHandler)>,
}

impl ListenerGuard {
    /// Register every handler on `provider`.
    pub fn attach(
        provider: Arc<dyn Eip1193Provider>,
        handlers: Vec<(ProviderEventKind, EventHandler)>,
    ) -> Self {
        for (event, handler) in &handlers {
            provider.on(*event, handler.clone());
        }
        tracing::debug!(listeners = handlers.len(), "Provider listeners attached");
        Self { provider, handlers }
    }

    /// Whether these listeners live on `provider`.
    pub fn is_attached_to(&self, provider: &Arc<dyn Eip1193Provider>) -> bool {
        std::ptr::eq(
            Arc::as_ptr(&self.provider) as *const (),
            Arc::as_ptr(provider) as *const (),
        )
    }

    /// Handler registered for `event`, if any.
    pub fn handler(&self, event: ProviderEventKind) -> Option<&EventHandler> {
        self.handlers
            .iter()
            .find(|(kind, _)| *kind == event)
            .map(|(_, h)| h)
    }

    /// Detach now. Returns how many registrations the provider removed.
    pub fn dispose(mut self) -> usize {
        self.detach()
    }

    fn detach(&mut self) -> usize {
        let handlers = std::mem::take(&mut self.handlers);
        if handlers.is_empty() {
            return 0;
        }
        if !self.provider.supports_listener_removal() {
            tracing::debug!("Provider cannot remove listeners, leaving them registered");
            return 0;
        }

        let removed = handlers
            .iter()
            .filter(|(event, handler)| self.provider.remove_listener(*event, handler))
            .count();
        if removed < handlers.len() {
            tracing::warn!(
                removed = removed,
                expected = handlers.len(),
                "Provider did not recognise every listener on removal"
            );
        } else {
            tracing::debug!(removed = removed, "Provider listeners detached");
        }
        removed
    }
}

impl Drop for ListenerGuard {
    fn drop(&mut self) {
        self.detach();
    }
}

impl std::fmt::Debug for ListenerGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListenerGuard")
            .field("events", &self.handlers.iter().map(|(k, _)| k.as_str()).collect::<Vec<_>>())
            .finish()
    }
}
