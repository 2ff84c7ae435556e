//! Provider registry fed by discovery announcements.
//!
//! # Responsibilities
//! - Keep the ordered list of announced providers, unique by uuid
//! - Notify subscribers with the full snapshot after every change
//! - Drain asynchronous announcement streams
//!
//! The registry only listens. It never talks to a provider.

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::discovery::types::ProviderDetail;
use crate::observability::metrics;
use crate::state::{StateCell, Subscription};

/// Something that can replay provider announcements on request
/// (the `eip6963:requestProvider` handshake).
pub trait AnnouncementSource {
    fn announce_all(&self, sink: &mut dyn FnMut(ProviderDetail));
}

/// Live set of announced providers.
#[derive(Clone, Default)]
pub struct ProviderRegistry {
    providers: StateCell<Vec<ProviderDetail>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current providers in announcement order.
    pub fn providers(&self) -> Vec<ProviderDetail> {
        self.providers.get()
    }

    /// Call `listener` with the new snapshot whenever it changes.
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&[ProviderDetail]) + Send + Sync + 'static,
    {
        self.providers
            .subscribe(move |snapshot: &Vec<ProviderDetail>| listener(snapshot))
    }

    /// Record an announcement.
    ///
    /// A new uuid is appended; a known uuid replaces its entry in place.
    pub fn announce(&self, detail: ProviderDetail) {
        tracing::info!(
            uuid = %detail.info.uuid,
            name = %detail.info.name,
            rdns = %detail.info.rdns,
            "Wallet provider announced"
        );
        self.providers.update(|current| {
            let mut next = current.clone();
            match next.iter().position(|d| d.info.uuid == detail.info.uuid) {
                Some(idx) => next[idx] = detail.clone(),
                None => next.push(detail.clone()),
            }
            next
        });
        metrics::record_discovered(self.providers.load().len());
    }

    /// Ask `source` to announce everything it knows.
    pub fn request_providers(&self, source: &dyn AnnouncementSource) {
        source.announce_all(&mut |detail| self.announce(detail));
    }

    /// Drain `announcements` on a background task until the sender closes.
    pub fn listen(&self, mut announcements: mpsc::UnboundedReceiver<ProviderDetail>) -> JoinHandle<()> {
        let registry = self.clone();
        tokio::spawn(async move {
            while let Some(detail) = announcements.recv().await {
                registry.announce(detail);
            }
            tracing::debug!("Announcement stream closed");
        })
    }

    pub fn find_provider(&self, uuid: &str) -> Option<ProviderDetail> {
        self.providers
            .load()
            .iter()
            .find(|d| d.info.uuid == uuid)
            .cloned()
    }

    pub fn find_provider_by_rdns(&self, rdns: &str) -> Option<ProviderDetail> {
        self.providers
            .load()
            .iter()
            .find(|d| d.info.rdns == rdns)
            .cloned()
    }

    /// Look up by uuid, rdns or display name.
    pub fn lookup(&self, needle: &str) -> Option<ProviderDetail> {
        self.providers
            .load()
            .iter()
            .find(|d| d.matches(needle))
            .cloned()
    }

    /// Forget every announcement.
    pub fn clear(&self) {
        self.providers.set(Vec::new());
        metrics::record_discovered(0);
    }

    pub fn len(&self) -> usize {
        self.providers.load().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderRegistry")
            .field("providers", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::discovery::types::ProviderInfo;
    use crate::provider::MemoryProvider;
    use std::sync::{Arc, Mutex};

    fn detail(uuid: &str, name: &str) -> ProviderDetail {
        ProviderDetail::new(
            ProviderInfo {
                uuid: uuid.into(),
                name: name.into(),
                icon: String::new(),
                rdns: format!("test.{}", name.to_lowercase()),
            },
            Arc::new(MemoryProvider::new(vec![], 1)),
        )
    }

    fn names(list: &[ProviderDetail]) -> Vec<String> {
        list.iter().map(|d| d.info.name.clone()).collect()
    }

    #[test]
    fn test_append_and_replace() {
        let registry = ProviderRegistry::new();
        registry.announce(detail("a", "Alpha"));
        registry.announce(detail("b", "Beta"));
        registry.announce(detail("a", "Alpha2"));

        assert_eq!(names(&registry.providers()), vec!["Alpha2", "Beta"]);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_subscribers_get_latest_snapshot() {
        let registry = ProviderRegistry::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let s = seen.clone();
        let _sub = registry.subscribe(move |list: &[ProviderDetail]| {
            s.lock().unwrap().push(names(list));
        });

        registry.announce(detail("a", "Alpha"));
        registry.announce(detail("a", "Alpha"));
        registry.announce(detail("b", "Beta"));

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 3);
        assert_eq!(seen.last().unwrap(), &names(&registry.providers()));
    }

    #[test]
    fn test_lookups_and_clear() {
        let registry = ProviderRegistry::new();
        registry.announce(detail("a", "Alpha"));
        assert!(registry.find_provider("a").is_some());
        assert!(registry.find_provider_by_rdns("test.alpha").is_some());
        assert!(registry.lookup("ALPHA").is_some());
        assert!(registry.lookup("missing").is_none());

        registry.clear();
        assert!(registry.is_empty());
    }

    struct Fixed(Vec<ProviderDetail>);

    impl AnnouncementSource for Fixed {
        fn announce_all(&self, sink: &mut dyn FnMut(ProviderDetail)) {
            for d in &self.0 {
                sink(d.clone());
            }
        }
    }

    #[test]
    fn test_request_providers() {
        let registry = ProviderRegistry::new();
        let source = Fixed(vec![detail("a", "Alpha"), detail("b", "Beta")]);
        registry.request_providers(&source);
        registry.request_providers(&source);
        assert_eq!(names(&registry.providers()), vec!["Alpha", "Beta"]);
    }

    #[tokio::test]
    async fn test_listen_drains_stream() {
        let registry = ProviderRegistry::new();
        let (tx, rx) = mpsc::unbounded_channel();
        let handle = registry.listen(rx);

        tx.send(detail("a", "Alpha")).unwrap();
        tx.send(detail("b", "Beta")).unwrap();
        drop(tx);
        handle.await.unwrap();

        assert_eq!(registry.len(), 2);
    }
}
