//! Subscribable value cell.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, Weak};

use arc_swap::ArcSwap;

type Callback<T> = Arc<dyn Fn(&T) + Send + Sync>;

struct Shared<T> {
    value: ArcSwap<T>,
    subscribers: Mutex<Vec<(u64, Callback<T>)>>,
    next_id: AtomicU64,
}

impl<T> Shared<T> {
    fn subscribers(&self) -> std::sync::MutexGuard<'_, Vec<(u64, Callback<T>)>> {
        self.subscribers.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn unsubscribe(&self, id: u64) {
        self.subscribers().retain(|(sub_id, _)| *sub_id != id);
    }
}

/// A value with change notification.
///
/// Clones share the same value. Subscribers are called synchronously on the
/// task that performed the write, after the value is published and with no
/// internal lock held. A subscriber must not write the cell it is notified
/// about.
pub struct StateCell<T> {
    shared: Arc<Shared<T>>,
}

impl<T> Clone for StateCell<T> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<T: Send + Sync + 'static> StateCell<T> {
    pub fn new(initial: T) -> Self {
        Self {
            shared: Arc::new(Shared {
                value: ArcSwap::from_pointee(initial),
                subscribers: Mutex::new(Vec::new()),
                next_id: AtomicU64::new(0),
            }),
        }
    }

    /// Shared snapshot of the current value.
    pub fn load(&self) -> Arc<T> {
        self.shared.value.load_full()
    }

    /// Owned copy of the current value.
    pub fn get(&self) -> T
    where
        T: Clone,
    {
        T::clone(&self.shared.value.load())
    }

    /// Replace the value and notify subscribers.
    pub fn set(&self, value: T) {
        let next = Arc::new(value);
        self.shared.value.store(Arc::clone(&next));
        self.notify(&next);
    }

    /// Replace the value with `f(previous)` atomically, then notify.
    ///
    /// `f` may run more than once if another writer races this one.
    pub fn update<F>(&self, f: F)
    where
        F: Fn(&T) -> T,
    {
        let mut next = None;
        self.shared.value.rcu(|prev| {
            let computed = Arc::new(f(&**prev));
            next = Some(Arc::clone(&computed));
            computed
        });
        if let Some(next) = next {
            self.notify(&next);
        }
    }

    /// Call `f` with every new value until the subscription is dropped.
    pub fn subscribe<F>(&self, f: F) -> Subscription
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        let id = self.shared.next_id.fetch_add(1, Ordering::Relaxed);
        self.shared.subscribers().push((id, Arc::new(f)));

        let weak: Weak<Shared<T>> = Arc::downgrade(&self.shared);
        Subscription {
            cancel: Some(Box::new(move || {
                if let Some(shared) = weak.upgrade() {
                    shared.unsubscribe(id);
                }
            })),
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.shared.subscribers().len()
    }

    fn notify(&self, value: &T) {
        let targets: Vec<Callback<T>> = self
            .shared
            .subscribers()
            .iter()
            .map(|(_, cb)| Arc::clone(cb))
            .collect();
        for cb in targets {
            cb(value);
        }
    }
}

impl<T: Default + Send + Sync + 'static> Default for StateCell<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: std::fmt::Debug + Send + Sync + 'static> std::fmt::Debug for StateCell<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StateCell")
            .field("value", &self.load())
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}

/// Handle returned by `subscribe`; dropping it unsubscribes.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce() + Send + Sync>>,
}

impl Subscription {
    /// Stop receiving notifications.
    pub fn unsubscribe(mut self) {
        self.cancel_now();
    }

    fn cancel_now(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.cancel_now();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.cancel.is_some())
            .finish()
    }
}
