//! In-process "balances may have changed" signal
//!
//! Features publish after their own transactions confirm; every other
//! subscriber runs its handler once per publish. No queueing, no ordering.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

/// Who published a refresh
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshSignal {
    pub source: String,
}

type Handler = Arc<dyn Fn(&RefreshSignal) + Send + Sync>;

struct Subscriber {
    source: String,
    handler: Handler,
}

#[derive(Default)]
struct BusInner {
    next_id: AtomicU64,
    subscribers: Mutex<HashMap<u64, Subscriber>>,
}

#[derive(Clone, Default)]
pub struct RefreshBus {
    inner: Arc<BusInner>,
}

impl RefreshBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` for signals from any source other than `own_source`
    pub fn subscribe<F>(&self, own_source: impl Into<String>, handler: F) -> Subscription
    where
        F: Fn(&RefreshSignal) + Send + Sync + 'static,
    {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        if let Ok(mut subs) = self.inner.subscribers.lock() {
            subs.insert(
                id,
                Subscriber {
                    source: own_source.into(),
                    handler: Arc::new(handler),
                },
            );
        }
        Subscription {
            id,
            bus: Arc::downgrade(&self.inner),
        }
    }

    /// Notify every subscriber except those registered under `source`
    pub fn publish(&self, source: &str) {
        let signal = RefreshSignal {
            source: source.to_string(),
        };

        // Handlers run outside the lock so they may subscribe or unsubscribe
        let handlers: Vec<Handler> = match self.inner.subscribers.lock() {
            Ok(subs) => subs
                .values()
                .filter(|s| s.source != source)
                .map(|s| s.handler.clone())
                .collect(),
            Err(_) => return,
        };

        tracing::debug!("Refresh from '{}' -> {} subscriber(s)", source, handlers.len());
        for handler in handlers {
            handler(&signal);
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.subscribers.lock().map(|s| s.len()).unwrap_or(0)
    }
}

/// Handle returned by `subscribe`; dropping it unsubscribes
pub struct Subscription {
    id: u64,
    bus: std::sync::Weak<BusInner>,
}

impl Subscription {
    pub fn unsubscribe(self) {}
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(inner) = self.bus.upgrade() {
            if let Ok(mut subs) = inner.subscribers.lock() {
                subs.remove(&self.id);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    fn counter() -> (Arc<AtomicUsize>, impl Fn(&RefreshSignal) + Send + Sync + 'static) {
        let count = Arc::new(AtomicUsize::new(0));
        let c = count.clone();
        (count, move |_: &RefreshSignal| {
            c.fetch_add(1, Ordering::SeqCst);
        })
    }

    #[test]
    fn test_publisher_skips_itself() {
        let bus = RefreshBus::new();
        let (swap_count, swap_handler) = counter();
        let (pool_count, pool_handler) = counter();
        let _swap = bus.subscribe("swap", swap_handler);
        let _pool = bus.subscribe("liquidity", pool_handler);

        bus.publish("swap");

        assert_eq!(swap_count.load(Ordering::SeqCst), 0);
        assert_eq!(pool_count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_each_publish_fires_once() {
        let bus = RefreshBus::new();
        let (count, handler) = counter();
        let _sub = bus.subscribe("balances", handler);

        bus.publish("swap");
        bus.publish("liquidity");

        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_unsubscribe_and_drop() {
        let bus = RefreshBus::new();
        let (count, handler) = counter();
        let sub = bus.subscribe("balances", handler);
        assert_eq!(bus.subscriber_count(), 1);

        sub.unsubscribe();
        bus.publish("swap");

        assert_eq!(count.load(Ordering::SeqCst), 0);
        assert_eq!(bus.subscriber_count(), 0);

        {
            let (_, h) = counter();
            let _scoped = bus.subscribe("x", h);
            assert_eq!(bus.subscriber_count(), 1);
        }
        assert_eq!(bus.subscriber_count(), 0);
    }
}
