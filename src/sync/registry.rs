//! Subscriber registry and event dispatcher.
//!
//! Subscriptions are keyed by an opaque monotonic handle, so unsubscribe
//! is a keyed removal rather than a scan by callback identity. Dispatch
//! snapshots the current subscriber set and then iterates outside the
//! lock, so a handler may subscribe or unsubscribe mid-dispatch without
//! deadlocking or corrupting iteration.
//!
//! Delivery guarantees:
//! - every handler registered before `dispatch` starts receives the
//!   event, in ascending handle order (join order)
//! - a handler joining mid-dispatch does not see the in-flight event,
//!   but sees everything dispatched after `subscribe` returns
//! - one failing handler never blocks delivery to the rest

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use crate::domain::PushEvent;
use crate::ports::EventHandler;

/// Opaque handle identifying one subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubscriptionId(u64);

impl std::fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "sub-{}", self.0)
    }
}

/// Mapping from subscription handle to callback, shared by all consumers.
pub struct SubscriberRegistry {
    handlers: RwLock<BTreeMap<SubscriptionId, Arc<dyn EventHandler>>>,
    next_id: AtomicU64,
}

impl SubscriberRegistry {
    pub fn new() -> Self {
        Self {
            handlers: RwLock::new(BTreeMap::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Register a handler and return the handle that later removes it.
    ///
    /// The handler receives every event dispatched after this call
    /// returns, until `unsubscribe` returns.
    pub fn subscribe(&self, handler: Arc<dyn EventHandler>) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.handlers
            .write()
            .expect("SubscriberRegistry: handlers lock poisoned")
            .insert(id, handler);
        tracing::debug!(subscription = %id, "subscriber registered");
        id
    }

    /// Remove a subscription. Returns `false` if the handle was already gone.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let removed = self
            .handlers
            .write()
            .expect("SubscriberRegistry: handlers lock poisoned")
            .remove(&id)
            .is_some();
        if removed {
            tracing::debug!(subscription = %id, "subscriber removed");
        }
        removed
    }

    /// Number of currently registered subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.handlers
            .read()
            .expect("SubscriberRegistry: handlers lock poisoned")
            .len()
    }

    /// Fan one event out to every currently registered handler.
    ///
    /// Handlers run sequentially in join order, synchronously relative to
    /// event arrival. A handler error is logged and delivery continues.
    pub async fn dispatch(&self, event: PushEvent) {
        // Snapshot then iterate: the lock is released before any handler
        // runs, so handlers are free to mutate the registry.
        let snapshot: Vec<(SubscriptionId, Arc<dyn EventHandler>)> = {
            let handlers = self
                .handlers
                .read()
                .expect("SubscriberRegistry: handlers lock poisoned");
            handlers
                .iter()
                .map(|(id, handler)| (*id, Arc::clone(handler)))
                .collect()
        };

        for (id, handler) in snapshot {
            if let Err(err) = handler.handle(event.clone()).await {
                tracing::warn!(
                    handler = handler.name(),
                    subscription = %id,
                    error = %err,
                    "subscriber failed to process event"
                );
            }
        }
    }
}

impl Default for SubscriberRegistry {
    fn default() -> Self {
        Self::new()
    }
}
