//! Items view: cached item list plus the low-stock alert queue.
//!
//! Reconciliation policy per event kind:
//!
//! - `item_created` / `item_updated` - invalidate-and-refetch. The event
//!   doesn't say which fields changed, so a full `list_items` is the
//!   only way to make the cache match server truth.
//! - `item_deleted` - local patch: drop the entry whose id matches the
//!   payload; zero network calls.
//! - `low_stock_alert` - append to the alert queue.
//!
//! Refetches are spawned, not awaited, so dispatch is never blocked on
//! network I/O. Overlapping refetches both complete and the cache keeps
//! whichever response lands last; completion order, not event order,
//! wins. Callers that need a stable snapshot await [`ItemsView::settled`].

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use once_cell::sync::OnceCell;
use tokio::sync::Notify;

use crate::domain::{Alert, EventKind, Item, PushEvent};
use crate::error::SyncError;
use crate::ports::{EventHandler, InventoryApi};
use crate::sync::{AlertAccumulator, SubscriberRegistry, SubscriptionId};

/// Cached items list kept in sync with the push channel.
///
/// Cheap to clone; all clones share one cache.
#[derive(Clone)]
pub struct ItemsView {
    inner: Arc<ViewState>,
}

struct ViewState {
    api: Arc<dyn InventoryApi>,
    items: RwLock<Vec<Item>>,
    alerts: AlertAccumulator,
    last_error: RwLock<Option<String>>,
    subscription: OnceCell<SubscriptionId>,
    pending_refetches: AtomicUsize,
    settled: Notify,
}

impl ItemsView {
    pub fn new(api: Arc<dyn InventoryApi>) -> Self {
        Self {
            inner: Arc::new(ViewState {
                api,
                items: RwLock::new(Vec::new()),
                alerts: AlertAccumulator::new(),
                last_error: RwLock::new(None),
                subscription: OnceCell::new(),
                pending_refetches: AtomicUsize::new(0),
                settled: Notify::new(),
            }),
        }
    }

    /// Subscribe this view to the registry.
    ///
    /// The first call registers; later calls are no-ops. The subscription
    /// is held for the lifetime of the view.
    pub fn register(&self, registry: &SubscriberRegistry) {
        self.inner
            .subscription
            .get_or_init(|| registry.subscribe(Arc::new(self.clone())));
    }

    /// Drop this view's subscription, if it has one.
    ///
    /// Any refetch still in flight completes against a cache nobody
    /// reads; there is no cancellation.
    pub fn detach(&self, registry: &SubscriberRegistry) {
        if let Some(id) = self.inner.subscription.get() {
            registry.unsubscribe(*id);
        }
    }

    /// Initial full fetch, issued once when the view first appears.
    pub async fn load(&self) -> Result<(), SyncError> {
        self.inner.refetch().await
    }

    /// Snapshot of the cached items.
    pub fn items(&self) -> Vec<Item> {
        self.inner
            .items
            .read()
            .expect("ItemsView: items lock poisoned")
            .clone()
    }

    /// Pending low-stock alerts, oldest first.
    pub fn alerts(&self) -> Vec<Alert> {
        self.inner.alerts.snapshot()
    }

    /// Dismiss the alert at `index` in the current queue.
    pub fn dismiss_alert(&self, index: usize) -> Option<Alert> {
        self.inner.alerts.dismiss(index)
    }

    /// Most recent refetch error, cleared by the next successful refetch.
    pub fn last_error(&self) -> Option<String> {
        self.inner
            .last_error
            .read()
            .expect("ItemsView: error lock poisoned")
            .clone()
    }

    /// Wait until no spawned refetch is in flight.
    pub async fn settled(&self) {
        loop {
            let notified = self.inner.settled.notified();
            if self.inner.pending_refetches.load(Ordering::SeqCst) == 0 {
                return;
            }
            notified.await;
        }
    }

    fn spawn_refetch(&self) {
        self.inner.pending_refetches.fetch_add(1, Ordering::SeqCst);
        let state = Arc::clone(&self.inner);
        tokio::spawn(async move {
            let _ = state.refetch().await;
            state.pending_refetches.fetch_sub(1, Ordering::SeqCst);
            state.settled.notify_waiters();
        });
    }
}

impl ViewState {
    async fn refetch(&self) -> Result<(), SyncError> {
        match self.api.list_items().await {
            Ok(items) => {
                *self.items.write().expect("ItemsView: items lock poisoned") = items;
                *self
                    .last_error
                    .write()
                    .expect("ItemsView: error lock poisoned") = None;
                Ok(())
            }
            Err(err) => {
                tracing::warn!(error = %err, "item refetch failed");
                *self
                    .last_error
                    .write()
                    .expect("ItemsView: error lock poisoned") = Some(err.to_string());
                Err(err)
            }
        }
    }
}

#[async_trait]
impl EventHandler for ItemsView {
    async fn handle(&self, event: PushEvent) -> Result<(), SyncError> {
        match event.kind {
            EventKind::ItemCreated | EventKind::ItemUpdated => {
                self.spawn_refetch();
                Ok(())
            }
            EventKind::ItemDeleted => {
                let id = event
                    .data
                    .get("id")
                    .and_then(serde_json::Value::as_i64)
                    .ok_or_else(|| {
                        SyncError::Payload("item_deleted event missing integer id".to_string())
                    })?;
                self.inner
                    .items
                    .write()
                    .expect("ItemsView: items lock poisoned")
                    .retain(|item| item.id != id);
                Ok(())
            }
            EventKind::LowStockAlert => {
                let alert: Alert = serde_json::from_value(event.data)?;
                self.inner.alerts.push(alert);
                Ok(())
            }
            EventKind::TransactionCreated | EventKind::Unknown => Ok(()),
        }
    }

    fn name(&self) -> &'static str {
        "ItemsView"
    }
}
