//! Transactions view: cached transaction list plus the item listing it
//! needs to resolve item names.
//!
//! The only event this view acts on is `transaction_created`, and the
//! response is always invalidate-and-refetch of both lists: a new
//! transaction changes the item's quantity server-side, so patching the
//! transaction list alone would leave the item data stale.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use once_cell::sync::OnceCell;
use tokio::sync::Notify;

use crate::domain::{EventKind, Item, PushEvent, Transaction};
use crate::error::SyncError;
use crate::ports::{EventHandler, InventoryApi};
use crate::sync::{SubscriberRegistry, SubscriptionId};

/// Cached transaction history kept in sync with the push channel.
///
/// Cheap to clone; all clones share one cache.
#[derive(Clone)]
pub struct TransactionsView {
    inner: Arc<ViewState>,
}

struct ViewState {
    api: Arc<dyn InventoryApi>,
    transactions: RwLock<Vec<Transaction>>,
    items: RwLock<Vec<Item>>,
    last_error: RwLock<Option<String>>,
    subscription: OnceCell<SubscriptionId>,
    pending_refetches: AtomicUsize,
    settled: Notify,
}

impl TransactionsView {
    pub fn new(api: Arc<dyn InventoryApi>) -> Self {
        Self {
            inner: Arc::new(ViewState {
                api,
                transactions: RwLock::new(Vec::new()),
                items: RwLock::new(Vec::new()),
                last_error: RwLock::new(None),
                subscription: OnceCell::new(),
                pending_refetches: AtomicUsize::new(0),
                settled: Notify::new(),
            }),
        }
    }

    /// Subscribe this view to the registry; first call wins, the rest
    /// are no-ops.
    pub fn register(&self, registry: &SubscriberRegistry) {
        self.inner
            .subscription
            .get_or_init(|| registry.subscribe(Arc::new(self.clone())));
    }

    /// Drop this view's subscription, if it has one.
    pub fn detach(&self, registry: &SubscriberRegistry) {
        if let Some(id) = self.inner.subscription.get() {
            registry.unsubscribe(*id);
        }
    }

    /// Initial full fetch of both lists.
    pub async fn load(&self) -> Result<(), SyncError> {
        self.inner.refetch().await
    }

    /// Snapshot of the cached transactions.
    pub fn transactions(&self) -> Vec<Transaction> {
        self.inner
            .transactions
            .read()
            .expect("TransactionsView: transactions lock poisoned")
            .clone()
    }

    /// Resolve an item name from the cached item listing.
    ///
    /// Falls back to `Item #{id}` when the listing doesn't know the id
    /// yet (for example right after a burst of creations).
    pub fn item_name(&self, item_id: i64) -> String {
        self.inner
            .items
            .read()
            .expect("TransactionsView: items lock poisoned")
            .iter()
            .find(|item| item.id == item_id)
            .map(|item| item.name.clone())
            .unwrap_or_else(|| format!("Item #{item_id}"))
    }

    /// Most recent refetch error, cleared by the next successful refetch.
    pub fn last_error(&self) -> Option<String> {
        self.inner
            .last_error
            .read()
            .expect("TransactionsView: error lock poisoned")
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
        let (transactions, items) =
            tokio::join!(self.api.list_transactions(), self.api.list_items());
        match (transactions, items) {
            (Ok(transactions), Ok(items)) => {
                *self
                    .transactions
                    .write()
                    .expect("TransactionsView: transactions lock poisoned") = transactions;
                *self
                    .items
                    .write()
                    .expect("TransactionsView: items lock poisoned") = items;
                *self
                    .last_error
                    .write()
                    .expect("TransactionsView: error lock poisoned") = None;
                Ok(())
            }
            (Err(err), _) | (_, Err(err)) => {
                tracing::warn!(error = %err, "transaction refetch failed");
                *self
                    .last_error
                    .write()
                    .expect("TransactionsView: error lock poisoned") = Some(err.to_string());
                Err(err)
            }
        }
    }
}

#[async_trait]
impl EventHandler for TransactionsView {
    async fn handle(&self, event: PushEvent) -> Result<(), SyncError> {
        if event.kind == EventKind::TransactionCreated {
            self.spawn_refetch();
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "TransactionsView"
    }
}
