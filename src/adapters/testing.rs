//! Scripted in-process fakes for the transport and REST ports.
//!
//! Used by the unit tests beside the core modules and by the pipeline
//! tests in `tests/`. Panicking on misuse is fine here; none of this is
//! wired into production paths.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio::sync::Notify;

use crate::domain::{Item, Transaction};
use crate::error::SyncError;
use crate::ports::{InventoryApi, PushStream, PushTransport};

// ── Scripted push transport ─────────────────────────────────────────────

enum Frame {
    Text(String),
    Error(String),
}

enum Script {
    Refuse,
    Accept(mpsc::UnboundedReceiver<Frame>),
}

/// Push transport whose `connect` calls pop a queue of prepared scripts.
///
/// Queue a refusal to make the next attempt fail, or a session to make
/// it succeed and hand frames in by hand. When the queue runs dry,
/// `connect` pends forever, which freezes the reconnect loop in
/// `Connecting` and keeps attempt counts exact.
pub struct ScriptedTransport {
    scripts: Mutex<VecDeque<Script>>,
    attempts: AtomicUsize,
}

impl ScriptedTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            scripts: Mutex::new(VecDeque::new()),
            attempts: AtomicUsize::new(0),
        })
    }

    /// Queue a failed connection attempt.
    pub fn push_refusal(&self) {
        self.scripts
            .lock()
            .expect("ScriptedTransport: scripts lock poisoned")
            .push_back(Script::Refuse);
    }

    /// Queue a successful connection attempt and return its remote side.
    pub fn push_session(&self) -> SessionHandle {
        let (tx, rx) = mpsc::unbounded_channel();
        self.scripts
            .lock()
            .expect("ScriptedTransport: scripts lock poisoned")
            .push_back(Script::Accept(rx));
        SessionHandle { tx }
    }

    /// How many times `connect` has been called.
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PushTransport for ScriptedTransport {
    async fn connect(&self, _url: &str) -> Result<Box<dyn PushStream>, SyncError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        let script = self
            .scripts
            .lock()
            .expect("ScriptedTransport: scripts lock poisoned")
            .pop_front();
        match script {
            Some(Script::Refuse) => Err(SyncError::Transport("scripted refusal".to_string())),
            Some(Script::Accept(rx)) => Ok(Box::new(ScriptedStream { rx })),
            None => std::future::pending().await,
        }
    }
}

/// Remote end of one scripted session.
pub struct SessionHandle {
    tx: mpsc::UnboundedSender<Frame>,
}

impl SessionHandle {
    /// Deliver a raw text frame, malformed ones included.
    pub fn send_text(&self, text: impl Into<String>) {
        let _ = self.tx.send(Frame::Text(text.into()));
    }

    /// Deliver a well-formed `{type, data}` push message.
    pub fn send_event(&self, kind: &str, data: serde_json::Value) {
        self.send_text(serde_json::json!({ "type": kind, "data": data }).to_string());
    }

    /// End the session with a mid-stream transport error.
    pub fn fail(self, message: &str) {
        let _ = self.tx.send(Frame::Error(message.to_string()));
    }

    /// Close the session as the server would.
    pub fn close(self) {}
}

struct ScriptedStream {
    rx: mpsc::UnboundedReceiver<Frame>,
}

#[async_trait]
impl PushStream for ScriptedStream {
    async fn next_message(&mut self) -> Option<Result<String, SyncError>> {
        match self.rx.recv().await? {
            Frame::Text(text) => Some(Ok(text)),
            Frame::Error(message) => Some(Err(SyncError::Transport(message))),
        }
    }
}

// ── In-memory inventory API ─────────────────────────────────────────────

/// Settable, countable, gateable stand-in for the REST boundary.
///
/// `hold_responses` parks every list call until `release_responses`,
/// which is how the tests pin down completion-order races between
/// overlapping refetches and local patches.
pub struct InMemoryInventoryApi {
    items: Mutex<Vec<Item>>,
    transactions: Mutex<Vec<Transaction>>,
    item_list_calls: AtomicUsize,
    transaction_list_calls: AtomicUsize,
    fail_items: AtomicBool,
    hold: AtomicBool,
    release: Notify,
}

impl InMemoryInventoryApi {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            items: Mutex::new(Vec::new()),
            transactions: Mutex::new(Vec::new()),
            item_list_calls: AtomicUsize::new(0),
            transaction_list_calls: AtomicUsize::new(0),
            fail_items: AtomicBool::new(false),
            hold: AtomicBool::new(false),
            release: Notify::new(),
        })
    }

    pub fn set_items(&self, items: Vec<Item>) {
        *self
            .items
            .lock()
            .expect("InMemoryInventoryApi: items lock poisoned") = items;
    }

    pub fn set_transactions(&self, transactions: Vec<Transaction>) {
        *self
            .transactions
            .lock()
            .expect("InMemoryInventoryApi: transactions lock poisoned") = transactions;
    }

    pub fn item_list_calls(&self) -> usize {
        self.item_list_calls.load(Ordering::SeqCst)
    }

    pub fn transaction_list_calls(&self) -> usize {
        self.transaction_list_calls.load(Ordering::SeqCst)
    }

    /// Make item listings fail until turned off again.
    pub fn fail_item_listing(&self, fail: bool) {
        self.fail_items.store(fail, Ordering::SeqCst);
    }

    /// Park list calls until [`Self::release_responses`].
    pub fn hold_responses(&self) {
        self.hold.store(true, Ordering::SeqCst);
    }

    /// Let parked list calls complete.
    pub fn release_responses(&self) {
        self.hold.store(false, Ordering::SeqCst);
        self.release.notify_waiters();
    }

    async fn gate(&self) {
        loop {
            let released = self.release.notified();
            if !self.hold.load(Ordering::SeqCst) {
                return;
            }
            released.await;
        }
    }
}

#[async_trait]
impl InventoryApi for InMemoryInventoryApi {
    async fn list_items(&self) -> Result<Vec<Item>, SyncError> {
        self.item_list_calls.fetch_add(1, Ordering::SeqCst);
        self.gate().await;
        if self.fail_items.load(Ordering::SeqCst) {
            return Err(SyncError::Refetch("injected item listing failure".to_string()));
        }
        Ok(self
            .items
            .lock()
            .expect("InMemoryInventoryApi: items lock poisoned")
            .clone())
    }

    async fn list_transactions(&self) -> Result<Vec<Transaction>, SyncError> {
        self.transaction_list_calls.fetch_add(1, Ordering::SeqCst);
        self.gate().await;
        Ok(self
            .transactions
            .lock()
            .expect("InMemoryInventoryApi: transactions lock poisoned")
            .clone())
    }
}

/// Item fixture with sensible defaults for tests.
pub fn fixture_item(id: i64, sku: &str, quantity: i64) -> Item {
    Item {
        id,
        name: format!("Item {sku}"),
        sku: sku.to_string(),
        description: None,
        quantity,
        low_stock_threshold: 5,
        price: 1.0,
    }
}
