//! Connection manager: owns the single live push channel connection.
//!
//! Exactly one manager exists per process, shared by `Arc` with every
//! consumer. The manager runs an explicit reconnection state machine on
//! a background task, decoupled from the concrete socket through the
//! [`PushTransport`] port:
//!
//! ```text
//! Disconnected ──ensure_connected──▶ Connecting
//! Connecting   ──open ok──▶ Connected
//! Connecting   ──open failed──▶ Disconnected
//! Connected    ──close / transport error──▶ Disconnected
//! Disconnected ──▶ PendingReconnect ──fixed delay──▶ Connecting
//! ```
//!
//! There is no retry cap and no backoff: the manager retries on a fixed
//! delay (default 3000 ms) for as long as the process lives. Nothing is
//! replayed on reconnect; events pushed while disconnected are lost to
//! this client.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::domain::PushEvent;
use crate::ports::PushTransport;
use crate::sync::SubscriberRegistry;

/// Lifecycle of the shared push channel connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
    PendingReconnect,
}

impl std::fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ConnectionState::Disconnected => "disconnected",
            ConnectionState::Connecting => "connecting",
            ConnectionState::Connected => "connected",
            ConnectionState::PendingReconnect => "pending_reconnect",
        };
        f.write_str(name)
    }
}

/// Owns the physical connection and its `ConnectionState`.
///
/// The connection is process-wide and outlives any single view; views
/// come and go through the registry without touching it.
pub struct ConnectionManager {
    transport: Arc<dyn PushTransport>,
    registry: Arc<SubscriberRegistry>,
    url: String,
    reconnect_delay: Duration,
    state_tx: Arc<watch::Sender<ConnectionState>>,
    state_rx: watch::Receiver<ConnectionState>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl ConnectionManager {
    /// Fixed delay between a lost connection and the next attempt.
    pub const DEFAULT_RECONNECT_DELAY: Duration = Duration::from_millis(3000);

    pub fn new(
        transport: Arc<dyn PushTransport>,
        registry: Arc<SubscriberRegistry>,
        url: impl Into<String>,
        reconnect_delay: Duration,
    ) -> Self {
        let (state_tx, state_rx) = watch::channel(ConnectionState::Disconnected);
        Self {
            transport,
            registry,
            url: url.into(),
            reconnect_delay,
            state_tx: Arc::new(state_tx),
            state_rx,
            worker: Mutex::new(None),
        }
    }

    /// Start the connection worker if it is not already running.
    ///
    /// Idempotent: while a worker is alive this is a no-op, so components
    /// with independent lifetimes can all call it on first use without
    /// ever racing two physical connections into existence.
    pub fn ensure_connected(&self) {
        let mut worker = self
            .worker
            .lock()
            .expect("ConnectionManager: worker lock poisoned");
        if let Some(handle) = worker.as_ref() {
            if !handle.is_finished() {
                return;
            }
        }

        let task = ConnectionWorker {
            transport: Arc::clone(&self.transport),
            registry: Arc::clone(&self.registry),
            url: self.url.clone(),
            reconnect_delay: self.reconnect_delay,
            state: Arc::clone(&self.state_tx),
        };
        *worker = Some(tokio::spawn(task.run()));
    }

    /// Current connection state.
    pub fn state(&self) -> ConnectionState {
        *self.state_rx.borrow()
    }

    /// Watch connection state transitions.
    pub fn watch_state(&self) -> watch::Receiver<ConnectionState> {
        self.state_rx.clone()
    }

    /// The registry this connection fans events out to.
    pub fn registry(&self) -> &Arc<SubscriberRegistry> {
        &self.registry
    }
}

impl Drop for ConnectionManager {
    fn drop(&mut self) {
        if let Ok(mut worker) = self.worker.lock() {
            if let Some(handle) = worker.take() {
                handle.abort();
            }
        }
    }
}

/// Background task driving the reconnection state machine.
struct ConnectionWorker {
    transport: Arc<dyn PushTransport>,
    registry: Arc<SubscriberRegistry>,
    url: String,
    reconnect_delay: Duration,
    state: Arc<watch::Sender<ConnectionState>>,
}

impl ConnectionWorker {
    fn set_state(&self, state: ConnectionState) {
        self.state.send_replace(state);
    }

    async fn run(self) {
        loop {
            self.set_state(ConnectionState::Connecting);
            match self.transport.connect(&self.url).await {
                Ok(mut stream) => {
                    self.set_state(ConnectionState::Connected);
                    tracing::info!(url = %self.url, "push channel connected");

                    loop {
                        match stream.next_message().await {
                            Some(Ok(text)) => match PushEvent::decode(&text) {
                                Ok(event) => self.registry.dispatch(event).await,
                                Err(err) => {
                                    // One bad frame; the channel stays up.
                                    tracing::warn!(
                                        error = %err,
                                        "dropping malformed push message"
                                    );
                                }
                            },
                            Some(Err(err)) => {
                                tracing::warn!(error = %err, "push channel transport error");
                                break;
                            }
                            None => {
                                tracing::info!("push channel closed by server");
                                break;
                            }
                        }
                    }
                    self.set_state(ConnectionState::Disconnected);
                }
                Err(err) => {
                    tracing::warn!(url = %self.url, error = %err, "push channel connect failed");
                    self.set_state(ConnectionState::Disconnected);
                }
            }

            self.set_state(ConnectionState::PendingReconnect);
            tokio::time::sleep(self.reconnect_delay).await;
        }
    }
}
