//! PushTransport port - injectable transport behind the connection manager.
//!
//! The reconnection state machine is written against these two traits,
//! decoupled from any concrete socket. The production adapter is
//! `adapters::ws`; tests inject a scripted transport instead.

use async_trait::async_trait;

use crate::error::SyncError;

/// Factory for push channel connections.
#[async_trait]
pub trait PushTransport: Send + Sync {
    /// Open a new connection to the push channel.
    ///
    /// Errors here are transport failures; the connection manager logs
    /// them and schedules a reconnect.
    async fn connect(&self, url: &str) -> Result<Box<dyn PushStream>, SyncError>;
}

/// One live push channel session yielding inbound text frames.
#[async_trait]
pub trait PushStream: Send {
    /// Next inbound text frame.
    ///
    /// Returns `None` when the remote closes the connection, and
    /// `Some(Err(_))` on a mid-session transport error. Either way the
    /// session is over and the connection manager moves on.
    async fn next_message(&mut self) -> Option<Result<String, SyncError>>;
}
