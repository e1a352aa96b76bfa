//! Push events received over the inventory push channel.
//!
//! The server sends UTF-8 JSON objects of shape `{"type": ..., "data": ...}`.
//! The dispatcher never inspects `data`; interpretation is entirely up to
//! the consuming view.

use serde::{Deserialize, Serialize};

use crate::error::SyncError;

/// Kinds of events the inventory service pushes to connected clients.
///
/// Unrecognized types decode as [`EventKind::Unknown`] so a newer server
/// never breaks an older client; consumers ignore what they don't know.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    ItemCreated,
    ItemUpdated,
    ItemDeleted,
    LowStockAlert,
    TransactionCreated,
    #[serde(other)]
    Unknown,
}

/// A single inbound push message. Immutable once received; not persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PushEvent {
    #[serde(rename = "type")]
    pub kind: EventKind,
    /// Opaque payload; shape depends on `kind`.
    #[serde(default)]
    pub data: serde_json::Value,
}

impl PushEvent {
    pub fn new(kind: EventKind, data: serde_json::Value) -> Self {
        Self { kind, data }
    }

    /// Decode a raw text frame from the push channel.
    pub fn decode(text: &str) -> Result<Self, SyncError> {
        Ok(serde_json::from_str(text)?)
    }
}
