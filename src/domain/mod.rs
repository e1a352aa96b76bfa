//! Domain types shared across the synchronization layer.

mod entities;
mod event;

pub use entities::{Alert, Item, Transaction, TransactionType};
pub use event::{EventKind, PushEvent};
