//! InventoryApi port - the external REST boundary used by refetches.
//!
//! Only the list endpoints appear here: they are what the views call
//! during invalidate-and-refetch. The mutating CRUD endpoints live on
//! the producing side of the push events and are not this crate's
//! concern.

use async_trait::async_trait;

use crate::domain::{Item, Transaction};
use crate::error::SyncError;

/// Read-only client for the inventory service's list endpoints.
#[async_trait]
pub trait InventoryApi: Send + Sync {
    /// `GET /items/` - full item listing.
    async fn list_items(&self) -> Result<Vec<Item>, SyncError>;

    /// `GET /transactions/` - full transaction listing.
    async fn list_transactions(&self) -> Result<Vec<Transaction>, SyncError>;
}
