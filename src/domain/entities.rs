//! External entities cached locally by the view synchronizers.
//!
//! These mirror the inventory service's REST representations. Each view
//! exclusively owns its local cache of entities; caches are never shared
//! across views.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An inventory item as returned by `GET /items/`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: i64,
    pub name: String,
    pub sku: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Server-enforced invariant: never negative.
    pub quantity: i64,
    pub low_stock_threshold: i64,
    #[serde(default)]
    pub price: f64,
}

impl Item {
    /// Whether the item has dropped to or below its low-stock threshold.
    pub fn is_low_stock(&self) -> bool {
        self.quantity <= self.low_stock_threshold
    }
}

/// Direction of a stock movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    In,
    Out,
}

/// A stock transaction as returned by `GET /transactions/`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: i64,
    pub item_id: i64,
    #[serde(rename = "type")]
    pub kind: TransactionType,
    pub quantity: i64,
    pub user_id: i64,
    pub created_at: DateTime<Utc>,
}

/// A low-stock notification destined for the alert queue.
///
/// Alerts accumulate in arrival order and are only ever removed by an
/// explicit user dismissal, never by expiry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alert {
    pub name: String,
    pub sku: String,
    pub quantity: i64,
}
