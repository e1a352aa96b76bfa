//! View synchronizers: consumers that reconcile pushed events against
//! their own locally cached slice of server state.
//!
//! Two reconciliation strategies are in play:
//!
//! - *invalidate-and-refetch* - discard cache correctness and re-issue a
//!   full list query, replacing the cache wholesale on success. Used
//!   where the event doesn't carry enough to patch locally.
//! - *local-patch* - apply a targeted mutation straight from the event
//!   payload, no network round-trip. An optimization, not a consistency
//!   guarantee: a lost delete event leaves a stale entry until the next
//!   refetch.
//!
//! Each view exclusively owns its cache; nothing is shared across views.

mod items;
mod transactions;

pub use items::ItemsView;
pub use transactions::TransactionsView;
