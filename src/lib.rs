//! Stocklink - real-time synchronization client for the inventory dashboard.
//!
//! One shared, long-lived push-channel connection is fanned out to any
//! number of independent consumers. Each consumer reconciles pushed
//! events against its own locally cached view of server state, trading
//! off consistency (full refetch) against responsiveness (local patch)
//! per event kind.

pub mod adapters;
pub mod config;
pub mod domain;
pub mod error;
pub mod ports;
pub mod sync;
pub mod views;

pub use error::SyncError;
