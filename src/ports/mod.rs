//! Ports - interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the synchronization core and the outside world. Adapters implement
//! these ports.
//!
//! - `PushTransport` / `PushStream` - the push channel, injectable so the
//!   reconnection state machine is testable without a socket
//! - `EventHandler` - the subscriber callback shape for fan-out
//! - `InventoryApi` - the REST boundary used by invalidate-and-refetch

mod event_handler;
mod inventory_api;
mod transport;

pub use event_handler::EventHandler;
pub use inventory_api::InventoryApi;
pub use transport::{PushStream, PushTransport};
