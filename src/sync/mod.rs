//! The synchronization core: shared connection, fan-out, alert queue.
//!
//! Control flow runs connection manager → dispatcher → subscriber
//! registry → zero or more view synchronizers. The connection and the
//! registry are the only shared mutable resources in the crate, and both
//! are mutated only through their own narrow APIs.

mod alerts;
mod connection;
mod registry;

pub use alerts::AlertAccumulator;
pub use connection::{ConnectionManager, ConnectionState};
pub use registry::{SubscriberRegistry, SubscriptionId};
