//! Adapters - concrete implementations of the ports.
//!
//! - `ws` - WebSocket push transport (tokio-tungstenite)
//! - `http` - REST inventory client (reqwest)
//! - `testing` - scripted in-process fakes for unit and integration tests

pub mod http;
pub mod testing;
pub mod ws;
