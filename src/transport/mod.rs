//! Hosting transports for the protocol engine
//!
//! Two surfaces share one router: a stateless HTTP gateway and a persistent
//! WebSocket host. Neither adds protocol semantics of its own.

pub mod gateway;
pub mod ws;

pub use ws::ConnectionManager;
