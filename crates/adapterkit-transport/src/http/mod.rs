//! HTTP transport implementation
//!
//! Provides a reqwest-backed client that implements the Transport trait,
//! and the retry policy the adapter execution path applies on top of it.

pub mod client;
pub mod retry;

pub use client::{HttpTransport, HttpTransportConfig};
pub use retry::RetryPolicy;
