//! HTTP transport abstraction layer for adapterkit
//!
//! Provides a trait-based transport abstraction so the adapter execution
//! path can be driven by a real HTTP client in production and by a scripted
//! transport in tests.
//!
//! # Architecture
//!
//! - **Transport trait**: Generic interface for sending one HTTP request
//! - **HTTP transport**: reqwest-backed implementation, one attempt per call
//! - **Retry policy**: Linear backoff defaults plus the retryable-failure rules
//! - **Error handling**: Transport failures, distinct from HTTP status failures
//!
//! # Usage
//!
//! ```ignore
//! use adapterkit_transport::{HttpRequest, HttpTransport, Transport};
//!
//! let transport = HttpTransport::new()?;
//! let request = HttpRequest::new("GET", "https://example.com/feed.json");
//! let response = transport.send_http(request).await?;
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod http;
pub mod traits;

// Re-export commonly used types
pub use error::{Result, TransportError};
pub use http::{HttpTransport, HttpTransportConfig, RetryPolicy};
pub use traits::{HttpRequest, HttpResponse, HttpVersion, Transport};
