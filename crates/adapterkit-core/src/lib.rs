#![deny(unsafe_code)]
#![warn(missing_docs)]

//! Core abstractions for the adapterkit ecosystem.
//!
//! This crate provides the building blocks that every adapter shares,
//! independent of transport or capability:
//!
//! - **Backoff strategies** via the `BackoffStrategy` trait
//!   - Linear backoff with a delay ceiling
//! - **Configuration snapshots** via `Config` and the recursive `sanitize` pass
//!
//! # Examples
//!
//! Using the prelude for convenient imports:
//!
//! ```rust
//! use adapterkit_core::prelude::*;
//! use std::time::Duration;
//!
//! let backoff = LinearBackoff::builder().max_attempts(3).build();
//! assert_eq!(backoff.next_delay(1), Some(Duration::from_secs(1)));
//! assert_eq!(backoff.next_delay(2), Some(Duration::from_secs(2)));
//! assert_eq!(backoff.next_delay(3), None);
//!
//! let raw = serde_json::json!({"API_Key": "  abc  ", "Title": "<b>Hi</b>"});
//! let config = Config::from_value(&raw);
//! assert_eq!(config.get("api_key").unwrap(), "abc");
//! assert_eq!(config.get("title").unwrap(), "Hi");
//! ```

pub mod config;
pub mod retry;


/// Convenient re-exports of commonly used items.
///
/// Import all core abstractions with:
///
/// ```rust
/// use adapterkit_core::prelude::*;
/// ```
pub mod prelude {
    pub use crate::config::{Config, canonicalize_key, is_credential_key, sanitize};
    pub use crate::retry::{BackoffStrategy, LinearBackoff, LinearBackoffBuilder};
}
