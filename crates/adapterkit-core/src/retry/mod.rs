//! Retry strategies and backoff implementations.
//!
//! This module provides the abstraction adapters use to decide how many
//! attempts an operation gets and how long to wait between them.
//!
//! # Key Types
//!
//! - [`BackoffStrategy`] - Core trait for retry strategies
//! - [`LinearBackoff`] - Linear backoff capped at a maximum delay
//!
//! # Examples
//!
//! ```rust
//! use adapterkit_core::retry::{BackoffStrategy, LinearBackoff};
//! use std::time::Duration;
//!
//! let backoff = LinearBackoff::builder()
//!     .max_attempts(4)
//!     .step(Duration::from_secs(1))
//!     .max_delay(Duration::from_secs(2))
//!     .build();
//!
//! let delays: Vec<_> = (1..=4).filter_map(|a| backoff.next_delay(a)).collect();
//! assert_eq!(
//!     delays,
//!     vec![Duration::from_secs(1), Duration::from_secs(2), Duration::from_secs(2)]
//! );
//! ```

mod linear;
mod strategy;

pub use linear::{LinearBackoff, LinearBackoffBuilder};
pub use strategy::BackoffStrategy;
