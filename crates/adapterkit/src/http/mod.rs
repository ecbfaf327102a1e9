//! Resilient HTTP execution shared by every adapter
//!
//! - [`RequestOptions`]: per-call options merged over fixed defaults
//! - [`HttpExecutor`]: bounded retries with linear backoff, status checking

mod executor;
mod options;

pub use executor::HttpExecutor;
pub use options::{RequestBody, RequestOptions};
