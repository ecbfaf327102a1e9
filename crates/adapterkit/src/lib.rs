//! # adapterkit
//!
//! One contract for integrating external services into a host application:
//! - AI content generators ([`Generator`])
//! - Publishing targets ([`Poster`])
//! - Web scrapers ([`Scraper`])
//! - Workflow engines ([`Workflow`])
//!
//! Every adapter shares the same machinery through [`AdapterCore`]:
//! sanitized configuration, required-field validation, capability
//! introspection, a sticky last-error slot, tagged logging and a retrying
//! HTTP executor. Failures are [`ErrorRecord`] values, never panics.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use adapterkit::adapters::WebScraper;
//! use adapterkit::{Adapter, Scraper};
//! use serde_json::{Map, json};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), adapterkit::ErrorRecord> {
//!     let scraper = WebScraper::new(&Map::new())?;
//!     scraper.validate_config()?;
//!
//!     let mut options = Map::new();
//!     options.insert("selectors".into(), json!({"title": "h1"}));
//!     let page = scraper.scrape("https://example.com", &options).await?;
//!
//!     println!("{:?}", page.data);
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

// Re-export commonly used types
pub use base::{Adapter, AdapterCore, AdapterCoreBuilder};
pub use capabilities::{AdapterKind, AnyAdapter, Generator, Options, Poster, Scraper, Workflow};
pub use capability::{CapabilityDescriptor, Tier};
pub use error::{AdapterResult, ErrorRecord, Severity};
pub use http::{HttpExecutor, RequestOptions};
pub use logging::{AdapterLogger, LogLevel, LogSink, NoopSink, TracingSink};

// Module declarations
pub mod adapters;
pub mod base;
pub mod capabilities;
pub mod capability;
pub mod error;
pub mod http;
pub mod logging;
pub mod outcome;

#[cfg(feature = "env")]
#[cfg_attr(docsrs, doc(cfg(feature = "env")))]
pub mod env;

// Re-export the layers below for adapter authors
pub use adapterkit_core::config::Config;
pub use adapterkit_transport::{HttpRequest, HttpResponse, HttpVersion, Transport, TransportError};
pub use async_trait::async_trait;
