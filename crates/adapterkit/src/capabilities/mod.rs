//! Capability interfaces
//!
//! Each capability is a trait extending [`Adapter`] with a closed set of
//! domain operations. A concrete adapter implements exactly one of them.
//! Hosts that hold adapters of mixed kinds use [`AnyAdapter`].

mod generator;
mod poster;
mod scraper;
mod workflow;

pub use generator::{Analysis, Generation, Generator, Summary, TokenUsage, UsageReport};
pub use poster::{MediaFile, PostContent, Poster, Publication, ScheduledPublication};
pub use scraper::{BatchResults, RateLimitStatus, ScrapedPage, Scraper, extract_fields};
pub use workflow::{
    Execution, ExecutionStatus, ProgressCallback, ProgressEvent, ProgressObservers, StatusReport,
    StepError, Workflow, WorkflowStep, validate_steps,
};

use crate::base::Adapter;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;

/// Free-form per-call options passed to domain operations.
pub type Options = Map<String, Value>;

/// Which capability an adapter provides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdapterKind {
    /// Content generation
    Generator,
    /// Publishing
    Poster,
    /// Page fetching and extraction
    Scraper,
    /// Workflow automation
    Workflow,
}

impl fmt::Display for AdapterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Generator => "generator",
            Self::Poster => "poster",
            Self::Scraper => "scraper",
            Self::Workflow => "workflow",
        })
    }
}

/// An adapter of any capability.
#[derive(Clone)]
pub enum AnyAdapter {
    /// A [`Generator`]
    Generator(Arc<dyn Generator>),
    /// A [`Poster`]
    Poster(Arc<dyn Poster>),
    /// A [`Scraper`]
    Scraper(Arc<dyn Scraper>),
    /// A [`Workflow`]
    Workflow(Arc<dyn Workflow>),
}

impl AnyAdapter {
    /// Capability of the wrapped adapter.
    pub fn kind(&self) -> AdapterKind {
        match self {
            Self::Generator(_) => AdapterKind::Generator,
            Self::Poster(_) => AdapterKind::Poster,
            Self::Scraper(_) => AdapterKind::Scraper,
            Self::Workflow(_) => AdapterKind::Workflow,
        }
    }

    /// The shared contract of the wrapped adapter.
    pub fn as_adapter(&self) -> &dyn Adapter {
        match self {
            Self::Generator(adapter) => &**adapter,
            Self::Poster(adapter) => &**adapter,
            Self::Scraper(adapter) => &**adapter,
            Self::Workflow(adapter) => &**adapter,
        }
    }
}

impl fmt::Debug for AnyAdapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnyAdapter")
            .field("kind", &self.kind())
            .field("name", &self.as_adapter().info().name)
            .finish()
    }
}
