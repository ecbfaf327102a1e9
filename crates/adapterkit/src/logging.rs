//! Logging boundary
//!
//! Adapters log through an injected [`LogSink`] so the host decides where
//! records go. When the host wires nothing, [`NoopSink`] swallows them.
//! [`AdapterLogger`] stamps every record with the adapter's name and tier.

use crate::capability::Tier;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;

/// Log severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Verbose diagnostics
    Debug,
    /// Normal operation
    Info,
    /// Something failed but may recover
    Warning,
    /// An operation failed
    Error,
}

impl LogLevel {
    /// Lowercase name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Error => "error",
        }
    }
}

/// Destination for adapter log records.
pub trait LogSink: Send + Sync {
    /// Receive one record. `context` always carries `adapter` and `tier`
    /// when sent through an [`AdapterLogger`].
    fn log(&self, level: LogLevel, message: &str, context: &Map<String, Value>);
}

/// Sink that discards everything. The default.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSink;

impl LogSink for NoopSink {
    fn log(&self, _level: LogLevel, _message: &str, _context: &Map<String, Value>) {}
}

/// Sink that forwards records to `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl LogSink for TracingSink {
    fn log(&self, level: LogLevel, message: &str, context: &Map<String, Value>) {
        let context = Value::Object(context.clone());
        match level {
            LogLevel::Debug => tracing::debug!(%context, "{message}"),
            LogLevel::Info => tracing::info!(%context, "{message}"),
            LogLevel::Warning => tracing::warn!(%context, "{message}"),
            LogLevel::Error => tracing::error!(%context, "{message}"),
        }
    }
}

/// Logger bound to one adapter instance.
#[derive(Clone)]
pub struct AdapterLogger {
    sink: Arc<dyn LogSink>,
    adapter: String,
    tier: Tier,
}

impl AdapterLogger {
    /// Bind `sink` to an adapter name and tier.
    pub fn new(sink: Arc<dyn LogSink>, adapter: impl Into<String>, tier: Tier) -> Self {
        Self {
            sink,
            adapter: adapter.into(),
            tier,
        }
    }

    /// Logger that discards everything.
    pub fn noop(adapter: impl Into<String>, tier: Tier) -> Self {
        Self::new(Arc::new(NoopSink), adapter, tier)
    }

    /// Emit a record tagged with adapter name and tier.
    pub fn log(&self, level: LogLevel, message: &str, mut context: Map<String, Value>) {
        context.insert("adapter".to_string(), Value::from(self.adapter.as_str()));
        context.insert("tier".to_string(), Value::from(self.tier.as_str()));
        self.sink.log(level, message, &context);
    }

    /// Emit at debug level.
    pub fn debug(&self, message: &str, context: Map<String, Value>) {
        self.log(LogLevel::Debug, message, context);
    }

    /// Emit at info level.
    pub fn info(&self, message: &str, context: Map<String, Value>) {
        self.log(LogLevel::Info, message, context);
    }

    /// Emit at warning level.
    pub fn warning(&self, message: &str, context: Map<String, Value>) {
        self.log(LogLevel::Warning, message, context);
    }

    /// Emit at error level.
    pub fn error(&self, message: &str, context: Map<String, Value>) {
        self.log(LogLevel::Error, message, context);
    }
}

impl fmt::Debug for AdapterLogger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdapterLogger")
            .field("adapter", &self.adapter)
            .field("tier", &self.tier)
            .finish_non_exhaustive()
    }
}
