//! The shared adapter contract
//!
//! [`AdapterCore`] is the state every adapter owns: its sanitized
//! configuration, its descriptor, its required field list, its last-error
//! slot, its logger and its HTTP executor. Concrete adapters embed one and
//! implement [`Adapter`] by returning it from [`Adapter::core`]; everything
//! else on the trait has a default.

use crate::capability::CapabilityDescriptor;
use crate::error::{AdapterResult, ErrorRecord, Severity, codes};
use crate::http::{HttpExecutor, RequestOptions};
use crate::logging::{AdapterLogger, LogSink, NoopSink};
use adapterkit_core::config::Config;
use adapterkit_transport::{HttpResponse, HttpTransport, RetryPolicy, Transport};
use serde_json::{Map, Value};
use std::sync::{Arc, Mutex, PoisonError};

/// State and behavior shared by every adapter instance.
#[derive(Debug)]
pub struct AdapterCore {
    config: Config,
    descriptor: CapabilityDescriptor,
    required: Vec<String>,
    last_error: Mutex<Option<ErrorRecord>>,
    logger: AdapterLogger,
    executor: HttpExecutor,
}

impl AdapterCore {
    /// Start building a core for an adapter described by `descriptor`.
    pub fn builder(descriptor: CapabilityDescriptor) -> AdapterCoreBuilder {
        AdapterCoreBuilder {
            descriptor,
            raw: Map::new(),
            required: Vec::new(),
            sink: None,
            transport: None,
            retry_policy: None,
        }
    }

    /// Check that every required field is present and non-empty.
    ///
    /// All missing fields are reported together in one `missing_config`
    /// error, which is also stored as the last error.
    pub fn validate_config(&self) -> AdapterResult<()> {
        let missing = self.config.missing(&self.required);
        if missing.is_empty() {
            return Ok(());
        }
        self.fail(ErrorRecord::missing_config(&missing))
    }

    /// Static descriptor.
    pub fn info(&self) -> &CapabilityDescriptor {
        &self.descriptor
    }

    /// Exact, case-sensitive capability check.
    pub fn supports(&self, token: &str) -> bool {
        self.descriptor.supports(token)
    }

    /// Required configuration field names.
    pub fn required_fields(&self) -> &[String] {
        &self.required
    }

    /// Most recent failure. Survives later successes.
    pub fn last_error(&self) -> Option<ErrorRecord> {
        self.slot().clone()
    }

    /// Record an error built from its parts and return it.
    pub fn set_error(
        &self,
        code: &str,
        message: &str,
        context: Map<String, Value>,
    ) -> ErrorRecord {
        self.record(ErrorRecord::new(code, message).with_context_map(context))
    }

    /// Store `error` in the slot, log it at its severity and return it.
    pub fn record(&self, error: ErrorRecord) -> ErrorRecord {
        let mut context = error.context.clone();
        context.insert("code".to_string(), Value::from(error.code.as_str()));
        match error.severity {
            Severity::Warning => self.logger.warning(&error.message, context),
            Severity::Error => self.logger.error(&error.message, context),
        }
        *self.slot() = Some(error.clone());
        error
    }

    /// Record `error` and return it as `Err`.
    pub fn fail<T>(&self, error: ErrorRecord) -> AdapterResult<T> {
        Err(self.record(error))
    }

    /// Empty the last-error slot.
    pub fn clear_error(&self) {
        *self.slot() = None;
    }

    /// Sanitized configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Configuration value for `key`, or `default` when absent.
    pub fn config_value(&self, key: &str, default: Value) -> Value {
        self.config.get_or(key, default)
    }

    /// Logger tagged with this adapter's name and tier.
    pub fn logger(&self) -> &AdapterLogger {
        &self.logger
    }

    /// Shared HTTP executor.
    pub fn executor(&self) -> &HttpExecutor {
        &self.executor
    }

    /// Execute a request, recording any failure as the last error.
    pub async fn execute(
        &self,
        url: &str,
        options: &RequestOptions,
    ) -> AdapterResult<HttpResponse> {
        self.executor
            .execute(url, options)
            .await
            .map_err(|err| self.record(err))
    }

    fn slot(&self) -> std::sync::MutexGuard<'_, Option<ErrorRecord>> {
        self.last_error
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

/// Builder for [`AdapterCore`].
pub struct AdapterCoreBuilder {
    descriptor: CapabilityDescriptor,
    raw: Map<String, Value>,
    required: Vec<String>,
    sink: Option<Arc<dyn LogSink>>,
    transport: Option<Arc<dyn Transport>>,
    retry_policy: Option<RetryPolicy>,
}

impl AdapterCoreBuilder {
    /// Raw configuration mapping. Sanitized on build, not validated.
    pub fn config(mut self, raw: &Map<String, Value>) -> Self {
        self.raw = raw.clone();
        self
    }

    /// Raw configuration as a JSON value. Non-objects mean no configuration.
    pub fn config_value(mut self, raw: &Value) -> Self {
        self.raw = raw.as_object().cloned().unwrap_or_default();
        self
    }

    /// Required field names checked by `validate_config`.
    pub fn required<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.required = fields.into_iter().map(Into::into).collect();
        self
    }

    /// Log sink. Defaults to [`NoopSink`].
    pub fn sink(mut self, sink: Arc<dyn LogSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Transport. Defaults to a fresh [`HttpTransport`].
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Retry policy for the executor.
    pub fn retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry_policy = Some(policy);
        self
    }

    /// Build the core.
    ///
    /// # Errors
    ///
    /// `transport_init` when no transport was given and the default HTTP
    /// client cannot be constructed.
    pub fn build(self) -> AdapterResult<AdapterCore> {
        let sink = self.sink.unwrap_or_else(|| Arc::new(NoopSink));
        let logger = AdapterLogger::new(sink, self.descriptor.name.clone(), self.descriptor.tier);

        let transport: Arc<dyn Transport> = match self.transport {
            Some(transport) => transport,
            None => Arc::new(HttpTransport::new().map_err(|e| {
                ErrorRecord::new(
                    codes::TRANSPORT_INIT,
                    format!("Failed to initialize HTTP transport: {e}"),
                )
            })?),
        };

        let mut executor = HttpExecutor::new(transport, logger.clone());
        if let Some(policy) = self.retry_policy {
            executor = executor.with_retry_policy(policy);
        }

        Ok(AdapterCore {
            config: Config::new(&self.raw),
            descriptor: self.descriptor,
            required: self.required,
            last_error: Mutex::new(None),
            logger,
            executor,
        })
    }
}

/// Contract shared by every adapter, whatever its capability.
pub trait Adapter: Send + Sync {
    /// Shared state.
    fn core(&self) -> &AdapterCore;

    /// See [`AdapterCore::validate_config`].
    fn validate_config(&self) -> AdapterResult<()> {
        self.core().validate_config()
    }

    /// Static descriptor.
    fn info(&self) -> &CapabilityDescriptor {
        self.core().info()
    }

    /// Exact, case-sensitive capability check.
    fn supports(&self, token: &str) -> bool {
        self.core().supports(token)
    }

    /// Most recent failure.
    fn last_error(&self) -> Option<ErrorRecord> {
        self.core().last_error()
    }

    /// Record an adapter-defined error.
    fn set_error(&self, code: &str, message: &str, context: Map<String, Value>) -> ErrorRecord {
        self.core().set_error(code, message, context)
    }

    /// Empty the last-error slot.
    fn clear_error(&self) {
        self.core().clear_error()
    }

    /// Configuration lookup that never fails.
    fn config_value(&self, key: &str, default: Value) -> Value {
        self.core().config_value(key, default)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::Tier;
    use adapterkit_transport::{HttpRequest, Result as TransportResult};
    use async_trait::async_trait;
    use serde_json::json;

    struct Unreachable;

    #[async_trait]
    impl Transport for Unreachable {
        async fn send_http(&self, _request: HttpRequest) -> TransportResult<HttpResponse> {
            unreachable!("no requests expected")
        }
    }

    fn core(raw: Value, required: &[&str]) -> AdapterCore {
        AdapterCore::builder(CapabilityDescriptor::new("test", "0.1.0", Tier::Free))
            .config_value(&raw)
            .required(required.iter().copied())
            .transport(Arc::new(Unreachable))
            .build()
            .unwrap()
    }

    #[test]
    fn test_validate_reports_all_missing() {
        let core = core(json!({"a": "x", "c": ""}), &["a", "b", "c"]);
        let err = core.validate_config().unwrap_err();
        assert_eq!(err.code, codes::MISSING_CONFIG);
        assert_eq!(err.context["missing"], json!(["b", "c"]));
        assert_eq!(core.last_error(), Some(err));
    }

    #[test]
    fn test_validate_ok_leaves_slot_alone() {
        let core = core(json!({"a": "x"}), &["a"]);
        assert!(core.validate_config().is_ok());
        assert!(core.last_error().is_none());
    }

    #[test]
    fn test_construction_does_not_validate() {
        let core = core(json!({}), &["api_key"]);
        assert!(core.last_error().is_none());
    }

    #[test]
    fn test_set_error_overwrites_and_clear_resets() {
        let core = core(json!({}), &[]);
        core.set_error("first", "one", Map::new());
        let second = core.set_error("second", "two", Map::new());
        assert_eq!(core.last_error(), Some(second));
        core.clear_error();
        assert!(core.last_error().is_none());
    }

    #[test]
    fn test_config_value_canonicalizes_key() {
        let core = core(json!({"Model": "gpt"}), &[]);
        assert_eq!(core.config_value("MODEL", json!("none")), json!("gpt"));
        assert_eq!(core.config_value("absent", json!(3)), json!(3));
    }
}
