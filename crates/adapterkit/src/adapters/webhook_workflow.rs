//! Webhook-triggered workflow engine (n8n style)

use super::{id_string, invalid_response, join_path, request_options};
use crate::base::{Adapter, AdapterCore, AdapterCoreBuilder};
use crate::capabilities::{
    Execution, ExecutionStatus, Options, ProgressCallback, ProgressEvent, ProgressObservers,
    StatusReport, Workflow, WorkflowStep, validate_steps,
};
use crate::capability::{CapabilityDescriptor, Tier};
use crate::error::{AdapterResult, ErrorRecord, codes, context};
use crate::http::RequestOptions;
use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use uuid::Uuid;

const API_KEY_HEADER: &str = "X-N8N-API-KEY";

#[derive(Debug, Clone)]
struct TrackedExecution {
    status: ExecutionStatus,
    result: Option<Value>,
    error: Option<String>,
}

/// Workflow adapter that starts executions through a webhook and, when an
/// engine API is configured, polls and stops them through it.
///
/// Configuration:
/// - `webhook_url` (required): URL receiving the trigger payload
/// - `api_url`: engine API base, e.g. `https://n8n.example.com/api/v1`
/// - `api_key`: sent as `X-N8N-API-KEY` to the engine API
///
/// Without an engine API, status comes from locally tracked state only.
pub struct WebhookWorkflow {
    core: AdapterCore,
    api_key: Option<SecretString>,
    executions: Mutex<HashMap<String, TrackedExecution>>,
    steps: Mutex<Vec<WorkflowStep>>,
    observers: ProgressObservers,
}

impl WebhookWorkflow {
    /// Descriptor shared by every instance.
    pub fn descriptor() -> CapabilityDescriptor {
        CapabilityDescriptor::new("webhook-workflow", env!("CARGO_PKG_VERSION"), Tier::Flagship)
            .with_capabilities(["trigger", "status", "cancel", "define_steps", "progress"])
    }

    /// Core builder with this adapter's descriptor and required fields.
    pub fn core_builder() -> AdapterCoreBuilder {
        AdapterCore::builder(Self::descriptor()).required(["webhook_url"])
    }

    /// Build from raw configuration with the default transport and no logging.
    pub fn new(raw: &Map<String, Value>) -> AdapterResult<Self> {
        Ok(Self::from_core(Self::core_builder().config(raw).build()?))
    }

    /// Wrap an already built core.
    pub fn from_core(core: AdapterCore) -> Self {
        let api_key = core
            .config()
            .get_str("api_key")
            .filter(|key| !key.is_empty())
            .map(|key| SecretString::from(key.to_string()));
        Self {
            core,
            api_key,
            executions: Mutex::new(HashMap::new()),
            steps: Mutex::new(Vec::new()),
            observers: ProgressObservers::new(),
        }
    }

    /// Steps accepted by the last successful [`Workflow::define_steps`].
    pub fn steps(&self) -> Vec<WorkflowStep> {
        self.steps
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn executions(&self) -> MutexGuard<'_, HashMap<String, TrackedExecution>> {
        self.executions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn api_url(&self, segments: &[&str]) -> Option<AdapterResult<String>> {
        let base = self.core.config().get_str("api_url").filter(|u| !u.is_empty())?;
        Some(join_path(base, segments).map_err(|err| self.core.record(err)))
    }

    fn api_request(&self, method: &str) -> AdapterResult<RequestOptions> {
        let mut request = request_options(&self.core, &Options::new())?.method(method);
        if let Some(key) = &self.api_key {
            request = request.header(API_KEY_HEADER, key.expose_secret());
        }
        Ok(request)
    }

    /// Move a tracked execution towards `next`, passing through `running`
    /// when it jumps straight from `pending` to a terminal state. Observers
    /// hear about every state actually entered.
    fn advance(&self, execution_id: &str, next: ExecutionStatus, report: &StatusReport) {
        let mut entered = Vec::new();
        {
            let mut executions = self.executions();
            let Some(tracked) = executions.get_mut(execution_id) else {
                return;
            };
            if tracked.status == ExecutionStatus::Pending
                && next.is_terminal()
                && !tracked.status.can_transition_to(next)
            {
                tracked.status = ExecutionStatus::Running;
                entered.push(ExecutionStatus::Running);
            }
            if tracked.status.can_transition_to(next) {
                tracked.status = next;
                entered.push(next);
            }
            if report.result.is_some() {
                tracked.result.clone_from(&report.result);
            }
            if report.error.is_some() {
                tracked.error.clone_from(&report.error);
            }
        }

        for status in entered {
            self.observers.notify(&ProgressEvent {
                execution_id: execution_id.to_string(),
                status,
                progress: report.progress,
            });
        }
    }

    fn unknown_execution(&self, execution_id: &str) -> ErrorRecord {
        self.core.record(
            ErrorRecord::new(
                codes::UNKNOWN_EXECUTION,
                format!("Unknown execution '{execution_id}'"),
            )
            .with_context("execution_id", execution_id),
        )
    }
}

/// Read an engine status document.
fn parse_report(body: &Value) -> StatusReport {
    let status = body
        .get("status")
        .and_then(Value::as_str)
        .and_then(ExecutionStatus::parse)
        .unwrap_or_else(|| match body.get("finished").and_then(Value::as_bool) {
            Some(true) => ExecutionStatus::Completed,
            _ => ExecutionStatus::Running,
        });

    let error = body
        .get("error")
        .and_then(|err| err.get("message").or(Some(err)))
        .and_then(Value::as_str)
        .map(str::to_string);

    StatusReport {
        status,
        progress: body.get("progress").and_then(Value::as_f64),
        result: body.get("data").filter(|data| !data.is_null()).cloned(),
        error,
    }
}

fn execution_id_of(body: &Value) -> Option<String> {
    ["executionId", "execution_id", "id"]
        .iter()
        .find_map(|key| body.get(*key).and_then(id_string))
}

#[async_trait]
impl Workflow for WebhookWorkflow {
    async fn trigger(&self, payload: &Value, options: &Options) -> AdapterResult<Execution> {
        let url = self
            .core
            .config()
            .get_str("webhook_url")
            .unwrap_or_default()
            .to_string();

        let mut body = payload.clone();
        let steps = self.steps();
        if let Value::Object(map) = &mut body
            && !steps.is_empty()
            && !map.contains_key("steps")
        {
            let steps = serde_json::to_value(&steps)
                .map_err(|e| self.core.record(invalid_response(&url, e)))?;
            map.insert("steps".to_string(), steps);
        }

        let request = request_options(&self.core, options)?
            .method("POST")
            .json_body(body);
        let response = self.core.execute(&url, &request).await?;

        let reply: Value = if response.body.is_empty() {
            Value::Null
        } else {
            response
                .json()
                .unwrap_or_else(|_| Value::from(response.text_lossy()))
        };
        let execution_id = execution_id_of(&reply).unwrap_or_else(|| Uuid::new_v4().to_string());
        let status = reply
            .get("status")
            .and_then(Value::as_str)
            .and_then(ExecutionStatus::parse)
            .unwrap_or(ExecutionStatus::Running);
        let result = (!reply.is_null()).then_some(reply);

        self.executions().insert(
            execution_id.clone(),
            TrackedExecution {
                status: ExecutionStatus::Pending,
                result: None,
                error: None,
            },
        );
        let report = StatusReport {
            result: result.clone(),
            ..StatusReport::new(status)
        };
        self.advance(&execution_id, status, &report);

        self.core.logger().info(
            "Workflow triggered",
            context([
                ("execution_id", Value::from(execution_id.as_str())),
                ("status", Value::from(status.as_str())),
            ]),
        );

        let status = self
            .executions()
            .get(&execution_id)
            .map_or(status, |tracked| tracked.status);
        Ok(Execution {
            execution_id,
            status,
            result,
        })
    }

    async fn status(&self, execution_id: &str) -> AdapterResult<StatusReport> {
        if let Some(url) = self.api_url(&["executions", execution_id]) {
            let url = url?;
            let request = self.api_request("GET")?;
            let response = self.core.execute(&url, &request).await?;
            let body: Value = response
                .json()
                .map_err(|e| self.core.record(invalid_response(&url, e)))?;
            let report = parse_report(&body);
            self.advance(execution_id, report.status, &report);
            return Ok(report);
        }

        let tracked = self.executions().get(execution_id).cloned();
        match tracked {
            Some(tracked) => Ok(StatusReport {
                status: tracked.status,
                progress: None,
                result: tracked.result,
                error: tracked.error,
            }),
            None => Err(self.unknown_execution(execution_id)),
        }
    }

    async fn cancel(&self, execution_id: &str) -> bool {
        let known = self.executions().get(execution_id).map(|t| t.status);
        let acknowledged = match known {
            Some(status) if status.is_terminal() => return false,
            Some(_) => {
                self.advance(
                    execution_id,
                    ExecutionStatus::Cancelled,
                    &StatusReport::new(ExecutionStatus::Cancelled),
                );
                true
            }
            None => false,
        };

        let Some(Ok(url)) = self.api_url(&["executions", execution_id, "stop"]) else {
            return acknowledged;
        };
        let stopped = match self.api_request("POST") {
            Ok(request) => self.core.execute(&url, &request).await.is_ok(),
            Err(_) => false,
        };
        if !stopped {
            self.core.logger().warning(
                "Engine did not confirm cancellation",
                context([("execution_id", Value::from(execution_id))]),
            );
        }
        acknowledged || stopped
    }

    fn define_steps(&self, steps: Vec<WorkflowStep>) -> bool {
        if let Err(err) = validate_steps(&steps) {
            self.core
                .record(ErrorRecord::from(err).with_context("count", steps.len()));
            return false;
        }
        *self.steps.lock().unwrap_or_else(PoisonError::into_inner) = steps;
        true
    }

    fn on_progress(&self, callback: ProgressCallback) {
        self.observers.register(callback);
    }
}

impl Adapter for WebhookWorkflow {
    fn core(&self) -> &AdapterCore {
        &self.core
    }
}
