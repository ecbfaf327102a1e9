//! Workflow automation capability

use super::Options;
use crate::base::Adapter;
use crate::error::{AdapterResult, ErrorRecord, codes};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};
use thiserror::Error;

/// Lifecycle state of a workflow execution.
///
/// `pending -> running -> {completed | failed | cancelled}`. A pending
/// execution may also fail or be cancelled before it starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionStatus {
    /// Accepted, not started
    #[default]
    Pending,
    /// In progress
    Running,
    /// Finished successfully
    Completed,
    /// Finished with an error
    Failed,
    /// Stopped on request
    Cancelled,
}

impl ExecutionStatus {
    /// Whether no further transitions are possible.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Cancelled)
    }

    /// Whether moving from `self` to `next` is a legal step.
    pub fn can_transition_to(&self, next: ExecutionStatus) -> bool {
        match self {
            Self::Pending => matches!(next, Self::Running | Self::Failed | Self::Cancelled),
            Self::Running => next.is_terminal(),
            _ => false,
        }
    }

    /// Map an engine-reported status string, accepting common synonyms.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "pending" | "new" | "waiting" | "queued" => Some(Self::Pending),
            "running" | "active" | "in_progress" => Some(Self::Running),
            "completed" | "success" | "succeeded" | "finished" => Some(Self::Completed),
            "failed" | "error" | "crashed" => Some(Self::Failed),
            "cancelled" | "canceled" | "stopped" => Some(Self::Cancelled),
            _ => None,
        }
    }

    /// Lowercase name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for ExecutionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A triggered execution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Execution {
    /// Execution id
    pub execution_id: String,
    /// State right after triggering
    pub status: ExecutionStatus,
    /// Immediate result, when the engine returns one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
}

/// State of an execution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusReport {
    /// Current state
    pub status: ExecutionStatus,
    /// Completion fraction in `0.0..=1.0`, when known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress: Option<f64>,
    /// Result, once completed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    /// Failure description, once failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl StatusReport {
    /// Report with only a status.
    pub fn new(status: ExecutionStatus) -> Self {
        Self {
            status,
            progress: None,
            result: None,
            error: None,
        }
    }
}

/// One step of a workflow definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowStep {
    /// Unique step name
    pub name: String,
    /// Action the engine performs
    pub action: String,
    /// Names of earlier steps this one waits for
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub depends_on: Vec<String>,
    /// Action parameters
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub params: Map<String, Value>,
}

impl WorkflowStep {
    /// Step with no dependencies or parameters.
    pub fn new(name: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            action: action.into(),
            depends_on: Vec::new(),
            params: Map::new(),
        }
    }

    /// Add a dependency.
    pub fn after(mut self, step: impl Into<String>) -> Self {
        self.depends_on.push(step.into());
        self
    }

    /// Add a parameter.
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }
}

/// Why a step list was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StepError {
    /// No steps at all
    #[error("workflow has no steps")]
    Empty,

    /// A step has a blank name
    #[error("step {index} has no name")]
    UnnamedStep {
        /// Zero-based position
        index: usize,
    },

    /// Two steps share a name
    #[error("duplicate step name '{0}'")]
    DuplicateName(String),

    /// A step has a blank action
    #[error("step '{0}' has no action")]
    MissingAction(String),

    /// A dependency names a step that does not come earlier
    #[error("step '{step}' depends on unknown or later step '{dependency}'")]
    UnknownDependency {
        /// Dependent step
        step: String,
        /// Missing dependency
        dependency: String,
    },
}

impl From<StepError> for ErrorRecord {
    fn from(err: StepError) -> Self {
        ErrorRecord::new(codes::INVALID_STEPS, err.to_string())
    }
}

/// Check that a step list is well formed.
///
/// Steps must be non-empty, named uniquely, carry an action, and depend
/// only on steps that come before them.
pub fn validate_steps(steps: &[WorkflowStep]) -> Result<(), StepError> {
    if steps.is_empty() {
        return Err(StepError::Empty);
    }

    let mut seen: HashSet<&str> = HashSet::new();
    for (index, step) in steps.iter().enumerate() {
        let name = step.name.trim();
        if name.is_empty() {
            return Err(StepError::UnnamedStep { index });
        }
        if step.action.trim().is_empty() {
            return Err(StepError::MissingAction(name.to_string()));
        }
        if let Some(dependency) = step
            .depends_on
            .iter()
            .find(|dep| !seen.contains(dep.trim()))
        {
            return Err(StepError::UnknownDependency {
                step: name.to_string(),
                dependency: dependency.clone(),
            });
        }
        if !seen.insert(name) {
            return Err(StepError::DuplicateName(name.to_string()));
        }
    }
    Ok(())
}

/// Progress notification for one execution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressEvent {
    /// Execution id
    pub execution_id: String,
    /// State at the time of the event
    pub status: ExecutionStatus,
    /// Completion fraction, when known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress: Option<f64>,
}

/// Progress observer.
pub type ProgressCallback = Arc<dyn Fn(&ProgressEvent) + Send + Sync>;

/// Registered progress observers.
#[derive(Default)]
pub struct ProgressObservers {
    callbacks: Mutex<Vec<ProgressCallback>>,
}

impl ProgressObservers {
    /// Empty observer list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an observer.
    pub fn register(&self, callback: ProgressCallback) {
        self.callbacks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(callback);
    }

    /// Number of observers.
    pub fn len(&self) -> usize {
        self.callbacks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Whether there are no observers.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Deliver `event` to every observer.
    pub fn notify(&self, event: &ProgressEvent) {
        // Callbacks may register more observers; call them unlocked.
        let callbacks = self
            .callbacks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        for callback in callbacks {
            callback(event);
        }
    }
}

impl fmt::Debug for ProgressObservers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProgressObservers")
            .field("len", &self.len())
            .finish()
    }
}

/// Workflow automation.
#[async_trait]
pub trait Workflow: Adapter {
    /// Start an execution with `payload`.
    async fn trigger(&self, payload: &Value, options: &Options) -> AdapterResult<Execution>;

    /// Current state of an execution.
    async fn status(&self, execution_id: &str) -> AdapterResult<StatusReport>;

    /// Ask the engine to stop an execution.
    ///
    /// `true` is a local acknowledgment only; [`status`](Workflow::status)
    /// may keep reporting `running` until the engine catches up.
    async fn cancel(&self, execution_id: &str) -> bool;

    /// Replace the step definition. `false` when the steps are malformed.
    fn define_steps(&self, steps: Vec<WorkflowStep>) -> bool;

    /// Register a progress observer.
    fn on_progress(&self, callback: ProgressCallback);
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[rstest]
    #[case(ExecutionStatus::Pending, ExecutionStatus::Running, true)]
    #[case(ExecutionStatus::Pending, ExecutionStatus::Cancelled, true)]
    #[case(ExecutionStatus::Pending, ExecutionStatus::Completed, false)]
    #[case(ExecutionStatus::Running, ExecutionStatus::Completed, true)]
    #[case(ExecutionStatus::Running, ExecutionStatus::Pending, false)]
    #[case(ExecutionStatus::Completed, ExecutionStatus::Running, false)]
    #[case(ExecutionStatus::Cancelled, ExecutionStatus::Cancelled, false)]
    fn test_transitions(
        #[case] from: ExecutionStatus,
        #[case] to: ExecutionStatus,
        #[case] allowed: bool,
    ) {
        assert_eq!(from.can_transition_to(to), allowed);
    }

    #[rstest]
    #[case("success", Some(ExecutionStatus::Completed))]
    #[case(" Canceled ", Some(ExecutionStatus::Cancelled))]
    #[case("error", Some(ExecutionStatus::Failed))]
    #[case("new", Some(ExecutionStatus::Pending))]
    #[case("exploded", None)]
    fn test_parse(#[case] raw: &str, #[case] expected: Option<ExecutionStatus>) {
        assert_eq!(ExecutionStatus::parse(raw), expected);
    }

    #[test]
    fn test_validate_steps() {
        let good = vec![
            WorkflowStep::new("fetch", "http"),
            WorkflowStep::new("store", "db").after("fetch"),
        ];
        assert_eq!(validate_steps(&good), Ok(()));

        assert_eq!(validate_steps(&[]), Err(StepError::Empty));

        let forward = vec![
            WorkflowStep::new("store", "db").after("fetch"),
            WorkflowStep::new("fetch", "http"),
        ];
        assert!(matches!(
            validate_steps(&forward),
            Err(StepError::UnknownDependency { .. })
        ));

        let dup = vec![WorkflowStep::new("a", "x"), WorkflowStep::new("a", "y")];
        assert_eq!(validate_steps(&dup), Err(StepError::DuplicateName("a".into())));

        let unnamed = vec![WorkflowStep::new(" ", "x")];
        assert_eq!(validate_steps(&unnamed), Err(StepError::UnnamedStep { index: 0 }));

        let no_action = vec![WorkflowStep::new("a", "")];
        assert_eq!(validate_steps(&no_action), Err(StepError::MissingAction("a".into())));

        let self_dep = vec![WorkflowStep::new("a", "x").after("a")];
        assert!(validate_steps(&self_dep).is_err());
    }

    #[test]
    fn test_step_error_becomes_invalid_steps() {
        let record = ErrorRecord::from(StepError::Empty);
        assert_eq!(record.code, codes::INVALID_STEPS);
    }

    #[test]
    fn test_observers_all_notified() {
        let observers = ProgressObservers::new();
        let hits = Arc::new(AtomicUsize::new(0));
        for _ in 0..2 {
            let hits = hits.clone();
            observers.register(Arc::new(move |_event: &ProgressEvent| {
                hits.fetch_add(1, Ordering::SeqCst);
            }));
        }
        observers.notify(&ProgressEvent {
            execution_id: "e1".into(),
            status: ExecutionStatus::Running,
            progress: Some(0.5),
        });
        assert_eq!(hits.load(Ordering::SeqCst), 2);
        assert_eq!(observers.len(), 2);
    }
}
