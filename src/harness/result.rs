//! Episode results and the per-run record.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Immutable record of one episode's outcome.
///
/// Exactly one of these is produced per dispatched episode, success or
/// failure alike. `error_message` is populated if and only if the episode
/// failed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskResult {
    /// Unique identifier for the task instance.
    pub task_id: String,
    /// Human-readable task label.
    pub task_name: String,
    /// Outcome of the episode.
    pub success: bool,
    /// Wall-clock seconds between dispatch and completion. Never negative.
    pub execution_time: f64,
    /// Timestamp when execution started.
    pub start_time: DateTime<Utc>,
    /// Timestamp when execution finished. Always >= `start_time`.
    pub end_time: DateTime<Utc>,
    /// Failure description, present only when `success` is false.
    pub error_message: Option<String>,
    /// Open, task-specific metrics (e.g. `task_type`).
    #[serde(default)]
    pub metrics: HashMap<String, serde_json::Value>,
}

impl TaskResult {
    /// Creates a successful result with zero-length timing at `now`.
    pub fn success(task_id: impl Into<String>, task_name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            task_id: task_id.into(),
            task_name: task_name.into(),
            success: true,
            execution_time: 0.0,
            start_time: now,
            end_time: now,
            error_message: None,
            metrics: HashMap::new(),
        }
    }

    /// Creates a failed result carrying an error description.
    pub fn failure(
        task_id: impl Into<String>,
        task_name: impl Into<String>,
        error: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            task_id: task_id.into(),
            task_name: task_name.into(),
            success: false,
            execution_time: 0.0,
            start_time: now,
            end_time: now,
            error_message: Some(error.into()),
            metrics: HashMap::new(),
        }
    }

    /// Adds a metric entry.
    pub fn with_metric(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.metrics.insert(key.into(), value.into());
        self
    }

    /// Stamps the result with the orchestrator's own wall-clock measurement.
    ///
    /// The orchestrator is the timing authority: whatever a runner put in
    /// these fields is replaced by the dispatch-to-completion measurement.
    pub fn with_timing(
        mut self,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
        execution_time: f64,
    ) -> Self {
        self.start_time = start_time;
        self.end_time = end_time;
        self.execution_time = execution_time.max(0.0);
        self
    }

    /// Returns the task type recorded in the metrics, if any.
    pub fn task_type(&self) -> Option<&str> {
        self.metrics.get("task_type").and_then(|v| v.as_str())
    }
}

/// The complete, ordered record of one harness invocation.
///
/// Built episode-by-episode by the orchestrator, which owns it exclusively
/// until the loop exits; the aggregator and emitters only ever see a
/// shared reference to the finalized value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationRun {
    /// Name of the task source + task runner pairing used.
    pub agent_identity: String,
    /// Run start time; namespaces output artifacts.
    pub timestamp: DateTime<Utc>,
    /// Wall-clock seconds for the whole run, pacing and setup included.
    pub total_time: f64,
    /// Episode results in dispatch order.
    pub episodes: Vec<TaskResult>,
}

impl EvaluationRun {
    /// Creates an empty run starting now.
    pub fn new(agent_identity: impl Into<String>) -> Self {
        Self {
            agent_identity: agent_identity.into(),
            timestamp: Utc::now(),
            total_time: 0.0,
            episodes: Vec::new(),
        }
    }

    /// Appends an episode result, preserving dispatch order.
    pub fn record(&mut self, result: TaskResult) {
        self.episodes.push(result);
    }

    /// Number of episodes recorded so far.
    pub fn episode_count(&self) -> usize {
        self.episodes.len()
    }

    /// Freezes the run with its final wall-clock span.
    pub fn finalize(mut self, total_time: f64) -> Self {
        self.total_time = total_time.max(0.0);
        self
    }
}
