//! Agent capabilities for the evaluation harness.
//!
//! Two capabilities drive an episode:
//! 1. A [`TaskSource`] produces a task description
//! 2. A [`TaskRunner`] executes it and returns a task result
//!
//! A runner never propagates a fault past its boundary: `execute` returns
//! a plain [`TaskResult`], and a failed episode is an ordinary value with
//! `success == false`, not an error path.

pub mod error;
pub mod executor;
pub mod generator;
pub mod scripted;

use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::harness::result::TaskResult;

pub use error::{AgentError, AgentResult};
pub use executor::{AdbTaskRunner, ExecutorConfig};
pub use generator::{GenerationRunner, TemplateTaskSource};
pub use scripted::{FixedTaskSource, ScriptedTaskSource};

/// Agent pairings selectable at invocation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentKind {
    /// Template-based generation with a no-op runner (dry run).
    Generator,
    /// Fixed placeholder task driven through the device runner.
    Executor,
    /// Template-based generation driven through the device runner.
    Orchestrator,
}

impl AgentKind {
    /// Returns the display name for this agent pairing.
    pub fn display_name(&self) -> &'static str {
        match self {
            AgentKind::Generator => "Generator",
            AgentKind::Executor => "Executor",
            AgentKind::Orchestrator => "Orchestrator",
        }
    }
}

impl std::fmt::Display for AgentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

impl std::str::FromStr for AgentKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "generator" | "gen" => Ok(AgentKind::Generator),
            "executor" | "exec" => Ok(AgentKind::Executor),
            "orchestrator" | "orch" | "pair" => Ok(AgentKind::Orchestrator),
            other => Err(ConfigError::UnknownAgent(other.to_string())),
        }
    }
}

/// Description of one task instance handed to a runner.
///
/// Opaque to the harness beyond the identity, type and parameter fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskDescription {
    /// Unique task instance id within a run.
    pub id: String,
    /// Human-readable task name.
    pub name: String,
    /// Task category, e.g. "navigation" or "capture".
    #[serde(rename = "type")]
    pub task_type: String,
    /// What the task is supposed to do.
    pub description: String,
    /// Task-specific parameters.
    #[serde(default)]
    pub parameters: HashMap<String, serde_json::Value>,
    /// What a successful execution looks like.
    pub expected_outcome: String,
    /// Priority from 1 (low) to 5 (high).
    pub priority: u8,
    /// Per-task execution timeout in seconds.
    pub timeout_secs: u64,
    /// Number of retries the executing backend may attempt.
    pub retry_count: u32,
}

impl TaskDescription {
    /// Creates a task description with neutral priority and a one-minute timeout.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        task_type: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            task_type: task_type.into(),
            description: String::new(),
            parameters: HashMap::new(),
            expected_outcome: String::new(),
            priority: 3,
            timeout_secs: 60,
            retry_count: 0,
        }
    }

    /// Sets the description text.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Adds a parameter.
    pub fn with_parameter(
        mut self,
        key: impl Into<String>,
        value: impl Into<serde_json::Value>,
    ) -> Self {
        self.parameters.insert(key.into(), value.into());
        self
    }

    /// Sets the expected outcome text.
    pub fn with_expected_outcome(mut self, outcome: impl Into<String>) -> Self {
        self.expected_outcome = outcome.into();
        self
    }

    /// Returns a string parameter, if present.
    pub fn str_parameter(&self, key: &str) -> Option<&str> {
        self.parameters.get(key).and_then(|v| v.as_str())
    }
}

/// Counters describing what a generative source has produced so far.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenerationStats {
    /// Total task descriptions produced.
    pub total_generated: usize,
    /// Distinct task names produced.
    pub unique_tasks: usize,
    /// Occurrence count per task type.
    pub task_types: HashMap<String, usize>,
}

/// Capability that produces task descriptions.
///
/// Implementations may generate tasks from templates or replay an
/// externally supplied list; either way the returned `id` must be unique
/// within a run.
pub trait TaskSource: Send {
    /// Short name used in the run's agent identity.
    fn name(&self) -> &str;

    /// Produces the next task description.
    fn produce(&mut self) -> AgentResult<TaskDescription>;

    /// Counters for the statistics block; empty for non-generative sources.
    fn generation_stats(&self) -> GenerationStats {
        GenerationStats::default()
    }
}

/// Capability that executes a task description.
///
/// `execute` is infallible by construction: every internal fault (timeout,
/// connectivity, command failure) must be converted into a `TaskResult`
/// with `success == false` and a populated `error_message`.
#[async_trait]
pub trait TaskRunner: Send {
    /// Short name used in the run's agent identity.
    fn name(&self) -> &str;

    /// Executes a task and reports the outcome as plain data.
    async fn execute(&mut self, task: &TaskDescription) -> TaskResult;
}

impl TaskSource for Box<dyn TaskSource> {
    fn name(&self) -> &str {
        self.as_ref().name()
    }

    fn produce(&mut self) -> AgentResult<TaskDescription> {
        self.as_mut().produce()
    }

    fn generation_stats(&self) -> GenerationStats {
        self.as_ref().generation_stats()
    }
}

#[async_trait]
impl TaskRunner for Box<dyn TaskRunner> {
    fn name(&self) -> &str {
        self.as_ref().name()
    }

    async fn execute(&mut self, task: &TaskDescription) -> TaskResult {
        self.as_mut().execute(task).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_agent_kind_parsing() {
        assert_eq!("generator".parse::<AgentKind>().unwrap(), AgentKind::Generator);
        assert_eq!("EXEC".parse::<AgentKind>().unwrap(), AgentKind::Executor);
        assert_eq!("orchestrator".parse::<AgentKind>().unwrap(), AgentKind::Orchestrator);
        assert!("robot".parse::<AgentKind>().is_err());
    }

    #[test]
    fn test_agent_kind_display() {
        assert_eq!(AgentKind::Orchestrator.to_string(), "Orchestrator");
    }

    #[test]
    fn test_task_description_builder() {
        let task = TaskDescription::new("t-1", "Open App", "navigation")
            .with_description("Open a specific application on the device")
            .with_parameter("package_name", "com.android.settings")
            .with_expected_outcome("Settings app should open successfully");

        assert_eq!(task.priority, 3);
        assert_eq!(task.timeout_secs, 60);
        assert_eq!(task.str_parameter("package_name"), Some("com.android.settings"));
        assert_eq!(task.str_parameter("missing"), None);
    }

    #[test]
    fn test_task_type_serialized_as_type() {
        let task = TaskDescription::new("t-2", "Ping", "network");
        let json = serde_json::to_value(&task).unwrap();
        assert_eq!(json["type"], "network");
    }
}
