//! Error types for agent operations.
//!
//! These errors stay local to a single episode: the orchestrator converts
//! every one of them into a failed task result instead of propagating.

use thiserror::Error;

/// Errors that can occur while producing or executing a task.
#[derive(Debug, Error)]
pub enum AgentError {
    /// Error during task generation.
    #[error("Task generation failed: {0}")]
    GenerationFailed(String),

    /// A parametrized source ran out of caller-supplied tasks.
    #[error("Task list exhausted after {produced} tasks")]
    SourceExhausted { produced: usize },

    /// A device command could not be spawned or returned a failure.
    #[error("Device command failed: {0}")]
    DeviceCommand(String),

    /// Timeout during task execution.
    #[error("Task execution timed out after {seconds} seconds")]
    Timeout { seconds: u64 },

    /// Required task parameter missing.
    #[error("Missing required parameter '{0}'")]
    MissingParameter(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience result type for agent operations.
pub type AgentResult<T> = Result<T, AgentError>;
