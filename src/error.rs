//! Error types for droid-eval operations.
//!
//! Two hard-failure categories exist at the harness boundary:
//! - Configuration errors, raised before any episode runs
//! - Reporting errors, raised after all episodes have executed
//!
//! Faults inside an episode (task source or task runner) never surface
//! here; they are recorded as failed task results and the run continues.

use thiserror::Error;

/// Errors that reject a harness invocation before any episode runs.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid episode count {0}: at least 1 episode is required")]
    InvalidEpisodeCount(usize),

    #[error("Unknown agent selector '{0}': expected 'generator', 'executor' or 'orchestrator'")]
    UnknownAgent(String),

    #[error("Unknown output format '{0}': expected 'json' or 'csv'")]
    UnknownFormat(String),
}

/// Errors that can occur while writing output artifacts.
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("Failed to create output directory '{path}': {source}")]
    DirectoryCreation {
        path: String,
        source: std::io::Error,
    },

    #[error("Failed to write artifact '{path}': {source}")]
    WriteFailed {
        path: String,
        source: std::io::Error,
    },

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
