//! droid-eval: episode evaluation harness for device-automation agents.
//!
//! This library runs a configurable number of independent episodes against
//! a pluggable task source / task runner pairing, records a structured
//! result for every episode (even on failure), aggregates per-run
//! statistics, and emits machine-readable and human-readable reports.

// Core modules
pub mod agents;
pub mod cli;
pub mod error;
pub mod harness;
pub mod report;
pub mod stats;

// Re-export commonly used error types
pub use error::{ConfigError, ReportError};
