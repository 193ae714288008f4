//! The evaluation harness core: episode loop, run record, configuration.
//!
//! # Architecture
//!
//! ```text
//! TaskSource → task → TaskRunner → TaskResult → EvaluationRun
//!                                                    │
//!                                   stats::aggregate ┴→ ReportEmitter
//! ```
//!
//! The orchestrator pulls tasks from a source, dispatches them to a
//! runner one at a time, and collects exactly one result per episode.
//! The finalized run is handed read-only to the aggregator and emitters.

pub mod config;
pub mod orchestrator;
pub mod result;

pub use config::HarnessConfig;
pub use orchestrator::Orchestrator;
pub use result::{EvaluationRun, TaskResult};
