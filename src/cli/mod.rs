//! Command-line interface for droid-eval.
//!
//! Provides commands for running evaluations and previewing generated
//! tasks.

mod commands;

pub use commands::{parse_cli, run, run_with_cli, Cli};
