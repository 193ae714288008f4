//! Configuration for a harness invocation.

use std::path::PathBuf;
use std::time::Duration;

use crate::agents::{AgentKind, ExecutorConfig};
use crate::error::ConfigError;
use crate::report::OutputFormat;

/// Configuration for one evaluation run.
#[derive(Debug, Clone)]
pub struct HarnessConfig {
    /// Number of episodes to run. Must be at least 1.
    pub episodes: usize,
    /// Which task source / task runner pairing to use.
    pub agent: AgentKind,
    /// Machine-readable artifact format.
    pub output_format: OutputFormat,
    /// Delay inserted between episodes (not charged to any episode).
    pub pacing: Duration,
    /// Directory for machine-readable artifacts.
    pub results_dir: PathBuf,
    /// Directory for human-readable reports.
    pub reports_dir: PathBuf,
    /// Device runner configuration.
    pub executor: ExecutorConfig,
    /// Optional seed for reproducible task generation.
    pub seed: Option<u64>,
}

impl HarnessConfig {
    /// Creates a configuration with design defaults.
    pub fn new(episodes: usize) -> Self {
        Self {
            episodes,
            agent: AgentKind::Orchestrator,
            output_format: OutputFormat::Json,
            pacing: Duration::from_secs(1),
            results_dir: PathBuf::from("./results"),
            reports_dir: PathBuf::from("./reports"),
            executor: ExecutorConfig::default(),
            seed: None,
        }
    }

    /// Sets the agent pairing.
    pub fn with_agent(mut self, agent: AgentKind) -> Self {
        self.agent = agent;
        self
    }

    /// Sets the machine artifact format.
    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.output_format = format;
        self
    }

    /// Sets the inter-episode pacing delay.
    pub fn with_pacing(mut self, pacing: Duration) -> Self {
        self.pacing = pacing;
        self
    }

    /// Sets the results directory.
    pub fn with_results_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.results_dir = dir.into();
        self
    }

    /// Sets the reports directory.
    pub fn with_reports_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.reports_dir = dir.into();
        self
    }

    /// Sets the device runner configuration.
    pub fn with_executor(mut self, executor: ExecutorConfig) -> Self {
        self.executor = executor;
        self
    }

    /// Sets the generation seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Rejects configurations the harness must not start with.
    ///
    /// Zero episodes is an error, not a no-op: "did not run" must be
    /// distinguishable from "ran zero episodes successfully".
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.episodes == 0 {
            return Err(ConfigError::InvalidEpisodeCount(self.episodes));
        }
        Ok(())
    }
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self::new(3)
    }
}
