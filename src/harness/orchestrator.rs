//! The episode run-loop.
//!
//! Episodes execute strictly sequentially: the runner typically drives a
//! single shared device session that cannot accept overlapping commands.
//! Dispatch order, result sequence order and reported ordinal order are
//! the same, end to end.

use std::time::{Duration, Instant};

use chrono::Utc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::agents::{GenerationStats, TaskRunner, TaskSource};
use crate::error::ConfigError;

use super::result::{EvaluationRun, TaskResult};

/// Owns the episode loop for one evaluation run.
///
/// The orchestrator exclusively owns the task source, the task runner and
/// the growing [`EvaluationRun`] for the run's duration.
pub struct Orchestrator<S: TaskSource, R: TaskRunner> {
    source: S,
    runner: R,
    pacing: Duration,
    cancel: CancellationToken,
}

impl<S: TaskSource, R: TaskRunner> Orchestrator<S, R> {
    /// Creates an orchestrator with the design-default 1s pacing delay.
    pub fn new(source: S, runner: R) -> Self {
        Self {
            source,
            runner,
            pacing: Duration::from_secs(1),
            cancel: CancellationToken::new(),
        }
    }

    /// Sets the inter-episode pacing delay.
    pub fn with_pacing(mut self, pacing: Duration) -> Self {
        self.pacing = pacing;
        self
    }

    /// Token that cancels the run between episodes (never mid-episode).
    ///
    /// On cancellation the run finalizes with whatever episodes have
    /// already completed; early termination, not run failure.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// The source + runner pairing name recorded on the run.
    pub fn agent_identity(&self) -> String {
        format!("{}+{}", self.source.name(), self.runner.name())
    }

    /// Generation counters from the task source.
    pub fn generation_stats(&self) -> GenerationStats {
        self.source.generation_stats()
    }

    /// Runs `episodes` episodes and returns the finalized run record.
    ///
    /// Exactly one [`TaskResult`] is recorded per dispatched episode; a
    /// source or runner fault never aborts the remaining episodes.
    pub async fn run(&mut self, episodes: usize) -> Result<EvaluationRun, ConfigError> {
        if episodes == 0 {
            return Err(ConfigError::InvalidEpisodeCount(episodes));
        }

        let mut run = EvaluationRun::new(self.agent_identity());
        let run_start = Instant::now();

        info!("Running {} episodes with agent {}", episodes, run.agent_identity);

        for episode in 1..=episodes {
            if self.cancel.is_cancelled() {
                info!(
                    "Run cancelled after {} of {} episodes; finalizing early",
                    run.episode_count(),
                    episodes
                );
                break;
            }

            info!("Episode {}/{}", episode, episodes);
            let result = self.run_episode(episode).await;
            info!(
                "Episode completed: {}, Time: {:.2}s",
                result.success, result.execution_time
            );
            run.record(result);

            // Give the shared device time to settle before the next
            // episode. Not charged to any episode's execution_time.
            if episode < episodes {
                tokio::select! {
                    _ = tokio::time::sleep(self.pacing) => {}
                    _ = self.cancel.cancelled() => {}
                }
            }
        }

        info!("Completed {} episodes", run.episode_count());
        Ok(run.finalize(run_start.elapsed().as_secs_f64()))
    }

    /// Runs one episode: produce a task, dispatch it, stamp the timing.
    async fn run_episode(&mut self, episode: usize) -> TaskResult {
        let task = match self.source.produce() {
            Ok(task) => task,
            Err(e) => {
                // A source fault is an episode failure, not a harness
                // failure: synthesize the result and keep going.
                error!("Episode {} failed: {}", episode, e);
                return TaskResult::failure(
                    format!("episode_{}_failed", episode),
                    format!("Episode {}", episode),
                    e.to_string(),
                );
            }
        };

        debug!("Dispatching task: {} (ID: {})", task.name, task.id);

        let started_at = Utc::now();
        let dispatch = Instant::now();
        let result = self.runner.execute(&task).await;
        let elapsed = dispatch.elapsed().as_secs_f64();

        result.with_timing(started_at, Utc::now(), elapsed)
    }
}
