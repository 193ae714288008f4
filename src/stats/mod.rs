//! Pure statistics aggregation over an episode sequence.
//!
//! Nothing here mutates or re-executes anything: the aggregator reads the
//! finalized episode list and computes summary metrics on demand, so the
//! report can never drift from a set of live counters.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::harness::result::TaskResult;

/// Summary metrics for one evaluation run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunStatistics {
    /// Number of episodes in the run.
    pub total_tasks: usize,
    /// Episodes that succeeded.
    pub successful_tasks: usize,
    /// Episodes that failed.
    pub failed_tasks: usize,
    /// successful / total, 0 when the run is empty.
    pub success_rate: f64,
    /// Mean execution time in seconds, 0 when the run is empty.
    pub average_execution_time: f64,
    /// Distinct task names with mixed outcomes across repeated attempts.
    pub flaky_tasks: usize,
    /// flaky / distinct task names, 0 when there is no repetition.
    pub flakiness_rate: f64,
    /// Distinct task names seen in the run.
    pub distinct_tasks: usize,
    /// Occurrence count per task type (from each episode's metrics).
    pub task_types: HashMap<String, usize>,
}

/// Aggregates summary metrics from an ordered episode sequence.
///
/// Flakiness groups by nominal task identity, which is the task name: a
/// name is flaky when it was attempted more than once with at least one
/// success and at least one failure.
pub fn aggregate(episodes: &[TaskResult]) -> RunStatistics {
    let total_tasks = episodes.len();
    if total_tasks == 0 {
        return RunStatistics::default();
    }

    let successful_tasks = episodes.iter().filter(|e| e.success).count();
    let failed_tasks = total_tasks - successful_tasks;
    let total_time: f64 = episodes.iter().map(|e| e.execution_time).sum();

    // Per-name outcome tally: (attempts, successes).
    let mut by_name: HashMap<&str, (usize, usize)> = HashMap::new();
    let mut task_types: HashMap<String, usize> = HashMap::new();
    for episode in episodes {
        let entry = by_name.entry(episode.task_name.as_str()).or_insert((0, 0));
        entry.0 += 1;
        if episode.success {
            entry.1 += 1;
        }
        if let Some(task_type) = episode.task_type() {
            *task_types.entry(task_type.to_string()).or_insert(0) += 1;
        }
    }

    let distinct_tasks = by_name.len();
    let flaky_tasks = by_name
        .values()
        .filter(|(attempts, successes)| *attempts > 1 && *successes > 0 && *successes < *attempts)
        .count();

    RunStatistics {
        total_tasks,
        successful_tasks,
        failed_tasks,
        success_rate: successful_tasks as f64 / total_tasks as f64,
        average_execution_time: total_time / total_tasks as f64,
        flaky_tasks,
        flakiness_rate: if distinct_tasks > 0 {
            flaky_tasks as f64 / distinct_tasks as f64
        } else {
            0.0
        },
        distinct_tasks,
        task_types,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ok(name: &str) -> TaskResult {
        TaskResult::success(format!("id-{}", name), name)
    }

    fn ok_timed(name: &str, secs: f64) -> TaskResult {
        let mut result = ok(name);
        result.execution_time = secs;
        result
    }

    fn fail(name: &str) -> TaskResult {
        TaskResult::failure(format!("id-{}", name), name, "boom")
    }

    #[test]
    fn test_empty_sequence_yields_zeroes() {
        let stats = aggregate(&[]);
        assert_eq!(stats.total_tasks, 0);
        assert_eq!(stats.success_rate, 0.0);
        assert_eq!(stats.average_execution_time, 0.0);
        assert_eq!(stats.flakiness_rate, 0.0);
    }

    #[test]
    fn test_success_rate_is_exact_fraction() {
        let stats = aggregate(&[ok("A"), fail("B"), ok("C")]);
        assert_eq!(stats.total_tasks, 3);
        assert_eq!(stats.successful_tasks, 2);
        assert_eq!(stats.failed_tasks, 1);
        assert!((stats.success_rate - 2.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_average_execution_time() {
        let stats = aggregate(&[ok_timed("A", 1.0), ok_timed("B", 3.0)]);
        assert!((stats.average_execution_time - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_mixed_outcomes_on_same_name_are_flaky() {
        let stats = aggregate(&[ok("Ping"), fail("Ping"), ok("Other")]);
        assert_eq!(stats.flaky_tasks, 1);
        assert_eq!(stats.distinct_tasks, 2);
        assert!((stats.flakiness_rate - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_unanimous_outcomes_are_not_flaky() {
        // Repeated failures are consistent, not flaky.
        let stats = aggregate(&[fail("Ping"), fail("Ping")]);
        assert_eq!(stats.flaky_tasks, 0);
        assert_eq!(stats.flakiness_rate, 0.0);

        let stats = aggregate(&[ok("Ping"), ok("Ping")]);
        assert_eq!(stats.flakiness_rate, 0.0);
    }

    #[test]
    fn test_no_repetition_means_no_flakiness() {
        let stats = aggregate(&[ok("A"), fail("B"), ok("C")]);
        assert_eq!(stats.flaky_tasks, 0);
        assert_eq!(stats.flakiness_rate, 0.0);
    }

    #[test]
    fn test_task_type_breakdown() {
        let episodes = vec![
            ok("A").with_metric("task_type", "navigation"),
            ok("B").with_metric("task_type", "navigation"),
            fail("C").with_metric("task_type", "capture"),
            ok("D"), // no type recorded
        ];
        let stats = aggregate(&episodes);
        assert_eq!(stats.task_types.get("navigation"), Some(&2));
        assert_eq!(stats.task_types.get("capture"), Some(&1));
        assert_eq!(stats.task_types.len(), 2);
    }
}
