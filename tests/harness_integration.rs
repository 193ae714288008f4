//! End-to-end harness scenarios with stub agents.

use std::time::Duration;

use async_trait::async_trait;

use droid_eval::agents::{
    AgentResult, ScriptedTaskSource, TaskDescription, TaskRunner, TaskSource,
};
use droid_eval::error::ConfigError;
use droid_eval::harness::{Orchestrator, TaskResult};
use droid_eval::report::{OutputFormat, ReportEmitter};
use droid_eval::stats;

/// Source that produces "Task {i}" descriptions forever.
struct SequenceSource {
    produced: usize,
    name_for: fn(usize) -> String,
}

impl SequenceSource {
    fn new() -> Self {
        Self {
            produced: 0,
            name_for: |i| format!("Task {}", i),
        }
    }

    fn named(name_for: fn(usize) -> String) -> Self {
        Self {
            produced: 0,
            name_for,
        }
    }
}

impl TaskSource for SequenceSource {
    fn name(&self) -> &str {
        "sequence"
    }

    fn produce(&mut self) -> AgentResult<TaskDescription> {
        self.produced += 1;
        Ok(TaskDescription::new(
            format!("task-{}", self.produced),
            (self.name_for)(self.produced),
            "stub",
        ))
    }
}

/// Runner with a scripted outcome per episode; `false` entries model an
/// internal fault that the runner converts into a failed result at its
/// boundary.
struct ScriptedRunner {
    outcomes: Vec<bool>,
    executed: usize,
}

impl ScriptedRunner {
    fn new(outcomes: Vec<bool>) -> Self {
        Self {
            outcomes,
            executed: 0,
        }
    }
}

#[async_trait]
impl TaskRunner for ScriptedRunner {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn execute(&mut self, task: &TaskDescription) -> TaskResult {
        let outcome = self.outcomes.get(self.executed).copied().unwrap_or(true);
        self.executed += 1;
        if outcome {
            TaskResult::success(&task.id, &task.name).with_metric("task_type", "stub")
        } else {
            TaskResult::failure(&task.id, &task.name, "simulated device fault")
                .with_metric("task_type", "stub")
        }
    }
}

fn orchestrator(
    source: SequenceSource,
    runner: ScriptedRunner,
) -> Orchestrator<SequenceSource, ScriptedRunner> {
    Orchestrator::new(source, runner).with_pacing(Duration::from_millis(0))
}

#[tokio::test]
async fn deterministic_runner_yields_exactly_n_ordered_results() {
    for n in [1usize, 2, 5, 12] {
        let mut orch = orchestrator(SequenceSource::new(), ScriptedRunner::new(vec![]));
        let run = orch.run(n).await.unwrap();

        assert_eq!(run.episode_count(), n);
        for (i, episode) in run.episodes.iter().enumerate() {
            assert_eq!(episode.task_id, format!("task-{}", i + 1));
        }
    }
}

#[tokio::test]
async fn always_faulting_runner_never_aborts_the_run() {
    let n = 4;
    let mut orch = orchestrator(SequenceSource::new(), ScriptedRunner::new(vec![false; n]));
    let run = orch.run(n).await.unwrap();

    assert_eq!(run.episode_count(), n);
    for episode in &run.episodes {
        assert!(!episode.success);
        assert!(!episode.error_message.as_deref().unwrap_or("").is_empty());
    }

    let stats = stats::aggregate(&run.episodes);
    assert_eq!(stats.success_rate, 0.0);
}

#[tokio::test]
async fn three_episode_scenario_with_middle_failure() {
    let mut orch = orchestrator(
        SequenceSource::new(),
        ScriptedRunner::new(vec![true, false, true]),
    );
    let run = orch.run(3).await.unwrap();
    let statistics = stats::aggregate(&run.episodes);

    assert_eq!(statistics.total_tasks, 3);
    assert!((statistics.success_rate - 2.0 / 3.0).abs() < 1e-9);
    assert!(!run.episodes[1].success);
    assert!(run.episodes[1].error_message.is_some());

    let report = droid_eval::report::markdown::render(&run, &statistics);
    let rows: Vec<&str> = report
        .lines()
        .filter(|l| l.starts_with("| ") && !l.starts_with("| #"))
        .take(3)
        .collect();
    assert!(rows[0].contains("| 1 |") && rows[0].contains("✅"));
    assert!(rows[1].contains("| 2 |") && rows[1].contains("❌"));
    assert!(rows[2].contains("| 3 |") && rows[2].contains("✅"));
}

#[tokio::test]
async fn repeated_name_with_mixed_outcomes_is_flaky() {
    let mut orch = Orchestrator::new(
        SequenceSource::named(|_| "Ping".to_string()),
        ScriptedRunner::new(vec![true, false]),
    )
    .with_pacing(Duration::from_millis(0));
    let run = orch.run(2).await.unwrap();
    let statistics = stats::aggregate(&run.episodes);
    assert!(statistics.flakiness_rate > 0.0);

    // Same name, unanimous outcome: not flaky.
    let mut orch = Orchestrator::new(
        SequenceSource::named(|_| "Ping".to_string()),
        ScriptedRunner::new(vec![true, true]),
    )
    .with_pacing(Duration::from_millis(0));
    let run = orch.run(2).await.unwrap();
    assert_eq!(stats::aggregate(&run.episodes).flakiness_rate, 0.0);
}

#[tokio::test]
async fn zero_episodes_is_a_config_error_with_no_artifacts() {
    let results = tempfile::tempdir().unwrap();
    let reports = tempfile::tempdir().unwrap();

    let mut orch = orchestrator(SequenceSource::new(), ScriptedRunner::new(vec![]));
    let err = orch.run(0).await.unwrap_err();
    assert!(matches!(err, ConfigError::InvalidEpisodeCount(0)));

    // The emitter was never reached; both directories stay empty.
    assert_eq!(std::fs::read_dir(results.path()).unwrap().count(), 0);
    assert_eq!(std::fs::read_dir(reports.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn json_artifact_round_trips_every_field() {
    let results = tempfile::tempdir().unwrap();
    let reports = tempfile::tempdir().unwrap();

    let mut orch = orchestrator(
        SequenceSource::new(),
        ScriptedRunner::new(vec![true, false, true]),
    );
    let run = orch.run(3).await.unwrap();
    let statistics = stats::aggregate(&run.episodes);

    let emitter = ReportEmitter::new(results.path(), reports.path());
    let paths = emitter.emit(&run, &statistics, OutputFormat::Json).unwrap();

    let raw = std::fs::read_to_string(&paths.machine).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&raw).unwrap();
    let episodes: Vec<TaskResult> = serde_json::from_value(parsed["results"].clone()).unwrap();
    assert_eq!(episodes, run.episodes);

    assert_eq!(
        parsed["statistics"]["successful_tasks"],
        serde_json::json!(2)
    );
    assert_eq!(parsed["evaluation"]["agent_name"], "sequence+scripted");
}

#[tokio::test]
async fn csv_artifact_lists_episodes_in_dispatch_order() {
    let results = tempfile::tempdir().unwrap();
    let reports = tempfile::tempdir().unwrap();

    let mut orch = orchestrator(SequenceSource::new(), ScriptedRunner::new(vec![true, false]));
    let run = orch.run(2).await.unwrap();
    let statistics = stats::aggregate(&run.episodes);

    let emitter = ReportEmitter::new(results.path(), reports.path());
    let paths = emitter.emit(&run, &statistics, OutputFormat::Csv).unwrap();

    let raw = std::fs::read_to_string(&paths.machine).unwrap();
    let lines: Vec<&str> = raw.lines().collect();
    assert_eq!(
        lines[0],
        "task_id,task_name,success,execution_time,start_time,end_time,error_message"
    );
    assert!(lines[1].starts_with("task-1,Task 1,true,"));
    assert!(lines[2].starts_with("task-2,Task 2,false,"));
    assert!(lines[2].contains("simulated device fault"));
}

#[tokio::test]
async fn exhausted_scripted_source_fails_remaining_episodes() {
    let tasks = vec![
        TaskDescription::new("ext-1", "External 1", "generic"),
        TaskDescription::new("ext-2", "External 2", "generic"),
    ];
    let mut orch = Orchestrator::new(
        ScriptedTaskSource::new(tasks),
        ScriptedRunner::new(vec![]),
    )
    .with_pacing(Duration::from_millis(0));

    let run = orch.run(3).await.unwrap();
    assert_eq!(run.episode_count(), 3);
    assert!(run.episodes[0].success);
    assert!(run.episodes[1].success);

    let synthesized = &run.episodes[2];
    assert!(!synthesized.success);
    assert_eq!(synthesized.task_id, "episode_3_failed");
    assert_eq!(synthesized.task_name, "Episode 3");
    assert_eq!(synthesized.execution_time, 0.0);
}
