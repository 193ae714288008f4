//! Human-readable Markdown report.
//!
//! Section order is fixed: Summary, Performance Metrics, Episode Table,
//! Detailed Statistics. Task names are capped at 30 characters and error
//! messages at 50, each marked with an ellipsis when cut.

use std::fmt::Write as _;

use crate::harness::result::EvaluationRun;
use crate::stats::RunStatistics;

use super::truncate;

const TASK_NAME_CAP: usize = 30;
const ERROR_CAP: usize = 50;

/// Renders the Markdown report for a finalized run.
pub fn render(run: &EvaluationRun, stats: &RunStatistics) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "# Evaluation Report\n");

    let _ = writeln!(out, "## Summary\n");
    let _ = writeln!(out, "- **Agent**: {}", run.agent_identity);
    let _ = writeln!(out, "- **Episodes**: {}", run.episodes.len());
    let _ = writeln!(out, "- **Total Time**: {:.2}s", run.total_time);
    let _ = writeln!(out, "- **Started**: {}\n", run.timestamp.to_rfc3339());

    let _ = writeln!(out, "## Performance Metrics\n");
    let _ = writeln!(
        out,
        "- **Success Rate**: {:.1}% ({}/{})",
        stats.success_rate * 100.0,
        stats.successful_tasks,
        stats.total_tasks
    );
    let _ = writeln!(
        out,
        "- **Average Execution Time**: {:.2}s",
        stats.average_execution_time
    );
    let _ = writeln!(
        out,
        "- **Flakiness Rate**: {:.1}% ({} of {} distinct tasks)\n",
        stats.flakiness_rate * 100.0,
        stats.flaky_tasks,
        stats.distinct_tasks
    );

    let _ = writeln!(out, "## Episode Table\n");
    let _ = writeln!(out, "| # | Task | Outcome | Time (s) | Error |");
    let _ = writeln!(out, "|---|------|---------|----------|-------|");
    for (ordinal, episode) in run.episodes.iter().enumerate() {
        let glyph = if episode.success { "✅" } else { "❌" };
        let _ = writeln!(
            out,
            "| {} | {} | {} | {:.2} | {} |",
            ordinal + 1,
            truncate(&episode.task_name, TASK_NAME_CAP),
            glyph,
            episode.execution_time,
            episode
                .error_message
                .as_deref()
                .map(|e| truncate(e, ERROR_CAP))
                .unwrap_or_default(),
        );
    }
    out.push('\n');

    let _ = writeln!(out, "## Detailed Statistics\n");
    let _ = writeln!(out, "- **Distinct Tasks**: {}", stats.distinct_tasks);
    let _ = writeln!(out, "- **Flaky Tasks**: {}", stats.flaky_tasks);
    if !stats.task_types.is_empty() {
        let _ = writeln!(out, "\n| Task Type | Count |");
        let _ = writeln!(out, "|-----------|-------|");
        let mut types: Vec<_> = stats.task_types.iter().collect();
        types.sort_by(|a, b| a.0.cmp(b.0));
        for (task_type, count) in types {
            let _ = writeln!(out, "| {} | {} |", task_type, count);
        }
    }

    out
}
