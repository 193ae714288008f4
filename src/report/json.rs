//! JSON artifact: run metadata, full episode list, statistics block.

use serde_json::json;

use crate::harness::result::EvaluationRun;
use crate::stats::RunStatistics;

/// Renders the JSON artifact for a finalized run.
///
/// Episodes serialize through their serde representation, so re-parsing
/// the `results` array reproduces every field exactly. Timestamps are
/// ISO-8601 strings via chrono's serde support.
pub fn render(run: &EvaluationRun, stats: &RunStatistics) -> Result<String, serde_json::Error> {
    let document = json!({
        "evaluation": {
            "timestamp": run.timestamp,
            "total_episodes": run.episodes.len(),
            "agent_name": run.agent_identity,
            "total_time": run.total_time,
        },
        "results": run.episodes,
        "statistics": stats,
    });

    serde_json::to_string_pretty(&document)
}
