//! CSV artifact: one row per episode in dispatch order.

use std::fmt::Write as _;

use crate::harness::result::EvaluationRun;

const HEADER: &str = "task_id,task_name,success,execution_time,start_time,end_time,error_message";

/// Renders the CSV artifact for a finalized run.
///
/// `error_message` is the empty string for successful episodes.
pub fn render(run: &EvaluationRun) -> String {
    let mut out = String::new();
    out.push_str(HEADER);
    out.push('\n');

    for episode in &run.episodes {
        let _ = writeln!(
            out,
            "{},{},{},{},{},{},{}",
            escape(&episode.task_id),
            escape(&episode.task_name),
            episode.success,
            episode.execution_time,
            episode.start_time.to_rfc3339(),
            episode.end_time.to_rfc3339(),
            escape(episode.error_message.as_deref().unwrap_or("")),
        );
    }

    out
}

/// Quotes a field when it contains a delimiter, quote or newline.
fn escape(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}
