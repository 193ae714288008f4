//! Report emission for finalized evaluation runs.
//!
//! Two artifacts are produced from the same run + statistics pair: a
//! machine-readable file (JSON or CSV) and a human-readable Markdown
//! report. Both derive every shared field from the same inputs, so they
//! cannot disagree.

pub mod csv;
pub mod json;
pub mod markdown;

use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{ConfigError, ReportError};
use crate::harness::result::EvaluationRun;
use crate::stats::RunStatistics;

/// Machine artifact formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    Json,
    Csv,
}

impl OutputFormat {
    /// File extension for this format.
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Csv => "csv",
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.extension())
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "csv" => Ok(OutputFormat::Csv),
            other => Err(ConfigError::UnknownFormat(other.to_string())),
        }
    }
}

/// Paths of the artifacts written for one run.
#[derive(Debug, Clone)]
pub struct ReportPaths {
    /// Machine-readable artifact (JSON or CSV).
    pub machine: PathBuf,
    /// Human-readable Markdown report.
    pub human: PathBuf,
}

/// Writes run artifacts into timestamped files.
///
/// File names embed the run's start timestamp so successive or concurrent
/// runs never collide.
pub struct ReportEmitter {
    results_dir: PathBuf,
    reports_dir: PathBuf,
}

impl ReportEmitter {
    /// Creates an emitter targeting the given directories.
    pub fn new(results_dir: impl Into<PathBuf>, reports_dir: impl Into<PathBuf>) -> Self {
        Self {
            results_dir: results_dir.into(),
            reports_dir: reports_dir.into(),
        }
    }

    /// Writes the machine artifact and the Markdown report.
    pub fn emit(
        &self,
        run: &EvaluationRun,
        stats: &RunStatistics,
        format: OutputFormat,
    ) -> Result<ReportPaths, ReportError> {
        for dir in [&self.results_dir, &self.reports_dir] {
            fs::create_dir_all(dir).map_err(|e| ReportError::DirectoryCreation {
                path: dir.display().to_string(),
                source: e,
            })?;
        }

        let stamp = run.timestamp.format("%Y%m%d_%H%M%S");

        let machine = self
            .results_dir
            .join(format!("eval_results_{}.{}", stamp, format.extension()));
        let contents = match format {
            OutputFormat::Json => json::render(run, stats)?,
            OutputFormat::Csv => csv::render(run),
        };
        write_artifact(&machine, &contents)?;

        let human = self.reports_dir.join(format!("eval_report_{}.md", stamp));
        write_artifact(&human, &markdown::render(run, stats))?;

        info!(
            "Wrote artifacts: {} and {}",
            machine.display(),
            human.display()
        );

        Ok(ReportPaths { machine, human })
    }
}

fn write_artifact(path: &std::path::Path, contents: &str) -> Result<(), ReportError> {
    fs::write(path, contents).map_err(|e| ReportError::WriteFailed {
        path: path.display().to_string(),
        source: e,
    })
}

/// Truncates a string at `max` characters, marking the cut with an ellipsis.
pub(crate) fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let mut out: String = s.chars().take(max).collect();
        out.push_str("...");
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::harness::result::TaskResult;
    use crate::stats;

    #[test]
    fn test_output_format_parsing() {
        assert_eq!("json".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert_eq!("CSV".parse::<OutputFormat>().unwrap(), OutputFormat::Csv);
        assert!("xml".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn test_truncate_law() {
        let long = "a".repeat(45);
        let truncated = truncate(&long, 30);
        assert_eq!(truncated.len(), 33);
        assert!(truncated.ends_with("..."));
        assert_eq!(&truncated[..30], &long[..30]);

        // At or under the cap, the string is untouched.
        assert_eq!(truncate("short", 30), "short");
        assert_eq!(truncate(&"b".repeat(30), 30), "b".repeat(30));
    }

    #[test]
    fn test_emit_writes_both_artifacts() {
        let results = tempfile::tempdir().unwrap();
        let reports = tempfile::tempdir().unwrap();

        let mut run = EvaluationRun::new("templates+adb");
        run.record(TaskResult::success("a", "Open App"));
        let run = run.finalize(1.0);
        let stats = stats::aggregate(&run.episodes);

        let emitter = ReportEmitter::new(results.path(), reports.path());
        let paths = emitter.emit(&run, &stats, OutputFormat::Json).unwrap();

        assert!(paths.machine.exists());
        assert!(paths.human.exists());
        assert!(paths
            .machine
            .file_name()
            .unwrap()
            .to_string_lossy()
            .starts_with("eval_results_"));
        assert!(paths
            .human
            .file_name()
            .unwrap()
            .to_string_lossy()
            .ends_with(".md"));
    }

    #[test]
    fn test_emit_fails_on_unwritable_directory() {
        let run = EvaluationRun::new("templates+adb").finalize(0.0);
        let stats = stats::aggregate(&run.episodes);

        let emitter = ReportEmitter::new("/proc/no-such-dir/results", "/proc/no-such-dir/reports");
        assert!(matches!(
            emitter.emit(&run, &stats, OutputFormat::Json),
            Err(ReportError::DirectoryCreation { .. })
        ));
    }
}
