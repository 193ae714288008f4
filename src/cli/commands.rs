//! CLI command definitions for droid-eval.
//!
//! Two commands: `run` executes an evaluation and writes its artifacts,
//! `tasks` previews what the generative task source would produce.

use std::time::Duration;

use clap::Parser;
use tracing::{info, warn};

use crate::agents::{
    AdbTaskRunner, AgentKind, ExecutorConfig, FixedTaskSource, GenerationRunner,
    TaskRunner, TaskSource, TemplateTaskSource,
};
use crate::harness::{HarnessConfig, Orchestrator};
use crate::report::{OutputFormat, ReportEmitter};
use crate::stats;

/// Default machine artifact directory.
const DEFAULT_RESULTS_DIR: &str = "./results";

/// Default human report directory.
const DEFAULT_REPORTS_DIR: &str = "./reports";

/// Episode evaluation harness for device-automation agents.
#[derive(Parser)]
#[command(name = "droid-eval")]
#[command(about = "Run episode evaluations against device-automation agents")]
#[command(version)]
#[command(
    long_about = "droid-eval runs a configurable number of independent episodes against a\ntask source / task runner pairing, records every outcome, and emits JSON/CSV\nand Markdown reports.\n\nExample usage:\n  droid-eval run --episodes 10 --agent orchestrator --format json"
)]
pub struct Cli {
    /// The subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short, long, default_value = "info", global = true)]
    pub log_level: String,
}

/// Available CLI subcommands.
#[derive(clap::Subcommand)]
pub enum Commands {
    /// Run an evaluation and write result artifacts.
    Run(RunArgs),

    /// Preview generated task descriptions without executing anything.
    Tasks(TasksArgs),
}

/// Arguments for `droid-eval run`.
#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Number of episodes to run.
    #[arg(short = 'n', long, default_value = "3")]
    pub episodes: usize,

    /// Agent pairing: generator, executor or orchestrator.
    #[arg(short, long, default_value = "orchestrator")]
    pub agent: String,

    /// Machine artifact format: json or csv.
    #[arg(short, long, default_value = "json")]
    pub format: String,

    /// Directory for machine-readable artifacts.
    #[arg(long, default_value = DEFAULT_RESULTS_DIR)]
    pub results_dir: String,

    /// Directory for human-readable reports.
    #[arg(long, default_value = DEFAULT_REPORTS_DIR)]
    pub reports_dir: String,

    /// Path to the adb binary.
    #[arg(long, default_value = "adb")]
    pub adb_path: String,

    /// Target device serial (host:port), e.g. "localhost:5555".
    #[arg(long, env = "ANDROID_SERIAL", default_value = "localhost:5555")]
    pub device_serial: String,

    /// Fallback per-command timeout in seconds.
    #[arg(long, default_value = "60")]
    pub timeout_secs: u64,

    /// Delay between episodes in seconds.
    #[arg(long, default_value = "1.0")]
    pub pacing_secs: f64,

    /// Seed for reproducible task generation.
    #[arg(long)]
    pub seed: Option<u64>,
}

/// Arguments for `droid-eval tasks`.
#[derive(Parser, Debug)]
pub struct TasksArgs {
    /// Number of task descriptions to preview.
    #[arg(short = 'n', long, default_value = "5")]
    pub count: usize,

    /// Seed for reproducible task generation.
    #[arg(long)]
    pub seed: Option<u64>,
}

/// Parses CLI arguments from the process environment.
pub fn parse_cli() -> Cli {
    Cli::parse()
}

/// Parses and runs in one step.
pub async fn run() -> anyhow::Result<()> {
    run_with_cli(parse_cli()).await
}

/// Executes the parsed CLI command.
pub async fn run_with_cli(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Run(args) => handle_run(args).await,
        Commands::Tasks(args) => handle_tasks(args),
    }
}

/// Builds the source/runner pairing for an agent selector.
fn build_agents(
    kind: AgentKind,
    executor: &ExecutorConfig,
    seed: Option<u64>,
) -> (Box<dyn TaskSource>, Box<dyn TaskRunner>) {
    let generative = || -> Box<dyn TaskSource> {
        match seed {
            Some(seed) => Box::new(TemplateTaskSource::with_seed(seed)),
            None => Box::new(TemplateTaskSource::new()),
        }
    };

    match kind {
        AgentKind::Generator => (generative(), Box::new(GenerationRunner)),
        AgentKind::Executor => (
            Box::new(FixedTaskSource::placeholder()),
            Box::new(AdbTaskRunner::new(executor.clone())),
        ),
        AgentKind::Orchestrator => (
            generative(),
            Box::new(AdbTaskRunner::new(executor.clone())),
        ),
    }
}

async fn handle_run(args: RunArgs) -> anyhow::Result<()> {
    // Selector parsing happens before anything runs: unknown values are a
    // configuration error, not a runtime failure.
    let agent: AgentKind = args.agent.parse()?;
    let format: OutputFormat = args.format.parse()?;

    let executor = ExecutorConfig::new()
        .with_adb_path(&args.adb_path)
        .with_device_serial(&args.device_serial)
        .with_default_timeout(Duration::from_secs(args.timeout_secs));

    let mut config = HarnessConfig::new(args.episodes)
        .with_agent(agent)
        .with_format(format)
        .with_pacing(Duration::from_secs_f64(args.pacing_secs.max(0.0)))
        .with_results_dir(&args.results_dir)
        .with_reports_dir(&args.reports_dir)
        .with_executor(executor);
    if let Some(seed) = args.seed {
        config = config.with_seed(seed);
    }
    config.validate()?;

    let (source, runner) = build_agents(config.agent, &config.executor, config.seed);
    let mut orchestrator = Orchestrator::new(source, runner).with_pacing(config.pacing);

    // Ctrl-C cancels between episodes; completed episodes are kept.
    let cancel = orchestrator.cancellation_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received; finishing the current episode and stopping");
            cancel.cancel();
        }
    });

    info!(
        "Starting evaluation: {} episodes, agent {}",
        config.episodes, config.agent
    );

    let run = orchestrator.run(config.episodes).await?;
    let statistics = stats::aggregate(&run.episodes);
    let generation = orchestrator.generation_stats();

    // Summarize to stdout before touching the filesystem, so the run is
    // visible even if artifact writing fails.
    println!("\nCompleted {} episodes:", run.episode_count());
    for (i, episode) in run.episodes.iter().enumerate() {
        let glyph = if episode.success { "✅" } else { "❌" };
        println!(
            "  Episode {}: {} {} ({:.2}s)",
            i + 1,
            glyph,
            episode.task_name,
            episode.execution_time
        );
    }

    println!("\nFinal Statistics:");
    println!(
        "  Overall Success Rate: {:.2}%",
        statistics.success_rate * 100.0
    );
    println!(
        "  Average Execution Time: {:.2}s",
        statistics.average_execution_time
    );
    println!(
        "  Flakiness Rate: {:.2}%",
        statistics.flakiness_rate * 100.0
    );
    if generation.total_generated > 0 {
        println!(
            "  Tasks Generated: {} ({} unique)",
            generation.total_generated, generation.unique_tasks
        );
    }

    let emitter = ReportEmitter::new(&config.results_dir, &config.reports_dir);
    let paths = emitter.emit(&run, &statistics, config.output_format)?;

    println!("\nResults exported to: {}", paths.machine.display());
    println!("Report written to: {}", paths.human.display());

    Ok(())
}

fn handle_tasks(args: TasksArgs) -> anyhow::Result<()> {
    let mut source = match args.seed {
        Some(seed) => TemplateTaskSource::with_seed(seed),
        None => TemplateTaskSource::new(),
    };

    println!("Generated tasks:");
    for i in 0..args.count {
        let task = source.produce()?;
        println!("  {}. {} ({})", i + 1, task.name, task.task_type);
        println!("     Description: {}", task.description);
        println!(
            "     Parameters: {}",
            serde_json::to_string(&task.parameters)?
        );
        println!();
    }

    let stats = source.generation_stats();
    println!("Generation Statistics:");
    println!("  Total Generated: {}", stats.total_generated);
    println!("  Unique Tasks: {}", stats.unique_tasks);
    let mut types: Vec<_> = stats.task_types.iter().collect();
    types.sort_by(|a, b| a.0.cmp(b.0));
    let summary: Vec<String> = types
        .into_iter()
        .map(|(name, count)| format!("{}: {}", name, count))
        .collect();
    println!("  Task Types: {}", summary.join(", "));

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_agents_pairings() {
        let executor = ExecutorConfig::new();

        let (source, runner) = build_agents(AgentKind::Generator, &executor, Some(1));
        assert_eq!(source.name(), "templates");
        assert_eq!(runner.name(), "generation");

        let (source, runner) = build_agents(AgentKind::Executor, &executor, None);
        assert_eq!(source.name(), "fixed");
        assert_eq!(runner.name(), "adb");

        let (source, runner) = build_agents(AgentKind::Orchestrator, &executor, None);
        assert_eq!(source.name(), "templates");
        assert_eq!(runner.name(), "adb");
    }

    #[test]
    fn test_cli_parses_run_command() {
        let cli = Cli::try_parse_from([
            "droid-eval",
            "run",
            "--episodes",
            "7",
            "--agent",
            "generator",
            "--format",
            "csv",
        ])
        .unwrap();

        match cli.command {
            Commands::Run(args) => {
                assert_eq!(args.episodes, 7);
                assert_eq!(args.agent, "generator");
                assert_eq!(args.format, "csv");
            }
            _ => panic!("expected run command"),
        }
    }

    #[test]
    fn test_unknown_selectors_are_config_errors() {
        assert!("warrior".parse::<AgentKind>().is_err());
        assert!("yaml".parse::<OutputFormat>().is_err());
    }
}
