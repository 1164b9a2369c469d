//! Sweepbound CLI Library
//!
//! Drives a verification sweep over a corpus: loads `sweep.toml`, applies
//! command line overrides, then runs BMC and IMC against every instance
//! through the resource-bounded oracle, writing the session report as it
//! goes.
//!
//! # Example
//!
//! ```ignore
//! fn main() -> anyhow::Result<()> {
//!     sweepbound_cli::run()
//! }
//! ```

mod config;
mod corpus;

pub use config::*;
pub use corpus::list_instances;

use anyhow::Context;
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::time::Instant;
use sweepbound_core::{BoundSequence, ConfigError, Instance, InstanceRecord, SweepExecutor};
use sweepbound_exec::ProcessOracle;
use sweepbound_report::{SessionHeader, SessionReport, build_summary, write_json_summary};
use tracing::info;

/// Sweepbound CLI arguments
#[derive(Parser, Debug, Default)]
#[command(name = "sweepbound")]
#[command(
    author,
    version,
    about = "Sweepbound - resource-bounded BMC/IMC verification sweeps"
)]
pub struct Cli {
    /// Corpus directory (overrides [corpus] directory)
    pub corpus: Option<PathBuf>,

    /// Configuration file (default: discover sweep.toml upwards)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Oracle executable
    #[arg(long)]
    pub oracle: Option<PathBuf>,

    /// Extra oracle argument placed before the bound; repeatable
    #[arg(long = "oracle-arg", allow_hyphen_values = true)]
    pub oracle_args: Vec<String>,

    /// Wall-clock limit per invocation (e.g., "300s", "5m")
    #[arg(long)]
    pub timeout: Option<String>,

    /// Memory ceiling in megabytes
    #[arg(long)]
    pub memory_max: Option<u64>,

    /// Memory enforcement: systemd-scope, rlimit, none
    #[arg(long)]
    pub enforcement: Option<String>,

    /// BMC depths, comma separated (e.g., "1,2,3")
    #[arg(long)]
    pub bmc_bounds: Option<String>,

    /// IMC inner bounds, comma separated; -1 is unbounded
    #[arg(long, allow_hyphen_values = true)]
    pub imc_bounds: Option<String>,

    /// IMC mode: single-shot, escalating
    #[arg(long)]
    pub imc_mode: Option<String>,

    /// Only run instances whose file name matches this regex
    #[arg(long)]
    pub filter: Option<String>,

    /// Process instances sorted by name
    #[arg(long)]
    pub sort: bool,

    /// Session report path
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Also write a JSON summary to this path
    #[arg(long)]
    pub json: Option<PathBuf>,

    /// Dry run - list instances without invoking the oracle
    #[arg(long)]
    pub dry_run: bool,

    /// Print the default sweep.toml and exit
    #[arg(long)]
    pub print_config: bool,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// No progress bar
    #[arg(short, long)]
    pub quiet: bool,
}

/// Run the Sweepbound CLI with the process arguments.
pub fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    run_with_cli(cli)
}

/// Run the Sweepbound CLI with pre-parsed arguments.
pub fn run_with_cli(cli: Cli) -> anyhow::Result<()> {
    if cli.print_config {
        print!("{}", SweepConfig::default_toml());
        return Ok(());
    }

    init_logging(cli.verbose);

    let file_config = match &cli.config {
        Some(path) => SweepConfig::load(path)
            .with_context(|| format!("Failed to load {}", path.display()))?,
        None => SweepConfig::discover().transpose()?.unwrap_or_default(),
    };
    let session = build_session_config(&cli, file_config)?;

    let instances = list_instances(&session.corpus)?;

    if cli.dry_run {
        println!("Sweep plan ({} instances):", instances.len());
        for instance in &instances {
            println!("├── {}", instance.name);
        }
        println!(
            "BMC: k = {} | IMC: inner bound = {} ({:?})",
            session.plan.bmc_bounds, session.plan.imc_inner_bounds, session.plan.imc_mode
        );
        return Ok(());
    }

    println!(
        "Running {} instances, timeout {:?}, memory ceiling {}M...\n",
        instances.len(),
        session.budget.timeout,
        session.budget.memory_max_mb
    );

    let records = run_session(&session, &instances, !cli.quiet)?;

    println!(
        "{} instances processed. Report written to: {}",
        records.len(),
        session.report_path.display()
    );
    Ok(())
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose {
        "sweepbound=debug"
    } else {
        "sweepbound=info"
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter));

    // A second initialisation (tests, embedding) keeps the first subscriber.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Build the session configuration by layering: sweep.toml → CLI overrides.
pub fn build_session_config(
    cli: &Cli,
    mut config: SweepConfig,
) -> Result<SessionConfig, ConfigError> {
    if let Some(dir) = &cli.corpus {
        config.corpus.directory = dir.clone();
    }
    if let Some(program) = &cli.oracle {
        config.oracle.program = program.clone();
    }
    if !cli.oracle_args.is_empty() {
        config.oracle.args = cli.oracle_args.clone();
    }
    if let Some(timeout) = &cli.timeout {
        config.budget.timeout = timeout.clone();
    }
    if let Some(mb) = cli.memory_max {
        config.budget.memory_max_mb = mb;
    }
    if let Some(enforcement) = &cli.enforcement {
        config.budget.enforcement = enforcement.parse()?;
    }
    if let Some(list) = &cli.bmc_bounds {
        config.bmc.bounds = BoundSequence::parse_list(list)?
            .iter()
            .map(i64::from)
            .collect();
    }
    if let Some(list) = &cli.imc_bounds {
        config.imc.inner_bounds = BoundSequence::parse_list(list)?
            .iter()
            .map(i64::from)
            .collect();
    }
    if let Some(mode) = &cli.imc_mode {
        config.imc.mode = mode.parse()?;
    }
    if let Some(filter) = &cli.filter {
        config.corpus.filter = Some(filter.clone());
    }
    if cli.sort {
        config.corpus.sort = true;
    }
    if let Some(output) = &cli.output {
        config.output.report = output.clone();
    }
    if let Some(json) = &cli.json {
        config.output.json = Some(json.clone());
    }

    SessionConfig::resolve(&config)
}

/// Run every instance in order, appending to the session report after each.
///
/// The report is truncated first, so an empty corpus yields a header-only
/// report. Only report I/O errors abort the session.
pub fn run_session(
    session: &SessionConfig,
    instances: &[Instance],
    show_progress: bool,
) -> anyhow::Result<Vec<InstanceRecord>> {
    let start_time = Instant::now();

    let header = SessionHeader {
        budget: session.budget,
        bmc_bounds: session.plan.bmc_bounds.clone(),
        imc_inner_bounds: session.plan.imc_inner_bounds.clone(),
    };
    let mut report = SessionReport::create(&session.report_path, &header).with_context(|| {
        format!(
            "Failed to create report {}",
            session.report_path.display()
        )
    })?;

    let oracle = ProcessOracle::new(session.oracle.clone(), session.budget, session.enforcement);
    let mut executor = SweepExecutor::new(session.plan.clone(), oracle);

    let pb = if show_progress {
        let pb = ProgressBar::new(instances.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template(
                    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}",
                )
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("#>-"),
        );
        pb
    } else {
        ProgressBar::hidden()
    };

    let mut records = Vec::with_capacity(instances.len());
    for instance in instances {
        pb.set_message(instance.name.clone());
        let record = executor.run_instance(instance);
        report.append(&record)?;
        records.push(record);
        pb.inc(1);
    }
    pb.finish_with_message("Complete");

    let total_duration_ms = start_time.elapsed().as_secs_f64() * 1000.0;
    if let Some(json_path) = &session.json_path {
        let summary = build_summary(&records, &session.plan, &session.budget, total_duration_ms);
        write_json_summary(&summary, json_path)?;
        info!(path = %json_path.display(), "JSON summary written");
    }

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sweepbound_core::{Bound, ImcMode};
    use sweepbound_exec::MemoryEnforcement;

    #[test]
    fn test_cli_parses_negative_bounds() {
        let cli = Cli::try_parse_from([
            "sweepbound",
            "corpus",
            "--imc-bounds",
            "-1",
            "--bmc-bounds",
            "1,2,3",
            "--imc-mode",
            "escalating",
        ])
        .unwrap();
        assert_eq!(cli.imc_bounds.as_deref(), Some("-1"));
        assert_eq!(cli.corpus, Some(PathBuf::from("corpus")));
    }

    #[test]
    fn test_cli_overrides_file_config() {
        let cli = Cli {
            corpus: Some(PathBuf::from("instances")),
            timeout: Some("2s".to_string()),
            memory_max: Some(512),
            enforcement: Some("none".to_string()),
            bmc_bounds: Some("1,2,3".to_string()),
            imc_bounds: Some("4,-1".to_string()),
            imc_mode: Some("escalating".to_string()),
            output: Some(PathBuf::from("report.txt")),
            ..Cli::default()
        };
        let session = build_session_config(&cli, SweepConfig::default()).unwrap();

        assert_eq!(session.corpus.directory, PathBuf::from("instances"));
        assert_eq!(session.budget.timeout, std::time::Duration::from_secs(2));
        assert_eq!(session.budget.memory_max_mb, 512);
        assert_eq!(session.enforcement, MemoryEnforcement::None);
        assert_eq!(session.plan.bmc_bounds.to_string(), "[1, 2, 3]");
        assert_eq!(session.plan.imc_inner_bounds.last(), Bound::Unbounded);
        assert_eq!(session.plan.imc_mode, ImcMode::Escalating);
        assert_eq!(session.report_path, PathBuf::from("report.txt"));
    }

    #[test]
    fn test_invalid_override_is_fatal() {
        let cli = Cli {
            bmc_bounds: Some("".to_string()),
            ..Cli::default()
        };
        assert!(matches!(
            build_session_config(&cli, SweepConfig::default()),
            Err(ConfigError::EmptyBoundSequence)
        ));

        let cli = Cli {
            imc_mode: Some("sometimes".to_string()),
            ..Cli::default()
        };
        assert!(build_session_config(&cli, SweepConfig::default()).is_err());
    }
}
