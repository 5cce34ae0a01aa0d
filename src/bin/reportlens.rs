//! ReportLens CLI — run the extraction pipeline over stored layout results.
//!
//! Usage:
//!   reportlens run <layout.json> [--report-id id] [--out dir] [--config file] [--json]
//!   reportlens batch <layout.json>... [--concurrency n] [--out dir] [--config file]

use clap::{Parser, Subcommand};
use reportlens::{
    DocumentProcessor, JobOutcome, JobRequest, JobRunner, JsonDirStore, JsonLayoutSource,
    PipelineBuilder, ReportLensConfig,
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "reportlens",
    version,
    about = "Structured extraction from corporate report layouts"
)]
struct Cli {
    /// YAML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Output directory for persisted artifacts (overrides config)
    #[arg(long, global = true)]
    out: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Process a single layout-analysis JSON file
    Run {
        /// Path to the layout JSON
        path: PathBuf,
        /// Report identifier (defaults to the file stem)
        #[arg(long)]
        report_id: Option<String>,
        /// Print the final document state as JSON
        #[arg(long)]
        json: bool,
    },
    /// Process several layout files concurrently
    Batch {
        #[arg(required = true)]
        paths: Vec<PathBuf>,
        /// Documents processed at once (overrides config)
        #[arg(long)]
        concurrency: Option<usize>,
    },
}

fn init_tracing(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn print_summary(outcome: &JobOutcome) {
    match (&outcome.confidence_score, &outcome.error) {
        (Some(score), _) => println!(
            "{:<24}  COMPLETED  {:>6.1}%  pages={} sections={} tables={} metrics={} insights={}",
            outcome.report_id,
            score * 100.0,
            outcome.counts.pages,
            outcome.counts.sections,
            outcome.counts.tables,
            outcome.counts.metrics,
            outcome.counts.insights,
        ),
        (None, error) => println!(
            "{:<24}  FAILED     {}",
            outcome.report_id,
            error.as_deref().unwrap_or("unknown error")
        ),
    }
}

fn build_processor(config: &ReportLensConfig, out: PathBuf) -> DocumentProcessor {
    let pipeline = Arc::new(PipelineBuilder::standard(config).compile());
    DocumentProcessor::new(Arc::new(JsonLayoutSource::new()), pipeline)
        .with_store(Arc::new(JsonDirStore::new(out)))
}

async fn cmd_run(
    config: &ReportLensConfig,
    out: PathBuf,
    path: PathBuf,
    report_id: Option<String>,
    json: bool,
) -> i32 {
    let report_id = report_id.unwrap_or_else(|| JobRequest::id_for_path(&path));
    let processor = build_processor(config, out);
    let outcome = processor.process(JobRequest::new(report_id, path)).await;

    match (&outcome.state, json) {
        (Some(state), true) => match serde_json::to_string_pretty(state) {
            Ok(body) => println!("{}", body),
            Err(e) => {
                eprintln!("Error: {}", e);
                return 1;
            }
        },
        _ => print_summary(&outcome),
    }

    if outcome.is_completed() {
        0
    } else {
        1
    }
}

async fn cmd_batch(
    config: &ReportLensConfig,
    out: PathBuf,
    paths: Vec<PathBuf>,
    concurrency: Option<usize>,
) -> i32 {
    let concurrency = concurrency.unwrap_or(config.worker.concurrency);
    let runner = JobRunner::new(build_processor(config, out)).with_concurrency(concurrency);

    let outcomes = runner.run_all(JobRequest::batch(paths)).await;

    for outcome in &outcomes {
        print_summary(outcome);
    }
    if outcomes.iter().all(JobOutcome::is_completed) {
        0
    } else {
        1
    }
}

fn main() {
    let cli = Cli::parse();

    let config = match ReportLensConfig::load_or_default(cli.config.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };
    init_tracing(&config.logging.filter);

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("failed to create tokio runtime: {}", e);
            std::process::exit(1);
        }
    };

    let out = cli.out.unwrap_or_else(|| config.output.dir.clone());
    let code = rt.block_on(async {
        match cli.command {
            Commands::Run {
                path,
                report_id,
                json,
            } => cmd_run(&config, out, path, report_id, json).await,
            Commands::Batch { paths, concurrency } => {
                cmd_batch(&config, out, paths, concurrency).await
            }
        }
    });
    std::process::exit(code);
}
