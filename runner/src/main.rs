mod collector;
mod config;
mod render;

use std::path::PathBuf;
use std::process;

use clap::Parser;
use thiserror::Error;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use atplot_analysis::compare::{comparison_charts, enumerate_configurations, file_charts};
use atplot_analysis::database::Store;
use atplot_analysis::StoreError;
use atplot_ingest::parser::parse_result_file;
use atplot_ingest::IngestError;

use crate::config::{ChartFormat, ConfigErrors, Settings};
use crate::render::{RenderError, Renderer};

/// Aggregate access-time benchmark results and render comparison charts.
#[derive(Parser, Debug)]
#[command(name = "atplot", version)]
struct Cli {
    /// Working directory holding the benchmark result files
    directory: Option<PathBuf>,

    /// Chart artifact format
    #[arg(long, value_enum)]
    format: Option<ChartFormat>,

    /// Directory the chart artifacts are written to
    #[arg(long)]
    charts_dir: Option<PathBuf>,

    /// Plotting script the assembled charts are handed to
    #[arg(long)]
    plotter: Option<PathBuf>,

    /// Only write the chart data files, do not spawn the plotter
    #[arg(long)]
    data_only: bool,

    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Debug, Error)]
enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigErrors),
    #[error(transparent)]
    Ingest(#[from] IngestError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Render(#[from] RenderError),
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(error) = run(cli) {
        error!(error = ?error, "aborting batch: {error}");
        process::exit(1);
    }
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .init();
}

fn run(cli: Cli) -> Result<(), AppError> {
    let directory = cli.directory.unwrap_or_else(|| PathBuf::from("."));
    let mut settings = Settings::load(&directory)?;
    settings.apply_overrides(cli.format, cli.charts_dir, cli.plotter, cli.data_only);

    let results = collector::collect_results(&directory, &settings.glob)?;
    if results.is_empty() {
        warn!(directory = %directory.display(), "no result files found, nothing to do");
        return Ok(());
    }
    info!("Found {} result files", results.len());

    // the store is rebuilt from scratch on every run; ingestion of the
    // whole batch completes before any querying begins
    let mut store = Store::open_in_memory()?;
    for path in &results {
        let parsed = parse_result_file(path)?;
        store.ingest(&parsed)?;
    }

    let charts_dir = if settings.charts_dir.is_absolute() {
        settings.charts_dir.clone()
    } else {
        directory.join(&settings.charts_dir)
    };
    let renderer = Renderer::from_settings(&settings);

    let mut rendered = 0;
    for chart in file_charts(&store)? {
        renderer.render(&chart, &charts_dir)?;
        rendered += 1;
    }
    for configuration in enumerate_configurations(&store)? {
        let (totals, thread0) = comparison_charts(&store, &configuration)?;
        renderer.render(&totals, &charts_dir)?;
        renderer.render(&thread0, &charts_dir)?;
        rendered += 2;
    }

    info!("Rendered {rendered} charts into {}", charts_dir.display());

    Ok(())
}
