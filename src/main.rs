use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use striking_distance::{
    build_extractor,
    config::{parse_lines, AnalysisConfig, FetchBackend},
    ingest::read_performance_file,
    ops::telemetry,
    report::{write_failures, write_report, OutputFormat},
    AnalysisError, CancellationFlag, Orchestrator, ProgressEvent,
};
use tokio::sync::mpsc;
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "striking-distance")]
#[command(about = "Find striking-distance keywords missing from on-page SEO fields")]
#[command(version)]
struct Cli {
    /// Search Console performance export (CSV or TSV)
    gsc_file: PathBuf,

    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Branded term to exclude (repeatable)
    #[arg(long = "brand")]
    brands: Vec<String>,

    /// File with one branded term per line
    #[arg(long)]
    brands_file: Option<PathBuf>,

    /// URL to exclude by exact match (repeatable)
    #[arg(long = "exclude")]
    excludes: Vec<String>,

    /// File with one excluded URL per line
    #[arg(long)]
    exclude_file: Option<PathBuf>,

    /// Keywords listed per URL
    #[arg(long)]
    top_n: Option<usize>,

    /// Lowest position considered striking distance
    #[arg(long)]
    min_position: Option<u32>,

    /// Highest position considered striking distance
    #[arg(long)]
    max_position: Option<u32>,

    /// Keep rows that have no position value
    #[arg(long)]
    keep_missing_position: bool,

    /// Drop rows with fewer clicks
    #[arg(long)]
    min_clicks: Option<u64>,

    /// Page fetching backend
    #[arg(long, value_enum)]
    backend: Option<BackendArg>,

    /// Re-fetch every page instead of reusing cached extractions
    #[arg(long)]
    no_cache: bool,

    /// Show the browser window
    #[arg(long)]
    headed: bool,

    /// Page load budget in seconds
    #[arg(long)]
    max_wait: Option<u64>,

    /// Pages extracted concurrently
    #[arg(long)]
    batch_size: Option<usize>,

    /// Base URL for path-only URLs in the export
    #[arg(long)]
    site_root: Option<String>,

    /// Directory for the on-disk extraction cache
    #[arg(long)]
    cache_dir: Option<PathBuf>,

    /// Report destination (stdout when omitted)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Failure log destination
    #[arg(long)]
    failures: Option<PathBuf>,

    /// Output format for the report and failure log
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Csv)]
    format: OutputFormat,

    /// Write Prometheus metrics to this file at the end of the run
    #[arg(long)]
    metrics_out: Option<PathBuf>,

    /// Log output format
    #[arg(long, value_enum, default_value_t = LogFormat::Json)]
    log_format: LogFormat,

    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Clone, Copy, ValueEnum)]
enum BackendArg {
    Browser,
    Http,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum LogFormat {
    Json,
    Pretty,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    match cli.log_format {
        LogFormat::Json => telemetry::init_tracing_with_level(level),
        LogFormat::Pretty => telemetry::init_tracing_pretty(level),
    }

    let format = cli.format;
    let config = build_config(&cli)?;

    let data = read_performance_file(&cli.gsc_file)
        .with_context(|| format!("Failed to read {}", cli.gsc_file.display()))?;
    if !data.has_position_column {
        warn!("Export has no position column; every row lacks a position");
    }

    let extractor = build_extractor(&config.extraction).context("Failed to set up page fetching")?;

    let cancel = CancellationFlag::new();
    let ctrl_c_flag = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received, stopping after the current batch");
            ctrl_c_flag.cancel();
        }
    });

    let (progress_tx, mut progress_rx) = mpsc::unbounded_channel::<ProgressEvent>();
    let progress_task = tokio::spawn(async move {
        while let Some(event) = progress_rx.recv().await {
            info!(
                completed = event.completed,
                total = event.total,
                url = %event.url,
                success = event.success,
                "Progress"
            );
        }
    });

    let orchestrator = Orchestrator::new(config, extractor.clone())
        .with_cancellation(cancel)
        .with_progress(progress_tx);

    let result = orchestrator.run(&data.rows).await;
    drop(orchestrator);
    extractor.shutdown().await;
    let _ = progress_task.await;

    let outcome = match result {
        Ok(outcome) => outcome,
        Err(AnalysisError::Cancelled { completed, total }) => {
            anyhow::bail!("Cancelled after {} of {} URLs; no report written", completed, total)
        }
        Err(e) => return Err(e.into()),
    };

    match &cli.output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            write_report(BufWriter::new(file), &outcome.report, format)?;
        }
        None => write_report(io::stdout().lock(), &outcome.report, format)?,
    }

    if let Some(path) = &cli.failures {
        let file =
            File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
        write_failures(BufWriter::new(file), &outcome.failures, format)?;
    } else if !outcome.failures.is_empty() {
        for failure in &outcome.failures {
            warn!(url = %failure.url, reason = %failure.reason, "Extraction failed");
        }
    }

    if let Some(path) = &cli.metrics_out {
        telemetry::write_metrics_file(path)
            .with_context(|| format!("Failed to write metrics to {}", path.display()))?;
    }

    let stats = &outcome.stats;
    let mut stderr = io::stderr().lock();
    writeln!(stderr, "Rows read:      {}", data.summary.rows_read)?;
    writeln!(stderr, "Rows kept:      {}", stats.filtered_rows)?;
    writeln!(stderr, "URLs analysed:  {}", stats.distinct_urls)?;
    writeln!(stderr, "Failures:       {}", stats.failed)?;

    Ok(())
}

// * File config first, then command-line overrides
fn build_config(cli: &Cli) -> Result<AnalysisConfig> {
    let mut config = match &cli.config {
        Some(path) => AnalysisConfig::load(path)?,
        None => AnalysisConfig::default(),
    };

    let filter = &mut config.filter;
    filter.branded_terms.extend(cli.brands.iter().cloned());
    if let Some(path) = &cli.brands_file {
        filter.branded_terms.extend(read_lines(path)?);
    }
    filter.excluded_urls.extend(cli.excludes.iter().cloned());
    if let Some(path) = &cli.exclude_file {
        filter.excluded_urls.extend(read_lines(path)?);
    }
    if let Some(min) = cli.min_position {
        filter.min_position = min;
    }
    if let Some(max) = cli.max_position {
        filter.max_position = max;
    }
    if cli.keep_missing_position {
        filter.retain_missing_position = true;
    }
    if let Some(min_clicks) = cli.min_clicks {
        filter.min_clicks = min_clicks;
    }

    if let Some(top_n) = cli.top_n {
        config.report.top_n = top_n;
    }

    let extraction = &mut config.extraction;
    if let Some(backend) = cli.backend {
        extraction.backend = match backend {
            BackendArg::Browser => FetchBackend::Browser,
            BackendArg::Http => FetchBackend::Http,
        };
    }
    if cli.no_cache {
        extraction.use_cache = false;
    }
    if cli.headed {
        extraction.headless = false;
    }
    if let Some(secs) = cli.max_wait {
        extraction.max_wait_seconds = secs;
    }
    if let Some(root) = &cli.site_root {
        extraction.site_root = Some(root.clone());
    }
    if let Some(dir) = &cli.cache_dir {
        extraction.cache_dir = Some(dir.clone());
    }

    if let Some(size) = cli.batch_size {
        config.orchestrator.batch_size = size;
    }

    config.validate()?;
    Ok(config)
}

fn read_lines(path: &Path) -> Result<Vec<String>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    Ok(parse_lines(&text))
}
