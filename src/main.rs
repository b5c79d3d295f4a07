// file: src/main.rs
// description: commandline entry point that runs the full patent download
// reference: application bootstrap and orchestration

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use patent_harvest::utils::logging::{format_error, format_step, format_success, format_warning};
use patent_harvest::{Config, CorpusExporter, DownloadSummary, Pipeline};
use std::path::PathBuf;
use std::time::Instant;
use tracing::{info, warn};

/// Exit status when the run completed but at least one query/source pair failed.
const EXIT_PARTIAL: i32 = 2;

#[derive(Parser)]
#[command(name = "patent_harvest")]
#[command(version = "0.1.0")]
#[command(about = "Downloads public cannabis-related patents into a corpus", long_about = None)]
struct Cli {
    #[arg(
        short,
        long,
        value_name = "FILE",
        default_value = "config/default.toml"
    )]
    config: PathBuf,

    /// Overrides output.directory from the configuration
    #[arg(short, long, value_name = "DIR")]
    output: Option<PathBuf>,

    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    color: bool,

    #[arg(short, long, action = ArgAction::SetTrue)]
    verbose: bool,

    /// Exit with status 0 even when some query/source pairs failed
    #[arg(long, action = ArgAction::SetTrue)]
    allow_partial: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    patent_harvest::utils::logging::init_logger(cli.color, cli.verbose);
    colored::control::set_override(cli.color);

    info!("Patent Harvest");
    info!("Loading configuration from: {}", cli.config.display());

    let mut config = if cli.config.exists() {
        Config::load(Some(cli.config.as_path())).context("Failed to load configuration")?
    } else {
        warn!(
            "Config file {} not found, using default configuration",
            cli.config.display()
        );
        Config::load(None).unwrap_or_else(|e| {
            warn!("Falling back to built-in defaults: {}", e);
            Config::default_config()
        })
    };

    if let Some(output) = cli.output {
        config.output.directory = output;
    }
    config.validate().context("Invalid configuration")?;

    let summary = run(&config, cli.color).await?;
    print_summary(&summary);

    if summary.has_failures() && !cli.allow_partial {
        std::process::exit(EXIT_PARTIAL);
    }

    Ok(())
}

async fn run(config: &Config, colored: bool) -> Result<DownloadSummary> {
    let start_time = Instant::now();

    println!(
        "{}",
        format_step(1, 2, &format!("Preparing {}", config.output.directory.display()))
    );
    let mut exporter =
        CorpusExporter::new(&config.output).context("Failed to prepare output directory")?;

    let pipeline = Pipeline::from_config(config)
        .context("Failed to build patent sources")?
        .with_progress(colored);

    println!("{}", format_step(2, 2, "Downloading patents"));
    let summary = pipeline
        .run_all(&mut exporter)
        .await
        .context("Patent download aborted")?;

    info!(
        "Download finished in {:.2}s",
        start_time.elapsed().as_secs_f64()
    );
    Ok(summary)
}

fn print_summary(summary: &DownloadSummary) {
    println!();
    println!("{}", "=".repeat(60));
    println!(
        "{}",
        format_success(&format!(
            "Downloaded {} new patents into {}",
            summary.total_patents, summary.output_directory
        ))
    );
    for (source, count) in &summary.per_source {
        println!("  {}: {} results", source, count);
    }
    println!("  Duplicates skipped: {}", summary.duplicates_skipped);
    println!(
        "  JSON files: {} | Text files: {}",
        summary.files_created.json_files, summary.files_created.text_files
    );

    if summary.enrichment_failures > 0 {
        println!(
            "{}",
            format_warning(&format!(
                "{} patents were saved without detail page data",
                summary.enrichment_failures
            ))
        );
    }

    if summary.has_failures() {
        println!(
            "{}",
            format_error(&format!(
                "{} of {} query/source pairs failed",
                summary.pairs_failed, summary.pairs_attempted
            ))
        );
        for failure in summary.failures.iter().take(10) {
            println!(
                "  '{}' @ {}: {}",
                failure.query, failure.source, failure.message
            );
        }
        if summary.failures.len() > 10 {
            println!("  ... and {} more", summary.failures.len() - 10);
        }
    }
    println!("{}", "=".repeat(60));
}
