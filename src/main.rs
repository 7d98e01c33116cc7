use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use sealmap::{ConfigError, PipelineConfig, PipelineError, PipelineReport, UntaggedPolicy};
use tracing_subscriber::{EnvFilter, fmt};

/// sealmap - lay out tagged seals in 2-D and cluster them
#[derive(Parser)]
#[command(name = "sealmap")]
#[command(about = "Reduce seal tag vectors to 2-D coordinates and cluster them")]
#[command(version)]
struct Cli {
    /// SQLite store with seal, tag and seal_has_tag relations
    #[arg(value_name = "DB_PATH")]
    db_path: PathBuf,

    /// Per-seal output CSV (id,cluster,x,y)
    #[arg(value_name = "OUT_PATH")]
    out_path: PathBuf,

    /// Dimensionality reduction method: pca, tsne, tsvd or isomap
    #[arg(short = 'r', long, value_name = "METHOD", default_value = "pca")]
    dimred: String,

    /// Clustering method: kmeans or dbscan
    #[arg(short = 'c', long, value_name = "METHOD", default_value = "kmeans")]
    cluster: String,

    /// Cluster summary CSV [default: cluster_<OUT_PATH file name>]
    #[arg(long, value_name = "PATH")]
    clusters_out: Option<PathBuf>,

    /// Lay out seals without tags as all-zero vectors instead of skipping them
    #[arg(long)]
    include_untagged: bool,

    /// Print the run report as JSON
    #[arg(long)]
    json: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = execute(&cli) {
        // Determine exit code based on error type
        let exit_code = if is_user_error(&e) { 1 } else { 2 };
        eprintln!("Error: {e:#}");
        std::process::exit(exit_code);
    }
}

fn init_logging(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Determines if an error is a user error (vs internal error).
///
/// User errors are configuration problems: unknown method names or
/// colliding output paths. Store, numeric and I/O failures are internal.
fn is_user_error(error: &anyhow::Error) -> bool {
    error.chain().any(|cause| {
        cause.is::<ConfigError>()
            || cause
                .downcast_ref::<PipelineError>()
                .is_some_and(PipelineError::is_config)
    })
}

/// Builds the run configuration from command-line arguments.
///
/// Method names are resolved here, before the store is opened.
fn build_config(cli: &Cli) -> Result<PipelineConfig, ConfigError> {
    let mut config =
        PipelineConfig::from_names(&cli.db_path, &cli.out_path, &cli.dimred, &cli.cluster)?;
    if let Some(path) = &cli.clusters_out {
        config = config.with_clusters_out(path);
    }
    if cli.include_untagged {
        config = config.with_untagged(UntaggedPolicy::Include);
    }
    config.validate()?;
    Ok(config)
}

fn execute(cli: &Cli) -> Result<()> {
    let config = build_config(cli)?;

    let report = sealmap::run(&config)
        .with_context(|| format!("Failed to lay out seals from {}", config.store.display()))?;

    if cli.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&report).context("Failed to serialize run report")?
        );
    } else {
        print_report(&report);
    }
    Ok(())
}

fn print_report(report: &PipelineReport) {
    println!(
        "Laid out {} seals over {} tags ({} + {})",
        report.seals, report.vocabulary_size, report.reduction, report.clustering
    );
    print!("{} clusters", report.clusters);
    if report.clustering.has_noise() {
        print!(", {} noise points", report.noise_points);
    }
    println!();
    println!("Seals written to {}", report.seals_path.display());
    println!("Clusters written to {}", report.clusters_path.display());
}
