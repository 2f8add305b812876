use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;

use freshness_ingest::{ingest, logging, IngestConfig, IngestionResult};

#[derive(Parser)]
#[command(
    name = "freshness-ingest",
    version,
    about = "Validate, integrity-check and summarize a fresh/rotten image dataset"
)]
struct Cli {
    /// TOML config file. Defaults are used for anything it leaves out.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Project root holding artifacts/data/raw (ignored when --config is given)
    #[arg(long, default_value = ".")]
    root: PathBuf,

    /// Skip decoding every image during ingestion
    #[arg(long, default_value_t = false)]
    skip_integrity: bool,

    /// Print the ingestion result as JSON instead of a summary
    #[arg(long, default_value_t = false)]
    json: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(err) = logging::init() {
        eprintln!("⚠️  {err}");
    }

    let config = match &cli.config {
        Some(path) => match IngestConfig::from_toml_file(path) {
            Ok(config) => config,
            Err(err) => {
                eprintln!("❌ {err}");
                return ExitCode::FAILURE;
            }
        },
        None => IngestConfig::with_root(&cli.root),
    };

    match ingest(config, !cli.skip_integrity) {
        Ok(result) => {
            if cli.json {
                match serde_json::to_string_pretty(&result) {
                    Ok(json) => println!("{json}"),
                    Err(err) => {
                        eprintln!("❌ Failed to encode result: {err}");
                        return ExitCode::FAILURE;
                    }
                }
            } else {
                print_summary(&result);
            }
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("❌ {err}");
            ExitCode::FAILURE
        }
    }
}

fn print_summary(result: &IngestionResult) {
    println!("\nIngestion Results:");
    println!("Status: {}", result.status.as_str());
    println!("Total images: {}", result.total_images);
    for (class, count) in result.class_distribution.counts() {
        match result.class_distribution.percentage(class) {
            Some(pct) => println!("{class}: {count} ({pct:.2}%)"),
            None => println!("{class}: {count}"),
        }
    }
    if !result.corrupted_files.is_empty() {
        println!("⚠️  Corrupted files: {}", result.corrupted_files.len());
        for path in &result.corrupted_files {
            println!("   {}", path.display());
        }
    }
    println!("📊 Metadata: {}", result.metadata_file.display());
}
