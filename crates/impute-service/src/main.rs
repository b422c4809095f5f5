//! CLI entry point for the CSV imputation service.

use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand};
use dotenv::dotenv;
use impute_engine::{MeanImputer, load_with, write_csv};
use impute_service::{ImputationService, ServiceConfig, ServiceError, naming};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Fill missing numeric CSV values with column means",
    long_about = "Upload CSV files, impute missing numeric values with column means, \
                  and download the processed result.\n\n\
                  ENVIRONMENT VARIABLES:\n  \
                  CSV_IMPUTER_STORAGE_DIR    Default storage directory for artifacts\n\n\
                  EXAMPLES:\n  \
                  # Full workflow\n  \
                  csv-imputer upload data.csv\n  \
                  csv-imputer process 1700000000_data.csv\n  \
                  csv-imputer download processed_1700000000_data.csv -o out/\n\n  \
                  # One-shot imputation without storage\n  \
                  csv-imputer impute -i data.csv -o data_filled.csv"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Directory holding uploaded and processed files
    #[arg(long, global = true)]
    storage_dir: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, global = true, default_value = "info")]
    log_level: String,

    /// Suppress progress output (only show warnings and errors)
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Maximum upload size in MiB
    #[arg(long, global = true)]
    max_upload_mb: Option<u64>,

    /// Number of rows in the processing preview
    #[arg(long, global = true)]
    preview_rows: Option<usize>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Report service status and available operations
    Health,

    /// Store a CSV file and print its shape
    Upload {
        /// Path to the CSV file
        path: PathBuf,

        /// Filename to record instead of the file's own name
        #[arg(long)]
        name: Option<String>,
    },

    /// Impute a stored upload
    Process {
        /// Upload key returned by `upload`
        filename: String,
    },

    /// Write a processed file to disk
    Download {
        /// Processed key returned by `process`
        filename: String,

        /// Output directory
        #[arg(short, long, default_value = ".")]
        output: PathBuf,
    },

    /// Remove stored files
    Cleanup {
        /// Keys to remove
        #[arg(required = true)]
        filenames: Vec<String>,
    },

    /// Impute a local CSV file in one step, without storage
    Impute {
        /// Path to the CSV file
        #[arg(short, long)]
        input: PathBuf,

        /// Output path (default: `imputed_<name>` next to the input)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Print the imputation report as JSON instead of a summary
        ///
        /// Disables all progress logs.
        #[arg(long)]
        json: bool,
    },
}

/// Initialize the tracing subscriber for logging.
///
/// Logs go to stderr so stdout carries only command output. When
/// `json_output` is true, logging is disabled entirely.
fn init_logging(level: &str, quiet: bool, json_output: bool) {
    if json_output {
        return;
    }

    use tracing_subscriber::EnvFilter;

    let effective_level = if quiet { "warn" } else { level };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(effective_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    // Load .env first so both RUST_LOG and the storage dir default see it
    dotenv().ok();

    let cli = Cli::parse();

    let json_output = matches!(cli.command, Command::Impute { json: true, .. });
    init_logging(&cli.log_level, cli.quiet, json_output);

    let config = build_config(&cli)?;

    let result = run(&cli.command, config);
    if let Err(e) = &result {
        if let Some(service_error) = e.downcast_ref::<ServiceError>() {
            error!(
                "{} ({})",
                service_error.user_message(),
                service_error.error_code()
            );
        }
    }
    result
}

fn build_config(cli: &Cli) -> Result<ServiceConfig> {
    let mut builder = ServiceConfig::builder();

    if let Some(ref dir) = cli.storage_dir {
        builder = builder.storage_dir(dir);
    }
    if let Some(mb) = cli.max_upload_mb {
        builder = builder.max_upload_bytes(mb.saturating_mul(1024 * 1024));
    }
    if let Some(rows) = cli.preview_rows {
        builder = builder.preview_rows(rows);
    }

    Ok(builder.build()?)
}

fn run(command: &Command, config: ServiceConfig) -> Result<()> {
    match command {
        Command::Impute {
            input,
            output,
            json,
        } => run_impute(&config, input, output.as_deref(), *json),
        Command::Health => {
            let service = ImputationService::open(config)?;
            print_json(&service.health())
        }
        Command::Upload { path, name } => {
            let service = ImputationService::open(config)?;
            run_upload(&service, path, name.as_deref())
        }
        Command::Process { filename } => {
            let service = ImputationService::open(config)?;
            print_json(&service.process(filename)?)
        }
        Command::Download { filename, output } => {
            let service = ImputationService::open(config)?;
            run_download(&service, filename, output)
        }
        Command::Cleanup { filenames } => {
            let service = ImputationService::open(config)?;
            print_json(&service.cleanup(filenames.as_slice())?)
        }
    }
}

fn run_upload(service: &ImputationService, path: &Path, name: Option<&str>) -> Result<()> {
    // Refuse oversized files before reading them
    let limit = service.config().max_upload_bytes;
    let size = fs::metadata(path)
        .with_context(|| format!("Input file not found: {}", path.display()))?
        .len();
    if size > limit {
        return Err(ServiceError::PayloadTooLarge { size, limit }.into());
    }

    let filename = match name {
        Some(name) => name.to_string(),
        None => path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| anyhow!("Not a file path: {}", path.display()))?,
    };

    let bytes = fs::read(path)?;
    print_json(&service.upload(&filename, &bytes)?)
}

#[derive(Serialize)]
struct DownloadOutput<'a> {
    status: &'static str,
    filename: &'a str,
    download_name: &'a str,
    path: String,
    bytes: usize,
}

fn run_download(service: &ImputationService, filename: &str, output_dir: &Path) -> Result<()> {
    let download = service.download(filename)?;

    if !output_dir.exists() {
        fs::create_dir_all(output_dir)?;
        info!("Created output directory: {}", output_dir.display());
    }

    let path = output_dir.join(&download.download_name);
    fs::write(&path, &download.bytes)?;
    info!("Wrote {} ({} bytes)", path.display(), download.bytes.len());

    print_json(&DownloadOutput {
        status: "success",
        filename: &download.filename,
        download_name: &download.download_name,
        path: path.display().to_string(),
        bytes: download.bytes.len(),
    })
}

/// Load, impute and write a local file without touching the store.
///
/// Note: the summary uses `println!` on purpose; it is the command's output,
/// not a log line.
fn run_impute(
    config: &ServiceConfig,
    input: &Path,
    output: Option<&Path>,
    json: bool,
) -> Result<()> {
    info!("Loading dataset from: {}", input.display());
    let bytes =
        fs::read(input).with_context(|| format!("Input file not found: {}", input.display()))?;

    let original = load_with(&bytes, &config.load_options)?;
    info!(
        "Dataset loaded: {} rows x {} columns",
        original.row_count(),
        original.column_count()
    );

    let imputation = MeanImputer::impute(&original)?;

    let output_path = match output {
        Some(path) => path.to_path_buf(),
        None => default_output_path(input),
    };
    fs::write(&output_path, write_csv(&imputation.processed)?)?;
    info!("Processed dataset saved to: {}", output_path.display());

    let report = &imputation.report;
    if json {
        return print_json(report);
    }

    println!("Imputed {} values", report.total_imputations);
    println!(
        "  Rows: {}  Columns: {}  Numeric: {}",
        report.total_rows, report.total_columns, report.numeric_column_count
    );
    println!("  Missing data rate: {:.2}%", report.missing_data_rate);
    for name in &report.numeric_columns {
        println!(
            "  {:<24} mean {:>14.4}  imputed {}",
            name, report.column_means[name], report.imputed_counts[name]
        );
    }
    println!("  Output: {}", output_path.display());

    Ok(())
}

fn default_output_path(input: &Path) -> PathBuf {
    let name = input
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output.csv".to_string());
    input.with_file_name(format!("{}{}", naming::DOWNLOAD_PREFIX, name))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
