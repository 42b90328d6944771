//! cs-storage: package simulation outputs into zip archives and read them back.
//!
//! Commands print JSON documents to stdout. Logs and error reports go to
//! stderr. The process exit code follows [`exit_codes::ExitCode`].

mod exit_codes;
mod logging;

use clap::{Args, Parser, Subcommand, ValueEnum};
use cs_storage::{BinaryEncoding, ReadOptions, Storage, StorageConfig, StorageError};
use exit_codes::ExitCode;
use logging::{init_logging, LogConfig, LogFormat, LogLevel};
use serde::Serialize;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

#[derive(Parser)]
#[command(name = "cs-storage")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[command(flatten)]
    global: GlobalOpts,
}

#[derive(Args, Debug)]
struct GlobalOpts {
    /// Bucket directory (overrides CS_STORAGE_BUCKET / BUCKET)
    #[arg(long, global = true)]
    bucket: Option<PathBuf>,

    /// Log level
    #[arg(long, global = true, value_enum)]
    log_level: Option<LogLevel>,

    /// Log format
    #[arg(long, global = true, value_enum)]
    log_format: Option<LogFormat>,

    /// Pretty-print JSON output
    #[arg(long, global = true)]
    pretty: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Package a local result document and upload its archives
    Write(WriteArgs),

    /// Download archives named by a manifest and print the local result
    Read(ReadArgs),

    /// Add public screenshot links to a manifest's renderable outputs
    Links(LinksArgs),
}

#[derive(Args, Debug)]
struct WriteArgs {
    /// Task identifier used to name the archives (default: random UUID)
    #[arg(long)]
    task_id: Option<String>,

    /// Local result JSON file ("-" for stdin)
    #[arg(long, short, default_value = "-")]
    input: PathBuf,

    /// Build archives and the manifest without uploading
    #[arg(long)]
    no_upload: bool,
}

#[derive(Args, Debug)]
struct ReadArgs {
    /// Manifest JSON file ("-" for stdin)
    #[arg(long, short, default_value = "-")]
    manifest: PathBuf,

    /// How binary output data is rendered in JSON
    #[arg(long, value_enum, default_value_t = BinaryFormat::Base64)]
    binary: BinaryFormat,
}

#[derive(Args, Debug)]
struct LinksArgs {
    /// Manifest JSON file ("-" for stdin)
    #[arg(long, short, default_value = "-")]
    manifest: PathBuf,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum BinaryFormat {
    /// Base64 strings
    Base64,
    /// Arrays of byte values
    Array,
}

impl From<BinaryFormat> for BinaryEncoding {
    fn from(format: BinaryFormat) -> Self {
        match format {
            BinaryFormat::Base64 => BinaryEncoding::Base64,
            BinaryFormat::Array => BinaryEncoding::Raw,
        }
    }
}

/// Error report written to stderr as JSON.
#[derive(Serialize)]
struct ErrorReport<'a> {
    error: &'a str,
    exit_code: i32,
    code: u32,
    message: String,
}

fn main() {
    let cli = Cli::parse();

    let log_config = LogConfig::from_env(cli.global.log_level, cli.global.log_format);
    init_logging(&log_config);

    let config = StorageConfig::resolve(cli.global.bucket.as_deref());
    debug!(
        bucket = ?config.bucket,
        source = %config.bucket_source,
        "Resolved storage config"
    );

    let result = match &cli.command {
        Commands::Write(args) => run_write(&config, args),
        Commands::Read(args) => run_read(&config, args),
        Commands::Links(args) => run_links(&config, args),
    };

    let exit_code = match result.and_then(|value| print_json(&value, cli.global.pretty)) {
        Ok(()) => ExitCode::Success,
        Err(err) => report_error(&err),
    };

    std::process::exit(exit_code.as_i32());
}

fn run_write(config: &StorageConfig, args: &WriteArgs) -> Result<serde_json::Value, StorageError> {
    let task_id = args
        .task_id
        .clone()
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
    let document = read_json(&args.input)?;

    let storage = Storage::from_config(config);
    let remote = storage.write_value(&task_id, &document, !args.no_upload)?;
    info!(task_id = %task_id, uploaded = !args.no_upload, "Wrote result");

    Ok(serde_json::to_value(&remote)?)
}

fn run_read(config: &StorageConfig, args: &ReadArgs) -> Result<serde_json::Value, StorageError> {
    let manifest = read_json(&args.manifest)?;
    let options = ReadOptions {
        binary: args.binary.into(),
    };

    let storage = Storage::from_config(config);
    let local = storage.read_value(&manifest, options)?;

    Ok(serde_json::to_value(&local)?)
}

fn run_links(config: &StorageConfig, args: &LinksArgs) -> Result<serde_json::Value, StorageError> {
    let bucket = config.bucket_name().ok_or(StorageError::StoreUnavailable)?;
    let manifest = read_json(&args.manifest)?;

    let mut remote = cs_storage::validate::remote_result(&manifest)?;
    remote.add_screenshot_links(&config.public_url_base, &bucket);

    Ok(serde_json::to_value(&remote)?)
}

/// Read a JSON document from a file, or stdin when `path` is "-".
fn read_json(path: &Path) -> Result<serde_json::Value, StorageError> {
    let text = if path == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        buf
    } else {
        std::fs::read_to_string(path)?
    };
    Ok(serde_json::from_str(&text)?)
}

fn print_json(value: &serde_json::Value, pretty: bool) -> Result<(), StorageError> {
    let text = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{}", text);
    Ok(())
}

fn report_error(err: &StorageError) -> ExitCode {
    let exit_code = ExitCode::from(err);
    let report = ErrorReport {
        error: exit_code.code_name(),
        exit_code: exit_code.as_i32(),
        code: err.code(),
        message: err.to_string(),
    };
    match serde_json::to_string(&report) {
        Ok(json) => eprintln!("{}", json),
        Err(_) => eprintln!("{}: {}", exit_code, err),
    }
    exit_code
}
