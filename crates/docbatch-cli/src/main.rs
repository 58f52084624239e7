use std::path::PathBuf;
use std::process;

use clap::Parser;
use docbatch::config::{ConvertOptions, DEFAULT_INCLUDE_FILTER, TargetFormat};
use docbatch::error::ConvertError;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "docbatch",
    version,
    about = "Batch-convert word-processing documents with an installed office application"
)]
struct Cli {
    /// File or directory to convert
    source_path: String,

    /// Glob matched against file names when the source is a directory
    #[arg(short, long, default_value = DEFAULT_INCLUDE_FILTER)]
    include_filter: String,

    /// Output format: Default, PDF, XPS or HTML
    #[arg(short, long, default_value_t = TargetFormat::Default)]
    target_format: TargetFormat,

    /// Delete an existing destination file before saving
    #[arg(long)]
    delete_existing_files: bool,

    /// Delete each source document once it has been converted
    #[arg(long)]
    delete_original: bool,

    /// Log a failed document and carry on with the next one
    #[arg(long)]
    continue_on_error: bool,

    /// Start a fresh office application for every document
    #[arg(long)]
    instance_per_file: bool,

    /// Reattach each document to the default template before saving
    #[arg(long)]
    reset_template: bool,

    /// Let documents run their auto-start macros when opened
    #[arg(long)]
    allow_macros: bool,

    /// Office executable (default: soffice or libreoffice on PATH)
    #[arg(long, env = "DOCBATCH_SOFFICE")]
    soffice: Option<PathBuf>,

    /// More log output (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, conflicts_with = "quiet")]
    verbose: u8,

    /// Only log warnings and errors
    #[arg(short, long)]
    quiet: bool,
}

impl Cli {
    fn options(&self) -> ConvertOptions {
        ConvertOptions {
            source: PathBuf::from(&self.source_path),
            include_filter: self.include_filter.clone(),
            target_format: self.target_format,
            delete_existing: self.delete_existing_files,
            delete_original: self.delete_original,
            continue_on_error: self.continue_on_error,
            instance_per_file: self.instance_per_file,
            reset_template: self.reset_template,
            suppress_macros: !self.allow_macros,
        }
    }

    fn log_level(&self) -> &'static str {
        match (self.quiet, self.verbose) {
            (true, _) => "warn",
            (false, 0) => "info",
            (false, 1) => "debug",
            (false, _) => "trace",
        }
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_level());
    process::exit(run(&cli));
}

fn init_logging(level: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Run the conversion and return the process exit code.
fn run(cli: &Cli) -> i32 {
    match docbatch::convert_with_program(&cli.options(), cli.soffice.clone()) {
        Ok(()) => 0,
        Err(err) => report(&err),
    }
}

/// Log the error that stopped the run and map it to an exit code.
fn report(err: &ConvertError) -> i32 {
    // The resolver has already warned about an empty or missing source.
    if !matches!(
        err,
        ConvertError::SourcePathMissing | ConvertError::SourceNotFound(_)
    ) {
        tracing::error!("{err}");
    }
    err.exit_code()
}
