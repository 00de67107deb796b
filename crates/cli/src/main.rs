// skucheck CLI - reconcile billed SKUs against published SKU pages

mod exit_codes;
mod fetch;
mod run;

use std::collections::BTreeSet;
use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use env_logger::Env;

use skucheck_recon::{extract_identifiers, group_of, ExportSelection};

use exit_codes::{EXIT_ERROR, EXIT_SUCCESS, EXIT_USAGE};

#[derive(Parser)]
#[command(name = "skucheck")]
#[command(about = "Check billed SKUs against published SKU reference pages")]
#[command(version)]
struct Cli {
    /// Debug logging (same as RUST_LOG=debug)
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch reference pages, reconcile the input dataset, write the report
    #[command(after_help = "\
Examples:
  skucheck run
  skucheck run billing/config.yaml --not-found
  skucheck run config.yaml --json --quiet > summary.json")]
    Run {
        /// Path to the YAML (or TOML) config file
        #[arg(default_value = "config.yaml")]
        config: PathBuf,

        /// Export found SKUs regardless of the config's `mode`
        #[arg(long, conflicts_with = "not_found")]
        found: bool,

        /// Export not-found SKUs regardless of the config's `mode`
        #[arg(long)]
        not_found: bool,

        /// Print the run summary as JSON to stdout
        #[arg(long)]
        json: bool,

        /// Suppress progress output on stderr
        #[arg(long, short)]
        quiet: bool,
    },

    /// Validate a config file without fetching anything
    #[command(after_help = "\
Examples:
  skucheck validate config.yaml")]
    Validate {
        /// Path to the YAML (or TOML) config file
        config: PathBuf,
    },

    /// Print the SKU identifiers found in an HTML or text file
    #[command(after_help = "\
Examples:
  skucheck extract page.html
  curl -s https://cloud.example.com/skus/compute-engine | skucheck extract")]
    Extract {
        /// Input file; omit or use - for stdin
        file: Option<PathBuf>,
    },

    /// Print the group label derived from a URL
    #[command(after_help = "\
Examples:
  skucheck group https://cloud.example.com/skus/compute-engine")]
    Group {
        url: String,
    },

    /// Convert a CSV (or other supported) dataset to xlsx
    #[command(after_help = "\
Examples:
  skucheck convert billing.csv
  skucheck convert billing.csv -o billing-2026-10.xlsx")]
    Convert {
        input: PathBuf,

        /// Output path (default: input with .xlsx extension)
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(Env::default().default_filter_or(level)).init();

    let result = match cli.command {
        Commands::Run { config, found, not_found, json, quiet } => {
            let selection = if found {
                Some(ExportSelection::Found)
            } else if not_found {
                Some(ExportSelection::NotFound)
            } else {
                None
            };
            run::cmd_run(run::RunArgs { config, selection, json, quiet })
        }
        Commands::Validate { config } => cmd_validate(config),
        Commands::Extract { file } => cmd_extract(file),
        Commands::Group { url } => cmd_group(url),
        Commands::Convert { input, output } => cmd_convert(input, output),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn args(msg: impl Into<String>) -> Self {
        Self { code: EXIT_USAGE, message: msg.into(), hint: None }
    }

    pub fn io(msg: impl Into<String>) -> Self {
        Self { code: EXIT_ERROR, message: msg.into(), hint: None }
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

// ============================================================================
// validate
// ============================================================================

fn cmd_validate(config_path: PathBuf) -> Result<(), CliError> {
    let config = run::load_config(&config_path)?;

    if !config.filename.is_file() {
        return Err(run::dataset_err(skucheck_io::DatasetError::NotFound(
            config.filename.clone(),
        )));
    }

    let selection = config.selection();
    eprintln!(
        "ok: {} url(s), input {}, exports {} to {}",
        config.urls.len(),
        config.filename.display(),
        selection,
        config.report_path(selection).display(),
    );
    Ok(())
}

// ============================================================================
// extract
// ============================================================================

fn cmd_extract(file: Option<PathBuf>) -> Result<(), CliError> {
    let text = match file {
        Some(path) if path.as_os_str() != "-" => {
            let bytes = std::fs::read(&path)
                .map_err(|e| CliError::io(format!("cannot read {}: {e}", path.display())))?;
            String::from_utf8_lossy(&bytes).into_owned()
        }
        _ => {
            let mut buf = Vec::new();
            io::stdin()
                .read_to_end(&mut buf)
                .map_err(|e| {
                    CliError::args(format!("cannot read stdin: {e}"))
                        .with_hint("pass a file path: skucheck extract page.html")
                })?;
            String::from_utf8_lossy(&buf).into_owned()
        }
    };

    let ids: BTreeSet<String> = extract_identifiers(&text);
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    for id in &ids {
        writeln!(handle, "{id}").map_err(|e| CliError::io(e.to_string()))?;
    }
    Ok(())
}

// ============================================================================
// group
// ============================================================================

fn cmd_group(url: String) -> Result<(), CliError> {
    println!("{}", group_of(&url));
    Ok(())
}

// ============================================================================
// convert
// ============================================================================

fn cmd_convert(input: PathBuf, output: Option<PathBuf>) -> Result<(), CliError> {
    let output = output.unwrap_or_else(|| input.with_extension("xlsx"));
    if output == input {
        return Err(CliError::args(format!(
            "output would overwrite the input '{}'",
            input.display()
        ))
        .with_hint("choose a different path with -o"));
    }

    let loaded = skucheck_io::convert_to_xlsx(&input, &output).map_err(run::dataset_err)?;
    if loaded.rows_dropped > 0 {
        log::warn!("dropped {} incomplete row(s)", loaded.rows_dropped);
    }
    eprintln!(
        "wrote {} record(s) to {}",
        loaded.records.len(),
        output.display()
    );
    Ok(())
}
