//! `skucheck run`: config-driven SKU reconciliation.
//!
//! Flow: load config, load the input dataset, fetch and scrape each URL in
//! config order, reconcile, write the selected partition as xlsx.

use std::path::{Path, PathBuf};
use std::time::Duration;

use skucheck_io::report::{rows_from_found, rows_from_not_found};
use skucheck_io::{read_sku_dataset, write_report, DatasetError, ReportError};
use skucheck_recon::{
    extract_identifiers, group_of, reconcile, ExportSelection, ReconOutcome, ReconError,
    ReferenceGroup, RunMeta, RunReport, SkuCheckConfig,
};

use crate::exit_codes::{EXIT_CONFIG, EXIT_DATASET, EXIT_ERROR, EXIT_REPORT};
use crate::fetch::{HttpFetcher, PageFetcher};
use crate::CliError;

pub struct RunArgs {
    pub config: PathBuf,
    /// `--found` / `--not-found` override of the config's `mode`.
    pub selection: Option<ExportSelection>,
    pub json: bool,
    pub quiet: bool,
}

pub fn cmd_run(args: RunArgs) -> Result<(), CliError> {
    let config = load_config(&args.config)?;
    let fetcher = HttpFetcher::new(Duration::from_secs(config.timeout_secs))
        .map_err(|e| CliError { code: EXIT_ERROR, message: e.to_string(), hint: None })?;
    run_with_fetcher(&args, &config, &fetcher)
}

pub(crate) fn config_err(err: ReconError) -> CliError {
    let hint = match &err {
        ReconError::UnsupportedConfigFormat(_) => Some("use a .yaml, .yml or .toml config file"),
        ReconError::ConfigParse(_) => Some("settings live under a top-level `config:` key"),
        _ => None,
    };
    CliError { code: EXIT_CONFIG, message: err.to_string(), hint: hint.map(str::to_string) }
}

pub(crate) fn dataset_err(err: DatasetError) -> CliError {
    let hint = match &err {
        DatasetError::MissingColumn { .. } => {
            Some("required columns: 'SKU ID', 'SKU description', 'Subtotal ($)'".to_string())
        }
        DatasetError::NotFound(_) => {
            Some("`filename` is resolved relative to the config file".to_string())
        }
        _ => None,
    };
    CliError { code: EXIT_DATASET, message: err.to_string(), hint }
}

fn report_err(err: ReportError) -> CliError {
    CliError { code: EXIT_REPORT, message: err.to_string(), hint: None }
}

pub(crate) fn load_config(path: &Path) -> Result<SkuCheckConfig, CliError> {
    if !path.is_file() {
        return Err(CliError {
            code: EXIT_CONFIG,
            message: format!("config file '{}' not found", path.display()),
            hint: Some("pass the config path: skucheck run path/to/config.yaml".into()),
        });
    }
    SkuCheckConfig::load(path).map_err(config_err)
}

/// Fetch and scrape every URL in order. A page that cannot be fetched yields
/// an empty group and the loop moves on.
pub fn collect_groups(
    urls: &[String],
    fetcher: &dyn PageFetcher,
    quiet: bool,
) -> Vec<ReferenceGroup> {
    let mut groups = Vec::with_capacity(urls.len());

    for (i, url) in urls.iter().enumerate() {
        let url = url.trim();
        let name = group_of(url);
        if !quiet {
            eprintln!("[{}/{}] {} ({})", i + 1, urls.len(), url, name);
        }

        let group = match fetcher.fetch_text(url) {
            Ok(body) => {
                let ids = extract_identifiers(&body);
                log::debug!("{url}: {} bytes, {} identifiers", body.len(), ids.len());
                if !quiet {
                    eprintln!("  {} SKUs", ids.len());
                }
                ReferenceGroup::new(name, ids)
            }
            Err(e) => {
                log::warn!("skipping {url}: {e}");
                if !quiet {
                    eprintln!("  fetch failed: {e}");
                }
                ReferenceGroup::empty(name)
            }
        };
        groups.push(group);
    }

    groups
}

pub fn run_with_fetcher(
    args: &RunArgs,
    config: &SkuCheckConfig,
    fetcher: &dyn PageFetcher,
) -> Result<(), CliError> {
    let loaded = read_sku_dataset(&config.filename).map_err(dataset_err)?;
    if loaded.rows_dropped > 0 {
        log::warn!(
            "{}: dropped {} row(s) with a missing SKU ID, description or readable cost",
            config.filename.display(),
            loaded.rows_dropped
        );
    }
    for id in &loaded.duplicate_ids {
        log::warn!("SKU ID {id} appears more than once in the input; keeping the last row");
    }
    if !args.quiet {
        eprintln!(
            "loaded {} SKU record(s) from {}",
            loaded.records.len(),
            config.filename.display()
        );
    }

    let groups = collect_groups(&config.urls, fetcher, args.quiet);
    let outcome = reconcile(&loaded.records, &groups, config.duplicate_policy);
    for dup in &outcome.duplicates {
        log::warn!("{dup}");
    }

    let selection = args.selection.unwrap_or_else(|| config.selection());
    let written = export(&outcome, selection, config)?;

    let summary = outcome.summary();
    if !args.quiet {
        eprintln!(
            "{} found, {} not found ({} reference SKUs across {} group(s), {} duplicate(s))",
            summary.found,
            summary.not_found,
            summary.reference_identifiers,
            summary.groups,
            summary.duplicates,
        );
        let fallback = if written.styled { "" } else { " (unstyled)" };
        eprintln!("wrote {} row(s) to {}{fallback}", written.rows, written.path.display());
    }

    if args.json {
        let report = RunReport {
            meta: RunMeta {
                config_path: args.config.display().to_string(),
                selection,
                duplicate_policy: config.duplicate_policy,
                engine_version: env!("CARGO_PKG_VERSION").to_string(),
                run_at: chrono::Utc::now().to_rfc3339(),
            },
            summary,
            duplicates: outcome.duplicates.clone(),
            report_path: Some(written.path.display().to_string()),
        };
        let json = serde_json::to_string_pretty(&report).map_err(|e| CliError {
            code: EXIT_ERROR,
            message: format!("JSON serialization error: {e}"),
            hint: None,
        })?;
        println!("{json}");
    }

    Ok(())
}

fn export(
    outcome: &ReconOutcome,
    selection: ExportSelection,
    config: &SkuCheckConfig,
) -> Result<skucheck_io::ReportWritten, CliError> {
    let rows = match selection {
        ExportSelection::Found => rows_from_found(&outcome.found),
        ExportSelection::NotFound => rows_from_not_found(&outcome.not_found),
    };
    write_report(rows, &config.output_dir, selection.report_filename(), config.sort)
        .map_err(report_err)
}
