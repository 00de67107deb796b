//! Report export: one `SKU Report` sheet per run.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use skucheck_recon::model::{FoundSku, SkuRecord};
use skucheck_recon::ReportSort;

use crate::xlsx::{export_table, ExportColumn, ExportValue};

pub const SHEET_NAME: &str = "SKU Report";

pub const COL_SERVICE_ID: &str = "Service ID";
pub const COL_DESCRIPTION: &str = "SKU description";
pub const COL_COST: &str = "Cost ($)";
pub const COL_GROUP: &str = "SKU Group";

/// One line of the exported report.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportRow {
    pub service_id: String,
    pub description: String,
    pub cost: f64,
    pub group: Option<String>,
}

impl ReportRow {
    fn from_record(record: &SkuRecord, group: Option<&str>) -> Self {
        Self {
            service_id: record.sku_id.clone(),
            description: record.description.clone(),
            cost: record.cost,
            group: group.map(str::to_string),
        }
    }
}

pub fn rows_from_found(found: &BTreeMap<String, FoundSku>) -> Vec<ReportRow> {
    found
        .values()
        .map(|f| ReportRow::from_record(&f.record, Some(f.group.as_str())))
        .collect()
}

pub fn rows_from_not_found(not_found: &BTreeMap<String, SkuRecord>) -> Vec<ReportRow> {
    not_found
        .values()
        .map(|r| ReportRow::from_record(r, None))
        .collect()
}

/// Order rows for export.
///
/// `Group` sorts by group ascending with ungrouped rows last; `Cost` sorts by
/// cost descending. Ties break by cost descending, then service ID ascending.
/// `Auto` picks `Group` when any row carries a group.
pub fn sort_rows(rows: &mut [ReportRow], sort: ReportSort) {
    let by_group = match sort {
        ReportSort::Group => true,
        ReportSort::Cost => false,
        ReportSort::Auto => rows.iter().any(|r| r.group.is_some()),
    };

    rows.sort_by(|a, b| {
        let primary = if by_group {
            match (&a.group, &b.group) {
                (Some(x), Some(y)) => x.cmp(y),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            }
        } else {
            Ordering::Equal
        };
        primary
            .then_with(|| b.cost.total_cmp(&a.cost))
            .then_with(|| a.service_id.cmp(&b.service_id))
    });
}

// ============================================================================
// Writing
// ============================================================================

#[derive(Debug)]
pub enum ReportError {
    CreateDir { path: PathBuf, message: String },
    /// Both the styled and the plain write failed.
    Write {
        path: PathBuf,
        styled: String,
        plain: String,
    },
}

impl fmt::Display for ReportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CreateDir { path, message } => {
                write!(f, "cannot create output directory '{}': {message}", path.display())
            }
            Self::Write { path, styled, plain } => write!(
                f,
                "cannot write report '{}': {plain} (styled attempt: {styled})",
                path.display()
            ),
        }
    }
}

impl std::error::Error for ReportError {}

/// What `write_report` produced.
#[derive(Debug, Clone)]
pub struct ReportWritten {
    pub path: PathBuf,
    pub rows: usize,
    /// False when the styled write failed and the plain fallback was used.
    pub styled: bool,
    pub created_dir: bool,
}

/// Sort `rows`, then write them to `dir/filename`, creating `dir` if needed.
pub fn write_report(
    rows: Vec<ReportRow>,
    dir: &Path,
    filename: &str,
    sort: ReportSort,
) -> Result<ReportWritten, ReportError> {
    write_report_with(rows, dir, filename, sort, write_table)
}

/// Writes one sheet; the flag asks for the styled layout.
type TableWriter =
    fn(&Path, &[ExportColumn<'_>], &[Vec<ExportValue<'_>>], bool) -> Result<(), String>;

fn write_table(
    path: &Path,
    columns: &[ExportColumn<'_>],
    rows: &[Vec<ExportValue<'_>>],
    styled: bool,
) -> Result<(), String> {
    export_table(path, SHEET_NAME, columns, rows, styled)
}

fn write_report_with(
    mut rows: Vec<ReportRow>,
    dir: &Path,
    filename: &str,
    sort: ReportSort,
    write: TableWriter,
) -> Result<ReportWritten, ReportError> {
    let created_dir = !dir.is_dir();
    if created_dir {
        std::fs::create_dir_all(dir).map_err(|e| ReportError::CreateDir {
            path: dir.to_path_buf(),
            message: e.to_string(),
        })?;
        log::debug!("created output directory {}", dir.display());
    }

    sort_rows(&mut rows, sort);
    let path = dir.join(filename);

    let with_group = rows.iter().any(|r| r.group.is_some());
    let mut columns = vec![
        ExportColumn { header: COL_SERVICE_ID, money: false },
        ExportColumn { header: COL_DESCRIPTION, money: false },
        ExportColumn { header: COL_COST, money: true },
    ];
    if with_group {
        columns.push(ExportColumn { header: COL_GROUP, money: false });
    }

    let values: Vec<Vec<ExportValue<'_>>> = rows
        .iter()
        .map(|r| {
            let mut row = vec![
                ExportValue::Text(&r.service_id),
                ExportValue::Text(&r.description),
                ExportValue::Number(r.cost),
            ];
            if with_group {
                row.push(ExportValue::Text(r.group.as_deref().unwrap_or("")));
            }
            row
        })
        .collect();

    let styled = match write(&path, &columns, &values, true) {
        Ok(()) => true,
        Err(styled_err) => {
            log::warn!("styled report write failed, retrying without formatting: {styled_err}");
            write(&path, &columns, &values, false).map_err(|plain_err| {
                ReportError::Write {
                    path: path.clone(),
                    styled: styled_err,
                    plain: plain_err,
                }
            })?;
            false
        }
    };

    Ok(ReportWritten {
        path,
        rows: rows.len(),
        styled,
        created_dir,
    })
}
