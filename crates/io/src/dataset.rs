//! SKU input dataset: header lookup, incomplete-row dropping, cost parsing.

use std::fmt;
use std::path::{Path, PathBuf};

use skucheck_recon::model::{InputSet, SkuRecord};

use crate::xlsx::{export_table, ExportColumn, ExportValue};
use crate::Cell;

pub const COL_SKU_ID: &str = "SKU ID";
pub const COL_DESCRIPTION: &str = "SKU description";
pub const COL_SUBTOTAL: &str = "Subtotal ($)";

pub const REQUIRED_COLUMNS: [&str; 3] = [COL_SKU_ID, COL_DESCRIPTION, COL_SUBTOTAL];

#[derive(Debug)]
pub enum DatasetError {
    /// Input file does not exist.
    NotFound(PathBuf),
    /// Extension is not a spreadsheet or delimited text format.
    UnsupportedFormat(String),
    /// The underlying reader failed.
    Read { path: PathBuf, message: String },
    /// No header row (file empty or all rows blank).
    NoHeader,
    /// A required column is absent.
    MissingColumn { column: String, available: Vec<String> },
}

impl fmt::Display for DatasetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound(path) => write!(f, "input file '{}' not found", path.display()),
            Self::UnsupportedFormat(ext) => write!(
                f,
                "unsupported input format '{ext}' (expected xlsx, xlsm, xls, xlsb, ods, csv or tsv)"
            ),
            Self::Read { path, message } => {
                write!(f, "could not read '{}': {message}", path.display())
            }
            Self::NoHeader => write!(f, "input has no header row"),
            Self::MissingColumn { column, available } => write!(
                f,
                "column '{column}' not found; available columns: [{}]",
                available
                    .iter()
                    .map(|c| format!("'{c}'"))
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
        }
    }
}

impl std::error::Error for DatasetError {}

/// Records plus what happened while loading them.
#[derive(Debug, Clone, Default)]
pub struct LoadedDataset {
    pub records: InputSet,
    /// Data rows seen below the header (blank rows excluded).
    pub rows_read: usize,
    /// Rows dropped for a missing SKU ID, description or cost. A cost that
    /// is not a finite number counts as missing.
    pub rows_dropped: usize,
    /// SKU IDs that appeared more than once; the last row wins.
    pub duplicate_ids: Vec<String>,
}

/// Load the input dataset, dispatching on file extension.
pub fn read_sku_dataset(path: &Path) -> Result<LoadedDataset, DatasetError> {
    if !path.is_file() {
        return Err(DatasetError::NotFound(path.to_path_buf()));
    }

    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();

    let rows = match ext.as_str() {
        "xlsx" | "xlsm" | "xls" | "xlsb" | "ods" => crate::xlsx::import(path),
        "csv" | "tsv" | "txt" => crate::csv::import(path),
        other => return Err(DatasetError::UnsupportedFormat(other.to_string())),
    }
    .map_err(|message| DatasetError::Read {
        path: path.to_path_buf(),
        message,
    })?;

    dataset_from_rows(&rows)
}

/// Build the dataset from raw rows. The first non-blank row is the header.
pub fn dataset_from_rows(rows: &[Vec<Cell>]) -> Result<LoadedDataset, DatasetError> {
    let header_idx = rows
        .iter()
        .position(|row| row.iter().any(|c| !c.is_blank()))
        .ok_or(DatasetError::NoHeader)?;

    let headers: Vec<String> = rows[header_idx]
        .iter()
        .map(|c| c.to_text().trim().to_string())
        .collect();

    let idx = |name: &str| -> Result<usize, DatasetError> {
        headers.iter().position(|h| h == name).ok_or_else(|| {
            DatasetError::MissingColumn {
                column: name.into(),
                available: headers.iter().filter(|h| !h.is_empty()).cloned().collect(),
            }
        })
    };

    let id_idx = idx(COL_SKU_ID)?;
    let desc_idx = idx(COL_DESCRIPTION)?;
    let cost_idx = idx(COL_SUBTOTAL)?;

    let mut loaded = LoadedDataset::default();
    let empty = Cell::Empty;

    for (offset, row) in rows[header_idx + 1..].iter().enumerate() {
        if row.iter().all(Cell::is_blank) {
            continue;
        }
        loaded.rows_read += 1;

        let id_cell = row.get(id_idx).unwrap_or(&empty);
        let desc_cell = row.get(desc_idx).unwrap_or(&empty);
        let cost_cell = row.get(cost_idx).unwrap_or(&empty);

        if id_cell.is_blank() || desc_cell.is_blank() || cost_cell.is_blank() {
            loaded.rows_dropped += 1;
            continue;
        }

        let sku_id = id_cell.to_text();
        let Some(cost) = parse_cost(cost_cell) else {
            log::warn!(
                "row {} (SKU '{sku_id}'): unreadable cost '{}', row dropped",
                header_idx + offset + 2,
                cost_cell.to_text()
            );
            loaded.rows_dropped += 1;
            continue;
        };

        let record = SkuRecord {
            sku_id: sku_id.clone(),
            description: desc_cell.to_text(),
            cost,
        };
        if loaded.records.insert(record).is_some() {
            loaded.duplicate_ids.push(sku_id);
        }
    }

    Ok(loaded)
}

fn parse_cost(cell: &Cell) -> Option<f64> {
    let value = match cell {
        Cell::Number(n) => *n,
        Cell::Text(s) => s.trim().parse::<f64>().ok()?,
        Cell::Empty => return None,
    };
    value.is_finite().then_some(value)
}

/// Load any supported input and rewrite it as an `.xlsx` holding only the
/// required columns. Incomplete rows are dropped along the way.
pub fn convert_to_xlsx(input: &Path, output: &Path) -> Result<LoadedDataset, DatasetError> {
    let loaded = read_sku_dataset(input)?;
    write_dataset_xlsx(&loaded.records, output).map_err(|message| DatasetError::Read {
        path: output.to_path_buf(),
        message,
    })?;
    Ok(loaded)
}

/// Write the dataset's required columns to an xlsx file, one row per record
/// in SKU ID order.
pub fn write_dataset_xlsx(records: &InputSet, path: &Path) -> Result<(), String> {
    let columns = [
        ExportColumn { header: COL_SKU_ID, money: false },
        ExportColumn { header: COL_DESCRIPTION, money: false },
        ExportColumn { header: COL_SUBTOTAL, money: true },
    ];
    let rows: Vec<Vec<ExportValue<'_>>> = records
        .iter()
        .map(|r| {
            vec![
                ExportValue::Text(&r.sku_id),
                ExportValue::Text(&r.description),
                ExportValue::Number(r.cost),
            ]
        })
        .collect();

    export_table(path, "Sheet1", &columns, &rows, false)
}
