// File I/O operations: SKU dataset import, report export

pub mod csv;
pub mod dataset;
pub mod report;
pub mod xlsx;

pub use dataset::{convert_to_xlsx, read_sku_dataset, DatasetError, LoadedDataset};
pub use report::{write_report, ReportError, ReportRow, ReportWritten};

/// A raw spreadsheet cell as read from any supported input format.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Text(String),
    Number(f64),
}

impl Cell {
    /// Missing value: empty cell or whitespace-only text.
    pub fn is_blank(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Text(s) => s.trim().is_empty(),
            Cell::Number(n) => n.is_nan(),
        }
    }

    /// Cell value as text. Integral numbers render without decimals.
    pub fn to_text(&self) -> String {
        match self {
            Cell::Empty => String::new(),
            Cell::Text(s) => s.clone(),
            Cell::Number(n) => {
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    format!("{}", *n as i64)
                } else {
                    format!("{}", n)
                }
            }
        }
    }
}
