// Excel file import (xlsx, xls, xlsb, ods) and export (xlsx only)
//
// Import: first worksheet only, flattened to rows of cells.
// Export: one sheet, values plus optional presentation (header style,
//         money format, column widths).

use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader, Sheets};
use rust_xlsxwriter::{Format, FormatAlign, FormatBorder, Workbook as XlsxWorkbook, Worksheet};

use crate::Cell;

/// Import the first worksheet of an Excel / ODS file.
pub fn import(path: &Path) -> Result<Vec<Vec<Cell>>, String> {
    let mut workbook: Sheets<_> = open_workbook_auto(path)
        .map_err(|e| format!("Failed to open Excel file: {}", e))?;

    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| "Excel file contains no sheets".to_string())?;

    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|e| format!("Failed to read sheet '{}': {}", sheet_name, e))?;

    Ok(range
        .rows()
        .map(|row| row.iter().map(cell_from_data).collect())
        .collect())
}

fn cell_from_data(data: &Data) -> Cell {
    match data {
        Data::Empty => Cell::Empty,
        Data::String(s) => {
            if s.is_empty() {
                Cell::Empty
            } else {
                Cell::Text(s.clone())
            }
        }
        Data::Float(n) => Cell::Number(*n),
        Data::Int(n) => Cell::Number(*n as f64),
        Data::Bool(b) => Cell::Text(if *b { "TRUE" } else { "FALSE" }.to_string()),
        // Error cells count as missing values
        Data::Error(_) => Cell::Empty,
        Data::DateTime(dt) => Cell::Number(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => Cell::Text(s.clone()),
    }
}

// ============================================================================
// Export
// ============================================================================

/// A column to export: header text and whether values are money amounts.
pub struct ExportColumn<'a> {
    pub header: &'a str,
    pub money: bool,
}

/// A single exported value.
pub enum ExportValue<'a> {
    Text(&'a str),
    Number(f64),
}

impl ExportValue<'_> {
    /// Text as it appears in the sheet, used for column sizing.
    fn rendered_len(&self, money: bool) -> usize {
        match self {
            Self::Text(s) => s.chars().count(),
            Self::Number(n) if money => format_money(*n).chars().count(),
            Self::Number(n) => n.to_string().chars().count(),
        }
    }
}

/// Render a number the way the `#,##0.00` format displays it.
pub fn format_money(n: f64) -> String {
    if !n.is_finite() {
        return n.to_string();
    }
    let fixed = format!("{:.2}", n.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::new();
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if n < 0.0 && fixed != "0.00" { "-" } else { "" };
    format!("{sign}{grouped}.{frac_part}")
}

/// Write one sheet. With `styled`, the header row is bold / wrapped /
/// bordered, money columns use `#,##0.00`, and every column is sized to its
/// longest value + 2.
pub fn export_table(
    path: &Path,
    sheet_name: &str,
    columns: &[ExportColumn<'_>],
    rows: &[Vec<ExportValue<'_>>],
    styled: bool,
) -> Result<(), String> {
    let mut workbook = XlsxWorkbook::new();
    let worksheet = workbook
        .add_worksheet()
        .set_name(sheet_name)
        .map_err(|e| format!("Failed to create sheet '{}': {}", sheet_name, e))?;

    if styled {
        write_styled(worksheet, columns, rows)?;
    } else {
        write_plain(worksheet, columns, rows)?;
    }

    workbook
        .save(path)
        .map_err(|e| format!("Failed to save XLSX file: {}", e))
}

fn write_plain(
    worksheet: &mut Worksheet,
    columns: &[ExportColumn<'_>],
    rows: &[Vec<ExportValue<'_>>],
) -> Result<(), String> {
    for (col, column) in columns.iter().enumerate() {
        worksheet
            .write_string(0, col as u16, column.header)
            .map_err(|e| format!("Failed to write header: {}", e))?;
    }

    for (i, row) in rows.iter().enumerate() {
        let r = (i + 1) as u32;
        for (col, value) in row.iter().enumerate() {
            let written = match value {
                ExportValue::Text(s) => worksheet.write_string(r, col as u16, *s),
                ExportValue::Number(n) => worksheet.write_number(r, col as u16, *n),
            };
            written.map_err(|e| format!("Failed to write row {}: {}", r, e))?;
        }
    }

    Ok(())
}

fn write_styled(
    worksheet: &mut Worksheet,
    columns: &[ExportColumn<'_>],
    rows: &[Vec<ExportValue<'_>>],
) -> Result<(), String> {
    let header_format = Format::new()
        .set_bold()
        .set_text_wrap()
        .set_align(FormatAlign::Top)
        .set_border(FormatBorder::Thin);
    let money_format = Format::new().set_num_format("#,##0.00");

    let mut widths: Vec<usize> = columns.iter().map(|c| c.header.chars().count()).collect();

    for (col, column) in columns.iter().enumerate() {
        worksheet
            .write_string_with_format(0, col as u16, column.header, &header_format)
            .map_err(|e| format!("Failed to write header: {}", e))?;
    }

    for (i, row) in rows.iter().enumerate() {
        let r = (i + 1) as u32;
        for (col, value) in row.iter().enumerate() {
            let money = columns.get(col).is_some_and(|c| c.money);
            if let Some(w) = widths.get_mut(col) {
                *w = (*w).max(value.rendered_len(money));
            }
            let written = match value {
                ExportValue::Text(s) => worksheet.write_string(r, col as u16, *s),
                ExportValue::Number(n) if money => {
                    worksheet.write_number_with_format(r, col as u16, *n, &money_format)
                }
                ExportValue::Number(n) => worksheet.write_number(r, col as u16, *n),
            };
            written.map_err(|e| format!("Failed to write row {}: {}", r, e))?;
        }
    }

    for (col, width) in widths.iter().enumerate() {
        worksheet
            .set_column_width(col as u16, (*width + 2) as f64)
            .map_err(|e| format!("Failed to set column {} width: {}", col, e))?;
    }

    Ok(())
}
