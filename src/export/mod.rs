//! Spreadsheet export of filtered records.

use std::path::Path;

use rust_xlsxwriter::{Format, Workbook, XlsxError};
use thiserror::Error;

use crate::models::{Column, PatentRecord};
use crate::repository::{write_records, StoreError};

/// Worksheet name used for exports.
pub const SHEET_NAME: &str = "Patents";

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("spreadsheet error: {0}")]
    Xlsx(#[from] XlsxError),
    #[error("CSV error: {0}")]
    Csv(#[from] StoreError),
    #[error("unsupported export format: {0}")]
    UnsupportedFormat(String),
}

/// Output format of an export.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Xlsx,
    Csv,
}

impl ExportFormat {
    /// Pick a format from a file extension.
    pub fn from_path(path: &Path) -> Result<Self, ExportError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "xlsx" => Ok(ExportFormat::Xlsx),
            "csv" => Ok(ExportFormat::Csv),
            other => Err(ExportError::UnsupportedFormat(other.to_string())),
        }
    }

    pub fn content_type(self) -> &'static str {
        match self {
            ExportFormat::Xlsx => {
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
            }
            ExportFormat::Csv => "text/csv; charset=utf-8",
        }
    }

    pub fn file_name(self) -> &'static str {
        match self {
            ExportFormat::Xlsx => "patents_export.xlsx",
            ExportFormat::Csv => "patents_export.csv",
        }
    }

    /// Serialize records in this format.
    pub fn render(self, records: &[&PatentRecord]) -> Result<Vec<u8>, ExportError> {
        match self {
            ExportFormat::Xlsx => to_xlsx(records),
            ExportFormat::Csv => to_csv(records),
        }
    }
}

/// Build an `.xlsx` workbook with one sheet: bold header, one row per record.
///
/// Every cell is written as a string so application numbers and dates keep
/// their exact text.
pub fn to_xlsx(records: &[&PatentRecord]) -> Result<Vec<u8>, ExportError> {
    let mut workbook = Workbook::new();
    let header = Format::new().set_bold();

    let sheet = workbook.add_worksheet();
    sheet.set_name(SHEET_NAME)?;

    for (col, column) in Column::ALL.iter().enumerate() {
        sheet.write_string_with_format(0, col as u16, column.header(), &header)?;
    }
    for (i, record) in records.iter().enumerate() {
        let row = (i + 1) as u32;
        for (col, value) in record.values().iter().enumerate() {
            if value.is_empty() {
                continue;
            }
            sheet.write_string(row, col as u16, *value)?;
        }
    }
    sheet.set_freeze_panes(1, 0)?;

    Ok(workbook.save_to_buffer()?)
}

/// Serialize records as CSV with the dataset header.
pub fn to_csv(records: &[&PatentRecord]) -> Result<Vec<u8>, ExportError> {
    let mut buf = Vec::new();
    write_records(&mut buf, records.iter().copied())?;
    Ok(buf)
}
