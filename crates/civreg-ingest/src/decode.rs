// SPDX-License-Identifier: Apache-2.0

use crate::ImportError;
use calamine::{Data, Reader, open_workbook_auto};
use std::collections::BTreeMap;
use std::path::Path;

/// One spreadsheet row as header→cell text. Headers keep their original
/// casing; alias resolution downstream is case-insensitive. Empty cells are
/// omitted.
pub type RawRow = BTreeMap<String, String>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpreadsheetFormat {
    Csv,
    Xls,
    Xlsx,
}

impl SpreadsheetFormat {
    /// Maps an uploaded file name onto a supported format by extension,
    /// case-insensitively. Anything else is rejected at the upload filter.
    #[must_use]
    pub fn from_file_name(name: &str) -> Option<Self> {
        let ext = Path::new(name).extension()?.to_str()?;
        match ext.to_ascii_lowercase().as_str() {
            "csv" => Some(Self::Csv),
            "xls" => Some(Self::Xls),
            "xlsx" => Some(Self::Xlsx),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Xls => "xls",
            Self::Xlsx => "xlsx",
        }
    }
}

/// Decodes a staged upload into rows. CSV is read as a header-delimited
/// character stream; XLS/XLSX as a tabular grid from the first sheet only,
/// with the first row as the header.
pub fn decode_rows(path: &Path, format: SpreadsheetFormat) -> Result<Vec<RawRow>, ImportError> {
    match format {
        SpreadsheetFormat::Csv => decode_csv(path),
        SpreadsheetFormat::Xls | SpreadsheetFormat::Xlsx => decode_workbook(path),
    }
}

fn decode_csv(path: &Path) -> Result<Vec<RawRow>, ImportError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_path(path)
        .map_err(|e| ImportError(format!("failed to open csv: {e}")))?;
    let headers = reader
        .headers()
        .map_err(|e| ImportError(format!("failed to read csv header: {e}")))?
        .clone();

    let mut out = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| ImportError(format!("failed to read csv row: {e}")))?;
        let mut row = RawRow::new();
        for (i, header) in headers.iter().enumerate() {
            if header.is_empty() {
                continue;
            }
            if let Some(cell) = record.get(i) {
                if !cell.is_empty() {
                    row.insert(header.to_string(), cell.to_string());
                }
            }
        }
        out.push(row);
    }
    Ok(out)
}

fn decode_workbook(path: &Path) -> Result<Vec<RawRow>, ImportError> {
    let mut workbook = open_workbook_auto(path)
        .map_err(|e| ImportError(format!("failed to open spreadsheet: {e}")))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| ImportError("workbook has no sheets".to_string()))?
        .map_err(|e| ImportError(format!("failed to read first sheet: {e}")))?;

    let mut rows = range.rows();
    let Some(header_row) = rows.next() else {
        return Ok(Vec::new());
    };
    let headers: Vec<String> = header_row.iter().map(cell_to_string).collect();

    let mut out = Vec::new();
    for cells in rows {
        let mut row = RawRow::new();
        for (i, header) in headers.iter().enumerate() {
            if header.is_empty() {
                continue;
            }
            let Some(cell) = cells.get(i) else { continue };
            let value = cell_to_string(cell);
            if !value.is_empty() {
                row.insert(header.clone(), value);
            }
        }
        out.push(row);
    }
    Ok(out)
}

fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty | Data::Error(_) => String::new(),
        Data::String(s) => s.trim().to_string(),
        Data::Bool(b) => b.to_string(),
        Data::Int(i) => i.to_string(),
        // Spreadsheets routinely hand back numeric NIN columns as floats.
        Data::Float(f) if f.fract() == 0.0 => format!("{}", *f as i64),
        Data::Float(f) => f.to_string(),
        Data::DateTime(dt) => dt
            .as_datetime()
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_default(),
        Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
    }
}
