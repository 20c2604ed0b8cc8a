//! Source table ingestion.
//!
//! Reads the header row and data rows of one worksheet into a [`Table`]
//! of raw cell text. Column lookup by name happens only in [`schema`],
//! after the header row has been validated.

pub mod schema;

pub use schema::{extract_rows, Schema};

use crate::error::BatchError;
use std::path::Path;
use tracing::debug;
use umya_spreadsheet::reader::xlsx;
use umya_spreadsheet::Worksheet;

/// One data row of the source worksheet.
#[derive(Debug, Clone, PartialEq)]
pub struct TableRow {
    /// 1-based worksheet row number.
    pub row_number: u32,
    /// Cell text by column position; `None` for blank cells.
    pub cells: Vec<Option<String>>,
}

impl TableRow {
    /// Text of the cell at `column`, if present and non-blank.
    pub fn cell(&self, column: usize) -> Option<&str> {
        self.cells.get(column).and_then(|c| c.as_deref())
    }
}

/// Header row plus data rows of one worksheet.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    /// Header cells as written in the source (untrimmed).
    pub headers: Vec<String>,
    pub rows: Vec<TableRow>,
}

/// Load the table from an `.xlsx` workbook.
///
/// `sheet = None` selects the first worksheet.
pub fn load_table(path: &Path, sheet: Option<&str>) -> Result<Table, BatchError> {
    if !path.is_file() {
        return Err(BatchError::SourceNotFound {
            path: path.to_path_buf(),
        });
    }

    let book = xlsx::read(path).map_err(|e| BatchError::SourceUnreadable {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    let worksheet = match sheet {
        Some(name) => book
            .get_sheet_by_name(name)
            .ok_or_else(|| BatchError::SheetNotFound {
                path: path.to_path_buf(),
                sheet: name.to_string(),
            })?,
        None => book
            .get_sheet_collection()
            .first()
            .ok_or_else(|| BatchError::SourceUnreadable {
                path: path.to_path_buf(),
                message: "workbook has no worksheets".to_string(),
            })?,
    };

    let table = table_from_sheet(worksheet);
    debug!(
        "Read {} columns and {} data rows from sheet '{}'",
        table.headers.len(),
        table.rows.len(),
        worksheet.get_name()
    );

    Ok(table)
}

/// Convert a worksheet into a [`Table`]. Row 1 is the header row.
fn table_from_sheet(sheet: &Worksheet) -> Table {
    let (max_col, max_row) = sheet.get_highest_column_and_row();
    if max_row == 0 || max_col == 0 {
        return Table::default();
    }

    let headers = (1..=max_col)
        .map(|col| cell_text(sheet, col, 1).unwrap_or_default())
        .collect();

    let rows = (2..=max_row)
        .filter_map(|row| {
            let cells: Vec<Option<String>> =
                (1..=max_col).map(|col| cell_text(sheet, col, row)).collect();
            if cells.iter().all(Option::is_none) {
                None
            } else {
                Some(TableRow {
                    row_number: row,
                    cells,
                })
            }
        })
        .collect();

    Table { headers, rows }
}

fn cell_text(sheet: &Worksheet, col: u32, row: u32) -> Option<String> {
    let value = sheet.get_cell((col, row))?.get_value();
    if value.trim().is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}
