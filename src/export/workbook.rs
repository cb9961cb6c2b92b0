//! Render pivots and full ledgers to `.xlsx` byte streams.
//!
//! Byte streams rather than files: the CLI decides where they land, and the
//! download boundary hands them out as-is. Styling stops at a bold header.

use rust_xlsxwriter::{Format, Workbook, Worksheet};

use super::Pivot;
use crate::error::{LedgerError, LedgerResult};
use crate::storage::grid::{self, Cell};
use crate::types::{LedgerRow, Location};

/// Render one pivot report as a single-sheet workbook.
pub fn pivot_workbook(pivot: &Pivot) -> LedgerResult<Vec<u8>> {
    let mut workbook = Workbook::new();
    let header = Format::new().set_bold();

    let worksheet = workbook.add_worksheet();
    let sheet_name = format!(
        "{} {:04}-{:02}",
        pivot.location, pivot.period.year, pivot.period.month
    );
    worksheet
        .set_name(&sheet_name)
        .map_err(|e| LedgerError::Export(format!("failed to name worksheet: {e}")))?;

    let days = pivot.period.days() as u16;
    write_string(worksheet, 0, 0, "Metric", Some(&header))?;
    for day in 1..=days {
        write_string(worksheet, 0, day, &day.to_string(), Some(&header))?;
    }
    write_string(worksheet, 0, days + 1, "Average", Some(&header))?;

    for (row_idx, row) in pivot.rows.iter().enumerate() {
        let excel_row = (row_idx + 1) as u32;
        write_string(worksheet, excel_row, 0, row.metric.label(), None)?;
        for (day_idx, cell) in row.cells.iter().enumerate() {
            // Blank cell where no daily record exists for that day.
            if let Some(value) = cell {
                write_number(worksheet, excel_row, (day_idx + 1) as u16, *value)?;
            }
        }
        if let Some(average) = row.average {
            write_number(worksheet, excel_row, days + 1, average)?;
        }
    }

    save_to_buffer(workbook)
}

/// Render every location's table into one workbook, one worksheet per
/// location, in the same grid layout the xlsx store persists.
pub fn ledger_workbook(tables: &[(Location, Vec<LedgerRow>)]) -> LedgerResult<Vec<u8>> {
    let mut workbook = Workbook::new();
    let header = Format::new().set_bold();

    for (location, rows) in tables {
        let worksheet = workbook.add_worksheet();
        worksheet
            .set_name(location.name())
            .map_err(|e| LedgerError::Export(format!("failed to name worksheet: {e}")))?;

        for (row_idx, line) in grid::rows_to_grid(rows).iter().enumerate() {
            for (col_idx, cell) in line.iter().enumerate() {
                let row = row_idx as u32;
                let col = col_idx as u16;
                match cell {
                    Cell::Empty => {}
                    Cell::Number(value) => write_number(worksheet, row, col, *value)?,
                    Cell::Text(value) if row_idx == 0 => {
                        write_string(worksheet, row, col, value, Some(&header))?
                    }
                    Cell::Text(value) => write_string(worksheet, row, col, value, None)?,
                }
            }
        }
    }

    save_to_buffer(workbook)
}

fn write_string(
    worksheet: &mut Worksheet,
    row: u32,
    col: u16,
    value: &str,
    format: Option<&Format>,
) -> LedgerResult<()> {
    let result = match format {
        Some(format) => worksheet.write_string_with_format(row, col, value, format),
        None => worksheet.write_string(row, col, value),
    };
    result
        .map(|_| ())
        .map_err(|e| LedgerError::Export(format!("failed to write text cell: {e}")))
}

fn write_number(worksheet: &mut Worksheet, row: u32, col: u16, value: f64) -> LedgerResult<()> {
    worksheet
        .write_number(row, col, value)
        .map(|_| ())
        .map_err(|e| LedgerError::Export(format!("failed to write number cell: {e}")))
}

fn save_to_buffer(mut workbook: Workbook) -> LedgerResult<Vec<u8>> {
    workbook
        .save_to_buffer()
        .map_err(|e| LedgerError::Export(format!("failed to serialize workbook: {e}")))
}
