//! Row ⇄ cell-grid codec shared by the spreadsheet-backed stores.
//!
//! Both store realizations persist a location's table as a rectangular cell
//! grid: a header row followed by one line per ledger row. The row kind is an
//! explicit column — daily and average rows are never distinguished by a
//! marker value inside the date field.

use chrono::NaiveDate;

use crate::error::{LedgerError, LedgerResult};
use crate::types::{DailyRecord, LedgerRow, Metric, MonthlyAverageRecord, Period, Readings};

/// Column headers, in persisted order.
pub const HEADERS: [&str; 5] = ["Kind", "Date", "pH", "Temperature", "Flow"];

pub const KIND_DAILY: &str = "daily";
pub const KIND_AVERAGE: &str = "average";

const DATE_FORMAT: &str = "%Y-%m-%d";

/// One spreadsheet cell as both stores see it.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Number(f64),
    Text(String),
}

impl Cell {
    fn number(value: Option<f64>) -> Cell {
        value.map(Cell::Number).unwrap_or(Cell::Empty)
    }

    fn text(value: impl Into<String>) -> Cell {
        Cell::Text(value.into())
    }
}

/// Encode ledger rows into a grid, header row included.
pub fn rows_to_grid(rows: &[LedgerRow]) -> Vec<Vec<Cell>> {
    let mut grid = Vec::with_capacity(rows.len() + 1);
    grid.push(HEADERS.iter().map(|h| Cell::text(*h)).collect());
    for row in rows {
        grid.push(match row {
            LedgerRow::Daily(record) => encode_daily(record),
            LedgerRow::MonthlyAverage(record) => encode_average(record),
        });
    }
    grid
}

fn encode_daily(record: &DailyRecord) -> Vec<Cell> {
    vec![
        Cell::text(KIND_DAILY),
        Cell::text(record.date.format(DATE_FORMAT).to_string()),
        Cell::number(record.readings.ph),
        Cell::number(record.readings.temperature),
        Cell::number(record.readings.flow),
    ]
}

fn encode_average(record: &MonthlyAverageRecord) -> Vec<Cell> {
    vec![
        Cell::text(KIND_AVERAGE),
        Cell::text(format!("{:04}-{:02}", record.period.year, record.period.month)),
        Cell::number(record.averages.ph),
        Cell::number(record.averages.temperature),
        Cell::number(record.averages.flow),
    ]
}

/// Decode a grid back into ledger rows.
///
/// Tolerates a missing header row and skips fully blank lines; anything else
/// that does not decode is a [`LedgerError::Parse`] naming the row.
pub fn grid_to_rows(grid: &[Vec<Cell>]) -> LedgerResult<Vec<LedgerRow>> {
    let mut rows = Vec::new();
    for (idx, line) in grid.iter().enumerate() {
        if idx == 0 && is_header(line) {
            continue;
        }
        if line.iter().all(|cell| matches!(cell, Cell::Empty)) {
            continue;
        }
        rows.push(decode_line(line, idx)?);
    }
    Ok(rows)
}

fn is_header(line: &[Cell]) -> bool {
    matches!(line.first(), Some(Cell::Text(s)) if s == HEADERS[0])
}

fn decode_line(line: &[Cell], idx: usize) -> LedgerResult<LedgerRow> {
    let row_no = idx + 1;
    let kind = text_at(line, 0)
        .ok_or_else(|| LedgerError::Parse(format!("row {row_no}: missing kind column")))?;
    let date_field = text_at(line, 1)
        .ok_or_else(|| LedgerError::Parse(format!("row {row_no}: missing date column")))?;

    let readings = Readings {
        ph: number_at(line, 2, row_no)?,
        temperature: number_at(line, 3, row_no)?,
        flow: number_at(line, 4, row_no)?,
    };

    match kind.as_str() {
        KIND_DAILY => {
            let date = NaiveDate::parse_from_str(&date_field, DATE_FORMAT).map_err(|_| {
                LedgerError::Parse(format!("row {row_no}: bad date '{date_field}'"))
            })?;
            Ok(LedgerRow::Daily(DailyRecord { date, readings }))
        }
        KIND_AVERAGE => {
            let period = parse_period(&date_field).ok_or_else(|| {
                LedgerError::Parse(format!("row {row_no}: bad period '{date_field}'"))
            })?;
            Ok(LedgerRow::MonthlyAverage(MonthlyAverageRecord {
                period,
                averages: readings,
            }))
        }
        other => Err(LedgerError::Parse(format!(
            "row {row_no}: unknown row kind '{other}'"
        ))),
    }
}

fn parse_period(field: &str) -> Option<Period> {
    let (year, month) = field.split_once('-')?;
    let year: i32 = year.parse().ok()?;
    let month: u32 = month.parse().ok()?;
    Period::new(year, month).ok()
}

fn text_at(line: &[Cell], idx: usize) -> Option<String> {
    match line.get(idx)? {
        Cell::Text(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        _ => None,
    }
}

fn number_at(line: &[Cell], idx: usize, row_no: usize) -> LedgerResult<Option<f64>> {
    match line.get(idx) {
        None | Some(Cell::Empty) => Ok(None),
        Some(Cell::Number(n)) => Ok(Some(*n)),
        // Hand-edited sheets sometimes hold numbers as text.
        Some(Cell::Text(s)) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return Ok(None);
            }
            trimmed.parse::<f64>().map(Some).map_err(|_| {
                let column = HEADERS.get(idx).copied().unwrap_or("?");
                LedgerError::Parse(format!(
                    "row {row_no}: non-numeric {column} value '{trimmed}'"
                ))
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample_rows() -> Vec<LedgerRow> {
        vec![
            LedgerRow::Daily(DailyRecord {
                date: NaiveDate::from_ymd_opt(2024, 3, 2).unwrap(),
                readings: Readings {
                    ph: Some(7.4),
                    temperature: None,
                    flow: Some(11.0),
                },
            }),
            LedgerRow::Daily(DailyRecord {
                date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
                readings: Readings {
                    ph: Some(7.2),
                    temperature: Some(26.5),
                    flow: Some(12.5),
                },
            }),
            LedgerRow::MonthlyAverage(MonthlyAverageRecord {
                period: Period { year: 2024, month: 3 },
                averages: Readings {
                    ph: Some(7.3),
                    temperature: Some(26.5),
                    flow: Some(11.75),
                },
            }),
        ]
    }

    #[test]
    fn test_grid_round_trip() {
        let rows = sample_rows();
        let grid = rows_to_grid(&rows);
        assert_eq!(grid.len(), rows.len() + 1);
        let decoded = grid_to_rows(&grid).unwrap();
        assert_eq!(decoded, rows);
    }

    #[test]
    fn test_missing_readings_stay_missing() {
        let rows = vec![LedgerRow::Daily(DailyRecord {
            date: NaiveDate::from_ymd_opt(2024, 1, 5).unwrap(),
            readings: Readings::default(),
        })];
        let decoded = grid_to_rows(&rows_to_grid(&rows)).unwrap();
        match &decoded[0] {
            LedgerRow::Daily(record) => assert!(record.readings.is_empty()),
            other => panic!("expected daily row, got {other:?}"),
        }
    }

    #[test]
    fn test_numeric_text_cells_accepted() {
        let grid = vec![vec![
            Cell::Text(KIND_DAILY.to_string()),
            Cell::Text("2024-03-10".to_string()),
            Cell::Text("7.1".to_string()),
            Cell::Empty,
            Cell::Text(" 3.25 ".to_string()),
        ]];
        let rows = grid_to_rows(&grid).unwrap();
        match &rows[0] {
            LedgerRow::Daily(record) => {
                assert_eq!(record.readings.ph, Some(7.1));
                assert_eq!(record.readings.flow, Some(3.25));
            }
            other => panic!("expected daily row, got {other:?}"),
        }
    }

    #[test]
    fn test_unknown_kind_rejected() {
        let grid = vec![vec![
            Cell::Text("Rata-rata 03/2024".to_string()),
            Cell::Text("2024-03-01".to_string()),
            Cell::Empty,
            Cell::Empty,
            Cell::Empty,
        ]];
        let err = grid_to_rows(&grid).unwrap_err();
        assert!(err.to_string().contains("unknown row kind"));
    }

    #[test]
    fn test_bad_date_rejected() {
        let grid = vec![vec![
            Cell::Text(KIND_DAILY.to_string()),
            Cell::Text("03/01/2024".to_string()),
            Cell::Number(7.0),
            Cell::Empty,
            Cell::Empty,
        ]];
        assert!(grid_to_rows(&grid).is_err());
    }

    #[test]
    fn test_blank_lines_skipped() {
        let mut grid = rows_to_grid(&sample_rows());
        grid.push(vec![Cell::Empty; 5]);
        let decoded = grid_to_rows(&grid).unwrap();
        assert_eq!(decoded.len(), sample_rows().len());
    }
}
