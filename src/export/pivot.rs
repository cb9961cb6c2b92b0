//! Day-by-metric pivot for one location and month.

use std::collections::HashSet;

use chrono::Datelike;

use crate::error::{LedgerError, LedgerResult};
use crate::ledger::round3;
use crate::types::{DailyRecord, Location, Metric, Period};

/// One metric row per tracked metric, one cell per day of the month, plus a
/// trailing average over the populated cells.
#[derive(Debug, Clone, PartialEq)]
pub struct Pivot {
    pub location: Location,
    pub period: Period,
    pub rows: Vec<PivotRow>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PivotRow {
    pub metric: Metric,
    /// Index 0 is day 1. `None` where no daily record exists for that day —
    /// left blank, never zero or interpolated.
    pub cells: Vec<Option<f64>>,
    /// Mean of the populated cells, 3 decimals; `None` if the month has no
    /// reading for this metric.
    pub average: Option<f64>,
}

/// Build the pivot from a location's daily records.
///
/// Two daily records on the same date are a data-corruption scenario the
/// upsert contract prevents, but legacy or merged tables can still hold one;
/// it fails fast here rather than silently picking a value.
pub fn build_pivot(
    location: Location,
    period: Period,
    dailies: &[DailyRecord],
) -> LedgerResult<Pivot> {
    let in_period: Vec<&DailyRecord> = dailies
        .iter()
        .filter(|record| Period::of(record.date) == period)
        .collect();

    let mut seen = HashSet::new();
    for record in &in_period {
        if !seen.insert(record.date) {
            return Err(LedgerError::DuplicateDateConflict {
                location,
                date: record.date,
            });
        }
    }

    let days = period.days() as usize;
    let rows = Metric::ALL
        .into_iter()
        .map(|metric| {
            let mut cells = vec![None; days];
            for record in &in_period {
                if let Some(value) = record.readings.get(metric) {
                    let day = record.date.day() as usize;
                    cells[day - 1] = Some(value);
                }
            }
            let values: Vec<f64> = cells.iter().flatten().copied().collect();
            let average = if values.is_empty() {
                None
            } else {
                Some(round3(values.iter().sum::<f64>() / values.len() as f64))
            };
            PivotRow {
                metric,
                cells,
                average,
            }
        })
        .collect();

    Ok(Pivot {
        location,
        period,
        rows,
    })
}
