//! The Monthly Measurement Ledger.
//!
//! Owns the per-location table of daily measurements plus derived
//! monthly-average rows. Every operation is a single transformation over the
//! full in-memory table for one location, followed by a whole-table rewrite
//! through the injected [`TableStore`].

use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;
use tracing::{debug, info};

use crate::error::LedgerResult;
use crate::export::{build_pivot, Pivot};
use crate::storage::TableStore;
use crate::types::{
    DailyRecord, LedgerRow, Location, Metric, MonthlyAverageRecord, Period, Readings,
};

/// Fixed decimal precision for derived averages.
pub(crate) fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

/// Target of a [`Ledger::reset`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetTarget {
    One(Location),
    All,
}

/// The ledger over an injected storage client.
///
/// Holds a per-location cached read-view of the table. Every mutating
/// operation invalidates the affected location's cache entry before the write
/// and refreshes it after a successful persist, so a read following a
/// mutation always observes the persisted rows.
pub struct Ledger<S: TableStore> {
    store: S,
    cache: HashMap<Location, Vec<LedgerRow>>,
}

impl<S: TableStore> Ledger<S> {
    pub fn new(store: S) -> Self {
        Ledger {
            store,
            cache: HashMap::new(),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// The current table for `location`, in canonical order as persisted.
    ///
    /// Served from the cached read-view when valid, otherwise loaded from the
    /// store.
    pub fn rows(&mut self, location: Location) -> LedgerResult<&[LedgerRow]> {
        if !self.cache.contains_key(&location) {
            let rows = self.store.read_table(location)?;
            debug!(location = %location, rows = rows.len(), "loaded table from store");
            self.cache.insert(location, rows);
        }
        // Entry was just ensured above.
        Ok(self
            .cache
            .get(&location)
            .map(Vec::as_slice)
            .unwrap_or_default())
    }

    /// The daily records currently held for `location` (average rows excluded).
    pub fn daily_records(&mut self, location: Location) -> LedgerResult<Vec<DailyRecord>> {
        Ok(self
            .rows(location)?
            .iter()
            .filter_map(LedgerRow::as_daily)
            .cloned()
            .collect())
    }

    /// Insert or replace the daily record for `(location, date)`.
    ///
    /// Readings are validated before any read or write, so invalid input
    /// leaves both the store and the cached view untouched. On success the
    /// month's average rows are regenerated and the whole table is persisted.
    pub fn upsert_daily_record(
        &mut self,
        location: Location,
        date: NaiveDate,
        readings: Readings,
    ) -> LedgerResult<Vec<MonthlyAverageRecord>> {
        readings.validate()?;

        let mut dailies = self.daily_records(location)?;
        let replaced = dailies.iter().any(|r| r.date == date);
        dailies.retain(|r| r.date != date);
        dailies.push(DailyRecord { date, readings });

        let averages = self.commit(location, dailies)?;
        info!(
            location = %location,
            date = %date,
            replaced,
            "daily record upserted"
        );
        Ok(averages)
    }

    /// Regenerate the monthly-average rows for `location` from its current
    /// daily records and persist the result.
    ///
    /// An empty daily-record set yields an empty average set, not an error.
    pub fn recompute_monthly_averages(
        &mut self,
        location: Location,
    ) -> LedgerResult<Vec<MonthlyAverageRecord>> {
        let dailies = self.daily_records(location)?;
        self.commit(location, dailies)
    }

    /// Day-by-metric pivot for one location and month.
    ///
    /// Fails with `DuplicateDateConflict` if the stored table holds two daily
    /// rows for the same date — legacy or merged data the upsert contract
    /// cannot rule out.
    pub fn export_pivot(
        &mut self,
        location: Location,
        year: i32,
        month: u32,
    ) -> LedgerResult<Pivot> {
        let period = Period::new(year, month)?;
        let dailies = self.daily_records(location)?;
        build_pivot(location, period, &dailies)
    }

    /// Discard all rows for the target location(s), leaving empty tables.
    ///
    /// Destructive and irreversible from the ledger's point of view.
    pub fn reset(&mut self, target: ResetTarget) -> LedgerResult<()> {
        let locations: Vec<Location> = match target {
            ResetTarget::One(location) => vec![location],
            ResetTarget::All => Location::ALL.to_vec(),
        };
        for location in locations {
            self.cache.remove(&location);
            self.store.write_table(location, &[])?;
            self.cache.insert(location, Vec::new());
            info!(location = %location, "ledger reset");
        }
        Ok(())
    }

    /// Rebuild `location`'s table from `dailies` in canonical order and
    /// persist it as a whole-table replace.
    fn commit(
        &mut self,
        location: Location,
        mut dailies: Vec<DailyRecord>,
    ) -> LedgerResult<Vec<MonthlyAverageRecord>> {
        let averages = monthly_averages(&dailies);

        // Canonical order: daily rows by date descending, then average rows
        // by period ascending. Applied on every persist so repeated saves
        // produce identical tables.
        dailies.sort_by(|a, b| b.date.cmp(&a.date));
        let mut rows: Vec<LedgerRow> = dailies.into_iter().map(LedgerRow::Daily).collect();
        rows.extend(
            averages
                .iter()
                .cloned()
                .map(LedgerRow::MonthlyAverage),
        );

        // Invalidate before the write; refresh only once the store accepted
        // the whole table.
        self.cache.remove(&location);
        self.store.write_table(location, &rows)?;
        self.cache.insert(location, rows);
        Ok(averages)
    }
}

/// Compute monthly averages from daily records.
///
/// Records are grouped by calendar month; each metric's mean covers only the
/// records with a present value for that metric. A group with no valid values
/// for a metric gets a missing average for it, never zero. Means are rounded
/// to 3 decimals. Output is ordered by period ascending.
pub fn monthly_averages(dailies: &[DailyRecord]) -> Vec<MonthlyAverageRecord> {
    let mut groups: BTreeMap<Period, Vec<&Readings>> = BTreeMap::new();
    for record in dailies {
        groups
            .entry(Period::of(record.date))
            .or_default()
            .push(&record.readings);
    }

    groups
        .into_iter()
        .map(|(period, group)| {
            let mut averages = Readings::default();
            for metric in Metric::ALL {
                let values: Vec<f64> =
                    group.iter().filter_map(|r| r.get(metric)).collect();
                if !values.is_empty() {
                    let mean = values.iter().sum::<f64>() / values.len() as f64;
                    averages.set(metric, round3(mean));
                }
            }
            MonthlyAverageRecord { period, averages }
        })
        .collect()
}
