//! Tabular storage boundary.
//!
//! The ledger reads and writes whole per-location tables through the
//! [`TableStore`] trait and never depends on which realization is active:
//! - [`XlsxStore`] — a local `.xlsx` workbook, one worksheet per location
//! - [`RemoteSheetStore`] — a hosted spreadsheet document addressed by id
//! - [`MemoryStore`] — in-process tables for tests

pub(crate) mod grid;
mod memory;
mod remote;
mod xlsx;

pub use memory::MemoryStore;
pub use remote::{RemoteConfig, RemoteSheetStore};
pub use xlsx::XlsxStore;

use crate::error::LedgerResult;
use crate::types::{LedgerRow, Location};

/// Whole-table access to one location's persisted rows.
///
/// Writes replace the full table; partial row writes are not part of the
/// contract. Read/write failures surface as `StorageUnavailable` with the
/// underlying cause attached and are never retried here.
pub trait TableStore {
    /// Read the full table for `location`. A location that has never been
    /// written reads as an empty table.
    fn read_table(&self, location: Location) -> LedgerResult<Vec<LedgerRow>>;

    /// Replace the full table for `location` with `rows`.
    fn write_table(&mut self, location: Location, rows: &[LedgerRow]) -> LedgerResult<()>;

    /// The locations the store currently holds a table for.
    fn list_locations(&self) -> LedgerResult<Vec<Location>>;
}
