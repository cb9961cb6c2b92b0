//! In-process store used by unit tests and as the simplest [`TableStore`].

use std::collections::BTreeMap;

use super::TableStore;
use crate::error::LedgerResult;
use crate::types::{LedgerRow, Location};

#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: BTreeMap<Location, Vec<LedgerRow>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore::default()
    }

    /// Seed a table directly, bypassing the ledger's invariants.
    ///
    /// Tests use this to reproduce corrupted tables (e.g. duplicate dates)
    /// that the upsert contract would otherwise prevent.
    pub fn seed(&mut self, location: Location, rows: Vec<LedgerRow>) {
        self.tables.insert(location, rows);
    }
}

impl TableStore for MemoryStore {
    fn read_table(&self, location: Location) -> LedgerResult<Vec<LedgerRow>> {
        Ok(self.tables.get(&location).cloned().unwrap_or_default())
    }

    fn write_table(&mut self, location: Location, rows: &[LedgerRow]) -> LedgerResult<()> {
        self.tables.insert(location, rows.to_vec());
        Ok(())
    }

    fn list_locations(&self) -> LedgerResult<Vec<Location>> {
        Ok(self.tables.keys().copied().collect())
    }
}
