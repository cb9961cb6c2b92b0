//! Local `.xlsx` workbook store, one worksheet per location.
//!
//! Writes buffer the whole workbook and land it with a single
//! temp-file-then-rename swap, so a reader never observes a half-written
//! file. A missing workbook is a storage failure — [`XlsxStore::create`]
//! provisions a fresh one.

use std::collections::BTreeMap;
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};

use calamine::{open_workbook, Data, Reader, Xlsx};
use rust_xlsxwriter::{Format, Workbook};
use tracing::debug;

use super::grid::{self, Cell};
use super::TableStore;
use crate::error::{LedgerError, LedgerResult};
use crate::types::{LedgerRow, Location};

pub struct XlsxStore {
    path: PathBuf,
    lockfile: bool,
}

impl XlsxStore {
    /// Open a store over an existing workbook. Does not touch the disk until
    /// the first read or write.
    pub fn open(path: impl AsRef<Path>) -> Self {
        XlsxStore {
            path: path.as_ref().to_path_buf(),
            lockfile: false,
        }
    }

    /// Enable the per-location single-writer lockfile.
    ///
    /// The reference behavior is last-write-wins with no lock; this guard is
    /// an opt-in deviation and is never active by default.
    pub fn with_lockfile(mut self) -> Self {
        self.lockfile = true;
        self
    }

    /// Provision a fresh workbook with one empty (header-only) worksheet per
    /// monitoring location. Refuses to overwrite an existing file.
    pub fn create(path: impl AsRef<Path>) -> LedgerResult<Self> {
        let path = path.as_ref();
        if path.exists() {
            return Err(LedgerError::storage_msg(format!(
                "workbook {} already exists",
                path.display()
            )));
        }
        let store = XlsxStore::open(path);
        let sheets: BTreeMap<String, Vec<Vec<Cell>>> = Location::ALL
            .iter()
            .map(|location| (location.name().to_string(), grid::rows_to_grid(&[])))
            .collect();
        store.write_all(&sheets)?;
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read every worksheet into a cell grid. Sheets that do not belong to a
    /// known location are carried through untouched.
    fn read_all(&self) -> LedgerResult<BTreeMap<String, Vec<Vec<Cell>>>> {
        let mut workbook: Xlsx<_> = open_workbook(&self.path).map_err(|e| {
            LedgerError::storage(
                format!("failed to open workbook {}", self.path.display()),
                e,
            )
        })?;

        let mut sheets = BTreeMap::new();
        for sheet_name in workbook.sheet_names().to_vec() {
            let range = workbook.worksheet_range(&sheet_name).map_err(|e| {
                LedgerError::storage(format!("failed to read worksheet '{sheet_name}'"), e)
            })?;
            let grid: Vec<Vec<Cell>> = range
                .rows()
                .map(|row| row.iter().map(data_to_cell).collect())
                .collect();
            sheets.insert(sheet_name, grid);
        }
        Ok(sheets)
    }

    /// Rebuild the whole workbook and swap it into place atomically.
    fn write_all(&self, sheets: &BTreeMap<String, Vec<Vec<Cell>>>) -> LedgerResult<()> {
        let mut workbook = Workbook::new();
        let header = Format::new().set_bold();

        for (sheet_name, grid) in sheets {
            let worksheet = workbook.add_worksheet();
            worksheet.set_name(sheet_name).map_err(|e| {
                LedgerError::storage(format!("failed to name worksheet '{sheet_name}'"), e)
            })?;
            for (row_idx, line) in grid.iter().enumerate() {
                for (col_idx, cell) in line.iter().enumerate() {
                    let row = row_idx as u32;
                    let col = col_idx as u16;
                    let result = match cell {
                        Cell::Empty => continue,
                        Cell::Number(value) => worksheet.write_number(row, col, *value),
                        Cell::Text(value) if row_idx == 0 => {
                            worksheet.write_string_with_format(row, col, value, &header)
                        }
                        Cell::Text(value) => worksheet.write_string(row, col, value),
                    };
                    result.map_err(|e| {
                        LedgerError::storage(
                            format!("failed to write cell in worksheet '{sheet_name}'"),
                            e,
                        )
                    })?;
                }
            }
        }

        let tmp = sibling_path(&self.path, ".tmp");
        workbook.save(&tmp).map_err(|e| {
            LedgerError::storage(format!("failed to save workbook {}", tmp.display()), e)
        })?;
        fs::rename(&tmp, &self.path)?;
        debug!(path = %self.path.display(), sheets = sheets.len(), "workbook written");
        Ok(())
    }

    fn lock(&self, location: Location) -> LedgerResult<Option<LockGuard>> {
        if !self.lockfile {
            return Ok(None);
        }
        let slug = location.name().to_ascii_lowercase().replace(' ', "-");
        let path = sibling_path(&self.path, &format!(".{slug}.lock"));
        match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(_) => Ok(Some(LockGuard { path })),
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                Err(LedgerError::storage_msg(format!(
                    "location '{location}' is locked by another writer ({})",
                    path.display()
                )))
            }
            Err(e) => Err(LedgerError::Io(e)),
        }
    }
}

impl TableStore for XlsxStore {
    fn read_table(&self, location: Location) -> LedgerResult<Vec<LedgerRow>> {
        let sheets = self.read_all()?;
        match sheets.get(location.name()) {
            Some(cells) => grid::grid_to_rows(cells),
            // Worksheet not provisioned yet: an empty table, not an error.
            None => Ok(Vec::new()),
        }
    }

    fn write_table(&mut self, location: Location, rows: &[LedgerRow]) -> LedgerResult<()> {
        let _lock = self.lock(location)?;
        let mut sheets = self.read_all()?;
        sheets.insert(location.name().to_string(), grid::rows_to_grid(rows));
        self.write_all(&sheets)
    }

    fn list_locations(&self) -> LedgerResult<Vec<Location>> {
        let sheets = self.read_all()?;
        Ok(Location::ALL
            .into_iter()
            .filter(|location| sheets.contains_key(location.name()))
            .collect())
    }
}

/// `path` with `suffix` appended to the file name, staying in the same
/// directory so `fs::rename` is a same-filesystem move.
fn sibling_path(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(suffix);
    PathBuf::from(name)
}

fn data_to_cell(data: &Data) -> Cell {
    match data {
        Data::Empty => Cell::Empty,
        Data::Float(value) => Cell::Number(*value),
        Data::Int(value) => Cell::Number(*value as f64),
        Data::String(value) => Cell::Text(value.clone()),
        other => Cell::Text(other.to_string()),
    }
}

#[derive(Debug)]
struct LockGuard {
    path: PathBuf,
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.path);
    }
}
