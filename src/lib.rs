//! Aqualedger - daily water-quality measurement ledger
//!
//! This library records daily measurements (pH, temperature, flow) per
//! monitoring location into a spreadsheet store, keeps derived
//! monthly-average rows consistent with the daily rows, and exports
//! day-by-metric pivot reports.
//!
//! # Features
//!
//! - Upsert-by-date: one daily row per (location, date), last submission wins
//! - Monthly averages recomputed in full on every save (3-decimal precision,
//!   missing readings excluded rather than counted as zero)
//! - Pluggable storage: local `.xlsx` workbook or hosted spreadsheet document
//! - Pivot export: one row per metric, one column per day, blanks for
//!   unrecorded days
//!
//! # Example
//!
//! ```no_run
//! use aqualedger::ledger::Ledger;
//! use aqualedger::storage::XlsxStore;
//! use aqualedger::types::{Location, Readings};
//! use chrono::NaiveDate;
//!
//! let store = XlsxStore::create("ledger.xlsx")?;
//! let mut ledger = Ledger::new(store);
//!
//! let date = NaiveDate::from_ymd_opt(2024, 3, 1).expect("valid date");
//! let readings = Readings { ph: Some(7.2), temperature: None, flow: Some(12.5) };
//! let averages = ledger.upsert_daily_record(Location::PowerPlant, date, readings)?;
//!
//! println!("March pH average: {:?}", averages[0].averages.ph);
//! # Ok::<(), aqualedger::error::LedgerError>(())
//! ```

pub mod cli;
pub mod error;
pub mod export;
pub mod ledger;
pub mod storage;
pub mod types;

// Re-export commonly used types
pub use error::{LedgerError, LedgerResult};
pub use ledger::{monthly_averages, Ledger, ResetTarget};
pub use storage::{MemoryStore, RemoteSheetStore, TableStore, XlsxStore};
pub use types::{DailyRecord, LedgerRow, Location, Metric, MonthlyAverageRecord, Period, Readings};
