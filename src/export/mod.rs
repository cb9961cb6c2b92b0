//! Export boundary: pivot reports and workbook byte streams.

mod pivot;
mod workbook;

pub use pivot::{build_pivot, Pivot, PivotRow};
pub use workbook::{ledger_workbook, pivot_workbook};
