use chrono::NaiveDate;
use thiserror::Error;

use crate::types::Location;

pub type LedgerResult<T> = Result<T, LedgerError>;

#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("unknown monitoring location '{0}'")]
    InvalidLocation(String),

    #[error("invalid {metric} reading {value}: expected {bounds}")]
    InvalidReading {
        metric: &'static str,
        value: f64,
        bounds: &'static str,
    },

    #[error("duplicate daily records for {location} on {date}")]
    DuplicateDateConflict { location: Location, date: NaiveDate },

    #[error("storage unavailable: {context}")]
    StorageUnavailable {
        context: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("malformed table data: {0}")]
    Parse(String),

    #[error("export error: {0}")]
    Export(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl LedgerError {
    /// Storage failure with the underlying cause attached.
    pub fn storage(
        context: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        LedgerError::StorageUnavailable {
            context: context.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Storage failure where no underlying error value exists (e.g. a held lock).
    pub fn storage_msg(context: impl Into<String>) -> Self {
        LedgerError::StorageUnavailable {
            context: context.into(),
            source: None,
        }
    }
}
