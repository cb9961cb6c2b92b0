//! Storage selection for the CLI.
//!
//! The storage client is constructed exactly once per invocation, here, and
//! handed into the ledger — never reached through ambient globals.

use std::path::PathBuf;

use clap::Args;

use crate::error::{LedgerError, LedgerResult};
use crate::storage::{RemoteConfig, RemoteSheetStore, TableStore, XlsxStore};
use crate::types::{LedgerRow, Location};

/// Where the ledger lives: a local workbook or a hosted document.
#[derive(Debug, Clone, Args)]
pub struct StorageArgs {
    /// Path to the local .xlsx workbook
    #[arg(short, long, value_name = "FILE", conflicts_with = "document")]
    pub file: Option<PathBuf>,

    /// Hosted spreadsheet document id (switches to the remote store)
    #[arg(long, env = "AQUALEDGER_DOCUMENT", value_name = "ID")]
    pub document: Option<String>,

    /// Hosted spreadsheet service base URL
    #[arg(
        long,
        env = "AQUALEDGER_ENDPOINT",
        default_value = "https://sheets.example.com/v1",
        value_name = "URL"
    )]
    pub endpoint: String,

    /// Hosted spreadsheet service access token
    #[arg(long, env = "AQUALEDGER_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Acquire a per-location single-writer lock around writes (local store
    /// only). The default matches the reference behavior: last write wins,
    /// no lock.
    #[arg(long)]
    pub lock: bool,
}

impl StorageArgs {
    /// A local-workbook selection, used by tests and library callers.
    pub fn local(path: impl Into<PathBuf>) -> Self {
        StorageArgs {
            file: Some(path.into()),
            document: None,
            endpoint: "https://sheets.example.com/v1".to_string(),
            token: None,
            lock: false,
        }
    }

    /// Construct the selected storage client.
    pub fn open(&self) -> LedgerResult<AnyStore> {
        if let Some(document_id) = &self.document {
            let token = self.token.clone().ok_or_else(|| {
                LedgerError::storage_msg(
                    "remote store requires an access token (--token or AQUALEDGER_TOKEN)",
                )
            })?;
            return Ok(AnyStore::Remote(RemoteSheetStore::new(RemoteConfig {
                endpoint: self.endpoint.clone(),
                document_id: document_id.clone(),
                token,
            })));
        }
        if let Some(path) = &self.file {
            let mut store = XlsxStore::open(path);
            if self.lock {
                store = store.with_lockfile();
            }
            return Ok(AnyStore::Xlsx(store));
        }
        Err(LedgerError::storage_msg(
            "no storage selected: pass --file <xlsx> or --document <id>",
        ))
    }

    /// Provision fresh, empty tables: create the workbook (local) or write
    /// header-only worksheets (remote).
    pub fn provision(&self) -> LedgerResult<AnyStore> {
        if self.document.is_some() {
            let mut store = self.open()?;
            for location in Location::ALL {
                store.write_table(location, &[])?;
            }
            return Ok(store);
        }
        if let Some(path) = &self.file {
            return Ok(AnyStore::Xlsx(XlsxStore::create(path)?));
        }
        Err(LedgerError::storage_msg(
            "no storage selected: pass --file <xlsx> or --document <id>",
        ))
    }
}

/// Either store realization behind one [`TableStore`] face.
pub enum AnyStore {
    Xlsx(XlsxStore),
    Remote(RemoteSheetStore),
}

impl TableStore for AnyStore {
    fn read_table(&self, location: Location) -> LedgerResult<Vec<LedgerRow>> {
        match self {
            AnyStore::Xlsx(store) => store.read_table(location),
            AnyStore::Remote(store) => store.read_table(location),
        }
    }

    fn write_table(&mut self, location: Location, rows: &[LedgerRow]) -> LedgerResult<()> {
        match self {
            AnyStore::Xlsx(store) => store.write_table(location, rows),
            AnyStore::Remote(store) => store.write_table(location, rows),
        }
    }

    fn list_locations(&self) -> LedgerResult<Vec<Location>> {
        match self {
            AnyStore::Xlsx(store) => store.list_locations(),
            AnyStore::Remote(store) => store.list_locations(),
        }
    }
}
