//! Hosted spreadsheet service store.
//!
//! Addresses a spreadsheet document by id; each monitoring location maps to a
//! worksheet. A read fetches the worksheet's full value grid as JSON, and a
//! write replaces it with a single batched update request — never per-cell
//! calls. All requests are blocking; failures are surfaced with the
//! underlying cause attached and are not retried.

use std::time::Duration;

use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use super::grid::{self, Cell};
use super::TableStore;
use crate::error::{LedgerError, LedgerResult};
use crate::types::{LedgerRow, Location};

/// Connection parameters for the hosted service, supplied by the environment
/// and treated as opaque.
#[derive(Debug, Clone)]
pub struct RemoteConfig {
    /// Service base URL, e.g. `https://sheets.example.com/v1`.
    pub endpoint: String,
    pub document_id: String,
    pub token: String,
}

pub struct RemoteSheetStore {
    agent: ureq::Agent,
    config: RemoteConfig,
}

#[derive(Deserialize)]
struct GridPayload {
    #[serde(default)]
    values: Vec<Vec<Value>>,
}

#[derive(Deserialize)]
struct WorksheetListPayload {
    #[serde(default)]
    worksheets: Vec<String>,
}

impl RemoteSheetStore {
    pub fn new(config: RemoteConfig) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(Duration::from_secs(30))
            .build();
        RemoteSheetStore { agent, config }
    }

    fn values_url(&self, location: Location) -> String {
        format!(
            "{}/documents/{}/worksheets/{}/values",
            self.config.endpoint.trim_end_matches('/'),
            self.config.document_id,
            // Worksheet names come from the fixed location set; a space is
            // the only character needing escape.
            location.name().replace(' ', "%20")
        )
    }

    fn worksheets_url(&self) -> String {
        format!(
            "{}/documents/{}/worksheets",
            self.config.endpoint.trim_end_matches('/'),
            self.config.document_id
        )
    }

    fn authorization(&self) -> String {
        format!("Bearer {}", self.config.token)
    }
}

impl TableStore for RemoteSheetStore {
    fn read_table(&self, location: Location) -> LedgerResult<Vec<LedgerRow>> {
        let url = self.values_url(location);
        let response = match self
            .agent
            .get(&url)
            .set("Authorization", &self.authorization())
            .call()
        {
            Ok(response) => response,
            // Worksheet not provisioned yet: an empty table, not an error.
            Err(ureq::Error::Status(404, _)) => return Ok(Vec::new()),
            Err(e) => {
                return Err(LedgerError::storage(
                    format!("failed to fetch worksheet '{location}'"),
                    e,
                ))
            }
        };

        let payload: GridPayload = response.into_json().map_err(|e| {
            LedgerError::storage(format!("bad response body for worksheet '{location}'"), e)
        })?;
        let cells: Vec<Vec<Cell>> = payload
            .values
            .iter()
            .map(|line| line.iter().map(json_to_cell).collect())
            .collect();
        debug!(location = %location, rows = cells.len(), "worksheet fetched");
        grid::grid_to_rows(&cells)
    }

    fn write_table(&mut self, location: Location, rows: &[LedgerRow]) -> LedgerResult<()> {
        let values: Vec<Vec<Value>> = grid::rows_to_grid(rows)
            .iter()
            .map(|line| line.iter().map(cell_to_json).collect())
            .collect();

        self.agent
            .put(&self.values_url(location))
            .set("Authorization", &self.authorization())
            .send_json(json!({ "values": values }))
            .map_err(|e| {
                LedgerError::storage(format!("failed to update worksheet '{location}'"), e)
            })?;
        debug!(location = %location, "worksheet replaced");
        Ok(())
    }

    fn list_locations(&self) -> LedgerResult<Vec<Location>> {
        let payload: WorksheetListPayload = self
            .agent
            .get(&self.worksheets_url())
            .set("Authorization", &self.authorization())
            .call()
            .map_err(|e| LedgerError::storage("failed to list worksheets", e))?
            .into_json()
            .map_err(|e| LedgerError::storage("bad worksheet list response", e))?;

        Ok(Location::ALL
            .into_iter()
            .filter(|location| {
                payload
                    .worksheets
                    .iter()
                    .any(|name| name == location.name())
            })
            .collect())
    }
}

fn cell_to_json(cell: &Cell) -> Value {
    match cell {
        Cell::Empty => Value::Null,
        Cell::Number(value) => json!(value),
        Cell::Text(value) => Value::String(value.clone()),
    }
}

fn json_to_cell(value: &Value) -> Cell {
    match value {
        Value::Null => Cell::Empty,
        Value::Number(n) => n.as_f64().map(Cell::Number).unwrap_or(Cell::Empty),
        Value::String(s) => Cell::Text(s.clone()),
        other => Cell::Text(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_json_round_trip() {
        let cells = [
            Cell::Empty,
            Cell::Number(7.25),
            Cell::Text("daily".to_string()),
        ];
        for cell in &cells {
            assert_eq!(&json_to_cell(&cell_to_json(cell)), cell);
        }
    }

    #[test]
    fn test_values_url_escapes_worksheet_name() {
        let store = RemoteSheetStore::new(RemoteConfig {
            endpoint: "https://sheets.example.com/v1/".to_string(),
            document_id: "doc-123".to_string(),
            token: "secret".to_string(),
        });
        assert_eq!(
            store.values_url(Location::PowerPlant),
            "https://sheets.example.com/v1/documents/doc-123/worksheets/Power%20Plant/values"
        );
    }
}
