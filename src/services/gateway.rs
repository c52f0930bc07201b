use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

use crate::adapters::{QueryOpts, RecordSource};

/// Single entry point for record-set reads.
///
/// Never fails: a fault of any kind is logged and becomes an empty result,
/// so the snapshot degrades per field instead of failing as a whole.
#[derive(Clone)]
pub struct SourceGateway {
    source: Arc<dyn RecordSource>,
}

impl SourceGateway {
    pub fn new(source: Arc<dyn RecordSource>) -> Self {
        Self { source }
    }

    pub fn source_name(&self) -> &'static str {
        self.source.name()
    }

    /// Read raw rows from a record set
    #[instrument(skip(self, opts), fields(source = self.source.name()))]
    pub async fn read_raw(&self, table: &'static str, opts: QueryOpts) -> Vec<Value> {
        match self.source.fetch_rows(table, &opts).await {
            Ok(rows) => rows,
            Err(e) => {
                warn!(table, error = %e, "Record set read failed, using empty result");
                Vec::new()
            }
        }
    }

    /// Read and decode rows; rows that cannot be decoded are skipped.
    pub async fn read<T: DeserializeOwned>(&self, table: &'static str, opts: QueryOpts) -> Vec<T> {
        let rows = self.read_raw(table, opts).await;
        decode_rows(table, rows)
    }
}

fn decode_rows<T: DeserializeOwned>(table: &str, rows: Vec<Value>) -> Vec<T> {
    let total = rows.len();
    let decoded: Vec<T> = rows
        .into_iter()
        .filter_map(|row| match serde_json::from_value(row) {
            Ok(record) => Some(record),
            Err(e) => {
                debug!(table, error = %e, "Skipping undecodable row");
                None
            }
        })
        .collect();
    if decoded.len() < total {
        warn!(
            table,
            skipped = total - decoded.len(),
            "Some rows could not be decoded"
        );
    }
    decoded
}
