//! Processing pipeline for one uploaded CSV object.
//!
//! fetch → reassemble broken rows → tabular parse → aggregate → write the
//! summary document next to the original under the `processed/` prefix.

pub mod aggregate;
pub mod amount;
pub mod reassemble;

use std::collections::HashMap;

use csv::StringRecord;
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use crate::error::PipelineError;
use crate::event::ObjectRef;
use crate::process::aggregate::{Aggregation, Row, Summary};
use crate::store::ObjectStore;

/// JSON document written to the store on success.
#[derive(Debug, Serialize)]
pub struct ProcessedDocument {
    pub summary: Summary,
    pub rows: Vec<Row>,
}

/// Output key for the success summary: `processed/<basename>.summary.json`.
pub fn summary_key(object: &ObjectRef) -> String {
    format!("processed/{}.summary.json", object.basename())
}

/// Output key for preserved raw input after a row failure:
/// `processed/errors/<basename>.error.txt`.
pub fn error_key(object: &ObjectRef) -> String {
    format!("processed/errors/{}.error.txt", object.basename())
}

/// DictReader-style view of one record: header name → field value. A column
/// the file never declares is simply absent from the map; ragged records
/// never reach here, the strict reader aborts iteration on them first.
fn field_map(headers: &StringRecord, record: &StringRecord) -> HashMap<String, String> {
    headers
        .iter()
        .zip(record.iter())
        .map(|(header, value)| (header.trim().to_string(), value.to_string()))
        .collect()
}

/// Run the whole pipeline for one object. Every failure is terminal for the
/// invocation; a row-iteration failure additionally preserves the original
/// raw bytes under [`error_key`] before returning.
#[instrument(level = "info", skip(store, object), fields(bucket = %object.bucket, key = %object.key))]
pub async fn process_object<S: ObjectStore>(
    store: &S,
    object: &ObjectRef,
) -> Result<ProcessedDocument, PipelineError> {
    let raw = store
        .fetch(&object.bucket, &object.key)
        .await
        .map_err(PipelineError::Fetch)?;
    let text = String::from_utf8_lossy(&raw);

    let cleaned = reassemble::reassemble_records(&text);

    let mut reader = csv::Reader::from_reader(cleaned.as_bytes());
    let headers = reader
        .headers()
        .map_err(|e| PipelineError::ParseInit(e.into()))?
        .clone();
    debug!(columns = headers.len(), "parsed header row");

    let mut agg = Aggregation::default();
    for record in reader.records() {
        match record {
            Ok(record) => agg.push_record(&field_map(&headers, &record)),
            Err(e) => {
                preserve_raw(store, object, &raw).await;
                return Err(PipelineError::RowProcessing(e.into()));
            }
        }
    }

    let (summary, rows) = agg.into_summary(&object.key);
    let document = ProcessedDocument { summary, rows };

    let body = serde_json::to_vec(&document).map_err(|e| PipelineError::Write(e.into()))?;
    let out_key = summary_key(object);
    store
        .put(&object.bucket, &out_key, body)
        .await
        .map_err(PipelineError::Write)?;
    info!(rows = document.rows.len(), out_key = %out_key, "wrote processed summary");

    Ok(document)
}

/// Best-effort side-write of the unmodified input for later inspection.
/// Its own failure is logged and never escalated.
async fn preserve_raw<S: ObjectStore>(store: &S, object: &ObjectRef, raw: &[u8]) {
    let key = error_key(object);
    match store.put(&object.bucket, &key, raw.to_vec()).await {
        Ok(()) => info!(error_key = %key, "preserved raw problematic input"),
        Err(e) => warn!(error_key = %key, error = %e, "failed to preserve raw input"),
    }
}
