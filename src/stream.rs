//! Streaming conversion API: emit record results as they complete.
//!
//! [`dispatch`] is the worker pool behind every entry point. Each record runs
//! its decode → encode-or-dump pipeline on a blocking thread, at most
//! `config.concurrency` at a time, and the stream yields results in
//! completion order. Sort by `index` if input order matters.
//!
//! Exhausting the stream is the wait-all barrier: once it returns `None`,
//! every dispatched record has reached its terminal state.

use crate::config::ConversionConfig;
use crate::convert::{process_record, read_records};
use crate::error::{Csv2ImgError, RecordError};
use crate::output::{RecordOutcome, RecordResult};
use crate::pipeline::source::Record;
use futures::stream::{self, StreamExt};
use std::pin::Pin;
use tokio_stream::Stream;
use tracing::{info, warn};

/// A boxed stream of record results.
pub type RecordStream = Pin<Box<dyn Stream<Item = RecordResult> + Send>>;

/// Read `config.input` and stream results as records finish.
///
/// # Returns
/// - `Ok(RecordStream)` — one `RecordResult` per input row
/// - `Err(Csv2ImgError)` — the input could not be read or has a malformed
///   row; nothing has been dispatched or written
pub async fn convert_stream(config: &ConversionConfig) -> Result<RecordStream, Csv2ImgError> {
    info!("Starting streaming conversion: {}", config.input.display());
    let records = read_records(&config.input)?;
    Ok(dispatch(records, config))
}

/// Run each record through the pipeline on the blocking pool.
pub fn dispatch(records: Vec<Record>, config: &ConversionConfig) -> RecordStream {
    let concurrency = config.concurrency.max(1);
    let config = config.clone();

    let results = stream::iter(records.into_iter().enumerate())
        .map(move |(index, record)| run_blocking(index, record, config.clone()))
        .buffer_unordered(concurrency);

    Box::pin(results)
}

async fn run_blocking(index: usize, record: Record, config: ConversionConfig) -> RecordResult {
    let line = record.line;
    let id = record.id.clone();

    match tokio::task::spawn_blocking(move || process_record(index, &record, &config)).await {
        Ok(result) => result,
        Err(e) => {
            warn!("Worker for '{}' did not finish: {}", id, e);
            RecordResult {
                index,
                line,
                id,
                detected_format: None,
                outcome: RecordOutcome::Abandoned {
                    reason: RecordError::WorkerPanicked {
                        detail: e.to_string(),
                    },
                    dump_error: None,
                },
                duration_ms: 0,
            }
        }
    }
}
