//! Eager (whole-file) conversion entry points.
//!
//! Every record goes `Pending → Decoding → {Encoding | Dumping} → Done`,
//! independently of its siblings and with no retries: a failure while
//! decoding or encoding routes straight to the dump, and a failed dump
//! abandons the record.
//!
//! The input is read and validated in full before anything is dispatched.
//! A malformed row therefore aborts the run with no output files written,
//! rather than racing against workers already in flight.

use crate::config::ConversionConfig;
use crate::error::{Csv2ImgError, RecordError};
use crate::output::{ConversionOutput, ConversionStats, RecordInfo, RecordOutcome, RecordResult};
use crate::pipeline::source::{Record, RecordSource};
use crate::pipeline::{decode, dump, encode};
use crate::stream::dispatch;
use futures::StreamExt;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Convert every row of `config.input` into `config.output_dir`.
///
/// # Returns
/// `Ok(ConversionOutput)` once every record is done, even if some were
/// dumped (check `output.stats.dumped`).
///
/// # Errors
/// Returns `Err(Csv2ImgError)` only for fatal input errors:
/// - File not found / permission denied / unreadable
/// - A row that is not exactly two fields, or unparsable CSV
pub async fn convert(config: &ConversionConfig) -> Result<ConversionOutput, Csv2ImgError> {
    let total_start = Instant::now();
    info!("Importing file '{}'", config.input.display());

    let records = read_records(&config.input)?;
    info!("Read {} records", records.len());

    let mut output = convert_records(records, config).await;
    output.stats.total_duration_ms = total_start.elapsed().as_millis() as u64;

    info!(
        "Conversion complete: {}/{} records converted, {} dumped, {}ms total",
        output.stats.converted(),
        output.stats.total_records,
        output.stats.dumped,
        output.stats.total_duration_ms
    );

    Ok(output)
}

/// Convert records that are already in memory.
///
/// Progress callbacks fire from here, one record at a time, as workers
/// finish. The returned records are in input order.
pub async fn convert_records(records: Vec<Record>, config: &ConversionConfig) -> ConversionOutput {
    let start = Instant::now();
    let total = records.len();

    if let Some(ref cb) = config.progress_callback {
        cb.on_conversion_start(&config.input, total);
    }

    let mut results = Vec::with_capacity(total);
    let mut pending = dispatch(records, config);
    while let Some(result) = pending.next().await {
        if let Some(ref cb) = config.progress_callback {
            cb.on_record_complete(&result, total);
        }
        results.push(result);
    }
    results.sort_by_key(|r| r.index);

    let mut stats = ConversionStats::from_results(&results);
    stats.total_duration_ms = start.elapsed().as_millis() as u64;

    if let Some(ref cb) = config.progress_callback {
        cb.on_conversion_complete(total, stats.converted());
    }

    ConversionOutput {
        output_dir: config.output_dir.clone(),
        records: results,
        stats,
    }
}

/// Synchronous wrapper around [`convert`].
///
/// Creates a temporary tokio runtime internally.
pub fn convert_sync(config: &ConversionConfig) -> Result<ConversionOutput, Csv2ImgError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| Csv2ImgError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(convert(config))
}

/// Decode every record of `input` and report what was found, writing nothing.
pub async fn inspect(input: impl AsRef<Path>) -> Result<Vec<RecordInfo>, Csv2ImgError> {
    let records = read_records(input.as_ref())?;
    tokio::task::spawn_blocking(move || records.iter().map(inspect_record).collect::<Vec<_>>())
        .await
        .map_err(|e| Csv2ImgError::Internal(format!("Inspect task panicked: {}", e)))
}

/// Read and validate the whole input file.
pub(crate) fn read_records(input: &Path) -> Result<Vec<Record>, Csv2ImgError> {
    RecordSource::open(input)?.read_all()
}

/// Run one record through decode → encode-or-dump. Blocking.
pub fn process_record(index: usize, record: &Record, config: &ConversionConfig) -> RecordResult {
    let start = Instant::now();
    let output_dir = config.output_dir.as_path();
    let mut detected_format = None;

    debug!("Attempting to decode data with ID: {}", record.id);

    let outcome = if !config.trust_identifiers && !record.has_safe_id() {
        warn!("Skipping line {}: unsafe identifier {:?}", record.line, record.id);
        RecordOutcome::Abandoned {
            reason: RecordError::UnsafeIdentifier {
                id: record.id.clone(),
            },
            dump_error: None,
        }
    } else {
        match decode::decode_payload(&record.payload) {
            Ok(image) => {
                detected_format = Some(image.format_name().to_string());
                match encode::write_image(&image, output_dir, &record.id, config.jpeg_quality) {
                    Ok((format, path)) => RecordOutcome::Converted { format, path },
                    Err(e) => fall_back(record, output_dir, e),
                }
            }
            Err(e) => fall_back(record, output_dir, e),
        }
    };

    RecordResult {
        index,
        line: record.line,
        id: record.id.clone(),
        detected_format,
        outcome,
        duration_ms: start.elapsed().as_millis() as u64,
    }
}

/// Dump the raw payload after a decode or encode failure.
fn fall_back(record: &Record, output_dir: &Path, reason: RecordError) -> RecordOutcome {
    warn!("Record '{}' failed: {}", record.id, reason);
    match dump::dump_payload(output_dir, &record.id, &record.payload) {
        Ok(path) => RecordOutcome::Dumped { path, reason },
        Err(dump_error) => {
            warn!("Record '{}' abandoned: {}", record.id, dump_error);
            RecordOutcome::Abandoned {
                reason,
                dump_error: Some(dump_error),
            }
        }
    }
}

fn inspect_record(record: &Record) -> RecordInfo {
    let mut info = RecordInfo {
        line: record.line,
        id: record.id.clone(),
        payload_len: record.payload.len(),
        detected_format: None,
        width: None,
        height: None,
        error: None,
    };
    match decode::decode_payload(&record.payload) {
        Ok(image) => {
            info.detected_format = Some(image.format_name().to_string());
            info.width = Some(image.pixels.width());
            info.height = Some(image.pixels.height());
        }
        Err(e) => info.error = Some(e),
    }
    info
}
