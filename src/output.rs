//! Structured results returned by the driver.
//!
//! Workers never print. Each returns a [`RecordResult`] and the caller
//! decides how to render it (progress lines, JSON, assertions in tests).

use crate::error::RecordError;
use crate::pipeline::encode::OutputFormat;
use serde::Serialize;
use std::path::PathBuf;

/// What finally happened to one record.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RecordOutcome {
    /// The image was re-encoded and written.
    Converted { format: OutputFormat, path: PathBuf },
    /// Decoding or encoding failed; the raw payload was dumped to `path`.
    Dumped { path: PathBuf, reason: RecordError },
    /// Nothing usable was written.
    ///
    /// `dump_error` is set when the fallback dump itself failed.
    Abandoned {
        reason: RecordError,
        dump_error: Option<RecordError>,
    },
}

/// Result for a single record.
#[derive(Debug, Clone, Serialize)]
pub struct RecordResult {
    /// 0-based position among the dispatched records.
    pub index: usize,
    /// Line the record started on in the input file.
    pub line: u64,
    pub id: String,
    /// Format sniffed from the payload, when it got that far.
    pub detected_format: Option<String>,
    pub outcome: RecordOutcome,
    pub duration_ms: u64,
}

impl RecordResult {
    pub fn is_converted(&self) -> bool {
        matches!(self.outcome, RecordOutcome::Converted { .. })
    }

    /// The file written for this record, if any.
    pub fn written_path(&self) -> Option<&PathBuf> {
        match &self.outcome {
            RecordOutcome::Converted { path, .. } | RecordOutcome::Dumped { path, .. } => Some(path),
            RecordOutcome::Abandoned { .. } => None,
        }
    }
}

/// Aggregate counts for a run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ConversionStats {
    pub total_records: usize,
    pub jpeg_written: usize,
    pub png_written: usize,
    pub dumped: usize,
    pub abandoned: usize,
    pub total_duration_ms: u64,
}

impl ConversionStats {
    /// Tally a set of results. `total_duration_ms` is left at zero.
    pub fn from_results(results: &[RecordResult]) -> Self {
        let mut stats = ConversionStats {
            total_records: results.len(),
            ..Default::default()
        };
        for r in results {
            match &r.outcome {
                RecordOutcome::Converted {
                    format: OutputFormat::Jpeg,
                    ..
                } => stats.jpeg_written += 1,
                RecordOutcome::Converted {
                    format: OutputFormat::Png,
                    ..
                } => stats.png_written += 1,
                RecordOutcome::Dumped { .. } => stats.dumped += 1,
                RecordOutcome::Abandoned { .. } => stats.abandoned += 1,
            }
        }
        stats
    }

    pub fn converted(&self) -> usize {
        self.jpeg_written + self.png_written
    }

    pub fn failed(&self) -> usize {
        self.dumped + self.abandoned
    }
}

/// Everything a full run produced, records in input order.
#[derive(Debug, Clone, Serialize)]
pub struct ConversionOutput {
    pub output_dir: PathBuf,
    pub records: Vec<RecordResult>,
    pub stats: ConversionStats,
}

/// What `inspect` learned about one record without writing anything.
#[derive(Debug, Clone, Serialize)]
pub struct RecordInfo {
    pub line: u64,
    pub id: String,
    pub payload_len: usize,
    pub detected_format: Option<String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub error: Option<RecordError>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(outcome: RecordOutcome) -> RecordResult {
        RecordResult {
            index: 0,
            line: 1,
            id: "x".into(),
            detected_format: None,
            outcome,
            duration_ms: 0,
        }
    }

    #[test]
    fn stats_tally_each_outcome() {
        let results = vec![
            result(RecordOutcome::Converted {
                format: OutputFormat::Jpeg,
                path: "a.jpeg".into(),
            }),
            result(RecordOutcome::Converted {
                format: OutputFormat::Png,
                path: "b.png".into(),
            }),
            result(RecordOutcome::Converted {
                format: OutputFormat::Png,
                path: "c.png".into(),
            }),
            result(RecordOutcome::Dumped {
                path: "d.txt".into(),
                reason: RecordError::InvalidBase64 { detail: "x".into() },
            }),
            result(RecordOutcome::Abandoned {
                reason: RecordError::UnsafeIdentifier { id: "..".into() },
                dump_error: None,
            }),
        ];
        let stats = ConversionStats::from_results(&results);
        assert_eq!(stats.total_records, 5);
        assert_eq!(stats.jpeg_written, 1);
        assert_eq!(stats.png_written, 2);
        assert_eq!(stats.converted(), 3);
        assert_eq!(stats.failed(), 2);
    }

    #[test]
    fn outcome_serialises_with_status_tag() {
        let r = result(RecordOutcome::Converted {
            format: OutputFormat::Png,
            path: "out/x.png".into(),
        });
        let json = serde_json::to_value(&r).unwrap();
        assert_eq!(json["outcome"]["status"], "converted");
        assert_eq!(json["outcome"]["format"], "png");
        assert!(r.written_path().is_some());
    }

    #[test]
    fn dumped_reason_serialises_as_json() {
        let r = result(RecordOutcome::Dumped {
            path: "out/x.txt".into(),
            reason: RecordError::EncodeFailed {
                format: OutputFormat::Png,
                detail: "unsupported color type".into(),
            },
        });
        let json = serde_json::to_value(&r).unwrap();
        assert_eq!(json["outcome"]["status"], "dumped");
        assert_eq!(json["outcome"]["reason"]["EncodeFailed"]["format"], "png");
    }
}
