//! Error types for the csv2img library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`Csv2ImgError`] — **Fatal**: the run cannot proceed at all (input file
//!   missing or unreadable, a row with the wrong shape, bad configuration).
//!   Returned as `Err(Csv2ImgError)` from the top-level `convert*` functions.
//!
//! * [`RecordError`] — **Non-fatal**: a single record failed (bad base64,
//!   unknown image bytes, unwritable output file) but every other record is
//!   unaffected. Stored inside [`crate::output::RecordResult`] so callers can
//!   see exactly which rows were dumped and why.

use crate::pipeline::encode::OutputFormat;
use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the csv2img library.
///
/// Record-level failures use [`RecordError`] and are stored in
/// [`crate::output::RecordResult`] rather than propagated here.
#[derive(Debug, Error)]
pub enum Csv2ImgError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("CSV file not found: '{path}'\nCheck the path exists and is readable.")]
    InputNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The file exists but could not be read into memory.
    #[error("Failed to read input file '{path}': {source}")]
    InputRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Row errors ────────────────────────────────────────────────────────
    /// A row did not split into exactly `<identifier>,<payload>`.
    #[error("Malformed row on line {line}: expected 2 fields, found {fields}")]
    MalformedRow { line: u64, fields: usize },

    /// The CSV reader rejected the row itself (bad quoting, invalid UTF-8).
    #[error("Malformed CSV on line {line}: {detail}")]
    MalformedCsv { line: u64, detail: String },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<csv::Error> for Csv2ImgError {
    fn from(e: csv::Error) -> Self {
        if e.is_io_error() {
            return Csv2ImgError::Internal(e.to_string());
        }
        let line = e.position().map(|p| p.line()).unwrap_or(0);
        Csv2ImgError::MalformedCsv {
            line,
            detail: e.to_string(),
        }
    }
}

/// A non-fatal error for a single record.
///
/// Any of these routes the record to the fallback dumper, except
/// [`RecordError::UnsafeIdentifier`] which produces no file at all.
#[derive(Debug, Clone, Error, serde::Serialize)]
pub enum RecordError {
    /// The payload is not valid standard base64.
    #[error("invalid base64: {detail}")]
    InvalidBase64 { detail: String },

    /// The decoded bytes are not an image any enabled codec understands.
    #[error("unrecognized or corrupt image data: {detail}")]
    UnrecognizedImage { detail: String },

    /// The decoded image could not be re-encoded.
    #[error("failed to encode {format} image: {detail}")]
    EncodeFailed { format: OutputFormat, detail: String },

    /// The output directory or file could not be created or written.
    #[error("failed to write '{path}': {detail}")]
    OutputWriteFailed { path: PathBuf, detail: String },

    /// The identifier cannot be used as a file name inside the output directory.
    #[error("identifier {id:?} is not a safe file name")]
    UnsafeIdentifier { id: String },

    /// The worker processing this record panicked.
    #[error("worker panicked: {detail}")]
    WorkerPanicked { detail: String },
}

impl RecordError {
    /// True for failures raised by the decoder stage.
    pub fn is_decode(&self) -> bool {
        matches!(
            self,
            RecordError::InvalidBase64 { .. } | RecordError::UnrecognizedImage { .. }
        )
    }

    /// Wrap an I/O failure on `path`.
    pub fn output_write(path: impl Into<PathBuf>, source: &std::io::Error) -> Self {
        RecordError::OutputWriteFailed {
            path: path.into(),
            detail: source.to_string(),
        }
    }
}
