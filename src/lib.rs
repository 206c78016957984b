//! # csv2img
//!
//! Turn a CSV of base64-encoded images into image files on disk.
//!
//! Each input row is `<identifier>,<base64 payload>`. The payload is decoded,
//! its image format is sniffed from the bytes, and the image is re-encoded to
//! `<output_dir>/<identifier>.jpeg` (JPEG input) or `<identifier>.png`
//! (everything else). Rows that cannot be decoded or re-encoded have their
//! raw payload written to `<identifier>.txt` for manual inspection.
//!
//! ## Pipeline Overview
//!
//! ```text
//! CSV
//!  │
//!  ├─ 1. Source  read the whole file, validate every row is 2 fields
//!  ├─ 2. Decode  base64 → bytes → DynamicImage + detected format
//!  ├─ 3. Encode  JPEG → .jpeg (q=100), anything else → .png
//!  ├─ 4. Dump    on failure, payload → .txt
//!  └─ 5. Output  per-record results + run stats
//! ```
//!
//! Steps 2–4 run per record on tokio's blocking pool, bounded by
//! [`ConversionConfig::concurrency`]. Records share nothing but the output
//! directory.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use csv2img::{convert, ConversionConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ConversionConfig::builder()
//!         .input("images.csv")
//!         .output_dir("output")
//!         .build()?;
//!     let output = convert(&config).await?;
//!     eprintln!("{} converted, {} dumped",
//!         output.stats.converted(),
//!         output.stats.dumped);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `csv2img` binary (clap + anyhow + tracing-subscriber + indicatif) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod convert;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod stream;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ConversionConfig, ConversionConfigBuilder};
pub use convert::{convert, convert_records, convert_sync, inspect, process_record};
pub use error::{Csv2ImgError, RecordError};
pub use output::{ConversionOutput, ConversionStats, RecordInfo, RecordOutcome, RecordResult};
pub use pipeline::encode::OutputFormat;
pub use pipeline::source::{Record, RecordSource};
pub use progress::{ConversionProgressCallback, NoopProgressCallback, ProgressCallback};
pub use stream::{convert_stream, RecordStream};
