//! CLI binary for csv2img.
//!
//! A thin shim over the library crate that maps CLI flags
//! to `ConversionConfig` and prints results.

use anyhow::{Context, Result};
use clap::Parser;
use csv2img::{
    convert, inspect, ConversionConfig, ConversionProgressCallback, ProgressCallback,
    RecordOutcome, RecordResult,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

// ── CLI progress callback ────────────────────────────────────────────────────

/// Prints one line per finished record, above an optional indicatif bar.
///
/// Every call comes from the driver task, so lines never interleave.
struct CliProgressCallback {
    bar: Option<ProgressBar>,
}

impl CliProgressCallback {
    fn new(show_bar: bool) -> Arc<Self> {
        let bar = show_bar.then(|| {
            let bar = ProgressBar::new(0);
            bar.set_style(
                ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
                    .unwrap_or_else(|_| ProgressStyle::default_spinner()),
            );
            bar.set_prefix("Reading");
            bar.enable_steady_tick(Duration::from_millis(80));
            bar
        });
        Arc::new(Self { bar })
    }

    fn println(&self, line: String) {
        match self.bar {
            Some(ref bar) => bar.println(line),
            None => eprintln!("{line}"),
        }
    }
}

impl ConversionProgressCallback for CliProgressCallback {
    fn on_conversion_start(&self, input: &Path, total_records: usize) {
        if let Some(ref bar) = self.bar {
            bar.set_length(total_records as u64);
            bar.set_style(
                ProgressStyle::with_template(
                    "{spinner:.cyan} {prefix:.bold}  \
                     [{bar:42.green/238}] {pos:>4}/{len} records  ⏱ {elapsed_precise}",
                )
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("█▉▊▋▌▍▎▏  "),
            );
            bar.set_prefix("Converting");
        }
        self.println(format!(
            "{} {}",
            cyan("◆"),
            bold(&format!(
                "Imported '{}': {total_records} records",
                input.display()
            ))
        ));
    }

    fn on_record_complete(&self, result: &RecordResult, _total: usize) {
        self.println(record_line(result));
        if let Some(ref bar) = self.bar {
            bar.inc(1);
        }
    }

    fn on_conversion_complete(&self, total_records: usize, converted: usize) {
        if let Some(ref bar) = self.bar {
            bar.finish_and_clear();
        }
        let failed = total_records.saturating_sub(converted);
        if failed == 0 {
            eprintln!("{} {} records converted", green("✔"), bold(&converted.to_string()));
        } else {
            eprintln!(
                "{} {}/{} records converted  ({} failed)",
                cyan("⚠"),
                bold(&converted.to_string()),
                total_records,
                red(&failed.to_string()),
            );
        }
    }
}

/// Human-readable outcome line for one record.
fn record_line(result: &RecordResult) -> String {
    let format = result.detected_format.as_deref().unwrap_or("-");
    match &result.outcome {
        RecordOutcome::Converted { path, .. } => format!(
            "  {} {:<24} {:<5} → {}",
            green("✓"),
            result.id,
            format,
            dim(&path.display().to_string()),
        ),
        RecordOutcome::Dumped { path, reason } => format!(
            "  {} {:<24} {:<5} {}  → dumped to {}",
            red("✗"),
            result.id,
            format,
            red(&truncate(&reason.to_string())),
            dim(&path.display().to_string()),
        ),
        RecordOutcome::Abandoned { reason, dump_error } => {
            let mut line = format!(
                "  {} {:<24} {:<5} {}",
                red("✗"),
                result.id,
                format,
                red(&truncate(&reason.to_string())),
            );
            if let Some(e) = dump_error {
                line.push_str(&format!("  (dump failed: {})", truncate(&e.to_string())));
            }
            line
        }
    }
}

/// Truncate very long error messages to keep output tidy.
fn truncate(msg: &str) -> String {
    if msg.chars().count() > 80 {
        let head: String = msg.chars().take(79).collect();
        format!("{head}\u{2026}")
    } else {
        msg.to_string()
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Convert ./test.csv into ./output
  csv2img

  # Explicit input and output
  csv2img --csv exports/images.csv --output exports/images

  # Look at what each row contains without writing anything
  csv2img --csv exports/images.csv --inspect-only

  # Machine-readable summary
  csv2img --csv exports/images.csv --json > report.json

INPUT FORMAT:
  One record per line, no header:
    <identifier>,<base64 image>

OUTPUT:
  <output>/<identifier>.jpeg   JPEG input, re-encoded at --jpeg-quality
  <output>/<identifier>.png    any other decodable image (PNG, GIF, BMP, TIFF, WebP, ICO)
  <output>/<identifier>.txt    raw payload of rows that failed to decode/encode

EXIT STATUS:
  0   every row was processed (including rows dumped to .txt)
  1   the input could not be read or contains a row that is not 2 fields;
      no files are written in that case
"#;

/// Convert base64 images stored in a CSV into image files.
#[derive(Parser, Debug)]
#[command(
    name = "csv2img",
    version,
    about = "Convert base64 images stored in a CSV into JPEG/PNG files",
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Path to the CSV to import.
    #[arg(long, env = "CSV2IMG_CSV", default_value = csv2img::config::DEFAULT_INPUT)]
    csv: PathBuf,

    /// Directory to write images to.
    #[arg(short, long, env = "CSV2IMG_OUTPUT", default_value = csv2img::config::DEFAULT_OUTPUT_DIR)]
    output: PathBuf,

    /// Records decoded/encoded at once (default: number of CPUs).
    #[arg(short, long, env = "CSV2IMG_CONCURRENCY")]
    concurrency: Option<usize>,

    /// Quality for JPEG output (1–100).
    #[arg(long, env = "CSV2IMG_JPEG_QUALITY", default_value_t = csv2img::config::DEFAULT_JPEG_QUALITY,
          value_parser = clap::value_parser!(u8).range(1..=100))]
    jpeg_quality: u8,

    /// Use identifiers as file names as-is, even if they contain path separators.
    #[arg(long, env = "CSV2IMG_TRUST_IDS")]
    trust_ids: bool,

    /// Print decoded format and size of each row; write nothing.
    #[arg(long)]
    inspect_only: bool,

    /// Print structured JSON results on stdout.
    #[arg(long, env = "CSV2IMG_JSON")]
    json: bool,

    /// Disable progress bar.
    #[arg(long, env = "CSV2IMG_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "CSV2IMG_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "CSV2IMG_QUIET")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The per-record lines already cover what INFO logs would say, so the
    // library is kept at ERROR unless asked otherwise.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Inspect-only mode ────────────────────────────────────────────────
    if cli.inspect_only {
        let infos = inspect(&cli.csv).await.context("Failed to inspect CSV")?;

        if cli.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&infos).context("Failed to serialise records")?
            );
        } else {
            println!("{:<6} {:<24} {:<6} {:>11}  {}", "LINE", "ID", "FORMAT", "SIZE", "NOTE");
            for info in &infos {
                let size = match (info.width, info.height) {
                    (Some(w), Some(h)) => format!("{w}x{h}"),
                    _ => "-".to_string(),
                };
                let note = info
                    .error
                    .as_ref()
                    .map(|e| truncate(&e.to_string()))
                    .unwrap_or_default();
                println!(
                    "{:<6} {:<24} {:<6} {:>11}  {}",
                    info.line,
                    info.id,
                    info.detected_format.as_deref().unwrap_or("-"),
                    size,
                    note
                );
            }
        }
        return Ok(());
    }

    // ── Build config ─────────────────────────────────────────────────────
    let progress_cb: Option<ProgressCallback> = if cli.quiet || cli.json {
        None
    } else {
        let cb = CliProgressCallback::new(show_progress);
        Some(cb as Arc<dyn ConversionProgressCallback>)
    };

    let config = build_config(&cli, progress_cb)?;

    // ── Run conversion ───────────────────────────────────────────────────
    let output = convert(&config).await.context("Conversion failed")?;

    if cli.json {
        let json = serde_json::to_string_pretty(&output).context("Failed to serialise output")?;
        println!("{json}");
    } else if !cli.quiet {
        eprintln!(
            "   {} jpeg  /  {} png  /  {} dumped  —  {}ms total",
            dim(&output.stats.jpeg_written.to_string()),
            dim(&output.stats.png_written.to_string()),
            dim(&output.stats.dumped.to_string()),
            output.stats.total_duration_ms,
        );
        println!(
            "\nDone! Check {} for image output.",
            bold(&output.output_dir.display().to_string())
        );
    }

    Ok(())
}

/// Map CLI args to `ConversionConfig`.
fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<ConversionConfig> {
    let mut builder = ConversionConfig::builder()
        .input(&cli.csv)
        .output_dir(&cli.output)
        .jpeg_quality(cli.jpeg_quality)
        .trust_identifiers(cli.trust_ids);

    if let Some(n) = cli.concurrency {
        builder = builder.concurrency(n);
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}
