//! Configuration types for CSV-to-image conversion.
//!
//! All run behaviour is controlled through [`ConversionConfig`], built via
//! [`ConversionConfigBuilder`]. The config is cheap to clone and is cloned
//! into every worker, so it holds no per-run state.

use crate::error::Csv2ImgError;
use crate::progress::ProgressCallback;
use std::fmt;
use std::path::PathBuf;

/// Default input file.
pub const DEFAULT_INPUT: &str = "./test.csv";
/// Default output directory.
pub const DEFAULT_OUTPUT_DIR: &str = "./output";
/// JPEG quality used when re-encoding JPEG input.
pub const DEFAULT_JPEG_QUALITY: u8 = 100;

/// Configuration for a conversion run.
///
/// # Example
/// ```rust
/// use csv2img::ConversionConfig;
///
/// let config = ConversionConfig::builder()
///     .input("images.csv")
///     .output_dir("out")
///     .concurrency(4)
///     .build()
///     .unwrap();
/// assert_eq!(config.jpeg_quality, 100);
/// ```
#[derive(Clone)]
pub struct ConversionConfig {
    /// CSV file of `<identifier>,<base64 payload>` rows. Default: `./test.csv`.
    pub input: PathBuf,

    /// Directory images and dumps are written to. Created on first write.
    /// Default: `./output`.
    pub output_dir: PathBuf,

    /// Maximum records decoded/encoded at once. Default: available parallelism.
    ///
    /// Decoding and encoding are CPU-bound, so going past the core count only
    /// adds memory pressure.
    pub concurrency: usize,

    /// Quality for JPEG output, 1–100. Default: 100.
    pub jpeg_quality: u8,

    /// Use identifiers as file names without checking them. Default: false.
    ///
    /// When false, an identifier that is empty, `.`/`..`, or contains a path
    /// separator is rejected and nothing is written for that record.
    pub trust_identifiers: bool,

    /// Optional per-record event sink.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::from(DEFAULT_INPUT),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            concurrency: default_concurrency(),
            jpeg_quality: DEFAULT_JPEG_QUALITY,
            trust_identifiers: false,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for ConversionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversionConfig")
            .field("input", &self.input)
            .field("output_dir", &self.output_dir)
            .field("concurrency", &self.concurrency)
            .field("jpeg_quality", &self.jpeg_quality)
            .field("trust_identifiers", &self.trust_identifiers)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<dyn ConversionProgressCallback>"),
            )
            .finish()
    }
}

impl ConversionConfig {
    /// Create a new builder for `ConversionConfig`.
    pub fn builder() -> ConversionConfigBuilder {
        ConversionConfigBuilder {
            config: Self::default(),
        }
    }
}

fn default_concurrency() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(4)
}

/// Builder for [`ConversionConfig`].
pub struct ConversionConfigBuilder {
    config: ConversionConfig,
}

impl ConversionConfigBuilder {
    pub fn input(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.input = path.into();
        self
    }

    pub fn output_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.output_dir = path.into();
        self
    }

    pub fn concurrency(mut self, n: usize) -> Self {
        self.config.concurrency = n.max(1);
        self
    }

    pub fn jpeg_quality(mut self, q: u8) -> Self {
        self.config.jpeg_quality = q.clamp(1, 100);
        self
    }

    pub fn trust_identifiers(mut self, v: bool) -> Self {
        self.config.trust_identifiers = v;
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ConversionConfig, Csv2ImgError> {
        let c = &self.config;
        if c.input.as_os_str().is_empty() {
            return Err(Csv2ImgError::InvalidConfig("Input path is empty".into()));
        }
        if c.output_dir.as_os_str().is_empty() {
            return Err(Csv2ImgError::InvalidConfig(
                "Output directory is empty".into(),
            ));
        }
        if c.concurrency == 0 {
            return Err(Csv2ImgError::InvalidConfig(
                "Concurrency must be ≥ 1".into(),
            ));
        }
        if !(1..=100).contains(&c.jpeg_quality) {
            return Err(Csv2ImgError::InvalidConfig(format!(
                "JPEG quality must be 1–100, got {}",
                c.jpeg_quality
            )));
        }
        Ok(self.config)
    }
}
