//! Image encoding: `DecodedImage` → `<output_dir>/<id>.<ext>` on disk.
//!
//! The routing policy is a two-entry table: JPEG input stays JPEG (written at
//! the configured quality, 100 by default), and every other decodable format
//! is normalised to lossless PNG. [`OutputFormat::route`] is the only place
//! that policy lives.

use crate::error::RecordError;
use crate::pipeline::decode::DecodedImage;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::{DynamicImage, ImageFormat};
use serde::Serialize;
use std::fmt;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

/// The two formats we ever write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Jpeg,
    Png,
}

impl OutputFormat {
    /// Pick the output encoding for a detected input format.
    pub fn route(detected: ImageFormat) -> Self {
        match detected {
            ImageFormat::Jpeg => OutputFormat::Jpeg,
            _ => OutputFormat::Png,
        }
    }

    /// File extension, without the dot.
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Jpeg => "jpeg",
            OutputFormat::Png => "png",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Path an image for `id` would be written to.
pub fn output_path(output_dir: &Path, id: &str, format: OutputFormat) -> PathBuf {
    output_dir.join(format!("{}.{}", id, format.extension()))
}

/// Encode `image` and write it to `<output_dir>/<id>.<ext>`.
///
/// Creates the output directory (and parents) if needed and truncates any
/// existing file. A failure after the file was created may leave a partial
/// file behind; the caller falls back to a text dump either way.
pub fn write_image(
    image: &DecodedImage,
    output_dir: &Path,
    id: &str,
    jpeg_quality: u8,
) -> Result<(OutputFormat, PathBuf), RecordError> {
    let format = OutputFormat::route(image.format);
    let path = output_path(output_dir, id, format);

    std::fs::create_dir_all(output_dir).map_err(|e| RecordError::output_write(output_dir, &e))?;
    let file = File::create(&path).map_err(|e| RecordError::output_write(&path, &e))?;
    let mut writer = BufWriter::new(file);

    encode_into(&image.pixels, format, jpeg_quality, &mut writer)?;
    writer
        .flush()
        .map_err(|e| RecordError::output_write(&path, &e))?;

    debug!("Wrote {} → {}", format, path.display());
    Ok((format, path))
}

/// Serialise `pixels` as `format` into `writer`.
pub fn encode_into<W: Write>(
    pixels: &DynamicImage,
    format: OutputFormat,
    jpeg_quality: u8,
    writer: W,
) -> Result<(), RecordError> {
    let result = match format {
        OutputFormat::Jpeg => {
            let encoder = JpegEncoder::new_with_quality(writer, jpeg_quality);
            // JPEG has no alpha channel; greyscale passes through untouched.
            match pixels {
                DynamicImage::ImageLuma8(_) | DynamicImage::ImageRgb8(_) => {
                    pixels.write_with_encoder(encoder)
                }
                DynamicImage::ImageLumaA8(_) | DynamicImage::ImageLuma16(_) => {
                    DynamicImage::ImageLuma8(pixels.to_luma8()).write_with_encoder(encoder)
                }
                _ => DynamicImage::ImageRgb8(pixels.to_rgb8()).write_with_encoder(encoder),
            }
        }
        OutputFormat::Png => {
            let encoder = PngEncoder::new(writer);
            // PNG tops out at 16 bits per channel; float images (TIFF) are narrowed.
            match pixels {
                DynamicImage::ImageRgb32F(_) => {
                    DynamicImage::ImageRgb16(pixels.to_rgb16()).write_with_encoder(encoder)
                }
                DynamicImage::ImageRgba32F(_) => {
                    DynamicImage::ImageRgba16(pixels.to_rgba16()).write_with_encoder(encoder)
                }
                _ => pixels.write_with_encoder(encoder),
            }
        }
    };

    result.map_err(|e| RecordError::EncodeFailed {
        format,
        detail: e.to_string(),
    })
}
