//! Image decoding: base64 payload → `DynamicImage` + detected format.
//!
//! Decoding is a two-stage pipeline. The payload is first base64-decoded with
//! the standard (padded) alphabet, then the bytes are sniffed by their magic
//! signature and handed to the matching codec. The detected format always
//! comes from the bytes themselves, never from the identifier or any hint.

use crate::error::RecordError;
use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig};
use base64::Engine as _;
use image::{DynamicImage, ImageFormat};
use std::borrow::Cow;
use tracing::debug;

/// A decoded image and the format its bytes were encoded in.
#[derive(Debug, Clone)]
pub struct DecodedImage {
    pub pixels: DynamicImage,
    pub format: ImageFormat,
}

impl DecodedImage {
    /// Short lowercase name of the detected format ("jpeg", "png", "gif", …).
    pub fn format_name(&self) -> &'static str {
        format_name(self.format)
    }
}

/// Lowercase display name for an image format.
pub fn format_name(format: ImageFormat) -> &'static str {
    match format {
        ImageFormat::Jpeg => "jpeg",
        ImageFormat::Png => "png",
        ImageFormat::Gif => "gif",
        ImageFormat::Bmp => "bmp",
        ImageFormat::Tiff => "tiff",
        ImageFormat::WebP => "webp",
        ImageFormat::Ico => "ico",
        other => other.extensions_str().first().copied().unwrap_or("unknown"),
    }
}

/// Standard padded alphabet that ignores non-zero bits in the final symbol.
const PAYLOAD_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_allow_trailing_bits(true),
);

/// Decode a base64 payload into raw bytes.
///
/// CR and LF are dropped first so line-wrapped base64 (76-column MIME style)
/// decodes the same as a single line.
pub fn decode_base64(payload: &str) -> Result<Vec<u8>, RecordError> {
    let cleaned: Cow<'_, str> = if payload.contains(['\r', '\n']) {
        Cow::Owned(payload.chars().filter(|c| !matches!(c, '\r' | '\n')).collect())
    } else {
        Cow::Borrowed(payload)
    };

    PAYLOAD_ENGINE
        .decode(cleaned.as_bytes())
        .map_err(|e| RecordError::InvalidBase64 {
            detail: e.to_string(),
        })
}

/// Sniff and decode raw image bytes.
pub fn decode_bytes(bytes: &[u8]) -> Result<DecodedImage, RecordError> {
    let format = image::guess_format(bytes).map_err(|e| RecordError::UnrecognizedImage {
        detail: e.to_string(),
    })?;

    let pixels = image::load_from_memory_with_format(bytes, format).map_err(|e| {
        RecordError::UnrecognizedImage {
            detail: format!("{}: {}", format_name(format), e),
        }
    })?;

    debug!(
        "Decoded {} image {}x{}",
        format_name(format),
        pixels.width(),
        pixels.height()
    );

    Ok(DecodedImage { pixels, format })
}

/// Decode a record payload all the way to pixels.
pub fn decode_payload(payload: &str) -> Result<DecodedImage, RecordError> {
    let bytes = decode_base64(payload)?;
    decode_bytes(&bytes)
}
