//! Image compression: rendered raster file → compressed page image.
//!
//! The flipbook ships WebP pages. The `image` crate decodes the rasterizer's
//! PNG, `webp` (libwebp) does the lossy encode; `image`'s own WebP encoder is
//! lossless-only and has no quality knob.

use image::ImageError;
use std::path::Path;
use thiserror::Error;
use tracing::debug;

/// Why a single compression failed.
#[derive(Debug, Error)]
pub enum CompressError {
    #[error("decode failed: {0}")]
    Decode(#[from] ImageError),

    #[error("encode failed: {0}")]
    Encode(String),

    #[error("write failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Converts one raster file into the output format.
///
/// Synchronous and CPU-bound; the pipeline calls it from
/// `tokio::task::spawn_blocking`.
pub trait ImageCompressor: Send + Sync {
    /// Read `input`, encode it at `quality` (0–100) and write `output`.
    fn compress(&self, input: &Path, output: &Path, quality: u8) -> Result<(), CompressError>;

    /// Extension of the written files, without the dot.
    fn extension(&self) -> &str;
}

/// Lossy WebP encoder.
#[derive(Debug, Clone, Copy, Default)]
pub struct WebpCompressor;

impl ImageCompressor for WebpCompressor {
    fn compress(&self, input: &Path, output: &Path, quality: u8) -> Result<(), CompressError> {
        let rgba = image::open(input)?.to_rgba8();
        let (width, height) = rgba.dimensions();

        let encoded = webp::Encoder::from_rgba(rgba.as_raw(), width, height)
            .encode_simple(false, f32::from(quality.min(100)))
            .map_err(|e| CompressError::Encode(format!("{:?}", e)))?;

        std::fs::write(output, &*encoded)?;
        debug!(
            "Encoded {} ({}x{}) → {} bytes WebP",
            input.display(),
            width,
            height,
            encoded.len()
        );
        Ok(())
    }

    fn extension(&self) -> &str {
        "webp"
    }
}
