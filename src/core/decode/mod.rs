//! # Decode Module
//!
//! Turns uploaded bytes into RGB pixel buffers.
//!
//! Uses zune-jpeg for JPEG uploads (1.5-2x faster than image crate),
//! falls back to image crate for PNG and anything zune-jpeg rejects.
//! Every decoded image is normalised to 8-bit RGB; alpha is dropped.

use crate::error::ImageError;
use image::{DynamicImage, ImageBuffer, ImageFormat, Luma, RgbImage, Rgb, Rgba};
use std::fs;
use std::path::Path;
use tracing::debug;
use zune_core::colorspace::ColorSpace;
use zune_core::options::DecoderOptions;
use zune_jpeg::JpegDecoder;

/// File extensions accepted for signature uploads
pub const ACCEPTED_EXTENSIONS: [&str; 3] = ["jpg", "jpeg", "png"];

/// Check whether a path has one of the accepted upload extensions
pub fn is_accepted_upload(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .is_some_and(|e| ACCEPTED_EXTENSIONS.contains(&e.as_str()))
}

/// Decoder for signature uploads
pub struct ImageDecoder;

impl ImageDecoder {
    /// Read and decode an image file
    pub fn decode_file(path: &Path) -> Result<RgbImage, ImageError> {
        let bytes = fs::read(path).map_err(|e| ImageError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::decode_bytes(&bytes)
    }

    /// Decode an in-memory upload.
    ///
    /// - JPEG: zune-jpeg, then image crate if that fails
    /// - Other formats: image crate
    pub fn decode_bytes(bytes: &[u8]) -> Result<RgbImage, ImageError> {
        if bytes.is_empty() {
            return Err(ImageError::EmptyInput);
        }

        let format = image::guess_format(bytes).ok();
        debug!(?format, len = bytes.len(), "decoding upload");

        let image = match format {
            Some(ImageFormat::Jpeg) => {
                Self::decode_jpeg(bytes).or_else(|_| Self::decode_fallback(bytes))?
            }
            _ => Self::decode_fallback(bytes)?,
        };

        let rgb = image.to_rgb8();
        if rgb.width() == 0 || rgb.height() == 0 {
            return Err(ImageError::InvalidDimensions {
                width: rgb.width(),
                height: rgb.height(),
            });
        }
        Ok(rgb)
    }

    /// Fast JPEG decoding using zune-jpeg
    fn decode_jpeg(bytes: &[u8]) -> Result<DynamicImage, ImageError> {
        let options = DecoderOptions::new_fast().jpeg_set_out_colorspace(ColorSpace::RGB);
        let mut decoder = JpegDecoder::new_with_options(bytes, options);

        let pixels = decoder.decode().map_err(|e| ImageError::DecodeFailed {
            reason: format!("zune-jpeg decode failed: {:?}", e),
        })?;

        let info = decoder.info().ok_or_else(|| ImageError::DecodeFailed {
            reason: "Failed to get image info".to_string(),
        })?;

        let width = info.width as u32;
        let height = info.height as u32;
        let out_colorspace = decoder.get_output_colorspace().unwrap_or(ColorSpace::RGB);

        let image = match out_colorspace {
            ColorSpace::RGB => {
                let buffer: ImageBuffer<Rgb<u8>, Vec<u8>> =
                    ImageBuffer::from_raw(width, height, pixels)
                        .ok_or_else(|| buffer_mismatch("RGB"))?;
                DynamicImage::ImageRgb8(buffer)
            }
            ColorSpace::RGBA => {
                let buffer: ImageBuffer<Rgba<u8>, Vec<u8>> =
                    ImageBuffer::from_raw(width, height, pixels)
                        .ok_or_else(|| buffer_mismatch("RGBA"))?;
                DynamicImage::ImageRgba8(buffer)
            }
            ColorSpace::Luma => {
                let buffer: ImageBuffer<Luma<u8>, Vec<u8>> =
                    ImageBuffer::from_raw(width, height, pixels)
                        .ok_or_else(|| buffer_mismatch("Luma"))?;
                DynamicImage::ImageLuma8(buffer)
            }
            other => {
                return Err(ImageError::DecodeFailed {
                    reason: format!("unsupported JPEG colorspace {:?}", other),
                });
            }
        };

        Ok(image)
    }

    fn decode_fallback(bytes: &[u8]) -> Result<DynamicImage, ImageError> {
        image::load_from_memory(bytes).map_err(|e| ImageError::DecodeFailed {
            reason: e.to_string(),
        })
    }
}

fn buffer_mismatch(kind: &str) -> ImageError {
    ImageError::DecodeFailed {
        reason: format!("Failed to create {} buffer", kind),
    }
}
