//! Decoding and bounding-box downscaling.

use super::error::PhotoError;
use image::imageops::FilterType;
use image::{DynamicImage, ImageError, ImageReader, Limits};
use std::io::Cursor;

/// Longest allowed edge of a stored photo.
pub const MAX_DIMENSION: u32 = 1024;

/// Longest edge the decoder will accept. Larger headers are refused before
/// any pixel buffer is allocated.
pub const MAX_DECODE_DIMENSION: u32 = 16_384;

/// Upper bound on decoder allocations.
pub const MAX_DECODE_ALLOC: u64 = 256 * 1024 * 1024;

fn decode_limits(max_edge: u32) -> Limits {
    let mut limits = Limits::default();
    limits.max_image_width = Some(max_edge);
    limits.max_image_height = Some(max_edge);
    limits.max_alloc = Some(MAX_DECODE_ALLOC);
    limits
}

/// Decode an uploaded byte buffer, guessing the format from its content.
pub fn decode(bytes: &[u8]) -> Result<DynamicImage, PhotoError> {
    decode_within(bytes, MAX_DECODE_DIMENSION)
}

fn decode_within(bytes: &[u8], max_edge: u32) -> Result<DynamicImage, PhotoError> {
    let mut reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| PhotoError::DecodeIo(e.to_string()))?;
    reader.limits(decode_limits(max_edge));

    reader.decode().map_err(|e| match e {
        ImageError::IoError(io) => PhotoError::DecodeIo(io.to_string()),
        other => PhotoError::UnsupportedImageFormat(other.to_string()),
    })
}

/// Target dimensions for an image that must fit inside `max × max`.
///
/// Images already inside the box keep their size. Otherwise the longer edge
/// becomes exactly `max` and the shorter one is scaled and rounded, never
/// below one pixel.
///
/// ```text
/// (2048, 1024), 1024 → (1024, 512)
/// (800, 600),   1024 → (800, 600)
/// ```
pub fn fit_within(width: u32, height: u32, max: u32) -> (u32, u32) {
    if width <= max && height <= max {
        return (width, height);
    }

    let scale = |edge: u32, longer: u32| -> u32 {
        ((edge as f64 * max as f64 / longer as f64).round() as u32).max(1)
    };

    if width >= height {
        (max, scale(height, width))
    } else {
        (scale(width, height), max)
    }
}

/// Downscale `image` so that neither edge exceeds `max`. Never upscales.
pub fn bound(image: DynamicImage, max: u32) -> DynamicImage {
    let (width, height) = (image.width(), image.height());
    let (target_w, target_h) = fit_within(width, height, max);

    if (target_w, target_h) == (width, height) {
        return image;
    }

    tracing::debug!(width, height, target_w, target_h, "Downscaling photo");
    image.resize_exact(target_w, target_h, FilterType::Lanczos3)
}
