//! Server-side image processing for uploads.

use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView};
use thiserror::Error;

/// Uploaded images are shrunk to fit inside this box. Smaller images keep their size.
pub const MAX_WIDTH: u32 = 1920;
pub const MAX_HEIGHT: u32 = 1080;

/// Lossy WebP quality used for every stored image.
pub const WEBP_QUALITY: f32 = 82.0;

#[derive(Debug, Error)]
pub enum TranscodeError {
    #[error("failed to decode image: {0}")]
    Decode(#[from] image::ImageError),
    #[error("failed to encode webp: {0}")]
    Encode(String),
}

/// Decode an uploaded image, bound it to 1920x1080 and re-encode as lossy WebP.
///
/// Aspect ratio is preserved and images are never enlarged. Animated inputs
/// keep only their first frame.
pub fn transcode_to_webp(data: &[u8]) -> Result<Vec<u8>, TranscodeError> {
    let decoded = image::load_from_memory(data)?;
    let (width, height) = decoded.dimensions();

    let bounded = if width > MAX_WIDTH || height > MAX_HEIGHT {
        decoded.resize(MAX_WIDTH, MAX_HEIGHT, FilterType::Lanczos3)
    } else {
        decoded
    };

    // The encoder only takes 8-bit RGB/RGBA buffers.
    let rgb = if bounded.color().has_alpha() {
        DynamicImage::ImageRgba8(bounded.to_rgba8())
    } else {
        DynamicImage::ImageRgb8(bounded.to_rgb8())
    };

    let encoder =
        webp::Encoder::from_image(&rgb).map_err(|e| TranscodeError::Encode(e.to_string()))?;
    Ok(encoder.encode(WEBP_QUALITY).to_vec())
}
