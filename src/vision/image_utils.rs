// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Upload validation and image decoding

use image::{DynamicImage, ImageFormat};
use thiserror::Error;

/// Maximum upload size (10MB)
pub const MAX_UPLOAD_SIZE: usize = 10 * 1024 * 1024;

/// Filename extensions accepted for upload (case-insensitive)
pub const ALLOWED_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg"];

/// Custom error types for image processing
#[derive(Debug, Error)]
pub enum VisionError {
    #[error("Image data is too large: {0} bytes (max: {1} bytes)")]
    TooLarge(usize, usize),

    #[error("Unsupported image format")]
    UnsupportedFormat,

    #[error("Failed to decode image: {0}")]
    DecodeFailed(String),

    #[error("Image data is empty")]
    EmptyData,
}

/// Image information extracted during loading
#[derive(Debug, Clone)]
pub struct ImageInfo {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Detected format
    pub format: ImageFormat,
    /// Size in bytes
    pub size_bytes: usize,
}

/// Check whether an uploaded filename carries an accepted extension.
///
/// The check is purely on the filename; the actual bytes are validated
/// separately during decoding.
pub fn has_allowed_extension(filename: &str) -> bool {
    let lowered = filename.to_lowercase();
    ALLOWED_EXTENSIONS
        .iter()
        .any(|ext| lowered.ends_with(&format!(".{ext}")))
}

/// Decode raw image bytes from a multipart upload
///
/// # Arguments
/// * `bytes` - Raw image bytes
///
/// # Returns
/// * `Ok((DynamicImage, ImageInfo))` - The decoded image and metadata
/// * `Err(VisionError)` - If decoding fails
pub fn decode_image_bytes(bytes: &[u8]) -> Result<(DynamicImage, ImageInfo), VisionError> {
    // Validate size
    if bytes.len() > MAX_UPLOAD_SIZE {
        return Err(VisionError::TooLarge(bytes.len(), MAX_UPLOAD_SIZE));
    }

    if bytes.is_empty() {
        return Err(VisionError::EmptyData);
    }

    // Detect format from magic bytes
    let format = detect_format(bytes)?;

    // Load image
    let img = image::load_from_memory_with_format(bytes, format)
        .map_err(|e| VisionError::DecodeFailed(e.to_string()))?;

    let info = ImageInfo {
        width: img.width(),
        height: img.height(),
        format,
        size_bytes: bytes.len(),
    };

    Ok((img, info))
}

/// Detect image format from magic bytes
///
/// Only the formats the upload contract accepts are recognized.
pub fn detect_format(bytes: &[u8]) -> Result<ImageFormat, VisionError> {
    if bytes.len() < 4 {
        return Err(VisionError::UnsupportedFormat);
    }

    match bytes {
        // PNG: 89 50 4E 47 (0x89 P N G)
        [0x89, 0x50, 0x4E, 0x47, ..] => Ok(ImageFormat::Png),

        // JPEG: FF D8 FF
        [0xFF, 0xD8, 0xFF, ..] => Ok(ImageFormat::Jpeg),

        _ => Err(VisionError::UnsupportedFormat),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::{engine::general_purpose::STANDARD, Engine as _};

    // 1x1 red PNG image (base64)
    const TINY_PNG_BASE64: &str = "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mP8z8DwHwAFBQIAX8jx0gAAAABJRU5ErkJggg==";

    #[test]
    fn test_allowed_extensions() {
        assert!(has_allowed_extension("photo.png"));
        assert!(has_allowed_extension("photo.jpg"));
        assert!(has_allowed_extension("photo.jpeg"));
    }

    #[test]
    fn test_allowed_extensions_case_insensitive() {
        assert!(has_allowed_extension("PHOTO.PNG"));
        assert!(has_allowed_extension("Photo.Jpg"));
        assert!(has_allowed_extension("crossing.JPEG"));
    }

    #[test]
    fn test_rejected_extensions() {
        assert!(!has_allowed_extension("photo.gif"));
        assert!(!has_allowed_extension("photo.webp"));
        assert!(!has_allowed_extension("photo"));
        assert!(!has_allowed_extension("photo.png.exe"));
        assert!(!has_allowed_extension(""));
    }

    #[test]
    fn test_decode_image_bytes_valid_png() {
        let bytes = STANDARD.decode(TINY_PNG_BASE64).unwrap();
        let (img, info) = decode_image_bytes(&bytes).unwrap();
        assert_eq!(info.width, 1);
        assert_eq!(info.height, 1);
        assert_eq!(info.format, ImageFormat::Png);
        assert_eq!(img.width(), 1);
        assert!(info.size_bytes > 0);
    }

    #[test]
    fn test_decode_image_bytes_empty() {
        let result = decode_image_bytes(&[]);
        assert!(matches!(result.unwrap_err(), VisionError::EmptyData));
    }

    #[test]
    fn test_decode_image_bytes_not_an_image() {
        let result = decode_image_bytes(&[0x00, 0x01, 0x02, 0x03, 0x04, 0x05]);
        assert!(matches!(result.unwrap_err(), VisionError::UnsupportedFormat));
    }

    #[test]
    fn test_decode_image_bytes_corrupted_png() {
        // PNG header but truncated data
        let result = decode_image_bytes(&[0x89, 0x50, 0x4E, 0x47, 0x00, 0x00, 0x00, 0x00]);
        assert!(matches!(result.unwrap_err(), VisionError::DecodeFailed(_)));
    }

    #[test]
    fn test_decode_image_bytes_too_large() {
        let large_bytes = vec![0u8; MAX_UPLOAD_SIZE + 1];
        let result = decode_image_bytes(&large_bytes);
        assert!(matches!(result.unwrap_err(), VisionError::TooLarge(_, _)));
    }

    #[test]
    fn test_detect_format_png() {
        let png_header = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
        assert_eq!(detect_format(&png_header).unwrap(), ImageFormat::Png);
    }

    #[test]
    fn test_detect_format_jpeg() {
        let jpeg_header = [0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, 0x4A, 0x46];
        assert_eq!(detect_format(&jpeg_header).unwrap(), ImageFormat::Jpeg);
    }

    #[test]
    fn test_detect_format_unknown() {
        // GIF is decodable by the image crate but outside the upload contract
        let gif_header = [0x47, 0x49, 0x46, 0x38, 0x39, 0x61];
        assert!(detect_format(&gif_header).is_err());
    }
}
