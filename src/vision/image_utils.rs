// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Upload validation and image decoding

use image::{DynamicImage, ImageFormat};
use thiserror::Error;

/// Content-type prefix every accepted upload must carry
pub const IMAGE_CONTENT_TYPE_PREFIX: &str = "image/";

/// Errors raised while turning upload bytes into pixels
#[derive(Debug, Error)]
pub enum ImageError {
    #[error("File must be an image")]
    InvalidInputType(String),

    #[error("Image data is empty")]
    EmptyData,

    #[error("Unsupported image format")]
    UnsupportedFormat,

    #[error("Failed to decode image: {0}")]
    DecodeFailed(#[source] image::ImageError),
}

/// Image information extracted during loading
#[derive(Debug, Clone)]
pub struct ImageInfo {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Format sniffed from the bytes
    pub format: ImageFormat,
    /// Size in bytes
    pub size_bytes: usize,
}

/// Cheap rejection of uploads that do not claim to be images.
///
/// Runs before any byte is inspected. A missing content-type never passes.
pub fn check_content_type(content_type: &str) -> Result<(), ImageError> {
    if content_type.starts_with(IMAGE_CONTENT_TYPE_PREFIX) {
        Ok(())
    } else {
        Err(ImageError::InvalidInputType(content_type.to_string()))
    }
}

/// Validate the declared content-type, then decode the bytes.
///
/// The declared type only gates the request; the actual format is sniffed
/// from the data, so a PNG labelled `image/jpeg` still decodes.
pub fn decode_upload(
    bytes: &[u8],
    content_type: &str,
) -> Result<(DynamicImage, ImageInfo), ImageError> {
    check_content_type(content_type)?;
    decode_image_bytes(bytes)
}

/// Decode raw image bytes (for multipart uploads)
pub fn decode_image_bytes(bytes: &[u8]) -> Result<(DynamicImage, ImageInfo), ImageError> {
    if bytes.is_empty() {
        return Err(ImageError::EmptyData);
    }

    let format = image::guess_format(bytes).map_err(|_| ImageError::UnsupportedFormat)?;

    let img = image::load_from_memory_with_format(bytes, format)
        .map_err(ImageError::DecodeFailed)?;

    let info = ImageInfo {
        width: img.width(),
        height: img.height(),
        format,
        size_bytes: bytes.len(),
    };

    Ok((img, info))
}
