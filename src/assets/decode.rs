use anyhow::Context;

use crate::assets::bitmap::AlphaBitmap;
use crate::foundation::error::{CutframeError, CutframeResult};

/// Maximum accepted size of an encoded source image (10 MiB).
pub const MAX_SOURCE_BYTES: usize = 10 * 1024 * 1024;

/// Largest pixel dimension the rasterizer can address.
pub const MAX_DIMENSION_PX: u32 = u16::MAX as u32;

const INVALID_TYPE_MSG: &str = "Please upload a valid image file (JPG, PNG, GIF, or WebP)";
const TOO_LARGE_MSG: &str = "Image file is too large. Please use an image smaller than 10MB";

/// Encodings accepted as editor input.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputFormat {
    Jpeg,
    Png,
    Gif,
    WebP,
}

impl InputFormat {
    /// Map a declared media type (`image/png`, ...) to an accepted format.
    pub fn from_media_type(media_type: &str) -> Option<Self> {
        match media_type.trim().to_ascii_lowercase().as_str() {
            "image/jpeg" | "image/jpg" => Some(Self::Jpeg),
            "image/png" => Some(Self::Png),
            "image/gif" => Some(Self::Gif),
            "image/webp" => Some(Self::WebP),
            _ => None,
        }
    }

    fn from_image_format(format: image::ImageFormat) -> Option<Self> {
        match format {
            image::ImageFormat::Jpeg => Some(Self::Jpeg),
            image::ImageFormat::Png => Some(Self::Png),
            image::ImageFormat::Gif => Some(Self::Gif),
            image::ImageFormat::WebP => Some(Self::WebP),
            _ => None,
        }
    }

    fn image_format(self) -> image::ImageFormat {
        match self {
            Self::Jpeg => image::ImageFormat::Jpeg,
            Self::Png => image::ImageFormat::Png,
            Self::Gif => image::ImageFormat::Gif,
            Self::WebP => image::ImageFormat::WebP,
        }
    }
}

/// Reject unsupported or oversized input before any decode attempt.
///
/// `media_type` is the declared type when the caller has one (upload metadata); the content is
/// sniffed either way.
pub fn validate_input(bytes: &[u8], media_type: Option<&str>) -> CutframeResult<InputFormat> {
    if let Some(mt) = media_type
        && InputFormat::from_media_type(mt).is_none()
    {
        return Err(CutframeError::validation(INVALID_TYPE_MSG));
    }
    if bytes.len() > MAX_SOURCE_BYTES {
        return Err(CutframeError::validation(TOO_LARGE_MSG));
    }
    image::guess_format(bytes)
        .ok()
        .and_then(InputFormat::from_image_format)
        .ok_or_else(|| CutframeError::validation(INVALID_TYPE_MSG))
}

/// Decode encoded image bytes into an [`AlphaBitmap`].
///
/// No byte limit applies here: [`MAX_SOURCE_BYTES`] bounds uploads through [`validate_input`],
/// while cut-outs returned by background removal may legitimately be larger than their source.
/// Decoded dimensions are still capped at [`MAX_DIMENSION_PX`].
#[tracing::instrument(skip(bytes), fields(len = bytes.len()))]
pub fn decode_image(bytes: &[u8]) -> CutframeResult<AlphaBitmap> {
    let format = image::guess_format(bytes)
        .ok()
        .and_then(InputFormat::from_image_format)
        .ok_or_else(|| CutframeError::decode("unrecognized or unsupported image encoding"))?;

    let dyn_img = image::load_from_memory_with_format(bytes, format.image_format())
        .context("decode image from memory")
        .map_err(|e| CutframeError::decode(format!("{e:#}")))?;
    let rgba = dyn_img.to_rgba8();
    let (width, height) = rgba.dimensions();
    if width > MAX_DIMENSION_PX || height > MAX_DIMENSION_PX {
        return Err(CutframeError::decode(format!(
            "image is {width}x{height}, maximum dimension is {MAX_DIMENSION_PX}"
        )));
    }

    AlphaBitmap::from_rgba8(width, height, rgba.into_raw())
        .map_err(|e| CutframeError::decode(e.to_string()))
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;
