//! PNG export of the current composite.

use std::io::Cursor;

use anyhow::Context;
use chrono::{DateTime, Utc};

use crate::compose::engine::CompositeFrame;
use crate::foundation::error::CutframeResult;

/// An encoded export ready to be written out.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExportedImage {
    pub file_name: String,
    pub png: Vec<u8>,
}

/// `edited-image-<timestamp>.png`, where the timestamp is ISO-8601 UTC with millisecond
/// precision and `:`/`.` replaced by `-`.
pub fn export_file_name(at: DateTime<Utc>) -> String {
    format!("edited-image-{}.png", at.format("%Y-%m-%dT%H-%M-%S-%3fZ"))
}

/// Encode `frame` as straight-alpha RGBA8 PNG.
#[tracing::instrument(skip_all, fields(width = frame.width(), height = frame.height()))]
pub fn export_png(frame: &CompositeFrame, at: DateTime<Utc>) -> CutframeResult<ExportedImage> {
    let rgba = frame.surface().to_straight_rgba8();
    let mut png = Vec::new();
    image::write_buffer_with_format(
        &mut Cursor::new(&mut png),
        &rgba,
        frame.width(),
        frame.height(),
        image::ExtendedColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .context("encode composite as png")?;
    Ok(ExportedImage {
        file_name: export_file_name(at),
        png,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/export/mod.rs"]
mod tests;
