use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::sync::Arc;

use anyhow::Context;

use crate::foundation::color::Color;
use crate::foundation::error::{CutframeError, CutframeResult};
use crate::text::overlay::{FontVariant, TextMetrics};

/// Well-known system font paths to try, in preference order.
const SYSTEM_FONT_PATHS: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Bold.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/liberation-sans-fonts/LiberationSans-Regular.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu-sans-fonts/DejaVuSans.ttf",
    "/usr/share/fonts/noto/NotoSans-Regular.ttf",
    "/usr/share/fonts/truetype/noto/NotoSans-Regular.ttf",
    "/usr/share/fonts/google-droid-sans-fonts/DroidSans.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
/// RGBA8 brush color carried through Parley layouts.
pub(crate) struct TextBrushRgba8 {
    pub(crate) r: u8,
    pub(crate) g: u8,
    pub(crate) b: u8,
    pub(crate) a: u8,
}

impl From<Color> for TextBrushRgba8 {
    fn from(c: Color) -> Self {
        Self {
            r: c.r,
            g: c.g,
            b: c.b,
            a: c.a,
        }
    }
}

/// Font file bytes per caption variant.
///
/// Lookups for a variant without its own face fall back to [`FontVariant::Default`], then to
/// any loaded face.
#[derive(Clone, Debug, Default)]
pub struct FontBook {
    faces: BTreeMap<FontVariant, Arc<Vec<u8>>>,
}

impl FontBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// First readable font from a fixed list of system locations, registered as the default
    /// face. `None` when no candidate exists.
    pub fn from_system() -> Option<Self> {
        SYSTEM_FONT_PATHS.iter().find_map(|p| {
            let bytes = std::fs::read(p).ok()?;
            tracing::debug!(path = p, "using system font");
            let mut book = Self::new();
            book.insert(FontVariant::Default, bytes);
            Some(book)
        })
    }

    pub fn insert(&mut self, variant: FontVariant, bytes: Vec<u8>) {
        self.faces.insert(variant, Arc::new(bytes));
    }

    pub fn load(&mut self, variant: FontVariant, path: &Path) -> CutframeResult<()> {
        let bytes = std::fs::read(path)
            .with_context(|| format!("read font file '{}'", path.display()))?;
        if bytes.is_empty() {
            return Err(CutframeError::validation(format!(
                "font file '{}' is empty",
                path.display()
            )));
        }
        self.insert(variant, bytes);
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }

    pub fn face(&self, variant: FontVariant) -> Option<&Arc<Vec<u8>>> {
        self.faces
            .get(&variant)
            .or_else(|| self.faces.get(&FontVariant::Default))
            .or_else(|| self.faces.values().next())
    }
}

/// A shaped single-line caption plus the face it was shaped with.
pub(crate) struct ShapedText {
    pub(crate) layout: parley::Layout<TextBrushRgba8>,
    pub(crate) font: vello_cpu::peniko::FontData,
}

impl ShapedText {
    pub(crate) fn width(&self) -> f64 {
        f64::from(self.layout.width())
    }
}

struct RegisteredFamily {
    bytes: Arc<Vec<u8>>,
    name: String,
}

/// Stateful helper for building Parley text layouts from a [`FontBook`].
pub struct TextLayoutEngine {
    fonts: FontBook,
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<TextBrushRgba8>,
    families: HashMap<FontVariant, RegisteredFamily>,
}

impl TextLayoutEngine {
    pub fn new(fonts: FontBook) -> Self {
        Self {
            fonts,
            font_ctx: parley::FontContext::default(),
            layout_ctx: parley::LayoutContext::new(),
            families: HashMap::new(),
        }
    }

    pub fn has_fonts(&self) -> bool {
        !self.fonts.is_empty()
    }

    fn face(&self, variant: FontVariant) -> CutframeResult<Arc<Vec<u8>>> {
        self.fonts.face(variant).cloned().ok_or_else(|| {
            CutframeError::canvas(format!("no font loaded for caption variant '{variant}'"))
        })
    }

    // Registers each face once; re-registers when the book's bytes for the variant changed.
    fn family_name(&mut self, variant: FontVariant, bytes: &Arc<Vec<u8>>) -> CutframeResult<String> {
        if let Some(f) = self.families.get(&variant)
            && Arc::ptr_eq(&f.bytes, bytes)
        {
            return Ok(f.name.clone());
        }

        let families = self
            .font_ctx
            .collection
            .register_fonts(parley::fontique::Blob::from(bytes.as_ref().clone()), None);
        let family_id = families.first().map(|(id, _)| *id).ok_or_else(|| {
            CutframeError::validation("no font families registered from font bytes")
        })?;
        let name = self
            .font_ctx
            .collection
            .family_name(family_id)
            .ok_or_else(|| CutframeError::validation("registered font family has no name"))?
            .to_string();

        self.families.insert(
            variant,
            RegisteredFamily {
                bytes: Arc::clone(bytes),
                name: name.clone(),
            },
        );
        Ok(name)
    }

    /// Shape `text` on a single unbroken line.
    pub(crate) fn layout(
        &mut self,
        text: &str,
        variant: FontVariant,
        size_px: f32,
        brush: TextBrushRgba8,
    ) -> CutframeResult<ShapedText> {
        if !size_px.is_finite() || size_px <= 0.0 {
            return Err(CutframeError::validation(
                "text size_px must be finite and > 0",
            ));
        }
        let bytes = self.face(variant)?;
        let family_name = self.family_name(variant, &bytes)?;

        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(std::borrow::Cow::Owned(family_name)),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(size_px));
        builder.push_default(parley::style::StyleProperty::Brush(brush));

        let mut layout: parley::Layout<TextBrushRgba8> = builder.build(text);
        layout.break_all_lines(None);

        let font = vello_cpu::peniko::FontData::new(
            vello_cpu::peniko::Blob::from(bytes.as_ref().clone()),
            0,
        );
        Ok(ShapedText { layout, font })
    }
}

impl TextMetrics for TextLayoutEngine {
    fn measure_width(
        &mut self,
        text: &str,
        font: FontVariant,
        render_size_px: f32,
    ) -> CutframeResult<f64> {
        let shaped = self.layout(text, font, render_size_px, TextBrushRgba8::default())?;
        Ok(shaped.width())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/text/layout.rs"]
mod tests;
