use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::assets::bitmap::AlphaBitmap;
use crate::assets::decode::{decode_image, validate_input};
use crate::compose::session::EditorSession;
use crate::foundation::core::Point;
use crate::foundation::error::{CutframeError, CutframeResult};
use crate::render::background::BackgroundConfig;
use crate::render::outline::OutlineSpec;
use crate::text::layout::FontBook;
use crate::text::overlay::{FontVariant, MAX_SIZE_PX, TextOverlaySpec};

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
struct BackgroundDef {
    #[serde(flatten)]
    config: BackgroundConfig,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    image: Option<String>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
struct TextDef {
    #[serde(flatten)]
    spec: TextOverlaySpec,
    /// Absent means "use the position a freshly loaded image gets".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    position: Option<Point>,
}

/// Font file per caption variant; unset variants fall back through [`FontBook`].
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FontPaths {
    pub default: Option<String>,
    pub orbitron: Option<String>,
    pub vt323: Option<String>,
    pub monoton: Option<String>,
}

impl FontPaths {
    fn entries(&self) -> impl Iterator<Item = (FontVariant, &str)> {
        [
            (FontVariant::Default, &self.default),
            (FontVariant::Orbitron, &self.orbitron),
            (FontVariant::Vt323, &self.vt323),
            (FontVariant::Monoton, &self.monoton),
        ]
        .into_iter()
        .filter_map(|(v, p)| p.as_deref().map(|p| (v, p)))
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
struct DocumentDef {
    foreground: String,
    #[serde(default)]
    cutout: bool,
    #[serde(default)]
    background: BackgroundDef,
    #[serde(default)]
    outline: OutlineSpec,
    #[serde(default)]
    text: TextDef,
    #[serde(default)]
    fonts: FontPaths,
}

/// JSON description of one edit: which images to load and every editor setting.
///
/// Image and font paths are relative to the document's directory.
#[derive(Clone, Debug)]
pub struct EditDocument {
    def: DocumentDef,
    base_dir: PathBuf,
}

impl EditDocument {
    /// Parse a document whose relative paths resolve against `base_dir`.
    pub fn from_reader<R: std::io::Read>(r: R, base_dir: impl Into<PathBuf>) -> CutframeResult<Self> {
        let def: DocumentDef = serde_json::from_reader(r)
            .map_err(|e| CutframeError::serde(format!("parse edit document JSON: {e}")))?;
        let doc = Self {
            def,
            base_dir: base_dir.into(),
        };
        doc.validate()?;
        Ok(doc)
    }

    pub fn from_json_str(json: &str, base_dir: impl Into<PathBuf>) -> CutframeResult<Self> {
        Self::from_reader(json.as_bytes(), base_dir)
    }

    /// Parse a document from disk; paths resolve against its parent directory.
    pub fn from_path(path: impl AsRef<Path>) -> CutframeResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            CutframeError::validation(format!("open edit document '{}': {e}", path.display()))
        })?;
        let base = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        Self::from_reader(BufReader::new(f), base)
    }

    fn validate(&self) -> CutframeResult<()> {
        normalize_rel_path(&self.def.foreground)?;
        if let Some(p) = &self.def.background.image {
            normalize_rel_path(p)?;
        }
        for (_, p) in self.def.fonts.entries() {
            normalize_rel_path(p)?;
        }
        let size = self.def.text.spec.size_px;
        if size == 0 || size > MAX_SIZE_PX {
            return Err(CutframeError::validation(format!(
                "text size_px must be in 1..={MAX_SIZE_PX}, got {size}"
            )));
        }
        Ok(())
    }

    fn resolve(&self, rel: &str) -> CutframeResult<PathBuf> {
        Ok(self.base_dir.join(normalize_rel_path(rel)?))
    }

    pub fn foreground_path(&self) -> CutframeResult<PathBuf> {
        self.resolve(&self.def.foreground)
    }

    pub fn background_image_path(&self) -> CutframeResult<Option<PathBuf>> {
        self.def
            .background
            .image
            .as_deref()
            .map(|p| self.resolve(p))
            .transpose()
    }

    /// Whether the foreground is already a cut-out with meaningful alpha.
    pub fn is_cutout(&self) -> bool {
        self.def.cutout
    }

    pub fn outline(&self) -> &OutlineSpec {
        &self.def.outline
    }

    pub fn text(&self) -> &TextOverlaySpec {
        &self.def.text.spec
    }

    /// Declared fonts, or the first system font when the document names none.
    pub fn font_book(&self) -> CutframeResult<FontBook> {
        let mut book = FontBook::new();
        for (variant, rel) in self.def.fonts.entries() {
            book.load(variant, &self.resolve(rel)?)?;
        }
        if book.is_empty() {
            book = FontBook::from_system().unwrap_or_default();
        }
        Ok(book)
    }

    fn read_image(&self, path: &Path) -> CutframeResult<AlphaBitmap> {
        let bytes =
            std::fs::read(path).with_context(|| format!("read image '{}'", path.display()))?;
        validate_input(&bytes, None)?;
        decode_image(&bytes)
    }

    /// Load every referenced file and return a session holding the document's state.
    #[tracing::instrument(skip_all, fields(base_dir = %self.base_dir.display()))]
    pub fn build_session(&self, now: Instant) -> CutframeResult<EditorSession> {
        let foreground = self.read_image(&self.foreground_path()?)?;
        let mut background = self.def.background.config.clone();
        if let Some(path) = self.background_image_path()? {
            background.image = Some(Arc::new(self.read_image(&path)?));
        }

        let mut session = EditorSession::new(self.font_book()?);
        session.set_foreground(foreground, self.def.cutout, now);

        let mut text = self.def.text.spec.clone();
        text.position = self.def.text.position.unwrap_or(session.text().position);
        session.configure(background, self.def.outline, text, now);
        Ok(session)
    }
}

/// Normalize and validate document-relative paths.
///
/// The result uses `/` separators, drops `.` segments, and rejects absolute paths or parent
/// traversals (`..`).
fn normalize_rel_path(source: &str) -> CutframeResult<String> {
    let s = source.replace('\\', "/");
    if s.starts_with('/') || s.chars().nth(1) == Some(':') {
        return Err(CutframeError::validation("document paths must be relative"));
    }
    if s.is_empty() {
        return Err(CutframeError::validation("document path must be non-empty"));
    }

    let mut out = Vec::<&str>::new();
    for part in s.split('/') {
        if part.is_empty() || part == "." {
            continue;
        }
        if part == ".." {
            return Err(CutframeError::validation(
                "document paths must not contain '..'",
            ));
        }
        out.push(part);
    }

    if out.is_empty() {
        return Err(CutframeError::validation(
            "document path must contain a file name",
        ));
    }

    Ok(out.join("/"))
}

#[cfg(test)]
#[path = "../../tests/unit/scene/document.rs"]
mod tests;
