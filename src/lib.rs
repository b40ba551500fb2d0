//! Cutframe composites a foreground image over a configurable background, optionally tracing
//! an outline around its alpha silhouette and drawing a styled caption on top.
//!
//! The editor-facing API is session-oriented:
//!
//! - Create an [`EditorSession`] (or build one from an [`EditDocument`])
//! - Feed it uploads, [`Edit`]s, pointer events and background-removal responses
//! - Read the latest [`CompositeFrame`] or [`export`](EditorSession::export) it as PNG
//!
//! Everything renders on the CPU.
#![forbid(unsafe_code)]

mod foundation;

/// Decoded images and upload validation.
pub mod assets;
/// Recompute scheduling, layer orchestration and the editor session.
pub mod compose;
/// PNG export.
pub mod export;
/// Background-removal collaborator.
pub mod removal;
/// Pixel-level layer painters.
pub mod render;
/// JSON edit documents.
pub mod scene;
/// Caption model, shaping and drawing.
pub mod text;

pub use crate::foundation::color::Color;
pub use crate::foundation::core::{Canvas, Point, Rect, Rgba8Premul, Vec2};
pub use crate::foundation::error::{CutframeError, CutframeResult};

pub use crate::assets::bitmap::AlphaBitmap;
pub use crate::assets::decode::{InputFormat, decode_image, validate_input};
pub use crate::compose::engine::{CompositeEngine, CompositeFrame, CompositeInputs, Foreground};
pub use crate::compose::notice::{Notice, NoticeKind};
pub use crate::compose::session::{CursorHint, Edit, EditorSession};
pub use crate::export::{ExportedImage, export_file_name, export_png};
pub use crate::removal::{BackgroundRemover, CommandRemover, RemovalTicket};
pub use crate::render::background::{
    BackgroundConfig, BackgroundKind, BackgroundSpec, GradientKind, GradientSpec,
};
pub use crate::render::boundary::{BoundaryMask, trace_boundary};
pub use crate::render::outline::OutlineSpec;
pub use crate::scene::document::EditDocument;
pub use crate::text::layout::FontBook;
pub use crate::text::overlay::{FontVariant, TextOverlaySpec};
