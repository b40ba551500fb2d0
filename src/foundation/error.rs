/// Convenience result type used across cutframe.
pub type CutframeResult<T> = Result<T, CutframeError>;

/// Top-level error taxonomy used by editor and compositing APIs.
///
/// Every variant is recoverable: callers convert failures into a transient notice and keep
/// the previous editor state.
#[derive(thiserror::Error, Debug)]
pub enum CutframeError {
    /// Rejected input (file type, size, malformed configuration) before any decode attempt.
    #[error("validation error: {0}")]
    Validation(String),

    /// Corrupt or unreadable image data.
    #[error("decode error: {0}")]
    Decode(String),

    /// Failure reported by (or while talking to) the background-removal collaborator.
    #[error("background removal error: {0}")]
    Removal(String),

    /// Failure while compositing or rasterizing the output surface.
    #[error("canvas operation error: {0}")]
    CanvasOperation(String),

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl CutframeError {
    /// Build a [`CutframeError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`CutframeError::Decode`] value.
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    /// Build a [`CutframeError::Removal`] value.
    pub fn removal(msg: impl Into<String>) -> Self {
        Self::Removal(msg.into())
    }

    /// Build a [`CutframeError::CanvasOperation`] value.
    pub fn canvas(msg: impl Into<String>) -> Self {
        Self::CanvasOperation(msg.into())
    }

    /// Build a [`CutframeError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }

    /// Text shown to the user when this error surfaces as a notice.
    pub fn notice_text(&self) -> String {
        match self {
            Self::Validation(msg) => msg.clone(),
            Self::Decode(_) => "Failed to load image. Please try a different file.".to_owned(),
            Self::Removal(msg) => format!("Error removing background: {msg}"),
            Self::CanvasOperation(_) => {
                "An error occurred while processing the image. Please try again.".to_owned()
            }
            Self::Serde(msg) => msg.clone(),
            Self::Other(err) => err.to_string(),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
