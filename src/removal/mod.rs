//! Background-removal collaborator contract.
//!
//! A remover receives the uploaded image as PNG bytes and answers with an image of the same
//! subject whose background pixels carry alpha 0. The session hands out a [`RemovalTicket`]
//! per request so a response that arrives after the foreground changed can be discarded.

use std::io::{Read as _, Write as _};
use std::path::PathBuf;
use std::process::{Command, Stdio};

use serde::Deserialize;

use crate::foundation::error::{CutframeError, CutframeResult};

/// Message used when a failed response carries no usable title.
pub const REMOVAL_FALLBACK_MESSAGE: &str = "Failed to remove background";

/// Produces a cut-out of the subject in a PNG image.
pub trait BackgroundRemover {
    /// Returns encoded image bytes, or [`CutframeError::Removal`] carrying a readable message.
    fn remove_background(&mut self, png: &[u8]) -> CutframeResult<Vec<u8>>;
}

/// One outstanding removal request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RemovalTicket {
    generation: u64,
    png: Vec<u8>,
}

impl RemovalTicket {
    pub(crate) fn new(generation: u64, png: Vec<u8>) -> Self {
        Self { generation, png }
    }

    /// Foreground generation the request was issued against.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Request body.
    pub fn png(&self) -> &[u8] {
        &self.png
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    errors: Vec<ErrorEntry>,
}

#[derive(Deserialize)]
struct ErrorEntry {
    title: Option<String>,
}

/// Extract the message from an error body of the form `{"errors":[{"title":"..."}]}`.
pub fn removal_error_message(body: &[u8]) -> String {
    serde_json::from_slice::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.errors.into_iter().next())
        .and_then(|e| e.title)
        .filter(|t| !t.trim().is_empty())
        .unwrap_or_else(|| REMOVAL_FALLBACK_MESSAGE.to_string())
}

/// Runs an external program that reads the PNG on stdin and writes the cut-out to stdout.
///
/// A non-zero exit is reported with the message parsed from stderr.
#[derive(Clone, Debug)]
pub struct CommandRemover {
    program: PathBuf,
    args: Vec<String>,
}

impl CommandRemover {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }
}

impl BackgroundRemover for CommandRemover {
    #[tracing::instrument(skip_all, fields(program = %self.program.display(), request_bytes = png.len()))]
    fn remove_background(&mut self, png: &[u8]) -> CutframeResult<Vec<u8>> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                CutframeError::removal(format!(
                    "failed to spawn '{}': {e}",
                    self.program.display()
                ))
            })?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| CutframeError::removal("failed to open remover stdin (unexpected)"))?;
        let mut stdout = child
            .stdout
            .take()
            .ok_or_else(|| CutframeError::removal("failed to open remover stdout (unexpected)"))?;

        let body = png.to_vec();
        let feeder = std::thread::spawn(move || stdin.write_all(&body));
        let stdout_drain = std::thread::spawn(move || {
            let mut out = Vec::new();
            stdout.read_to_end(&mut out)?;
            Ok::<_, std::io::Error>(out)
        });

        let output = child
            .wait_with_output()
            .map_err(|e| CutframeError::removal(format!("failed to wait for remover: {e}")))?;
        let stdout_bytes = stdout_drain
            .join()
            .map_err(|_| CutframeError::removal("remover stdout drain thread panicked"))?
            .map_err(|e| CutframeError::removal(format!("remover stdout read failed: {e}")))?;
        // A remover may exit before consuming its input; that surfaces through the exit status.
        let fed = feeder
            .join()
            .map_err(|_| CutframeError::removal("remover stdin feeder thread panicked"))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            tracing::warn!(status = %output.status, stderr = %stderr.trim(), "remover failed");
            return Err(CutframeError::removal(removal_error_message(&output.stderr)));
        }
        if let Err(e) = fed {
            return Err(CutframeError::removal(format!(
                "failed to write request to remover: {e}"
            )));
        }
        if stdout_bytes.is_empty() {
            return Err(CutframeError::removal(REMOVAL_FALLBACK_MESSAGE));
        }
        Ok(stdout_bytes)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/removal/mod.rs"]
mod tests;
