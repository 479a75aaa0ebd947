//! Extension-keyed content translators.
//!
//! Turns a file on disk into renderable bytes:
//! - `.md` / `.markdown` files are converted to HTML, honoring an optional
//!   front-matter block (see [`markdown`]),
//! - `.txt` files are HTML-escaped with whitespace preserved,
//! - everything else passes through verbatim.
//!
//! The caller distinguishes a missing file ([`TranslateError::NotFound`])
//! from other failures so it can answer 404 instead of 500.

mod markdown;
mod text;

use std::path::{Path, PathBuf};

/// Error returned when translation fails.
#[derive(Debug, thiserror::Error)]
pub enum TranslateError {
    /// Source file does not exist.
    #[error("File not found: {}", .0.display())]
    NotFound(PathBuf),
    /// Any other I/O failure reading the source file.
    #[error("I/O error reading {}: {source}", .path.display())]
    Io {
        /// Path that failed to read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

impl TranslateError {
    /// True if the error means the source file is absent.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    fn from_io(err: std::io::Error, path: &Path) -> Self {
        if err.kind() == std::io::ErrorKind::NotFound {
            Self::NotFound(path.to_path_buf())
        } else {
            Self::Io {
                path: path.to_path_buf(),
                source: err,
            }
        }
    }
}

/// Translate a file into renderable bytes, dispatching on its extension.
///
/// # Errors
///
/// Returns [`TranslateError::NotFound`] if the file is absent, or
/// [`TranslateError::Io`] for any other read failure.
pub fn translate(path: &Path) -> Result<Vec<u8>, TranslateError> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("md" | "markdown") => markdown::translate(path),
        Some("txt") => text::translate(path),
        _ => read_bytes(path),
    }
}

/// Read a file verbatim.
fn read_bytes(path: &Path) -> Result<Vec<u8>, TranslateError> {
    std::fs::read(path).map_err(|e| TranslateError::from_io(e, path))
}

/// Read a file as UTF-8 text.
fn read_text(path: &Path) -> Result<String, TranslateError> {
    std::fs::read_to_string(path).map_err(|e| TranslateError::from_io(e, path))
}
