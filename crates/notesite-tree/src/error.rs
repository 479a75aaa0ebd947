//! Error types for tree building and routing.

use std::path::PathBuf;

/// Error aborting a tree build or rebuild.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    /// A directory or file could not be read.
    #[error("I/O error at {}: {source}", .path.display())]
    Io {
        /// Path that failed.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// A marker file is present but malformed.
    #[error("Malformed marker file {}: {source}", .path.display())]
    ConfigParse {
        /// Marker file path.
        path: PathBuf,
        /// Underlying TOML error.
        #[source]
        source: toml::de::Error,
    },
    /// A marker file supplies an invalid content-file pattern.
    #[error("Invalid content-file pattern in {}: {source}", .path.display())]
    Pattern {
        /// Marker file path.
        path: PathBuf,
        /// Underlying regex error.
        #[source]
        source: regex::Error,
    },
    /// Filesystem watcher registration failure.
    #[error("Watcher error: {0}")]
    Watch(#[from] notify::Error),
    /// Template loading failure.
    #[error(transparent)]
    Template(#[from] notesite_template::TemplateError),
}

impl BuildError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Error returned by [`SiteRouter::route`](crate::SiteRouter::route).
///
/// Each variant carries the pre-rendered fallback body the HTTP layer
/// should answer with.
#[derive(Debug, thiserror::Error)]
pub enum RouteError {
    /// The URI or its underlying file does not exist.
    #[error("Not found: {uri}")]
    NotFound {
        /// Normalized request URI.
        uri: String,
        /// Pre-rendered 404 body.
        body: Vec<u8>,
    },
    /// Translation or rendering failed.
    #[error("Internal error serving {uri}: {reason}")]
    Internal {
        /// Normalized request URI.
        uri: String,
        /// Failure description for logging.
        reason: String,
        /// Pre-rendered 500 body.
        body: Vec<u8>,
    },
}

impl RouteError {
    /// The fallback body to serve alongside the error status.
    #[must_use]
    pub fn body(&self) -> &[u8] {
        match self {
            Self::NotFound { body, .. } | Self::Internal { body, .. } => body,
        }
    }

    /// True if the error maps to HTTP 404.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
