//! Per-directory marker configuration.
//!
//! A directory opts into the note tree by carrying a category marker file,
//! or into the static tree by carrying a resource marker file. Markers are
//! TOML, read fresh on every rebuild. A missing marker is "no override";
//! a present but malformed marker aborts the rebuild that found it.

use std::path::Path;

use regex::Regex;
use serde::Deserialize;

use crate::error::BuildError;

/// Category marker contents.
#[derive(Debug, Default, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct CategoryConfig {
    /// Canonical name: replaces the directory name in the URI.
    pub name: Option<String>,
    /// Cosmetic name shown in navigation; does not affect the URI.
    pub display_name: Option<String>,
    /// Filename within the directory rendered at the category URI.
    pub index: Option<String>,
    /// Content-file pattern override, inherited by descendants.
    pub note_file_pattern: Option<String>,
}

impl CategoryConfig {
    /// Compile the pattern override, if present.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::Pattern`] if the override is not a valid
    /// regex; `marker_path` names the offending file.
    pub fn compiled_pattern(&self, marker_path: &Path) -> Result<Option<Regex>, BuildError> {
        self.note_file_pattern
            .as_deref()
            .map(|p| {
                Regex::new(p).map_err(|source| BuildError::Pattern {
                    path: marker_path.to_path_buf(),
                    source,
                })
            })
            .transpose()
    }
}

/// Resource marker contents.
#[derive(Debug, Default, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ResourceConfig {
    /// Cosmetic name shown in navigation; does not affect the URI.
    pub name: Option<String>,
}

/// Load the category marker of a directory.
///
/// # Errors
///
/// Returns [`BuildError::Io`] if the marker exists but cannot be read, or
/// [`BuildError::ConfigParse`] if it is not valid TOML.
pub fn load_category_config(
    dir: &Path,
    marker: &str,
) -> Result<Option<CategoryConfig>, BuildError> {
    load_marker(dir, marker)
}

/// Load the resource marker of a directory.
///
/// # Errors
///
/// Same contract as [`load_category_config`].
pub fn load_resource_config(
    dir: &Path,
    marker: &str,
) -> Result<Option<ResourceConfig>, BuildError> {
    load_marker(dir, marker)
}

fn load_marker<T: for<'de> Deserialize<'de>>(
    dir: &Path,
    marker: &str,
) -> Result<Option<T>, BuildError> {
    let path = dir.join(marker);
    let text = match std::fs::read_to_string(&path) {
        Ok(text) => text,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(BuildError::io(path, e)),
    };
    let config = toml::from_str(&text).map_err(|source| BuildError::ConfigParse { path, source })?;
    Ok(Some(config))
}
