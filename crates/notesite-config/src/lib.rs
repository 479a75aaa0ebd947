//! Configuration management for notesite.
//!
//! Parses `site.toml` configuration files with serde and validates the
//! result before the server starts. The configuration names the two
//! content roots (notes and templates), the marker filenames that opt
//! directories into the site tree, and exactly one listen endpoint
//! (TCP port or unix socket).

use std::path::{Path, PathBuf};

use regex::Regex;
use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Listen endpoint configuration.
    pub server: ServerConfig,
    /// Template root and template filenames.
    pub template: TemplateConfig,
    /// Note root and tree-building rules.
    pub notes: NotesConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            template: TemplateConfig::default(),
            notes: NotesConfig::default(),
        }
    }
}

/// Listen endpoint configuration.
///
/// Exactly one of `port` and `sock` must be set.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// TCP port to listen on.
    pub port: Option<u16>,
    /// Unix socket path to listen on.
    pub sock: Option<PathBuf>,
}

/// Template root and template filenames.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct TemplateConfig {
    /// Directory holding templates and static asset subdirectories.
    pub template_root: PathBuf,
    /// Subdirectories of the template root served as static assets.
    pub static_dirs: Vec<String>,
    /// Template rendered for the site root.
    pub index_template: String,
    /// Template rendered for category listings.
    pub category_template: String,
    /// Template rendered for note pages.
    pub content_template: String,
    /// Pre-rendered page served with 404 responses.
    pub error_404: Option<String>,
    /// Pre-rendered page served with 500 responses.
    pub error_500: Option<String>,
}

impl Default for TemplateConfig {
    fn default() -> Self {
        Self {
            template_root: PathBuf::from("template"),
            static_dirs: vec!["static".to_owned()],
            index_template: "index.html".to_owned(),
            category_template: "category.html".to_owned(),
            content_template: "content.html".to_owned(),
            error_404: None,
            error_500: None,
        }
    }
}

/// Note root and tree-building rules.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct NotesConfig {
    /// Directory holding the note tree.
    pub note_root: PathBuf,
    /// Marker filename that opts a directory into being a note category.
    pub category_marker: String,
    /// Marker filename that opts a directory into being a static branch.
    pub resource_marker: String,
    /// Default regex deciding which files are notes.
    ///
    /// Up to two capture groups: the first overrides the URI segment,
    /// the second overrides the display name.
    pub note_file_pattern: String,
}

impl Default for NotesConfig {
    fn default() -> Self {
        Self {
            note_root: PathBuf::from("notes"),
            category_marker: "category.toml".to_owned(),
            resource_marker: "resource.toml".to_owned(),
            note_file_pattern: r"^(.+)\.(?:md|markdown|txt)$".to_owned(),
        }
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Configuration file not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error reading the configuration file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Semantic validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
}

impl Config {
    /// Load configuration from a TOML file and validate it.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file is missing, unreadable,
    /// unparsable, or fails validation.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }
        let text = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` on a semantic error: no listen
    /// endpoint, two listen endpoints, empty required names, or a default
    /// note pattern that does not compile.
    pub fn validate(&self) -> Result<(), ConfigError> {
        match (&self.server.port, &self.server.sock) {
            (None, None) => {
                return Err(ConfigError::Validation(
                    "server.port or server.sock must be set".to_owned(),
                ));
            }
            (Some(_), Some(_)) => {
                return Err(ConfigError::Validation(
                    "server.port and server.sock cannot both be set".to_owned(),
                ));
            }
            _ => {}
        }

        require_non_empty(&self.template.index_template, "template.index_template")?;
        require_non_empty(&self.template.category_template, "template.category_template")?;
        require_non_empty(&self.template.content_template, "template.content_template")?;
        require_non_empty(&self.notes.category_marker, "notes.category_marker")?;
        require_non_empty(&self.notes.resource_marker, "notes.resource_marker")?;
        require_non_empty(&self.notes.note_file_pattern, "notes.note_file_pattern")?;

        self.note_pattern()?;
        Ok(())
    }

    /// Compile the default note-file pattern.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if the pattern is not a valid regex.
    pub fn note_pattern(&self) -> Result<Regex, ConfigError> {
        Regex::new(&self.notes.note_file_pattern).map_err(|e| {
            ConfigError::Validation(format!("notes.note_file_pattern is invalid: {e}"))
        })
    }
}

/// Reject an empty required field.
fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::Validation(format!("{field} must be set")));
    }
    Ok(())
}
