//! Template rendering for notesite pages.
//!
//! A [`TemplateSet`] loads the site author's index/category/content
//! templates (minijinja) plus optional pre-rendered 404/500 pages from the
//! template root, and can refresh itself in place when template files
//! change. Rendering takes typed data structs ([`IndexData`],
//! [`CategoryData`], [`ContentData`]) so the routing core never deals in
//! markup.

use std::path::{Path, PathBuf};
use std::sync::RwLock;

use minijinja::{AutoEscape, Environment};
use serde::Serialize;

/// A child entry of a category, as shown in listings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct NavItem {
    /// Display name.
    pub name: String,
    /// Canonical URI.
    pub uri: String,
    /// True for sub-categories, false for content files.
    pub is_dir: bool,
}

/// An entry of one navigation level (the children of one ancestor).
///
/// `is_ancestor` marks the entry lying on the path from the root to the
/// requested node, including the node itself on the innermost level.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CrumbItem {
    /// Display name.
    pub name: String,
    /// Canonical URI.
    pub uri: String,
    /// True for sub-categories, false for content files.
    pub is_dir: bool,
    /// True if this entry is on the path to the requested node.
    pub is_ancestor: bool,
}

/// Data for the site-root template.
#[derive(Clone, Debug, Default, Serialize)]
pub struct IndexData {
    /// Root category children.
    pub children: Vec<NavItem>,
    /// Rendered HTML of the root index file, empty if none is configured.
    pub content: String,
}

/// Data for the category template.
///
/// `parents[0]` holds the root level, `parents[last]` the siblings of the
/// category itself.
#[derive(Clone, Debug, Default, Serialize)]
pub struct CategoryData {
    /// Category display name.
    pub name: String,
    /// Category children.
    pub children: Vec<NavItem>,
    /// Rendered HTML of the category index file, empty if none.
    pub content: String,
    /// Navigation levels from the root down to the siblings.
    pub parents: Vec<Vec<CrumbItem>>,
}

/// Data for the content template.
#[derive(Clone, Debug, Default, Serialize)]
pub struct ContentData {
    /// Page title (the node display name).
    pub title: String,
    /// Rendered HTML body.
    pub content: String,
    /// Navigation levels from the root down to the siblings.
    pub parents: Vec<Vec<CrumbItem>>,
}

/// Template filenames within the template root.
#[derive(Clone, Debug)]
pub struct TemplateFiles {
    /// Template rendered for the site root.
    pub index: String,
    /// Template rendered for category listings.
    pub category: String,
    /// Template rendered for note pages.
    pub content: String,
    /// Pre-rendered 404 page, optional.
    pub error_404: Option<String>,
    /// Pre-rendered 500 page, optional.
    pub error_500: Option<String>,
}

/// Error returned when template loading or rendering fails.
#[derive(Debug, thiserror::Error)]
pub enum TemplateError {
    /// A template file could not be read.
    #[error("Failed to read template {}: {source}", .path.display())]
    Io {
        /// Template file path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// Template compilation or rendering failure.
    #[error("Template error: {0}")]
    Render(#[from] minijinja::Error),
}

/// Compiled templates plus fallback bodies, swapped wholesale on refresh.
struct Loaded {
    env: Environment<'static>,
    error_404: Vec<u8>,
    error_500: Vec<u8>,
}

/// The set of templates a site renders through.
///
/// Thread-safe: rendering takes a read lock, [`update`](Self::update)
/// builds a complete replacement before taking the write lock, so a failed
/// refresh leaves the previous templates serving.
pub struct TemplateSet {
    files: TemplateFiles,
    inner: RwLock<Loaded>,
}

impl TemplateSet {
    /// Load all templates from the template root.
    ///
    /// # Errors
    ///
    /// Returns [`TemplateError`] if a required template is unreadable or
    /// fails to compile. The 404/500 pages are optional; a missing file
    /// yields an empty fallback body.
    pub fn load(template_root: &Path, files: TemplateFiles) -> Result<Self, TemplateError> {
        let loaded = Self::read_all(template_root, &files)?;
        Ok(Self {
            files,
            inner: RwLock::new(loaded),
        })
    }

    /// Re-read all templates from the template root.
    ///
    /// # Errors
    ///
    /// Returns [`TemplateError`] on read or compile failure; the
    /// previously loaded templates stay in effect.
    pub fn update(&self, template_root: &Path) -> Result<(), TemplateError> {
        let loaded = Self::read_all(template_root, &self.files)?;
        *self.inner.write().unwrap() = loaded;
        Ok(())
    }

    fn read_all(template_root: &Path, files: &TemplateFiles) -> Result<Loaded, TemplateError> {
        let mut env = Environment::new();
        // Templates receive pre-rendered HTML in `content`; auto-escaping
        // would double-escape it.
        env.set_auto_escape_callback(|_| AutoEscape::None);

        for (name, file) in [
            ("index", &files.index),
            ("category", &files.category),
            ("content", &files.content),
        ] {
            let source = read_template(template_root, file)?;
            env.add_template_owned(name, source)?;
        }

        let error_404 = read_optional(template_root, files.error_404.as_deref());
        let error_500 = read_optional(template_root, files.error_500.as_deref());

        Ok(Loaded {
            env,
            error_404,
            error_500,
        })
    }

    /// Render the site-root template.
    ///
    /// # Errors
    ///
    /// Returns [`TemplateError::Render`] on a rendering failure.
    pub fn render_index(&self, data: &IndexData) -> Result<Vec<u8>, TemplateError> {
        self.render("index", data)
    }

    /// Render the category template.
    ///
    /// # Errors
    ///
    /// Returns [`TemplateError::Render`] on a rendering failure.
    pub fn render_category(&self, data: &CategoryData) -> Result<Vec<u8>, TemplateError> {
        self.render("category", data)
    }

    /// Render the content template.
    ///
    /// # Errors
    ///
    /// Returns [`TemplateError::Render`] on a rendering failure.
    pub fn render_content(&self, data: &ContentData) -> Result<Vec<u8>, TemplateError> {
        self.render("content", data)
    }

    fn render<S: Serialize>(&self, name: &str, data: S) -> Result<Vec<u8>, TemplateError> {
        let inner = self.inner.read().unwrap();
        let template = inner.env.get_template(name)?;
        Ok(template.render(data)?.into_bytes())
    }

    /// Pre-rendered 404 body (empty if not configured).
    #[must_use]
    pub fn error_404(&self) -> Vec<u8> {
        self.inner.read().unwrap().error_404.clone()
    }

    /// Pre-rendered 500 body (empty if not configured).
    #[must_use]
    pub fn error_500(&self) -> Vec<u8> {
        self.inner.read().unwrap().error_500.clone()
    }
}

/// Read a required template file.
fn read_template(template_root: &Path, file: &str) -> Result<String, TemplateError> {
    let path = template_root.join(file);
    std::fs::read_to_string(&path).map_err(|source| TemplateError::Io { path, source })
}

/// Read an optional pre-rendered page, defaulting to an empty body.
fn read_optional(template_root: &Path, file: Option<&str>) -> Vec<u8> {
    file.map_or_else(Vec::new, |f| {
        std::fs::read(template_root.join(f)).unwrap_or_default()
    })
}

#[cfg(test)]
mod tests {
    use std::fs;

    use pretty_assertions::assert_eq;

    use super::*;

    fn test_files() -> TemplateFiles {
        TemplateFiles {
            index: "index.html".to_owned(),
            category: "category.html".to_owned(),
            content: "content.html".to_owned(),
            error_404: Some("404.html".to_owned()),
            error_500: None,
        }
    }

    fn write_templates(dir: &Path) {
        fs::write(
            dir.join("index.html"),
            "<h1>Home</h1>{% for c in children %}<a href=\"{{ c.uri }}\">{{ c.name }}</a>{% endfor %}{{ content }}",
        )
        .unwrap();
        fs::write(
            dir.join("category.html"),
            "<h1>{{ name }}</h1>{% for c in children %}<a href=\"{{ c.uri }}\">{{ c.name }}</a>{% endfor %}{{ content }}",
        )
        .unwrap();
        fs::write(
            dir.join("content.html"),
            "<title>{{ title }}</title>{{ content }}",
        )
        .unwrap();
        fs::write(dir.join("404.html"), "<h1>not found</h1>").unwrap();
    }

    #[test]
    fn test_load_and_render_index() {
        let dir = tempfile::tempdir().unwrap();
        write_templates(dir.path());

        let set = TemplateSet::load(dir.path(), test_files()).unwrap();
        let data = IndexData {
            children: vec![NavItem {
                name: "Guide".to_owned(),
                uri: "/guide/".to_owned(),
                is_dir: true,
            }],
            content: String::new(),
        };

        let html = String::from_utf8(set.render_index(&data).unwrap()).unwrap();

        assert_eq!(html, "<h1>Home</h1><a href=\"/guide/\">Guide</a>");
    }

    #[test]
    fn test_render_content_keeps_html_unescaped() {
        let dir = tempfile::tempdir().unwrap();
        write_templates(dir.path());

        let set = TemplateSet::load(dir.path(), test_files()).unwrap();
        let data = ContentData {
            title: "Page".to_owned(),
            content: "<p>pre-rendered</p>".to_owned(),
            parents: Vec::new(),
        };

        let html = String::from_utf8(set.render_content(&data).unwrap()).unwrap();

        assert_eq!(html, "<title>Page</title><p>pre-rendered</p>");
    }

    #[test]
    fn test_render_category_with_name() {
        let dir = tempfile::tempdir().unwrap();
        write_templates(dir.path());

        let set = TemplateSet::load(dir.path(), test_files()).unwrap();
        let data = CategoryData {
            name: "Recipes".to_owned(),
            children: Vec::new(),
            content: "<p>intro</p>".to_owned(),
            parents: Vec::new(),
        };

        let html = String::from_utf8(set.render_category(&data).unwrap()).unwrap();

        assert_eq!(html, "<h1>Recipes</h1><p>intro</p>");
    }

    #[test]
    fn test_missing_required_template_is_io_error() {
        let dir = tempfile::tempdir().unwrap();

        let result = TemplateSet::load(dir.path(), test_files());

        assert!(matches!(result, Err(TemplateError::Io { .. })));
    }

    #[test]
    fn test_error_pages_loaded_and_defaulted() {
        let dir = tempfile::tempdir().unwrap();
        write_templates(dir.path());

        let set = TemplateSet::load(dir.path(), test_files()).unwrap();

        assert_eq!(set.error_404(), b"<h1>not found</h1>");
        assert!(set.error_500().is_empty());
    }

    #[test]
    fn test_update_picks_up_changed_template() {
        let dir = tempfile::tempdir().unwrap();
        write_templates(dir.path());

        let set = TemplateSet::load(dir.path(), test_files()).unwrap();
        fs::write(dir.path().join("content.html"), "changed: {{ title }}").unwrap();
        set.update(dir.path()).unwrap();

        let html = set
            .render_content(&ContentData {
                title: "X".to_owned(),
                ..Default::default()
            })
            .unwrap();

        assert_eq!(html, b"changed: X");
    }

    #[test]
    fn test_update_failure_keeps_previous_templates() {
        let dir = tempfile::tempdir().unwrap();
        write_templates(dir.path());

        let set = TemplateSet::load(dir.path(), test_files()).unwrap();
        fs::remove_file(dir.path().join("content.html")).unwrap();

        assert!(set.update(dir.path()).is_err());

        // Old template still renders.
        let html = set
            .render_content(&ContentData {
                title: "Y".to_owned(),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(html, b"<title>Y</title>");
    }

    #[test]
    fn test_invalid_template_syntax_is_render_error() {
        let dir = tempfile::tempdir().unwrap();
        write_templates(dir.path());
        fs::write(dir.path().join("index.html"), "{% for %}").unwrap();

        let result = TemplateSet::load(dir.path(), test_files());

        assert!(matches!(result, Err(TemplateError::Render(_))));
    }
}
