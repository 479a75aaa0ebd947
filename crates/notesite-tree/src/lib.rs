//! Live-updating URI routing tree.
//!
//! This crate is the core of notesite: it walks a note directory and the
//! template root's static directories into an addressable [`UriTree`],
//! answers URI lookups through [`SiteRouter::route`], and keeps the tree
//! consistent under concurrent filesystem mutation and concurrent reads.
//!
//! # Layout convention
//!
//! Directories opt into the tree by carrying a marker file: a category
//! marker makes a directory a note category (and may override its name,
//! index file, or content-file pattern), a resource marker makes it a
//! static branch, and an unmarked directory is invisible. Files are
//! visible only when they match the active content-file pattern, whose
//! capture groups shape the URI segment and display name.
//!
//! # Example
//!
//! ```ignore
//! use notesite_tree::{SiteRouter, TreeOptions};
//! use notesite_template::TemplateFiles;
//!
//! let router = SiteRouter::new(options, files)?;
//! let body = router.route("/guides/setup")?;
//! // ...
//! router.close();
//! ```

mod builder;
mod category;
mod error;
mod navigation;
mod node;
mod router;
mod walker;
mod watcher;

pub use builder::{TreeOptions, build_tree};
pub use category::{CategoryConfig, ResourceConfig, load_category_config, load_resource_config};
pub use error::{BuildError, RouteError};
pub use node::{Node, NodeId, NodeKind, UriTree};
pub use router::SiteRouter;
