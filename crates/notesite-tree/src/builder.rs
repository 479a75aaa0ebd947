//! URI tree construction.
//!
//! Walks the note root and the template root's static directories into a
//! [`UriTree`], applying the marker opt-in policy, per-directory pattern
//! inheritance, and the capture-group URI rules.

use std::path::PathBuf;

use regex::Regex;

use crate::category::{load_category_config, load_resource_config};
use crate::error::BuildError;
use crate::node::{Node, NodeId, NodeKind, UriTree};
use crate::walker::read_dir_sorted;

/// Inputs the tree builder needs, assembled once at startup.
#[derive(Debug, Clone)]
pub struct TreeOptions {
    /// Root of the note tree.
    pub note_root: PathBuf,
    /// Root of templates and static assets.
    pub template_root: PathBuf,
    /// Subdirectories of the template root merged into the URI space.
    pub static_dirs: Vec<String>,
    /// Marker filename opting a directory into the note tree.
    pub category_marker: String,
    /// Marker filename opting a directory into the static tree.
    pub resource_marker: String,
    /// Default content-file pattern, overridable per category.
    pub note_pattern: Regex,
}

/// Build the full routing tree from scratch.
///
/// Static branches are walked first so a colliding note URI wins the map
/// entry. Sibling order everywhere is subdirectories first, then files,
/// each sorted by name.
///
/// # Errors
///
/// Returns [`BuildError`] if any directory is unreadable or any marker
/// file is malformed; the caller keeps its previous tree in that case.
pub fn build_tree(options: &TreeOptions) -> Result<UriTree, BuildError> {
    let mut tree = UriTree::default();

    for static_dir in &options.static_dirs {
        let dir = options.template_root.join(static_dir);
        let local_root = tree.push_node(Node {
            kind: NodeKind::Category {
                children: Vec::new(),
                index: None,
            },
            path: dir.clone(),
            uri: "/".to_owned(),
            name: String::new(),
            parent: None,
            is_note: false,
        });
        build_static_dir(&mut tree, local_root, &dir, "/")?;
    }

    // The note root's own marker may override the pattern and designate an
    // index file; its name fields do not apply to the root.
    let mut pattern = options.note_pattern.clone();
    let mut root_index = None;
    if let Some(conf) = load_category_config(&options.note_root, &options.category_marker)? {
        let marker = options.note_root.join(&options.category_marker);
        if let Some(p) = conf.compiled_pattern(&marker)? {
            pattern = p;
        }
        root_index = conf.index;
    }

    let root = tree.push_node(Node {
        kind: NodeKind::Category {
            children: Vec::new(),
            index: root_index,
        },
        path: options.note_root.clone(),
        uri: "/".to_owned(),
        name: String::new(),
        parent: None,
        is_note: true,
    });
    tree.set_root(root);
    tree.map_uri(root);

    build_note_dir(&mut tree, options, root, &pattern)?;
    Ok(tree)
}

/// Walk one note category directory.
fn build_note_dir(
    tree: &mut UriTree,
    options: &TreeOptions,
    parent: NodeId,
    pattern: &Regex,
) -> Result<(), BuildError> {
    let dir = tree.node(parent).path.clone();
    let base_uri = tree.node(parent).uri.clone();
    let listing = read_dir_sorted(&dir)?;

    for entry in &listing.dirs {
        if let Some(conf) = load_category_config(&entry.path, &options.category_marker)? {
            let marker = entry.path.join(&options.category_marker);
            let sub_pattern = conf
                .compiled_pattern(&marker)?
                .unwrap_or_else(|| pattern.clone());
            let uri_name = conf.name.clone().unwrap_or_else(|| entry.name.clone());
            let display = conf
                .display_name
                .or(conf.name)
                .unwrap_or_else(|| entry.name.clone());
            let uri = format!("{base_uri}{}/", uri_name.to_lowercase());
            let id = tree.push_node(Node {
                kind: NodeKind::Category {
                    children: Vec::new(),
                    index: conf.index,
                },
                path: entry.path.clone(),
                uri,
                name: display,
                parent: Some(parent),
                is_note: true,
            });
            tree.map_uri(id);
            tree.add_child(parent, id);
            build_note_dir(tree, options, id, &sub_pattern)?;
        } else if let Some(conf) = load_resource_config(&entry.path, &options.resource_marker)? {
            // Resource branches contribute file URIs but are themselves
            // invisible: no map entry, no sibling listing.
            let display = conf.name.unwrap_or_else(|| entry.name.clone());
            let uri = format!("{base_uri}{}/", entry.name.to_lowercase());
            let id = tree.push_node(Node {
                kind: NodeKind::Category {
                    children: Vec::new(),
                    index: None,
                },
                path: entry.path.clone(),
                uri: uri.clone(),
                name: display,
                parent: Some(parent),
                is_note: false,
            });
            build_static_dir(tree, id, &entry.path, &uri)?;
        }
        // No marker at all: the directory stays out of the tree.
    }

    for entry in &listing.files {
        let Some((segment, display)) = match_content_file(&entry.name, pattern) else {
            continue;
        };
        let uri = format!("{base_uri}{}", segment.to_lowercase());
        let id = tree.push_node(Node {
            kind: NodeKind::Content,
            path: entry.path.clone(),
            uri,
            name: display,
            parent: Some(parent),
            is_note: true,
        });
        tree.map_uri(id);
        tree.add_child(parent, id);
    }

    Ok(())
}

/// Walk one static directory; every entry is included, no pattern applies.
fn build_static_dir(
    tree: &mut UriTree,
    parent: NodeId,
    dir: &std::path::Path,
    base_uri: &str,
) -> Result<(), BuildError> {
    let listing = read_dir_sorted(dir)?;

    for entry in &listing.dirs {
        let uri = format!("{base_uri}{}/", entry.name.to_lowercase());
        let id = tree.push_node(Node {
            kind: NodeKind::Category {
                children: Vec::new(),
                index: None,
            },
            path: entry.path.clone(),
            uri: uri.clone(),
            name: entry.name.clone(),
            parent: Some(parent),
            is_note: false,
        });
        tree.add_child(parent, id);
        build_static_dir(tree, id, &entry.path, &uri)?;
    }

    for entry in &listing.files {
        let uri = format!("{base_uri}{}", entry.name.to_lowercase());
        let id = tree.push_node(Node {
            kind: NodeKind::Content,
            path: entry.path.clone(),
            uri,
            name: entry.name.clone(),
            parent: Some(parent),
            is_note: false,
        });
        tree.map_uri(id);
        tree.add_child(parent, id);
    }

    Ok(())
}

/// Apply the content-file pattern to a filename.
///
/// Returns the URI segment and the display name, or `None` if the file is
/// invisible. A first capture group ending in a literal dot turns the
/// segment into a trailing-slash form while the display name drops the
/// dot (the numbered-chapter convention).
fn match_content_file(name: &str, pattern: &Regex) -> Option<(String, String)> {
    let caps = pattern.captures(name)?;

    let mut segment = name.to_owned();
    let mut display = name.to_owned();

    if let Some(group) = caps.get(1)
        && !group.as_str().is_empty()
    {
        if let Some(stripped) = group.as_str().strip_suffix('.') {
            display = stripped.to_owned();
            segment = format!("{stripped}/");
        } else {
            display = group.as_str().to_owned();
            segment = display.clone();
        }
    }
    if let Some(group) = caps.get(2)
        && !group.as_str().is_empty()
    {
        display = group.as_str().to_owned();
    }

    Some((segment, display))
}
