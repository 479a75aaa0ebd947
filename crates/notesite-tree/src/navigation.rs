//! Navigation data derived from the tree.
//!
//! Templates receive the children of a node and, for non-root pages, the
//! ancestor levels: `parents[0]` holds the root category's children and
//! `parents[last]` the requested node's siblings. On every level the entry
//! lying on the path to the node is flagged `is_ancestor`, which marks the
//! node itself on the innermost level.

use notesite_template::{CrumbItem, NavItem};

use crate::node::{NodeId, UriTree};

/// Children of a category as listing items.
pub(crate) fn child_items(tree: &UriTree, id: NodeId) -> Vec<NavItem> {
    tree.node(id)
        .children()
        .iter()
        .map(|&child| {
            let node = tree.node(child);
            NavItem {
                name: node.name.clone(),
                uri: node.uri.clone(),
                is_dir: node.is_category(),
            }
        })
        .collect()
}

/// Ancestor levels for a node, root level first.
pub(crate) fn parent_levels(tree: &UriTree, id: NodeId) -> Vec<Vec<CrumbItem>> {
    let mut chain = vec![id];
    let mut current = id;
    while let Some(parent) = tree.node(current).parent {
        chain.push(parent);
        current = parent;
    }
    chain.reverse();

    chain
        .windows(2)
        .map(|window| {
            let (ancestor, on_path) = (window[0], window[1]);
            tree.node(ancestor)
                .children()
                .iter()
                .map(|&child| {
                    let node = tree.node(child);
                    CrumbItem {
                        name: node.name.clone(),
                        uri: node.uri.clone(),
                        is_dir: node.is_category(),
                        is_ancestor: child == on_path,
                    }
                })
                .collect()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::Path;

    use pretty_assertions::assert_eq;
    use regex::Regex;

    use super::*;
    use crate::builder::{TreeOptions, build_tree};

    fn fixture(root: &Path) -> UriTree {
        let notes = root.join("notes");
        let guides = notes.join("guides");
        fs::create_dir_all(&guides).unwrap();
        fs::create_dir_all(root.join("template")).unwrap();
        fs::write(guides.join("category.toml"), "").unwrap();
        fs::write(guides.join("setup.md"), "x").unwrap();
        fs::write(guides.join("usage.md"), "x").unwrap();
        fs::write(notes.join("about.md"), "x").unwrap();

        build_tree(&TreeOptions {
            note_root: notes,
            template_root: root.join("template"),
            static_dirs: Vec::new(),
            category_marker: "category.toml".to_owned(),
            resource_marker: "resource.toml".to_owned(),
            note_pattern: Regex::new(r"^(.+)\.md$").unwrap(),
        })
        .unwrap()
    }

    #[test]
    fn test_child_items_keep_sibling_order() {
        let dir = tempfile::tempdir().unwrap();
        let tree = fixture(dir.path());

        let items = child_items(&tree, tree.root());

        let uris: Vec<_> = items.iter().map(|i| i.uri.as_str()).collect();
        assert_eq!(uris, vec!["/guides/", "/about"]);
        assert!(items[0].is_dir);
        assert!(!items[1].is_dir);
    }

    #[test]
    fn test_root_has_no_parent_levels() {
        let dir = tempfile::tempdir().unwrap();
        let tree = fixture(dir.path());

        assert!(parent_levels(&tree, tree.root()).is_empty());
    }

    #[test]
    fn test_top_level_page_sees_root_level_only() {
        let dir = tempfile::tempdir().unwrap();
        let tree = fixture(dir.path());
        let about = tree.lookup("/about").unwrap();

        let levels = parent_levels(&tree, about);

        assert_eq!(levels.len(), 1);
        let flags: Vec<_> = levels[0]
            .iter()
            .map(|i| (i.uri.as_str(), i.is_ancestor))
            .collect();
        assert_eq!(flags, vec![("/guides/", false), ("/about", true)]);
    }

    #[test]
    fn test_nested_page_sees_ancestor_chain() {
        let dir = tempfile::tempdir().unwrap();
        let tree = fixture(dir.path());
        let setup = tree.lookup("/guides/setup").unwrap();

        let levels = parent_levels(&tree, setup);

        assert_eq!(levels.len(), 2);
        // Root level: guides is the ancestor.
        let root_flags: Vec<_> = levels[0]
            .iter()
            .map(|i| (i.uri.as_str(), i.is_ancestor))
            .collect();
        assert_eq!(root_flags, vec![("/guides/", true), ("/about", false)]);
        // Sibling level: the page itself is flagged.
        let sibling_flags: Vec<_> = levels[1]
            .iter()
            .map(|i| (i.uri.as_str(), i.is_ancestor))
            .collect();
        assert_eq!(
            sibling_flags,
            vec![("/guides/setup", true), ("/guides/usage", false)]
        );
    }

    #[test]
    fn test_category_levels_end_at_its_siblings() {
        let dir = tempfile::tempdir().unwrap();
        let tree = fixture(dir.path());
        let guides = tree.lookup("/guides/").unwrap();

        let levels = parent_levels(&tree, guides);

        assert_eq!(levels.len(), 1);
        assert!(levels[0].iter().any(|i| i.uri == "/guides/" && i.is_ancestor));
    }
}
