//! Tree node types and the URI map.
//!
//! The tree is an index-based arena: [`UriTree`] owns every [`Node`] and
//! the parent/child links are plain [`NodeId`] indices into it. Nodes are
//! immutable once a build finishes; a rebuild produces a whole new tree.

use std::collections::HashMap;
use std::path::PathBuf;

/// Index of a node inside its [`UriTree`].
pub type NodeId = usize;

/// The two node variants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    /// A directory: has ordered children and an optional index file.
    Category {
        /// Children in navigation order.
        children: Vec<NodeId>,
        /// Filename within the directory rendered at the category URI.
        index: Option<String>,
    },
    /// A single file.
    Content,
}

/// A node of the routing tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    /// Category or content.
    pub kind: NodeKind,
    /// Absolute filesystem path.
    pub path: PathBuf,
    /// Canonical URI, lower-case; ends in `/` for categories.
    pub uri: String,
    /// Display name shown in navigation.
    pub name: String,
    /// Parent category, `None` for the root.
    pub parent: Option<NodeId>,
    /// True for note nodes (rendered with page chrome), false for static
    /// assets.
    pub is_note: bool,
}

impl Node {
    /// True for category nodes.
    #[must_use]
    pub fn is_category(&self) -> bool {
        matches!(self.kind, NodeKind::Category { .. })
    }

    /// Children in navigation order (empty for content nodes).
    #[must_use]
    pub fn children(&self) -> &[NodeId] {
        match &self.kind {
            NodeKind::Category { children, .. } => children,
            NodeKind::Content => &[],
        }
    }

    /// The configured index filename, if any.
    #[must_use]
    pub fn index(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Category { index, .. } => index.as_deref(),
            NodeKind::Content => None,
        }
    }
}

/// The routing tree: node arena plus the URI map.
///
/// Keys are canonical lower-case URIs. Not every arena node is mapped:
/// static directories and resource branches keep their nodes for hierarchy
/// bookkeeping but are not addressable.
#[derive(Debug, Default)]
pub struct UriTree {
    nodes: Vec<Node>,
    by_uri: HashMap<String, NodeId>,
    root: NodeId,
}

impl UriTree {
    /// Look up a node id by canonical URI.
    #[must_use]
    pub fn lookup(&self, uri: &str) -> Option<NodeId> {
        self.by_uri.get(uri).copied()
    }

    /// Access a node by id.
    ///
    /// # Panics
    ///
    /// Panics if `id` did not come from this tree.
    #[must_use]
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id]
    }

    /// The root category id.
    #[must_use]
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Number of addressable URIs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_uri.len()
    }

    /// True if no URI is addressable.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_uri.is_empty()
    }

    /// Iterate over all mapped URIs.
    pub fn uris(&self) -> impl Iterator<Item = &str> {
        self.by_uri.keys().map(String::as_str)
    }

    /// Append a node to the arena without mapping it.
    pub(crate) fn push_node(&mut self, node: Node) -> NodeId {
        let id = self.nodes.len();
        self.nodes.push(node);
        id
    }

    /// Map a node's canonical URI. A later mapping for the same URI wins.
    pub(crate) fn map_uri(&mut self, id: NodeId) {
        let uri = self.nodes[id].uri.clone();
        self.by_uri.insert(uri, id);
    }

    /// Record a child on a category node.
    pub(crate) fn add_child(&mut self, parent: NodeId, child: NodeId) {
        if let NodeKind::Category { children, .. } = &mut self.nodes[parent].kind {
            children.push(child);
        }
    }

    pub(crate) fn set_root(&mut self, id: NodeId) {
        self.root = id;
    }
}
