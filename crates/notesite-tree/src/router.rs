//! The routing core.
//!
//! [`SiteRouter`] owns the current [`UriTree`] snapshot and the watch set,
//! serves lookups under a shared read lock, and runs a single coordinator
//! thread that rebuilds the tree (or refreshes the template cache) when
//! the filesystem changes.
//!
//! # Concurrency
//!
//! - `route` clones the `Arc<UriTree>` snapshot and drops the lock before
//!   any translation or rendering happens, so readers never block each
//!   other and never wait on a rebuild beyond the pointer swap.
//! - Rebuilds construct the new tree and a fully registered new watcher
//!   off-lock, then swap both; a failed rebuild leaves the serving state
//!   untouched.
//! - [`close`](SiteRouter::close) stops the coordinator with a shutdown
//!   message and waits for the thread to finish before the watcher is
//!   released.

use std::path::Path;
use std::sync::mpsc::{Receiver, Sender};
use std::sync::{Arc, Mutex, RwLock, Weak, mpsc};
use std::thread::JoinHandle;

use notesite_template::{CategoryData, ContentData, IndexData, TemplateFiles, TemplateSet};
use notesite_translate::TranslateError;
use notify::EventKind;
use notify::event::{ModifyKind, RenameMode};

use crate::builder::{TreeOptions, build_tree};
use crate::error::{BuildError, RouteError};
use crate::navigation;
use crate::node::{NodeId, NodeKind, UriTree};
use crate::watcher::{FsWatcher, WatchMessage};

/// Normalized change derived from a raw watcher event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Change {
    Created,
    Removed,
    Changed,
}

/// The live-updating URI router.
pub struct SiteRouter {
    options: TreeOptions,
    templates: TemplateSet,
    tree: RwLock<Arc<UriTree>>,
    watch: Mutex<Option<FsWatcher>>,
    events_tx: Sender<WatchMessage>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl SiteRouter {
    /// Build the initial tree, arm the watcher, and start the coordinator.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError`] if templates cannot be loaded, the initial
    /// tree build fails, or the watcher cannot be armed; startup aborts
    /// in all three cases.
    pub fn new(
        options: TreeOptions,
        template_files: TemplateFiles,
    ) -> Result<Arc<Self>, BuildError> {
        let mut options = options;
        // Watcher events carry canonical paths; the roots must match for
        // prefix classification.
        options.note_root = std::fs::canonicalize(&options.note_root)
            .map_err(|e| BuildError::io(&options.note_root, e))?;
        options.template_root = std::fs::canonicalize(&options.template_root)
            .map_err(|e| BuildError::io(&options.template_root, e))?;

        let templates = TemplateSet::load(&options.template_root, template_files)?;
        let tree = build_tree(&options)?;

        let (events_tx, events_rx) = mpsc::channel();
        let mut watcher = FsWatcher::new(events_tx.clone())?;
        watcher.add_dir_recursive(&options.template_root)?;
        watcher.add_dir_recursive(&options.note_root)?;

        let router = Arc::new(Self {
            options,
            templates,
            tree: RwLock::new(Arc::new(tree)),
            watch: Mutex::new(Some(watcher)),
            events_tx,
            worker: Mutex::new(None),
        });

        let weak = Arc::downgrade(&router);
        let handle = std::thread::spawn(move || Self::event_loop(&weak, &events_rx));
        *router.worker.lock().unwrap() = Some(handle);

        tracing::info!(
            note_root = %router.options.note_root.display(),
            uris = router.tree.read().unwrap().len(),
            "routing tree built"
        );
        Ok(router)
    }

    /// Resolve a request URI to response bytes.
    ///
    /// # Errors
    ///
    /// Returns [`RouteError::NotFound`] for unmapped URIs and missing
    /// files, [`RouteError::Internal`] for translation and rendering
    /// failures; both carry the fallback body to serve.
    pub fn route(&self, uri: &str) -> Result<Vec<u8>, RouteError> {
        let tree = Arc::clone(&self.tree.read().unwrap());
        let key = uri.to_lowercase();
        let Some(id) = tree.lookup(&key) else {
            return Err(self.not_found(&key));
        };
        self.render_node(&tree, id, &key)
    }

    /// Stop the coordinator thread and release the watcher.
    ///
    /// Blocks until the thread confirms by terminating; an in-flight
    /// rebuild finishes first. Safe to call more than once.
    pub fn close(&self) {
        let _ = self.events_tx.send(WatchMessage::Shutdown);
        if let Some(handle) = self.worker.lock().unwrap().take() {
            let _ = handle.join();
        }
        *self.watch.lock().unwrap() = None;
    }

    /// The URIs currently served. Test and introspection helper.
    #[must_use]
    pub fn current_uris(&self) -> Vec<String> {
        self.tree
            .read()
            .unwrap()
            .uris()
            .map(str::to_owned)
            .collect()
    }

    // --- coordinator ---------------------------------------------------

    fn event_loop(router: &Weak<Self>, rx: &Receiver<WatchMessage>) {
        while let Ok(msg) = rx.recv() {
            match msg {
                WatchMessage::Shutdown => break,
                WatchMessage::Error(e) => {
                    tracing::warn!(error = %e, "filesystem watcher error");
                }
                WatchMessage::Fs(event) => {
                    let Some(router) = router.upgrade() else {
                        break;
                    };
                    router.handle_fs_event(&event);
                }
            }
        }
    }

    fn handle_fs_event(&self, event: &notify::Event) {
        let Some(change) = classify(&event.kind) else {
            return;
        };
        for path in &event.paths {
            match change {
                Change::Created => {
                    if path.is_dir()
                        && let Some(watcher) = self.watch.lock().unwrap().as_mut()
                        && let Err(e) = watcher.add_dir_recursive(path)
                    {
                        tracing::warn!(path = %path.display(), error = %e, "failed to watch new directory");
                    }
                    self.dispatch(path);
                }
                Change::Removed => {
                    if let Some(watcher) = self.watch.lock().unwrap().as_mut() {
                        watcher.remove_dir(path);
                    }
                    self.dispatch(path);
                }
                Change::Changed => {
                    if path.is_file() {
                        self.dispatch(path);
                    }
                }
            }
        }
    }

    /// Route a change to the cheap template refresh or the full rebuild.
    ///
    /// Only changes directly inside the template root (and outside the
    /// note root) qualify for the cheap path; everything else re-walks
    /// both roots.
    fn dispatch(&self, path: &Path) {
        let in_note_root = path.starts_with(&self.options.note_root);
        if !in_note_root && path.parent() == Some(self.options.template_root.as_path()) {
            tracing::debug!(path = %path.display(), "refreshing template cache");
            if let Err(e) = self.templates.update(&self.options.template_root) {
                tracing::warn!(error = %e, "template refresh failed; keeping previous templates");
            }
        } else {
            self.rebuild();
        }
    }

    fn rebuild(&self) {
        match self.try_rebuild() {
            Ok(uris) => tracing::info!(uris, "routing tree rebuilt"),
            Err(e) => {
                tracing::warn!(error = %e, "rebuild failed; keeping previous tree");
            }
        }
    }

    fn try_rebuild(&self) -> Result<usize, BuildError> {
        let tree = build_tree(&self.options)?;
        let uris = tree.len();

        let mut watcher = FsWatcher::new(self.events_tx.clone())?;
        watcher.add_dir_recursive(&self.options.template_root)?;
        watcher.add_dir_recursive(&self.options.note_root)?;

        // Swap only after both snapshot structures exist; the old watcher
        // drops here and releases its registrations.
        *self.watch.lock().unwrap() = Some(watcher);
        *self.tree.write().unwrap() = Arc::new(tree);
        Ok(uris)
    }

    // --- content production --------------------------------------------

    fn render_node(&self, tree: &UriTree, id: NodeId, uri: &str) -> Result<Vec<u8>, RouteError> {
        let node = tree.node(id);
        match &node.kind {
            NodeKind::Content => {
                let bytes = notesite_translate::translate(&node.path)
                    .map_err(|e| self.translate_error(uri, &e))?;
                if !node.is_note {
                    return Ok(bytes);
                }
                let data = ContentData {
                    title: node.name.clone(),
                    content: String::from_utf8_lossy(&bytes).into_owned(),
                    parents: navigation::parent_levels(tree, id),
                };
                self.templates
                    .render_content(&data)
                    .map_err(|e| self.internal(uri, &e))
            }
            NodeKind::Category { .. } => {
                let mut content = String::new();
                if let Some(index_file) = node.index() {
                    let bytes = notesite_translate::translate(&node.path.join(index_file))
                        .map_err(|e| self.translate_error(uri, &e))?;
                    content = String::from_utf8_lossy(&bytes).into_owned();
                }
                let children = navigation::child_items(tree, id);
                if node.parent.is_none() {
                    let data = IndexData { children, content };
                    self.templates
                        .render_index(&data)
                        .map_err(|e| self.internal(uri, &e))
                } else {
                    let data = CategoryData {
                        name: node.name.clone(),
                        children,
                        content,
                        parents: navigation::parent_levels(tree, id),
                    };
                    self.templates
                        .render_category(&data)
                        .map_err(|e| self.internal(uri, &e))
                }
            }
        }
    }

    fn not_found(&self, uri: &str) -> RouteError {
        RouteError::NotFound {
            uri: uri.to_owned(),
            body: self.templates.error_404(),
        }
    }

    fn internal(&self, uri: &str, reason: &dyn std::fmt::Display) -> RouteError {
        RouteError::Internal {
            uri: uri.to_owned(),
            reason: reason.to_string(),
            body: self.templates.error_500(),
        }
    }

    fn translate_error(&self, uri: &str, error: &TranslateError) -> RouteError {
        if error.is_not_found() {
            self.not_found(uri)
        } else {
            self.internal(uri, error)
        }
    }
}

/// Map a raw notify event kind to a normalized change.
///
/// Renames surface as `Modify(Name(..))`: the vacated path counts as a
/// removal, the new path as a creation.
fn classify(kind: &EventKind) -> Option<Change> {
    match kind {
        EventKind::Create(_) => Some(Change::Created),
        EventKind::Remove(_) => Some(Change::Removed),
        EventKind::Modify(ModifyKind::Name(RenameMode::To)) => Some(Change::Created),
        EventKind::Modify(ModifyKind::Name(_)) => Some(Change::Removed),
        EventKind::Modify(_) => Some(Change::Changed),
        _ => None,
    }
}
