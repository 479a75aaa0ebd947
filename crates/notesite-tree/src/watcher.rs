//! Filesystem watch set.
//!
//! Wraps a notify watcher with per-directory (non-recursive) registration,
//! mirroring the tree: every directory under the watched roots is armed
//! individually so create/remove events surface for each level. A watcher
//! is built fresh on every rebuild; dropping the old one releases its OS
//! resources.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;

use notify::{RecommendedWatcher, RecursiveMode, Watcher};

use crate::error::BuildError;
use crate::walker::read_dir_sorted;

/// Message consumed by the rebuild coordinator.
#[derive(Debug)]
pub(crate) enum WatchMessage {
    /// A raw filesystem event.
    Fs(notify::Event),
    /// A watcher backend error.
    Error(notify::Error),
    /// Stop the coordinator thread.
    Shutdown,
}

/// A notify watcher plus the set of directories currently registered.
pub(crate) struct FsWatcher {
    inner: RecommendedWatcher,
    dirs: HashSet<PathBuf>,
}

impl FsWatcher {
    /// Create a watcher feeding events into the coordinator channel.
    pub(crate) fn new(tx: Sender<WatchMessage>) -> Result<Self, BuildError> {
        let inner = notify::recommended_watcher(move |res: Result<notify::Event, notify::Error>| {
            let msg = match res {
                Ok(event) => WatchMessage::Fs(event),
                Err(e) => WatchMessage::Error(e),
            };
            // The receiver closing means the coordinator is gone; events
            // are simply dropped then.
            let _ = tx.send(msg);
        })?;
        Ok(Self {
            inner,
            dirs: HashSet::new(),
        })
    }

    /// Register a directory and all its subdirectories.
    pub(crate) fn add_dir_recursive(&mut self, dir: &Path) -> Result<(), BuildError> {
        self.inner.watch(dir, RecursiveMode::NonRecursive)?;
        self.dirs.insert(dir.to_path_buf());
        for sub in read_dir_sorted(dir)?.dirs {
            self.add_dir_recursive(&sub.path)?;
        }
        Ok(())
    }

    /// Unregister a removed path, if it was a watched directory.
    pub(crate) fn remove_dir(&mut self, path: &Path) {
        if self.dirs.remove(path) {
            let _ = self.inner.unwatch(path);
        }
    }

    /// The directories currently registered.
    #[cfg(test)]
    pub(crate) fn watched_dirs(&self) -> &HashSet<PathBuf> {
        &self.dirs
    }
}
