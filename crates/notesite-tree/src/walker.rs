//! Directory walker.
//!
//! Lists a directory's immediate entries, partitioned into subdirectories
//! and files and sorted by name so navigation order is deterministic
//! regardless of filesystem enumeration order.

use std::path::{Path, PathBuf};

use crate::error::BuildError;

/// One directory entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct DirEntry {
    /// Entry name.
    pub name: String,
    /// Absolute path.
    pub path: PathBuf,
}

/// A directory's immediate entries.
#[derive(Debug, Default)]
pub(crate) struct DirListing {
    /// Subdirectories, sorted by name.
    pub dirs: Vec<DirEntry>,
    /// Files, sorted by name.
    pub files: Vec<DirEntry>,
}

/// List a directory's entries, partitioned and sorted.
///
/// Symlinks are classified without following them, so a symlinked
/// directory is treated as a file and never recursed into.
pub(crate) fn read_dir_sorted(dir: &Path) -> Result<DirListing, BuildError> {
    let entries = std::fs::read_dir(dir).map_err(|e| BuildError::io(dir, e))?;

    let mut listing = DirListing::default();
    for entry in entries {
        let entry = entry.map_err(|e| BuildError::io(dir, e))?;
        let is_dir = entry.file_type().is_ok_and(|t| t.is_dir());
        let item = DirEntry {
            name: entry.file_name().to_string_lossy().into_owned(),
            path: entry.path(),
        };
        if is_dir {
            listing.dirs.push(item);
        } else {
            listing.files.push(item);
        }
    }

    listing.dirs.sort_by(|a, b| a.name.cmp(&b.name));
    listing.files.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(listing)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_partitions_dirs_and_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("note.md"), "x").unwrap();

        let listing = read_dir_sorted(dir.path()).unwrap();

        assert_eq!(listing.dirs.len(), 1);
        assert_eq!(listing.dirs[0].name, "sub");
        assert_eq!(listing.files.len(), 1);
        assert_eq!(listing.files[0].name, "note.md");
    }

    #[test]
    fn test_entries_are_sorted_by_name() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["zeta.md", "alpha.md", "mid.md"] {
            fs::write(dir.path().join(name), "x").unwrap();
        }

        let listing = read_dir_sorted(dir.path()).unwrap();

        let names: Vec<_> = listing.files.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["alpha.md", "mid.md", "zeta.md"]);
    }

    #[test]
    fn test_missing_directory_is_io_error() {
        let dir = tempfile::tempdir().unwrap();

        let result = read_dir_sorted(&dir.path().join("absent"));

        assert!(matches!(result, Err(BuildError::Io { .. })));
    }

    #[test]
    fn test_empty_directory() {
        let dir = tempfile::tempdir().unwrap();

        let listing = read_dir_sorted(dir.path()).unwrap();

        assert!(listing.dirs.is_empty());
        assert!(listing.files.is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinked_directory_is_not_a_dir() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("real")).unwrap();
        std::os::unix::fs::symlink(dir.path().join("real"), dir.path().join("link")).unwrap();

        let listing = read_dir_sorted(dir.path()).unwrap();

        assert_eq!(listing.dirs.len(), 1);
        assert_eq!(listing.dirs[0].name, "real");
        assert_eq!(listing.files.len(), 1);
        assert_eq!(listing.files[0].name, "link");
    }
}
