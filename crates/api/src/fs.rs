use std::io;
use std::path::{Path, PathBuf};

/// A single directory listing entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FsEntry {
    pub name: String,
    pub is_dir: bool,
}

impl FsEntry {
    pub fn file(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_dir: false,
        }
    }

    pub fn dir(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_dir: true,
        }
    }
}

/// The filesystem operations the resolution engine relies on.
///
/// Every call blocks the caller. Nothing else of the OS is used, so tests can
/// substitute an instrumented implementation.
pub trait FileSystem: Send + Sync {
    fn exists(&self, path: &Path) -> bool;

    fn is_readable(&self, path: &Path) -> bool;

    fn is_dir(&self, path: &Path) -> bool;

    /// List the direct children of a directory, in no particular order.
    fn list_entries(&self, path: &Path) -> io::Result<Vec<FsEntry>>;

    /// Resolve links so two paths to the same directory compare equal.
    fn canonicalize(&self, path: &Path) -> io::Result<PathBuf> {
        Ok(path.to_path_buf())
    }
}
