#![allow(dead_code)]

use modroute_api::{FileSystem, FsEntry};
use modroute_core::OsFileSystem;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

/// OS filesystem that counts every call made through it.
#[derive(Default)]
pub struct CountingFileSystem {
    inner: OsFileSystem,
    stats: AtomicUsize,
    listings: AtomicUsize,
}

impl CountingFileSystem {
    pub fn new() -> Self {
        Self::default()
    }

    /// exists / is_readable / is_dir calls so far.
    pub fn stats(&self) -> usize {
        self.stats.load(Ordering::SeqCst)
    }

    pub fn listings(&self) -> usize {
        self.listings.load(Ordering::SeqCst)
    }

    pub fn total(&self) -> usize {
        self.stats() + self.listings()
    }
}

impl FileSystem for CountingFileSystem {
    fn exists(&self, path: &Path) -> bool {
        self.stats.fetch_add(1, Ordering::SeqCst);
        self.inner.exists(path)
    }

    fn is_readable(&self, path: &Path) -> bool {
        self.stats.fetch_add(1, Ordering::SeqCst);
        self.inner.is_readable(path)
    }

    fn is_dir(&self, path: &Path) -> bool {
        self.stats.fetch_add(1, Ordering::SeqCst);
        self.inner.is_dir(path)
    }

    fn list_entries(&self, path: &Path) -> io::Result<Vec<FsEntry>> {
        self.listings.fetch_add(1, Ordering::SeqCst);
        self.inner.list_entries(path)
    }
}

/// OS filesystem that reports chosen paths as missing and unreadable.
///
/// Listings and `is_dir` still see the real tree, so a masked file is picked
/// up by scans but fails every usability check afterwards.
#[derive(Default)]
pub struct MaskedFileSystem {
    inner: OsFileSystem,
    masked: Mutex<Vec<PathBuf>>,
}

impl MaskedFileSystem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mask(&self, path: &Path) {
        self.masked.lock().unwrap().push(path.to_path_buf());
    }

    fn is_masked(&self, path: &Path) -> bool {
        self.masked.lock().unwrap().iter().any(|p| p == path)
    }
}

impl FileSystem for MaskedFileSystem {
    fn exists(&self, path: &Path) -> bool {
        !self.is_masked(path) && self.inner.exists(path)
    }

    fn is_readable(&self, path: &Path) -> bool {
        !self.is_masked(path) && self.inner.is_readable(path)
    }

    fn is_dir(&self, path: &Path) -> bool {
        self.inner.is_dir(path)
    }

    fn list_entries(&self, path: &Path) -> io::Result<Vec<FsEntry>> {
        self.inner.list_entries(path)
    }
}

/// Write `content` to `root/relative`, creating parent directories.
pub fn write_file(root: &Path, relative: &str, content: &str) -> PathBuf {
    let path = root.join(relative);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(&path, content).unwrap();
    path
}

pub fn make_dir(root: &Path, relative: &str) -> PathBuf {
    let path = root.join(relative);
    std::fs::create_dir_all(&path).unwrap();
    path
}
