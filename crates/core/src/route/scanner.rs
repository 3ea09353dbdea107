//! Directory scanning for route tries.
//!
//! Listing order inside one directory: the index file, then the other
//! matching files sorted case-insensitively, then each subdirectory's
//! listing in the same order. Shallow files always precede deeper ones.
//! A directory that links back to one of its ancestors is not descended into.

use super::trie::RouteTrie;
use crate::logging::Logger;
use modroute_api::{FileSystem, SearchPathEntry};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

pub struct RouteScanner {
    fs: Arc<dyn FileSystem>,
    suffix: String,
    index: String,
    log: Logger,
}

impl RouteScanner {
    pub fn new(fs: Arc<dyn FileSystem>, suffix: &str, index: &str, log: Logger) -> Self {
        Self {
            fs,
            suffix: suffix.to_string(),
            index: index.to_string(),
            log,
        }
    }

    pub fn suffix(&self) -> &str {
        &self.suffix
    }

    pub fn index(&self) -> &str {
        &self.index
    }

    /// Build a trie from modules in search order; earlier modules win.
    pub fn build(&self, modules: &[SearchPathEntry]) -> RouteTrie {
        let start = Instant::now();
        let mut trie = RouteTrie::new(&self.suffix, &self.index);
        let mut files = 0;
        let mut shadowed = 0;

        for entry in modules {
            for relative in self.list(&entry.root) {
                files += 1;
                let path = relative
                    .iter()
                    .fold(entry.root.clone(), |path, segment| path.join(segment));
                if !trie.insert(&entry.module, &relative, path) {
                    shadowed += 1;
                }
            }
        }

        self.log.in_scope(|| {
            info!(
                "Route scan complete: {} modules, {} files, {} shadowed in {:?}",
                modules.len(),
                files,
                shadowed,
                start.elapsed()
            )
        });
        trie
    }

    /// Matching files under `root`, as segment lists relative to it.
    pub fn list(&self, root: &Path) -> Vec<Vec<String>> {
        let mut out = Vec::new();
        self.collect(root, &mut Vec::new(), &mut Vec::new(), &mut out);
        out
    }

    fn collect(
        &self,
        root: &Path,
        prefix: &mut Vec<String>,
        ancestors: &mut Vec<PathBuf>,
        out: &mut Vec<Vec<String>>,
    ) {
        let dir = prefix.iter().fold(root.to_path_buf(), |p, s| p.join(s));
        let canonical = self.fs.canonicalize(&dir).unwrap_or_else(|_| dir.clone());
        if ancestors.contains(&canonical) {
            self.log
                .in_scope(|| warn!("Skipping directory cycle at {:?}", dir));
            return;
        }

        let entries = match self.fs.list_entries(&dir) {
            Ok(entries) => entries,
            Err(e) => {
                self.log
                    .in_scope(|| warn!("Skipping unreadable directory {:?}: {}", dir, e));
                return;
            }
        };

        let index_file = format!("{}{}", self.index, self.suffix);
        let mut index = None;
        let mut files = Vec::new();
        let mut dirs = Vec::new();

        for entry in entries {
            if entry.name.starts_with('.') {
                continue;
            }
            if entry.is_dir {
                dirs.push(entry.name);
            } else if entry.name == index_file {
                index = Some(entry.name);
            } else if entry.name.len() > self.suffix.len() && entry.name.ends_with(&self.suffix) {
                files.push(entry.name);
            }
        }

        files.sort_by_cached_key(|name| name.to_lowercase());
        dirs.sort_by_cached_key(|name| name.to_lowercase());

        for name in index.into_iter().chain(files) {
            let mut relative = prefix.clone();
            relative.push(name);
            out.push(relative);
        }

        ancestors.push(canonical);
        for name in dirs {
            self.log
                .in_scope(|| debug!("Descending into {:?}", dir.join(&name)));
            prefix.push(name);
            self.collect(root, prefix, ancestors, out);
            prefix.pop();
        }
        ancestors.pop();
    }
}
