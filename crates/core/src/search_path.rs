//! Precedence-ordered registry of module roots.

use indexmap::IndexMap;
use modroute_api::{FileSystem, ResolverError, Result, SearchPathEntry};
use serde::{Deserialize, Serialize};
use std::hash::Hasher;
use std::path::Path;
use std::sync::Arc;
use xxhash_rust::xxh3::Xxh3;

/// Snapshot of a sorted search path, stored next to cached data.
///
/// Any difference between the stored snapshot and the live search path
/// invalidates the whole cache namespace it guards.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fingerprint {
    entries: Vec<SearchPathEntry>,
}

impl Fingerprint {
    pub fn entries(&self) -> &[SearchPathEntry] {
        &self.entries
    }

    /// Short hash for log output.
    pub fn digest(&self) -> u64 {
        let mut hasher = Xxh3::new();
        for entry in &self.entries {
            hasher.write(entry.module.as_bytes());
            hasher.write_u8(0);
            hasher.write(entry.root.as_os_str().as_encoded_bytes());
            hasher.write_u8(0);
            hasher.write_i64(entry.precedence);
        }
        hasher.finish()
    }
}

pub struct SearchPath {
    fs: Arc<dyn FileSystem>,
    entries: IndexMap<String, SearchPathEntry>,
    /// Sorted view, dropped on every mutation and rebuilt on demand.
    sorted: Option<Vec<SearchPathEntry>>,
}

impl SearchPath {
    pub fn new(fs: Arc<dyn FileSystem>) -> Self {
        Self {
            fs,
            entries: IndexMap::new(),
            sorted: None,
        }
    }

    /// Register `module` at `root`, replacing any previous entry for it.
    pub fn add(&mut self, module: &str, root: &Path, precedence: i64) -> Result<()> {
        if !self.fs.is_dir(root) || !self.fs.is_readable(root) {
            return Err(ResolverError::PathNotFound {
                path: root.to_path_buf(),
            });
        }
        self.entries.insert(
            module.to_string(),
            SearchPathEntry::new(module, root, precedence),
        );
        self.sorted = None;
        Ok(())
    }

    pub fn set_precedence(&mut self, module: &str, precedence: i64) -> Result<()> {
        let entry = self
            .entries
            .get_mut(module)
            .ok_or_else(|| ResolverError::UnknownModule {
                module: module.to_string(),
            })?;
        entry.precedence = precedence;
        self.sorted = None;
        Ok(())
    }

    pub fn precedence(&self, module: &str) -> Result<i64> {
        self.entries
            .get(module)
            .map(|entry| entry.precedence)
            .ok_or_else(|| ResolverError::UnknownModule {
                module: module.to_string(),
            })
    }

    pub fn contains(&self, module: &str) -> bool {
        self.entries.contains_key(module)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in search order: ascending precedence, then root path.
    pub fn sorted(&mut self) -> &[SearchPathEntry] {
        self.sorted.get_or_insert_with(|| {
            let mut sorted: Vec<SearchPathEntry> = self.entries.values().cloned().collect();
            sorted.sort_by(SearchPathEntry::search_order);
            sorted
        })
    }

    pub fn fingerprint(&mut self) -> Fingerprint {
        Fingerprint {
            entries: self.sorted().to_vec(),
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.sorted = None;
    }
}
