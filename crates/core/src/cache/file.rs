//! Disk-backed cache, one file per namespace.
//!
//! Namespaces are loaded on first access and written through on every
//! mutation. A missing, unreadable or foreign file reads as an empty
//! namespace.

use crate::logging::Logger;
use modroute_api::Cache;
use serde::{Deserialize, Serialize};
use serde_bytes::ByteBuf;
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};
use tracing::{debug, warn};
use xxhash_rust::xxh3::xxh3_64;

use super::CACHE_FORMAT_VERSION;

const FILE_EXTENSION: &str = "cache";

#[derive(Debug, Serialize, Deserialize)]
struct NamespaceFile {
    version: u32,
    namespace: String,
    entries: HashMap<String, ByteBuf>,
}

pub struct FileCache {
    base_dir: PathBuf,
    loaded: RwLock<HashMap<String, HashMap<String, Vec<u8>>>>,
    log: Logger,
}

impl FileCache {
    /// Open (and create if needed) a cache rooted at `base_dir`.
    pub fn new(base_dir: PathBuf, log: Logger) -> io::Result<Self> {
        fs::create_dir_all(&base_dir)?;
        Ok(Self {
            base_dir,
            loaded: RwLock::new(HashMap::new()),
            log,
        })
    }

    /// Default location, `~/.modroute/cache`.
    pub fn default_location() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".modroute")
            .join("cache")
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    fn namespace_path(&self, namespace: &str) -> PathBuf {
        self.base_dir.join(format!(
            "{:016x}.{}",
            xxh3_64(namespace.as_bytes()),
            FILE_EXTENSION
        ))
    }

    fn read_namespace(&self, namespace: &str) -> HashMap<String, Vec<u8>> {
        let path = self.namespace_path(namespace);
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(_) => return HashMap::new(),
        };

        match rmp_serde::from_slice::<NamespaceFile>(&bytes) {
            Ok(file) if file.version == CACHE_FORMAT_VERSION && file.namespace == namespace => file
                .entries
                .into_iter()
                .map(|(key, value)| (key, value.into_vec()))
                .collect(),
            Ok(_) => {
                self.log.in_scope(|| {
                    debug!("Ignoring cache file {:?} from another format or namespace", path)
                });
                HashMap::new()
            }
            Err(e) => {
                self.log
                    .in_scope(|| warn!("Discarding unreadable cache file {:?}: {}", path, e));
                HashMap::new()
            }
        }
    }

    fn write_namespace(&self, namespace: &str, entries: &HashMap<String, Vec<u8>>) {
        let path = self.namespace_path(namespace);
        let file = NamespaceFile {
            version: CACHE_FORMAT_VERSION,
            namespace: namespace.to_string(),
            entries: entries
                .iter()
                .map(|(key, value)| (key.clone(), ByteBuf::from(value.clone())))
                .collect(),
        };

        let result = rmp_serde::to_vec_named(&file)
            .map_err(|e| io::Error::other(e.to_string()))
            .and_then(|bytes| fs::write(&path, bytes));
        if let Err(e) = result {
            self.log
                .in_scope(|| warn!("Failed to persist cache namespace {}: {}", namespace, e));
        }
    }

    /// Run `f` against the namespace map, loading it from disk first if needed.
    fn with_namespace<R>(
        &self,
        namespace: &str,
        f: impl FnOnce(&mut HashMap<String, Vec<u8>>) -> R,
    ) -> R {
        let mut loaded = self.loaded.write().unwrap_or_else(PoisonError::into_inner);
        if !loaded.contains_key(namespace) {
            let entries = self.read_namespace(namespace);
            loaded.insert(namespace.to_string(), entries);
        }
        let entries = loaded.entry(namespace.to_string()).or_default();
        f(entries)
    }

    /// Remove every namespace file under the base directory.
    pub fn clear_all(&self) -> io::Result<()> {
        {
            let mut loaded = self.loaded.write().unwrap_or_else(PoisonError::into_inner);
            loaded.clear();
        }

        for entry in fs::read_dir(&self.base_dir)? {
            let entry = entry?;
            if entry
                .path()
                .extension()
                .is_some_and(|ext| ext == FILE_EXTENSION)
            {
                fs::remove_file(entry.path())?;
            }
        }
        Ok(())
    }
}

impl Cache for FileCache {
    fn get(&self, namespace: &str, key: &str) -> Option<Vec<u8>> {
        self.with_namespace(namespace, |entries| entries.get(key).cloned())
    }

    fn set(&self, namespace: &str, key: &str, value: Vec<u8>) {
        self.with_namespace(namespace, |entries| {
            entries.insert(key.to_string(), value);
            self.write_namespace(namespace, entries);
        });
    }

    fn delete(&self, namespace: &str, key: &str) {
        self.with_namespace(namespace, |entries| {
            if entries.remove(key).is_some() {
                self.write_namespace(namespace, entries);
            }
        });
    }

    fn clear(&self, namespace: &str) {
        {
            let mut loaded = self.loaded.write().unwrap_or_else(PoisonError::into_inner);
            loaded.insert(namespace.to_string(), HashMap::new());
        }
        let path = self.namespace_path(namespace);
        if path.exists() {
            if let Err(e) = fs::remove_file(&path) {
                self.log
                    .in_scope(|| warn!("Failed to remove cache file {:?}: {}", path, e));
            }
        }
    }
}
