//! Name-to-file resolution over a search path, for templates and assets.

use super::namespace::CacheNamespace;
use super::{ModuleResolver, ResolverStats, is_usable};
use crate::logging::Logger;
use crate::search_path::SearchPath;
use modroute_api::{Cache, FileSystem, ResolveRecord, Result, SearchPathEntry};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

fn record_key(reference: &str) -> String {
    format!("ref:{reference}")
}

pub struct FlatResolver {
    namespace: CacheNamespace,
    search_path: SearchPath,
    fs: Arc<dyn FileSystem>,
    authoritative: bool,
    stats: ResolverStats,
    log: Logger,
}

impl FlatResolver {
    pub fn new(name: &str, fs: Arc<dyn FileSystem>, log: Logger) -> Self {
        Self {
            namespace: CacheNamespace::new(name, None, log.clone()),
            search_path: SearchPath::new(fs.clone()),
            fs,
            authoritative: false,
            stats: ResolverStats::default(),
            log,
        }
    }

    pub fn with_cache(mut self, cache: Arc<dyn Cache>) -> Self {
        self.namespace.attach(Some(cache));
        self
    }

    pub fn set_cache(&mut self, cache: Option<Arc<dyn Cache>>) {
        self.namespace.attach(cache);
    }

    /// Path of the file backing `reference`, if any module provides one.
    pub fn resolve(&mut self, reference: &str) -> Option<PathBuf> {
        self.resolve_record(reference).into_path()
    }

    /// Like [`resolve`](Self::resolve), keeping the winning module.
    ///
    /// Never returns [`ResolveRecord::Unknown`].
    pub fn resolve_record(&mut self, reference: &str) -> ResolveRecord {
        let reference = reference.trim_start_matches('/');
        let fingerprint = self.search_path.fingerprint();
        self.namespace.validate(&fingerprint);

        let key = record_key(reference);
        let cached = self
            .namespace
            .load::<ResolveRecord>(&key)
            .unwrap_or(ResolveRecord::Unknown);

        match cached {
            ResolveRecord::NotFound if self.authoritative => {
                self.stats.hits += 1;
                return ResolveRecord::NotFound;
            }
            ResolveRecord::Found { module, path } => {
                if is_usable(self.fs.as_ref(), &path) {
                    self.stats.hits += 1;
                    return ResolveRecord::Found { module, path };
                }
                if self.authoritative {
                    // Trusted until explicitly cleared, even though the file is gone
                    self.stats.hits += 1;
                    return ResolveRecord::NotFound;
                }
                self.log
                    .in_scope(|| debug!(reference, ?path, "Cached file is gone, searching again"));
            }
            _ => {}
        }

        self.stats.misses += 1;
        let record = self.search(reference);
        self.namespace
            .store_with_fingerprint(&key, &record, &fingerprint);
        record
    }

    fn search(&mut self, reference: &str) -> ResolveRecord {
        self.stats.scans += 1;
        for entry in self.search_path.sorted() {
            let candidate = entry.root.join(reference);
            if is_usable(self.fs.as_ref(), &candidate) {
                self.log.in_scope(|| {
                    debug!(reference, module = %entry.module, "Resolved to {:?}", candidate)
                });
                return ResolveRecord::Found {
                    module: entry.module.clone(),
                    path: candidate,
                };
            }
        }
        self.log
            .in_scope(|| debug!(reference, "No module provides reference"));
        ResolveRecord::NotFound
    }
}

impl ModuleResolver for FlatResolver {
    fn name(&self) -> &str {
        self.namespace.name()
    }

    fn add_to_search_path(&mut self, module: &str, root: &Path, precedence: i64) -> Result<()> {
        self.search_path.add(module, root, precedence)
    }

    fn search_path(&mut self) -> Vec<SearchPathEntry> {
        self.search_path.sorted().to_vec()
    }

    fn has_module(&self, module: &str) -> bool {
        self.search_path.contains(module)
    }

    fn set_precedence(&mut self, module: &str, precedence: i64) -> Result<()> {
        self.search_path.set_precedence(module, precedence)
    }

    fn precedence(&self, module: &str) -> Result<i64> {
        self.search_path.precedence(module)
    }

    fn clear_search_path(&mut self) {
        self.search_path.clear();
        self.namespace.reset();
    }

    fn clear_cache(&mut self) {
        self.namespace.reset();
    }

    fn set_authoritative(&mut self, authoritative: bool) {
        self.authoritative = authoritative;
    }

    fn is_authoritative(&self) -> bool {
        self.authoritative
    }

    fn stats(&self) -> ResolverStats {
        self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryCache;
    use crate::fs::OsFileSystem;
    use tempfile::TempDir;

    fn setup() -> (TempDir, FlatResolver) {
        let temp = TempDir::new().unwrap();
        let resolver = FlatResolver::new("template", Arc::new(OsFileSystem), Logger::silent())
            .with_cache(Arc::new(MemoryCache::new()));
        (temp, resolver)
    }

    #[test]
    fn test_resolve_reports_module() {
        let (temp, mut resolver) = setup();
        let root = temp.path().join("core");
        std::fs::create_dir_all(root.join("layout")).unwrap();
        std::fs::write(root.join("layout/page.html"), b"<html>").unwrap();
        resolver.add_to_search_path("core", &root, 1).unwrap();

        let record = resolver.resolve_record("layout/page.html");
        assert_eq!(record.module(), Some("core"));
        assert_eq!(record.path(), Some(root.join("layout/page.html").as_path()));
    }

    #[test]
    fn test_leading_slash_is_ignored() {
        let (temp, mut resolver) = setup();
        let root = temp.path().join("core");
        std::fs::create_dir_all(&root).unwrap();
        std::fs::write(root.join("page.html"), b"<html>").unwrap();
        resolver.add_to_search_path("core", &root, 1).unwrap();

        assert_eq!(resolver.resolve("/page.html"), Some(root.join("page.html")));
    }

    #[test]
    fn test_empty_search_path_is_not_found() {
        let (_temp, mut resolver) = setup();
        assert_eq!(resolver.resolve("page.html"), None);
        assert_eq!(resolver.stats().misses, 1);
    }

    #[test]
    fn test_without_cache_every_call_searches() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("core");
        std::fs::create_dir_all(&root).unwrap();
        std::fs::write(root.join("page.html"), b"<html>").unwrap();

        let mut resolver = FlatResolver::new("template", Arc::new(OsFileSystem), Logger::silent());
        resolver.add_to_search_path("core", &root, 1).unwrap();
        resolver.resolve("page.html");
        resolver.resolve("page.html");

        assert_eq!(resolver.stats().scans, 2);
        assert_eq!(resolver.stats().hits, 0);
    }

    #[test]
    fn test_clear_search_path_forgets_modules() {
        let (temp, mut resolver) = setup();
        let root = temp.path().join("core");
        std::fs::create_dir_all(&root).unwrap();
        std::fs::write(root.join("page.html"), b"<html>").unwrap();
        resolver.add_to_search_path("core", &root, 1).unwrap();
        assert!(resolver.resolve("page.html").is_some());

        resolver.clear_search_path();

        assert!(!resolver.has_module("core"));
        assert_eq!(resolver.resolve("page.html"), None);
    }
}
