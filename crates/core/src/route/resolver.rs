use super::scanner::RouteScanner;
use super::trie::RouteTrie;
use crate::logging::Logger;
use crate::resolver::namespace::{CacheNamespace, FINGERPRINT_KEY};
use crate::resolver::{ModuleResolver, ResolverStats, is_usable};
use crate::search_path::{Fingerprint, SearchPath};
use modroute_api::{Cache, ExtensionKey, FileSystem, Result, RouteMatch, SearchPathEntry};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

/// Cache key of a trie built for `suffix` and `index`.
fn routes_key(suffix: &str, index: &str) -> String {
    format!("@routes:{suffix}:{index}")
}

/// Resolves slash-separated requests to controller files.
///
/// The trie is built lazily from the search path and kept both in memory and
/// in the attached cache, each tagged with the fingerprint it was built under.
pub struct RouteResolver {
    namespace: CacheNamespace,
    search_path: SearchPath,
    scanner: RouteScanner,
    routes_key: String,
    fs: Arc<dyn FileSystem>,
    routes: Option<(Fingerprint, RouteTrie)>,
    authoritative: bool,
    stats: ResolverStats,
    log: Logger,
}

impl RouteResolver {
    /// Router over files ending in `suffix` (e.g. `.php`), with `index` as
    /// the directory index stem.
    pub fn new(name: &str, suffix: &str, index: &str, fs: Arc<dyn FileSystem>, log: Logger) -> Self {
        Self {
            namespace: CacheNamespace::new(name, None, log.clone()),
            search_path: SearchPath::new(fs.clone()),
            scanner: RouteScanner::new(fs.clone(), suffix, index, log.clone()),
            routes_key: routes_key(suffix, index),
            fs,
            routes: None,
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
        self.routes = None;
    }

    pub fn suffix(&self) -> &str {
        self.scanner.suffix()
    }

    /// The current trie, rebuilt if the search path changed since it was made.
    pub fn routes(&mut self) -> &RouteTrie {
        let fingerprint = self.search_path.fingerprint();
        let routes = match self.routes.take() {
            Some((built_under, trie)) if built_under == fingerprint => (built_under, trie),
            _ => {
                let trie = self.load_or_build(&fingerprint);
                (fingerprint, trie)
            }
        };
        &self.routes.insert(routes).1
    }

    fn load_or_build(&mut self, fingerprint: &Fingerprint) -> RouteTrie {
        self.namespace.validate(fingerprint);
        if let Some(trie) = self.namespace.load::<RouteTrie>(&self.routes_key) {
            self.log
                .in_scope(|| debug!("Loaded {} route bindings from cache", trie.binding_count()));
            return trie;
        }

        self.stats.scans += 1;
        let trie = self.scanner.build(self.search_path.sorted());
        self.namespace.store(&self.routes_key, &trie);
        self.namespace.store(FINGERPRINT_KEY, fingerprint);
        trie
    }

    /// Match `request` against the route trie.
    ///
    /// Without an `extension` hint the extension is taken from the last
    /// segment, from its final `.` on. When the matched file has vanished a
    /// non-authoritative router rebuilds once and retries; an authoritative
    /// one returns the binding as cached.
    pub fn resolve(&mut self, request: &str, extension: Option<&str>) -> Option<RouteMatch> {
        let segments: Vec<String> = request
            .split('/')
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect();
        let extension = match extension {
            Some(hint) if !hint.is_empty() => {
                ExtensionKey::from_extension(hint).as_extension().to_string()
            }
            _ => detect_extension(&segments),
        };

        let scans_before = self.stats.scans;
        let found = self.routes().resolve(segments.clone(), &extension);
        if self.stats.scans == scans_before {
            self.stats.hits += 1;
        } else {
            self.stats.misses += 1;
        }

        let found = found?;
        if self.authoritative || is_usable(self.fs.as_ref(), &found.path) {
            return Some(found);
        }

        self.log.in_scope(|| {
            info!(
                request,
                path = ?found.path,
                "Routed file is gone, rebuilding routes"
            )
        });
        self.clear_cache();
        self.stats.misses += 1;
        match self.routes().resolve(segments, &extension) {
            Some(retry) if is_usable(self.fs.as_ref(), &retry.path) => Some(retry),
            _ => None,
        }
    }
}

/// Extension of the last segment, from its final `.` on.
fn detect_extension(segments: &[String]) -> String {
    segments
        .last()
        .and_then(|segment| segment.rfind('.').map(|idx| segment[idx..].to_string()))
        .unwrap_or_default()
}

impl ModuleResolver for RouteResolver {
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
        self.routes = None;
        self.namespace.reset();
    }

    fn clear_cache(&mut self) {
        self.routes = None;
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

    #[test]
    fn test_detect_extension() {
        let segs = |s: &[&str]| s.iter().map(|x| x.to_string()).collect::<Vec<_>>();
        assert_eq!(detect_extension(&segs(&["foo", "bar.json"])), ".json");
        assert_eq!(detect_extension(&segs(&["foo", "bar"])), "");
        assert_eq!(detect_extension(&segs(&["a.b", "c.tar.gz"])), ".gz");
        assert_eq!(detect_extension(&[]), "");
    }
}
