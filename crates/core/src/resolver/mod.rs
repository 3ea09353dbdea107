//! Resolvers that answer "which file backs this reference".
//!
//! Two strategies share the same plumbing: a [`SearchPath`](crate::search_path::SearchPath)
//! of module roots and a cache namespace guarded by a search-path
//! fingerprint.
//!
//! - [`FlatResolver`] joins a single name onto each module root in turn.
//! - [`RouteResolver`](crate::route::RouteResolver) walks a trie built from
//!   directory scans.

pub mod flat;
pub mod namespace;

pub use flat::FlatResolver;
pub use namespace::CacheNamespace;

use modroute_api::{FileSystem, Result, SearchPathEntry};
use std::path::Path;

/// Lookup counters for one resolver.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolverStats {
    /// Lookups answered from cached state.
    pub hits: u64,
    /// Lookups that had to consult the filesystem.
    pub misses: u64,
    /// Search-path walks (flat) or trie builds (routes).
    pub scans: u64,
}

/// Search-path management shared by every resolver kind.
pub trait ModuleResolver {
    /// Resolver name, also its cache namespace.
    fn name(&self) -> &str;

    fn add_to_search_path(&mut self, module: &str, root: &Path, precedence: i64) -> Result<()>;

    /// Entries in search order.
    fn search_path(&mut self) -> Vec<SearchPathEntry>;

    fn has_module(&self, module: &str) -> bool;

    fn set_precedence(&mut self, module: &str, precedence: i64) -> Result<()>;

    fn precedence(&self, module: &str) -> Result<i64>;

    /// Forget every module and everything cached for them.
    fn clear_search_path(&mut self);

    /// Forget cached answers, keeping the search path.
    fn clear_cache(&mut self);

    fn set_authoritative(&mut self, authoritative: bool);

    fn is_authoritative(&self) -> bool;

    fn stats(&self) -> ResolverStats;
}

/// A candidate counts only if it is still there and can be opened.
pub(crate) fn is_usable(fs: &dyn FileSystem, path: &Path) -> bool {
    fs.exists(path) && fs.is_readable(path)
}
