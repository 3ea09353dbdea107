//! Hierarchical request routing.
//!
//! # Data Flow
//! ```text
//! Search path (sorted modules)
//!     → scanner.rs (ordered directory listing per module)
//!     → trie.rs (segments → RouteNode, first binding per slot wins)
//!     → resolver.rs (cache, fingerprint check, stale-file retry)
//!
//! Request "/foo/bar.json"
//!     → segments ["foo", "bar.json"], extension ".json"
//!     → deepest matching node, binding chosen by extension
//!     → RouteMatch { path, module, route, ext, depth, remainder }
//! ```

pub mod resolver;
pub mod scanner;
pub mod trie;

pub use resolver::RouteResolver;
pub use scanner::RouteScanner;
pub use trie::{AppBinding, RouteNode, RouteTrie};

/// File stem that binds to its own directory's node.
pub const DEFAULT_INDEX: &str = "index";
