//! Module-aware file resolution.
//!
//! Maps logical references (template names, asset names, request paths) to
//! files contributed by an ordered set of module directories, and caches the
//! answers against the search path that produced them.

pub mod cache;
pub mod composer;
pub mod config;
pub mod fs;
pub mod logging;
pub mod registry;
pub mod resolver;
pub mod route;
pub mod search_path;

pub use composer::ComposerLayout;
pub use config::{RegistryConfig, ResolverKind};
pub use fs::OsFileSystem;
pub use logging::Logger;
pub use modroute_api::{ResolverError, Result};
pub use registry::{Resolver, ResolverRegistry};
pub use resolver::{FlatResolver, ModuleResolver, ResolverStats};
pub use route::RouteResolver;
pub use search_path::{Fingerprint, SearchPath};
