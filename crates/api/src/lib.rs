pub mod cache;
pub mod error;
pub mod fs;
pub mod models;
pub mod package;

// Re-export commonly used types
pub use cache::Cache;
pub use error::{ResolverError, Result};
pub use fs::{FileSystem, FsEntry};
pub use models::*;
pub use package::{ModuleSpec, PackageMetadata};
