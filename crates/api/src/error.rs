use std::path::PathBuf;

/// Configuration errors raised by search paths, resolvers and the registry.
///
/// A reference that matches no file is not an error; resolvers report it as
/// an absent result.
#[derive(Debug, thiserror::Error)]
pub enum ResolverError {
    #[error("Path not found or not readable: {}", path.display())]
    PathNotFound { path: PathBuf },
    #[error("Unknown module: {module}")]
    UnknownModule { module: String },
    #[error("Resolver type already registered: {name}")]
    DuplicateResolverType { name: String },
    #[error("Unknown resolver type: {name}")]
    UnknownResolverType { name: String },
    #[error("Invalid path: {}", path.display())]
    InvalidPath { path: PathBuf },
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ResolverError>;
