use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// What a resolver knows about one reference.
///
/// `NotFound` is a cached negative answer; `Unknown` means nothing has been
/// recorded yet. Authoritative resolvers trust the former and still search
/// for the latter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResolveRecord {
    Found { module: String, path: PathBuf },
    NotFound,
    Unknown,
}

impl ResolveRecord {
    pub fn is_found(&self) -> bool {
        matches!(self, ResolveRecord::Found { .. })
    }

    pub fn path(&self) -> Option<&Path> {
        match self {
            ResolveRecord::Found { path, .. } => Some(path),
            _ => None,
        }
    }

    pub fn module(&self) -> Option<&str> {
        match self {
            ResolveRecord::Found { module, .. } => Some(module),
            _ => None,
        }
    }

    pub fn into_path(self) -> Option<PathBuf> {
        match self {
            ResolveRecord::Found { path, .. } => Some(path),
            _ => None,
        }
    }
}
