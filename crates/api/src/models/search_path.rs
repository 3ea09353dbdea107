use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::path::PathBuf;

/// One module root registered with a resolver.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SearchPathEntry {
    pub module: String,
    pub root: PathBuf,
    pub precedence: i64,
}

impl SearchPathEntry {
    pub fn new(module: impl Into<String>, root: impl Into<PathBuf>, precedence: i64) -> Self {
        Self {
            module: module.into(),
            root: root.into(),
            precedence,
        }
    }

    /// Search order: ascending precedence, ties broken by root path.
    pub fn search_order(&self, other: &Self) -> Ordering {
        self.precedence
            .cmp(&other.precedence)
            .then_with(|| self.root.as_os_str().cmp(other.root.as_os_str()))
    }
}
