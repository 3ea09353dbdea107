use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A module as reported by package metadata: a name, a root directory and a
/// precedence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleSpec {
    pub name: String,
    pub path: PathBuf,
    pub precedence: i64,
}

impl ModuleSpec {
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>, precedence: i64) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            precedence,
        }
    }
}

/// Source of installed modules, such as a package manager's vendor tree.
pub trait PackageMetadata {
    /// A short name for log output.
    fn name(&self) -> &str;

    /// Discover every module this source knows about.
    fn modules(&self) -> crate::Result<Vec<ModuleSpec>>;
}
