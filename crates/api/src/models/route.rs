use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Slot a route binding occupies on its node.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExtensionKey {
    /// Binding for a file without a secondary extension.
    Default,
    /// Binding for a literal extension such as `.json`.
    Literal(String),
}

impl ExtensionKey {
    /// Key for an extension string; empty means `Default`. A missing leading
    /// dot is added.
    pub fn from_extension(ext: &str) -> Self {
        if ext.is_empty() {
            ExtensionKey::Default
        } else if ext.starts_with('.') {
            ExtensionKey::Literal(ext.to_string())
        } else {
            ExtensionKey::Literal(format!(".{ext}"))
        }
    }

    pub fn as_extension(&self) -> &str {
        match self {
            ExtensionKey::Default => "",
            ExtensionKey::Literal(ext) => ext,
        }
    }
}

impl fmt::Display for ExtensionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExtensionKey::Default => write!(f, "default"),
            ExtensionKey::Literal(ext) => write!(f, "{ext}"),
        }
    }
}

/// Successful match of a hierarchical request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteMatch {
    pub path: PathBuf,
    pub module: String,
    /// Route prefix of the node that held the binding.
    pub route: String,
    /// Extension slot of the chosen binding; `None` when it was picked as a
    /// fallback and its extension does not answer the request.
    pub ext: Option<ExtensionKey>,
    pub depth: usize,
    /// Request segments left unmatched below the binding.
    pub remainder: Vec<String>,
}
