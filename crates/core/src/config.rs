//! Registry configuration, loaded from JSON.
//!
//! ```json
//! {
//!   "authoritative": false,
//!   "cache": { "kind": "file", "dir": ".cache/modroute" },
//!   "resolvers": [
//!     { "name": "template", "sub_path": "templates", "kind": "flat" },
//!     { "name": "router", "sub_path": "app", "kind": "routes", "suffix": ".php" }
//!   ],
//!   "modules": [ { "name": "site", "path": ".", "precedence": 0 } ],
//!   "composer": { "vendor_dir": "vendor", "vendor_precedence": 100 }
//! }
//! ```
//!
//! Relative paths are taken from the config file's directory.

use crate::composer::{ComposerLayout, DEFAULT_MAIN_MODULE, DEFAULT_VENDOR_PRECEDENCE};
use crate::route::DEFAULT_INDEX;
use modroute_api::{ModuleSpec, ResolverError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const AUTHORITATIVE_ENV: &str = "MODROUTE_AUTHORITATIVE";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryConfig {
    #[serde(default)]
    pub authoritative: bool,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub resolvers: Vec<ResolverConfig>,
    #[serde(default)]
    pub modules: Vec<ModuleSpec>,
    #[serde(default)]
    pub composer: Option<ComposerConfig>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CacheConfig {
    #[serde(rename = "none")]
    Disabled,
    #[default]
    Memory,
    File {
        dir: PathBuf,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolverConfig {
    pub name: String,
    pub sub_path: PathBuf,
    #[serde(flatten)]
    pub kind: ResolverKind,
}

/// Which resolution strategy a resolver type uses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ResolverKind {
    /// Join the reference onto each module root.
    Flat,
    /// Route requests through a trie of files ending in `suffix`.
    Routes {
        suffix: String,
        #[serde(default = "default_index")]
        index: String,
    },
}

impl ResolverKind {
    pub fn routes(suffix: &str) -> Self {
        ResolverKind::Routes {
            suffix: suffix.to_string(),
            index: default_index(),
        }
    }
}

fn default_index() -> String {
    DEFAULT_INDEX.to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComposerConfig {
    pub vendor_dir: PathBuf,
    #[serde(default = "default_vendor_precedence")]
    pub vendor_precedence: i64,
    #[serde(default = "default_main")]
    pub main: Option<MainModuleConfig>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MainModuleConfig {
    pub name: String,
    #[serde(default)]
    pub precedence: i64,
}

fn default_vendor_precedence() -> i64 {
    DEFAULT_VENDOR_PRECEDENCE
}

fn default_main() -> Option<MainModuleConfig> {
    Some(MainModuleConfig {
        name: DEFAULT_MAIN_MODULE.to_string(),
        precedence: 0,
    })
}

impl ComposerConfig {
    pub fn layout(&self) -> ComposerLayout {
        let layout =
            ComposerLayout::new(&self.vendor_dir).with_vendor_precedence(self.vendor_precedence);
        match &self.main {
            Some(main) => layout.with_main(&main.name, main.precedence),
            None => layout.without_main(),
        }
    }
}

impl RegistryConfig {
    /// Read a config file, resolve its relative paths and apply environment
    /// overrides.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let mut config = Self::parse(&content)
            .map_err(|e| ResolverError::Config(format!("{}: {}", path.display(), e)))?;
        let base = path.parent().unwrap_or_else(|| Path::new("."));
        config.resolve_paths(base);
        config.apply_env()?;
        Ok(config)
    }

    pub fn parse(content: &str) -> std::result::Result<Self, serde_json::Error> {
        serde_json::from_str(content)
    }

    /// Anchor relative module, cache and vendor paths at `base`.
    pub fn resolve_paths(&mut self, base: &Path) {
        let anchor = |path: &mut PathBuf| {
            if path.is_relative() {
                *path = base.join(&*path);
            }
        };
        for module in &mut self.modules {
            anchor(&mut module.path);
        }
        if let CacheConfig::File { dir } = &mut self.cache {
            anchor(dir);
        }
        if let Some(composer) = &mut self.composer {
            anchor(&mut composer.vendor_dir);
        }
    }

    pub fn apply_env(&mut self) -> Result<()> {
        match std::env::var(AUTHORITATIVE_ENV) {
            Ok(value) => self.apply_authoritative_override(&value),
            Err(_) => Ok(()),
        }
    }

    pub fn apply_authoritative_override(&mut self, value: &str) -> Result<()> {
        self.authoritative = match value.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => true,
            "0" | "false" | "no" | "off" => false,
            other => {
                return Err(ResolverError::Config(format!(
                    "{AUTHORITATIVE_ENV}: expected a boolean, got {other:?}"
                )));
            }
        };
        Ok(())
    }
}
