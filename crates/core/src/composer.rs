//! Module discovery from a Composer-style `vendor/<vendor>/<package>` tree.

use modroute_api::{ModuleSpec, PackageMetadata, ResolverError, Result};
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

/// Vendor directories that never hold modules.
const EXCLUDED_VENDORS: &[&str] = &["bin", "composer"];

pub const DEFAULT_VENDOR_PRECEDENCE: i64 = 100;
pub const DEFAULT_MAIN_MODULE: &str = "main";

/// Treats every `vendor_dir/<vendor>/<package>` directory as a module named
/// `<vendor>/<package>`, plus a main module at the project root (the parent
/// of `vendor_dir`).
#[derive(Debug, Clone)]
pub struct ComposerLayout {
    vendor_dir: PathBuf,
    vendor_precedence: i64,
    main: Option<(String, i64)>,
}

impl ComposerLayout {
    pub fn new(vendor_dir: impl Into<PathBuf>) -> Self {
        Self {
            vendor_dir: vendor_dir.into(),
            vendor_precedence: DEFAULT_VENDOR_PRECEDENCE,
            main: Some((DEFAULT_MAIN_MODULE.to_string(), 0)),
        }
    }

    pub fn with_vendor_precedence(mut self, precedence: i64) -> Self {
        self.vendor_precedence = precedence;
        self
    }

    pub fn with_main(mut self, name: impl Into<String>, precedence: i64) -> Self {
        self.main = Some((name.into(), precedence));
        self
    }

    pub fn without_main(mut self) -> Self {
        self.main = None;
        self
    }

    pub fn vendor_dir(&self) -> &Path {
        &self.vendor_dir
    }

    fn is_candidate(entry: &DirEntry) -> bool {
        if entry.depth() == 0 {
            return true;
        }
        let name = entry.file_name().to_string_lossy();
        if name.starts_with('.') || !entry.file_type().is_dir() {
            return false;
        }
        !(entry.depth() == 1 && EXCLUDED_VENDORS.iter().any(|vendor| *vendor == name))
    }
}

impl PackageMetadata for ComposerLayout {
    fn name(&self) -> &str {
        "composer"
    }

    fn modules(&self) -> Result<Vec<ModuleSpec>> {
        if !self.vendor_dir.is_dir() {
            return Err(ResolverError::InvalidPath {
                path: self.vendor_dir.clone(),
            });
        }

        let mut modules = Vec::new();
        if let Some((name, precedence)) = &self.main {
            let project_root = self
                .vendor_dir
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| PathBuf::from("."));
            modules.push(ModuleSpec::new(name.clone(), project_root, *precedence));
        }

        let packages = WalkDir::new(&self.vendor_dir)
            .max_depth(2)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(Self::is_candidate)
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.depth() == 2);

        for entry in packages {
            let Ok(relative) = entry.path().strip_prefix(&self.vendor_dir) else {
                continue;
            };
            let name = relative
                .iter()
                .map(|part| part.to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");
            modules.push(ModuleSpec::new(
                name,
                entry.path().to_path_buf(),
                self.vendor_precedence,
            ));
        }

        Ok(modules)
    }
}
