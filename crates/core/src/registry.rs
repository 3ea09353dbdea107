//! Named resolvers fed from one module list.
//!
//! Registering a module offers its `<root>/<sub_path>` to every resolver
//! type whose sub-path exists under that root. Precedence and trust policy
//! changes fan out the same way.

use crate::cache::{FileCache, MemoryCache};
use crate::composer::ComposerLayout;
use crate::config::{CacheConfig, RegistryConfig, ResolverKind};
use crate::logging::Logger;
use crate::resolver::{FlatResolver, ModuleResolver};
use crate::route::RouteResolver;
use indexmap::IndexMap;
use modroute_api::{
    Cache, FileSystem, ModuleSpec, PackageMetadata, ResolverError, Result, RouteMatch,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

/// A resolver owned by the registry.
pub enum Resolver {
    Flat(FlatResolver),
    Routes(RouteResolver),
}

impl Resolver {
    pub fn as_module_resolver(&self) -> &dyn ModuleResolver {
        match self {
            Resolver::Flat(r) => r,
            Resolver::Routes(r) => r,
        }
    }

    pub fn as_module_resolver_mut(&mut self) -> &mut dyn ModuleResolver {
        match self {
            Resolver::Flat(r) => r,
            Resolver::Routes(r) => r,
        }
    }

    pub fn as_flat_mut(&mut self) -> Option<&mut FlatResolver> {
        match self {
            Resolver::Flat(r) => Some(r),
            Resolver::Routes(_) => None,
        }
    }

    pub fn as_routes_mut(&mut self) -> Option<&mut RouteResolver> {
        match self {
            Resolver::Routes(r) => Some(r),
            Resolver::Flat(_) => None,
        }
    }

    fn set_cache(&mut self, cache: Option<Arc<dyn Cache>>) {
        match self {
            Resolver::Flat(r) => r.set_cache(cache),
            Resolver::Routes(r) => r.set_cache(cache),
        }
    }
}

struct ResolverSlot {
    sub_path: PathBuf,
    resolver: Resolver,
}

pub struct ResolverRegistry {
    resolvers: IndexMap<String, ResolverSlot>,
    modules: IndexMap<String, ModuleSpec>,
    fs: Arc<dyn FileSystem>,
    cache: Option<Arc<dyn Cache>>,
    authoritative: bool,
    log: Logger,
}

impl ResolverRegistry {
    pub fn new(fs: Arc<dyn FileSystem>, log: Logger) -> Self {
        Self {
            resolvers: IndexMap::new(),
            modules: IndexMap::new(),
            fs,
            cache: None,
            authoritative: false,
            log,
        }
    }

    /// Cache handed to every resolver created from now on.
    pub fn with_cache(mut self, cache: Arc<dyn Cache>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Build a registry from configuration: cache backend, resolver types,
    /// explicit modules, then Composer modules.
    pub fn from_config(
        config: &RegistryConfig,
        fs: Arc<dyn FileSystem>,
        log: Logger,
    ) -> Result<Self> {
        let cache: Option<Arc<dyn Cache>> = match &config.cache {
            CacheConfig::Disabled => None,
            CacheConfig::Memory => Some(Arc::new(MemoryCache::new())),
            CacheConfig::File { dir } => {
                Some(Arc::new(FileCache::new(dir.clone(), log.child("cache"))?))
            }
        };

        let mut registry = Self::new(fs, log);
        registry.cache = cache;
        registry.authoritative = config.authoritative;

        for resolver in &config.resolvers {
            registry.add_resolver_type(&resolver.name, &resolver.sub_path, resolver.kind.clone())?;
        }
        for module in &config.modules {
            registry.register_module(&module.name, &module.path, module.precedence)?;
        }
        if let Some(composer) = &config.composer {
            registry.register_from(&composer.layout())?;
        }
        Ok(registry)
    }

    /// Create a resolver for `name` that reads `<module root>/<sub_path>`.
    pub fn add_resolver_type(
        &mut self,
        name: &str,
        sub_path: impl AsRef<Path>,
        kind: ResolverKind,
    ) -> Result<&mut Resolver> {
        if self.resolvers.contains_key(name) {
            return Err(ResolverError::DuplicateResolverType {
                name: name.to_string(),
            });
        }

        let log = self.log.child(name);
        let mut resolver = match kind {
            ResolverKind::Flat => Resolver::Flat(FlatResolver::new(name, self.fs.clone(), log)),
            ResolverKind::Routes { suffix, index } => Resolver::Routes(RouteResolver::new(
                name,
                &suffix,
                &index,
                self.fs.clone(),
                log,
            )),
        };
        resolver.set_cache(self.cache.clone());
        resolver
            .as_module_resolver_mut()
            .set_authoritative(self.authoritative);

        self.log
            .in_scope(|| debug!(resolver = name, "Registered resolver type"));
        let slot = self
            .resolvers
            .entry(name.to_string())
            .or_insert(ResolverSlot {
                sub_path: sub_path.as_ref().to_path_buf(),
                resolver,
            });
        Ok(&mut slot.resolver)
    }

    pub fn get_resolver(&self, name: &str) -> Option<&Resolver> {
        self.resolvers.get(name).map(|slot| &slot.resolver)
    }

    pub fn get_resolver_mut(&mut self, name: &str) -> Option<&mut Resolver> {
        self.resolvers.get_mut(name).map(|slot| &mut slot.resolver)
    }

    /// Install a caller-built resolver, replacing any resolver of that name.
    pub fn set_resolver(&mut self, name: &str, sub_path: impl AsRef<Path>, resolver: Resolver) {
        self.resolvers.insert(
            name.to_string(),
            ResolverSlot {
                sub_path: sub_path.as_ref().to_path_buf(),
                resolver,
            },
        );
    }

    pub fn resolver_types(&self) -> impl Iterator<Item = &str> {
        self.resolvers.keys().map(String::as_str)
    }

    pub fn modules(&self) -> impl Iterator<Item = &ModuleSpec> {
        self.modules.values()
    }

    /// Offer a module to every resolver whose sub-path exists under `root`.
    ///
    /// Returns the resolver types that took it. The module is remembered only
    /// if at least one did.
    pub fn register_module(
        &mut self,
        name: &str,
        root: &Path,
        precedence: i64,
    ) -> Result<Vec<String>> {
        if !self.fs.is_dir(root) || !self.fs.is_readable(root) {
            return Err(ResolverError::PathNotFound {
                path: root.to_path_buf(),
            });
        }

        // Validate every sub-path before any resolver takes the module
        let usable: Vec<(usize, PathBuf)> = self
            .resolvers
            .values()
            .enumerate()
            .map(|(idx, slot)| (idx, root.join(&slot.sub_path)))
            .filter(|(_, path)| self.fs.is_dir(path) && self.fs.is_readable(path))
            .collect();

        let mut matched = Vec::new();
        for (idx, path) in usable {
            let Some((resolver_name, slot)) = self.resolvers.get_index_mut(idx) else {
                continue;
            };
            slot.resolver
                .as_module_resolver_mut()
                .add_to_search_path(name, &path, precedence)?;
            matched.push(resolver_name.clone());
        }

        if matched.is_empty() {
            self.log
                .in_scope(|| debug!(module = name, "Module provides no resolver sub-path"));
        } else {
            self.log.in_scope(|| {
                info!(
                    module = name,
                    precedence,
                    "Registered module for {}",
                    matched.join(", ")
                )
            });
            self.modules
                .insert(name.to_string(), ModuleSpec::new(name, root, precedence));
        }
        Ok(matched)
    }

    /// Register every module a metadata source reports.
    pub fn register_from(&mut self, source: &dyn PackageMetadata) -> Result<Vec<String>> {
        let mut registered = Vec::new();
        for module in source.modules()? {
            if !self
                .register_module(&module.name, &module.path, module.precedence)?
                .is_empty()
            {
                registered.push(module.name);
            }
        }
        self.log.in_scope(|| {
            info!(
                "Registered {} modules from {}",
                registered.len(),
                source.name()
            )
        });
        Ok(registered)
    }

    /// Register the main module and every package under `vendor_dir`.
    pub fn auto_configure_from_composer(&mut self, vendor_dir: &Path) -> Result<Vec<String>> {
        self.register_from(&ComposerLayout::new(vendor_dir))
    }

    /// Change a module's precedence in every resolver that knows it.
    ///
    /// Returns how many resolvers were updated.
    pub fn set_precedence(&mut self, module: &str, precedence: i64) -> Result<usize> {
        let mut updated = 0;
        for slot in self.resolvers.values_mut() {
            match slot
                .resolver
                .as_module_resolver_mut()
                .set_precedence(module, precedence)
            {
                Ok(()) => updated += 1,
                Err(ResolverError::UnknownModule { .. }) => continue,
                Err(e) => return Err(e),
            }
        }
        if let Some(spec) = self.modules.get_mut(module) {
            spec.precedence = precedence;
        }
        Ok(updated)
    }

    pub fn set_authoritative(&mut self, authoritative: bool) {
        self.authoritative = authoritative;
        for slot in self.resolvers.values_mut() {
            slot.resolver
                .as_module_resolver_mut()
                .set_authoritative(authoritative);
        }
    }

    pub fn is_authoritative(&self) -> bool {
        self.authoritative
    }

    pub fn clear_cache(&mut self) {
        for slot in self.resolvers.values_mut() {
            slot.resolver.as_module_resolver_mut().clear_cache();
        }
    }

    fn slot_mut(&mut self, name: &str) -> Result<&mut Resolver> {
        self.get_resolver_mut(name)
            .ok_or_else(|| ResolverError::UnknownResolverType {
                name: name.to_string(),
            })
    }

    /// Resolve `reference` with the resolver registered as `resolver_type`.
    ///
    /// Route resolvers answer with the matched file's path.
    pub fn resolve(&mut self, resolver_type: &str, reference: &str) -> Result<Option<PathBuf>> {
        Ok(match self.slot_mut(resolver_type)? {
            Resolver::Flat(r) => r.resolve(reference),
            Resolver::Routes(r) => r.resolve(reference, None).map(|m| m.path),
        })
    }

    /// Full route match from a route resolver.
    pub fn resolve_route(
        &mut self,
        resolver_type: &str,
        request: &str,
        extension: Option<&str>,
    ) -> Result<Option<RouteMatch>> {
        match self.slot_mut(resolver_type)? {
            Resolver::Routes(r) => Ok(r.resolve(request, extension)),
            Resolver::Flat(_) => Err(ResolverError::Config(format!(
                "resolver {resolver_type} does not route requests"
            ))),
        }
    }
}
