use crate::cache::codec;
use crate::logging::Logger;
use crate::search_path::Fingerprint;
use modroute_api::Cache;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tracing::{debug, warn};

pub const FINGERPRINT_KEY: &str = "@fingerprint";

/// A resolver's view of the shared cache: one namespace, typed values, and
/// fingerprint-based invalidation.
///
/// Without an attached cache every load misses and every store is dropped.
#[derive(Clone)]
pub struct CacheNamespace {
    name: String,
    cache: Option<Arc<dyn Cache>>,
    log: Logger,
}

impl CacheNamespace {
    pub fn new(name: impl Into<String>, cache: Option<Arc<dyn Cache>>, log: Logger) -> Self {
        Self {
            name: name.into(),
            cache,
            log,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_attached(&self) -> bool {
        self.cache.is_some()
    }

    pub fn attach(&mut self, cache: Option<Arc<dyn Cache>>) {
        self.cache = cache;
    }

    /// Wipe the namespace if it was populated under a different search path.
    ///
    /// Returns `true` when entries were discarded.
    pub fn validate(&self, current: &Fingerprint) -> bool {
        let Some(cache) = &self.cache else {
            return false;
        };
        let stored = self.load::<Fingerprint>(FINGERPRINT_KEY);
        if stored.as_ref() == Some(current) {
            return false;
        }
        self.log.in_scope(|| {
            debug!(
                namespace = %self.name,
                fingerprint = %format!("{:016x}", current.digest()),
                "Search path changed, invalidating cache namespace"
            )
        });
        cache.clear(&self.name);
        true
    }

    pub fn load<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let bytes = self.cache.as_ref()?.get(&self.name, key)?;
        match codec::decode(&bytes) {
            Ok(value) => Some(value),
            Err(e) => {
                self.log.in_scope(|| {
                    warn!(namespace = %self.name, key, "Ignoring unusable cache entry: {}", e)
                });
                None
            }
        }
    }

    pub fn store<T: Serialize>(&self, key: &str, value: &T) {
        let Some(cache) = &self.cache else {
            return;
        };
        match codec::encode(value) {
            Ok(bytes) => cache.set(&self.name, key, bytes),
            Err(e) => self.log.in_scope(|| {
                warn!(namespace = %self.name, key, "Failed to encode cache entry: {}", e)
            }),
        }
    }

    /// Store a value together with the fingerprint it was computed under.
    pub fn store_with_fingerprint<T: Serialize>(
        &self,
        key: &str,
        value: &T,
        fingerprint: &Fingerprint,
    ) {
        self.store(key, value);
        self.store(FINGERPRINT_KEY, fingerprint);
    }

    pub fn reset(&self) {
        if let Some(cache) = &self.cache {
            cache.clear(&self.name);
        }
    }
}
