use modroute_api::Cache;
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

/// Process-local cache; contents vanish with the process.
#[derive(Debug, Default)]
pub struct MemoryCache {
    namespaces: RwLock<HashMap<String, HashMap<String, Vec<u8>>>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys held in `namespace`.
    pub fn len(&self, namespace: &str) -> usize {
        let namespaces = self.namespaces.read().unwrap_or_else(PoisonError::into_inner);
        namespaces.get(namespace).map_or(0, HashMap::len)
    }
}

impl Cache for MemoryCache {
    fn get(&self, namespace: &str, key: &str) -> Option<Vec<u8>> {
        let namespaces = self.namespaces.read().unwrap_or_else(PoisonError::into_inner);
        namespaces.get(namespace)?.get(key).cloned()
    }

    fn set(&self, namespace: &str, key: &str, value: Vec<u8>) {
        let mut namespaces = self.namespaces.write().unwrap_or_else(PoisonError::into_inner);
        namespaces
            .entry(namespace.to_string())
            .or_default()
            .insert(key.to_string(), value);
    }

    fn has(&self, namespace: &str, key: &str) -> bool {
        let namespaces = self.namespaces.read().unwrap_or_else(PoisonError::into_inner);
        namespaces
            .get(namespace)
            .is_some_and(|entries| entries.contains_key(key))
    }

    fn delete(&self, namespace: &str, key: &str) {
        let mut namespaces = self.namespaces.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(entries) = namespaces.get_mut(namespace) {
            entries.remove(key);
        }
    }

    fn clear(&self, namespace: &str) {
        let mut namespaces = self.namespaces.write().unwrap_or_else(PoisonError::into_inner);
        namespaces.remove(namespace);
    }
}
