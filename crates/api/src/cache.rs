/// Namespaced key-value store backing resolver caches.
///
/// Implementations must give read-your-writes consistency within a process
/// and last-writer-wins semantics per key. Values are opaque bytes; resolvers
/// own their encoding.
pub trait Cache: Send + Sync {
    /// Fetch the value stored under `key` in `namespace`.
    fn get(&self, namespace: &str, key: &str) -> Option<Vec<u8>>;

    /// Store `value` under `key`, replacing any previous value.
    fn set(&self, namespace: &str, key: &str, value: Vec<u8>);

    /// Whether `key` currently holds a value.
    fn has(&self, namespace: &str, key: &str) -> bool {
        self.get(namespace, key).is_some()
    }

    /// Remove a single key.
    fn delete(&self, namespace: &str, key: &str);

    /// Drop every key in `namespace`.
    fn clear(&self, namespace: &str);
}
