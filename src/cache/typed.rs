//! Typed cache wrapper around Moka.

use std::hash::Hash;
use std::sync::Arc;

use moka::Expiry;
use moka::sync::{Cache, CacheBuilder};

use super::CacheConfig;

/// Named, bounded Moka cache.
///
/// Clones share the same entries. Entries expire by TTL/TTI, or per entry
/// when built with [`TypedCache::with_expiry`].
pub struct TypedCache<K, V>
where
    K: Hash + Eq + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    inner: Arc<Cache<K, V>>,
    name: Arc<str>,
}

// Shares the inner cache; no K: Clone / V: Clone needed
impl<K, V> Clone for TypedCache<K, V>
where
    K: Hash + Eq + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            name: Arc::clone(&self.name),
        }
    }
}

impl<K, V> TypedCache<K, V>
where
    K: Hash + Eq + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    /// Create a new typed cache with the given name and config.
    pub fn new(name: impl Into<Arc<str>>, config: CacheConfig) -> Self {
        Self::build(name, Self::builder(&config))
    }

    /// Create a cache whose entries each get their lifetime from `expiry`.
    pub fn with_expiry<X>(name: impl Into<Arc<str>>, config: CacheConfig, expiry: X) -> Self
    where
        X: Expiry<K, V> + Send + Sync + 'static,
    {
        Self::build(name, Self::builder(&config).expire_after(expiry))
    }

    fn builder(config: &CacheConfig) -> CacheBuilder<K, V, Cache<K, V>> {
        let mut builder = Cache::builder();

        if let Some(max_capacity) = config.max_capacity {
            builder = builder.max_capacity(max_capacity);
        }

        if let Some(ttl) = config.ttl {
            builder = builder.time_to_live(ttl);
        }

        if let Some(tti) = config.tti {
            builder = builder.time_to_idle(tti);
        }

        builder
    }

    fn build(name: impl Into<Arc<str>>, builder: CacheBuilder<K, V, Cache<K, V>>) -> Self {
        Self {
            inner: Arc::new(builder.build()),
            name: name.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn insert(&self, key: K, value: V) {
        self.inner.insert(key, value);
    }

    /// `None` when absent or expired.
    pub fn get(&self, key: &K) -> Option<V> {
        self.inner.get(key)
    }

    /// Remove a key from the cache.
    pub fn invalidate(&self, key: &K) {
        self.inner.invalidate(key);
    }

    /// Remove all entries from the cache.
    pub fn invalidate_all(&self) {
        self.inner.invalidate_all();
    }
}

impl<K, V> std::fmt::Debug for TypedCache<K, V>
where
    K: Hash + Eq + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypedCache")
            .field("name", &self.name)
            .field("entry_count", &self.inner.entry_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn test_insert_get_invalidate() {
        let cache: TypedCache<u64, String> = TypedCache::new("test", CacheConfig::default());
        cache.insert(1, "one".to_string());
        assert_eq!(cache.get(&1).as_deref(), Some("one"));

        cache.invalidate(&1);
        assert_eq!(cache.get(&1), None);
    }

    #[test]
    fn test_clones_share_entries() {
        let cache: TypedCache<u64, u64> = TypedCache::new("shared", CacheConfig::with_capacity(10));
        let other = cache.clone();
        cache.insert(7, 49);

        assert_eq!(other.get(&7), Some(49));
        assert_eq!(other.name(), "shared");

        other.invalidate_all();
        assert_eq!(cache.get(&7), None);
    }

    /// Lifetime stored in the value itself.
    struct ValueLifetime;

    impl Expiry<u64, Duration> for ValueLifetime {
        fn expire_after_create(
            &self,
            _key: &u64,
            lifetime: &Duration,
            _created_at: std::time::Instant,
        ) -> Option<Duration> {
            Some(*lifetime)
        }
    }

    #[test]
    fn test_per_entry_expiry() {
        let cache: TypedCache<u64, Duration> =
            TypedCache::with_expiry("lifetimes", CacheConfig::cooldowns(), ValueLifetime);
        cache.insert(1, Duration::from_secs(2 * 86_400));
        cache.insert(2, Duration::from_millis(1));

        std::thread::sleep(Duration::from_millis(50));

        assert_eq!(cache.get(&1), Some(Duration::from_secs(2 * 86_400)));
        assert_eq!(cache.get(&2), None);
    }
}
