use std::collections::HashMap;
use std::hash::Hash;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::time::Instant;

use crate::news::Article;

/// Both feeds keep results for 15 minutes.
pub const NEWS_CACHE_TTL: Duration = Duration::from_secs(15 * 60);

#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    pub value: V,
    pub fetched_at: Instant,
}

impl<V> CacheEntry<V> {
    /// An entry whose age has reached the TTL is stale.
    pub fn is_fresh(&self, ttl: Duration) -> bool {
        Instant::now().saturating_duration_since(self.fetched_at) < ttl
    }
}

/// Key -> (value, timestamp) store with a fixed time-to-live.
///
/// Stale entries are never removed, only overwritten by the next `put`.
#[derive(Debug)]
pub struct TimedCache<K, V> {
    ttl: Duration,
    entries: HashMap<K, CacheEntry<V>>,
}

impl<K: Eq + Hash, V> TimedCache<K, V> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: HashMap::new(),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Returns the stored value regardless of its age.
    pub fn get(&self, key: &K) -> Option<&V> {
        self.entries.get(key).map(|entry| &entry.value)
    }

    pub fn get_fresh(&self, key: &K) -> Option<&V> {
        self.entries
            .get(key)
            .filter(|entry| entry.is_fresh(self.ttl))
            .map(|entry| &entry.value)
    }

    pub fn put(&mut self, key: K, value: V) {
        self.entries.insert(
            key,
            CacheEntry {
                value,
                fetched_at: Instant::now(),
            },
        );
    }

    pub fn is_fresh(&self, key: &K) -> bool {
        self.entries
            .get(key)
            .is_some_and(|entry| entry.is_fresh(self.ttl))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// The response caches for one reader session.
///
/// Built once and shared as `Arc<SessionCache>` with every feed that needs it.
// TODO: cap the number of `filtered` keys; every distinct search term adds one.
#[derive(Debug)]
pub struct SessionCache {
    pub breaking: RwLock<TimedCache<(), Vec<Article>>>,
    pub filtered: RwLock<TimedCache<String, Vec<Article>>>,
}

impl SessionCache {
    pub fn new() -> Self {
        Self::with_ttl(NEWS_CACHE_TTL)
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            breaking: RwLock::new(TimedCache::new(ttl)),
            filtered: RwLock::new(TimedCache::new(ttl)),
        }
    }

    pub async fn fresh_breaking(&self) -> Option<Vec<Article>> {
        self.breaking.read().await.get_fresh(&()).cloned()
    }

    pub async fn store_breaking(&self, articles: Vec<Article>) {
        self.breaking.write().await.put((), articles);
    }

    pub async fn fresh_filtered(&self, key: &str) -> Option<Vec<Article>> {
        self.filtered.read().await.get_fresh(&key.to_string()).cloned()
    }

    pub async fn store_filtered(&self, key: String, articles: Vec<Article>) {
        self.filtered.write().await.put(key, articles);
    }
}

impl Default for SessionCache {
    fn default() -> Self {
        Self::new()
    }
}
