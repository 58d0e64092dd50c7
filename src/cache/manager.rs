// Response cache - memoizes upstream generateContent responses for the proxy
// Author: kelexine (https://github.com/kelexine)
//
// This cache is local to the proxy process. It is unrelated to Gemini's
// cachedContents resources, which live on the service and are managed
// through `gemini::CachedContentApi`.

use crate::cache::models::{CacheStats, CachedResponse};
use crate::config::ResponseCacheConfig;
use crate::metrics;
use lru::LruCache;
use parking_lot::Mutex;
use sha2::{Digest, Sha256};
use std::num::NonZeroUsize;
use std::time::{Duration, Instant};
use tracing::debug;

/// In-memory TTL cache keyed by a hash of the request body.
///
/// Expired entries are dropped lazily when looked up. When full, the least
/// recently used entry makes room for a new one.
pub struct ResponseCache {
    enabled: bool,
    ttl: Duration,
    entries: Mutex<LruCache<String, CachedResponse>>,
}

impl ResponseCache {
    pub fn new(config: &ResponseCacheConfig) -> Self {
        let capacity = NonZeroUsize::new(config.max_entries).unwrap_or(NonZeroUsize::MIN);
        Self {
            enabled: config.enabled,
            ttl: Duration::from_secs(config.ttl_seconds),
            entries: Mutex::new(LruCache::new(capacity)),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// SHA256 cache key of a JSON request body.
    ///
    /// Object keys serialize in sorted order, so requests that differ only
    /// in key order share a key.
    pub fn key_for(request: &serde_json::Value) -> String {
        let mut hasher = Sha256::new();
        hasher.update(request.to_string().as_bytes());
        hex::encode(hasher.finalize())
    }

    /// Look up a live response, dropping it if it has expired.
    pub fn get(&self, key: &str) -> Option<String> {
        if !self.enabled {
            return None;
        }

        let now = Instant::now();
        let mut entries = self.entries.lock();
        let lookup = entries
            .get(key)
            .map(|entry| (!entry.is_expired_at(now)).then(|| entry.body.clone()));

        match lookup {
            Some(Some(body)) => {
                debug!("Response cache hit: {}", key.get(..16).unwrap_or(key));
                metrics::record_response_cache_hit();
                Some(body)
            }
            Some(None) => {
                debug!("Response cache entry expired: {}", key.get(..16).unwrap_or(key));
                entries.pop(key);
                metrics::update_response_cache_entries(entries.len());
                metrics::record_response_cache_miss();
                None
            }
            None => {
                metrics::record_response_cache_miss();
                None
            }
        }
    }

    /// Store a response with the configured TTL.
    pub fn put(&self, key: String, body: String) {
        self.put_with_ttl(key, body, self.ttl);
    }

    pub fn put_with_ttl(&self, key: String, body: String, ttl: Duration) {
        if !self.enabled {
            return;
        }

        let mut entries = self.entries.lock();
        entries.put(
            key,
            CachedResponse {
                body,
                expires_at: Instant::now().checked_add(ttl),
            },
        );
        metrics::record_response_cache_store();
        metrics::update_response_cache_entries(entries.len());
    }

    /// Clear all cached entries
    pub fn clear(&self) {
        let mut entries = self.entries.lock();
        entries.clear();
        metrics::record_response_cache_clear();
        metrics::update_response_cache_entries(0);
        debug!("Response cache cleared");
    }

    pub fn stats(&self) -> CacheStats {
        let now = Instant::now();
        let entries = self.entries.lock();
        let expired = entries
            .iter()
            .filter(|(_, entry)| entry.is_expired_at(now))
            .count();

        CacheStats {
            total: entries.len(),
            active: entries.len() - expired,
            expired,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn cache_with(max_entries: usize) -> ResponseCache {
        ResponseCache::new(&ResponseCacheConfig {
            enabled: true,
            ttl_seconds: 3600,
            max_entries,
        })
    }

    #[test]
    fn test_cache_key_generation() {
        let a = json!({"contents": [{"parts": [{"text": "Hello"}]}], "generationConfig": {"temperature": 0.7}});
        let b = json!({"generationConfig": {"temperature": 0.7}, "contents": [{"parts": [{"text": "Hello"}]}]});
        let c = json!({"contents": [{"parts": [{"text": "Hello!"}]}]});

        assert_eq!(ResponseCache::key_for(&a), ResponseCache::key_for(&b));
        assert_ne!(ResponseCache::key_for(&a), ResponseCache::key_for(&c));
        assert_eq!(ResponseCache::key_for(&a).len(), 64);
    }

    #[test]
    fn test_expired_entries_are_dropped_on_read() {
        let cache = cache_with(10);
        cache.put_with_ttl("stale".to_string(), "old".to_string(), Duration::ZERO);
        cache.put("fresh".to_string(), "new".to_string());

        assert_eq!(
            cache.stats(),
            CacheStats {
                total: 2,
                active: 1,
                expired: 1
            }
        );

        assert_eq!(cache.get("stale"), None);
        assert_eq!(cache.get("fresh").as_deref(), Some("new"));
        assert_eq!(cache.stats().total, 1);
    }

    #[test]
    fn test_least_recently_used_entry_is_evicted() {
        let cache = cache_with(2);
        cache.put("a".to_string(), "1".to_string());
        cache.put("b".to_string(), "2".to_string());
        assert!(cache.get("a").is_some());
        cache.put("c".to_string(), "3".to_string());

        assert!(cache.get("b").is_none());
        assert!(cache.get("a").is_some());
        assert!(cache.get("c").is_some());
    }

    #[test]
    fn test_huge_ttl_never_expires() {
        let cache = ResponseCache::new(&ResponseCacheConfig {
            enabled: true,
            ttl_seconds: u64::MAX,
            max_entries: 10,
        });
        cache.put("k".to_string(), "v".to_string());

        assert_eq!(cache.get("k").as_deref(), Some("v"));
        assert_eq!(cache.stats().expired, 0);
    }

    #[test]
    fn test_disabled_cache_stores_nothing() {
        let cache = ResponseCache::new(&ResponseCacheConfig {
            enabled: false,
            ..Default::default()
        });
        cache.put("k".to_string(), "v".to_string());

        assert!(cache.get("k").is_none());
        assert_eq!(cache.stats(), CacheStats::default());
    }
}
