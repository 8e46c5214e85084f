use std::collections::HashMap;
use std::time::{Duration, Instant};

use serde_json::Value;
use sha2::{Digest, Sha256};
use tokio::sync::RwLock;

/// Derives the cache key for a request: a namespaced SHA-256 of the full
/// URL plus its serialized query string, so unrelated cached data can
/// never collide with ours.
pub(crate) fn cache_key(url: &str, query: &[(&str, &str)]) -> String {
    let mut raw = String::with_capacity(url.len() + 16);
    raw.push_str(url);
    raw.push('?');
    for (i, (k, v)) in query.iter().enumerate() {
        if i > 0 {
            raw.push('&');
        }
        raw.push_str(k);
        raw.push('=');
        raw.push_str(v);
    }
    let digest = Sha256::digest(raw.as_bytes());
    format!("mealdb:{}", hex::encode(digest))
}

struct Entry {
    expires_at: Instant,
    payload: Value,
}

/// In-memory TTL cache for deterministic upstream responses.
///
/// Concurrent misses on the same key may both fetch; writes are
/// last-writer-wins, which is fine because responses are idempotent.
pub(crate) struct ResponseCache {
    ttl: Duration,
    entries: RwLock<HashMap<String, Entry>>,
}

impl ResponseCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub async fn get(&self, key: &str) -> Option<Value> {
        let entries = self.entries.read().await;
        entries
            .get(key)
            .filter(|e| e.expires_at > Instant::now())
            .map(|e| e.payload.clone())
    }

    pub async fn put(&self, key: String, payload: Value) {
        let mut entries = self.entries.write().await;
        let now = Instant::now();
        entries.retain(|_, e| e.expires_at > now);
        entries.insert(
            key,
            Entry {
                expires_at: now + self.ttl,
                payload,
            },
        );
    }
}
