use crate::stats::StatsQuery;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

type CacheKey = (String, StatsQuery);

/// In-memory TTL cache keyed by `(match_id, query)`.
/// Entries are shared as `Arc<V>` so hits never clone the payload.
pub struct TtlCache<V> {
    entries: RwLock<HashMap<CacheKey, (Arc<V>, Instant)>>,
    ttl: Duration,
}

impl<V> TtlCache<V> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    pub async fn get(&self, match_id: &str, query: &StatsQuery) -> Option<Arc<V>> {
        if self.ttl.is_zero() {
            return None;
        }
        let entries = self.entries.read().await;
        let (value, stored_at) = entries.get(&(match_id.to_string(), *query))?;
        (stored_at.elapsed() < self.ttl).then(|| Arc::clone(value))
    }

    pub async fn insert(&self, match_id: &str, query: StatsQuery, value: Arc<V>) {
        if self.ttl.is_zero() {
            return;
        }
        let mut entries = self.entries.write().await;
        // Drop expired entries while we hold the write lock
        let ttl = self.ttl;
        entries.retain(|_, (_, stored_at)| stored_at.elapsed() < ttl);
        entries.insert((match_id.to_string(), query), (value, Instant::now()));
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }
}
