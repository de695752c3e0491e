use std::borrow::Borrow;
use std::collections::HashMap;
use std::hash::Hash;
use std::time::{Duration, Instant};

use tracing::trace;

/// A map whose entries expire a fixed time after they were inserted.
///
/// The TTL is read when an entry is inserted, so changing it does not affect entries that are
///  already cached. Expired entries are removed lazily: `get` evicts the entry it looks at, and
///  every `put` sweeps the whole map first.
///
/// There is no internal locking - a cache is owned by a single resolver.
pub struct ExpiringCache<K, V> {
    ttl: Duration,
    entries: HashMap<K, CacheEntry<V>>,
}

struct CacheEntry<V> {
    value: V,
    /// `None` if the TTL reaches beyond what `Instant` can represent
    expires_at: Option<Instant>,
}

impl <V> CacheEntry<V> {
    fn is_expired(&self, now: Instant) -> bool {
        match self.expires_at {
            Some(expires_at) => now > expires_at,
            None => false,
        }
    }
}

impl <K: Eq + Hash, V: Clone> ExpiringCache<K, V> {
    pub fn new(ttl: Duration) -> ExpiringCache<K, V> {
        ExpiringCache {
            ttl,
            entries: HashMap::new(),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Applies to entries inserted after this call. A TTL of zero turns `put` into a no-op.
    pub fn set_ttl(&mut self, ttl: Duration) {
        self.ttl = ttl;
    }

    pub fn put(&mut self, key: K, value: V) {
        let now = Instant::now();
        self.sweep(now);

        if self.ttl.is_zero() {
            return;
        }

        self.entries.insert(key, CacheEntry {
            value,
            expires_at: now.checked_add(self.ttl),
        });
    }

    pub fn get<Q>(&mut self, key: &Q) -> Option<V>
        where K: Borrow<Q>, Q: Hash + Eq + ?Sized
    {
        let now = Instant::now();

        let expired = match self.entries.get(key) {
            None => return None,
            Some(entry) => entry.is_expired(now),
        };

        if expired {
            self.entries.remove(key);
            return None;
        }

        self.entries.get(key)
            .map(|entry| entry.value.clone())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn sweep(&mut self, now: Instant) {
        let before = self.entries.len();
        self.entries.retain(|_, entry| !entry.is_expired(now));

        let removed = before - self.entries.len();
        if removed > 0 {
            trace!("swept {} expired cache entries", removed);
        }
    }
}
