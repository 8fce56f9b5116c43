//! Search result cache
//!
//! Maps a lower-cased search query to the products that matched it. Entries
//! carry an expiry timestamp taken from the injected [`Clock`]; expired entries
//! are never returned and are dropped lazily on read or in bulk by
//! [`SearchCache::purge_expired`]. A cache with no background sweeper should
//! be built with [`TtlCache::purge_on_insert`] so abandoned keys still go away.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;

use crate::clock::{Clock, SystemClock};
use crate::data::Product;

/// Default lifetime of a cached search result (10 minutes)
pub const DEFAULT_SEARCH_TTL_SECS: u64 = 600;

/// Shared query → products cache
///
/// Writes to the same key are last-writer-wins. Values for one key are always
/// computed from the same catalog, so racing writers store equal results.
pub trait SearchCache: Send + Sync {
    /// Returns the cached products for `key` if present and not expired
    fn get(&self, key: &str) -> Option<Vec<Product>>;

    /// Stores `products` under `key`, replacing any previous entry
    fn insert(&self, key: String, products: Vec<Product>);

    /// Removes every expired entry, returning how many were removed
    fn purge_expired(&self) -> usize;

    /// Number of entries currently held, expired or not
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A cached search result with its expiry
#[derive(Debug, Clone)]
struct CacheEntry {
    products: Vec<Product>,
    expires_at: DateTime<Utc>,
}

impl CacheEntry {
    fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// In-memory [`SearchCache`] with a fixed time-to-live per entry
pub struct TtlCache {
    entries: DashMap<String, CacheEntry>,
    ttl: Duration,
    clock: Arc<dyn Clock>,
    purge_on_insert: bool,
}

impl TtlCache {
    /// Creates a cache using the system clock
    pub fn new(ttl: std::time::Duration) -> Self {
        Self::with_clock(ttl, Arc::new(SystemClock))
    }

    /// Creates a cache that reads time from `clock`
    ///
    /// A TTL too large for chrono saturates to the maximum representable span.
    pub fn with_clock(ttl: std::time::Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: DashMap::new(),
            ttl: Duration::from_std(ttl).unwrap_or(Duration::MAX),
            clock,
            purge_on_insert: false,
        }
    }

    /// Purge expired entries on every insert
    pub fn purge_on_insert(mut self, enabled: bool) -> Self {
        self.purge_on_insert = enabled;
        self
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }
}

impl Default for TtlCache {
    fn default() -> Self {
        Self::new(std::time::Duration::from_secs(DEFAULT_SEARCH_TTL_SECS))
    }
}

impl SearchCache for TtlCache {
    fn get(&self, key: &str) -> Option<Vec<Product>> {
        let now = self.clock.now();

        if let Some(entry) = self.entries.get(key) {
            if !entry.is_expired(now) {
                return Some(entry.products.clone());
            }
        }

        self.entries.remove_if(key, |_, entry| entry.is_expired(now));
        None
    }

    fn insert(&self, key: String, products: Vec<Product>) {
        let now = self.clock.now();
        if self.purge_on_insert {
            self.entries.retain(|_, entry| !entry.is_expired(now));
        }

        let entry = CacheEntry {
            products,
            expires_at: now.checked_add_signed(self.ttl).unwrap_or(DateTime::<Utc>::MAX_UTC),
        };

        self.entries.insert(key, entry);
    }

    fn purge_expired(&self) -> usize {
        let now = self.clock.now();
        let mut removed = 0;
        self.entries.retain(|_, entry| {
            let expired = entry.is_expired(now);
            if expired {
                removed += 1;
            }
            !expired
        });
        removed
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}
