//! Time-boxed in-process cache for category reads.
//!
//! Categories change rarely but are read on nearly every page, so reads are
//! fronted by this cache: one snapshot of the full category list plus a
//! bounded keyed map for id/slug lookups. Entries are fresh for the
//! configured TTL. Any category write clears everything unconditionally;
//! there is no partial invalidation.
//!
//! The snapshot is retained past its TTL (outside the moka cache, which
//! would evict it) so a fetch failure can fall back to stale data,
//! preferring availability over freshness.
//!
//! The clock is injected so freshness is testable without sleeping.

use std::sync::Arc;
use std::time::{Duration, Instant};

use moka::future::Cache;
use tokio::sync::RwLock;

use crate::models::Category;

/// Default freshness window.
pub const DEFAULT_TTL: Duration = Duration::from_secs(300);

/// Default bound on distinct id/slug lookup keys held.
pub const DEFAULT_CAPACITY: u64 = 1000;

/// A monotonic clock, injectable for tests.
pub trait Clock: Send + Sync + 'static {
    fn now(&self) -> Instant;
}

/// The real clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

#[derive(Debug, Clone)]
struct Snapshot {
    fetched_at: Instant,
    categories: Vec<Category>,
}

#[derive(Debug, Clone)]
struct Entry {
    fetched_at: Instant,
    category: Category,
}

/// Explicit cache service for category reads.
///
/// Shared across handlers via `Arc` inside the catalog service; all
/// mutation goes through async-aware synchronization rather than global
/// state.
pub struct CategoryCache {
    ttl: Duration,
    clock: Arc<dyn Clock>,
    snapshot: RwLock<Option<Snapshot>>,
    by_key: Cache<String, Entry>,
}

impl CategoryCache {
    /// Create a cache with the given freshness window and keyed capacity.
    #[must_use]
    pub fn new(ttl: Duration, capacity: u64, clock: Arc<dyn Clock>) -> Self {
        // moka's own TTL is a backstop for memory; freshness decisions use
        // the injected clock so they stay deterministic under test.
        let by_key = Cache::builder()
            .max_capacity(capacity)
            .time_to_live(ttl.max(Duration::from_secs(1)))
            .build();

        Self {
            ttl,
            clock,
            snapshot: RwLock::new(None),
            by_key,
        }
    }

    fn is_fresh(&self, fetched_at: Instant) -> bool {
        self.clock.now().saturating_duration_since(fetched_at) < self.ttl
    }

    /// The full category list, if a fresh snapshot is held.
    pub async fn get_all(&self) -> Option<Vec<Category>> {
        let guard = self.snapshot.read().await;
        guard
            .as_ref()
            .filter(|snap| self.is_fresh(snap.fetched_at))
            .map(|snap| snap.categories.clone())
    }

    /// The last snapshot regardless of freshness. Used as the fallback when
    /// a refetch fails.
    pub async fn get_all_stale(&self) -> Option<Vec<Category>> {
        let guard = self.snapshot.read().await;
        guard.as_ref().map(|snap| snap.categories.clone())
    }

    /// Store a freshly fetched category list.
    pub async fn put_all(&self, categories: Vec<Category>) {
        let mut guard = self.snapshot.write().await;
        *guard = Some(Snapshot {
            fetched_at: self.clock.now(),
            categories,
        });
    }

    /// A single category by lookup key (id or slug), if fresh.
    pub async fn get(&self, key: &str) -> Option<Category> {
        self.by_key
            .get(key)
            .await
            .filter(|entry| self.is_fresh(entry.fetched_at))
            .map(|entry| entry.category)
    }

    /// Store a single category under a lookup key.
    pub async fn put(&self, key: String, category: Category) {
        self.by_key
            .insert(
                key,
                Entry {
                    fetched_at: self.clock.now(),
                    category,
                },
            )
            .await;
    }

    /// Drop everything: the snapshot and every keyed entry.
    ///
    /// Called on any category write. Clearing beats fine-grained
    /// invalidation here because writes are rare and the hierarchy means a
    /// single edit can change several derived views.
    pub async fn clear(&self) {
        {
            let mut guard = self.snapshot.write().await;
            *guard = None;
        }
        self.by_key.invalidate_all();
    }
}

impl std::fmt::Debug for CategoryCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CategoryCache")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Mutex;

    use bramble_core::CategoryId;

    use super::*;

    /// A clock that only moves when told to.
    struct ManualClock {
        start: Instant,
        offset: Mutex<Duration>,
    }

    impl ManualClock {
        fn new() -> Self {
            Self {
                start: Instant::now(),
                offset: Mutex::new(Duration::ZERO),
            }
        }

        fn advance(&self, by: Duration) {
            *self.offset.lock().unwrap() += by;
        }
    }

    impl Clock for ManualClock {
        fn now(&self) -> Instant {
            self.start + *self.offset.lock().unwrap()
        }
    }

    fn category(id: i32, name: &str) -> Category {
        Category {
            id: CategoryId::new(id),
            name: name.to_owned(),
            ..Category::default()
        }
    }

    fn cache_with_clock() -> (CategoryCache, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new());
        let cache = CategoryCache::new(DEFAULT_TTL, DEFAULT_CAPACITY, clock.clone());
        (cache, clock)
    }

    #[tokio::test]
    async fn test_snapshot_fresh_within_ttl() {
        let (cache, clock) = cache_with_clock();
        cache.put_all(vec![category(1, "Kitchen")]).await;

        clock.advance(Duration::from_secs(299));
        let cats = cache.get_all().await.unwrap();
        assert_eq!(cats.len(), 1);
        assert_eq!(cats[0].name, "Kitchen");
    }

    #[tokio::test]
    async fn test_snapshot_expires_after_ttl() {
        let (cache, clock) = cache_with_clock();
        cache.put_all(vec![category(1, "Kitchen")]).await;

        clock.advance(Duration::from_secs(300));
        assert!(cache.get_all().await.is_none());
        // but the stale copy is still reachable for failure fallback
        assert!(cache.get_all_stale().await.is_some());
    }

    #[tokio::test]
    async fn test_clear_drops_snapshot_and_keys() {
        let (cache, _clock) = cache_with_clock();
        cache.put_all(vec![category(1, "Kitchen")]).await;
        cache.put("slug:kitchen".into(), category(1, "Kitchen")).await;

        cache.clear().await;

        assert!(cache.get_all().await.is_none());
        assert!(cache.get_all_stale().await.is_none());
        assert!(cache.get("slug:kitchen").await.is_none());
    }

    #[tokio::test]
    async fn test_keyed_entry_freshness() {
        let (cache, clock) = cache_with_clock();
        cache.put("id:1".into(), category(1, "Kitchen")).await;

        assert!(cache.get("id:1").await.is_some());
        clock.advance(Duration::from_secs(301));
        assert!(cache.get("id:1").await.is_none());
    }

    #[tokio::test]
    async fn test_refreshed_snapshot_resets_window() {
        let (cache, clock) = cache_with_clock();
        cache.put_all(vec![category(1, "Kitchen")]).await;
        clock.advance(Duration::from_secs(200));
        cache.put_all(vec![category(1, "Kitchen"), category(2, "Bath")]).await;
        clock.advance(Duration::from_secs(200));

        // 400s since first put, 200s since refresh: still fresh
        assert_eq!(cache.get_all().await.unwrap().len(), 2);
    }
}
