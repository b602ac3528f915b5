// ── Query cache ──
//
// Typed re-expression of the per-view fetch/cache layer. Each read is
// registered under a key carrying every parameter that affects the
// result; identical keys share one cache entry and one in-flight
// request. Staleness windows and polling cadences live in one table
// (`QueryKey::policy`) instead of being scattered across call sites.

use std::any::Any;
use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use tokio::sync::Mutex;
use tracing::debug;

use crate::error::CoreError;
use crate::model::AlertStatus;

// ── Keys ────────────────────────────────────────────────────────────

/// Root resource tag. Mutations invalidate by prefix on this.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display)]
#[strum(serialize_all = "kebab-case")]
pub enum Resource {
    Profiles,
    Swipes,
    WifiLogs,
    LabBookings,
    LibraryCheckouts,
    Notes,
    CctvFrames,
    Resolution,
    Entities,
    Dashboard,
    Analytics,
    Security,
    Alerts,
    Health,
}

/// Cache key: one variant per read, carrying every parameter that
/// affects the response. Constructing a key with the wrong parameter
/// set is a compile error — the ad-hoc tuple keys this replaces made
/// that a silent cache collision instead.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum QueryKey {
    Profiles { limit: u32, offset: u32 },
    Profile { entity_id: String },
    ProfileSearch { query: String, field: String },
    Swipes { limit: u32, entity_id: Option<String> },
    WifiLogs { limit: u32, entity_id: Option<String> },
    LabBookings { entity_id: Option<String>, upcoming: bool },
    LibraryCheckouts { entity_id: Option<String> },
    Notes { entity_id: Option<String>, source: Option<String> },
    CctvFrames { location_id: Option<String>, limit: u32 },
    Resolve {
        card_id: Option<String>,
        device_hash: Option<String>,
        face_id: Option<String>,
    },
    EntityTimeline { entity_id: String, days: u32 },
    Entities { limit: u32, offset: u32 },
    EntitiesWithTimeline,
    Entity { entity_id: String },
    DashboardStats,
    ActivityHeatmap { days: u32 },
    WeeklyActivity,
    SourceDistribution,
    SecurityStats,
    InactiveEntities,
    EntityHistory { entity_id: String },
    Alerts { status: Option<AlertStatus>, limit: Option<u32> },
    Health,
}

impl QueryKey {
    /// Root resource this key lives under.
    pub fn resource(&self) -> Resource {
        match self {
            Self::Profiles { .. } | Self::Profile { .. } | Self::ProfileSearch { .. } => {
                Resource::Profiles
            }
            Self::Swipes { .. } => Resource::Swipes,
            Self::WifiLogs { .. } => Resource::WifiLogs,
            Self::LabBookings { .. } => Resource::LabBookings,
            Self::LibraryCheckouts { .. } => Resource::LibraryCheckouts,
            Self::Notes { .. } => Resource::Notes,
            Self::CctvFrames { .. } => Resource::CctvFrames,
            Self::Resolve { .. } | Self::EntityTimeline { .. } => Resource::Resolution,
            Self::Entities { .. } | Self::EntitiesWithTimeline | Self::Entity { .. } => {
                Resource::Entities
            }
            Self::DashboardStats => Resource::Dashboard,
            Self::ActivityHeatmap { .. } | Self::WeeklyActivity | Self::SourceDistribution => {
                Resource::Analytics
            }
            Self::SecurityStats | Self::InactiveEntities | Self::EntityHistory { .. } => {
                Resource::Security
            }
            Self::Alerts { .. } => Resource::Alerts,
            Self::Health => Resource::Health,
        }
    }

    /// The staleness/polling table. Windows follow resource volatility:
    /// profile data barely moves (5 min), alerts and security stats are
    /// near-real-time (30 s, polled), health is a liveness probe (10 s,
    /// polled every minute).
    pub fn policy(&self) -> CachePolicy {
        match self {
            Self::Profiles { .. } | Self::Profile { .. } => CachePolicy::window(Duration::from_secs(300)),
            Self::ProfileSearch { .. } => CachePolicy::window(Duration::from_secs(120)),
            Self::Swipes { .. } | Self::WifiLogs { .. } => CachePolicy::window(Duration::from_secs(60)),
            Self::LabBookings { .. } | Self::Notes { .. } | Self::EntityTimeline { .. } => {
                CachePolicy::window(Duration::from_secs(120))
            }
            Self::LibraryCheckouts { .. } | Self::Resolve { .. } | Self::ActivityHeatmap { .. } => {
                CachePolicy::window(Duration::from_secs(300))
            }
            Self::CctvFrames { .. } => CachePolicy::window(Duration::from_secs(30)),
            Self::Entities { .. } | Self::EntitiesWithTimeline => {
                CachePolicy::window(Duration::from_secs(60))
            }
            Self::Entity { .. } => {
                // Single-entity detail polls for near-real-time views.
                CachePolicy::polled(Duration::from_secs(60), Duration::from_secs(15))
            }
            Self::DashboardStats => {
                CachePolicy::polled(Duration::from_secs(60), Duration::from_secs(30))
            }
            Self::WeeklyActivity | Self::SourceDistribution => {
                CachePolicy::window(Duration::from_secs(60))
            }
            Self::SecurityStats | Self::Alerts { .. } => {
                CachePolicy::polled(Duration::from_secs(30), Duration::from_secs(30))
            }
            Self::InactiveEntities | Self::EntityHistory { .. } => {
                CachePolicy::window(Duration::from_secs(30))
            }
            Self::Health => CachePolicy::polled(Duration::from_secs(10), Duration::from_secs(60)),
        }
    }
}

/// Per-resource freshness configuration.
#[derive(Debug, Clone, Copy)]
pub struct CachePolicy {
    /// Cached data younger than this is served without a network call.
    pub stale_after: Duration,
    /// Unconditional background refetch cadence, when the resource is
    /// polled at all.
    pub refetch_interval: Option<Duration>,
}

impl CachePolicy {
    pub const fn window(stale_after: Duration) -> Self {
        Self {
            stale_after,
            refetch_interval: None,
        }
    }

    pub const fn polled(stale_after: Duration, interval: Duration) -> Self {
        Self {
            stale_after,
            refetch_interval: Some(interval),
        }
    }
}

// ── Entries & snapshots ─────────────────────────────────────────────

struct CacheEntry {
    value: Arc<dyn Any + Send + Sync>,
    fetched_at: Instant,
}

/// A cached read result handed to the caller.
#[derive(Debug)]
pub struct Snapshot<T> {
    pub value: Arc<T>,
    pub fetched_at: Instant,
    /// Set when the latest refetch failed and this snapshot is the
    /// last-known-good value (stale-while-error).
    pub stale_error: Option<campusflow_api::Error>,
}

impl<T> Snapshot<T> {
    pub fn age(&self) -> Duration {
        self.fetched_at.elapsed()
    }

    pub fn served_stale(&self) -> bool {
        self.stale_error.is_some()
    }
}

// ── Cache ───────────────────────────────────────────────────────────

/// Keyed read cache with request deduplication.
pub struct QueryCache {
    entries: DashMap<QueryKey, CacheEntry>,
    /// Per-key fetch lock: concurrent reads of the same key share one
    /// in-flight request instead of stampeding the backend.
    in_flight: DashMap<QueryKey, Arc<Mutex<()>>>,
}

impl QueryCache {
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
            in_flight: DashMap::new(),
        }
    }

    /// Read through the cache. Serves a value younger than the policy's
    /// staleness window without fetching; otherwise runs `fetch` under
    /// the key's in-flight lock. A failed refetch with a cached value
    /// returns that value with the error attached; a failed miss
    /// propagates the error.
    pub async fn fetch_through<T, F, Fut>(
        &self,
        key: QueryKey,
        policy: CachePolicy,
        fetch: F,
    ) -> Result<Snapshot<T>, CoreError>
    where
        T: Send + Sync + 'static,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, campusflow_api::Error>>,
    {
        if let Some(snapshot) = self.lookup::<T>(&key, Some(policy.stale_after)) {
            debug!(key = ?key, age = ?snapshot.age(), "cache hit");
            return Ok(snapshot);
        }

        let lock = self.lock_for(&key);
        let guard = lock.lock().await;

        // A concurrent caller may have filled the entry while we waited
        // on the lock — that request counts as ours (deduplication).
        if let Some(snapshot) = self.lookup::<T>(&key, Some(policy.stale_after)) {
            debug!(key = ?key, "cache filled while waiting, deduplicated");
            return Ok(snapshot);
        }

        let outcome = match fetch().await {
            Ok(value) => {
                let value = Arc::new(value);
                self.entries.insert(
                    key.clone(),
                    CacheEntry {
                        value: value.clone(),
                        fetched_at: Instant::now(),
                    },
                );
                Ok(Snapshot {
                    value,
                    fetched_at: Instant::now(),
                    stale_error: None,
                })
            }
            Err(err) => match self.lookup::<T>(&key, None) {
                Some(mut stale) => {
                    debug!(key = ?key, error = %err, "refetch failed, serving stale value");
                    stale.stale_error = Some(err);
                    Ok(stale)
                }
                None => Err(err.into()),
            },
        };

        // Waiters still hold their own `Arc` clone of the lock; dropping
        // the map entry here keeps the lock map from growing with every
        // key ever fetched.
        drop(guard);
        self.in_flight.remove(&key);
        outcome
    }

    /// Insert a value directly (used by the background polling tasks,
    /// which refetch unconditionally on their cadence).
    pub fn store<T: Send + Sync + 'static>(&self, key: QueryKey, value: T) {
        self.entries.insert(
            key,
            CacheEntry {
                value: Arc::new(value),
                fetched_at: Instant::now(),
            },
        );
    }

    /// Drop one entry.
    pub fn invalidate(&self, key: &QueryKey) {
        self.entries.remove(key);
    }

    /// Drop every entry under a root resource tag. Alert mutations call
    /// this so all alert-dependent views refetch.
    pub fn invalidate_prefix(&self, resource: Resource) {
        self.entries.retain(|key, _| key.resource() != resource);
        debug!(%resource, "invalidated cache prefix");
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    // ── Private helpers ─────────────────────────────────────────────

    /// Fetch a typed snapshot, optionally requiring it to be younger
    /// than `max_age`.
    fn lookup<T: Send + Sync + 'static>(
        &self,
        key: &QueryKey,
        max_age: Option<Duration>,
    ) -> Option<Snapshot<T>> {
        let entry = self.entries.get(key)?;
        if let Some(max_age) = max_age {
            if entry.fetched_at.elapsed() >= max_age {
                return None;
            }
        }
        let value = Arc::clone(&entry.value).downcast::<T>().ok()?;
        Some(Snapshot {
            value,
            fetched_at: entry.fetched_at,
            stale_error: None,
        })
    }

    fn lock_for(&self, key: &QueryKey) -> Arc<Mutex<()>> {
        self.in_flight
            .entry(key.clone())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }
}

impl Default for QueryCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn alerts_key(status: Option<AlertStatus>) -> QueryKey {
        QueryKey::Alerts {
            status,
            limit: None,
        }
    }

    const LONG: CachePolicy = CachePolicy::window(Duration::from_secs(3600));
    const IMMEDIATE: CachePolicy = CachePolicy::window(Duration::ZERO);

    #[tokio::test]
    async fn second_read_within_window_hits_cache() {
        let cache = QueryCache::new();
        let fetches = AtomicUsize::new(0);

        for _ in 0..3 {
            let snapshot = cache
                .fetch_through(alerts_key(None), LONG, || async {
                    fetches.fetch_add(1, Ordering::SeqCst);
                    Ok::<_, campusflow_api::Error>(42_u32)
                })
                .await
                .unwrap();
            assert_eq!(*snapshot.value, 42);
        }

        assert_eq!(fetches.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn stale_entry_triggers_refetch() {
        let cache = QueryCache::new();
        let fetches = AtomicUsize::new(0);

        for _ in 0..2 {
            cache
                .fetch_through(alerts_key(None), IMMEDIATE, || async {
                    fetches.fetch_add(1, Ordering::SeqCst);
                    Ok::<_, campusflow_api::Error>(7_u32)
                })
                .await
                .unwrap();
        }

        assert_eq!(fetches.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn distinct_parameter_tuples_never_share_entries() {
        let cache = QueryCache::new();

        cache
            .fetch_through(alerts_key(Some(AlertStatus::Active)), LONG, || async {
                Ok::<_, campusflow_api::Error>("active".to_owned())
            })
            .await
            .unwrap();
        let resolved = cache
            .fetch_through(alerts_key(Some(AlertStatus::Resolved)), LONG, || async {
                Ok::<_, campusflow_api::Error>("resolved".to_owned())
            })
            .await
            .unwrap();

        assert_eq!(cache.len(), 2);
        assert_eq!(*resolved.value, "resolved");
    }

    #[tokio::test]
    async fn failed_refetch_serves_last_known_good() {
        let cache = QueryCache::new();

        cache
            .fetch_through(QueryKey::SecurityStats, IMMEDIATE, || async {
                Ok::<_, campusflow_api::Error>(1_u32)
            })
            .await
            .unwrap();

        let snapshot = cache
            .fetch_through(QueryKey::SecurityStats, IMMEDIATE, || async {
                Err::<u32, _>(campusflow_api::Error::Api {
                    status: 503,
                    message: "HTTP 503".into(),
                })
            })
            .await
            .unwrap();

        assert_eq!(*snapshot.value, 1);
        assert!(snapshot.served_stale());
    }

    #[tokio::test]
    async fn failed_miss_propagates_error() {
        let cache = QueryCache::new();

        let result = cache
            .fetch_through(QueryKey::Health, LONG, || async {
                Err::<u32, _>(campusflow_api::Error::Api {
                    status: 500,
                    message: "HTTP 500".into(),
                })
            })
            .await;

        assert!(result.is_err());
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn concurrent_reads_share_one_fetch() {
        let cache = Arc::new(QueryCache::new());
        let fetches = Arc::new(AtomicUsize::new(0));

        let run = |cache: Arc<QueryCache>, fetches: Arc<AtomicUsize>| async move {
            cache
                .fetch_through(QueryKey::DashboardStats, LONG, || async move {
                    fetches.fetch_add(1, Ordering::SeqCst);
                    tokio::time::sleep(Duration::from_millis(50)).await;
                    Ok::<_, campusflow_api::Error>(99_u32)
                })
                .await
                .map(|s| *s.value)
        };

        let (a, b) = tokio::join!(
            run(Arc::clone(&cache), Arc::clone(&fetches)),
            run(Arc::clone(&cache), Arc::clone(&fetches)),
        );

        assert_eq!(a.unwrap(), 99);
        assert_eq!(b.unwrap(), 99);
        assert_eq!(fetches.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn prefix_invalidation_is_scoped_to_the_resource() {
        let cache = QueryCache::new();
        cache.store(alerts_key(None), 1_u32);
        cache.store(alerts_key(Some(AlertStatus::Active)), 2_u32);
        cache.store(QueryKey::Health, 3_u32);

        cache.invalidate_prefix(Resource::Alerts);

        assert_eq!(cache.len(), 1);
        let health: Snapshot<u32> = cache
            .fetch_through(QueryKey::Health, LONG, || async {
                Err(campusflow_api::Error::Api {
                    status: 500,
                    message: "should have been served from cache".into(),
                })
            })
            .await
            .unwrap();
        assert_eq!(*health.value, 3);
    }

    #[tokio::test]
    async fn invalidate_drops_only_that_entry() {
        let cache = QueryCache::new();
        cache.store(alerts_key(None), 1_u32);
        cache.store(QueryKey::Health, 2_u32);

        cache.invalidate(&alerts_key(None));

        assert_eq!(cache.len(), 1);
        let health: Snapshot<u32> = cache
            .fetch_through(QueryKey::Health, LONG, || async {
                Err(campusflow_api::Error::Api {
                    status: 500,
                    message: "should have been served from cache".into(),
                })
            })
            .await
            .unwrap();
        assert_eq!(*health.value, 2);
    }

    #[tokio::test]
    async fn fetch_locks_are_released_after_completion() {
        let cache = QueryCache::new();

        cache
            .fetch_through(QueryKey::Health, LONG, || async {
                Ok::<_, campusflow_api::Error>(1_u32)
            })
            .await
            .unwrap();
        let failed = cache
            .fetch_through(QueryKey::SecurityStats, LONG, || async {
                Err::<u32, _>(campusflow_api::Error::Api {
                    status: 500,
                    message: "HTTP 500".into(),
                })
            })
            .await;

        assert!(failed.is_err());
        // Both outcomes drop the per-key lock entry once the fetch is
        // done; only the value cache retains state.
        assert!(cache.in_flight.is_empty());
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn policy_table_polls_the_realtime_resources() {
        assert!(QueryKey::DashboardStats.policy().refetch_interval.is_some());
        assert!(QueryKey::SecurityStats.policy().refetch_interval.is_some());
        assert!(alerts_key(None).policy().refetch_interval.is_some());
        assert!(QueryKey::Health.policy().refetch_interval.is_some());
        assert!(
            QueryKey::Profiles {
                limit: 100,
                offset: 0
            }
            .policy()
            .refetch_interval
            .is_none()
        );
    }
}
