// ── Controller ──
//
// Facade over the typed API client. Every read goes through the query
// cache under its typed key; alert mutations write through to the
// backend and invalidate the alert cache prefix. `start()` spawns the
// background polling loops the dashboard views rely on; `shutdown()`
// cancels them.

use std::sync::Arc;
use std::time::Duration;

use secrecy::SecretString;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use campusflow_api::ApiClient;
use campusflow_api::types::{
    ActivityTimeline, CctvFrame, DashboardStats, EntityDetails, EntityResolution, Forecast,
    ForecastRequest, HealthStatus, LabBooking, LibraryCheckout, Note, Profile, SecurityStats, Swipe,
    WifiLog,
};

use crate::cache::{QueryCache, QueryKey, Resource, Snapshot};
use crate::convert;
use crate::error::CoreError;
use crate::model::{Alert, AlertFeed, AlertStatus, Entity, LocationMarker};
use crate::store::AlertStore;

// ── Configuration ───────────────────────────────────────────────────

/// What to do with the optimistic local edit when the backend rejects
/// an alert resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RollbackPolicy {
    /// Put the previous status back. The local view never disagrees
    /// with the backend for longer than one round-trip.
    #[default]
    Revert,
    /// Keep the local edit and surface the error; the next poll refresh
    /// reconciles.
    Keep,
}

/// Overrides for the polling cadences in the policy table. `None`
/// keeps the table value.
#[derive(Debug, Clone, Copy, Default)]
pub struct PollOverrides {
    pub alerts: Option<Duration>,
    pub dashboard: Option<Duration>,
    pub security: Option<Duration>,
    pub health: Option<Duration>,
}

#[derive(Debug, Clone)]
pub struct ControllerConfig {
    pub api_url: String,
    pub api_token: Option<SecretString>,
    pub rollback: RollbackPolicy,
    pub poll: PollOverrides,
}

impl ControllerConfig {
    pub fn new(api_url: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into(),
            api_token: None,
            rollback: RollbackPolicy::default(),
            poll: PollOverrides::default(),
        }
    }

    #[must_use]
    pub fn with_token(mut self, token: SecretString) -> Self {
        self.api_token = Some(token);
        self
    }

    #[must_use]
    pub fn with_rollback(mut self, rollback: RollbackPolicy) -> Self {
        self.rollback = rollback;
        self
    }

    #[must_use]
    pub fn with_poll(mut self, poll: PollOverrides) -> Self {
        self.poll = poll;
        self
    }
}

/// Identifier set for cross-source entity resolution. The backend
/// accepts any combination, but at least one must be present.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ResolveSelector {
    pub card_id: Option<String>,
    pub device_hash: Option<String>,
    pub face_id: Option<String>,
}

impl ResolveSelector {
    pub fn is_empty(&self) -> bool {
        self.card_id.is_none() && self.device_hash.is_none() && self.face_id.is_none()
    }
}

// ── Controller ──────────────────────────────────────────────────────

struct Inner {
    api: ApiClient,
    cache: QueryCache,
    alerts: AlertStore,
    rollback: RollbackPolicy,
    poll: PollOverrides,
    cancel: CancellationToken,
    tasks: std::sync::Mutex<Vec<JoinHandle<()>>>,
}

/// Cheaply cloneable handle; all clones share one cache, one alert
/// store, and one set of background tasks.
#[derive(Clone)]
pub struct Controller {
    inner: Arc<Inner>,
}

impl Controller {
    pub fn new(config: &ControllerConfig) -> Result<Self, CoreError> {
        let api = match &config.api_token {
            Some(token) => ApiClient::with_token(&config.api_url, token)?,
            None => ApiClient::new(&config.api_url)?,
        };
        Ok(Self::with_parts(api, config.rollback, config.poll))
    }

    /// Wrap an existing client (used by tests pointing at a mock
    /// server).
    pub fn from_client(api: ApiClient, rollback: RollbackPolicy) -> Self {
        Self::with_parts(api, rollback, PollOverrides::default())
    }

    fn with_parts(api: ApiClient, rollback: RollbackPolicy, poll: PollOverrides) -> Self {
        Self {
            inner: Arc::new(Inner {
                api,
                cache: QueryCache::new(),
                alerts: AlertStore::new(),
                rollback,
                poll,
                cancel: CancellationToken::new(),
                tasks: std::sync::Mutex::new(Vec::new()),
            }),
        }
    }

    pub fn api(&self) -> &ApiClient {
        &self.inner.api
    }

    pub fn cache(&self) -> &QueryCache {
        &self.inner.cache
    }

    /// The shared observable alert collection.
    pub fn alert_store(&self) -> &AlertStore {
        &self.inner.alerts
    }

    // ── Cached reads ────────────────────────────────────────────────

    async fn cached<T, F, Fut>(&self, key: QueryKey, fetch: F) -> Result<Snapshot<T>, CoreError>
    where
        T: Send + Sync + 'static,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, campusflow_api::Error>>,
    {
        let policy = key.policy();
        self.inner.cache.fetch_through(key, policy, fetch).await
    }

    pub async fn profiles(&self, limit: u32, offset: u32) -> Result<Snapshot<Vec<Profile>>, CoreError> {
        let api = self.inner.api.clone();
        self.cached(QueryKey::Profiles { limit, offset }, || async move {
            api.list_profiles(limit, offset).await
        })
        .await
    }

    pub async fn profile(&self, entity_id: &str) -> Result<Snapshot<Profile>, CoreError> {
        let api = self.inner.api.clone();
        let id = entity_id.to_owned();
        self.cached(
            QueryKey::Profile {
                entity_id: id.clone(),
            },
            || async move { api.get_profile(&id).await },
        )
        .await
    }

    /// Disabled until the query is non-empty: an empty search issues no
    /// network call.
    pub async fn search_profiles(
        &self,
        query: &str,
        field: &str,
    ) -> Result<Snapshot<Vec<Profile>>, CoreError> {
        if query.trim().is_empty() {
            return Err(CoreError::validation("query", "search query is empty"));
        }
        let api = self.inner.api.clone();
        let (query, field) = (query.to_owned(), field.to_owned());
        self.cached(
            QueryKey::ProfileSearch {
                query: query.clone(),
                field: field.clone(),
            },
            || async move { api.search_profiles(&query, &field).await },
        )
        .await
    }

    pub async fn swipes(
        &self,
        limit: u32,
        entity_id: Option<&str>,
    ) -> Result<Snapshot<Vec<Swipe>>, CoreError> {
        let api = self.inner.api.clone();
        let id = entity_id.map(str::to_owned);
        self.cached(
            QueryKey::Swipes {
                limit,
                entity_id: id.clone(),
            },
            || async move { api.list_swipes(limit, id.as_deref()).await },
        )
        .await
    }

    pub async fn wifi_logs(
        &self,
        limit: u32,
        entity_id: Option<&str>,
    ) -> Result<Snapshot<Vec<WifiLog>>, CoreError> {
        let api = self.inner.api.clone();
        let id = entity_id.map(str::to_owned);
        self.cached(
            QueryKey::WifiLogs {
                limit,
                entity_id: id.clone(),
            },
            || async move { api.list_wifi_logs(limit, id.as_deref()).await },
        )
        .await
    }

    pub async fn lab_bookings(
        &self,
        entity_id: Option<&str>,
        upcoming: bool,
    ) -> Result<Snapshot<Vec<LabBooking>>, CoreError> {
        let api = self.inner.api.clone();
        let id = entity_id.map(str::to_owned);
        self.cached(
            QueryKey::LabBookings {
                entity_id: id.clone(),
                upcoming,
            },
            || async move { api.list_lab_bookings(id.as_deref(), upcoming).await },
        )
        .await
    }

    pub async fn library_checkouts(
        &self,
        entity_id: Option<&str>,
    ) -> Result<Snapshot<Vec<LibraryCheckout>>, CoreError> {
        let api = self.inner.api.clone();
        let id = entity_id.map(str::to_owned);
        self.cached(
            QueryKey::LibraryCheckouts {
                entity_id: id.clone(),
            },
            || async move { api.list_library_checkouts(id.as_deref()).await },
        )
        .await
    }

    pub async fn notes(
        &self,
        entity_id: Option<&str>,
        source: Option<&str>,
    ) -> Result<Snapshot<Vec<Note>>, CoreError> {
        let api = self.inner.api.clone();
        let id = entity_id.map(str::to_owned);
        let source = source.map(str::to_owned);
        self.cached(
            QueryKey::Notes {
                entity_id: id.clone(),
                source: source.clone(),
            },
            || async move { api.list_notes(id.as_deref(), source.as_deref()).await },
        )
        .await
    }

    pub async fn cctv_frames(
        &self,
        location_id: Option<&str>,
        limit: u32,
    ) -> Result<Snapshot<Vec<CctvFrame>>, CoreError> {
        let api = self.inner.api.clone();
        let id = location_id.map(str::to_owned);
        self.cached(
            QueryKey::CctvFrames {
                location_id: id.clone(),
                limit,
            },
            || async move { api.list_cctv_frames(id.as_deref(), limit).await },
        )
        .await
    }

    /// Disabled until at least one identifier is present: no network
    /// call is issued for an empty selector.
    pub async fn resolve(
        &self,
        selector: &ResolveSelector,
    ) -> Result<Snapshot<EntityResolution>, CoreError> {
        if selector.is_empty() {
            return Err(CoreError::validation(
                "selector",
                "at least one of card_id, device_hash, face_id is required",
            ));
        }
        let api = self.inner.api.clone();
        let s = selector.clone();
        self.cached(
            QueryKey::Resolve {
                card_id: s.card_id.clone(),
                device_hash: s.device_hash.clone(),
                face_id: s.face_id.clone(),
            },
            || async move {
                api.resolve(s.card_id.as_deref(), s.device_hash.as_deref(), s.face_id.as_deref())
                    .await
            },
        )
        .await
    }

    /// Disabled until an entity is selected: an empty id issues no
    /// network call.
    pub async fn timeline(
        &self,
        entity_id: &str,
        days: u32,
    ) -> Result<Snapshot<ActivityTimeline>, CoreError> {
        if entity_id.trim().is_empty() {
            return Err(CoreError::validation("entity_id", "no entity selected"));
        }
        let api = self.inner.api.clone();
        let id = entity_id.to_owned();
        self.cached(
            QueryKey::EntityTimeline {
                entity_id: id.clone(),
                days,
            },
            || async move { api.entity_timeline(&id, days).await },
        )
        .await
    }

    pub async fn entities(&self, limit: u32, offset: u32) -> Result<Snapshot<Vec<Entity>>, CoreError> {
        let api = self.inner.api.clone();
        self.cached(QueryKey::Entities { limit, offset }, || async move {
            let resp = api.list_entities(limit, offset).await?;
            Ok(resp.entities.into_iter().map(Entity::from).collect())
        })
        .await
    }

    /// Every entity bundled with its recent timeline, as the backend
    /// shapes it.
    pub async fn entities_with_timeline(&self) -> Result<Snapshot<serde_json::Value>, CoreError> {
        let api = self.inner.api.clone();
        self.cached(QueryKey::EntitiesWithTimeline, || async move {
            api.entities_with_timeline().await
        })
        .await
    }

    pub async fn entity(&self, entity_id: &str) -> Result<Snapshot<EntityDetails>, CoreError> {
        let api = self.inner.api.clone();
        let id = entity_id.to_owned();
        self.cached(
            QueryKey::Entity {
                entity_id: id.clone(),
            },
            || async move { api.get_entity(&id).await },
        )
        .await
    }

    pub async fn dashboard_stats(&self) -> Result<Snapshot<DashboardStats>, CoreError> {
        let api = self.inner.api.clone();
        self.cached(QueryKey::DashboardStats, || async move {
            api.dashboard_stats().await
        })
        .await
    }

    pub async fn activity_heatmap(&self, days: u32) -> Result<Snapshot<serde_json::Value>, CoreError> {
        let api = self.inner.api.clone();
        self.cached(QueryKey::ActivityHeatmap { days }, || async move {
            api.activity_heatmap(days).await
        })
        .await
    }

    pub async fn weekly_activity(&self) -> Result<Snapshot<serde_json::Value>, CoreError> {
        let api = self.inner.api.clone();
        self.cached(QueryKey::WeeklyActivity, || async move {
            api.weekly_activity().await
        })
        .await
    }

    pub async fn source_distribution(&self) -> Result<Snapshot<serde_json::Value>, CoreError> {
        let api = self.inner.api.clone();
        self.cached(QueryKey::SourceDistribution, || async move {
            api.source_distribution().await
        })
        .await
    }

    pub async fn security_stats(&self) -> Result<Snapshot<SecurityStats>, CoreError> {
        let api = self.inner.api.clone();
        self.cached(QueryKey::SecurityStats, || async move {
            api.security_stats().await
        })
        .await
    }

    pub async fn inactive_entities(&self) -> Result<Snapshot<serde_json::Value>, CoreError> {
        let api = self.inner.api.clone();
        self.cached(QueryKey::InactiveEntities, || async move {
            api.inactive_entities().await
        })
        .await
    }

    pub async fn entity_history(&self, entity_id: &str) -> Result<Snapshot<serde_json::Value>, CoreError> {
        if entity_id.trim().is_empty() {
            return Err(CoreError::validation("entity_id", "no entity selected"));
        }
        let api = self.inner.api.clone();
        let id = entity_id.to_owned();
        self.cached(
            QueryKey::EntityHistory {
                entity_id: id.clone(),
            },
            || async move { api.entity_history(&id).await },
        )
        .await
    }

    /// Alerts, normalized from whichever wire shape the backend sends.
    /// Keys carrying different status filters cache independently.
    pub async fn alerts(
        &self,
        status: Option<AlertStatus>,
        limit: Option<u32>,
    ) -> Result<Snapshot<AlertFeed>, CoreError> {
        let api = self.inner.api.clone();
        self.cached(QueryKey::Alerts { status, limit }, || async move {
            let resp = api
                .list_alerts(status.map(AlertStatus::as_wire), limit)
                .await?;
            Ok(convert::feed_from_wire(resp))
        })
        .await
    }

    pub async fn health(&self) -> Result<Snapshot<HealthStatus>, CoreError> {
        let api = self.inner.api.clone();
        self.cached(QueryKey::Health, || async move { api.health().await })
            .await
    }

    // ── SpaceFlow ───────────────────────────────────────────────────

    /// Occupancy forecast for the given zones. Uncached: forecasts are
    /// parameterized per request and the views re-request on demand.
    pub async fn forecast(
        &self,
        zones: Vec<String>,
        horizon_minutes: u32,
    ) -> Result<Vec<Forecast>, CoreError> {
        let forecasts = self
            .inner
            .api
            .spaceflow_forecast(&ForecastRequest {
                zones,
                horizon_minutes,
            })
            .await?;
        Ok(forecasts)
    }

    /// The campus map with a fresh forecast folded in: every marker is
    /// reclassified from its updated forecast count.
    pub async fn forecast_markers(
        &self,
        horizon_minutes: u32,
    ) -> Result<Vec<LocationMarker>, CoreError> {
        let mut markers = LocationMarker::campus_defaults();
        let zones = markers.iter().map(|m| m.id.clone()).collect();
        let forecasts = self.forecast(zones, horizon_minutes).await?;

        for marker in &mut markers {
            if let Some(forecast) = forecasts.iter().find(|f| f.zone == marker.id) {
                marker.apply_forecast(forecast);
            }
        }
        Ok(markers)
    }

    // ── Alert mutations ─────────────────────────────────────────────

    /// Refetch the unfiltered alert list, seed the shared store, and
    /// refresh the cache entry. Called at startup and by the alert
    /// polling loop.
    pub async fn refresh_alerts(&self) -> Result<AlertFeed, CoreError> {
        let resp = self.inner.api.list_alerts(None, None).await?;
        let feed = convert::feed_from_wire(resp);
        self.inner.alerts.seed(feed.alerts.clone());
        self.inner.cache.store(
            QueryKey::Alerts {
                status: None,
                limit: None,
            },
            feed.clone(),
        );
        Ok(feed)
    }

    /// Plain status change: write through to the backend, then fold the
    /// confirmed alert into the store and drop every cached alert view.
    /// No optimistic local edit.
    pub async fn update_alert_status(
        &self,
        alert_id: &str,
        status: AlertStatus,
    ) -> Result<Alert, CoreError> {
        let wire = self
            .inner
            .api
            .update_alert_status(alert_id, status.as_wire())
            .await?;
        let alert = convert::alert_from_wire(wire);

        self.inner.alerts.update_status(&alert.id, alert.status);
        self.inner.cache.invalidate_prefix(Resource::Alerts);
        Ok(alert)
    }

    /// Resolve an alert optimistically: the local store flips to
    /// `resolved` before the request goes out, so subscribers render
    /// the resolution immediately. A backend failure is handled per the
    /// configured [`RollbackPolicy`].
    pub async fn resolve_alert(&self, alert_id: &str) -> Result<Alert, CoreError> {
        let previous = self.inner.alerts.update_status(alert_id, AlertStatus::Resolved);
        debug!(alert = alert_id, ?previous, "optimistically resolved");

        match self
            .inner
            .api
            .update_alert_status(alert_id, AlertStatus::Resolved.as_wire())
            .await
        {
            Ok(wire) => {
                let alert = convert::alert_from_wire(wire);
                self.inner.alerts.update_status(&alert.id, alert.status);
                self.inner.cache.invalidate_prefix(Resource::Alerts);
                Ok(alert)
            }
            Err(err) => {
                match (self.inner.rollback, previous) {
                    (RollbackPolicy::Revert, Some(previous)) => {
                        warn!(alert = alert_id, error = %err, "resolve rejected, reverting local edit");
                        self.inner.alerts.update_status(alert_id, previous);
                    }
                    (RollbackPolicy::Revert, None) => {}
                    (RollbackPolicy::Keep, _) => {
                        warn!(alert = alert_id, error = %err, "resolve rejected, keeping local edit");
                    }
                }
                Err(err.into())
            }
        }
    }

    // ── Background polling ──────────────────────────────────────────

    /// Spawn the polling loops: alerts, dashboard stats, security stats,
    /// and health, each on its table cadence. Idempotent-ish — calling
    /// twice doubles the tasks, so callers start once.
    pub fn start(&self) {
        let mut tasks = Vec::new();

        let poll = self.inner.poll;

        if let Some(interval) =
            poll.alerts
                .or((QueryKey::Alerts { status: None, limit: None }).policy().refetch_interval)
        {
            let ctl = self.clone();
            tasks.push(tokio::spawn(async move {
                ctl.poll_loop("alerts", interval, |ctl| async move {
                    ctl.refresh_alerts().await.map(|_| ())
                })
                .await;
            }));
        }

        if let Some(interval) = poll
            .dashboard
            .or(QueryKey::DashboardStats.policy().refetch_interval)
        {
            let ctl = self.clone();
            tasks.push(tokio::spawn(async move {
                ctl.poll_loop("dashboard", interval, |ctl| async move {
                    let stats = ctl.inner.api.dashboard_stats().await?;
                    ctl.inner.cache.store(QueryKey::DashboardStats, stats);
                    Ok(())
                })
                .await;
            }));
        }

        if let Some(interval) = poll
            .security
            .or(QueryKey::SecurityStats.policy().refetch_interval)
        {
            let ctl = self.clone();
            tasks.push(tokio::spawn(async move {
                ctl.poll_loop("security", interval, |ctl| async move {
                    let stats = ctl.inner.api.security_stats().await?;
                    ctl.inner.cache.store(QueryKey::SecurityStats, stats);
                    Ok(())
                })
                .await;
            }));
        }

        if let Some(interval) = poll.health.or(QueryKey::Health.policy().refetch_interval) {
            let ctl = self.clone();
            tasks.push(tokio::spawn(async move {
                ctl.poll_loop("health", interval, |ctl| async move {
                    let health = ctl.inner.api.health().await?;
                    ctl.inner.cache.store(QueryKey::Health, health);
                    Ok(())
                })
                .await;
            }));
        }

        if let Ok(mut slot) = self.inner.tasks.lock() {
            slot.extend(tasks);
        }
    }

    /// One polling loop: refetch on the cadence until cancelled. A
    /// failed tick is logged and skipped — the last-known-good cache
    /// entry keeps serving (stale-while-error).
    async fn poll_loop<F, Fut>(&self, name: &str, period: std::time::Duration, tick: F)
    where
        F: Fn(Controller) -> Fut,
        Fut: Future<Output = Result<(), CoreError>>,
    {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        // The first tick fires immediately; that is the startup fetch.
        loop {
            tokio::select! {
                () = self.inner.cancel.cancelled() => {
                    debug!(task = name, "poll loop stopped");
                    return;
                }
                _ = interval.tick() => {
                    if let Err(err) = tick(self.clone()).await {
                        warn!(task = name, error = %err, "poll refresh failed");
                    }
                }
            }
        }
    }

    /// Cancel the polling loops and wait for them to wind down.
    pub async fn shutdown(&self) {
        self.inner.cancel.cancel();
        let tasks = match self.inner.tasks.lock() {
            Ok(mut slot) => std::mem::take(&mut *slot),
            Err(_) => Vec::new(),
        };
        for task in tasks {
            let _ = task.await;
        }
    }
}
