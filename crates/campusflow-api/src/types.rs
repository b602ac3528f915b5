//! Wire types for the CampusFlow backend.
//!
//! These mirror the backend JSON as-is, including the places where the
//! contract drifted across backend revisions (two alert shapes, two
//! summary vocabularies). Normalization into canonical domain types
//! happens one layer up, in `campusflow-core`.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ── Profiles & entities ─────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub entity_id: String,
    pub name: String,
    pub role: String,
    pub email: String,
    pub department: String,
    #[serde(default)]
    pub student_id: Option<String>,
    #[serde(default)]
    pub staff_id: Option<String>,
    #[serde(default)]
    pub card_id: Option<String>,
    #[serde(default)]
    pub device_hash: Option<String>,
    #[serde(default)]
    pub face_id: Option<String>,
    #[serde(default)]
    pub metadata_json: Option<HashMap<String, serde_json::Value>>,
}

/// Enriched profile as returned by `/api/entities`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entity {
    #[serde(flatten)]
    pub profile: Profile,
    #[serde(default)]
    pub last_seen: Option<DateTime<Utc>>,
    #[serde(default)]
    pub last_location: Option<String>,
    /// `active` | `recent` | `inactive` — normalized in core.
    pub status: String,
    pub confidence: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntitiesResponse {
    pub entities: Vec<Entity>,
    pub total: u64,
    pub limit: u32,
    pub offset: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivitySummary {
    #[serde(default)]
    pub swipes: u64,
    #[serde(default)]
    pub wifi_connections: u64,
    #[serde(default)]
    pub lab_bookings: u64,
    #[serde(default)]
    pub library_checkouts: u64,
    #[serde(default)]
    pub total_activities: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecentActivity {
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "type")]
    pub activity_type: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub details: String,
}

/// Detail view from `/api/entities/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityDetails {
    pub profile: Profile,
    pub status: String,
    pub activity_summary: ActivitySummary,
    #[serde(default)]
    pub recent_activities: Vec<RecentActivity>,
    #[serde(default)]
    pub last_seen: Option<DateTime<Utc>>,
    #[serde(default)]
    pub last_location: Option<String>,
}

/// Match result from `/api/resolve`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityResolution {
    pub entity_id: String,
    pub confidence: f64,
    #[serde(default)]
    pub matched_sources: Vec<String>,
    pub profile: Profile,
}

// ── Activity records ────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Swipe {
    pub card_id: String,
    pub location_id: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub raw_record_json: Option<HashMap<String, serde_json::Value>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WifiLog {
    pub device_hash: String,
    pub ap_id: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub raw_record_json: Option<HashMap<String, serde_json::Value>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabBooking {
    pub booking_id: String,
    pub entity_id: String,
    pub lab_id: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    #[serde(default)]
    pub attended_flag: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LibraryCheckout {
    pub checkout_id: String,
    pub entity_id: String,
    pub book_id: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Note {
    pub entity_id: String,
    pub source: String,
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CctvFrame {
    pub frame_id: String,
    pub location_id: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub face_id: Option<String>,
}

/// Cross-source activity rollup from `/api/entity/{id}/timeline`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityTimeline {
    pub entity_id: String,
    pub period_days: u32,
    #[serde(default)]
    pub swipes: Vec<Swipe>,
    #[serde(default)]
    pub wifi_logs: Vec<WifiLog>,
    #[serde(default)]
    pub lab_bookings: Vec<LabBooking>,
    #[serde(default)]
    pub library_checkouts: Vec<LibraryCheckout>,
    #[serde(default)]
    pub total_activities: u64,
}

// ── Dashboard & security stats ──────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardStats {
    pub total_entities: u64,
    pub active_today: u64,
    pub total_activities: u64,
    pub resolution_accuracy: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityStats {
    pub active_threats: u64,
    pub resolved_today: u64,
    pub monitored_zones: u64,
    pub access_violations: u64,
    #[serde(default)]
    pub total_swipes_today: u64,
    #[serde(default)]
    pub total_cctv_frames_today: u64,
}

// ── Alerts (both historical wire shapes) ────────────────────────────

/// Raw alert as emitted by any backend revision.
///
/// Older responses use `id` / `alert_type` / discrete `severity` /
/// `location`; newer ones use `alert_id` / `type` / continuous
/// `severity_score` / `affected_zone`. Every field that diverged is
/// optional here; `campusflow-core` folds the union into one canonical
/// shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WireAlert {
    #[serde(default)]
    pub alert_id: Option<String>,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub entity_id: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub alert_type: Option<String>,
    #[serde(default)]
    pub severity_score: Option<f64>,
    #[serde(default)]
    pub severity: Option<String>,
    #[serde(default)]
    pub affected_zone: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: String,
    pub status: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub evidence: Vec<Evidence>,
    #[serde(default)]
    pub recommended_actions: Vec<RecommendedAction>,
    #[serde(default)]
    pub resolved_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub resolved_by: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Evidence {
    pub source: String,
    pub id: String,
    /// Contribution weight, 0–1.
    pub weight: f64,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendedAction {
    pub action_id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub expected_effect: String,
    /// Estimated effect strength, 0–1.
    pub impact_score: f64,
}

/// Summary block of `/api/alerts`. Field names drifted between backend
/// revisions — the aliases absorb the older vocabulary.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WireAlertsSummary {
    #[serde(default)]
    pub total_alerts: u64,
    #[serde(default, alias = "active_entities")]
    pub active_alerts: u64,
    #[serde(default, alias = "alert_entities")]
    pub resolved_alerts: u64,
    #[serde(default, alias = "warning_entities")]
    pub pending_alerts: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertsResponse {
    pub alerts: Vec<WireAlert>,
    #[serde(default)]
    pub summary: Option<WireAlertsSummary>,
}

// ── SpaceFlow forecasts ─────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastRequest {
    /// Zone ids to forecast; empty means every known zone.
    #[serde(default)]
    pub zones: Vec<String>,
    /// Forecast horizon, defaults to the next hour.
    #[serde(default = "default_horizon")]
    pub horizon_minutes: u32,
}

fn default_horizon() -> u32 {
    60
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ForecastExplanation {
    #[serde(default)]
    pub feature_weights: HashMap<String, f64>,
}

/// Backend-computed occupancy forecast for one zone.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Forecast {
    pub zone: String,
    pub forecast_count: u32,
    pub confidence: f64,
    #[serde(default)]
    pub model_version: String,
    #[serde(default)]
    pub provenance: Vec<Evidence>,
    #[serde(default)]
    pub explanation: ForecastExplanation,
}

// ── Health ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
}
