//! Canonical domain model.
//!
//! Types that needed normalization (alerts, entity status, occupancy)
//! live here; record types the backend already emits in one stable shape
//! (profiles, activity rows, stats) are re-exported from the wire layer
//! unchanged.

pub mod alert;
pub mod entity;
pub mod occupancy;

pub use alert::{
    Alert, AlertFeed, AlertKind, AlertStatus, AlertsSummary, Evidence, RecommendedAction, Severity,
};
pub use entity::{Entity, EntityStatus};
pub use occupancy::{LocationMarker, OccupancyStatus, ZoneKind};

// Stable wire shapes, passed through as-is.
pub use campusflow_api::types::{
    ActivitySummary, ActivityTimeline, CctvFrame, DashboardStats, EntityDetails, EntityResolution,
    Forecast, ForecastRequest, HealthStatus, LabBooking, LibraryCheckout, Note, Profile,
    RecentActivity, SecurityStats, Swipe, WifiLog,
};
