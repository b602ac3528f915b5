//! Reactive client layer between `campusflow-api` and UI consumers.
//!
//! This crate owns the behavioral contract every CampusFlow view depends
//! on:
//!
//! - **[`Controller`]** — facade over the typed API client. Every read is
//!   routed through the query cache; alert mutations go straight to the
//!   backend and invalidate dependent cache entries. `start()` spawns the
//!   background polling tasks, `shutdown()` cancels them.
//!
//! - **[`AlertStore`]** — observable in-memory alert collection built on
//!   `tokio::sync::watch`. Every mutation replaces the full snapshot, so
//!   subscribers never observe a partially-updated collection. The
//!   [`AlertsSummary`] is re-derived from the collection on every change,
//!   never set directly.
//!
//! - **[`QueryCache`]** — per-resource staleness windows, typed cache
//!   keys, request deduplication, and stale-while-error semantics. The
//!   single [`cache::CachePolicy`] table replaces the inline literals the
//!   per-view fetch hooks used to scatter around.
//!
//! - **Domain model** ([`model`]) — canonical alert/entity/occupancy
//!   types. Both historical wire shapes of an alert normalize into one
//!   [`Alert`] at the boundary ([`convert`]), so nothing downstream
//!   branches on raw backend strings.

pub mod cache;
pub mod controller;
pub mod convert;
pub mod error;
pub mod model;
pub mod store;

// ── Primary re-exports ──────────────────────────────────────────────
pub use cache::{QueryCache, QueryKey, Resource, Snapshot};
pub use controller::{Controller, ControllerConfig, PollOverrides, ResolveSelector, RollbackPolicy};
pub use error::CoreError;
pub use store::AlertStore;

// Re-export model types at the crate root for ergonomics.
pub use model::{
    Alert, AlertFeed, AlertKind, AlertStatus, AlertsSummary, Entity, EntityStatus, Evidence,
    LocationMarker, OccupancyStatus, RecommendedAction, Severity, ZoneKind,
};
