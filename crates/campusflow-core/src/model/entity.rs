// ── Entity domain types ──

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use campusflow_api::types;

use super::Profile;

/// Recency classification, derived server-side from last activity.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum EntityStatus {
    Active,
    Recent,
    Inactive,
}

impl EntityStatus {
    /// Unknown vocabulary reads as inactive — the conservative bucket
    /// for a monitoring view.
    pub fn from_wire(raw: &str) -> Self {
        match raw {
            "active" => Self::Active,
            "recent" => Self::Recent,
            _ => Self::Inactive,
        }
    }
}

/// Profile enriched with cross-source resolution output. Read-only from
/// the client's perspective.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entity {
    pub profile: Profile,
    pub last_seen: Option<DateTime<Utc>>,
    pub last_location: Option<String>,
    pub status: EntityStatus,
    pub confidence: f64,
}

impl From<types::Entity> for Entity {
    fn from(wire: types::Entity) -> Self {
        Self {
            status: EntityStatus::from_wire(&wire.status),
            profile: wire.profile,
            last_seen: wire.last_seen,
            last_location: wire.last_location,
            confidence: wire.confidence,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_status_reads_as_inactive() {
        assert_eq!(EntityStatus::from_wire("active"), EntityStatus::Active);
        assert_eq!(EntityStatus::from_wire("recent"), EntityStatus::Recent);
        assert_eq!(EntityStatus::from_wire("dormant"), EntityStatus::Inactive);
    }
}
