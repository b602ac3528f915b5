//! Wire → domain normalization.
//!
//! The backend has shipped two alert shapes over its lifetime:
//!
//! - `alert_id` + continuous `severity_score` + `type` + `affected_zone`
//! - `id` + discrete `severity` + `alert_type` + `location`
//!
//! Both fold into one canonical [`Alert`] here, so the rest of the
//! workspace never sees the drift. The client performs no server-side
//! validation — an unrecognized status string is accepted and bucketed
//! as `active` with a warning.

use std::str::FromStr;

use tracing::warn;

use campusflow_api::types;

use crate::model::{
    Alert, AlertFeed, AlertKind, AlertStatus, AlertsSummary, Evidence, RecommendedAction, Severity,
};

impl From<types::Evidence> for Evidence {
    fn from(wire: types::Evidence) -> Self {
        Self {
            source: wire.source,
            id: wire.id,
            weight: wire.weight,
            description: wire.description,
        }
    }
}

impl From<types::RecommendedAction> for RecommendedAction {
    fn from(wire: types::RecommendedAction) -> Self {
        Self {
            action_id: wire.action_id,
            title: wire.title,
            description: wire.description,
            expected_effect: wire.expected_effect,
            impact_score: wire.impact_score,
        }
    }
}

/// Normalize one alert from either wire shape.
pub fn alert_from_wire(wire: types::WireAlert) -> Alert {
    let id = wire
        .alert_id
        .or(wire.id)
        .unwrap_or_else(|| format!("alert_{}", wire.timestamp.timestamp_millis()));

    let kind = wire
        .kind
        .or(wire.alert_type)
        .map_or(AlertKind::Other("unknown".into()), |k| {
            AlertKind::from_wire(&k)
        });

    // Prefer the continuous score; fall back to the discrete band's
    // midpoint; an alert with neither reads as medium.
    let (severity, severity_score) = match (wire.severity_score, wire.severity.as_deref()) {
        (Some(score), _) => (Severity::from_score(score), score),
        (None, Some(band)) => {
            let severity = Severity::from_str(band).unwrap_or_else(|_| {
                warn!(alert = %id, severity = band, "unrecognized severity band, assuming medium");
                Severity::Medium
            });
            (severity, severity.score())
        }
        (None, None) => (Severity::Medium, Severity::Medium.score()),
    };

    let status = AlertStatus::from_wire(&wire.status).unwrap_or_else(|| {
        warn!(alert = %id, status = %wire.status, "unrecognized alert status, assuming active");
        AlertStatus::Active
    });

    let zone = wire.affected_zone.or(wire.location);
    let title = wire.title.unwrap_or_else(|| {
        // Older responses had no title; synthesize one from the kind.
        let mut t = kind.as_str().replace('_', " ");
        if let Some(first) = t.get_mut(0..1) {
            first.make_ascii_uppercase();
        }
        t
    });

    Alert {
        id,
        entity_id: wire.entity_id,
        kind,
        severity,
        severity_score,
        zone,
        title,
        description: wire.description,
        status,
        timestamp: wire.timestamp,
        evidence: wire.evidence.into_iter().map(Evidence::from).collect(),
        recommended_actions: wire
            .recommended_actions
            .into_iter()
            .map(RecommendedAction::from)
            .collect(),
        resolved_at: wire.resolved_at,
        resolved_by: wire.resolved_by,
    }
}

/// Normalize a full `/api/alerts` response.
pub fn feed_from_wire(wire: types::AlertsResponse) -> AlertFeed {
    AlertFeed {
        alerts: wire.alerts.into_iter().map(alert_from_wire).collect(),
        reported_summary: wire.summary.map(|s| AlertsSummary {
            total_alerts: s.total_alerts,
            active_alerts: s.active_alerts,
            resolved_alerts: s.resolved_alerts,
            pending_alerts: s.pending_alerts,
        }),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use pretty_assertions::assert_eq;

    fn wire_base() -> types::WireAlert {
        types::WireAlert {
            alert_id: None,
            id: None,
            entity_id: None,
            kind: None,
            alert_type: None,
            severity_score: None,
            severity: None,
            affected_zone: None,
            location: None,
            title: None,
            description: "something happened".into(),
            status: "active".into(),
            timestamp: Utc.with_ymd_and_hms(2026, 3, 14, 10, 15, 0).unwrap(),
            evidence: Vec::new(),
            recommended_actions: Vec::new(),
            resolved_at: None,
            resolved_by: None,
        }
    }

    #[test]
    fn new_shape_normalizes() {
        let alert = alert_from_wire(types::WireAlert {
            alert_id: Some("alert_001".into()),
            kind: Some("overcrowding".into()),
            severity_score: Some(0.92),
            affected_zone: Some("cse".into()),
            title: Some("High Overcrowding Risk Detected".into()),
            ..wire_base()
        });

        assert_eq!(alert.id, "alert_001");
        assert_eq!(alert.kind, AlertKind::Overcrowding);
        assert_eq!(alert.severity, Severity::Critical);
        assert!((alert.severity_score - 0.92).abs() < f64::EPSILON);
        assert_eq!(alert.zone.as_deref(), Some("cse"));
        assert_eq!(alert.status, AlertStatus::Active);
    }

    #[test]
    fn old_shape_normalizes() {
        let alert = alert_from_wire(types::WireAlert {
            id: Some("alert_101".into()),
            alert_type: Some("access_violation".into()),
            severity: Some("high".into()),
            location: Some("eeelab".into()),
            status: "investigating".into(),
            ..wire_base()
        });

        assert_eq!(alert.id, "alert_101");
        assert_eq!(alert.kind, AlertKind::AccessViolation);
        assert_eq!(alert.severity, Severity::High);
        assert!((alert.severity_score - 0.7).abs() < f64::EPSILON);
        assert_eq!(alert.zone.as_deref(), Some("eeelab"));
        assert_eq!(alert.status, AlertStatus::Investigating);
        // No title on the wire: synthesized from the kind.
        assert_eq!(alert.title, "Access violation");
    }

    #[test]
    fn pending_status_folds_into_investigating() {
        let alert = alert_from_wire(types::WireAlert {
            alert_id: Some("alert_004".into()),
            status: "pending".into(),
            ..wire_base()
        });
        assert_eq!(alert.status, AlertStatus::Investigating);
    }

    #[test]
    fn unknown_status_is_accepted_as_active() {
        let alert = alert_from_wire(types::WireAlert {
            alert_id: Some("alert_x".into()),
            status: "escalated".into(),
            ..wire_base()
        });
        assert_eq!(alert.status, AlertStatus::Active);
    }

    #[test]
    fn feed_carries_reported_summary() {
        let feed = feed_from_wire(types::AlertsResponse {
            alerts: vec![wire_base()],
            summary: Some(types::WireAlertsSummary {
                total_alerts: 1,
                active_alerts: 1,
                resolved_alerts: 0,
                pending_alerts: 0,
            }),
        });

        assert_eq!(feed.alerts.len(), 1);
        assert_eq!(feed.reported_summary.unwrap().active_alerts, 1);
    }
}
