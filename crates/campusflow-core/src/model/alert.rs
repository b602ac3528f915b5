// ── Alert domain types ──
//
// One canonical shape for the two wire forms the backend has shipped.
// Status and severity vocabulary is fixed here; nothing downstream
// branches on raw backend strings.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Alert category, normalized from `type` / `alert_type`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum AlertKind {
    Overcrowding,
    MissingEntity,
    AccessViolation,
    Underutilized,
    #[serde(untagged)]
    Other(String),
}

impl AlertKind {
    pub fn from_wire(raw: &str) -> Self {
        match raw {
            "overcrowding" => Self::Overcrowding,
            "missing_entity" => Self::MissingEntity,
            "access_violation" => Self::AccessViolation,
            "underutilized" => Self::Underutilized,
            other => Self::Other(other.to_owned()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Overcrowding => "overcrowding",
            Self::MissingEntity => "missing_entity",
            Self::AccessViolation => "access_violation",
            Self::Underutilized => "underutilized",
            Self::Other(s) => s,
        }
    }
}

impl fmt::Display for AlertKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Discrete severity band.
///
/// The backend emits either this enum or a continuous `severity_score`;
/// the two are interconvertible via the dashboard's banding (score ≥ 0.8
/// critical, ≥ 0.6 high, ≥ 0.4 medium, else low).
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    /// Band a continuous score (0–1) into a severity.
    pub fn from_score(score: f64) -> Self {
        if score >= 0.8 {
            Self::Critical
        } else if score >= 0.6 {
            Self::High
        } else if score >= 0.4 {
            Self::Medium
        } else {
            Self::Low
        }
    }

    /// Band midpoint, used when only the discrete form was on the wire.
    pub fn score(self) -> f64 {
        match self {
            Self::Critical => 0.9,
            Self::High => 0.7,
            Self::Medium => 0.5,
            Self::Low => 0.3,
        }
    }
}

/// Client-side alert lifecycle state.
///
/// The wire vocabulary drifted (`pending` vs `investigating`); both fold
/// into [`Investigating`](Self::Investigating). No state is terminal in
/// the client model — any requested transition is applied, including
/// reopening a resolved alert.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum AlertStatus {
    Active,
    Investigating,
    Resolved,
}

impl AlertStatus {
    /// Parse a wire status. Returns `None` for vocabulary this client
    /// does not recognize (the caller decides the fallback).
    pub fn from_wire(raw: &str) -> Option<Self> {
        match raw {
            "active" => Some(Self::Active),
            "investigating" | "pending" => Some(Self::Investigating),
            "resolved" => Some(Self::Resolved),
            _ => None,
        }
    }

    /// String the backend's `PUT /api/alerts/{id}?status=` accepts.
    pub fn as_wire(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Investigating => "investigating",
            Self::Resolved => "resolved",
        }
    }
}

/// Supporting signal attached to an alert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evidence {
    pub source: String,
    pub id: String,
    pub weight: f64,
    pub description: String,
}

/// Suggested remediation attached to an alert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendedAction {
    pub action_id: String,
    pub title: String,
    pub description: String,
    pub expected_effect: String,
    pub impact_score: f64,
}

/// Canonical alert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub id: String,
    pub entity_id: Option<String>,
    pub kind: AlertKind,
    pub severity: Severity,
    /// Continuous severity, 0–1. Derived from the band midpoint when the
    /// backend only sent the discrete form.
    pub severity_score: f64,
    pub zone: Option<String>,
    pub title: String,
    pub description: String,
    pub status: AlertStatus,
    pub timestamp: DateTime<Utc>,
    pub evidence: Vec<Evidence>,
    pub recommended_actions: Vec<RecommendedAction>,
    pub resolved_at: Option<DateTime<Utc>>,
    pub resolved_by: Option<String>,
}

/// Status counts, always derived from an alert collection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertsSummary {
    pub total_alerts: u64,
    pub active_alerts: u64,
    pub resolved_alerts: u64,
    pub pending_alerts: u64,
}

impl AlertsSummary {
    /// The one way a summary comes into existence: a single pass over
    /// the collection it describes.
    pub fn of(alerts: &[Alert]) -> Self {
        let mut summary = Self {
            total_alerts: alerts.len() as u64,
            ..Self::default()
        };
        for alert in alerts {
            match alert.status {
                AlertStatus::Active => summary.active_alerts += 1,
                AlertStatus::Resolved => summary.resolved_alerts += 1,
                AlertStatus::Investigating => summary.pending_alerts += 1,
            }
        }
        summary
    }
}

/// Normalized result of `GET /api/alerts`.
#[derive(Debug, Clone)]
pub struct AlertFeed {
    pub alerts: Vec<Alert>,
    /// Summary as the backend reported it. Views derive their own from
    /// the collection; this is kept for cross-checking only.
    pub reported_summary: Option<AlertsSummary>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn alert(id: &str, status: AlertStatus) -> Alert {
        Alert {
            id: id.to_owned(),
            entity_id: None,
            kind: AlertKind::Overcrowding,
            severity: Severity::High,
            severity_score: 0.7,
            zone: Some("library".into()),
            title: String::new(),
            description: String::new(),
            status,
            timestamp: Utc::now(),
            evidence: Vec::new(),
            recommended_actions: Vec::new(),
            resolved_at: None,
            resolved_by: None,
        }
    }

    #[test]
    fn severity_banding_roundtrip() {
        assert_eq!(Severity::from_score(0.92), Severity::Critical);
        assert_eq!(Severity::from_score(0.8), Severity::Critical);
        assert_eq!(Severity::from_score(0.65), Severity::High);
        assert_eq!(Severity::from_score(0.4), Severity::Medium);
        assert_eq!(Severity::from_score(0.1), Severity::Low);

        for severity in [
            Severity::Low,
            Severity::Medium,
            Severity::High,
            Severity::Critical,
        ] {
            assert_eq!(Severity::from_score(severity.score()), severity);
        }
    }

    #[test]
    fn status_vocabulary_folds_pending() {
        assert_eq!(
            AlertStatus::from_wire("pending"),
            Some(AlertStatus::Investigating)
        );
        assert_eq!(
            AlertStatus::from_wire("investigating"),
            Some(AlertStatus::Investigating)
        );
        assert_eq!(AlertStatus::from_wire("escalated"), None);
    }

    #[test]
    fn summary_counts_every_status() {
        let alerts = vec![
            alert("a", AlertStatus::Active),
            alert("b", AlertStatus::Active),
            alert("c", AlertStatus::Resolved),
            alert("d", AlertStatus::Investigating),
        ];
        let summary = AlertsSummary::of(&alerts);

        assert_eq!(summary.total_alerts, 4);
        assert_eq!(summary.active_alerts, 2);
        assert_eq!(summary.resolved_alerts, 1);
        assert_eq!(summary.pending_alerts, 1);
        assert_eq!(
            summary.active_alerts + summary.resolved_alerts + summary.pending_alerts,
            summary.total_alerts
        );
    }

    #[test]
    fn kind_preserves_unknown_vocabulary() {
        let kind = AlertKind::from_wire("tailgating");
        assert_eq!(kind, AlertKind::Other("tailgating".into()));
        assert_eq!(kind.as_str(), "tailgating");
    }
}
