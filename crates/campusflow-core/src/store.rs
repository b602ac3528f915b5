// ── Observable alert store ──
//
// Replaces the ambient provider state the dashboard used to share
// between pages with an explicit subscribe/notify store. Every mutation
// replaces the full snapshot, so a reader never observes a
// partially-updated collection; the summary is re-derived from the
// collection on every change and is never set directly.

use std::sync::Arc;

use tokio::sync::watch;

use crate::model::{Alert, AlertStatus, AlertsSummary};

/// In-memory alert collection shared by every view for the lifetime of
/// the session. Purely local — nothing in here talks to the backend
/// (the optimistic resolve composite lives on the `Controller`).
pub struct AlertStore {
    snapshot: watch::Sender<Arc<Vec<Alert>>>,
    summary: watch::Sender<AlertsSummary>,
}

impl AlertStore {
    pub fn new() -> Self {
        let (snapshot, _) = watch::channel(Arc::new(Vec::new()));
        let (summary, _) = watch::channel(AlertsSummary::default());
        Self { snapshot, summary }
    }

    /// Replace the whole collection (startup seed / poll refresh).
    pub fn seed(&self, alerts: Vec<Alert>) {
        self.publish(alerts);
    }

    /// Append one alert. Local only; never contacts the backend.
    pub fn add(&self, alert: Alert) {
        let mut alerts = self.cloned();
        alerts.push(alert);
        self.publish(alerts);
    }

    /// Replace-in-place by identity match. Returns the previous status,
    /// or `None` when no alert carries `alert_id` — in that case the
    /// collection is left untouched (no insert, no notification).
    pub fn update_status(&self, alert_id: &str, status: AlertStatus) -> Option<AlertStatus> {
        let mut alerts = self.cloned();
        let target = alerts.iter_mut().find(|a| a.id == alert_id)?;
        let previous = target.status;
        target.status = status;
        self.publish(alerts);
        Some(previous)
    }

    /// Look up one alert by id.
    pub fn get(&self, alert_id: &str) -> Option<Alert> {
        self.snapshot
            .borrow()
            .iter()
            .find(|a| a.id == alert_id)
            .cloned()
    }

    /// Current collection (cheap `Arc` clone).
    pub fn snapshot(&self) -> Arc<Vec<Alert>> {
        self.snapshot.borrow().clone()
    }

    /// Current derived summary.
    pub fn summary(&self) -> AlertsSummary {
        *self.summary.borrow()
    }

    /// Subscribe to collection changes.
    pub fn subscribe(&self) -> watch::Receiver<Arc<Vec<Alert>>> {
        self.snapshot.subscribe()
    }

    /// Subscribe to summary changes.
    pub fn subscribe_summary(&self) -> watch::Receiver<AlertsSummary> {
        self.summary.subscribe()
    }

    pub fn len(&self) -> usize {
        self.snapshot.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshot.borrow().is_empty()
    }

    // ── Private helpers ─────────────────────────────────────────────

    fn cloned(&self) -> Vec<Alert> {
        self.snapshot.borrow().as_ref().clone()
    }

    /// Publish a new snapshot and the summary derived from it. The
    /// summary always trails the collection by exactly one send, inside
    /// the same synchronous call — subscribers of either channel see a
    /// consistent pair.
    fn publish(&self, alerts: Vec<Alert>) {
        let derived = AlertsSummary::of(&alerts);
        // `send_modify` updates unconditionally, even with zero receivers.
        self.snapshot.send_modify(|snap| *snap = Arc::new(alerts));
        self.summary.send_modify(|s| *s = derived);
    }
}

impl Default for AlertStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use pretty_assertions::assert_eq;

    use crate::model::{AlertKind, Severity};

    fn alert(id: &str, status: AlertStatus) -> Alert {
        Alert {
            id: id.to_owned(),
            entity_id: None,
            kind: AlertKind::Overcrowding,
            severity: Severity::High,
            severity_score: 0.7,
            zone: None,
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

    /// Three active, one resolved — the standard demo seed.
    fn seeded_store() -> AlertStore {
        let store = AlertStore::new();
        store.seed(vec![
            alert("alert_001", AlertStatus::Active),
            alert("alert_002", AlertStatus::Active),
            alert("alert_003", AlertStatus::Active),
            alert("alert_004", AlertStatus::Resolved),
        ]);
        store
    }

    #[test]
    fn summary_tracks_seed() {
        let store = seeded_store();
        assert_eq!(
            store.summary(),
            AlertsSummary {
                total_alerts: 4,
                active_alerts: 3,
                resolved_alerts: 1,
                pending_alerts: 0,
            }
        );
    }

    #[test]
    fn update_status_recomputes_summary() {
        let store = seeded_store();

        let previous = store.update_status("alert_003", AlertStatus::Resolved);
        assert_eq!(previous, Some(AlertStatus::Active));
        assert_eq!(
            store.summary(),
            AlertsSummary {
                total_alerts: 4,
                active_alerts: 2,
                resolved_alerts: 2,
                pending_alerts: 0,
            }
        );
    }

    #[test]
    fn update_status_is_idempotent() {
        let store = seeded_store();

        store.update_status("alert_001", AlertStatus::Investigating);
        let first = store.snapshot();
        store.update_status("alert_001", AlertStatus::Investigating);
        let second = store.snapshot();

        assert_eq!(*first, *second);
        assert_eq!(store.summary().pending_alerts, 1);
    }

    #[test]
    fn update_status_for_unknown_id_is_a_noop() {
        let store = seeded_store();
        let before = store.snapshot();

        assert_eq!(store.update_status("ghost", AlertStatus::Resolved), None);

        assert_eq!(*before, *store.snapshot());
        assert_eq!(store.len(), 4);
    }

    #[test]
    fn reopen_is_permitted() {
        let store = seeded_store();

        let previous = store.update_status("alert_004", AlertStatus::Active);
        assert_eq!(previous, Some(AlertStatus::Resolved));
        assert_eq!(store.summary().active_alerts, 4);
        assert_eq!(store.summary().resolved_alerts, 0);
    }

    #[test]
    fn add_appends_locally() {
        let store = seeded_store();
        store.add(alert("alert_005", AlertStatus::Investigating));

        assert_eq!(store.len(), 5);
        assert_eq!(store.summary().pending_alerts, 1);
    }

    #[tokio::test]
    async fn subscribers_see_mutations() {
        let store = seeded_store();
        let mut rx = store.subscribe();
        let _ = rx.borrow_and_update();

        store.update_status("alert_001", AlertStatus::Resolved);

        rx.changed().await.unwrap();
        let snap = rx.borrow();
        let updated = snap.iter().find(|a| a.id == "alert_001").unwrap();
        assert_eq!(updated.status, AlertStatus::Resolved);
    }

    #[tokio::test]
    async fn summary_subscribers_see_recomputation() {
        let store = seeded_store();
        let mut rx = store.subscribe_summary();
        let _ = rx.borrow_and_update();

        store.update_status("alert_001", AlertStatus::Resolved);

        rx.changed().await.unwrap();
        let summary = *rx.borrow();
        assert_eq!(summary.active_alerts, 2);
        assert_eq!(summary.resolved_alerts, 2);
    }

    #[test]
    fn summary_invariant_holds_for_any_collection() {
        let store = AlertStore::new();
        store.seed(vec![
            alert("a", AlertStatus::Active),
            alert("b", AlertStatus::Investigating),
            alert("c", AlertStatus::Resolved),
            alert("d", AlertStatus::Investigating),
            alert("e", AlertStatus::Active),
        ]);

        let s = store.summary();
        assert_eq!(s.total_alerts, store.len() as u64);
        assert_eq!(
            s.active_alerts + s.resolved_alerts + s.pending_alerts,
            s.total_alerts
        );
    }
}
