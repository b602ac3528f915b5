//! Alert feed and lifecycle handlers.

use tabled::Tabled;

use campusflow_core::{Alert, AlertStatus, AlertsSummary, Controller};

use crate::cli::{AlertsArgs, AlertsCommand, GlobalOpts, OutputFormat};
use crate::error::CliError;
use crate::output;

// ── Table rows ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct AlertRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "SEVERITY")]
    severity: String,
    #[tabled(rename = "TYPE")]
    kind: String,
    #[tabled(rename = "ZONE")]
    zone: String,
    #[tabled(rename = "STATUS")]
    status: String,
    #[tabled(rename = "TIME")]
    time: String,
    #[tabled(rename = "TITLE")]
    title: String,
}

impl AlertRow {
    fn from(alert: &Alert, color: bool) -> Self {
        Self {
            id: alert.id.clone(),
            severity: output::severity_cell(alert.severity, color),
            kind: alert.kind.to_string(),
            zone: alert.zone.clone().unwrap_or_else(|| "-".into()),
            status: output::status_cell(alert.status, color),
            time: alert.timestamp.format("%Y-%m-%d %H:%M").to_string(),
            title: alert.title.clone(),
        }
    }
}

// ── Detail view ──────────────────────────────────────────────────────

fn alert_detail(alert: &Alert) -> String {
    let mut out = format!(
        "Alert:       {}\n\
         Title:       {}\n\
         Type:        {}\n\
         Severity:    {} ({:.2})\n\
         Status:      {}\n\
         Zone:        {}\n\
         Entity:      {}\n\
         Time:        {}\n\
         Description: {}",
        alert.id,
        alert.title,
        alert.kind,
        alert.severity,
        alert.severity_score,
        alert.status,
        alert.zone.as_deref().unwrap_or("-"),
        alert.entity_id.as_deref().unwrap_or("-"),
        alert.timestamp.format("%Y-%m-%d %H:%M:%S"),
        alert.description,
    );

    if let Some(resolved_at) = alert.resolved_at {
        out.push_str(&format!(
            "\nResolved:    {} by {}",
            resolved_at.format("%Y-%m-%d %H:%M:%S"),
            alert.resolved_by.as_deref().unwrap_or("-"),
        ));
    }

    if !alert.evidence.is_empty() {
        out.push_str("\n\nEvidence:");
        for evidence in &alert.evidence {
            out.push_str(&format!(
                "\n  [{:.2}] {}/{} {}",
                evidence.weight, evidence.source, evidence.id, evidence.description,
            ));
        }
    }

    if !alert.recommended_actions.is_empty() {
        out.push_str("\n\nRecommended actions:");
        for action in &alert.recommended_actions {
            out.push_str(&format!(
                "\n  [{:.2}] {} -- {}",
                action.impact_score, action.title, action.expected_effect,
            ));
        }
    }
    out
}

fn summary_line(summary: AlertsSummary) -> String {
    format!(
        "{} alerts: {} active, {} investigating, {} resolved",
        summary.total_alerts,
        summary.active_alerts,
        summary.pending_alerts,
        summary.resolved_alerts,
    )
}

// ── Handler ──────────────────────────────────────────────────────────

pub async fn handle(
    controller: &Controller,
    args: AlertsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let color = output::should_color(&global.color);

    let out = match args.command {
        AlertsCommand::List { status, limit } => {
            let snapshot = controller.alerts(status.map(Into::into), limit).await?;
            let feed = snapshot.value.as_ref();

            let mut out = output::render_list(
                &global.output,
                &feed.alerts,
                |a| AlertRow::from(a, color),
                |a| a.id.clone(),
            );
            if matches!(global.output, OutputFormat::Table) {
                out.push('\n');
                out.push_str(&summary_line(AlertsSummary::of(&feed.alerts)));
            }
            out
        }
        AlertsCommand::Show { alert_id } => {
            let snapshot = controller.alerts(None, None).await?;
            let alert = snapshot
                .value
                .alerts
                .iter()
                .find(|a| a.id == alert_id)
                .ok_or_else(|| CliError::NotFound {
                    resource_type: "alert".into(),
                    identifier: alert_id.clone(),
                    list_command: "alerts list".into(),
                })?;
            output::render_single(&global.output, alert, alert_detail, |a| a.id.clone())
        }
        AlertsCommand::Resolve { alert_id } => {
            let alert = controller.resolve_alert(&alert_id).await?;
            format!("Alert {} is now {}", alert.id, alert.status)
        }
        AlertsCommand::Investigate { alert_id } => {
            let alert = controller
                .update_alert_status(&alert_id, AlertStatus::Investigating)
                .await?;
            format!("Alert {} is now {}", alert.id, alert.status)
        }
        AlertsCommand::Reopen { alert_id } => {
            let alert = controller
                .update_alert_status(&alert_id, AlertStatus::Active)
                .await?;
            format!("Alert {} is now {}", alert.id, alert.status)
        }
    };

    output::print_output(&out, global.quiet);
    Ok(())
}
