//! Entity listing, search, resolution, and timeline handlers.

use chrono::{DateTime, Utc};
use tabled::Tabled;

use campusflow_core::model::{ActivityTimeline, EntityDetails, EntityResolution, Profile};
use campusflow_core::{Controller, Entity, ResolveSelector};

use crate::cli::{EntitiesArgs, EntitiesCommand, GlobalOpts, OutputFormat};
use crate::error::CliError;
use crate::output;

fn fmt_time(time: Option<DateTime<Utc>>) -> String {
    time.map_or_else(|| "-".into(), |t| t.format("%Y-%m-%d %H:%M").to_string())
}

// ── Table rows ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct EntityRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "NAME")]
    name: String,
    #[tabled(rename = "ROLE")]
    role: String,
    #[tabled(rename = "DEPARTMENT")]
    department: String,
    #[tabled(rename = "STATUS")]
    status: String,
    #[tabled(rename = "LAST SEEN")]
    last_seen: String,
    #[tabled(rename = "CONFIDENCE")]
    confidence: String,
}

impl EntityRow {
    fn from(entity: &Entity) -> Self {
        Self {
            id: entity.profile.entity_id.clone(),
            name: entity.profile.name.clone(),
            role: entity.profile.role.clone(),
            department: entity.profile.department.clone(),
            status: entity.status.to_string(),
            last_seen: fmt_time(entity.last_seen),
            confidence: format!("{:.0}%", entity.confidence * 100.0),
        }
    }
}

#[derive(Tabled)]
struct ProfileRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "NAME")]
    name: String,
    #[tabled(rename = "ROLE")]
    role: String,
    #[tabled(rename = "EMAIL")]
    email: String,
    #[tabled(rename = "DEPARTMENT")]
    department: String,
}

impl ProfileRow {
    fn from(profile: &Profile) -> Self {
        Self {
            id: profile.entity_id.clone(),
            name: profile.name.clone(),
            role: profile.role.clone(),
            email: profile.email.clone(),
            department: profile.department.clone(),
        }
    }
}

// ── Detail views ─────────────────────────────────────────────────────

fn entity_detail(details: &EntityDetails) -> String {
    let mut out = format!(
        "Entity:        {} ({})\n\
         Role:          {} / {}\n\
         Status:        {}\n\
         Last seen:     {}\n\
         Last location: {}\n\
         \n\
         Activity (swipes/wifi/labs/library): {}/{}/{}/{}",
        details.profile.name,
        details.profile.entity_id,
        details.profile.role,
        details.profile.department,
        details.status,
        fmt_time(details.last_seen),
        details.last_location.as_deref().unwrap_or("-"),
        details.activity_summary.swipes,
        details.activity_summary.wifi_connections,
        details.activity_summary.lab_bookings,
        details.activity_summary.library_checkouts,
    );

    if !details.recent_activities.is_empty() {
        out.push_str("\n\nRecent activity:");
        for activity in &details.recent_activities {
            out.push_str(&format!(
                "\n  {}  {:12} {}",
                activity.timestamp.format("%Y-%m-%d %H:%M"),
                activity.activity_type,
                activity.location,
            ));
        }
    }
    out
}

fn resolution_detail(resolution: &EntityResolution) -> String {
    format!(
        "Resolved:    {} ({})\n\
         Confidence:  {:.0}%\n\
         Sources:     {}",
        resolution.profile.name,
        resolution.entity_id,
        resolution.confidence * 100.0,
        if resolution.matched_sources.is_empty() {
            "-".into()
        } else {
            resolution.matched_sources.join(", ")
        },
    )
}

fn timeline_detail(timeline: &ActivityTimeline) -> String {
    format!(
        "Entity:            {}\n\
         Period:            last {} days\n\
         Swipes:            {}\n\
         WiFi associations: {}\n\
         Lab bookings:      {}\n\
         Library checkouts: {}\n\
         Total activities:  {}",
        timeline.entity_id,
        timeline.period_days,
        timeline.swipes.len(),
        timeline.wifi_logs.len(),
        timeline.lab_bookings.len(),
        timeline.library_checkouts.len(),
        timeline.total_activities,
    )
}

/// The bundled entities-with-timeline payload varies by backend
/// version; table mode falls back to pretty JSON.
fn render_dynamic(data: &serde_json::Value, format: &OutputFormat) -> String {
    match format {
        OutputFormat::JsonCompact => output::render_json_compact(data),
        OutputFormat::Yaml => output::render_yaml(data),
        _ => output::render_json_pretty(data),
    }
}

// ── Handler ──────────────────────────────────────────────────────────

pub async fn handle(
    controller: &Controller,
    args: EntitiesArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let out = match args.command {
        EntitiesCommand::List { limit, offset } => {
            let snapshot = controller.entities(limit, offset).await?;
            output::render_list(&global.output, &snapshot.value, EntityRow::from, |e| {
                e.profile.entity_id.clone()
            })
        }
        EntitiesCommand::Show { entity_id } => {
            let snapshot = controller.entity(&entity_id).await?;
            output::render_single(&global.output, snapshot.value.as_ref(), entity_detail, |d| {
                d.profile.entity_id.clone()
            })
        }
        EntitiesCommand::Timelines => {
            let snapshot = controller.entities_with_timeline().await?;
            render_dynamic(&snapshot.value, &global.output)
        }
        EntitiesCommand::Search { query, field } => {
            let snapshot = controller.search_profiles(&query, &field).await?;
            output::render_list(&global.output, &snapshot.value, ProfileRow::from, |p| {
                p.entity_id.clone()
            })
        }
        EntitiesCommand::Timeline { entity_id, days } => {
            let snapshot = controller.timeline(&entity_id, days).await?;
            output::render_single(
                &global.output,
                snapshot.value.as_ref(),
                timeline_detail,
                |t| t.entity_id.clone(),
            )
        }
        EntitiesCommand::Resolve {
            card_id,
            device_hash,
            face_id,
        } => {
            let selector = ResolveSelector {
                card_id,
                device_hash,
                face_id,
            };
            let snapshot = controller.resolve(&selector).await?;
            output::render_single(
                &global.output,
                snapshot.value.as_ref(),
                resolution_detail,
                |r| r.entity_id.clone(),
            )
        }
    };

    output::print_output(&out, global.quiet);
    Ok(())
}
