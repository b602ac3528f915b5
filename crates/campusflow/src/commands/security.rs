//! Security monitoring handlers.

use campusflow_core::Controller;
use campusflow_core::model::SecurityStats;

use crate::cli::{GlobalOpts, OutputFormat, SecurityArgs, SecurityCommand};
use crate::error::CliError;
use crate::output;

fn stats_detail(stats: &SecurityStats) -> String {
    format!(
        "Active threats:     {}\n\
         Resolved today:     {}\n\
         Monitored zones:    {}\n\
         Access violations:  {}\n\
         Swipes today:       {}\n\
         CCTV frames today:  {}",
        stats.active_threats,
        stats.resolved_today,
        stats.monitored_zones,
        stats.access_violations,
        stats.total_swipes_today,
        stats.total_cctv_frames_today,
    )
}

/// Inactive-entity and history payloads vary by backend version; table
/// mode falls back to pretty JSON.
fn render_dynamic(data: &serde_json::Value, format: &OutputFormat) -> String {
    match format {
        OutputFormat::JsonCompact => output::render_json_compact(data),
        OutputFormat::Yaml => output::render_yaml(data),
        _ => output::render_json_pretty(data),
    }
}

pub async fn handle(
    controller: &Controller,
    args: SecurityArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let out = match args.command {
        SecurityCommand::Stats => {
            let snapshot = controller.security_stats().await?;
            output::render_single(&global.output, snapshot.value.as_ref(), stats_detail, |s| {
                s.active_threats.to_string()
            })
        }
        SecurityCommand::Inactive => {
            let snapshot = controller.inactive_entities().await?;
            render_dynamic(&snapshot.value, &global.output)
        }
        SecurityCommand::History { entity_id } => {
            let snapshot = controller.entity_history(&entity_id).await?;
            render_dynamic(&snapshot.value, &global.output)
        }
    };

    output::print_output(&out, global.quiet);
    Ok(())
}
