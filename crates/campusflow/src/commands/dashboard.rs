//! Dashboard statistics and analytics handlers.

use campusflow_core::Controller;
use campusflow_core::model::DashboardStats;

use crate::cli::{DashboardArgs, DashboardCommand, GlobalOpts, OutputFormat};
use crate::error::CliError;
use crate::output;

fn stats_detail(stats: &DashboardStats) -> String {
    format!(
        "Total entities:       {}\n\
         Active today:         {}\n\
         Total activities:     {}\n\
         Resolution accuracy:  {:.1}%",
        stats.total_entities,
        stats.active_today,
        stats.total_activities,
        stats.resolution_accuracy * 100.0,
    )
}

/// Render dynamic analytics payloads. Their fields vary by backend
/// version, so table mode falls back to pretty JSON.
fn render_dynamic(data: &serde_json::Value, format: &OutputFormat) -> String {
    match format {
        OutputFormat::JsonCompact => output::render_json_compact(data),
        OutputFormat::Yaml => output::render_yaml(data),
        _ => output::render_json_pretty(data),
    }
}

pub async fn handle(
    controller: &Controller,
    args: DashboardArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let out = match args.command {
        DashboardCommand::Stats => {
            let snapshot = controller.dashboard_stats().await?;
            output::render_single(&global.output, snapshot.value.as_ref(), stats_detail, |s| {
                s.total_entities.to_string()
            })
        }
        DashboardCommand::Heatmap { days } => {
            let snapshot = controller.activity_heatmap(days).await?;
            render_dynamic(&snapshot.value, &global.output)
        }
        DashboardCommand::Weekly => {
            let snapshot = controller.weekly_activity().await?;
            render_dynamic(&snapshot.value, &global.output)
        }
        DashboardCommand::Sources => {
            let snapshot = controller.source_distribution().await?;
            render_dynamic(&snapshot.value, &global.output)
        }
    };

    output::print_output(&out, global.quiet);
    Ok(())
}

pub async fn handle_health(controller: &Controller, global: &GlobalOpts) -> Result<(), CliError> {
    let snapshot = controller.health().await?;
    let out = output::render_single(
        &global.output,
        snapshot.value.as_ref(),
        |h| format!("Backend status: {}", h.status),
        |h| h.status.clone(),
    );
    output::print_output(&out, global.quiet);
    Ok(())
}
