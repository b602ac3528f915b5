//! Occupancy forecast handlers.

use tabled::Tabled;

use campusflow_core::model::Forecast;
use campusflow_core::{Controller, LocationMarker};

use crate::cli::{GlobalOpts, SpaceflowArgs, SpaceflowCommand};
use crate::error::CliError;
use crate::output;

#[derive(Tabled)]
struct ForecastRow {
    #[tabled(rename = "ZONE")]
    zone: String,
    #[tabled(rename = "FORECAST")]
    forecast: u32,
    #[tabled(rename = "CONFIDENCE")]
    confidence: String,
    #[tabled(rename = "MODEL")]
    model: String,
}

impl ForecastRow {
    fn from(forecast: &Forecast) -> Self {
        Self {
            zone: forecast.zone.clone(),
            forecast: forecast.forecast_count,
            confidence: format!("{:.0}%", forecast.confidence * 100.0),
            model: forecast.model_version.clone(),
        }
    }
}

#[derive(Tabled)]
struct MarkerRow {
    #[tabled(rename = "ZONE")]
    zone: String,
    #[tabled(rename = "NAME")]
    name: String,
    #[tabled(rename = "KIND")]
    kind: String,
    #[tabled(rename = "OCCUPANCY")]
    occupancy: String,
    #[tabled(rename = "FORECAST")]
    forecast: u32,
    #[tabled(rename = "STATUS")]
    status: String,
}

impl MarkerRow {
    fn from(marker: &LocationMarker, color: bool) -> Self {
        Self {
            zone: marker.id.clone(),
            name: marker.name.clone(),
            kind: marker.kind.to_string(),
            occupancy: format!("{}/{}", marker.current_occupancy, marker.capacity),
            forecast: marker.forecast_count,
            status: output::occupancy_cell(marker.status, color),
        }
    }
}

pub async fn handle(
    controller: &Controller,
    args: SpaceflowArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let color = output::should_color(&global.color);

    let out = match args.command {
        SpaceflowCommand::Forecast { zones, horizon } => {
            let forecasts = controller.forecast(zones, horizon).await?;
            output::render_list(&global.output, &forecasts, ForecastRow::from, |f| {
                f.zone.clone()
            })
        }
        SpaceflowCommand::Map { horizon } => {
            let markers = controller.forecast_markers(horizon).await?;
            output::render_list(
                &global.output,
                &markers,
                |m| MarkerRow::from(m, color),
                |m| m.id.clone(),
            )
        }
    };

    output::print_output(&out, global.quiet);
    Ok(())
}
