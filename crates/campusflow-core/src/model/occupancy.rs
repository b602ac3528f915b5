// ── SpaceFlow occupancy types ──
//
// The backend forecasts headcounts; the crowding classification is a
// client-side derivation and is recomputed after every forecast refresh.

use serde::{Deserialize, Serialize};

use super::Forecast;

/// Campus zone category.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ZoneKind {
    Lab,
    Hostel,
    Library,
    Canteen,
    Sports,
    Academic,
    Admin,
}

/// Crowding classification for a zone, derived from
/// `forecast_count / capacity`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, strum::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum OccupancyStatus {
    Normal,
    Warning,
    Crowded,
    Critical,
}

impl OccupancyStatus {
    /// Thresholds: > 90% critical, > 75% crowded, > 60% warning.
    pub fn classify(forecast_count: u32, capacity: u32) -> Self {
        if capacity == 0 {
            // A zone with no capacity is critical the moment anyone is
            // forecast into it.
            return if forecast_count > 0 {
                Self::Critical
            } else {
                Self::Normal
            };
        }
        let ratio = f64::from(forecast_count) / f64::from(capacity);
        if ratio > 0.9 {
            Self::Critical
        } else if ratio > 0.75 {
            Self::Crowded
        } else if ratio > 0.6 {
            Self::Warning
        } else {
            Self::Normal
        }
    }
}

/// A zone on the campus map.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationMarker {
    pub id: String,
    pub name: String,
    pub kind: ZoneKind,
    /// Map position as percentages of the canvas.
    pub x: f64,
    pub y: f64,
    pub current_occupancy: u32,
    pub capacity: u32,
    pub forecast_count: u32,
    pub confidence: f64,
    pub status: OccupancyStatus,
}

impl LocationMarker {
    /// Fold a fresh backend forecast into this marker and reclassify.
    pub fn apply_forecast(&mut self, forecast: &Forecast) {
        self.forecast_count = forecast.forecast_count;
        self.confidence = forecast.confidence;
        self.status = OccupancyStatus::classify(self.forecast_count, self.capacity);
    }

    #[allow(clippy::too_many_arguments)]
    fn new(
        id: &str,
        name: &str,
        kind: ZoneKind,
        x: f64,
        y: f64,
        current_occupancy: u32,
        capacity: u32,
        forecast_count: u32,
        confidence: f64,
    ) -> Self {
        Self {
            id: id.to_owned(),
            name: name.to_owned(),
            kind,
            x,
            y,
            current_occupancy,
            capacity,
            forecast_count,
            confidence,
            status: OccupancyStatus::classify(forecast_count, capacity),
        }
    }

    /// The built-in campus map. Forecast counts here are the last-known
    /// values shipped with the client; a forecast refresh replaces them.
    #[allow(clippy::too_many_lines)]
    pub fn campus_defaults() -> Vec<Self> {
        vec![
            Self::new("core1", "Core 1 (Maths)", ZoneKind::Academic, 43.0, 55.0, 85, 120, 95, 0.82),
            Self::new("core2", "Core 2 (Physics)", ZoneKind::Academic, 47.0, 50.0, 72, 100, 88, 0.79),
            Self::new("core3", "Core 3 (Chemistry)", ZoneKind::Academic, 51.0, 45.0, 65, 100, 70, 0.85),
            Self::new("core4", "Core 4 (HSS)", ZoneKind::Academic, 55.0, 40.0, 45, 80, 52, 0.76),
            Self::new("core5", "Core 5 (Admin)", ZoneKind::Admin, 59.0, 35.0, 30, 60, 35, 0.72),
            Self::new("cse", "CSE Department", ZoneKind::Academic, 68.0, 48.0, 120, 150, 142, 0.88),
            Self::new("eee", "EEE Department", ZoneKind::Academic, 72.0, 55.0, 95, 120, 108, 0.84),
            Self::new("mech", "Mechanical Dept", ZoneKind::Academic, 63.0, 62.0, 78, 100, 82, 0.80),
            Self::new("cselab", "CS Lab Complex", ZoneKind::Lab, 70.0, 42.0, 65, 80, 76, 0.91),
            Self::new("eeelab", "EEE Labs", ZoneKind::Lab, 76.0, 50.0, 42, 60, 48, 0.78),
            Self::new("bh1", "Boys Hostel 1", ZoneKind::Hostel, 18.0, 38.0, 180, 200, 195, 0.94),
            Self::new("bh2", "Boys Hostel 2", ZoneKind::Hostel, 16.0, 48.0, 175, 200, 188, 0.92),
            Self::new("bh3", "Boys Hostel 3", ZoneKind::Hostel, 14.0, 58.0, 165, 200, 178, 0.90),
            Self::new("gh1", "Girls Hostel 1", ZoneKind::Hostel, 78.0, 22.0, 145, 180, 160, 0.89),
            Self::new("gh2", "Girls Hostel 2", ZoneKind::Hostel, 83.0, 28.0, 138, 180, 152, 0.87),
            Self::new("library", "Central Library", ZoneKind::Library, 52.0, 58.0, 250, 300, 285, 0.86),
            Self::new("kc", "Khokha Complex", ZoneKind::Canteen, 46.0, 65.0, 85, 150, 128, 0.75),
            Self::new("fc", "Food Court", ZoneKind::Canteen, 56.0, 68.0, 92, 120, 105, 0.77),
            Self::new("stadium", "Sports Stadium", ZoneKind::Sports, 28.0, 68.0, 45, 200, 38, 0.68),
            Self::new("gym", "Gymnasium", ZoneKind::Sports, 36.0, 64.0, 35, 80, 42, 0.71),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use campusflow_api::types::ForecastExplanation;

    #[test]
    fn classification_thresholds() {
        assert_eq!(OccupancyStatus::classify(95, 100), OccupancyStatus::Critical);
        assert_eq!(OccupancyStatus::classify(80, 100), OccupancyStatus::Crowded);
        assert_eq!(OccupancyStatus::classify(61, 100), OccupancyStatus::Warning);
        assert_eq!(OccupancyStatus::classify(60, 100), OccupancyStatus::Normal);
        assert_eq!(OccupancyStatus::classify(0, 100), OccupancyStatus::Normal);
    }

    #[test]
    fn boundary_values_are_exclusive() {
        // Exactly 90% / 75% stay in the lower band.
        assert_eq!(OccupancyStatus::classify(90, 100), OccupancyStatus::Crowded);
        assert_eq!(OccupancyStatus::classify(75, 100), OccupancyStatus::Warning);
    }

    #[test]
    fn zero_capacity_zone() {
        assert_eq!(OccupancyStatus::classify(5, 0), OccupancyStatus::Critical);
        assert_eq!(OccupancyStatus::classify(0, 0), OccupancyStatus::Normal);
    }

    #[test]
    fn forecast_refresh_reclassifies() {
        let mut marker = LocationMarker::new(
            "library",
            "Central Library",
            ZoneKind::Library,
            52.0,
            58.0,
            250,
            300,
            180,
            0.8,
        );
        assert_eq!(marker.status, OccupancyStatus::Normal);

        marker.apply_forecast(&Forecast {
            zone: "library".into(),
            forecast_count: 285,
            confidence: 0.86,
            model_version: "spaceflow-v3".into(),
            provenance: Vec::new(),
            explanation: ForecastExplanation::default(),
        });

        assert_eq!(marker.forecast_count, 285);
        assert_eq!(marker.status, OccupancyStatus::Critical);
    }

    #[test]
    fn default_map_has_unique_zone_ids() {
        let markers = LocationMarker::campus_defaults();
        let mut ids: Vec<&str> = markers.iter().map(|m| m.id.as_str()).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), markers.len());
    }
}
