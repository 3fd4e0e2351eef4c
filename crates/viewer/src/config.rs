use foundation::time::YearRange;
use layers::ChoroplethStyle;
use scene::navigation::OrbitSettings;
use serde::{Deserialize, Serialize};

/// Viewer settings. Every field has a default, so hosts may pass a partial
/// JSON object (camelCase keys) or nothing at all.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ViewerConfig {
    pub year_min: i32,
    pub year_max: i32,
    /// Defaults to `year_min`.
    pub initial_year: Option<i32>,
    pub autoplay: bool,
    /// Seconds per year while playing.
    pub tick_period_s: f64,
    /// Passive globe rotation in radians per frame.
    pub auto_rotate_speed: f64,
    pub min_altitude: f64,
    pub max_altitude: f64,
    pub globe_radius: f64,
    pub camera_distance: f64,
    pub fov_deg: f64,
    pub near: f64,
    pub far: f64,
    pub orbit_damping: f64,
    pub tooltip_offset_px: f64,
    pub tooltip_padding_px: f64,
    pub value_prefix: String,
    pub boundaries_url: String,
    /// Backend origin; `None` resolves the series endpoint relative to the page.
    pub api_base_url: Option<String>,
    pub series_endpoint: String,
    pub start_year: Option<i32>,
    pub end_year: Option<i32>,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            year_min: 1990,
            year_max: 2023,
            initial_year: None,
            autoplay: true,
            tick_period_s: 1.0,
            auto_rotate_speed: 0.0008,
            min_altitude: 0.003,
            max_altitude: 0.03,
            globe_radius: 100.0,
            camera_distance: 250.0,
            fov_deg: 60.0,
            near: 0.1,
            far: 1000.0,
            orbit_damping: 0.05,
            tooltip_offset_px: 12.0,
            tooltip_padding_px: 10.0,
            value_prefix: "$".to_string(),
            boundaries_url: "countries.geojson".to_string(),
            api_base_url: None,
            series_endpoint: "country-ppp".to_string(),
            start_year: None,
            end_year: None,
        }
    }
}

impl ViewerConfig {
    /// Parses a JSON override. Blank input yields the defaults.
    pub fn from_json_str(payload: &str) -> Result<Self, serde_json::Error> {
        if payload.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_json::from_str(payload)
    }

    pub fn year_range(&self) -> YearRange {
        YearRange::new(self.year_min, self.year_max)
    }

    pub fn initial_year(&self) -> i32 {
        let range = self.year_range();
        range.clamp(self.initial_year.unwrap_or(range.min()))
    }

    /// URL of the time series endpoint, with optional year bounds.
    pub fn series_url(&self) -> String {
        let endpoint = self.series_endpoint.trim_start_matches('/');
        let mut url = match self.api_base_url.as_deref().map(str::trim) {
            Some(base) if !base.is_empty() => {
                format!("{}/{endpoint}", base.trim_end_matches('/'))
            }
            _ => endpoint.to_string(),
        };

        let params: Vec<String> = [("startYear", self.start_year), ("endYear", self.end_year)]
            .into_iter()
            .filter_map(|(key, year)| year.map(|y| format!("{key}={y}")))
            .collect();
        if !params.is_empty() {
            url.push('?');
            url.push_str(&params.join("&"));
        }
        url
    }

    pub fn choropleth_style(&self) -> ChoroplethStyle {
        let mut style = ChoroplethStyle {
            min_altitude: self.min_altitude,
            max_altitude: self.max_altitude,
            ..ChoroplethStyle::default()
        };
        style.fallback.lift = self.min_altitude;
        style
    }

    pub fn orbit_settings(&self) -> OrbitSettings {
        OrbitSettings {
            damping: self.orbit_damping,
            fov_y_rad: self.fov_deg.to_radians(),
            near: self.near,
            far: self.far,
            ..OrbitSettings::default()
        }
    }
}
