use crate::domain::reading::{Metric, Variant};
use crate::domain::style::{Rgb, VariantStyle};
use crate::domain::timescale::TimescaleToken;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::PathBuf;

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub influx: InfluxSettings,
    #[serde(default)]
    pub graph: GraphConfig,
    #[serde(default)]
    pub sensor: SensorSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct InfluxSettings {
    pub host: String,
    pub token: String,
    pub database: String,
    pub retention_policy: String,
    #[serde(default = "default_measurement")]
    pub measurement: String,
}

fn default_measurement() -> String {
    "environment".to_string()
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct GraphConfig {
    /// Timescales rendered when none are given on the command line.
    pub time_scales: String,
    pub save_path: PathBuf,
    pub extension: String,
    pub humidity_color: Rgb,
    pub temperature_color: Rgb,
    /// Degrees; plotters can only honour quarter turns.
    pub tick_label_rotation: f64,
    pub large: VariantStyle,
    pub thumb: VariantStyle,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            time_scales: "15min, 6H, 3D".to_string(),
            save_path: PathBuf::from("graphs"),
            extension: "png".to_string(),
            humidity_color: Rgb(0x1f, 0x77, 0xb4),
            temperature_color: Rgb(0xd6, 0x27, 0x28),
            tick_label_rotation: 45.0,
            large: VariantStyle::large(),
            thumb: VariantStyle::thumb(),
        }
    }
}

impl GraphConfig {
    pub fn style(&self, variant: Variant) -> &VariantStyle {
        match variant {
            Variant::Full => &self.large,
            Variant::Thumbnail => &self.thumb,
        }
    }

    pub fn color(&self, metric: Metric) -> Rgb {
        match metric {
            Metric::Humidity => self.humidity_color,
            Metric::Temperature => self.temperature_color,
        }
    }

    /// `{save_path}/{token}_{metric}[_thumb].{extension}`; re-rendering
    /// overwrites the previous chart.
    pub fn artifact_path(&self, token: TimescaleToken, metric: Metric, variant: Variant) -> PathBuf {
        self.save_path.join(format!(
            "{}_{}{}.{}",
            token,
            metric,
            variant.file_suffix(),
            self.extension
        ))
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct SensorSettings {
    /// Seconds between render passes in watch mode.
    pub interval_secs: u64,
}

impl Default for SensorSettings {
    fn default() -> Self {
        Self { interval_secs: 60 }
    }
}

/// Loads `path` (any format the `config` crate recognises by extension),
/// then applies `ECS__SECTION__KEY` environment overrides.
pub fn load_config(path: &str) -> anyhow::Result<AppConfig> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name(path))
        .add_source(
            config::Environment::with_prefix("ECS")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    Ok(settings.try_deserialize()?)
}

/// Replace template variables in a query string
pub fn prepare_query(query: &str, vars: &HashMap<String, String>) -> String {
    let mut result = query.to_string();
    for (key, value) in vars {
        let placeholder = format!("${{{}}}", key);
        result = result.replace(&placeholder, value);
    }
    result
}
