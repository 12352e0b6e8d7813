// Visual presets for the two chart sizes
use serde::Deserialize;
use std::str::FromStr;

/// `#rrggbb` colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl FromStr for Rgb {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s.trim().trim_start_matches('#');
        if hex.len() != 6 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(format!("'{}' is not a #rrggbb colour", s));
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|e| e.to_string());
        Ok(Rgb(channel(0)?, channel(2)?, channel(4)?))
    }
}

impl<'de> Deserialize<'de> for Rgb {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Which x tick labels the configured rotation applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RotateTarget {
    #[default]
    Major,
    Minor,
    Both,
}

impl RotateTarget {
    pub fn major(self) -> bool {
        matches!(self, RotateTarget::Major | RotateTarget::Both)
    }

    pub fn minor(self) -> bool {
        matches!(self, RotateTarget::Minor | RotateTarget::Both)
    }
}

/// Line widths, sizes and paddings for one variant. Sizes are in pixels.
#[derive(Debug, Clone, Deserialize)]
pub struct VariantStyle {
    pub width: u32,
    pub height: u32,
    pub plot_line_width: u32,
    pub major_grid_line_width: u32,
    #[serde(default)]
    pub minor_grid_line_width: u32,
    pub title_size: f64,
    pub x_label_size: f64,
    pub y_label_size: f64,
    pub x_label_pad: u32,
    pub y_label_pad: u32,
    pub x_major_tick_label_size: f64,
    #[serde(default)]
    pub x_minor_tick_label_size: f64,
    pub y_tick_label_size: f64,
    #[serde(default)]
    pub rotate: RotateTarget,
}

impl VariantStyle {
    pub fn large() -> Self {
        Self {
            width: 1600,
            height: 1000,
            plot_line_width: 2,
            major_grid_line_width: 2,
            minor_grid_line_width: 1,
            title_size: 40.0,
            x_label_size: 30.0,
            y_label_size: 30.0,
            x_label_pad: 20,
            y_label_pad: 20,
            x_major_tick_label_size: 20.0,
            x_minor_tick_label_size: 14.0,
            y_tick_label_size: 20.0,
            rotate: RotateTarget::Both,
        }
    }

    pub fn thumb() -> Self {
        Self {
            width: 480,
            height: 320,
            plot_line_width: 1,
            major_grid_line_width: 1,
            minor_grid_line_width: 0,
            title_size: 18.0,
            x_label_size: 12.0,
            y_label_size: 12.0,
            x_label_pad: 4,
            y_label_pad: 4,
            x_major_tick_label_size: 10.0,
            x_minor_tick_label_size: 0.0,
            y_tick_label_size: 10.0,
            rotate: RotateTarget::Major,
        }
    }
}
