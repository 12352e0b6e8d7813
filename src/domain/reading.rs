// Environment readings and the series they form
use chrono::NaiveDateTime;
use std::fmt;

/// One row of the environment table. Timestamps are local wall-clock time,
/// to the second.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub timestamp: NaiveDateTime,
    pub humidity: f64,
    pub temperature: f64,
}

impl Sample {
    pub fn new(timestamp: NaiveDateTime, humidity: f64, temperature: f64) -> Self {
        Self {
            timestamp,
            humidity,
            temperature,
        }
    }

    pub fn value(&self, metric: Metric) -> f64 {
        match metric {
            Metric::Humidity => self.humidity,
            Metric::Temperature => self.temperature,
        }
    }
}

/// Samples in ascending timestamp order.
#[derive(Debug, Clone, Default)]
pub struct TimeSeries {
    samples: Vec<Sample>,
}

impl TimeSeries {
    /// Builds a series, sorting by timestamp if the source did not.
    pub fn new(mut samples: Vec<Sample>) -> Self {
        if !samples.is_sorted_by_key(|s| s.timestamp) {
            samples.sort_by_key(|s| s.timestamp);
        }
        Self { samples }
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn latest(&self) -> Option<NaiveDateTime> {
        self.samples.last().map(|s| s.timestamp)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Metric {
    Humidity,
    Temperature,
}

impl Metric {
    pub const ALL: [Metric; 2] = [Metric::Humidity, Metric::Temperature];

    pub fn name(self) -> &'static str {
        match self {
            Metric::Humidity => "Humidity",
            Metric::Temperature => "Temperature",
        }
    }

    /// Y axis tick label.
    pub fn format_value(self, value: f64) -> String {
        match self {
            Metric::Humidity => format!("{:.0}%", value),
            Metric::Temperature => format!("{:.1}", value),
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for Metric {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "humidity" | "rh" => Ok(Metric::Humidity),
            "temperature" | "temp" => Ok(Metric::Temperature),
            other => Err(format!("unknown metric '{}'", other)),
        }
    }
}

/// Size preset a chart is drawn at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Variant {
    Full,
    Thumbnail,
}

impl Variant {
    pub const ALL: [Variant; 2] = [Variant::Full, Variant::Thumbnail];

    pub fn file_suffix(self) -> &'static str {
        match self {
            Variant::Full => "",
            Variant::Thumbnail => "_thumb",
        }
    }
}
