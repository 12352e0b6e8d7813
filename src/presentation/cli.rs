// Command line arguments
use crate::domain::reading::Metric;
use chrono::NaiveDateTime;
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "ecs-graph")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Record environment readings and render humidity/temperature charts")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Configuration file, extension optional
    #[arg(short, long, default_value = "config/ecs", global = true)]
    pub config: String,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Render charts once and exit
    Render {
        /// Timescales, e.g. "15min, 6H, 3D" (default: graph.time_scales)
        #[arg(short, long)]
        scales: Option<String>,
        /// Only render these metrics (humidity, temperature)
        #[arg(short, long, value_delimiter = ',')]
        metric: Vec<Metric>,
    },

    /// Re-render every sensor.interval_secs, re-reading the configuration
    /// each pass
    Watch {
        #[arg(short, long)]
        scales: Option<String>,
    },

    /// Store one reading
    Record {
        /// Relative humidity, percent
        #[arg(long)]
        humidity: f64,
        /// Temperature
        #[arg(long)]
        temperature: f64,
        /// Reading time, "YYYY-MM-DD HH:MM:SS" local (default: now)
        #[arg(long, value_parser = parse_timestamp)]
        at: Option<NaiveDateTime>,
    },

    /// Check the series store is reachable
    Ping,
}

fn parse_timestamp(s: &str) -> Result<NaiveDateTime, String> {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").map_err(|e| e.to_string())
}
