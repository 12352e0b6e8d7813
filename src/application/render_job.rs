// A single chart: one timescale, one metric, one size
use crate::domain::error::GraphError;
use crate::domain::reading::{Metric, Variant};
use crate::domain::slice::SeriesSlice;
use crate::domain::style::{Rgb, VariantStyle};
use crate::domain::tick_plan::TickPlan;
use crate::domain::timescale::TimescaleToken;
use std::fmt;
use std::path::PathBuf;

/// Draws a job to its output path. Implementations own their drawing
/// surface, so one renderer can serve many jobs at once.
pub trait ChartRenderer: Send + Sync {
    fn render(&self, job: &RenderJob) -> Result<(), GraphError>;
}

#[derive(Debug, Clone)]
pub struct RenderJob {
    pub token: TimescaleToken,
    pub metric: Metric,
    pub variant: Variant,
    pub slice: SeriesSlice,
    pub plan: TickPlan,
    pub style: VariantStyle,
    pub color: Rgb,
    pub path: PathBuf,
}

/// A chart that made it to disk.
#[derive(Debug, Clone, PartialEq)]
pub struct Artifact {
    pub token: TimescaleToken,
    pub path: PathBuf,
    pub samples: usize,
    /// Drawn without a data line because the slice had fewer than two samples.
    pub placeholder: bool,
}

impl RenderJob {
    pub fn title(&self) -> String {
        format!("{} - {}", self.token, self.metric)
    }

    pub fn execute(&self, renderer: &dyn ChartRenderer) -> Result<Artifact, GraphError> {
        let placeholder = self.slice.is_degenerate();
        if placeholder {
            tracing::warn!("{}: {} sample(s) in range, drawing a placeholder", self, self.slice.len());
        }

        renderer.render(self)?;
        tracing::info!("Created: {}", self.path.display());

        Ok(Artifact {
            token: self.token,
            path: self.path.clone(),
            samples: self.slice.len(),
            placeholder,
        })
    }
}

impl fmt::Display for RenderJob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}{}", self.token, self.metric, self.variant.file_suffix())
    }
}
