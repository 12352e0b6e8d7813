// In-memory collaborators for exercising the render pipeline without a
// database or a font stack
use crate::application::render_job::{ChartRenderer, RenderJob};
use crate::application::series_store::SeriesStore;
use crate::domain::error::GraphError;
use crate::domain::reading::{Sample, TimeSeries};
use crate::domain::window::WindowSpec;
use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime, TimeDelta};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Newest sample of every generated series.
pub fn series_end() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 6, 10)
        .unwrap()
        .and_hms_opt(12, 0, 0)
        .unwrap()
}

/// `count` evenly spaced samples covering `span` and ending at `series_end()`.
pub fn series_spanning(count: usize, span: TimeDelta) -> TimeSeries {
    let start = series_end() - span;
    let gaps = (count.max(2) - 1) as i32;
    TimeSeries::new(
        (0..count)
            .map(|i| {
                let t = if i + 1 == count {
                    series_end()
                } else {
                    start + span / gaps * i as i32
                };
                let phase = i as f64 / 10.0;
                Sample::new(t, 45.0 + 10.0 * phase.sin(), 70.0 + 5.0 * phase.cos())
            })
            .collect(),
    )
}

#[derive(Default)]
pub struct MemoryStore {
    samples: Mutex<Vec<Sample>>,
    windows: Mutex<Vec<WindowSpec>>,
    unavailable: bool,
}

impl MemoryStore {
    pub fn with_series(series: &TimeSeries) -> Self {
        Self {
            samples: Mutex::new(series.samples().to_vec()),
            ..Self::default()
        }
    }

    pub fn unavailable() -> Self {
        Self {
            unavailable: true,
            ..Self::default()
        }
    }

    /// Windows passed to `fetch`, in call order.
    pub fn windows(&self) -> Vec<WindowSpec> {
        self.windows.lock().unwrap().clone()
    }

    pub fn samples(&self) -> Vec<Sample> {
        self.samples.lock().unwrap().clone()
    }
}

#[async_trait]
impl SeriesStore for MemoryStore {
    async fn ping(&self) -> Result<(), GraphError> {
        if self.unavailable {
            return Err(GraphError::StoreUnavailable("connection refused".to_string()));
        }
        Ok(())
    }

    async fn fetch(&self, window: &WindowSpec) -> Result<TimeSeries, GraphError> {
        self.ping().await?;
        self.windows.lock().unwrap().push(*window);

        let rows: Vec<Sample> = self
            .samples
            .lock()
            .unwrap()
            .iter()
            .filter(|s| s.timestamp >= window.start && s.timestamp <= window.end)
            .copied()
            .collect();

        if rows.is_empty() {
            return Err(GraphError::EmptyResult {
                start: window.start.to_string(),
                end: window.end.to_string(),
            });
        }
        Ok(TimeSeries::new(rows))
    }

    async fn record(&self, sample: &Sample) -> Result<(), GraphError> {
        self.ping().await?;
        self.samples.lock().unwrap().push(*sample);
        Ok(())
    }
}

/// Writes a one-line text file in place of a chart.
#[derive(Default)]
pub struct StubRenderer {
    fail_on: Option<String>,
    panic_on: Option<String>,
    rendered: AtomicUsize,
}

impl StubRenderer {
    pub fn failing_on(job: &str) -> Self {
        Self {
            fail_on: Some(job.to_string()),
            ..Self::default()
        }
    }

    pub fn panicking_on(job: &str) -> Self {
        Self {
            panic_on: Some(job.to_string()),
            ..Self::default()
        }
    }

    pub fn rendered(&self) -> usize {
        self.rendered.load(Ordering::SeqCst)
    }
}

impl ChartRenderer for StubRenderer {
    fn render(&self, job: &RenderJob) -> Result<(), GraphError> {
        let name = job.to_string();
        if self.panic_on.as_deref() == Some(name.as_str()) {
            panic!("renderer crashed on {name}");
        }
        if self.fail_on.as_deref() == Some(name.as_str()) {
            return Err(GraphError::RenderWrite {
                path: job.path.clone(),
                reason: "disk full".to_string(),
            });
        }

        let line = format!("{} {} samples\n", job.title(), job.slice.len());
        std::fs::write(&job.path, line).map_err(|e| GraphError::RenderWrite {
            path: job.path.clone(),
            reason: e.to_string(),
        })?;
        self.rendered.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
