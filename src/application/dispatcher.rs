// Fan-out of render jobs over (timescale, metric, variant)
use crate::application::render_job::{Artifact, ChartRenderer, RenderJob};
use crate::domain::error::GraphError;
use crate::domain::reading::{Metric, TimeSeries, Variant};
use crate::domain::slice::SeriesSlice;
use crate::domain::tick_plan::TickPlan;
use crate::domain::timescale::TimescaleToken;
use crate::infrastructure::config::GraphConfig;
use futures::future::join_all;
use std::sync::Arc;
use tokio::task::JoinHandle;

#[derive(Clone)]
pub struct Dispatcher {
    renderer: Arc<dyn ChartRenderer>,
    graph: Arc<GraphConfig>,
}

impl Dispatcher {
    pub fn new(renderer: Arc<dyn ChartRenderer>, graph: Arc<GraphConfig>) -> Self {
        Self { renderer, graph }
    }

    /// Starts one blocking task per (token, metric, variant) and returns as
    /// soon as they are all running.
    ///
    /// Jobs share `series` read-only. Dropping the returned `Dispatch` leaves
    /// them running; awaiting `Dispatch::wait` collects the outcome. Must be
    /// called inside a Tokio runtime.
    pub fn dispatch(
        &self,
        series: Arc<TimeSeries>,
        tokens: &[TimescaleToken],
        metrics: &[Metric],
        variants: &[Variant],
    ) -> Dispatch {
        let mut jobs = Vec::with_capacity(tokens.len() * metrics.len() * variants.len());

        for &token in tokens {
            let slice = SeriesSlice::trailing(&series, token);
            tracing::debug!("Slice {}: {} of {} samples", token, slice.len(), series.len());

            for &variant in variants {
                let style = self.graph.style(variant);
                let plan = TickPlan::plan(token, variant, style, self.graph.tick_label_rotation);

                for &metric in metrics {
                    let job = RenderJob {
                        token,
                        metric,
                        variant,
                        slice: slice.clone(),
                        plan: plan.clone(),
                        style: style.clone(),
                        color: self.graph.color(metric),
                        path: self.graph.artifact_path(token, metric, variant),
                    };
                    let name = job.to_string();
                    let renderer = self.renderer.clone();

                    let handle = tokio::task::spawn_blocking(move || {
                        job.execute(renderer.as_ref()).inspect_err(|e| {
                            tracing::error!("Render job {} failed: {}", job, e);
                        })
                    });
                    jobs.push((name, handle));
                }
            }
        }

        tracing::debug!("Dispatched {} render jobs", jobs.len());
        Dispatch {
            jobs,
            rejected: Vec::new(),
        }
    }
}

/// Handle on a batch of running render jobs.
pub struct Dispatch {
    jobs: Vec<(String, JoinHandle<Result<Artifact, GraphError>>)>,
    pub(crate) rejected: Vec<GraphError>,
}

impl Dispatch {
    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    /// Waits for every job and sorts the outcomes.
    pub async fn wait(self) -> RenderReport {
        let (names, handles): (Vec<_>, Vec<_>) = self.jobs.into_iter().unzip();
        let mut report = RenderReport {
            rejected: self.rejected,
            ..RenderReport::default()
        };

        for (name, outcome) in names.into_iter().zip(join_all(handles).await) {
            match outcome {
                Ok(Ok(artifact)) => {
                    if artifact.placeholder {
                        report.warnings.push(GraphError::DegenerateSlice {
                            token: artifact.token.to_string(),
                            samples: artifact.samples,
                        });
                    }
                    report.rendered.push(artifact);
                }
                Ok(Err(e)) => report.failed.push(e),
                Err(join_error) => {
                    tracing::error!("Render job {} aborted: {}", name, join_error);
                    report.failed.push(GraphError::JobAborted {
                        job: name,
                        reason: join_error.to_string(),
                    });
                }
            }
        }

        report
    }
}

/// What a render pass produced.
#[derive(Debug, Default)]
pub struct RenderReport {
    pub rendered: Vec<Artifact>,
    pub failed: Vec<GraphError>,
    /// Tokens that did not parse and were skipped.
    pub rejected: Vec<GraphError>,
    /// Charts written as placeholders because their slice was too thin.
    pub warnings: Vec<GraphError>,
}

impl RenderReport {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty() && self.rejected.is_empty()
    }
}
