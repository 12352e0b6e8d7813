// Render service - One fetch, many charts
use crate::application::dispatcher::{Dispatch, Dispatcher};
use crate::application::series_store::SeriesStore;
use crate::domain::error::GraphError;
use crate::domain::reading::{Metric, Variant};
use crate::domain::timescale::TimescaleToken;
use crate::domain::window::WindowSpec;
use crate::infrastructure::config::GraphConfig;
use chrono::{Local, NaiveDateTime};
use std::sync::Arc;

#[derive(Clone)]
pub struct RenderService {
    store: Arc<dyn SeriesStore>,
    dispatcher: Dispatcher,
    graph: Arc<GraphConfig>,
}

impl RenderService {
    pub fn new(store: Arc<dyn SeriesStore>, dispatcher: Dispatcher, graph: Arc<GraphConfig>) -> Self {
        Self {
            store,
            dispatcher,
            graph,
        }
    }

    /// Renders every chart for `tokens` (comma or space separated), for the
    /// given metrics or both when `None`, in both sizes.
    ///
    /// Token and store errors are returned before any job starts. Once the
    /// series is in hand the jobs are launched and the handle returned.
    pub async fn render_all(&self, tokens: &str, metrics: Option<&[Metric]>) -> Result<Dispatch, GraphError> {
        self.render_all_at(tokens, metrics, Local::now().naive_local())
            .await
    }

    pub async fn render_all_at(
        &self,
        tokens: &str,
        metrics: Option<&[Metric]>,
        now: NaiveDateTime,
    ) -> Result<Dispatch, GraphError> {
        let (tokens, rejected) = TimescaleToken::parse_list(tokens);
        for e in &rejected {
            tracing::warn!("Skipping timescale: {}", e);
        }

        let window = WindowSpec::resolve(&tokens, now)?;
        let series = self.store.fetch(&window).await?;
        tracing::info!(
            "Fetched {} samples for {} ({} .. {})",
            series.len(),
            window.widest,
            window.start,
            window.end
        );
        if series.is_empty() {
            return Err(GraphError::EmptyResult {
                start: window.start.to_string(),
                end: window.end.to_string(),
            });
        }

        tokio::fs::create_dir_all(&self.graph.save_path)
            .await
            .map_err(|e| GraphError::RenderWrite {
                path: self.graph.save_path.clone(),
                reason: e.to_string(),
            })?;

        let metrics: &[Metric] = match metrics {
            Some(m) if !m.is_empty() => m,
            _ => &Metric::ALL,
        };
        let mut dispatch = self
            .dispatcher
            .dispatch(Arc::new(series), &tokens, metrics, &Variant::ALL);
        dispatch.rejected = rejected;
        Ok(dispatch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::test_support::{series_end, series_spanning, MemoryStore, StubRenderer};
    use chrono::TimeDelta;
    use std::collections::HashSet;

    fn service(store: Arc<MemoryStore>, dir: &std::path::Path) -> RenderService {
        let graph = Arc::new(GraphConfig {
            save_path: dir.join("graphs"),
            ..GraphConfig::default()
        });
        let dispatcher = Dispatcher::new(Arc::new(StubRenderer::default()), graph.clone());
        RenderService::new(store, dispatcher, graph)
    }

    #[tokio::test]
    async fn test_four_days_of_data_three_timescales() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(MemoryStore::with_series(&series_spanning(1000, TimeDelta::days(4))));
        let service = service(store.clone(), dir.path());

        let report = service
            .render_all_at("15min, 6H, 3D", None, series_end())
            .await
            .unwrap()
            .wait()
            .await;

        let windows = store.windows();
        assert_eq!(windows.len(), 1);
        assert_eq!(windows[0].end - windows[0].start, TimeDelta::days(3));
        assert_eq!(windows[0].end, series_end());

        assert!(report.is_clean());
        let full: HashSet<_> = report
            .rendered
            .iter()
            .map(|a| a.path.clone())
            .filter(|p| !p.to_string_lossy().contains("_thumb"))
            .collect();
        assert_eq!(full.len(), 6);
        assert_eq!(report.rendered.len(), 12);
        let graphs = dir.path().join("graphs");
        for name in ["15min_Humidity.png", "6H_Temperature.png", "3D_Humidity.png"] {
            assert!(graphs.join(name).exists(), "{name} missing");
        }
    }

    #[tokio::test]
    async fn test_metric_filter() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(MemoryStore::with_series(&series_spanning(100, TimeDelta::hours(6))));
        let service = service(store, dir.path());

        let report = service
            .render_all_at("1H", Some(&[Metric::Temperature]), series_end())
            .await
            .unwrap()
            .wait()
            .await;

        let mut names: Vec<_> = report
            .rendered
            .iter()
            .map(|a| a.path.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        names.sort();
        assert_eq!(names, vec!["1H_Temperature.png", "1H_Temperature_thumb.png"]);
    }

    #[tokio::test]
    async fn test_bad_tokens_are_skipped_and_reported() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(MemoryStore::with_series(&series_spanning(100, TimeDelta::hours(6))));
        let service = service(store.clone(), dir.path());

        let report = service
            .render_all_at("6H, 6Y", None, series_end())
            .await
            .unwrap()
            .wait()
            .await;

        assert_eq!(report.rendered.len(), 4);
        assert!(matches!(report.rejected[..], [GraphError::InvalidToken { .. }]));
        assert_eq!(store.windows()[0].widest.to_string(), "6H");
    }

    #[tokio::test]
    async fn test_oversized_token_does_not_stop_the_others() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(MemoryStore::with_series(&series_spanning(100, TimeDelta::hours(6))));
        let service = service(store.clone(), dir.path());

        let report = service
            .render_all_at("99999999D, 6H", None, series_end())
            .await
            .unwrap()
            .wait()
            .await;

        assert!(report.failed.is_empty());
        assert_eq!(report.rendered.len(), 4);
        assert!(matches!(report.rejected[..], [GraphError::InvalidToken { .. }]));
        assert_eq!(store.windows()[0].end - store.windows()[0].start, TimeDelta::hours(6));
    }

    #[tokio::test]
    async fn test_no_valid_tokens_fails_before_fetch() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(MemoryStore::with_series(&series_spanning(10, TimeDelta::hours(1))));
        let service = service(store.clone(), dir.path());

        let err = service.render_all_at("nope, 0H", None, series_end()).await.err();
        assert!(matches!(err, Some(GraphError::NoTokens)));
        assert!(store.windows().is_empty());
    }

    #[tokio::test]
    async fn test_store_errors_are_fatal() {
        let dir = tempfile::tempdir().unwrap();

        let down = service(Arc::new(MemoryStore::unavailable()), dir.path());
        let err = down.render_all_at("6H", None, series_end()).await.err();
        assert!(matches!(err, Some(GraphError::StoreUnavailable(_))));

        let empty = service(Arc::new(MemoryStore::default()), dir.path());
        let err = empty.render_all_at("6H", None, series_end()).await.err();
        assert!(matches!(err, Some(GraphError::EmptyResult { .. })));
        assert!(!dir.path().join("graphs").exists());
    }

    #[tokio::test]
    async fn test_young_series_with_wide_timescale() {
        let dir = tempfile::tempdir().unwrap();
        // Only the last hour has data
        let store = Arc::new(MemoryStore::with_series(&series_spanning(60, TimeDelta::hours(1))));
        let service = service(store, dir.path());

        let report = service
            .render_all_at("15min, 3D", Some(&[Metric::Humidity]), series_end())
            .await
            .unwrap()
            .wait()
            .await;

        assert!(report.failed.is_empty());
        assert_eq!(report.rendered.len(), 4);
        assert!(report.rendered.iter().all(|a| a.samples >= 2));
    }
}
