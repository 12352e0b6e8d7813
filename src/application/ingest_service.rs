// Ingest service - Use case for recording a reading
use crate::application::series_store::SeriesStore;
use crate::domain::error::GraphError;
use crate::domain::reading::Sample;
use chrono::{Local, NaiveDateTime, Timelike};
use std::sync::Arc;

#[derive(Clone)]
pub struct IngestService {
    store: Arc<dyn SeriesStore>,
}

impl IngestService {
    pub fn new(store: Arc<dyn SeriesStore>) -> Self {
        Self { store }
    }

    /// Stores one reading, stamped `at` or now, truncated to whole seconds.
    pub async fn record(
        &self,
        humidity: f64,
        temperature: f64,
        at: Option<NaiveDateTime>,
    ) -> Result<Sample, GraphError> {
        if !humidity.is_finite() || !(0.0..=100.0).contains(&humidity) {
            return Err(GraphError::InvalidReading(format!(
                "relative humidity {} is outside 0-100%",
                humidity
            )));
        }
        if !temperature.is_finite() {
            return Err(GraphError::InvalidReading(format!(
                "temperature {} is not a number",
                temperature
            )));
        }

        let timestamp = at.unwrap_or_else(|| Local::now().naive_local());
        let timestamp = timestamp.with_nanosecond(0).unwrap_or(timestamp);
        let sample = Sample::new(timestamp, humidity, temperature);

        self.store.record(&sample).await?;
        tracing::info!("Recorded {} {:.2}% {:.2}", timestamp, humidity, temperature);
        Ok(sample)
    }

    /// Logs and returns whether the store answered.
    pub async fn check_store(&self) -> bool {
        match self.store.ping().await {
            Ok(()) => {
                tracing::info!("Connection to the series store is successful");
                true
            }
            Err(e) => {
                tracing::error!("{}", e);
                false
            }
        }
    }
}
