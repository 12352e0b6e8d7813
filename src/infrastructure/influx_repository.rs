// InfluxDB repository implementation
use crate::application::series_store::SeriesStore;
use crate::domain::error::GraphError;
use crate::domain::reading::{Sample, TimeSeries};
use crate::domain::window::WindowSpec;
use crate::infrastructure::config::{prepare_query, InfluxSettings};
use async_trait::async_trait;
use chrono::{DateTime, Local, NaiveDateTime, SecondsFormat, TimeZone, Utc};
use serde::Deserialize;
use std::collections::HashMap;

const FETCH_QUERY: &str = "SELECT \"humidity\", \"temperature\" FROM \"${measurement}\" \
     WHERE time >= '${start}' AND time <= '${end}' ORDER BY time ASC";

#[derive(Debug, Clone)]
pub struct InfluxRepository {
    host: String,
    token: String,
    database: String,
    retention_policy: String,
    measurement: String,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct InfluxQLResponse {
    results: Vec<InfluxQLResult>,
}

#[derive(Debug, Deserialize)]
struct InfluxQLResult {
    #[serde(default)]
    series: Option<Vec<InfluxQLSeries>>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct InfluxQLSeries {
    columns: Vec<String>,
    values: Vec<Vec<serde_json::Value>>,
}

/// Wall-clock local time as the UTC instant InfluxDB stores.
fn to_utc(t: NaiveDateTime) -> DateTime<Utc> {
    Local
        .from_local_datetime(&t)
        .earliest()
        .map(|local| local.with_timezone(&Utc))
        .unwrap_or_else(|| t.and_utc())
}

fn to_local(t: DateTime<Utc>) -> NaiveDateTime {
    t.with_timezone(&Local).naive_local()
}

fn unavailable(context: &str, e: impl std::fmt::Display) -> GraphError {
    GraphError::StoreUnavailable(format!("{}: {}", context, e))
}

impl InfluxRepository {
    pub fn new(settings: &InfluxSettings) -> Self {
        Self {
            host: settings.host.trim_end_matches('/').to_string(),
            token: settings.token.clone(),
            database: settings.database.clone(),
            retention_policy: settings.retention_policy.clone(),
            measurement: settings.measurement.clone(),
            client: reqwest::Client::new(),
        }
    }

    fn build_query_url(&self, query: &str) -> String {
        let encoded_query = urlencoding::encode(query);
        format!(
            "{}/query?db={}&rp={}&q={}",
            self.host, self.database, self.retention_policy, encoded_query
        )
    }

    fn fetch_query(&self, window: &WindowSpec) -> String {
        let mut vars = HashMap::new();
        vars.insert("measurement".to_string(), self.measurement.clone());
        vars.insert(
            "start".to_string(),
            to_utc(window.start).to_rfc3339_opts(SecondsFormat::Secs, true),
        );
        vars.insert(
            "end".to_string(),
            to_utc(window.end).to_rfc3339_opts(SecondsFormat::Secs, true),
        );
        prepare_query(FETCH_QUERY, &vars)
    }

    /// One line of line protocol, second precision.
    fn line_protocol(&self, sample: &Sample) -> String {
        format!(
            "{} humidity={},temperature={} {}",
            self.measurement,
            sample.humidity,
            sample.temperature,
            to_utc(sample.timestamp).timestamp()
        )
    }

    async fn execute_query(&self, query: &str) -> Result<InfluxQLResponse, GraphError> {
        let url = self.build_query_url(query);

        let response = self
            .client
            .get(&url)
            .header("Authorization", format!("Token {}", self.token))
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| unavailable("failed to send request to InfluxDB", e))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(GraphError::StoreUnavailable(format!(
                "InfluxDB query failed with status {}: {}",
                status, body
            )));
        }

        let data = response
            .json::<InfluxQLResponse>()
            .await
            .map_err(|e| unavailable("failed to parse InfluxDB response", e))?;

        // Check for errors in the response
        if let Some(error) = data.results.first().and_then(|r| r.error.as_ref()) {
            return Err(GraphError::StoreUnavailable(format!(
                "InfluxDB query error: {}",
                error
            )));
        }

        Ok(data)
    }

    /// Rows whose time, humidity and temperature all decode; others are
    /// skipped with a debug line.
    fn parse_samples(response: &InfluxQLResponse) -> Vec<Sample> {
        let mut samples = Vec::new();
        let Some(series) = response.results.first().and_then(|r| r.series.as_ref()) else {
            return samples;
        };

        for s in series {
            let column = |name: &str| s.columns.iter().position(|c| c == name);
            let (Some(time_idx), Some(rh_idx), Some(temp_idx)) =
                (column("time"), column("humidity"), column("temperature"))
            else {
                tracing::warn!("Unexpected InfluxDB columns: {:?}", s.columns);
                continue;
            };

            for row in &s.values {
                let time = row
                    .get(time_idx)
                    .and_then(|v| v.as_str())
                    .and_then(|t| DateTime::parse_from_rfc3339(t).ok());
                let humidity = row.get(rh_idx).and_then(|v| v.as_f64());
                let temperature = row.get(temp_idx).and_then(|v| v.as_f64());

                match (time, humidity, temperature) {
                    (Some(time), Some(humidity), Some(temperature)) => samples.push(Sample::new(
                        to_local(time.with_timezone(&Utc)),
                        humidity,
                        temperature,
                    )),
                    _ => tracing::debug!("Skipping incomplete row {:?}", row),
                }
            }
        }

        samples
    }
}

#[async_trait]
impl SeriesStore for InfluxRepository {
    async fn ping(&self) -> Result<(), GraphError> {
        tracing::info!("Trying to connect to InfluxDB on {}...", self.host);
        let response = self
            .client
            .get(format!("{}/ping", self.host))
            .header("Authorization", format!("Token {}", self.token))
            .send()
            .await
            .map_err(|e| unavailable("failed to reach InfluxDB", e))?;

        if !response.status().is_success() {
            return Err(GraphError::StoreUnavailable(format!(
                "InfluxDB ping returned {}",
                response.status()
            )));
        }
        Ok(())
    }

    async fn fetch(&self, window: &WindowSpec) -> Result<TimeSeries, GraphError> {
        let query = self.fetch_query(window);
        tracing::debug!("Executing fetch query: {}", query);

        let response = self.execute_query(&query).await?;
        let samples = Self::parse_samples(&response);
        tracing::debug!("Fetched {} rows from {}", samples.len(), self.measurement);

        if samples.is_empty() {
            return Err(GraphError::EmptyResult {
                start: window.start.to_string(),
                end: window.end.to_string(),
            });
        }
        Ok(TimeSeries::new(samples))
    }

    async fn record(&self, sample: &Sample) -> Result<(), GraphError> {
        let url = format!(
            "{}/write?db={}&rp={}&precision=s",
            self.host, self.database, self.retention_policy
        );

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Token {}", self.token))
            .body(self.line_protocol(sample))
            .send()
            .await
            .map_err(|e| unavailable("failed to send write to InfluxDB", e))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(GraphError::StoreUnavailable(format!(
                "InfluxDB write failed with status {}: {}",
                status, body
            )));
        }
        Ok(())
    }
}
