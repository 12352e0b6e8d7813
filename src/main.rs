// Main entry point - Dependency injection and command dispatch
mod application;
mod domain;
mod infrastructure;
mod presentation;

use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::application::dispatcher::{Dispatcher, RenderReport};
use crate::application::ingest_service::IngestService;
use crate::application::render_service::RenderService;
use crate::domain::reading::Metric;
use crate::infrastructure::config::{load_config, AppConfig};
use crate::infrastructure::influx_repository::InfluxRepository;
use crate::infrastructure::plotters_renderer::PlottersRenderer;
use crate::presentation::cli::{Cli, Command};

fn build_render_service(config: &AppConfig) -> RenderService {
    let store = Arc::new(InfluxRepository::new(&config.influx));
    let graph = Arc::new(config.graph.clone());
    let dispatcher = Dispatcher::new(Arc::new(PlottersRenderer), graph.clone());
    RenderService::new(store, dispatcher, graph)
}

async fn render_once(config: &AppConfig, scales: Option<&str>, metrics: &[Metric]) -> anyhow::Result<RenderReport> {
    let service = build_render_service(config);
    let scales = scales.unwrap_or(&config.graph.time_scales);
    let metrics = (!metrics.is_empty()).then_some(metrics);

    let dispatch = service.render_all(scales, metrics).await?;
    tracing::debug!("Waiting on {} render jobs", dispatch.len());
    let report = dispatch.wait().await;

    for warning in &report.warnings {
        tracing::warn!("{}", warning);
    }
    if report.is_clean() {
        tracing::info!("Rendered {} charts", report.rendered.len());
    } else {
        tracing::warn!(
            "Rendered {} charts, {} failed, {} timescales rejected",
            report.rendered.len(),
            report.failed.len(),
            report.rejected.len()
        );
    }
    Ok(report)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let config = load_config(&cli.config)?;

    match cli.command {
        Command::Render { scales, metric } => {
            let report = render_once(&config, scales.as_deref(), &metric).await?;
            if !report.failed.is_empty() {
                let total = report.failed.len() + report.rendered.len();
                anyhow::bail!("{} of {} charts failed", report.failed.len(), total);
            }
        }
        Command::Watch { scales } => {
            let mut config = config;
            loop {
                if let Err(e) = render_once(&config, scales.as_deref(), &[]).await {
                    tracing::error!("Render pass failed: {}", e);
                }
                tokio::time::sleep(Duration::from_secs(config.sensor.interval_secs.max(1))).await;

                // Pick up edits without a restart
                match load_config(&cli.config) {
                    Ok(fresh) => config = fresh,
                    Err(e) => tracing::warn!("Keeping previous configuration: {}", e),
                }
            }
        }
        Command::Record {
            humidity,
            temperature,
            at,
        } => {
            let service = IngestService::new(Arc::new(InfluxRepository::new(&config.influx)));
            service.record(humidity, temperature, at).await?;
        }
        Command::Ping => {
            let service = IngestService::new(Arc::new(InfluxRepository::new(&config.influx)));
            if !service.check_store().await {
                anyhow::bail!("series store unreachable");
            }
        }
    }

    Ok(())
}
