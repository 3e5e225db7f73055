// GET handlers: landing, metrics, version, health

use axum::{
    extract::State,
    http::{StatusCode, header},
    response::{Html, IntoResponse, Response},
};
use std::time::Instant;
use tracing::{debug, error, warn};

use super::AppState;
use crate::exporter::{PrometheusSink, ScrapeError, ScrapeHealth, SinkError};
use crate::gateway::StatsSource;
use crate::version::{NAME, VERSION};

pub(super) async fn landing_handler<S>(State(state): State<AppState<S>>) -> Html<String> {
    Html(format!(
        "<html>\n<head><title>Ceph RGW Exporter</title></head>\n<body>\n\
         <h1>Ceph RGW Exporter</h1>\n<p><a href=\"{}\">Metrics</a></p>\n\
         </body>\n</html>\n",
        state.metrics_path
    ))
}

/// GET {metrics_path}: scrapes the gateway and renders the text exposition.
/// A failed or timed-out scrape still answers 200 with the health gauges.
pub(super) async fn metrics_handler<S>(State(state): State<AppState<S>>) -> Response
where
    S: StatsSource + Send + Sync + 'static,
{
    match scrape(&state).await {
        Ok(body) => ([(header::CONTENT_TYPE, prometheus::TEXT_FORMAT)], body).into_response(),
        Err(e) => {
            error!(error = %e, "encoding metrics failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("encoding metrics: {e}"),
            )
                .into_response()
        }
    }
}

async fn scrape<S>(state: &AppState<S>) -> Result<String, SinkError>
where
    S: StatsSource + Send + Sync + 'static,
{
    let started = Instant::now();
    let mut sink = PrometheusSink::new(state.exporter.descriptors())?;
    if state.process_metrics {
        sink.register_process_metrics()?;
    }

    let mut health = ScrapeHealth::default();
    match tokio::time::timeout(state.scrape_timeout, state.exporter.collect_into(&mut sink)).await
    {
        Ok(Ok(summary)) => {
            health.success = true;
            health.owner_quota_failures = summary.owner_quota_failures;
            debug!(samples = summary.samples, "scrape served");
        }
        Ok(Err(ScrapeError::Fetch(e))) => {
            warn!(
                error = %e,
                kind = e.kind(),
                endpoint = e.endpoint(),
                "scrape failed; serving health metrics only"
            );
        }
        Ok(Err(ScrapeError::Sink(e))) => return Err(e),
        Err(_) => {
            warn!(
                timeout_secs = state.scrape_timeout.as_secs(),
                "scrape timed out; serving health metrics only"
            );
        }
    }
    health.duration = started.elapsed();
    sink.record_health(&health)?;
    sink.render()
}

/// GET /version: service name and version (from Cargo.toml at build time).
pub(super) async fn version_handler() -> impl IntoResponse {
    axum::Json(serde_json::json!({
        "name": NAME,
        "version": VERSION,
    }))
}

pub(super) async fn health_handler() -> &'static str {
    "ok"
}
