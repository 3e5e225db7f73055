// HTTP routes: landing page, metrics, version, health

mod http;

use axum::{Router, routing::get};
use std::sync::Arc;
use std::time::Duration;
use tower_http::trace::TraceLayer;

use crate::config::AppConfig;
use crate::exporter::Exporter;
use crate::gateway::StatsSource;

pub(crate) struct AppState<S> {
    pub(crate) exporter: Arc<Exporter<S>>,
    pub(crate) metrics_path: Arc<str>,
    pub(crate) scrape_timeout: Duration,
    pub(crate) process_metrics: bool,
}

// Manual impl: `S` itself need not be Clone, it lives behind the Arc.
impl<S> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            exporter: Arc::clone(&self.exporter),
            metrics_path: Arc::clone(&self.metrics_path),
            scrape_timeout: self.scrape_timeout,
            process_metrics: self.process_metrics,
        }
    }
}

pub fn app<S>(exporter: Arc<Exporter<S>>, config: &AppConfig) -> Router
where
    S: StatsSource + Send + Sync + 'static,
{
    let metrics_path = config.server.metrics_path.as_str();
    let state = AppState {
        exporter,
        metrics_path: Arc::from(metrics_path),
        scrape_timeout: config.exporter.scrape_timeout(),
        process_metrics: config.server.process_metrics,
    };
    Router::new()
        .route("/", get(http::landing_handler::<S>)) // GET /
        .route(metrics_path, get(http::metrics_handler::<S>)) // GET /metrics
        .route("/version", get(http::version_handler)) // GET /version
        .route("/health", get(http::health_handler)) // GET /health
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
