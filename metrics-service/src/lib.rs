use axum::{routing::get, Router};
use models::source::{ExternalBookSource, FetchError, InMemoryBookSource};
use services::metrics::{MetricsService, Source};
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;
use utils::config::{Config, SourceKind};

pub mod models;
pub mod routes;
pub mod services;
pub mod utils;

use routes::{health::health_check, metrics::get_metrics};

#[derive(Clone)]
pub struct AppState {
    pub metrics: Arc<MetricsService>,
    pub request_timeout: Duration,
}

impl AppState {
    pub fn new(source: Source, request_timeout: Duration) -> Self {
        Self {
            metrics: Arc::new(MetricsService::new(source)),
            request_timeout,
        }
    }

    pub fn from_config(config: &Config) -> Result<Self, FetchError> {
        let source: Source = match config.source {
            SourceKind::External => {
                info!("Using external book source at {}", config.books_api_url);
                Arc::new(ExternalBookSource::with_timeout(
                    &config.books_api_url,
                    config.books_api_timeout,
                )?)
            }
            SourceKind::Memory => {
                info!("Using in-memory book source");
                Arc::new(InMemoryBookSource::sample())
            }
        };

        Ok(Self::new(source, config.request_timeout))
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(get_metrics))
        .route("/status", get(health_check))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
