use crate::server::{handlers, types::AppState};
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

pub fn create_router(
    state: AppState,
    metrics_handle: PrometheusHandle,
    max_upload_bytes: usize,
) -> Router {
    let state = Arc::new(state);

    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/predict", post(handlers::predict))
        .route(
            "/metrics",
            get(move || std::future::ready(metrics_handle.render())),
        )
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
