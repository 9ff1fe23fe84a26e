// Route table and middleware stack
use crate::presentation::app_state::AppState;
use crate::presentation::handlers::{
    delete_all_history, delete_history, generate_fake_data, health_check, history_data,
    realtime_data, root, simulation_status, start_generating, stop_generating,
};
use axum::{
    http::{HeaderValue, Method},
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;
use tower_http::compression::CompressionLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub fn build_router(state: Arc<AppState>, allowed_origins: &[String]) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/healthz", get(health_check))
        .route("/api/realtime-data", get(realtime_data))
        .route("/api/history-data", get(history_data))
        .route("/api/status", get(simulation_status))
        .route("/api/generate-fake-data", post(generate_fake_data))
        .route("/api/start-generating", post(start_generating))
        .route("/api/stop-generating", post(stop_generating))
        .route("/api/delete-all-history", delete(delete_all_history))
        .route("/api/delete-history/:id", delete(delete_history))
        .layer(cors_layer(allowed_origins))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let methods = [Method::GET, Method::POST, Method::DELETE];

    if allowed_origins.iter().any(|origin| origin == "*") {
        return CorsLayer::new().allow_origin(Any).allow_methods(methods);
    }

    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!("Ignoring invalid CORS origin {:?}: {}", origin, e);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(methods)
        .allow_credentials(true)
}
