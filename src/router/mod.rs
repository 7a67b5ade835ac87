//! Router configuration.

pub mod public;

use std::time::Duration;

use axum::{
    http::{HeaderValue, Method, StatusCode},
    middleware::from_fn,
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::warn;

use crate::app_state::AppState;
use crate::config::Config;
use crate::handlers::{
    consumer_routes, forecast_routes, grid_routes, notification_routes, orchestrate_routes,
    simulate_routes, utility_routes,
};
use crate::middleware::{metrics_middleware, request_logger_middleware};

pub use public::{public_routes, ApiDoc};

/// CORS restricted to the configured origins; `*` allows any origin.
fn cors_layer(config: &Config) -> CorsLayer {
    let base = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any);

    if config.cors_origins.iter().any(|o| o == "*") {
        return base.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = config
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();
    base.allow_origin(origins)
}

/// Build the application router.
pub fn build_router(app_state: AppState) -> Router {
    let timeout = Duration::from_secs(app_state.config.request_timeout);
    let cors = cors_layer(&app_state.config);

    public_routes()
        .nest("/api/grid", grid_routes())
        .nest("/api/simulate", simulate_routes())
        .nest("/api/forecast", forecast_routes())
        .nest("/api/consumer", consumer_routes())
        .nest("/api/utility", utility_routes())
        .nest("/api/notifications", notification_routes())
        .nest("/api/orchestrate", orchestrate_routes())
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CompressionLayer::new())
                .layer(from_fn(request_logger_middleware))
                .layer(from_fn(metrics_middleware))
                .layer(TimeoutLayer::with_status_code(
                    StatusCode::REQUEST_TIMEOUT,
                    timeout,
                ))
                .layer(cors),
        )
        .with_state(app_state)
}
