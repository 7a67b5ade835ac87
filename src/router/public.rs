//! Operational routes and API documentation.
//!
//! Includes: health check, Prometheus metrics, Swagger UI.

use axum::{routing::get, Router};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::app_state::AppState;
use crate::error::ErrorResponse;
use crate::handlers::{
    consumer, dispatch, forecast, grid, health, metrics, notifications, orchestrate, simulate,
    utility,
};

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Blackout API",
        description = "Cascade simulation, price forecasts, crew dispatch and consumer alerts for the ERCOT grid"
    ),
    paths(
        health::health_check,
        metrics::get_prometheus_metrics,
        grid::get_grid_status,
        grid::get_topology,
        grid::get_cascade_probability,
        grid::get_node,
        grid::get_hotspots,
        grid::get_arcs,
        simulate::simulate_cascade,
        forecast::get_prices,
        forecast::get_region_prices,
        forecast::get_model_info,
        consumer::list_profiles,
        consumer::create_custom_profile,
        consumer::get_recommendations,
        consumer::get_savings,
        consumer::get_device_alerts,
        utility::get_overview,
        utility::get_region_overview,
        utility::get_weather_events,
        utility::get_crews,
        utility::get_events,
        utility::stream_events,
        utility::get_outcomes,
        dispatch::init_dispatch,
        dispatch::recommend,
        dispatch::dispatch_crew,
        dispatch::dispatch_all,
        dispatch::status,
        dispatch::tick,
        notifications::send_confirmation,
        notifications::send_payout,
        notifications::broadcast,
        orchestrate::run_pipeline,
        orchestrate::list_sessions,
        orchestrate::get_session,
    ),
    components(schemas(ErrorResponse)),
    tags(
        (name = "health", description = "Liveness"),
        (name = "metrics", description = "Prometheus exposition"),
        (name = "grid", description = "Grid model and status"),
        (name = "simulation", description = "Cascade simulation"),
        (name = "forecast", description = "Wholesale price forecasts"),
        (name = "consumer", description = "Household optimisation"),
        (name = "utility", description = "Operator console"),
        (name = "dispatch", description = "Crew dispatch"),
        (name = "notifications", description = "ntfy push relay"),
        (name = "orchestrate", description = "End-to-end simulation sessions"),
    )
)]
pub struct ApiDoc;

/// Build health, metrics and documentation routes.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/metrics", get(metrics::get_prometheus_metrics))
        .merge(SwaggerUi::new("/api/docs").url("/api/docs/openapi.json", ApiDoc::openapi()))
}
