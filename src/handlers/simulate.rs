use axum::{extract::State, routing::post, Router};
use metrics::histogram;
use std::time::Instant;

use super::extractors::ValidatedJson;
use super::response::ApiResponse;
use crate::app_state::AppState;
use crate::models::simulate::{CascadeRequest, CascadeResult};
use crate::services::simulate::run_simulation;

/// Build the `/api/simulate` routes
pub fn simulate_routes() -> Router<AppState> {
    Router::new().route("/cascade", post(simulate_cascade))
}

/// Run a demand-driven cascade over the full grid
#[utoipa::path(
    post,
    path = "/api/simulate/cascade",
    tag = "simulation",
    request_body = CascadeRequest,
    responses(
        (status = 200, description = "Cascade steps and final node states", body = CascadeResult),
        (status = 400, description = "Invalid request")
    )
)]
pub async fn simulate_cascade(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<CascadeRequest>,
) -> ApiResponse<CascadeResult> {
    let started = Instant::now();
    let result = run_simulation(&state.grid, &state.weather, &request).await;
    histogram!("cascade_simulation_duration_seconds").record(started.elapsed().as_secs_f64());

    ApiResponse::success(result)
}
