//! Crew dispatch state machine endpoints under `/api/utility/crews/dispatch`.

use axum::{
    extract::State,
    routing::{get, post},
    Router,
};

use super::extractors::{ApiQuery, ValidatedJson};
use super::response::ApiResponse;
use crate::app_state::AppState;
use crate::constants::forecast::DEFAULT_FORECAST_HOUR;
use crate::error::Result;
use crate::models::dispatch::{
    DispatchAssignment, DispatchInitResponse, DispatchRecommendation, DispatchRequest,
    DispatchStatusResponse,
};
use crate::models::grid::ScenarioQuery;
use crate::models::Scenario;
use crate::services::demand::scenario_multipliers;
use crate::services::DispatchService;

pub fn dispatch_routes() -> Router<AppState> {
    Router::new()
        .route("/crews/dispatch", post(dispatch_crew))
        .route("/crews/dispatch/init", post(init_dispatch))
        .route("/crews/dispatch/recommend", get(recommend))
        .route("/crews/dispatch/all", post(dispatch_all))
        .route("/crews/dispatch/status", get(status))
        .route("/crews/dispatch/tick", post(tick))
}

/// Reset dispatch and load the failures of a fresh cascade. Only `uri`
/// selects the storm; every other scenario runs as a normal day.
#[utoipa::path(
    post,
    path = "/api/utility/crews/dispatch/init",
    tag = "dispatch",
    params(ScenarioQuery),
    responses((status = 200, description = "Dispatch initialised", body = DispatchInitResponse))
)]
pub async fn init_dispatch(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ScenarioQuery>,
) -> ApiResponse<DispatchInitResponse> {
    let scenario = Scenario::parse(&query.scenario).scripted();
    let multipliers =
        scenario_multipliers(&state.grid, &state.weather, scenario, DEFAULT_FORECAST_HOUR).await;
    ApiResponse::success(state.dispatch.init(&state.grid, &multipliers, scenario).await)
}

/// Greedy crew-to-node recommendation
#[utoipa::path(
    get,
    path = "/api/utility/crews/dispatch/recommend",
    tag = "dispatch",
    responses((status = 200, description = "Recommended assignments", body = DispatchRecommendation))
)]
pub async fn recommend(State(dispatch): State<DispatchService>) -> ApiResponse<DispatchRecommendation> {
    ApiResponse::success(dispatch.recommend().await)
}

/// Send one crew to a failed node
#[utoipa::path(
    post,
    path = "/api/utility/crews/dispatch",
    tag = "dispatch",
    request_body = DispatchRequest,
    responses(
        (status = 200, description = "Crew en route", body = DispatchAssignment),
        (status = 400, description = "Unknown or unavailable crew, or node not failed")
    )
)]
pub async fn dispatch_crew(
    State(dispatch): State<DispatchService>,
    ValidatedJson(request): ValidatedJson<DispatchRequest>,
) -> Result<ApiResponse<DispatchAssignment>> {
    dispatch
        .dispatch(&request.crew_id, &request.target_node_id)
        .await
        .map(ApiResponse::success)
}

/// Dispatch every recommended assignment
#[utoipa::path(
    post,
    path = "/api/utility/crews/dispatch/all",
    tag = "dispatch",
    responses((status = 200, description = "Created assignments", body = [DispatchAssignment]))
)]
pub async fn dispatch_all(State(dispatch): State<DispatchService>) -> ApiResponse<Vec<DispatchAssignment>> {
    ApiResponse::success(dispatch.dispatch_all().await)
}

#[utoipa::path(
    get,
    path = "/api/utility/crews/dispatch/status",
    tag = "dispatch",
    responses((status = 200, description = "Dispatch state", body = DispatchStatusResponse))
)]
pub async fn status(State(dispatch): State<DispatchService>) -> ApiResponse<DispatchStatusResponse> {
    ApiResponse::success(dispatch.status().await)
}

/// Advance crews by wall-clock time
#[utoipa::path(
    post,
    path = "/api/utility/crews/dispatch/tick",
    tag = "dispatch",
    responses((status = 200, description = "Dispatch state after the tick", body = DispatchStatusResponse))
)]
pub async fn tick(State(dispatch): State<DispatchService>) -> ApiResponse<DispatchStatusResponse> {
    ApiResponse::success(dispatch.tick().await)
}
