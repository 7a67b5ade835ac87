//! Grid status, topology, node detail and the operator globe layers.

use axum::{
    extract::{Path, State},
    routing::get,
    Router,
};
use validator::Validate;

use super::extractors::ApiQuery;
use super::response::ApiResponse;
use crate::app_state::AppState;
use crate::error::Result;
use crate::models::grid::{
    ArcsResponse, CascadeProbabilityResponse, GridStatusQuery, GridStatusResponse,
    GridTopologyResponse, HotspotsResponse, NodeDetailResponse, ScenarioQuery,
};
use crate::models::Scenario;
use crate::services::demand::{scenario_multipliers, DemandMultipliers};
use crate::services::{grid_status, hotspot};

/// Build the `/api/grid` routes
pub fn grid_routes() -> Router<AppState> {
    Router::new()
        .route("/status", get(get_grid_status))
        .route("/topology", get(get_topology))
        .route("/cascade-probability", get(get_cascade_probability))
        .route("/nodes/{node_id}", get(get_node))
        .route("/hotspots", get(get_hotspots))
        .route("/arcs", get(get_arcs))
}

async fn multipliers_for(state: &AppState, scenario: Scenario, hour: u32) -> DemandMultipliers {
    scenario_multipliers(&state.grid, &state.weather, scenario, hour).await
}

/// Per-node load and status under a weather scenario
#[utoipa::path(
    get,
    path = "/api/grid/status",
    tag = "grid",
    params(GridStatusQuery),
    responses(
        (status = 200, description = "Node statuses and summary", body = GridStatusResponse),
        (status = 400, description = "Invalid forecast hour")
    )
)]
pub async fn get_grid_status(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<GridStatusQuery>,
) -> Result<ApiResponse<GridStatusResponse>> {
    query.validate()?;
    let multipliers =
        multipliers_for(&state, Scenario::parse(&query.scenario), query.forecast_hour).await;

    Ok(ApiResponse::success(grid_status::grid_status(
        &state.grid,
        &multipliers,
        &query.scenario,
        query.forecast_hour,
    )))
}

/// Full node and edge lists
#[utoipa::path(
    get,
    path = "/api/grid/topology",
    tag = "grid",
    responses((status = 200, description = "Grid topology", body = GridTopologyResponse))
)]
pub async fn get_topology(State(state): State<AppState>) -> ApiResponse<GridTopologyResponse> {
    ApiResponse::success(grid_status::topology(&state.grid))
}

/// Cascade probability per interconnection
#[utoipa::path(
    get,
    path = "/api/grid/cascade-probability",
    tag = "grid",
    params(GridStatusQuery),
    responses(
        (status = 200, description = "Probability by region", body = CascadeProbabilityResponse),
        (status = 400, description = "Invalid forecast hour")
    )
)]
pub async fn get_cascade_probability(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<GridStatusQuery>,
) -> Result<ApiResponse<CascadeProbabilityResponse>> {
    query.validate()?;
    let multipliers =
        multipliers_for(&state, Scenario::parse(&query.scenario), query.forecast_hour).await;

    Ok(ApiResponse::success(grid_status::cascade_probability(
        &state.grid,
        &multipliers,
        &query.scenario,
        query.forecast_hour,
    )))
}

/// One node with its neighbours
#[utoipa::path(
    get,
    path = "/api/grid/nodes/{node_id}",
    tag = "grid",
    params(("node_id" = String, Path, description = "Bus identifier")),
    responses(
        (status = 200, description = "Node detail", body = NodeDetailResponse),
        (status = 404, description = "Unknown node")
    )
)]
pub async fn get_node(
    State(state): State<AppState>,
    Path(node_id): Path<String>,
) -> Result<ApiResponse<NodeDetailResponse>> {
    grid_status::node_detail(&state.grid, &node_id).map(ApiResponse::success)
}

/// City markers sized by weather-zone stress
#[utoipa::path(
    get,
    path = "/api/grid/hotspots",
    tag = "grid",
    params(ScenarioQuery),
    responses((status = 200, description = "Hotspots", body = HotspotsResponse))
)]
pub async fn get_hotspots(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ScenarioQuery>,
) -> ApiResponse<HotspotsResponse> {
    let scenario = Scenario::parse(&query.scenario);
    let multipliers = multipliers_for(&state, scenario, scenario.display_hour()).await;
    ApiResponse::success(hotspot::hotspots(&state.grid, &multipliers, &query.scenario))
}

/// Transmission corridors between hotspot cities
#[utoipa::path(
    get,
    path = "/api/grid/arcs",
    tag = "grid",
    params(ScenarioQuery),
    responses((status = 200, description = "Arcs", body = ArcsResponse))
)]
pub async fn get_arcs(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ScenarioQuery>,
) -> ApiResponse<ArcsResponse> {
    let scenario = Scenario::parse(&query.scenario);
    let multipliers = multipliers_for(&state, scenario, scenario.display_hour()).await;
    ApiResponse::success(hotspot::arcs(&state.grid, &multipliers, &query.scenario))
}
