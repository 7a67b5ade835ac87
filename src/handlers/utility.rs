//! Operator console: regional overview, weather events, crews, the
//! scripted timeline and the mitigation comparison.

use std::convert::Infallible;
use std::time::Duration;

use axum::{
    extract::{Path, State},
    response::sse::{Event, KeepAlive, Sse},
    routing::get,
    Router,
};
use futures::{Stream, StreamExt};
use tracing::info;

use super::extractors::ApiQuery;
use super::response::ApiResponse;
use crate::app_state::AppState;
use crate::constants::forecast::DEFAULT_FORECAST_HOUR;
use crate::error::Result;
use crate::models::grid::ScenarioQuery;
use crate::models::utility::{
    CrewOptimizationResponse, NationalOverview, OutcomeComparison, RegionOverview, TimelineEvent,
    WeatherEvent,
};
use crate::models::Scenario;
use crate::services::demand::scenario_multipliers;
use crate::services::{crews, events, outcome, overview};

/// Build the `/api/utility` routes
pub fn utility_routes() -> Router<AppState> {
    Router::new()
        .route("/overview", get(get_overview))
        .route("/overview/{region}", get(get_region_overview))
        .route("/weather-events", get(get_weather_events))
        .route("/crews", get(get_crews))
        .route("/events", get(get_events))
        .route("/events/stream", get(stream_events))
        .route("/outcomes", get(get_outcomes))
        .merge(super::dispatch::dispatch_routes())
}

async fn national_overview(state: &AppState, scenario: Scenario) -> NationalOverview {
    let multipliers =
        scenario_multipliers(&state.grid, &state.weather, scenario, scenario.display_hour()).await;
    overview::overview(&state.grid, &multipliers, scenario)
}

/// Five ERCOT regions with load, weather and outages
#[utoipa::path(
    get,
    path = "/api/utility/overview",
    tag = "utility",
    params(ScenarioQuery),
    responses((status = 200, description = "National overview", body = NationalOverview))
)]
pub async fn get_overview(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ScenarioQuery>,
) -> ApiResponse<NationalOverview> {
    ApiResponse::success(national_overview(&state, Scenario::parse(&query.scenario)).await)
}

#[utoipa::path(
    get,
    path = "/api/utility/overview/{region}",
    tag = "utility",
    params(("region" = String, Path, description = "HOU, DAL, AUS, SAT or WTX"), ScenarioQuery),
    responses(
        (status = 200, description = "One region", body = RegionOverview),
        (status = 404, description = "Unknown region")
    )
)]
pub async fn get_region_overview(
    State(state): State<AppState>,
    Path(region): Path<String>,
    ApiQuery(query): ApiQuery<ScenarioQuery>,
) -> Result<ApiResponse<RegionOverview>> {
    let scenario = Scenario::parse(&query.scenario);
    let multipliers =
        scenario_multipliers(&state.grid, &state.weather, scenario, scenario.display_hour()).await;
    overview::region(&state.grid, &multipliers, scenario, &region).map(ApiResponse::success)
}

/// Event cards for regions under weather threat
#[utoipa::path(
    get,
    path = "/api/utility/weather-events",
    tag = "utility",
    params(ScenarioQuery),
    responses((status = 200, description = "Weather events, most severe first", body = [WeatherEvent]))
)]
pub async fn get_weather_events(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ScenarioQuery>,
) -> ApiResponse<Vec<WeatherEvent>> {
    let overview = national_overview(&state, Scenario::parse(&query.scenario)).await;
    ApiResponse::success(overview::weather_events(&overview))
}

/// Static crew roster for the scenario
#[utoipa::path(
    get,
    path = "/api/utility/crews",
    tag = "utility",
    params(ScenarioQuery),
    responses((status = 200, description = "Crews", body = CrewOptimizationResponse))
)]
pub async fn get_crews(ApiQuery(query): ApiQuery<ScenarioQuery>) -> ApiResponse<CrewOptimizationResponse> {
    ApiResponse::success(crews::crews(Scenario::parse(&query.scenario)))
}

/// Scripted operator timeline
#[utoipa::path(
    get,
    path = "/api/utility/events",
    tag = "utility",
    params(ScenarioQuery),
    responses((status = 200, description = "Timeline events", body = [TimelineEvent]))
)]
pub async fn get_events(ApiQuery(query): ApiQuery<ScenarioQuery>) -> ApiResponse<Vec<TimelineEvent>> {
    ApiResponse::success(events::timeline(Scenario::parse(&query.scenario)))
}

/// Timeline replayed as server-sent events, closed by `{"done":true}`
#[utoipa::path(
    get,
    path = "/api/utility/events/stream",
    tag = "utility",
    params(ScenarioQuery),
    responses((status = 200, description = "Event stream", content_type = "text/event-stream"))
)]
pub async fn stream_events(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ScenarioQuery>,
) -> Sse<impl Stream<Item = std::result::Result<Event, Infallible>>> {
    let scenario = Scenario::parse(&query.scenario);
    info!("Streaming {} timeline", scenario);

    let interval = Duration::from_millis(state.config.event_stream_interval_ms);
    let stream = events::timeline_stream(scenario, interval)
        .map(|payload| Ok::<_, Infallible>(Event::default().data(payload)));

    Sse::new(stream).keep_alive(KeepAlive::default())
}

/// Cascade with and without a controlled blackout
#[utoipa::path(
    get,
    path = "/api/utility/outcomes",
    tag = "utility",
    params(ScenarioQuery),
    responses((status = 200, description = "Outcome comparison", body = OutcomeComparison))
)]
pub async fn get_outcomes(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ScenarioQuery>,
) -> ApiResponse<OutcomeComparison> {
    let scenario = Scenario::parse(&query.scenario);
    let multipliers =
        scenario_multipliers(&state.grid, &state.weather, scenario, DEFAULT_FORECAST_HOUR).await;
    ApiResponse::success(outcome::compare_outcomes(&state.grid, &multipliers, scenario))
}
