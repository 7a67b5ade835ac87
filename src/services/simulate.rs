//! Demand → cascade pipeline behind `POST /api/simulate/cascade`.

use tracing::info;

use crate::models::scenario::Scenario;
use crate::models::simulate::{CascadeRequest, CascadeResult};
use crate::services::cascade::{run_cascade, CascadeParams};
use crate::services::demand::scenario_multipliers;
use crate::services::grid::GridGraph;
use crate::services::weather::WeatherService;

/// Scenario for a request. A recognised `scenario` wins; otherwise a start
/// time inside February 2021 selects the storm.
pub fn resolve_scenario(request: &CascadeRequest) -> Scenario {
    match request.scenario.trim().to_ascii_lowercase().as_str() {
        "uri" | "uri_2021" => Scenario::Uri,
        "normal" => Scenario::Normal,
        "live" => Scenario::Live,
        _ if request.start_time.contains("2021-02") => Scenario::Uri,
        _ => Scenario::Normal,
    }
}

/// Run label such as `ercot_20210213`.
pub fn scenario_label(region: &str, start_time: &str) -> String {
    let date: String = start_time.chars().take(10).filter(|c| *c != '-').collect();
    format!("{}_{}", region.to_lowercase(), date)
}

pub async fn run_simulation(
    grid: &GridGraph,
    weather: &WeatherService,
    request: &CascadeRequest,
) -> CascadeResult {
    let scenario = resolve_scenario(request);
    let label = scenario_label(&request.region, &request.start_time);
    info!(
        "Simulating cascade: scenario={}, label={}, hour={}",
        scenario, label, request.forecast_hour
    );

    let multipliers = scenario_multipliers(grid, weather, scenario, request.forecast_hour).await;

    run_cascade(
        grid,
        CascadeParams {
            multipliers: &multipliers,
            scenario_label: &label,
            forecast_hour: request.forecast_hour,
            zone_temps: request.zone_temps_f.as_ref(),
        },
    )
}
