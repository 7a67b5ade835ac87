//! Weather-driven demand multipliers.
//!
//! Each node draws `base_load × multiplier`, where the multiplier combines a
//! time-of-day curve with heating and cooling degree-hours at the nearest
//! reference city:
//!
//! ```text
//! multiplier = tod[h mod 24] × (1 + heat × max(0, 65 − T) + cool × max(0, T − 75))
//! ```

use std::collections::HashMap;

use tracing::debug;

use crate::constants::api::GRID_REGION;
use crate::models::scenario::Scenario;
use crate::services::grid::GridGraph;
use crate::services::weather::{WeatherPoint, WeatherService};
use crate::utils::{haversine_km, round_to};

/// Temperature in °F per reference city
pub type CityTemps = HashMap<&'static str, f64>;

/// Node id → demand multiplier
pub type DemandMultipliers = HashMap<String, f64>;

pub const NEUTRAL_TEMP_F: f64 = 65.0;
const HEATING_BASE_F: f64 = 65.0;
const COOLING_BASE_F: f64 = 75.0;

/// Reference cities used to assign a temperature to every node.
pub const CITIES: [(&str, f64, f64); 7] = [
    ("Austin, TX", 30.27, -97.74),
    ("Houston, TX", 29.76, -95.37),
    ("Dallas, TX", 32.78, -96.80),
    ("San Antonio, TX", 29.42, -98.49),
    ("Los Angeles, CA", 34.05, -118.24),
    ("New York, NY", 40.71, -74.01),
    ("Chicago, IL", 41.88, -87.63),
];

/// Observed temperatures around hour 36 of the February 2021 storm.
const URI_FALLBACK_TEMPS: [(&str, f64); 7] = [
    ("Austin, TX", 12.0),
    ("Houston, TX", 18.0),
    ("Dallas, TX", 8.0),
    ("San Antonio, TX", 15.0),
    ("Los Angeles, CA", 55.0),
    ("New York, NY", 25.0),
    ("Chicago, IL", 10.0),
];

/// Load multiplier by hour of day; peak 6-9 PM, trough 3-5 AM.
pub const TOD_CURVE: [f64; 24] = [
    0.65, 0.60, 0.58, 0.57, 0.57, 0.60, 0.70, 0.80, 0.90, 0.95, 0.98, 1.00, 1.02, 1.03, 1.05,
    1.05, 1.08, 1.10, 1.15, 1.15, 1.12, 1.05, 0.90, 0.78,
];

/// Heating and cooling sensitivity per ISO region.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sensitivity {
    pub heat: f64,
    pub cool: f64,
}

pub fn region_sensitivity(region: &str) -> Sensitivity {
    let (heat, cool) = match region {
        "PJM" | "NYISO" => (0.025, 0.03),
        "MISO" => (0.03, 0.03),
        "ISO-NE" => (0.025, 0.025),
        "CAISO" => (0.02, 0.04),
        "SPP" => (0.035, 0.03),
        // ERCOT and unknown regions: poor winterization makes heating dominant
        _ => (0.05, 0.03),
    };
    Sensitivity { heat, cool }
}

pub fn tod_factor(hour: u32) -> f64 {
    TOD_CURVE[(hour % 24) as usize]
}

/// City nearest to a coordinate.
pub fn nearest_city(lat: f64, lon: f64) -> &'static str {
    let mut best = CITIES[0].0;
    let mut best_dist = f64::INFINITY;
    for (name, clat, clon) in CITIES {
        let d = haversine_km(lat, lon, clat, clon);
        if d < best_dist {
            best_dist = d;
            best = name;
        }
    }
    best
}

/// Resolve loosely formatted city names such as `austin-tx` or `Austin_TX`.
pub fn resolve_city_name(raw: &str) -> Option<&'static str> {
    let wanted = normalize_city(raw);
    CITIES
        .iter()
        .map(|(name, _, _)| *name)
        .find(|name| normalize_city(name) == wanted)
}

fn normalize_city(raw: &str) -> String {
    raw.chars()
        .filter(|c| !matches!(c, ' ' | ',' | '-' | '_'))
        .flat_map(char::to_lowercase)
        .collect()
}

pub fn uri_fallback_temps() -> CityTemps {
    URI_FALLBACK_TEMPS.into_iter().collect()
}

pub fn normal_temps() -> CityTemps {
    CITIES.iter().map(|(name, _, _)| (*name, NEUTRAL_TEMP_F)).collect()
}

fn uri_fallback_for(city: &str) -> f64 {
    URI_FALLBACK_TEMPS
        .iter()
        .find(|(name, _)| *name == city)
        .map_or(NEUTRAL_TEMP_F, |(_, t)| *t)
}

/// An hourly temperature reading relative to the forecast start.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HourlyTemp {
    pub hour: u32,
    pub temp_f: f64,
}

/// City name → hourly readings
pub type CityForecasts = HashMap<String, Vec<HourlyTemp>>;

/// Per-city temperature at `forecast_hour`, using the reading closest to it.
///
/// Without forecasts the storm fallback table is used; cities missing from
/// the forecasts fall back individually.
pub fn city_temps_for_hour(forecasts: Option<&CityForecasts>, forecast_hour: u32) -> CityTemps {
    let Some(forecasts) = forecasts else {
        return uri_fallback_temps();
    };

    CITIES
        .iter()
        .map(|(name, _, _)| {
            let temp = forecasts
                .get(*name)
                .and_then(|hourly| {
                    hourly
                        .iter()
                        .min_by_key(|h| h.hour.abs_diff(forecast_hour))
                        .map(|h| h.temp_f)
                })
                .unwrap_or_else(|| uri_fallback_for(name));
            (*name, temp)
        })
        .collect()
}

/// Resolve city temperatures for a scenario.
///
/// Live weather comes from Open-Meteo; cities that cannot be fetched use the
/// neutral temperature of a normal day.
pub async fn temps_for_scenario(
    scenario: Scenario,
    forecast_hour: u32,
    weather: &WeatherService,
) -> CityTemps {
    match scenario {
        Scenario::Uri => uri_fallback_temps(),
        Scenario::Normal => normal_temps(),
        Scenario::Live => {
            let mut forecasts = CityForecasts::new();
            for (name, lat, lon) in CITIES {
                let point = WeatherPoint { key: name, lat, lon };
                let hourly = match weather.hourly_or_none(point).await {
                    Some(readings) => readings
                        .iter()
                        .enumerate()
                        .map(|(i, r)| HourlyTemp {
                            hour: i as u32,
                            temp_f: r.temp_f,
                        })
                        .collect(),
                    None => vec![HourlyTemp {
                        hour: forecast_hour,
                        temp_f: NEUTRAL_TEMP_F,
                    }],
                };
                forecasts.insert(name.to_string(), hourly);
            }
            city_temps_for_hour(Some(&forecasts), forecast_hour)
        }
    }
}

/// Multiplier for a single temperature and hour.
pub fn demand_multiplier(temp_f: f64, forecast_hour: u32, sensitivity: Sensitivity) -> f64 {
    let hdh = (HEATING_BASE_F - temp_f).max(0.0);
    let cdh = (temp_f - COOLING_BASE_F).max(0.0);
    let m = tod_factor(forecast_hour) * (1.0 + sensitivity.heat * hdh + sensitivity.cool * cdh);
    round_to(m, 4)
}

/// Demand multiplier for every node in the grid.
pub fn compute_demand_multipliers(
    grid: &GridGraph,
    city_temps: &CityTemps,
    forecast_hour: u32,
    region: &str,
) -> DemandMultipliers {
    let sensitivity = region_sensitivity(region);

    let multipliers: DemandMultipliers = grid
        .nodes()
        .iter()
        .map(|node| {
            let city = nearest_city(node.lat, node.lon);
            let temp = city_temps.get(city).copied().unwrap_or(NEUTRAL_TEMP_F);
            (node.id.clone(), demand_multiplier(temp, forecast_hour, sensitivity))
        })
        .collect();

    debug!(
        "Computed demand multipliers for {} nodes at hour {}",
        multipliers.len(),
        forecast_hour
    );
    multipliers
}

/// Resolve temperatures for a scenario and compute every node's multiplier.
pub async fn scenario_multipliers(
    grid: &GridGraph,
    weather: &WeatherService,
    scenario: Scenario,
    forecast_hour: u32,
) -> DemandMultipliers {
    let temps = temps_for_scenario(scenario, forecast_hour, weather).await;
    compute_demand_multipliers(grid, &temps, forecast_hour, GRID_REGION)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::grid::GridData;
    use crate::services::grid::test_support::node;

    #[test]
    fn test_nearest_city() {
        assert_eq!(nearest_city(30.3, -97.7), "Austin, TX");
        assert_eq!(nearest_city(29.8, -95.4), "Houston, TX");
        assert_eq!(nearest_city(31.9, -102.3), "San Antonio, TX");
    }

    #[test]
    fn test_resolve_city_name() {
        assert_eq!(resolve_city_name("austin-tx"), Some("Austin, TX"));
        assert_eq!(resolve_city_name("San_Antonio, TX"), Some("San Antonio, TX"));
        assert_eq!(resolve_city_name("NEWYORKNY"), Some("New York, NY"));
        assert_eq!(resolve_city_name("paris"), None);
    }

    #[test]
    fn test_multiplier_formula() {
        let ercot = region_sensitivity("ERCOT");
        // Hour 36 -> tod[12] = 1.02; Dallas at 8F -> 1 + 0.05 * 57
        assert_eq!(demand_multiplier(8.0, 36, ercot), round_to(1.02 * 3.85, 4));
        // Neutral band between 65 and 75 leaves only the daily curve
        assert_eq!(demand_multiplier(70.0, 18, ercot), 1.15);
        // Cooling
        assert_eq!(demand_multiplier(85.0, 11, ercot), 1.3);
    }

    #[test]
    fn test_city_temps_for_hour() {
        assert_eq!(city_temps_for_hour(None, 36)["Dallas, TX"], 8.0);

        let mut forecasts = CityForecasts::new();
        forecasts.insert(
            "Austin, TX".to_string(),
            vec![
                HourlyTemp { hour: 30, temp_f: 20.0 },
                HourlyTemp { hour: 35, temp_f: 11.0 },
                HourlyTemp { hour: 40, temp_f: 9.0 },
            ],
        );
        forecasts.insert("Houston, TX".to_string(), Vec::new());

        let temps = city_temps_for_hour(Some(&forecasts), 36);
        assert_eq!(temps["Austin, TX"], 11.0);
        assert_eq!(temps["Houston, TX"], 18.0);
        assert_eq!(temps["Chicago, IL"], 10.0);
        assert_eq!(temps.len(), CITIES.len());
    }

    #[test]
    fn test_compute_multipliers_per_node() {
        let grid = GridGraph::from_data(GridData {
            nodes: vec![
                node("B1", 32.78, -96.80, 100.0, 200.0, 345.0),
                node("B2", 29.76, -95.37, 100.0, 200.0, 345.0),
            ],
            edges: vec![],
        });

        let normal = compute_demand_multipliers(&grid, &normal_temps(), 12, "ERCOT");
        assert_eq!(normal["B1"], 1.02);
        assert_eq!(normal["B2"], 1.02);

        let uri = compute_demand_multipliers(&grid, &uri_fallback_temps(), 12, "ERCOT");
        assert!(uri["B1"] > uri["B2"], "Dallas is colder than Houston");
    }

    #[test]
    fn test_normal_scenario_temps() {
        let temps = normal_temps();
        assert!(temps.values().all(|t| *t == NEUTRAL_TEMP_F));
    }
}
