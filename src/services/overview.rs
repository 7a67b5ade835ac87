//! Operator overview: five ERCOT regions aggregated from the grid, plus
//! weather event cards for regions under threat.

use std::collections::HashMap;

use chrono::Utc;
use tracing::debug;

use crate::constants::impact::CUSTOMERS_PER_MW;
use crate::error::{ApiError, Result};
use crate::models::scenario::Scenario;
use crate::models::utility::{NationalOverview, RegionOverview, RegionStatus, WeatherEvent, WeatherThreat};
use crate::services::demand::DemandMultipliers;
use crate::services::grid::zones::{COAST, EAST, FAR_WEST, NORTH, NORTH_CENTRAL, SOUTHERN, SOUTH_CENTRAL, WEST};
use crate::services::grid::GridGraph;
use crate::utils::round_to;

const NOMINAL_FREQUENCY_HZ: f64 = 60.0;
const MIN_FREQUENCY_HZ: f64 = 59.0;

/// Region id, display name and the city named on event cards
const REGIONS: [(&str, &str, &str); 5] = [
    ("HOU", "Houston", "Houston"),
    ("DAL", "Dallas-Fort Worth", "DFW"),
    ("AUS", "Austin", "Austin / SA"),
    ("SAT", "San Antonio", "San Antonio"),
    ("WTX", "West Texas", "Midland"),
];

/// Overview region for a weather zone
pub fn region_for_zone(zone: &str) -> &'static str {
    match zone {
        COAST | EAST => "HOU",
        NORTH_CENTRAL | NORTH => "DAL",
        SOUTH_CENTRAL => "AUS",
        SOUTHERN => "SAT",
        WEST | FAR_WEST => "WTX",
        _ => "WTX",
    }
}

fn threat(temp_f: f64, wind_mph: f64, condition: &str, is_extreme: bool) -> WeatherThreat {
    WeatherThreat {
        temp_f,
        wind_mph,
        condition: condition.to_string(),
        is_extreme,
    }
}

/// Scripted conditions for each region.
fn scenario_weather(scenario: Scenario, region_id: &str) -> WeatherThreat {
    match (scenario, region_id) {
        (Scenario::Uri, "HOU") => threat(18.0, 25.0, "Freezing rain", true),
        (Scenario::Uri, "DAL") => threat(8.0, 35.0, "Ice storm", true),
        (Scenario::Uri, "AUS") => threat(12.0, 20.0, "Freezing rain", true),
        (Scenario::Uri, "SAT") => threat(15.0, 18.0, "Sleet", true),
        (Scenario::Uri, _) => threat(5.0, 40.0, "Blizzard", true),
        (_, "DAL") => threat(68.0, 10.0, "Partly cloudy", false),
        (_, "AUS") => threat(70.0, 7.0, "Clear", false),
        (_, "SAT") => threat(74.0, 6.0, "Clear", false),
        (_, "WTX") => threat(65.0, 15.0, "Windy", false),
        _ => threat(72.0, 8.0, "Clear", false),
    }
}

pub fn status_from_utilization(pct: f64) -> RegionStatus {
    if pct >= 95.0 {
        RegionStatus::Blackout
    } else if pct >= 85.0 {
        RegionStatus::Critical
    } else if pct >= 70.0 {
        RegionStatus::Stressed
    } else {
        RegionStatus::Normal
    }
}

#[derive(Default)]
struct RegionTotals {
    load: f64,
    capacity: f64,
    failed: usize,
}

pub fn overview(grid: &GridGraph, multipliers: &DemandMultipliers, scenario: Scenario) -> NationalOverview {
    let mut totals: HashMap<&str, RegionTotals> = HashMap::new();
    for node in grid.nodes() {
        let load = node.base_load_mw * multipliers.get(&node.id).copied().unwrap_or(1.0);
        let entry = totals.entry(region_for_zone(&node.weather_zone)).or_default();
        entry.load += load;
        entry.capacity += node.capacity_mw;
        if load > node.capacity_mw {
            entry.failed += 1;
        }
    }

    let regions: Vec<RegionOverview> = REGIONS
        .iter()
        .map(|(id, name, _)| {
            let t = totals.remove(id).unwrap_or_default();
            let utilization = if t.capacity > 0.0 {
                round_to(t.load / t.capacity * 100.0, 1)
            } else {
                0.0
            };
            let shortfall = (t.load - t.capacity).max(0.0);

            RegionOverview {
                region_id: id.to_string(),
                name: name.to_string(),
                status: status_from_utilization(utilization),
                load_mw: round_to(t.load, 1),
                capacity_mw: round_to(t.capacity, 1),
                utilization_pct: utilization,
                weather: scenario_weather(scenario, id),
                outage_count: t.failed,
                affected_customers: (shortfall * CUSTOMERS_PER_MW).floor() as u64,
            }
        })
        .collect();

    let national_status = regions
        .iter()
        .map(|r| r.status)
        .max()
        .unwrap_or(RegionStatus::Normal);

    let frequency = regions.iter().fold(NOMINAL_FREQUENCY_HZ, |f, r| {
        f - match r.status {
            RegionStatus::Stressed => 0.1,
            RegionStatus::Critical => 0.3,
            RegionStatus::Blackout => 0.5,
            RegionStatus::Normal => 0.0,
        }
    });

    let total_load: f64 = regions.iter().map(|r| r.load_mw).sum();
    let total_capacity: f64 = regions.iter().map(|r| r.capacity_mw).sum();

    debug!(
        "Overview for {}: national status {:?}, {} regions",
        scenario,
        national_status,
        regions.len()
    );

    NationalOverview {
        national_status,
        grid_frequency_hz: round_to(frequency.max(MIN_FREQUENCY_HZ), 2),
        total_load_mw: round_to(total_load, 1),
        total_capacity_mw: round_to(total_capacity, 1),
        regions,
        timestamp: Utc::now(),
    }
}

/// One region, matched case-insensitively.
pub fn region(
    grid: &GridGraph,
    multipliers: &DemandMultipliers,
    scenario: Scenario,
    region_id: &str,
) -> Result<RegionOverview> {
    let wanted = region_id.to_ascii_uppercase();
    overview(grid, multipliers, scenario)
        .regions
        .into_iter()
        .find(|r| r.region_id == wanted)
        .ok_or_else(|| ApiError::not_found(&format!("Region {}", region_id)))
}

/// Event severity from 1 (minor) to 4 (severe).
pub fn event_severity(region: &RegionOverview) -> u8 {
    let t = region.weather.temp_f;
    if matches!(region.status, RegionStatus::Blackout | RegionStatus::Critical) || t <= 10.0 || t >= 105.0 {
        4
    } else if t <= 20.0 || t >= 95.0 || region.weather.is_extreme {
        3
    } else if region.status == RegionStatus::Stressed {
        2
    } else {
        1
    }
}

fn event_title(region: &RegionOverview, city: &str) -> String {
    let w = &region.weather;
    if w.temp_f <= 32.0 {
        format!("{} in {} at {:.0}°F", w.condition, city, w.temp_f)
    } else if w.temp_f >= 95.0 {
        format!("Extreme heat in {} at {:.0}°F", city, w.temp_f)
    } else {
        format!("Grid {} in {}", region.status.as_str(), city)
    }
}

fn event_description(region: &RegionOverview) -> String {
    let w = &region.weather;
    let mut text = format!(
        "{} with {:.0} mph winds. {} load at {:.1}% of capacity",
        w.condition, w.wind_mph, region.name, region.utilization_pct
    );
    if region.outage_count > 0 {
        text.push_str(&format!(
            "; {} overloaded nodes, about {} customers at risk",
            region.outage_count, region.affected_customers
        ));
    }
    text.push('.');
    text
}

/// Event cards for regions with extreme weather or a non-normal grid,
/// most severe first.
pub fn weather_events(overview: &NationalOverview) -> Vec<WeatherEvent> {
    let mut events: Vec<WeatherEvent> = overview
        .regions
        .iter()
        .filter(|r| r.weather.is_extreme || r.status != RegionStatus::Normal)
        .map(|r| {
            let city = REGIONS
                .iter()
                .find(|(id, _, _)| *id == r.region_id)
                .map_or(r.name.as_str(), |(_, _, city)| city);
            WeatherEvent {
                zone: r.region_id.clone(),
                city: city.to_string(),
                title: event_title(r, city),
                description: event_description(r),
                severity: event_severity(r),
                temp_f: r.weather.temp_f,
                wind_mph: r.weather.wind_mph,
                condition: r.weather.condition.clone(),
                grid_status: r.status,
            }
        })
        .collect();

    events.sort_by(|a, b| b.severity.cmp(&a.severity));
    events
}
