//! Grid views: per-node status under a demand scenario, raw topology,
//! single-node detail and cascade probability.

use std::collections::BTreeMap;

use chrono::Utc;

use crate::constants::api::GRID_REGION;
use crate::constants::load::{CRITICAL_PCT, FAILED_PCT, MEDIUM_RISK_PCT, STRESSED_PCT};
use crate::error::{ApiError, Result};
use crate::models::grid::{
    CascadeProbabilityResponse, GridStatusNode, GridStatusResponse, GridStatusSummary,
    GridTopologyResponse, NodeDetailResponse, NodeStatus, RiskLevel,
};
use crate::services::demand::DemandMultipliers;
use crate::services::grid::GridGraph;
use crate::utils::round_to;

/// Fixed cascade probabilities for regions without a grid model
const OTHER_REGION_PROBABILITIES: [(&str, f64); 6] = [
    ("WECC", 0.12),
    ("PJM", 0.18),
    ("NYISO", 0.05),
    ("MISO", 0.08),
    ("ISO-NE", 0.03),
    ("SPP", 0.06),
];

fn load_pct(load: f64, capacity: f64) -> f64 {
    if capacity > 0.0 {
        load / capacity * 100.0
    } else {
        0.0
    }
}

/// Status of every node with loads scaled by `multipliers`.
pub fn grid_status(
    grid: &GridGraph,
    multipliers: &DemandMultipliers,
    scenario: &str,
    forecast_hour: u32,
) -> GridStatusResponse {
    let mut nodes = Vec::with_capacity(grid.node_count());
    let (mut stressed, mut failed, mut nominal) = (0, 0, 0);
    let (mut total_load, mut total_cap) = (0.0, 0.0);

    for node in grid.nodes() {
        let cap = node.capacity_mw;
        let load = node.base_load_mw * multipliers.get(&node.id).copied().unwrap_or(1.0);
        let pct = load_pct(load, cap);

        let status = if load > cap {
            failed += 1;
            NodeStatus::Failed
        } else if pct > STRESSED_PCT {
            stressed += 1;
            NodeStatus::Stressed
        } else {
            nominal += 1;
            NodeStatus::Nominal
        };

        total_load += load;
        total_cap += cap;

        nodes.push(GridStatusNode {
            id: node.id.clone(),
            lat: node.lat,
            lon: node.lon,
            status,
            load_pct: round_to(pct, 1),
            load_mw: round_to(load, 1),
            capacity_mw: round_to(cap, 1),
            weather_zone: node.weather_zone.clone(),
        });
    }

    let total = nodes.len();
    let cascade_probability = if total > 0 {
        round_to((stressed + failed) as f64 / total as f64, 2)
    } else {
        0.0
    };

    GridStatusResponse {
        scenario: scenario.to_string(),
        forecast_hour,
        generated_at: Utc::now(),
        nodes,
        edges: grid.edges().to_vec(),
        summary: GridStatusSummary {
            total_nodes: total,
            stressed_count: stressed,
            failed_count: failed,
            nominal_count: nominal,
            total_load_mw: round_to(total_load, 1),
            total_capacity_mw: round_to(total_cap, 1),
            cascade_probability,
        },
    }
}

pub fn topology(grid: &GridGraph) -> GridTopologyResponse {
    let raw = grid.topology();
    GridTopologyResponse {
        total_nodes: raw.nodes.len(),
        total_edges: raw.edges.len(),
        region: GRID_REGION.to_string(),
        nodes: raw.nodes.clone(),
        edges: raw.edges.clone(),
    }
}

/// Detail of one node at base load.
pub fn node_detail(grid: &GridGraph, node_id: &str) -> Result<NodeDetailResponse> {
    let node = grid
        .node(node_id)
        .ok_or_else(|| ApiError::not_found(&format!("Node {}", node_id)))?;

    let load = node.base_load_mw;
    let pct = load_pct(load, node.capacity_mw);

    let status = if pct > FAILED_PCT {
        NodeStatus::Failed
    } else if pct > STRESSED_PCT {
        NodeStatus::Stressed
    } else {
        NodeStatus::Nominal
    };

    Ok(NodeDetailResponse {
        id: node.id.clone(),
        lat: node.lat,
        lon: node.lon,
        load_mw: round_to(load, 1),
        capacity_mw: round_to(node.capacity_mw, 1),
        load_pct: round_to(pct, 1),
        status,
        voltage_kv: node.voltage_kv,
        region: node.region.clone(),
        weather_zone: node.weather_zone.clone(),
        connected_nodes: grid.connected_nodes(node_id),
        risk_level: risk_level(pct),
    })
}

pub fn risk_level(load_pct: f64) -> RiskLevel {
    if load_pct > FAILED_PCT {
        RiskLevel::Critical
    } else if load_pct > STRESSED_PCT {
        RiskLevel::High
    } else if load_pct > MEDIUM_RISK_PCT {
        RiskLevel::Medium
    } else {
        RiskLevel::Low
    }
}

/// Non-linear cascade risk from the share and severity of stressed nodes.
///
/// A small fraction of heavily loaded nodes is enough to make a cascade
/// likely, since every failure pushes load onto its neighbours.
pub fn ercot_cascade_probability(grid: &GridGraph, multipliers: &DemandMultipliers) -> f64 {
    let total = grid.node_count();
    if total == 0 {
        return 0.0;
    }

    let mut above_stressed = 0usize;
    let mut above_critical = 0usize;
    let mut total_stress = 0.0;

    for node in grid.nodes() {
        let load = node.base_load_mw * multipliers.get(&node.id).copied().unwrap_or(1.0);
        let pct = load_pct(load, node.capacity_mw);
        if pct > STRESSED_PCT {
            above_stressed += 1;
            total_stress += ((pct - STRESSED_PCT) / 20.0).min(3.0);
        }
        if pct > CRITICAL_PCT {
            above_critical += 1;
        }
    }

    let stressed_frac = above_stressed as f64 / total as f64;
    let critical_frac = above_critical as f64 / total as f64;
    let avg_overstress = total_stress / above_stressed.max(1) as f64;

    let base = 1.0 - 1.0 / (1.0 + (stressed_frac / 0.12).powf(2.5));
    let critical_boost = (critical_frac * 5.0).min(0.3);
    let severity_boost = (avg_overstress * 0.1).min(0.15);

    round_to((base + critical_boost + severity_boost).min(1.0), 2)
}

pub fn cascade_probability(
    grid: &GridGraph,
    multipliers: &DemandMultipliers,
    scenario: &str,
    forecast_hour: u32,
) -> CascadeProbabilityResponse {
    let mut probabilities = BTreeMap::new();
    probabilities.insert(
        GRID_REGION.to_string(),
        ercot_cascade_probability(grid, multipliers),
    );
    for (region, p) in OTHER_REGION_PROBABILITIES {
        probabilities.insert(region.to_string(), p);
    }

    CascadeProbabilityResponse {
        probabilities,
        forecast_hour,
        scenario: scenario.to_string(),
    }
}
