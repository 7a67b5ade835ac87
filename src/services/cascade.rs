//! Cascading failure simulation.
//!
//! Loads are scaled by the demand multipliers, then overloaded buses trip in
//! rounds. Each bus that trips pushes 70 % of its load onto its live
//! neighbours, which may overload them in the next round. The simulation stops
//! when a round produces no new failures or after 20 rounds.
//!
//! When zone temperatures are supplied, a seeded random draw first trips
//! equipment exposed to extreme cold; those trips are reported as step `-1`.

use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::Utc;
use metrics::counter;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info};

use crate::constants::cascade::*;
use crate::constants::load::STRESSED_PCT;
use crate::models::grid::NodeStatus;
use crate::models::simulate::{CascadeResult, CascadeStep, FailedNodeInfo, FinalNodeState, Reroute};
use crate::services::demand::DemandMultipliers;
use crate::services::grid::GridGraph;
use crate::utils::round_to;

/// Temperature (°F) per weather zone
pub type ZoneTemps = HashMap<String, f64>;

/// Parameters of a single run.
#[derive(Debug, Clone, Copy)]
pub struct CascadeParams<'a> {
    pub multipliers: &'a DemandMultipliers,
    pub scenario_label: &'a str,
    pub forecast_hour: u32,
    pub zone_temps: Option<&'a ZoneTemps>,
}

/// Probability that a node trips from cold alone.
pub fn cold_trip_probability(temp_f: f64, capacity_mw: f64) -> f64 {
    let base = if temp_f < SEVERE_COLD_F {
        SEVERE_COLD_TRIP_RATE
    } else if temp_f < FREEZING_F {
        FREEZING_TRIP_RATE
    } else {
        0.0
    };

    if base > 0.0 && capacity_mw > LARGE_UNIT_MW {
        (base * 2.0).min(1.0)
    } else {
        base
    }
}

/// Run the cascade on a working copy of the node loads. The graph itself is
/// never modified.
pub fn run_cascade(grid: &GridGraph, params: CascadeParams<'_>) -> CascadeResult {
    let started_at = Utc::now();
    let nodes = grid.nodes();
    let total_nodes = nodes.len();

    info!(
        scenario = params.scenario_label,
        forecast_hour = params.forecast_hour,
        nodes = total_nodes,
        weather_zones = params.zone_temps.map_or(0, |z| z.len()),
        "Starting cascade simulation"
    );

    let mut load: Vec<f64> = nodes
        .iter()
        .map(|n| n.base_load_mw * params.multipliers.get(&n.id).copied().unwrap_or(1.0))
        .collect();
    let mut failed: HashSet<usize> = HashSet::new();
    let mut steps: Vec<CascadeStep> = Vec::new();

    if let Some(zone_temps) = params.zone_temps {
        let mut rng = StdRng::seed_from_u64(RNG_SEED);
        let mut tripped = Vec::new();

        for (idx, node) in nodes.iter().enumerate() {
            let Some(&temp) = zone_temps.get(&node.weather_zone) else {
                continue;
            };
            let p = cold_trip_probability(temp, node.capacity_mw);
            if p > 0.0 && rng.gen::<f64>() < p {
                tripped.push(idx);
                failed.insert(idx);
                load[idx] = 0.0;
            }
        }

        if tripped.is_empty() {
            info!("No cold-weather failures");
        } else {
            info!(
                "Cold-weather pre-failures: {} nodes ({:.1}% of grid)",
                tripped.len(),
                pct(tripped.len(), total_nodes)
            );
            steps.push(CascadeStep {
                step: -1,
                new_failures: tripped
                    .iter()
                    .map(|&i| failure_info(grid, i, 0.0))
                    .collect(),
                reroutes: Vec::new(),
                total_failed: failed.len(),
                total_load_shed_mw: 0.0,
            });
        }
    }

    for iteration in 0..MAX_ITERATIONS {
        let new_failures: Vec<usize> = (0..total_nodes)
            .filter(|i| !failed.contains(i) && load[*i] > nodes[*i].capacity_mw * FAILURE_THRESHOLD)
            .collect();

        if new_failures.is_empty() {
            break;
        }

        // A node that trips this round never receives load from another
        // node tripping in the same round.
        failed.extend(new_failures.iter().copied());

        debug!(
            "Cascade iteration {}: {} new failures, {} total failed ({:.1}% of grid)",
            iteration,
            new_failures.len(),
            failed.len(),
            pct(failed.len(), total_nodes)
        );

        let mut reroutes = Vec::new();
        for &idx in &new_failures {
            let alive: Vec<usize> = grid
                .neighbor_indices(idx)
                .iter()
                .copied()
                .filter(|nb| !failed.contains(nb))
                .collect();
            if alive.is_empty() {
                continue;
            }

            let per_neighbour = load[idx] * REDISTRIBUTION_FACTOR / alive.len() as f64;
            for nb in alive {
                load[nb] += per_neighbour;
                reroutes.push(Reroute {
                    from_id: nodes[idx].id.clone(),
                    to_id: nodes[nb].id.clone(),
                    from_lat: nodes[idx].lat,
                    from_lon: nodes[idx].lon,
                    to_lat: nodes[nb].lat,
                    to_lon: nodes[nb].lon,
                    load_mw: round_to(per_neighbour, 1),
                });
            }
        }

        steps.push(CascadeStep {
            step: iteration as i32,
            new_failures: new_failures
                .iter()
                .map(|&i| failure_info(grid, i, load[i]))
                .collect(),
            reroutes,
            total_failed: failed.len(),
            total_load_shed_mw: round_to(shed(&load, &failed), 1),
        });
    }

    let final_node_states: BTreeMap<String, FinalNodeState> = nodes
        .iter()
        .enumerate()
        .map(|(i, node)| {
            let cap = node.capacity_mw;
            let load_pct = if cap > 0.0 { load[i] / cap * 100.0 } else { 0.0 };
            let status = if failed.contains(&i) {
                NodeStatus::Failed
            } else if load_pct > STRESSED_PCT {
                NodeStatus::Stressed
            } else {
                NodeStatus::Nominal
            };
            (
                node.id.clone(),
                FinalNodeState {
                    status,
                    current_load_mw: round_to(load[i], 1),
                    capacity_mw: round_to(cap, 1),
                    load_pct: round_to(load_pct, 1),
                },
            )
        })
        .collect();

    let mut failed_node_ids: Vec<String> = failed.iter().map(|&i| nodes[i].id.clone()).collect();
    failed_node_ids.sort();

    let total_shed = shed(&load, &failed);
    let completed_at = Utc::now();

    counter!("cascade_runs_total").increment(1);
    info!(
        "Cascade simulation complete: {}/{} nodes failed ({:.1}%), {} steps, {:.0} MW shed, duration={}ms",
        failed.len(),
        total_nodes,
        pct(failed.len(), total_nodes),
        steps.len(),
        total_shed,
        (completed_at - started_at).num_milliseconds()
    );

    CascadeResult {
        scenario: params.scenario_label.to_string(),
        forecast_hour: params.forecast_hour,
        started_at,
        completed_at,
        cascade_depth: steps.len(),
        steps,
        total_failed_nodes: failed.len(),
        total_nodes,
        total_load_shed_mw: round_to(total_shed, 1),
        failed_node_ids,
        final_node_states,
    }
}

fn failure_info(grid: &GridGraph, idx: usize, load_mw: f64) -> FailedNodeInfo {
    let node = &grid.nodes()[idx];
    FailedNodeInfo {
        id: node.id.clone(),
        lat: node.lat,
        lon: node.lon,
        load_mw: round_to(load_mw, 1),
        capacity_mw: round_to(node.capacity_mw, 1),
    }
}

/// Load still attributed to failed nodes
fn shed(load: &[f64], failed: &HashSet<usize>) -> f64 {
    failed.iter().map(|&i| load[i]).sum()
}

fn pct(part: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        part as f64 / total as f64 * 100.0
    }
}
