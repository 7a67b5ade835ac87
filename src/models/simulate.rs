use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use utoipa::ToSchema;
use validator::Validate;

use super::grid::{default_forecast_hour, default_scenario, NodeStatus};

/// Body of `POST /api/simulate/cascade`
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CascadeRequest {
    /// uri, normal or live
    #[serde(default = "default_scenario")]
    pub scenario: String,
    /// Scenario start; also labels the run
    #[serde(default = "default_start_time")]
    #[validate(length(min = 10))]
    pub start_time: String,
    #[serde(default = "default_forecast_hour")]
    #[validate(range(min = 0, max = 48))]
    pub forecast_hour: u32,
    #[serde(default = "default_region")]
    #[validate(length(min = 1, max = 16))]
    pub region: String,
    /// Optional temperature (°F) per weather zone; enables cold-weather
    /// equipment trips before the cascade starts
    #[serde(default)]
    pub zone_temps_f: Option<HashMap<String, f64>>,
}

impl Default for CascadeRequest {
    fn default() -> Self {
        Self {
            scenario: default_scenario(),
            start_time: default_start_time(),
            forecast_hour: default_forecast_hour(),
            region: default_region(),
            zone_temps_f: None,
        }
    }
}

fn default_start_time() -> String {
    "2021-02-13T00:00:00".to_string()
}

fn default_region() -> String {
    "ERCOT".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct FailedNodeInfo {
    pub id: String,
    pub lat: f64,
    pub lon: f64,
    pub load_mw: f64,
    pub capacity_mw: f64,
}

/// Load pushed from a failed node onto a live neighbour
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct Reroute {
    pub from_id: String,
    pub to_id: String,
    pub from_lat: f64,
    pub from_lon: f64,
    pub to_lat: f64,
    pub to_lon: f64,
    pub load_mw: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct CascadeStep {
    /// -1 for cold-weather trips, then 0, 1, ...
    pub step: i32,
    pub new_failures: Vec<FailedNodeInfo>,
    pub reroutes: Vec<Reroute>,
    pub total_failed: usize,
    pub total_load_shed_mw: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct FinalNodeState {
    pub status: NodeStatus,
    pub current_load_mw: f64,
    pub capacity_mw: f64,
    pub load_pct: f64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CascadeResult {
    pub scenario: String,
    pub forecast_hour: u32,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
    pub steps: Vec<CascadeStep>,
    pub total_failed_nodes: usize,
    pub total_nodes: usize,
    pub cascade_depth: usize,
    pub total_load_shed_mw: f64,
    /// Sorted
    pub failed_node_ids: Vec<String>,
    pub final_node_states: BTreeMap<String, FinalNodeState>,
}
