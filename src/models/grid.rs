use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::constants::forecast::DEFAULT_FORECAST_HOUR;

/// A bus in the merged ACTIVSg2000 + Travis150 model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct GridNode {
    pub id: String,
    pub bus_num: u32,
    pub lat: f64,
    pub lon: f64,
    pub base_load_mw: f64,
    pub capacity_mw: f64,
    pub voltage_kv: f64,
    pub region: String,
    pub weather_zone: String,
    pub area: i32,
    pub grid_zone: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub substation: Option<u32>,
    /// Dataset the bus came from; empty in caches written before the
    /// Travis150 overlay existed
    #[serde(default)]
    pub source: String,
}

/// A line or transformer between two buses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct GridEdge {
    pub from_bus: String,
    pub to_bus: String,
    pub capacity_mva: f64,
    pub impedance: f64,
}

/// Raw node and edge lists, also the on-disk cache format.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GridData {
    pub nodes: Vec<GridNode>,
    pub edges: Vec<GridEdge>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum NodeStatus {
    Failed,
    Stressed,
    Nominal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

/// Hotspot and arc severity on the operator globe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Critical,
    Stressed,
    Normal,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct GridTopologyResponse {
    pub total_nodes: usize,
    pub total_edges: usize,
    pub region: String,
    pub nodes: Vec<GridNode>,
    pub edges: Vec<GridEdge>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct GridStatusNode {
    pub id: String,
    pub lat: f64,
    pub lon: f64,
    pub status: NodeStatus,
    pub load_pct: f64,
    pub load_mw: f64,
    pub capacity_mw: f64,
    pub weather_zone: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct GridStatusSummary {
    pub total_nodes: usize,
    pub stressed_count: usize,
    pub failed_count: usize,
    pub nominal_count: usize,
    pub total_load_mw: f64,
    pub total_capacity_mw: f64,
    pub cascade_probability: f64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct GridStatusResponse {
    pub scenario: String,
    pub forecast_hour: u32,
    pub generated_at: DateTime<Utc>,
    pub nodes: Vec<GridStatusNode>,
    pub edges: Vec<GridEdge>,
    pub summary: GridStatusSummary,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct NodeDetailResponse {
    pub id: String,
    pub lat: f64,
    pub lon: f64,
    pub load_mw: f64,
    pub capacity_mw: f64,
    pub load_pct: f64,
    pub status: NodeStatus,
    pub voltage_kv: f64,
    pub region: String,
    pub weather_zone: String,
    pub connected_nodes: Vec<String>,
    pub risk_level: RiskLevel,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CascadeProbabilityResponse {
    /// Probability per ISO region
    pub probabilities: BTreeMap<String, f64>,
    pub forecast_hour: u32,
    pub scenario: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct GridHotspot {
    pub id: String,
    pub name: String,
    pub lat: f64,
    pub lon: f64,
    pub status: Severity,
    pub load_mw: f64,
    pub capacity_mw: f64,
    pub outage_risk_pct: f64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct GridArc {
    pub source: String,
    pub target: String,
    /// `[lat, lon]`
    pub source_coords: [f64; 2],
    /// `[lat, lon]`
    pub target_coords: [f64; 2],
    pub flow_mw: f64,
    pub capacity_mw: f64,
    pub utilization_pct: f64,
    pub status: Severity,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct HotspotsResponse {
    pub hotspots: Vec<GridHotspot>,
    pub scenario: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ArcsResponse {
    pub arcs: Vec<GridArc>,
    pub scenario: String,
}

/// Query for the grid status and cascade probability endpoints
#[derive(Debug, Clone, Deserialize, Validate, IntoParams)]
pub struct GridStatusQuery {
    #[serde(default = "default_grid_scenario")]
    pub scenario: String,
    #[serde(default = "default_forecast_hour")]
    #[validate(range(min = 0, max = 48))]
    pub forecast_hour: u32,
}

/// Query carrying only a scenario name
#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct ScenarioQuery {
    #[serde(default = "default_scenario")]
    pub scenario: String,
}

fn default_grid_scenario() -> String {
    "uri_2021".to_string()
}

pub(crate) fn default_scenario() -> String {
    "uri".to_string()
}

pub(crate) fn default_forecast_hour() -> u32 {
    DEFAULT_FORECAST_HOUR
}
