use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use super::utility::{Crew, CrewStatus};

/// Kind of equipment that failed, which decides the crew specialty needed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum FailureType {
    Transmission,
    Substation,
    Distribution,
    Generation,
    Unknown,
}

impl FailureType {
    /// Expected repair time on site
    pub fn repair_minutes(self) -> u32 {
        match self {
            FailureType::Transmission => 180,
            FailureType::Substation => 120,
            FailureType::Distribution => 60,
            FailureType::Generation => 240,
            FailureType::Unknown => 90,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SpecialtyMatch {
    Exact,
    Partial,
    Mismatch,
}

/// A node lost in the cascade and awaiting repair
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct FailedNode {
    pub id: String,
    pub lat: f64,
    pub lon: f64,
    pub load_mw: f64,
    pub capacity_mw: f64,
    pub voltage_kv: f64,
    pub weather_zone: String,
    pub failure_type: FailureType,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct DispatchAssignment {
    pub assignment_id: String,
    pub crew_id: String,
    pub crew_name: String,
    pub target_node_id: String,
    pub target_lat: f64,
    pub target_lon: f64,
    pub distance_km: f64,
    pub eta_minutes: u32,
    pub specialty_match: SpecialtyMatch,
    pub match_score: f64,
    pub failure_type: FailureType,
    pub status: CrewStatus,
    pub repair_minutes: u32,
    pub dispatched_at: Option<DateTime<Utc>>,
    pub arrived_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    /// Crew position when dispatched; travel is interpolated from here
    #[serde(skip)]
    pub origin: (f64, f64),
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DispatchRecommendation {
    pub assignments: Vec<DispatchAssignment>,
    pub unassigned_nodes: Vec<FailedNode>,
    pub total_crews_available: usize,
    pub total_failed_nodes: usize,
    pub avg_eta_minutes: f64,
    pub coverage_pct: f64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DispatchStatusResponse {
    pub assignments: Vec<DispatchAssignment>,
    pub crews: Vec<Crew>,
    pub repaired_nodes: Vec<String>,
    pub total_dispatched: usize,
    pub total_repairing: usize,
    pub total_complete: usize,
}

/// Body of `POST /api/utility/crews/dispatch`
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct DispatchRequest {
    #[validate(length(min = 1, message = "crew_id is required"))]
    pub crew_id: String,
    #[validate(length(min = 1, message = "target_node_id is required"))]
    pub target_node_id: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DispatchInitResponse {
    pub status: String,
    pub crews_loaded: usize,
    pub failed_nodes: usize,
    pub cascade_depth: usize,
    pub total_load_shed_mw: f64,
}
