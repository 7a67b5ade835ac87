use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Region status ordered from best to worst
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum RegionStatus {
    Normal,
    Stressed,
    Critical,
    Blackout,
}

impl RegionStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            RegionStatus::Normal => "normal",
            RegionStatus::Stressed => "stressed",
            RegionStatus::Critical => "critical",
            RegionStatus::Blackout => "blackout",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum CrewStatus {
    Deployed,
    Standby,
    EnRoute,
    Dispatched,
    OnSite,
    Repairing,
    Complete,
}

impl CrewStatus {
    /// Crews that can take a new assignment
    pub fn is_available(self) -> bool {
        matches!(self, CrewStatus::Standby | CrewStatus::Complete)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum EventSeverity {
    Info,
    Warning,
    Critical,
    Emergency,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct WeatherThreat {
    pub temp_f: f64,
    pub wind_mph: f64,
    pub condition: String,
    pub is_extreme: bool,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RegionOverview {
    pub region_id: String,
    pub name: String,
    pub status: RegionStatus,
    pub load_mw: f64,
    pub capacity_mw: f64,
    pub utilization_pct: f64,
    pub weather: WeatherThreat,
    pub outage_count: usize,
    pub affected_customers: u64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct NationalOverview {
    pub national_status: RegionStatus,
    pub grid_frequency_hz: f64,
    pub total_load_mw: f64,
    pub total_capacity_mw: f64,
    pub regions: Vec<RegionOverview>,
    pub timestamp: DateTime<Utc>,
}

/// Weather-driven event card for one overview region
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct WeatherEvent {
    pub zone: String,
    pub city: String,
    pub title: String,
    pub description: String,
    /// 1 (minor) to 4 (severe)
    pub severity: u8,
    pub temp_f: f64,
    pub wind_mph: f64,
    pub condition: String,
    pub grid_status: RegionStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Crew {
    pub crew_id: String,
    pub name: String,
    pub status: CrewStatus,
    pub lat: f64,
    pub lon: f64,
    pub city: String,
    pub specialty: String,
    pub assigned_region: Option<String>,
    pub eta_minutes: Option<u32>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CrewOptimizationResponse {
    pub crews: Vec<Crew>,
    pub total_deployed: usize,
    pub coverage_pct: f64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TimelineEvent {
    pub event_id: String,
    pub timestamp_offset_minutes: u32,
    pub title: String,
    pub description: String,
    pub severity: EventSeverity,
    pub region: Option<String>,
    pub affected_nodes: u32,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ScenarioOutcome {
    pub scenario_name: String,
    pub total_affected_customers: u64,
    pub peak_price_mwh: f64,
    pub blackout_duration_hours: f64,
    pub regions_affected: usize,
    pub cascade_steps: usize,
    pub failed_nodes: usize,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct OutcomeComparison {
    pub without_blackout: ScenarioOutcome,
    pub with_blackout: ScenarioOutcome,
    pub customers_saved: u64,
    pub price_reduction_pct: f64,
    pub cascade_reduction_pct: f64,
}
