use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use super::grid::{default_forecast_hour, default_scenario};

/// Body of `POST /api/orchestrate/run`
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct OrchestrateRequest {
    /// uri, normal or live
    #[serde(default = "default_scenario")]
    pub scenario: String,
    #[serde(default = "default_forecast_hour")]
    #[validate(range(min = 0, max = 47, message = "forecast_hour must be between 0 and 47"))]
    pub forecast_hour: u32,
    #[serde(default = "default_grid_region")]
    #[validate(length(min = 1, max = 16))]
    pub grid_region: String,
}

impl Default for OrchestrateRequest {
    fn default() -> Self {
        Self {
            scenario: default_scenario(),
            forecast_hour: default_forecast_hour(),
            grid_region: default_grid_region(),
        }
    }
}

fn default_grid_region() -> String {
    "ERCOT".to_string()
}

/// Pipeline stage reached by a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Running,
    CascadeDone,
    PricesDone,
    AlertsDone,
    Completed,
}

/// Alert raised by a pipeline run, grid-wide or for one household
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct LiveAlert {
    pub id: String,
    pub session_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_id: Option<String>,
    pub grid_region: String,
    /// critical, warning or optimization
    pub severity: String,
    pub title: String,
    pub description: String,
    /// `cascade_warning`, `price_spike`, `device_savings`, `load_shed` or `weather_*`
    pub alert_type: String,
    #[schema(value_type = Object)]
    pub metadata: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SimulationSession {
    pub session_id: String,
    pub scenario: String,
    pub grid_region: String,
    pub forecast_hour: u32,
    pub status: SessionStatus,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub total_failed_nodes: usize,
    pub cascade_depth: usize,
    pub total_load_shed_mw: f64,
    pub peak_price_mwh: f64,
    pub avg_price_mwh: f64,
    pub alerts_generated: usize,
    pub notifications_sent: usize,
    pub notifications_failed: usize,
    pub crews_dispatched: usize,
    pub avg_eta_minutes: f64,
    pub alerts: Vec<LiveAlert>,
}

/// Result of `POST /api/orchestrate/run`
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct OrchestrationSummary {
    pub session_id: String,
    pub scenario: String,
    pub grid_region: String,
    pub status: SessionStatus,
    pub total_failed_nodes: usize,
    pub cascade_depth: usize,
    pub total_load_shed_mw: f64,
    pub peak_price_mwh: f64,
    pub avg_price_mwh: f64,
    pub alerts_generated: usize,
    pub crews_dispatched: usize,
    pub avg_eta_minutes: f64,
}

impl From<&SimulationSession> for OrchestrationSummary {
    fn from(session: &SimulationSession) -> Self {
        Self {
            session_id: session.session_id.clone(),
            scenario: session.scenario.clone(),
            grid_region: session.grid_region.clone(),
            status: session.status,
            total_failed_nodes: session.total_failed_nodes,
            cascade_depth: session.cascade_depth,
            total_load_shed_mw: session.total_load_shed_mw,
            peak_price_mwh: session.peak_price_mwh,
            avg_price_mwh: session.avg_price_mwh,
            alerts_generated: session.alerts_generated,
            crews_dispatched: session.crews_dispatched,
            avg_eta_minutes: session.avg_eta_minutes,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SessionsResponse {
    /// Newest first
    pub sessions: Vec<OrchestrationSummary>,
    pub total: usize,
}
