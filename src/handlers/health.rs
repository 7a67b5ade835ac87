use axum::{extract::State, response::Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::app_state::AppState;
use crate::constants::api::VERSION;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct GridSize {
    pub nodes: usize,
    pub edges: usize,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthStatus {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
    pub environment: String,
    pub grid: GridSize,
}

/// Liveness check with the size of the loaded grid
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthStatus)
    )
)]
pub async fn health_check(State(state): State<AppState>) -> Json<HealthStatus> {
    Json(HealthStatus {
        status: "ok".to_string(),
        timestamp: Utc::now(),
        version: VERSION.to_string(),
        environment: state.config.environment.clone(),
        grid: GridSize {
            nodes: state.grid.node_count(),
            edges: state.grid.edge_count(),
        },
    })
}
