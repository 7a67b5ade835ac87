use axum::{
    extract::{Path, State},
    routing::{get, post},
    Router,
};
use metrics::histogram;
use std::time::Instant;

use super::extractors::ValidatedJson;
use super::response::ApiResponse;
use crate::error::Result;
use crate::models::orchestrate::{
    OrchestrateRequest, OrchestrationSummary, SessionsResponse, SimulationSession,
};
use crate::{app_state::AppState, services::OrchestratorService};

/// Build the `/api/orchestrate` routes
pub fn orchestrate_routes() -> Router<AppState> {
    Router::new()
        .route("/run", post(run_pipeline))
        .route("/sessions", get(list_sessions))
        .route("/sessions/{session_id}", get(get_session))
}

/// Run demand, cascade, prices, alerts and crew dispatch as one session
#[utoipa::path(
    post,
    path = "/api/orchestrate/run",
    tag = "orchestrate",
    request_body = OrchestrateRequest,
    responses(
        (status = 200, description = "Completed session summary", body = OrchestrationSummary),
        (status = 422, description = "Invalid request")
    )
)]
pub async fn run_pipeline(
    State(orchestrator): State<OrchestratorService>,
    ValidatedJson(request): ValidatedJson<OrchestrateRequest>,
) -> ApiResponse<OrchestrationSummary> {
    let started = Instant::now();
    let summary = orchestrator.run(&request).await;
    histogram!("orchestration_duration_seconds").record(started.elapsed().as_secs_f64());

    ApiResponse::success(summary)
}

/// Recent sessions, newest first
#[utoipa::path(
    get,
    path = "/api/orchestrate/sessions",
    tag = "orchestrate",
    responses((status = 200, description = "Session summaries", body = SessionsResponse))
)]
pub async fn list_sessions(
    State(orchestrator): State<OrchestratorService>,
) -> ApiResponse<SessionsResponse> {
    ApiResponse::success(orchestrator.sessions())
}

/// One session with its stage, totals and alerts
#[utoipa::path(
    get,
    path = "/api/orchestrate/sessions/{session_id}",
    tag = "orchestrate",
    params(("session_id" = String, Path, description = "Session identifier")),
    responses(
        (status = 200, description = "Session", body = SimulationSession),
        (status = 404, description = "Unknown session")
    )
)]
pub async fn get_session(
    State(orchestrator): State<OrchestratorService>,
    Path(session_id): Path<String>,
) -> Result<ApiResponse<SimulationSession>> {
    orchestrator.session(&session_id).map(ApiResponse::success)
}
