use axum::{
    extract::{Path, State},
    routing::{get, post},
    Router,
};
use chrono::Utc;

use super::extractors::{ApiQuery, ValidatedJson};
use super::response::{ApiResponse, Created};
use crate::error::Result;
use crate::models::alerts::DeviceAlertsResponse;
use crate::models::consumer::{
    ConsumerProfile, ConsumerProfilesResponse, ConsumerQuery, ConsumerRecommendation,
    CreateCustomProfileRequest, SavingsSummary,
};
use crate::{app_state::AppState, services::ConsumerService};

/// Build the `/api/consumer` routes
pub fn consumer_routes() -> Router<AppState> {
    Router::new()
        .route("/profiles", get(list_profiles))
        .route("/profiles/custom", post(create_custom_profile))
        .route("/recommendations/{profile_id}", get(get_recommendations))
        .route("/savings/{profile_id}", get(get_savings))
        .route("/alerts/{profile_id}", get(get_device_alerts))
}

/// Pre-made and custom household profiles
#[utoipa::path(
    get,
    path = "/api/consumer/profiles",
    tag = "consumer",
    responses((status = 200, description = "All profiles", body = ConsumerProfilesResponse))
)]
pub async fn list_profiles(
    State(consumers): State<ConsumerService>,
) -> ApiResponse<ConsumerProfilesResponse> {
    ApiResponse::success(consumers.profiles())
}

/// Register a custom household profile
#[utoipa::path(
    post,
    path = "/api/consumer/profiles/custom",
    tag = "consumer",
    request_body = CreateCustomProfileRequest,
    responses(
        (status = 201, description = "Profile created", body = ConsumerProfile),
        (status = 400, description = "Invalid profile")
    )
)]
pub async fn create_custom_profile(
    State(consumers): State<ConsumerService>,
    ValidatedJson(request): ValidatedJson<CreateCustomProfileRequest>,
) -> Created<ConsumerProfile> {
    Created(consumers.create_custom(request))
}

/// Appliance schedule, readiness and alerts for a household
#[utoipa::path(
    get,
    path = "/api/consumer/recommendations/{profile_id}",
    tag = "consumer",
    params(("profile_id" = String, Path, description = "Profile identifier"), ConsumerQuery),
    responses(
        (status = 200, description = "Recommendations", body = ConsumerRecommendation),
        (status = 404, description = "Unknown profile")
    )
)]
pub async fn get_recommendations(
    State(consumers): State<ConsumerService>,
    Path(profile_id): Path<String>,
    ApiQuery(query): ApiQuery<ConsumerQuery>,
) -> Result<ApiResponse<ConsumerRecommendation>> {
    consumers
        .recommendations(
            &profile_id,
            &query.region.to_ascii_uppercase(),
            &query.scenario,
            Utc::now(),
        )
        .map(ApiResponse::success)
}

/// Savings summary over the 48-hour horizon
#[utoipa::path(
    get,
    path = "/api/consumer/savings/{profile_id}",
    tag = "consumer",
    params(("profile_id" = String, Path, description = "Profile identifier"), ConsumerQuery),
    responses(
        (status = 200, description = "Savings summary", body = SavingsSummary),
        (status = 404, description = "Unknown profile")
    )
)]
pub async fn get_savings(
    State(consumers): State<ConsumerService>,
    Path(profile_id): Path<String>,
    ApiQuery(query): ApiQuery<ConsumerQuery>,
) -> Result<ApiResponse<SavingsSummary>> {
    consumers
        .savings(
            &profile_id,
            &query.region.to_ascii_uppercase(),
            &query.scenario,
            Utc::now(),
        )
        .map(ApiResponse::success)
}

/// Weather-driven HVAC, battery and EV alerts for a household
#[utoipa::path(
    get,
    path = "/api/consumer/alerts/{profile_id}",
    tag = "consumer",
    params(("profile_id" = String, Path, description = "Profile identifier"), ConsumerQuery),
    responses(
        (status = 200, description = "Device alerts", body = DeviceAlertsResponse),
        (status = 404, description = "Unknown profile")
    )
)]
pub async fn get_device_alerts(
    State(consumers): State<ConsumerService>,
    Path(profile_id): Path<String>,
    ApiQuery(query): ApiQuery<ConsumerQuery>,
) -> Result<ApiResponse<DeviceAlertsResponse>> {
    consumers
        .device_alerts(
            &profile_id,
            &query.region.to_ascii_uppercase(),
            &query.scenario,
            Utc::now(),
        )
        .map(ApiResponse::success)
}
