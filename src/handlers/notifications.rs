//! ntfy relay endpoints
//!
//! These mirror the front-end's own relay routes, so they answer with the
//! relay's bare bodies instead of the usual envelope.

use axum::{extract::State, response::Json, routing::post, Router};
use tracing::info;

use super::extractors::ValidatedJson;
use crate::error::Result;
use crate::models::notification::{
    BroadcastRequest, BroadcastResponse, ConfirmationRequest, NotificationSentResponse,
    PayoutRequest,
};
use crate::{app_state::AppState, services::NotificationService};

/// Build the `/api/notifications` routes
pub fn notification_routes() -> Router<AppState> {
    Router::new()
        .route("/confirm", post(send_confirmation))
        .route("/payout", post(send_payout))
        .route("/broadcast", post(broadcast))
}

/// Tell a consumer how their accept/decline went
#[utoipa::path(
    post,
    path = "/api/notifications/confirm",
    tag = "notifications",
    request_body = ConfirmationRequest,
    responses(
        (status = 200, description = "Notification sent", body = NotificationSentResponse),
        (status = 400, description = "Invalid request"),
        (status = 500, description = "No topic for the profile or relay failure")
    )
)]
pub async fn send_confirmation(
    State(notifier): State<NotificationService>,
    ValidatedJson(request): ValidatedJson<ConfirmationRequest>,
) -> Result<Json<NotificationSentResponse>> {
    notifier.send_confirmation(&request).await?;
    Ok(Json(NotificationSentResponse::sent()))
}

/// Announce an RLUSD payout
#[utoipa::path(
    post,
    path = "/api/notifications/payout",
    tag = "notifications",
    request_body = PayoutRequest,
    responses(
        (status = 200, description = "Notification sent", body = NotificationSentResponse),
        (status = 400, description = "Invalid request"),
        (status = 500, description = "No topic for the profile or relay failure")
    )
)]
pub async fn send_payout(
    State(notifier): State<NotificationService>,
    ValidatedJson(request): ValidatedJson<PayoutRequest>,
) -> Result<Json<NotificationSentResponse>> {
    notifier.send_payout(&request).await?;
    Ok(Json(NotificationSentResponse::sent()))
}

/// Push personalised weather alerts to their consumers
#[utoipa::path(
    post,
    path = "/api/notifications/broadcast",
    tag = "notifications",
    request_body = BroadcastRequest,
    responses((status = 200, description = "Delivery counts", body = BroadcastResponse))
)]
pub async fn broadcast(
    State(notifier): State<NotificationService>,
    ValidatedJson(request): ValidatedJson<BroadcastRequest>,
) -> Json<BroadcastResponse> {
    info!("Broadcasting {} alerts", request.alerts.len());
    Json(notifier.broadcast(&request.alerts).await)
}
