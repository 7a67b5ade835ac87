//! Push notification payloads and relay requests.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

/// Button attached to an ntfy message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct NtfyAction {
    pub action: String,
    pub label: String,
    pub url: String,
    pub clear: bool,
}

/// JSON message published to the ntfy root URL
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct NtfyMessage {
    pub topic: String,
    pub title: String,
    pub message: String,
    /// 1 (min) to 5 (urgent)
    pub priority: u8,
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub actions: Vec<NtfyAction>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub click: Option<String>,
}

/// Consumer response to a device recommendation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum AlertAction {
    Accept,
    Decline,
}

/// Device command attached to an alert: thermostat setpoints, a battery
/// action or an EV charging deferral.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct RecommendedAction {
    /// `COOL` or `HEAT`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
    #[serde(default, rename = "coolSetpoint", skip_serializing_if = "Option::is_none")]
    pub cool_setpoint: Option<f64>,
    #[serde(default, rename = "heatSetpoint", skip_serializing_if = "Option::is_none")]
    pub heat_setpoint: Option<f64>,
    /// `CHARGE_FULL`, `ARBITRAGE` or `DEFER`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_soc: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub charge_during: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discharge_during: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub optimal_start_hour: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct AlertMetadata {
    #[serde(default)]
    pub estimated_savings_usd: f64,
    #[serde(default)]
    pub recommended_action: RecommendedAction,
    #[serde(default)]
    pub typical_setpoint: Option<f64>,
    #[serde(default)]
    pub action_description: Option<String>,
}

/// Personalised weather alert as produced by the alerting pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct WeatherAlert {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub profile_id: Option<String>,
    /// e.g. `weather_hvac`, `weather_battery`, `weather_ev_charger`
    #[serde(default)]
    pub alert_type: String,
    #[serde(default = "default_alert_title")]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_alert_severity")]
    pub severity: String,
    #[serde(default)]
    pub metadata: AlertMetadata,
}

fn default_alert_title() -> String {
    "Grid Alert".to_string()
}

fn default_alert_severity() -> String {
    "info".to_string()
}

/// Body of `POST /api/notifications/confirm`
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct ConfirmationRequest {
    #[validate(length(min = 1, message = "profile_id is required"))]
    pub profile_id: String,
    pub alert_title: String,
    pub action_taken: AlertAction,
    pub success: bool,
    #[serde(default)]
    pub device_type: Option<String>,
    #[serde(default)]
    pub savings_added: f64,
    #[serde(default)]
    pub savings_pending: f64,
    #[serde(default = "default_payout_threshold")]
    pub payout_threshold: f64,
    #[serde(default)]
    pub message: Option<String>,
}

fn default_payout_threshold() -> f64 {
    10.0
}

/// Body of `POST /api/notifications/payout`
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct PayoutRequest {
    #[validate(length(min = 1, message = "profile_id is required"))]
    pub profile_id: String,
    #[validate(range(min = 0.0, message = "amount_usd must not be negative"))]
    pub amount_usd: f64,
    #[validate(length(min = 1, message = "tx_hash is required"))]
    pub tx_hash: String,
    #[serde(default)]
    pub total_paid: Option<f64>,
}

/// Body of `POST /api/notifications/broadcast`
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct BroadcastRequest {
    #[validate(length(max = 500, message = "at most 500 alerts per broadcast"))]
    pub alerts: Vec<WeatherAlert>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct BroadcastResponse {
    pub success: usize,
    pub failed: usize,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct NotificationSentResponse {
    pub ok: bool,
    pub message: String,
}

impl NotificationSentResponse {
    pub fn sent() -> Self {
        Self {
            ok: true,
            message: "Notification sent".to_string(),
        }
    }
}
