//! Per-device weather alerts for a household.

use serde::Serialize;
use utoipa::ToSchema;

use super::notification::{AlertMetadata, RecommendedAction, WeatherAlert};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum DeviceType {
    Hvac,
    Battery,
    EvCharger,
}

impl DeviceType {
    pub fn as_str(self) -> &'static str {
        match self {
            DeviceType::Hvac => "hvac",
            DeviceType::Battery => "battery",
            DeviceType::EvCharger => "ev_charger",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum DeviceAlertSeverity {
    Critical,
    Warning,
    Optimization,
}

impl DeviceAlertSeverity {
    pub fn as_str(self) -> &'static str {
        match self {
            DeviceAlertSeverity::Critical => "critical",
            DeviceAlertSeverity::Warning => "warning",
            DeviceAlertSeverity::Optimization => "optimization",
        }
    }
}

/// Readings behind an alert; only the fields relevant to the device are set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
pub struct DeviceAlertMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub peak_temp_f: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_temp_f: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extreme_temp_f: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub typical_setpoint: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recommended_setpoint: Option<f64>,
    /// `resilience` or `economics`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub peak_price_kwh: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avg_price_kwh: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_price_kwh: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub optimal_price_kwh: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub optimal_start_hour: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct DeviceAlert {
    pub profile_id: String,
    pub device_type: DeviceType,
    pub severity: DeviceAlertSeverity,
    pub title: String,
    pub description: String,
    pub recommended_action: RecommendedAction,
    pub estimated_savings_usd: f64,
    pub weather_reason: String,
    pub metadata: DeviceAlertMetadata,
}

impl DeviceAlert {
    /// `weather_hvac`, `weather_battery` or `weather_ev_charger`
    pub fn alert_type(&self) -> String {
        format!("weather_{}", self.device_type.as_str())
    }

    fn action_description(&self) -> Option<String> {
        let action = &self.recommended_action;
        match action.action.as_deref()? {
            "CHARGE_FULL" => Some(format!(
                "Charge battery to {}%",
                action.target_soc.unwrap_or(100)
            )),
            "ARBITRAGE" => Some("Charge off-peak, discharge at peak".to_string()),
            "DEFER" => action
                .optimal_start_hour
                .map(|h| format!("Start charging at forecast hour {}", h)),
            _ => None,
        }
    }

    /// Push-ready form consumed by the ntfy broadcast.
    pub fn to_weather_alert(&self, id: Option<String>) -> WeatherAlert {
        WeatherAlert {
            id,
            profile_id: Some(self.profile_id.clone()),
            alert_type: self.alert_type(),
            title: self.title.clone(),
            description: self.description.clone(),
            severity: self.severity.as_str().to_string(),
            metadata: AlertMetadata {
                estimated_savings_usd: self.estimated_savings_usd,
                recommended_action: self.recommended_action.clone(),
                typical_setpoint: self.metadata.typical_setpoint,
                action_description: self.action_description(),
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DeviceAlertsResponse {
    pub profile_id: String,
    pub region: String,
    pub alerts: Vec<DeviceAlert>,
}
