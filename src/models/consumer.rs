use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ActionCategory {
    Thermostat,
    Appliance,
    Ev,
    Solar,
    Battery,
    Behavioral,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ProfileType {
    PreMade,
    Custom,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ConsumerProfile {
    pub profile_id: String,
    pub name: String,
    pub profile_type: ProfileType,
    pub household_size: u32,
    pub square_footage: u32,
    pub has_solar: bool,
    pub has_battery: bool,
    pub has_ev: bool,
    pub hvac_type: String,
    pub avg_monthly_kwh: f64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ConsumerProfilesResponse {
    pub profiles: Vec<ConsumerProfile>,
    pub total: usize,
}

/// Body of `POST /api/consumer/profiles/custom`
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateCustomProfileRequest {
    #[validate(length(min = 1, max = 100, message = "name must be 1-100 characters"))]
    pub name: String,
    #[validate(range(min = 1, max = 20, message = "household_size must be between 1 and 20"))]
    pub household_size: u32,
    #[validate(range(min = 100, max = 50000, message = "square_footage must be between 100 and 50000"))]
    pub square_footage: u32,
    #[serde(default)]
    pub has_solar: bool,
    #[serde(default)]
    pub has_battery: bool,
    #[serde(default)]
    pub has_ev: bool,
    #[serde(default = "default_hvac_type")]
    pub hvac_type: String,
    #[validate(range(exclusive_min = 0.0, message = "avg_monthly_kwh must be positive"))]
    pub avg_monthly_kwh: f64,
}

fn default_hvac_type() -> String {
    "central_ac".to_string()
}

/// Flexible household load that can be shifted in time
#[derive(Debug, Clone, PartialEq)]
pub struct Appliance {
    pub name: &'static str,
    pub power_kw: f64,
    pub duration_hours: f64,
    /// Hour of day, 0-23
    pub preferred_start: usize,
    pub flexible: bool,
    pub category: ActionCategory,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct OptimizedSchedule {
    pub appliance: String,
    pub original_start: u32,
    pub optimized_start: u32,
    pub original_cost: f64,
    pub optimized_cost: f64,
    pub savings: f64,
    pub reason: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum AlertSeverity {
    Info,
    Warning,
    Critical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConsumerStatus {
    Protected,
    AtRisk,
    Vulnerable,
}

impl ConsumerStatus {
    pub fn from_readiness(score: u32) -> Self {
        if score >= 80 {
            ConsumerStatus::Protected
        } else if score >= 50 {
            ConsumerStatus::AtRisk
        } else {
            ConsumerStatus::Vulnerable
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ConsumerAlert {
    pub severity: AlertSeverity,
    pub title: String,
    pub description: String,
    pub timestamp: DateTime<Utc>,
    pub action: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ConsumerRecommendation {
    pub profile: ConsumerProfile,
    pub optimized_schedule: Vec<OptimizedSchedule>,
    pub total_savings: f64,
    /// 0-100
    pub readiness_score: u32,
    pub status: ConsumerStatus,
    pub alerts: Vec<ConsumerAlert>,
    pub next_risk_window: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SavingsSummary {
    pub profile_id: String,
    pub total_savings_dollars: f64,
    pub total_savings_kwh: f64,
    pub readiness_score: u32,
    pub status: ConsumerStatus,
    pub optimized_schedule: Vec<OptimizedSchedule>,
    pub period_hours: u32,
}

/// Query for recommendation and savings endpoints
#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct ConsumerQuery {
    #[serde(default = "default_region")]
    pub region: String,
    #[serde(default = "default_scenario")]
    pub scenario: String,
}

fn default_region() -> String {
    "ERCOT".to_string()
}

fn default_scenario() -> String {
    "normal".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> CreateCustomProfileRequest {
        serde_json::from_value(serde_json::json!({
            "name": "My Home",
            "household_size": 4,
            "square_footage": 2200,
            "avg_monthly_kwh": 950.0
        }))
        .unwrap()
    }

    #[test]
    fn test_custom_profile_defaults() {
        let req = request();
        assert_eq!(req.hvac_type, "central_ac");
        assert!(!req.has_solar);
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_custom_profile_validation() {
        let mut req = request();
        req.household_size = 0;
        assert!(req.validate().is_err());

        let mut req = request();
        req.avg_monthly_kwh = 0.0;
        assert!(req.validate().is_err());

        let mut req = request();
        req.name = String::new();
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_status_thresholds() {
        assert_eq!(ConsumerStatus::from_readiness(80), ConsumerStatus::Protected);
        assert_eq!(ConsumerStatus::from_readiness(79), ConsumerStatus::AtRisk);
        assert_eq!(ConsumerStatus::from_readiness(49), ConsumerStatus::Vulnerable);
        assert_eq!(
            serde_json::to_value(ConsumerStatus::AtRisk).unwrap(),
            serde_json::json!("AT_RISK")
        );
    }
}
