use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

/// How wholesale prices are predicted
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum PricingMode {
    Ml,
    Rules,
    #[default]
    Hybrid,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct HourlyPrice {
    /// Hours from now, 0-47
    pub hour: u32,
    pub timestamp: DateTime<Utc>,
    pub price_mwh: f64,
    pub consumer_price_kwh: f64,
    pub demand_factor: f64,
    pub wind_gen_factor: f64,
    pub grid_utilization_pct: f64,
    pub zone: String,
    pub prediction_mode: PricingMode,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PriceForecastResponse {
    pub region: String,
    pub start_time: DateTime<Utc>,
    /// Mode actually used; `rules` when no trained model is loaded
    pub mode: PricingMode,
    pub prices: Vec<HourlyPrice>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ModelInfoResponse {
    pub model_loaded: bool,
    pub training_date: Option<String>,
    pub feature_names: Vec<String>,
    pub training_score: Option<f64>,
    pub training_samples: Option<u64>,
}

/// Query for `GET /api/forecast/prices`
#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct PriceQuery {
    #[serde(default = "default_region")]
    pub region: String,
    #[serde(default)]
    pub mode: PricingMode,
    #[serde(default = "default_price_scenario")]
    pub scenario: String,
    /// ERCOT weather zone for zone-adjusted pricing
    pub zone: Option<String>,
}

/// Query for `GET /api/forecast/prices/{region}`
#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct RegionPriceQuery {
    #[serde(default)]
    pub mode: PricingMode,
    #[serde(default = "default_price_scenario")]
    pub scenario: String,
    pub zone: Option<String>,
}

fn default_region() -> String {
    "ERCOT".to_string()
}

fn default_price_scenario() -> String {
    "normal".to_string()
}
