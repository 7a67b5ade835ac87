//! Wholesale and retail electricity price forecasts.
//!
//! Three pricing modes are supported:
//! - `rules`: deterministic engine driven by temperature, wind and grid stress
//! - `ml`: a trained linear model over a 16-feature hourly vector
//! - `hybrid`: 70/30 blend of model and rules with guardrails
//!
//! Without a configured model file `ml` and `hybrid` fall back to `rules`,
//! and the response reports the mode actually used.

pub mod model;
pub mod rules;
pub mod tables;

use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, info, warn};

use crate::constants::api::GRID_REGION;
use crate::models::price::{HourlyPrice, ModelInfoResponse, PricingMode};
use crate::models::scenario::Scenario;
use crate::services::demand::TOD_CURVE;
use crate::services::weather::{HourlyWeather, WeatherPoint, WeatherService};
use crate::utils::round_to;

use model::{build_features, LinearPriceModel};
use rules::{
    cooling_degree_hours, consumer_price_kwh, estimate_grid_util, heating_degree_hours,
    hybrid_blend, normal_temperature, rules_price, RulesInput,
};
use tables::{
    base_price, wind_penetration, zone_pricing, ML_FEATURE_NAMES, NORMAL_WIND_MPH,
    URI_TEMP_PROFILE, URI_WIND_FACTOR, URI_WIND_MPH, WIND_HOURLY_FACTOR,
};

/// Hourly weather inputs for one forecast.
struct WeatherProfile {
    temps: Vec<f64>,
    wind_mphs: Vec<f64>,
    wind_factors: Vec<f64>,
}

fn weather_profile(region: &str, is_uri: bool, hours: usize) -> WeatherProfile {
    let wind_pen = wind_penetration(region);
    let mut profile = WeatherProfile {
        temps: Vec::with_capacity(hours),
        wind_mphs: Vec::with_capacity(hours),
        wind_factors: Vec::with_capacity(hours),
    };

    for h in 0..hours {
        let hod = h % 24;
        let uri_hour = is_uri && h < URI_TEMP_PROFILE.len();
        if uri_hour {
            profile.temps.push(URI_TEMP_PROFILE[h]);
            profile.wind_mphs.push(URI_WIND_MPH[h]);
            profile.wind_factors.push(URI_WIND_FACTOR[h]);
        } else {
            profile.temps.push(normal_temperature(hod));
            profile.wind_mphs.push(NORMAL_WIND_MPH[hod]);
            profile.wind_factors.push(WIND_HOURLY_FACTOR[hod] * wind_pen);
        }
    }
    profile
}

/// Price multiplier for live zone weather: cold below 32°F or heat above
/// 95°F raises prices, wind lowers them by up to 10%.
fn live_weather_adjustment(weather: HourlyWeather) -> f64 {
    let temp_stress = if weather.temp_f < 32.0 {
        1.0 + (32.0 - weather.temp_f) * 0.005
    } else if weather.temp_f > 95.0 {
        1.0 + (weather.temp_f - 95.0) * 0.004
    } else {
        1.0
    };
    let wind_discount = (1.0 - weather.wind_mph / 40.0 * 0.15).max(0.90);
    temp_stress * wind_discount
}

#[derive(Clone)]
pub struct PriceService {
    model: Option<Arc<LinearPriceModel>>,
    weather: WeatherService,
}

impl std::fmt::Debug for PriceService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PriceService")
            .field("model_loaded", &self.model.is_some())
            .finish()
    }
}

impl PriceService {
    pub fn new(model: Option<LinearPriceModel>, weather: WeatherService) -> Self {
        Self {
            model: model.map(Arc::new),
            weather,
        }
    }

    /// Load the optional model file; any failure falls back to rules mode.
    pub fn load(model_file: Option<&Path>, weather: WeatherService) -> Self {
        let model = match model_file {
            None => {
                info!("No price model configured, using rules mode");
                None
            }
            Some(path) => match LinearPriceModel::from_file(path) {
                Ok(model) => {
                    info!(
                        "Loaded price model from {} (R²={:.4}, {} samples)",
                        path.display(),
                        model.cv_r2_score.unwrap_or(0.0),
                        model.n_samples.map_or_else(|| "?".to_string(), |n| n.to_string())
                    );
                    Some(model)
                }
                Err(e) => {
                    warn!("Failed to load price model: {}, using rules mode", e);
                    None
                }
            },
        };
        Self::new(model, weather)
    }

    pub fn model_loaded(&self) -> bool {
        self.model.is_some()
    }

    pub fn effective_mode(&self, mode: PricingMode) -> PricingMode {
        match (&self.model, mode) {
            (None, PricingMode::Ml | PricingMode::Hybrid) => PricingMode::Rules,
            _ => mode,
        }
    }

    /// Hourly temperatures (°F) the forecast for `region` is priced on.
    pub fn temperature_outlook(&self, region: &str, scenario: &str, hours: usize) -> Vec<f64> {
        let is_uri = Scenario::parse(scenario).is_uri() && region == GRID_REGION;
        weather_profile(region, is_uri, hours).temps
    }

    /// Hourly region-wide forecast starting at `now`.
    pub fn forecast(
        &self,
        region: &str,
        mode: PricingMode,
        scenario: &str,
        hours: usize,
        now: DateTime<Utc>,
    ) -> Vec<HourlyPrice> {
        let is_uri = Scenario::parse(scenario).is_uri() && region == GRID_REGION;
        let effective = self.effective_mode(mode);
        let base = base_price(region);
        let profile = weather_profile(region, is_uri, hours);

        let grid_utils: Vec<f64> = profile
            .temps
            .iter()
            .enumerate()
            .map(|(h, &t)| estimate_grid_util(heating_degree_hours(t), cooling_degree_hours(t), h))
            .collect();

        let rules_prices: Vec<f64> = (0..hours)
            .map(|h| {
                rules_price(RulesInput {
                    hour: h,
                    temp_f: profile.temps[h],
                    wind_factor: profile.wind_factors[h],
                    grid_util: grid_utils[h],
                    base_price: base,
                    is_uri,
                })
            })
            .collect();

        let final_prices = match (&self.model, effective) {
            (Some(model), PricingMode::Ml | PricingMode::Hybrid) => {
                let features = build_features(now, &profile.temps, &profile.wind_mphs, &rules_prices);
                features
                    .iter()
                    .enumerate()
                    .map(|(h, row)| {
                        let ml = model.predict(row);
                        if effective == PricingMode::Hybrid {
                            hybrid_blend(ml, rules_prices[h], h % 24, profile.wind_factors[h], is_uri)
                        } else {
                            ml
                        }
                    })
                    .collect()
            }
            _ => rules_prices,
        };

        debug!(
            "Price forecast for {} ({} hours, mode {:?}, uri: {})",
            region, hours, effective, is_uri
        );

        final_prices
            .into_iter()
            .enumerate()
            .map(|(h, price)| HourlyPrice {
                hour: h as u32,
                timestamp: now + Duration::hours(h as i64),
                price_mwh: round_to(price, 2),
                consumer_price_kwh: consumer_price_kwh(price),
                demand_factor: round_to(TOD_CURVE[h % 24], 2),
                wind_gen_factor: round_to(profile.wind_factors[h], 4),
                grid_utilization_pct: round_to(grid_utils[h] * 100.0, 1),
                zone: region.to_string(),
                prediction_mode: effective,
            })
            .collect()
    }

    /// Region forecast scaled by the weather zone's structural factor.
    ///
    /// For the live scenario the zone's Open-Meteo forecast adds temperature
    /// stress and a wind discount; unknown zones use a factor of 1.0.
    pub async fn zone_forecast(
        &self,
        region: &str,
        zone: &str,
        mode: PricingMode,
        scenario: &str,
        hours: usize,
        now: DateTime<Utc>,
    ) -> Vec<HourlyPrice> {
        let pricing = zone_pricing(zone);
        let factor = pricing.map_or(1.0, |z| z.factor);

        let live_weather = match pricing {
            Some(z) if Scenario::parse(scenario) == Scenario::Live => {
                self.weather
                    .hourly_or_none(WeatherPoint {
                        key: z.zone,
                        lat: z.lat,
                        lon: z.lon,
                    })
                    .await
            }
            _ => None,
        };

        self.forecast(region, mode, scenario, hours, now)
            .into_iter()
            .enumerate()
            .map(|(i, hp)| {
                let mut price = hp.price_mwh * factor;
                if let Some(reading) = live_weather.as_ref().and_then(|w| w.get(i)) {
                    price *= live_weather_adjustment(*reading);
                }
                HourlyPrice {
                    price_mwh: round_to(price, 2),
                    consumer_price_kwh: consumer_price_kwh(price),
                    zone: zone.to_string(),
                    ..hp
                }
            })
            .collect()
    }

    pub fn model_info(&self) -> ModelInfoResponse {
        match &self.model {
            Some(model) => ModelInfoResponse {
                model_loaded: true,
                training_date: model.training_date.clone(),
                feature_names: model.feature_names.clone(),
                training_score: model.cv_r2_score,
                training_samples: model.n_samples,
            },
            None => ModelInfoResponse {
                model_loaded: false,
                training_date: None,
                feature_names: ML_FEATURE_NAMES.iter().map(|s| s.to_string()).collect(),
                training_score: None,
                training_samples: None,
            },
        }
    }
}
