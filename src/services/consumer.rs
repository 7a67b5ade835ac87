//! Household optimisation over the 48-hour retail price curve: appliance
//! shifting, battery arbitrage, solar value, readiness scoring and alerts.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use tracing::{debug, info};
use uuid::Uuid;

use crate::constants::forecast::PRICE_HORIZON_HOURS;
use crate::error::ApiError;
use crate::models::alerts::DeviceAlertsResponse;
use crate::models::consumer::{
    ActionCategory, AlertSeverity, Appliance, ConsumerAlert, ConsumerProfile,
    ConsumerProfilesResponse, ConsumerRecommendation, ConsumerStatus, CreateCustomProfileRequest,
    OptimizedSchedule, ProfileType, SavingsSummary,
};
use crate::models::price::{HourlyPrice, PricingMode};
use crate::services::device_alerts;
use crate::services::price::PriceService;
use crate::utils::round_to;

const BATTERY_ROUND_TRIP_EFFICIENCY: f64 = 0.90;
const GRID_STRESS_PCT: f64 = 85.0;
const RISK_WINDOW_PCT: f64 = 80.0;
const EXTREME_PRICE_MWH: f64 = 200.0;

struct ProfileSeed {
    id: &'static str,
    name: &'static str,
    household_size: u32,
    square_footage: u32,
    has_solar: bool,
    has_battery: bool,
    has_ev: bool,
    hvac_type: &'static str,
    avg_monthly_kwh: f64,
}

const PROFILES: [ProfileSeed; 4] = [
    ProfileSeed { id: "martinez-family", name: "Martinez Family", household_size: 5, square_footage: 2400, has_solar: true, has_battery: true, has_ev: false, hvac_type: "central_ac", avg_monthly_kwh: 1100.0 },
    ProfileSeed { id: "default-suburban-family", name: "Suburban Family", household_size: 4, square_footage: 2200, has_solar: false, has_battery: false, has_ev: false, hvac_type: "central_ac", avg_monthly_kwh: 950.0 },
    ProfileSeed { id: "default-eco-home", name: "Eco-Conscious Home", household_size: 2, square_footage: 1600, has_solar: true, has_battery: true, has_ev: true, hvac_type: "heat_pump", avg_monthly_kwh: 400.0 },
    ProfileSeed { id: "default-apartment", name: "Urban Apartment", household_size: 1, square_footage: 750, has_solar: false, has_battery: false, has_ev: false, hvac_type: "window_unit", avg_monthly_kwh: 550.0 },
];

const fn appliance(name: &'static str, power_kw: f64, duration_hours: f64, preferred_start: usize, category: ActionCategory) -> Appliance {
    Appliance {
        name,
        power_kw,
        duration_hours,
        preferred_start,
        flexible: true,
        category,
    }
}

const FAMILY_APPLIANCES: [Appliance; 3] = [
    appliance("Dishwasher", 1.8, 1.5, 19, ActionCategory::Appliance),
    appliance("Clothes Dryer", 5.0, 1.0, 10, ActionCategory::Appliance),
    appliance("Water Heater", 4.5, 1.0, 7, ActionCategory::Appliance),
];

const ECO_APPLIANCES: [Appliance; 2] = [
    appliance("Dishwasher", 1.8, 1.5, 20, ActionCategory::Appliance),
    appliance("EV Charger", 7.2, 3.0, 18, ActionCategory::Ev),
];

const APARTMENT_APPLIANCES: [Appliance; 1] = [appliance("Dishwasher", 1.2, 1.5, 20, ActionCategory::Appliance)];

fn appliances(profile_id: &str) -> &'static [Appliance] {
    match profile_id {
        "martinez-family" | "default-suburban-family" => &FAMILY_APPLIANCES,
        "default-eco-home" => &ECO_APPLIANCES,
        "default-apartment" => &APARTMENT_APPLIANCES,
        _ => &[],
    }
}

/// (capacity kWh, charge rate kW)
fn battery_spec(profile_id: &str) -> Option<(f64, f64)> {
    match profile_id {
        "martinez-family" | "default-eco-home" => Some((13.5, 5.0)),
        _ => None,
    }
}

/// (panel kW peak, efficiency)
fn solar_spec(profile_id: &str) -> Option<(f64, f64)> {
    match profile_id {
        "martinez-family" => Some((7.5, 0.85)),
        "default-eco-home" => Some((8.0, 0.85)),
        _ => None,
    }
}

/// Fraction of peak solar output by hour of day
const SOLAR_CURVE: [f64; 24] = [
    0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.05, 0.15, 0.35, 0.55, 0.75, 0.90, //
    1.00, 0.98, 0.90, 0.78, 0.60, 0.35, 0.10, 0.02, 0.0, 0.0, 0.0, 0.0,
];

fn to_profile(seed: &ProfileSeed) -> ConsumerProfile {
    ConsumerProfile {
        profile_id: seed.id.to_string(),
        name: seed.name.to_string(),
        profile_type: ProfileType::PreMade,
        household_size: seed.household_size,
        square_footage: seed.square_footage,
        has_solar: seed.has_solar,
        has_battery: seed.has_battery,
        has_ev: seed.has_ev,
        hvac_type: seed.hvac_type.to_string(),
        avg_monthly_kwh: seed.avg_monthly_kwh,
    }
}

/// Cost of running `power_kw` for `duration_hours` from `start`; a
/// fractional final hour is billed pro rata.
pub fn window_cost(prices: &[HourlyPrice], start: usize, duration_hours: f64, power_kw: f64) -> f64 {
    let full_hours = duration_hours.trunc() as usize;
    let fractional = duration_hours - full_hours as f64;

    let mut total: f64 = (start..start + full_hours)
        .filter_map(|i| prices.get(i))
        .map(|p| p.consumer_price_kwh * power_kw)
        .sum();
    if fractional > 0.0 {
        if let Some(p) = prices.get(start + full_hours) {
            total += p.consumer_price_kwh * power_kw * fractional;
        }
    }
    round_to(total, 4)
}

/// Cheapest start hour for every flexible appliance of the profile.
pub fn optimize_appliances(profile_id: &str, prices: &[HourlyPrice]) -> Vec<OptimizedSchedule> {
    appliances(profile_id)
        .iter()
        .filter(|a| a.flexible)
        .map(|app| {
            let slots = (app.duration_hours.ceil() as usize).max(1);
            let original_cost = window_cost(prices, app.preferred_start, app.duration_hours, app.power_kw);

            let mut best_start = app.preferred_start;
            let mut best_cost = original_cost;
            for start in 0..prices.len().saturating_sub(slots) {
                let cost = window_cost(prices, start, app.duration_hours, app.power_kw);
                if cost < best_cost {
                    best_cost = cost;
                    best_start = start;
                }
            }

            let savings = round_to(original_cost - best_cost, 2);
            let reason = if savings > 0.01 {
                format!(
                    "Shift from {}:00 to {}:00: ${:.2} vs ${:.2} at original time",
                    app.preferred_start,
                    best_start % 24,
                    best_cost,
                    original_cost
                )
            } else {
                "Already at optimal time".to_string()
            };

            OptimizedSchedule {
                appliance: app.name.to_string(),
                original_start: app.preferred_start as u32,
                optimized_start: (best_start % 24) as u32,
                original_cost: round_to(original_cost, 2),
                optimized_cost: round_to(best_cost, 2),
                savings: savings.max(0.0),
                reason,
            }
        })
        .collect()
}

/// Charge in the cheapest hours, discharge in the most expensive ones.
/// Returns `(dollars, kWh cycled)`.
pub fn battery_arbitrage(profile_id: &str, prices: &[HourlyPrice]) -> (f64, f64) {
    let Some((capacity_kwh, charge_rate_kw)) = battery_spec(profile_id) else {
        return (0.0, 0.0);
    };
    if prices.is_empty() {
        return (0.0, 0.0);
    }

    let hours = ((capacity_kwh / charge_rate_kw).ceil() as usize).min(prices.len());
    let mut by_price: Vec<f64> = prices.iter().map(|p| p.consumer_price_kwh).collect();
    by_price.sort_by(|a, b| a.total_cmp(b));

    let avg_charge = by_price[..hours].iter().sum::<f64>() / hours.max(1) as f64;
    let avg_discharge = by_price[by_price.len() - hours..].iter().sum::<f64>() / hours.max(1) as f64;

    let per_kwh = avg_discharge * BATTERY_ROUND_TRIP_EFFICIENCY - avg_charge;
    let dollars = round_to((per_kwh * capacity_kwh).max(0.0), 2);
    let kwh = if dollars > 0.0 {
        round_to(capacity_kwh * BATTERY_ROUND_TRIP_EFFICIENCY, 2)
    } else {
        0.0
    };
    (dollars, kwh)
}

/// Value of solar production at retail prices. Returns `(dollars, kWh)`.
pub fn solar_value(profile_id: &str, prices: &[HourlyPrice]) -> (f64, f64) {
    let Some((panel_kw, efficiency)) = solar_spec(profile_id) else {
        return (0.0, 0.0);
    };

    let (dollars, kwh) = prices.iter().fold((0.0, 0.0), |(dollars, kwh), p| {
        let cf = SOLAR_CURVE[p.hour as usize % 24];
        if cf <= 0.0 {
            return (dollars, kwh);
        }
        let produced = panel_kw * efficiency * cf;
        (dollars + produced * p.consumer_price_kwh, kwh + produced)
    });
    (round_to(dollars, 2), round_to(kwh, 2))
}

/// Household readiness, 0-100: equipment, shiftable loads and savings.
pub fn readiness_score(profile: &ConsumerProfile, schedule: &[OptimizedSchedule], total_savings: f64) -> u32 {
    let mut score = 42;
    if profile.has_battery {
        score += 16;
    }
    if profile.has_solar {
        score += 14;
    }
    if profile.has_ev {
        score += 6;
    }
    let shifted = schedule.iter().filter(|s| s.savings > 0.0).count() as u32;
    score += (shifted * 4).min(12);
    score += (total_savings.max(0.0).trunc() as u32).min(10);
    score.min(100)
}

pub fn alerts(profile: &ConsumerProfile, prices: &[HourlyPrice], readiness: u32, now: DateTime<Utc>) -> Vec<ConsumerAlert> {
    let mut alerts = Vec::new();
    let peak = prices.iter().map(|p| p.price_mwh).fold(f64::NEG_INFINITY, f64::max);

    let stressed = prices.iter().filter(|p| p.grid_utilization_pct > GRID_STRESS_PCT).count();
    if stressed > 0 {
        alerts.push(ConsumerAlert {
            severity: AlertSeverity::Warning,
            title: "Grid Stress Detected".to_string(),
            description: format!(
                "{} hours with grid utilization above 85%. Reduce non-essential load during peak periods.",
                stressed
            ),
            timestamp: now,
            action: "Pre-cool home and shift flexible loads to off-peak hours".to_string(),
        });
    }

    let extreme = prices.iter().filter(|p| p.price_mwh > EXTREME_PRICE_MWH).count();
    if extreme > 0 {
        alerts.push(ConsumerAlert {
            severity: AlertSeverity::Critical,
            title: "Extreme Price Spike Expected".to_string(),
            description: format!(
                "{} hours with wholesale prices above $200/MWh. Peak: ${:.0}/MWh",
                extreme, peak
            ),
            timestamp: now,
            action: "Activate battery discharge and minimize consumption".to_string(),
        });
    }

    if !profile.has_battery && readiness < 80 {
        alerts.push(ConsumerAlert {
            severity: AlertSeverity::Info,
            title: "Battery Storage Recommended".to_string(),
            description: "Adding a home battery could increase your readiness score and save on peak pricing through arbitrage.".to_string(),
            timestamp: now,
            action: "Consider Tesla Powerwall or similar home battery system".to_string(),
        });
    }

    if !profile.has_solar {
        alerts.push(ConsumerAlert {
            severity: AlertSeverity::Info,
            title: "Solar Panels Recommended".to_string(),
            description: "Solar generation can offset peak consumption and earn export credits during high-price windows.".to_string(),
            timestamp: now,
            action: "Get a solar assessment for your property".to_string(),
        });
    }

    alerts
}

/// First hour above 80% grid utilisation, e.g. `Today 6:00 PM`.
pub fn next_risk_window(prices: &[HourlyPrice]) -> Option<String> {
    prices
        .iter()
        .find(|p| p.grid_utilization_pct > RISK_WINDOW_PCT)
        .map(|p| {
            let hour = p.hour % 24;
            let period = if hour < 12 { "AM" } else { "PM" };
            let display = match hour {
                0 => 12,
                h if h > 12 => h - 12,
                h => h,
            };
            format!("Today {}:00 {}", display, period)
        })
}

/// Built-in profiles plus custom ones created at runtime.
#[derive(Clone)]
pub struct ConsumerService {
    custom: Arc<DashMap<String, ConsumerProfile>>,
    prices: PriceService,
}

impl ConsumerService {
    pub fn new(prices: PriceService) -> Self {
        Self {
            custom: Arc::new(DashMap::new()),
            prices,
        }
    }

    pub fn profile(&self, profile_id: &str) -> Option<ConsumerProfile> {
        PROFILES
            .iter()
            .find(|p| p.id == profile_id)
            .map(to_profile)
            .or_else(|| self.custom.get(profile_id).map(|p| p.value().clone()))
    }

    pub fn profiles(&self) -> ConsumerProfilesResponse {
        let mut custom: Vec<ConsumerProfile> = self.custom.iter().map(|p| p.value().clone()).collect();
        custom.sort_by(|a, b| a.profile_id.cmp(&b.profile_id));

        let profiles: Vec<ConsumerProfile> = PROFILES.iter().map(to_profile).chain(custom).collect();
        ConsumerProfilesResponse {
            total: profiles.len(),
            profiles,
        }
    }

    pub fn create_custom(&self, request: CreateCustomProfileRequest) -> ConsumerProfile {
        let simple = Uuid::new_v4().simple().to_string();
        let profile = ConsumerProfile {
            profile_id: format!("custom-{}", &simple[..8]),
            name: request.name,
            profile_type: ProfileType::Custom,
            household_size: request.household_size,
            square_footage: request.square_footage,
            has_solar: request.has_solar,
            has_battery: request.has_battery,
            has_ev: request.has_ev,
            hvac_type: request.hvac_type,
            avg_monthly_kwh: request.avg_monthly_kwh,
        };
        info!("Created custom consumer profile {}", profile.profile_id);
        self.custom.insert(profile.profile_id.clone(), profile.clone());
        profile
    }

    pub fn recommendations(
        &self,
        profile_id: &str,
        region: &str,
        scenario: &str,
        now: DateTime<Utc>,
    ) -> Result<ConsumerRecommendation, ApiError> {
        let profile = self
            .profile(profile_id)
            .ok_or_else(|| ApiError::not_found(&format!("Profile {}", profile_id)))?;

        let prices = self
            .prices
            .forecast(region, PricingMode::Hybrid, scenario, PRICE_HORIZON_HOURS, now);

        let mut schedule = optimize_appliances(profile_id, &prices);

        let (battery_dollars, battery_kwh) = battery_arbitrage(profile_id, &prices);
        if battery_dollars > 0.0 {
            schedule.push(OptimizedSchedule {
                appliance: "Battery (charge/discharge)".to_string(),
                original_start: 0,
                optimized_start: 0,
                original_cost: 0.0,
                optimized_cost: 0.0,
                savings: battery_dollars,
                reason: format!("Charge at off-peak, discharge at peak: {} kWh cycled", battery_kwh),
            });
        }

        let (solar_dollars, solar_kwh) = solar_value(profile_id, &prices);
        if solar_dollars > 0.0 {
            schedule.push(OptimizedSchedule {
                appliance: "Solar Generation".to_string(),
                original_start: 0,
                optimized_start: 0,
                original_cost: solar_dollars,
                optimized_cost: 0.0,
                savings: solar_dollars,
                reason: format!("Self-consumption + export credits: {} kWh produced", solar_kwh),
            });
        }

        let total_savings = round_to(schedule.iter().map(|s| s.savings).sum(), 2);
        let readiness = readiness_score(&profile, &schedule, total_savings);

        debug!(
            "Recommendations for {} in {}: ${:.2} savings, readiness {}",
            profile_id, region, total_savings, readiness
        );

        Ok(ConsumerRecommendation {
            alerts: alerts(&profile, &prices, readiness, now),
            next_risk_window: next_risk_window(&prices),
            profile,
            optimized_schedule: schedule,
            total_savings,
            readiness_score: readiness,
            status: ConsumerStatus::from_readiness(readiness),
        })
    }

    /// HVAC, battery and EV alerts from the 48-hour temperature and price outlook.
    pub fn device_alerts(
        &self,
        profile_id: &str,
        region: &str,
        scenario: &str,
        now: DateTime<Utc>,
    ) -> Result<DeviceAlertsResponse, ApiError> {
        let profile = self
            .profile(profile_id)
            .ok_or_else(|| ApiError::not_found(&format!("Profile {}", profile_id)))?;

        let temps = self.prices.temperature_outlook(region, scenario, PRICE_HORIZON_HOURS);
        let prices = self
            .prices
            .forecast(region, PricingMode::Hybrid, scenario, PRICE_HORIZON_HOURS, now);

        Ok(DeviceAlertsResponse {
            alerts: device_alerts::generate(&profile, &temps, &prices, now),
            profile_id: profile.profile_id,
            region: region.to_string(),
        })
    }

    pub fn savings(
        &self,
        profile_id: &str,
        region: &str,
        scenario: &str,
        now: DateTime<Utc>,
    ) -> Result<SavingsSummary, ApiError> {
        let rec = self.recommendations(profile_id, region, scenario, now)?;
        let total_kwh: f64 = rec
            .optimized_schedule
            .iter()
            .filter(|s| s.original_cost > 0.0)
            .map(|s| s.savings / s.original_cost.max(0.01) * s.savings)
            .sum();

        Ok(SavingsSummary {
            profile_id: profile_id.to_string(),
            total_savings_dollars: rec.total_savings,
            total_savings_kwh: round_to(total_kwh, 2),
            readiness_score: rec.readiness_score,
            status: rec.status,
            optimized_schedule: rec.optimized_schedule,
            period_hours: PRICE_HORIZON_HOURS as u32,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WeatherConfig;
    use crate::services::weather::WeatherService;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2021, 2, 14, 0, 0, 0).unwrap()
    }

    fn service() -> ConsumerService {
        let weather = WeatherService::new(reqwest::Client::new(), &WeatherConfig::default());
        ConsumerService::new(PriceService::new(None, weather))
    }

    fn flat_prices(kwh: &[f64]) -> Vec<HourlyPrice> {
        kwh.iter()
            .enumerate()
            .map(|(h, &p)| HourlyPrice {
                hour: h as u32,
                timestamp: now() + Duration::hours(h as i64),
                price_mwh: p * 100.0,
                consumer_price_kwh: p,
                demand_factor: 1.0,
                wind_gen_factor: 0.1,
                grid_utilization_pct: 50.0,
                zone: "ERCOT".to_string(),
                prediction_mode: PricingMode::Rules,
            })
            .collect()
    }

    #[test]
    fn test_window_cost_prorates_last_hour() {
        let prices = flat_prices(&[0.10, 0.20, 0.40]);
        assert_eq!(window_cost(&prices, 0, 1.5, 2.0), 0.2 + 0.2);
        assert_eq!(window_cost(&prices, 2, 2.0, 1.0), 0.4);
    }

    #[test]
    fn test_appliance_shifts_to_cheapest_window() {
        let mut kwh = vec![0.30; 48];
        kwh[3] = 0.05;
        let prices = flat_prices(&kwh);

        let schedule = optimize_appliances("default-apartment", &prices);
        assert_eq!(schedule.len(), 1);
        let dishwasher = &schedule[0];
        assert_eq!(dishwasher.original_start, 20);
        // 1.5 h at 1.2 kW starting at hour 2 or 3: hour 3 is cheapest
        assert_eq!(dishwasher.optimized_start, 3);
        assert!(dishwasher.savings > 0.0);
        assert!(dishwasher.reason.starts_with("Shift from 20:00 to 3:00"));
    }

    #[test]
    fn test_flat_prices_keep_preferred_time() {
        let prices = flat_prices(&[0.10; 48]);
        let schedule = optimize_appliances("default-suburban-family", &prices);
        assert_eq!(schedule.len(), 3);
        assert!(schedule.iter().all(|s| s.savings == 0.0 && s.reason == "Already at optimal time"));
        assert_eq!(schedule[2].optimized_start, 7);
    }

    #[test]
    fn test_battery_arbitrage() {
        let mut kwh = vec![0.10; 48];
        kwh[10] = 1.0;
        kwh[11] = 1.0;
        kwh[12] = 1.0;
        let prices = flat_prices(&kwh);

        // 3 charge hours at 0.10, 3 discharge hours at 1.00
        let (dollars, cycled) = battery_arbitrage("martinez-family", &prices);
        assert_eq!(dollars, round_to((0.9 - 0.1) * 13.5, 2));
        assert_eq!(cycled, 12.15);

        assert_eq!(battery_arbitrage("default-apartment", &prices), (0.0, 0.0));
        // No spread, no savings
        assert_eq!(battery_arbitrage("martinez-family", &flat_prices(&[0.10; 48])), (0.0, 0.0));
    }

    #[test]
    fn test_solar_value() {
        let prices = flat_prices(&[0.10; 24]);
        let (dollars, kwh) = solar_value("default-eco-home", &prices);
        let curve_sum: f64 = SOLAR_CURVE.iter().sum();
        assert_eq!(kwh, round_to(8.0 * 0.85 * curve_sum, 2));
        assert_eq!(dollars, round_to(8.0 * 0.85 * curve_sum * 0.10, 2));
        assert_eq!(solar_value("default-apartment", &prices), (0.0, 0.0));
    }

    #[test]
    fn test_readiness_score() {
        let svc = service();
        let eco = svc.profile("default-eco-home").unwrap();
        assert_eq!(readiness_score(&eco, &[], 0.0), 42 + 16 + 14 + 6);
        assert_eq!(readiness_score(&eco, &[], 50.0), 88);

        let apt = svc.profile("default-apartment").unwrap();
        assert_eq!(readiness_score(&apt, &[], 3.7), 45);
    }

    #[test]
    fn test_next_risk_window_format() {
        let mut prices = flat_prices(&[0.10; 24]);
        assert_eq!(next_risk_window(&prices), None);

        prices[18].grid_utilization_pct = 81.0;
        assert_eq!(next_risk_window(&prices).as_deref(), Some("Today 6:00 PM"));
        prices[0].grid_utilization_pct = 90.0;
        assert_eq!(next_risk_window(&prices).as_deref(), Some("Today 12:00 AM"));
    }

    #[test]
    fn test_alerts() {
        let svc = service();
        let apt = svc.profile("default-apartment").unwrap();
        let mut prices = flat_prices(&[0.10; 24]);
        prices[5].grid_utilization_pct = 90.0;
        prices[6].price_mwh = 450.0;

        let list = alerts(&apt, &prices, 45, now());
        let titles: Vec<&str> = list.iter().map(|a| a.title.as_str()).collect();
        assert_eq!(
            titles,
            vec![
                "Grid Stress Detected",
                "Extreme Price Spike Expected",
                "Battery Storage Recommended",
                "Solar Panels Recommended"
            ]
        );
        assert!(list[1].description.ends_with("Peak: $450/MWh"));

        let eco = svc.profile("default-eco-home").unwrap();
        assert!(alerts(&eco, &flat_prices(&[0.10; 24]), 90, now()).is_empty());
    }

    #[test]
    fn test_custom_profiles() {
        let svc = service();
        assert_eq!(svc.profiles().total, 4);

        let request: CreateCustomProfileRequest = serde_json::from_value(serde_json::json!({
            "name": "My Home",
            "household_size": 3,
            "square_footage": 1800,
            "has_solar": true,
            "avg_monthly_kwh": 800.0
        }))
        .unwrap();
        let profile = svc.create_custom(request);

        assert!(profile.profile_id.starts_with("custom-"));
        assert_eq!(profile.profile_id.len(), "custom-".len() + 8);
        assert_eq!(profile.profile_type, ProfileType::Custom);
        assert_eq!(svc.profiles().total, 5);
        assert_eq!(svc.profile(&profile.profile_id), Some(profile));
    }

    #[test]
    fn test_recommendations_pipeline() {
        let svc = service();
        let rec = svc.recommendations("martinez-family", "ERCOT", "uri_2021", now()).unwrap();

        assert!(rec.optimized_schedule.iter().any(|s| s.appliance == "Solar Generation"));
        assert_eq!(
            rec.total_savings,
            round_to(rec.optimized_schedule.iter().map(|s| s.savings).sum(), 2)
        );
        assert!(rec.readiness_score <= 100);
        assert_eq!(rec.status, ConsumerStatus::from_readiness(rec.readiness_score));
        assert!(rec.alerts.iter().any(|a| a.title == "Extreme Price Spike Expected"));
    }

    #[test]
    fn test_unknown_profile_is_not_found() {
        let err = service().recommendations("nobody", "ERCOT", "normal", now()).unwrap_err();
        assert_eq!(err.status_code(), axum::http::StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_savings_summary() {
        let svc = service();
        let summary = svc.savings("default-eco-home", "ERCOT", "normal", now()).unwrap();
        assert_eq!(summary.period_hours, 48);
        assert_eq!(summary.profile_id, "default-eco-home");
        assert!(summary.total_savings_kwh >= 0.0);
    }

    #[test]
    fn test_device_alerts_during_uri() {
        let svc = service();
        let response = svc.device_alerts("martinez-family", "ERCOT", "uri_2021", now()).unwrap();

        assert_eq!(response.region, "ERCOT");
        let hvac = &response.alerts[0];
        assert_eq!(hvac.title, "Pre-Heat Before -3°F Low");
        let battery = &response.alerts[1];
        assert_eq!(battery.title, "Full Battery Charge Recommended");
        assert_eq!(battery.recommended_action.target_soc, Some(100));
        assert_eq!(response.alerts.len(), 2);
    }

    #[test]
    fn test_device_alerts_mild_winter_day() {
        let svc = service();
        let response = svc.device_alerts("default-apartment", "ERCOT", "normal", now()).unwrap();

        assert_eq!(response.alerts.len(), 1);
        assert!(response.alerts[0].title.starts_with("Optimize Cooling"));

        let err = svc.device_alerts("nobody", "ERCOT", "normal", now()).unwrap_err();
        assert_eq!(err.status_code(), axum::http::StatusCode::NOT_FOUND);
    }
}
