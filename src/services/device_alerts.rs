//! Weather- and price-driven alerts for a household's HVAC, home battery and
//! EV charger.
//!
//! Alerts are derived from the 48-hour temperature outlook and retail price
//! curve. HVAC advice depends on the season of the forecast start: pre-cool
//! in May-September, pre-heat in November-March, a generic cooling tip
//! otherwise.

use chrono::{DateTime, Datelike, Utc};
use tracing::debug;

use crate::models::alerts::{DeviceAlert, DeviceAlertMetadata, DeviceAlertSeverity, DeviceType};
use crate::models::consumer::ConsumerProfile;
use crate::models::notification::RecommendedAction;
use crate::models::price::HourlyPrice;
use crate::utils::round_to;

/// Cold below this (°F) calls for a full battery charge
pub const EXTREME_COLD_F: f64 = 20.0;
/// Heat above this (°F) calls for a full battery charge
pub const EXTREME_HEAT_F: f64 = 95.0;
/// Retail peak ($/kWh) that makes arbitrage worth an alert
pub const HIGH_PRICE_KWH: f64 = 0.30;
/// Current price must beat the best 4-hour window by this share
pub const EV_PRICE_MARGIN: f64 = 0.30;

const SUMMER_MONTHS: [u32; 5] = [5, 6, 7, 8, 9];
const WINTER_MONTHS: [u32; 5] = [11, 12, 1, 2, 3];

const PRE_COOL_KWH: f64 = 16.0;
const PRE_HEAT_KWH: f64 = 24.0;
const FALLBACK_HVAC_SAVINGS: f64 = 3.20;

const BATTERY_KWH: f64 = 13.5;
const BATTERY_EFFICIENCY: f64 = 0.90;
const EV_SESSION_KWH: f64 = 28.8;
const EV_WINDOW_HOURS: usize = 4;

/// Extremes of the temperature outlook.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TemperatureRange {
    pub peak_f: f64,
    pub min_f: f64,
}

impl TemperatureRange {
    pub fn from_hourly(temps: &[f64]) -> Option<Self> {
        let first = *temps.first()?;
        Some(temps.iter().fold(
            TemperatureRange {
                peak_f: first,
                min_f: first,
            },
            |range, &t| TemperatureRange {
                peak_f: range.peak_f.max(t),
                min_f: range.min_f.min(t),
            },
        ))
    }
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, count) = values.fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

/// Average retail price of the first four hours and of hours 12-17.
fn off_peak_and_peak(prices: &[HourlyPrice]) -> (f64, f64) {
    let off_peak = mean(prices.iter().take(4).map(|p| p.consumer_price_kwh));
    let peak = if prices.len() >= 18 {
        mean(prices[12..18].iter().map(|p| p.consumer_price_kwh))
    } else {
        off_peak
    };
    (off_peak, peak)
}

fn whole_degrees(temp_f: f64) -> i64 {
    temp_f.trunc() as i64
}

pub fn hvac_alert(
    profile: &ConsumerProfile,
    range: Option<TemperatureRange>,
    prices: &[HourlyPrice],
    month: u32,
) -> Option<DeviceAlert> {
    if profile.hvac_type.is_empty() {
        return None;
    }
    let range = range?;
    let (off_peak, peak) = off_peak_and_peak(prices);

    let (severity, title, description, action, savings, reason, metadata) =
        if SUMMER_MONTHS.contains(&month) && range.peak_f > 70.0 {
            let (typical, recommended) = (72.0, 69.0);
            let peak_f = whole_degrees(range.peak_f);
            (
                if range.peak_f > 95.0 {
                    DeviceAlertSeverity::Warning
                } else {
                    DeviceAlertSeverity::Optimization
                },
                format!("Pre-Cool Before {}°F Peak", peak_f),
                format!(
                    "Extreme heat expected with peak of {}°F. Pre-cool home to {}°F during off-peak hours to reduce cooling costs during peak temperatures.",
                    peak_f, recommended
                ),
                RecommendedAction {
                    mode: Some("COOL".to_string()),
                    cool_setpoint: Some(recommended),
                    ..RecommendedAction::default()
                },
                ((peak - off_peak) * PRE_COOL_KWH).max(0.0),
                format!("Peak temperature: {}°F", peak_f),
                DeviceAlertMetadata {
                    peak_temp_f: Some(range.peak_f),
                    typical_setpoint: Some(typical),
                    recommended_setpoint: Some(recommended),
                    ..DeviceAlertMetadata::default()
                },
            )
        } else if WINTER_MONTHS.contains(&month) && range.min_f < 50.0 {
            let (typical, recommended) = (68.0, 72.0);
            let min_f = whole_degrees(range.min_f);
            (
                if range.min_f < 20.0 {
                    DeviceAlertSeverity::Warning
                } else {
                    DeviceAlertSeverity::Optimization
                },
                format!("Pre-Heat Before {}°F Low", min_f),
                format!(
                    "Extreme cold expected with low of {}°F. Pre-heat home to {}°F during off-peak hours to reduce heating costs during coldest temperatures.",
                    min_f, recommended
                ),
                RecommendedAction {
                    mode: Some("HEAT".to_string()),
                    heat_setpoint: Some(recommended),
                    ..RecommendedAction::default()
                },
                ((peak - off_peak) * PRE_HEAT_KWH).max(0.0),
                format!("Low temperature: {}°F", min_f),
                DeviceAlertMetadata {
                    min_temp_f: Some(range.min_f),
                    typical_setpoint: Some(typical),
                    recommended_setpoint: Some(recommended),
                    ..DeviceAlertMetadata::default()
                },
            )
        } else {
            let (typical, recommended) = (72.0, 69.0);
            let peak_f = whole_degrees(range.peak_f);
            (
                DeviceAlertSeverity::Optimization,
                format!("Optimize Cooling (Current: {}°F)", peak_f),
                format!(
                    "Current forecast shows {}°F peak. Optimize your thermostat to {}°F for energy savings.",
                    peak_f, recommended
                ),
                RecommendedAction {
                    mode: Some("COOL".to_string()),
                    cool_setpoint: Some(recommended),
                    ..RecommendedAction::default()
                },
                FALLBACK_HVAC_SAVINGS,
                format!("Peak temperature: {}°F", peak_f),
                DeviceAlertMetadata {
                    peak_temp_f: Some(range.peak_f),
                    typical_setpoint: Some(typical),
                    recommended_setpoint: Some(recommended),
                    ..DeviceAlertMetadata::default()
                },
            )
        };

    Some(DeviceAlert {
        profile_id: profile.profile_id.clone(),
        device_type: DeviceType::Hvac,
        severity,
        title,
        description,
        recommended_action: action,
        estimated_savings_usd: round_to(savings, 2),
        weather_reason: reason,
        metadata,
    })
}

/// Full charge ahead of extreme weather, otherwise arbitrage on a price spike.
pub fn battery_alert(
    profile: &ConsumerProfile,
    range: Option<TemperatureRange>,
    prices: &[HourlyPrice],
) -> Option<DeviceAlert> {
    if !profile.has_battery {
        return None;
    }

    let extreme = range.and_then(|r| {
        if r.min_f < EXTREME_COLD_F {
            Some(("cold", r.min_f))
        } else if r.peak_f > EXTREME_HEAT_F {
            Some(("heat", r.peak_f))
        } else {
            None
        }
    });

    if let Some((kind, temp_f)) = extreme {
        return Some(DeviceAlert {
            profile_id: profile.profile_id.clone(),
            device_type: DeviceType::Battery,
            severity: DeviceAlertSeverity::Critical,
            title: "Full Battery Charge Recommended".to_string(),
            description: format!(
                "Extreme weather expected ({}: {}°F). Fully charge battery for backup power during potential grid stress.",
                kind,
                whole_degrees(temp_f)
            ),
            recommended_action: RecommendedAction {
                action: Some("CHARGE_FULL".to_string()),
                target_soc: Some(100),
                ..RecommendedAction::default()
            },
            estimated_savings_usd: 0.0,
            weather_reason: format!("Extreme {} forecast", kind),
            metadata: DeviceAlertMetadata {
                extreme_temp_f: Some(temp_f),
                reason: Some("resilience".to_string()),
                ..DeviceAlertMetadata::default()
            },
        });
    }

    if prices.is_empty() {
        return None;
    }
    let peak_price = prices
        .iter()
        .map(|p| p.consumer_price_kwh)
        .fold(f64::MIN, f64::max);
    let avg_price = mean(prices.iter().map(|p| p.consumer_price_kwh));
    if peak_price <= HIGH_PRICE_KWH || peak_price <= avg_price * 1.5 {
        return None;
    }

    let mut sorted: Vec<f64> = prices.iter().map(|p| p.consumer_price_kwh).collect();
    sorted.sort_by(f64::total_cmp);
    let charge = mean(sorted.iter().take(3).copied());
    let discharge = mean(sorted.iter().rev().take(3).copied());
    let savings = (discharge * BATTERY_EFFICIENCY - charge) * BATTERY_KWH;

    Some(DeviceAlert {
        profile_id: profile.profile_id.clone(),
        device_type: DeviceType::Battery,
        severity: DeviceAlertSeverity::Optimization,
        title: "Battery Arbitrage Opportunity".to_string(),
        description: format!(
            "Price spike expected (${:.2}/kWh peak). Charge battery during off-peak hours and discharge during peak to save on electricity costs.",
            peak_price
        ),
        recommended_action: RecommendedAction {
            action: Some("ARBITRAGE".to_string()),
            charge_during: Some("off_peak".to_string()),
            discharge_during: Some("peak".to_string()),
            ..RecommendedAction::default()
        },
        estimated_savings_usd: round_to(savings.max(0.0), 2),
        weather_reason: "Price spike forecast".to_string(),
        metadata: DeviceAlertMetadata {
            peak_price_kwh: Some(peak_price),
            avg_price_kwh: Some(avg_price),
            reason: Some("economics".to_string()),
            ..DeviceAlertMetadata::default()
        },
    })
}

/// Cheapest 4-hour window as (start hour, mean price); the earliest wins ties.
fn cheapest_window(prices: &[HourlyPrice]) -> Option<(usize, f64)> {
    prices
        .windows(EV_WINDOW_HOURS)
        .map(|w| mean(w.iter().map(|p| p.consumer_price_kwh)))
        .enumerate()
        .fold(None, |best, (start, cost)| match best {
            Some((_, best_cost)) if cost >= best_cost => best,
            _ => Some((start, cost)),
        })
}

fn clock_label(hour_of_day: usize) -> String {
    let period = if hour_of_day < 12 { "AM" } else { "PM" };
    let display = match hour_of_day {
        0 => 12,
        h if h > 12 => h - 12,
        h => h,
    };
    format!("{}:00 {}", display, period)
}

/// Defer charging when now is over 30 % dearer than the best window.
pub fn ev_charger_alert(profile: &ConsumerProfile, prices: &[HourlyPrice]) -> Option<DeviceAlert> {
    if !profile.has_ev {
        return None;
    }
    let current = prices.first()?.consumer_price_kwh;
    let (start, window_price) = cheapest_window(prices)?;
    if current <= window_price * (1.0 + EV_PRICE_MARGIN) {
        return None;
    }

    let savings = (current - window_price) * EV_SESSION_KWH;
    Some(DeviceAlert {
        profile_id: profile.profile_id.clone(),
        device_type: DeviceType::EvCharger,
        severity: DeviceAlertSeverity::Optimization,
        title: "Defer EV Charging to Save".to_string(),
        description: format!(
            "Current price ${:.2}/kWh is ${:.2} higher than optimal. Delay charging until {} to save on charging costs.",
            current,
            current - window_price,
            clock_label(start % 24)
        ),
        recommended_action: RecommendedAction {
            action: Some("DEFER".to_string()),
            optimal_start_hour: Some(start as u32),
            ..RecommendedAction::default()
        },
        estimated_savings_usd: round_to(savings.max(0.0), 2),
        weather_reason: "Price optimization opportunity".to_string(),
        metadata: DeviceAlertMetadata {
            current_price_kwh: Some(current),
            optimal_price_kwh: Some(window_price),
            optimal_start_hour: Some(start as u32),
            ..DeviceAlertMetadata::default()
        },
    })
}

/// Every device alert for `profile`, in HVAC, battery, EV order.
pub fn generate(
    profile: &ConsumerProfile,
    temps: &[f64],
    prices: &[HourlyPrice],
    start: DateTime<Utc>,
) -> Vec<DeviceAlert> {
    let range = TemperatureRange::from_hourly(temps);
    let alerts: Vec<DeviceAlert> = [
        hvac_alert(profile, range, prices, start.month()),
        battery_alert(profile, range, prices),
        ev_charger_alert(profile, prices),
    ]
    .into_iter()
    .flatten()
    .collect();

    debug!(
        "Generated {} device alerts for profile {}",
        alerts.len(),
        profile.profile_id
    );
    alerts
}
