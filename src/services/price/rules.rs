//! Deterministic price engine.

use std::f64::consts::PI;

use super::tables::TOD_PRICE_PREMIUM;
use crate::services::demand::TOD_CURVE;
use crate::utils::round_to;

const HEATING_BASE_F: f64 = 65.0;
const COOLING_BASE_F: f64 = 75.0;

pub const RULES_PRICE_FLOOR: f64 = -15.0;
pub const HYBRID_PRICE_FLOOR: f64 = -20.0;
const URI_SPIKE_CAP: f64 = 9000.0;

pub fn heating_degree_hours(temp_f: f64) -> f64 {
    (HEATING_BASE_F - temp_f).max(0.0)
}

pub fn cooling_degree_hours(temp_f: f64) -> f64 {
    (temp_f - COOLING_BASE_F).max(0.0)
}

/// Diurnal temperature curve peaking at 2 PM
pub fn normal_temperature(hour_of_day: usize) -> f64 {
    78.0 + 16.0 * (2.0 * PI * (hour_of_day as f64 - 14.0) / 24.0).sin()
}

/// Grid utilisation fraction in `[0.45, 1.0]`
pub fn estimate_grid_util(hdh: f64, cdh: f64, hour: usize) -> f64 {
    let stress = (hdh * 0.008 + cdh * 0.006) * TOD_CURVE[hour % 24];
    (0.45 + stress).min(1.0)
}

/// Inputs for one hour of the rules engine.
#[derive(Debug, Clone, Copy)]
pub struct RulesInput {
    pub hour: usize,
    pub temp_f: f64,
    pub wind_factor: f64,
    pub grid_util: f64,
    pub base_price: f64,
    pub is_uri: bool,
}

/// Wholesale price in $/MWh, rounded to cents.
///
/// Scarcity adds a quadratic term above 80% utilisation and a steep linear
/// term above 95%. Under Uri conditions with more than 40 heating
/// degree-hours the spike model takes over, capped at $9000.
pub fn rules_price(input: RulesInput) -> f64 {
    let hdh = heating_degree_hours(input.temp_f);
    let cdh = cooling_degree_hours(input.temp_f);
    let tod = TOD_PRICE_PREMIUM[input.hour % 24];

    let temp_premium = hdh * 2.5 + cdh * 1.8;
    let wind_depression = (1.0 - input.wind_factor * 0.4).max(0.3);

    let mut scarcity = 0.0;
    if input.grid_util > 0.80 {
        scarcity = (input.grid_util - 0.80).powi(2) * 5000.0;
    }
    if input.grid_util > 0.95 {
        scarcity += (input.grid_util - 0.95) * 20000.0;
    }

    if input.is_uri && hdh > 40.0 {
        let spike = (hdh * 80.0 + scarcity * 3.0).min(URI_SPIKE_CAP);
        scarcity = scarcity.max(spike);
    }

    let price = (input.base_price + temp_premium) * tod * wind_depression + scarcity;
    round_to(price.max(RULES_PRICE_FLOOR), 2)
}

/// 70/30 blend of model and rules prices.
///
/// Strong overnight wind forces a negative price; under Uri the blend never
/// drops below 85% of a rules price above $500.
pub fn hybrid_blend(ml_price: f64, rules_price: f64, hour: usize, wind_factor: f64, is_uri: bool) -> f64 {
    let mut price = ml_price * 0.7 + rules_price * 0.3;

    if (2..=5).contains(&hour) && wind_factor > 0.15 {
        price = price.min(-5.0 * wind_factor);
    }
    if is_uri && rules_price > 500.0 {
        price = price.max(rules_price * 0.85);
    }

    round_to(price.max(HYBRID_PRICE_FLOOR), 2)
}

/// Wholesale $/MWh to retail $/kWh: utility markup plus distribution charge.
pub fn consumer_price_kwh(price_mwh: f64) -> f64 {
    round_to((price_mwh / 1000.0 * 2.2 + 0.04).max(0.0), 4)
}
