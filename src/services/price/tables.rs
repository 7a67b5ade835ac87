//! Static pricing inputs: regional base prices, hourly curves and the
//! February 2021 Uri weather profile.

use crate::services::grid::zones::{
    COAST, EAST, FAR_WEST, NORTH, NORTH_CENTRAL, SOUTHERN, SOUTH_CENTRAL, WEST,
};

pub const DEFAULT_BASE_PRICE_MWH: f64 = 35.0;
pub const DEFAULT_WIND_PENETRATION: f64 = 0.1;
pub const ERCOT_CAPACITY_MW: f64 = 85_000.0;

/// Normal-conditions wholesale price by ISO ($/MWh)
const BASE_PRICE_MWH: [(&str, f64); 7] = [
    ("ERCOT", 28.0),
    ("CAISO", 45.0),
    ("PJM", 35.0),
    ("MISO", 30.0),
    ("NYISO", 42.0),
    ("ISO-NE", 40.0),
    ("SPP", 25.0),
];

const WIND_PENETRATION: [(&str, f64); 7] = [
    ("ERCOT", 0.25),
    ("SPP", 0.35),
    ("CAISO", 0.10),
    ("MISO", 0.15),
    ("PJM", 0.05),
    ("NYISO", 0.05),
    ("ISO-NE", 0.04),
];

pub const TOD_PRICE_PREMIUM: [f64; 24] = [
    0.70, 0.65, 0.60, 0.58, 0.58, 0.62, 0.75, 0.90, 1.00, 1.05, 1.08, 1.10, //
    1.12, 1.15, 1.18, 1.20, 1.25, 1.35, 1.40, 1.35, 1.20, 1.05, 0.90, 0.80,
];

/// Winter wind capacity factor by hour of day
pub const WIND_HOURLY_FACTOR: [f64; 24] = [
    0.42, 0.44, 0.45, 0.46, 0.45, 0.43, 0.40, 0.35, 0.30, 0.28, 0.25, 0.23, //
    0.22, 0.24, 0.26, 0.28, 0.30, 0.32, 0.34, 0.36, 0.38, 0.40, 0.41, 0.42,
];

pub const NORMAL_WIND_MPH: [f64; 24] = [
    12.0, 13.0, 13.0, 14.0, 14.0, 13.0, 12.0, 10.0, 9.0, 8.0, 7.0, 7.0, //
    7.0, 7.0, 8.0, 8.0, 9.0, 10.0, 10.0, 11.0, 11.0, 12.0, 12.0, 12.0,
];

/// Hourly temperatures for Feb 14-15 2021
pub const URI_TEMP_PROFILE: [f64; 48] = [
    20.0, 18.0, 16.0, 14.0, 12.0, 10.0, 9.0, 8.0, 10.0, 13.0, 16.0, 18.0, //
    19.0, 18.0, 16.0, 14.0, 12.0, 10.0, 8.0, 7.0, 6.0, 5.0, 5.0, 4.0, //
    3.0, 2.0, 1.0, 0.0, -1.0, -2.0, -1.0, 0.0, 2.0, 5.0, 8.0, 10.0, //
    12.0, 11.0, 9.0, 7.0, 5.0, 3.0, 1.0, 0.0, -1.0, -2.0, -3.0, -2.0,
];

pub const URI_WIND_FACTOR: [f64; 48] = [
    0.30, 0.28, 0.25, 0.20, 0.18, 0.15, 0.12, 0.10, //
    0.08, 0.06, 0.05, 0.04, 0.03, 0.03, 0.02, 0.02, //
    0.02, 0.02, 0.01, 0.01, 0.01, 0.01, 0.01, 0.01, //
    0.01, 0.01, 0.01, 0.01, 0.01, 0.01, 0.01, 0.01, //
    0.01, 0.01, 0.02, 0.02, 0.02, 0.02, 0.02, 0.02, //
    0.02, 0.01, 0.01, 0.01, 0.01, 0.01, 0.01, 0.01,
];

pub const URI_WIND_MPH: [f64; 48] = [
    8.0, 7.0, 7.0, 6.0, 5.0, 5.0, 4.0, 4.0, 3.0, 3.0, 2.0, 2.0, //
    2.0, 2.0, 2.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, //
    1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 2.0, 2.0, 2.0, //
    2.0, 2.0, 2.0, 2.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0,
];

/// Structural price multiplier and weather lookup point per weather zone
pub struct ZonePricing {
    pub zone: &'static str,
    pub factor: f64,
    pub lat: f64,
    pub lon: f64,
}

pub const ZONE_PRICING: [ZonePricing; 8] = [
    ZonePricing { zone: FAR_WEST, factor: 0.85, lat: 31.99, lon: -102.08 },
    ZonePricing { zone: WEST, factor: 0.90, lat: 31.44, lon: -100.45 },
    ZonePricing { zone: COAST, factor: 0.92, lat: 29.76, lon: -95.37 },
    ZonePricing { zone: SOUTHERN, factor: 0.95, lat: 27.80, lon: -97.40 },
    ZonePricing { zone: EAST, factor: 0.97, lat: 31.33, lon: -94.73 },
    ZonePricing { zone: NORTH, factor: 1.00, lat: 33.20, lon: -97.13 },
    ZonePricing { zone: SOUTH_CENTRAL, factor: 1.05, lat: 30.27, lon: -97.74 },
    ZonePricing { zone: NORTH_CENTRAL, factor: 1.08, lat: 32.78, lon: -96.80 },
];

pub const ML_FEATURE_NAMES: [&str; 16] = [
    "temperature_f",
    "wind_speed_mph",
    "hour_of_day",
    "day_of_week",
    "month",
    "is_weekend",
    "heating_degree_hours",
    "cooling_degree_hours",
    "demand_estimate_mw",
    "renewable_gen_pct",
    "grid_utilization_pct",
    "rolling_24h_avg_price",
    "rolling_24h_avg_temp",
    "temp_change_6h",
    "is_extreme_cold",
    "is_extreme_heat",
];

fn lookup(table: &[(&str, f64)], region: &str) -> Option<f64> {
    table.iter().find(|(r, _)| *r == region).map(|(_, v)| *v)
}

pub fn base_price(region: &str) -> f64 {
    lookup(&BASE_PRICE_MWH, region).unwrap_or(DEFAULT_BASE_PRICE_MWH)
}

pub fn wind_penetration(region: &str) -> f64 {
    lookup(&WIND_PENETRATION, region).unwrap_or(DEFAULT_WIND_PENETRATION)
}

pub fn zone_pricing(zone: &str) -> Option<&'static ZonePricing> {
    ZONE_PRICING.iter().find(|z| z.zone == zone)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_region_lookups_fall_back() {
        assert_eq!(base_price("ERCOT"), 28.0);
        assert_eq!(base_price("BPA"), 35.0);
        assert_eq!(wind_penetration("SPP"), 0.35);
        assert_eq!(wind_penetration("BPA"), 0.1);
    }

    #[test]
    fn test_zone_factors_span() {
        assert_eq!(zone_pricing(FAR_WEST).map(|z| z.factor), Some(0.85));
        assert_eq!(zone_pricing(NORTH_CENTRAL).map(|z| z.factor), Some(1.08));
        assert!(zone_pricing("Panhandle").is_none());
    }
}
