//! Trained linear price model and its feature builder.

use std::path::Path;

use chrono::{DateTime, Datelike, Duration, Utc};
use serde::Deserialize;
use thiserror::Error;

use super::rules::{cooling_degree_hours, heating_degree_hours};
use super::tables::{wind_penetration, ERCOT_CAPACITY_MW, ML_FEATURE_NAMES};
use crate::services::demand::TOD_CURVE;

pub const FEATURE_COUNT: usize = ML_FEATURE_NAMES.len();

pub type FeatureRow = [f64; FEATURE_COUNT];

#[derive(Error, Debug)]
pub enum PriceModelError {
    #[error("Failed to read price model {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid price model JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Price model expects {expected} coefficients, found {found}")]
    FeatureCount { expected: usize, found: usize },
}

/// Coefficients exported by the offline training job.
#[derive(Debug, Clone, Deserialize)]
pub struct LinearPriceModel {
    #[serde(default)]
    pub training_date: Option<String>,
    #[serde(default)]
    pub cv_r2_score: Option<f64>,
    #[serde(default)]
    pub n_samples: Option<u64>,
    #[serde(default = "default_feature_names")]
    pub feature_names: Vec<String>,
    pub intercept: f64,
    pub coefficients: Vec<f64>,
}

fn default_feature_names() -> Vec<String> {
    ML_FEATURE_NAMES.iter().map(|s| s.to_string()).collect()
}

impl LinearPriceModel {
    pub fn from_json(raw: &str) -> Result<Self, PriceModelError> {
        let model: Self = serde_json::from_str(raw)?;
        if model.coefficients.len() != FEATURE_COUNT {
            return Err(PriceModelError::FeatureCount {
                expected: FEATURE_COUNT,
                found: model.coefficients.len(),
            });
        }
        Ok(model)
    }

    pub fn from_file(path: &Path) -> Result<Self, PriceModelError> {
        let raw = std::fs::read_to_string(path).map_err(|source| PriceModelError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&raw)
    }

    pub fn predict(&self, row: &FeatureRow) -> f64 {
        self.intercept
            + self
                .coefficients
                .iter()
                .zip(row.iter())
                .map(|(c, x)| c * x)
                .sum::<f64>()
    }
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Build one feature row per hour, in `ML_FEATURE_NAMES` order.
///
/// Rolling averages look back at most 24 hours and use the rules prices as
/// a proxy for realised prices.
pub fn build_features(
    now: DateTime<Utc>,
    temps: &[f64],
    wind_mphs: &[f64],
    rules_prices: &[f64],
) -> Vec<FeatureRow> {
    let ercot_wind_pen = wind_penetration("ERCOT");

    (0..temps.len())
        .map(|h| {
            let at = now + Duration::hours(h as i64);
            let hod = h % 24;
            let temp = temps[h];
            let wind = wind_mphs[h];
            let hdh = heating_degree_hours(temp);
            let cdh = cooling_degree_hours(temp);

            let demand = (ERCOT_CAPACITY_MW * 0.45 + hdh * 400.0 + cdh * 350.0) * TOD_CURVE[hod];
            let renewable_pct = (wind / 25.0).min(1.0) * ercot_wind_pen * 100.0;
            let grid_util_pct = (demand / ERCOT_CAPACITY_MW * 100.0).min(100.0);

            let (rolling_price, rolling_temp) = if h == 0 {
                (rules_prices[0], temps[0])
            } else {
                let start = h.saturating_sub(24);
                (mean(&rules_prices[start..h]), mean(&temps[start..h]))
            };
            let temp_change = if h >= 6 { temp - temps[h - 6] } else { 0.0 };

            let weekday = at.weekday().num_days_from_monday();
            [
                temp,
                wind,
                hod as f64,
                weekday as f64,
                at.month() as f64,
                f64::from(u8::from(weekday >= 5)),
                hdh,
                cdh,
                demand,
                renewable_pct,
                grid_util_pct,
                rolling_price,
                rolling_temp,
                temp_change,
                f64::from(u8::from(temp < 20.0)),
                f64::from(u8::from(temp > 100.0)),
            ]
        })
        .collect()
}
