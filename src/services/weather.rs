//! Live weather from Open-Meteo with a short-lived in-memory cache.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};

use crate::config::WeatherConfig;
use crate::error::{ApiError, ErrorCode};

/// Seconds to wait on Open-Meteo before giving up
const REQUEST_TIMEOUT_SECS: u64 = 5;
const FORECAST_DAYS: u32 = 3;

/// One hourly reading
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HourlyWeather {
    pub temp_f: f64,
    pub wind_mph: f64,
}

/// A named point whose forecast is cached.
#[derive(Debug, Clone, Copy)]
pub struct WeatherPoint {
    pub key: &'static str,
    pub lat: f64,
    pub lon: f64,
}

#[derive(Debug, Deserialize)]
struct ForecastBody {
    #[serde(default)]
    hourly: HourlySeries,
}

#[derive(Debug, Default, Deserialize)]
struct HourlySeries {
    #[serde(default)]
    temperature_2m: Vec<Option<f64>>,
    #[serde(default)]
    wind_speed_10m: Vec<Option<f64>>,
}

type CacheEntry = (Instant, Arc<Vec<HourlyWeather>>);

/// Open-Meteo client shared by the demand and price services.
#[derive(Clone)]
pub struct WeatherService {
    client: reqwest::Client,
    base_url: String,
    ttl: Duration,
    cache: Arc<RwLock<HashMap<String, CacheEntry>>>,
}

impl std::fmt::Debug for WeatherService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WeatherService")
            .field("base_url", &self.base_url)
            .field("ttl", &self.ttl)
            .finish()
    }
}

impl WeatherService {
    pub fn new(client: reqwest::Client, config: &WeatherConfig) -> Self {
        Self {
            client,
            base_url: config.open_meteo_url.clone(),
            ttl: Duration::from_secs(config.cache_ttl_secs),
            cache: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Hourly forecast for a point, served from cache while fresh.
    pub async fn hourly(&self, point: WeatherPoint) -> Result<Arc<Vec<HourlyWeather>>, ApiError> {
        if let Some((fetched_at, data)) = self.cache.read().await.get(point.key) {
            if fetched_at.elapsed() < self.ttl {
                debug!("Weather cache hit for {}", point.key);
                return Ok(Arc::clone(data));
            }
        }

        let data = Arc::new(self.fetch(point).await?);
        self.cache
            .write()
            .await
            .insert(point.key.to_string(), (Instant::now(), Arc::clone(&data)));
        Ok(data)
    }

    /// Like [`hourly`](Self::hourly) but logs and swallows failures.
    pub async fn hourly_or_none(&self, point: WeatherPoint) -> Option<Arc<Vec<HourlyWeather>>> {
        match self.hourly(point).await {
            Ok(data) => Some(data),
            Err(e) => {
                warn!("Failed to fetch weather for {}: {}", point.key, e);
                None
            }
        }
    }

    async fn fetch(&self, point: WeatherPoint) -> Result<Vec<HourlyWeather>, ApiError> {
        let response = self
            .client
            .get(&self.base_url)
            .query(&[
                ("latitude", point.lat.to_string()),
                ("longitude", point.lon.to_string()),
                ("hourly", "temperature_2m,wind_speed_10m".to_string()),
                ("temperature_unit", "fahrenheit".to_string()),
                ("wind_speed_unit", "mph".to_string()),
                ("forecast_days", FORECAST_DAYS.to_string()),
            ])
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ApiError::with_code(ErrorCode::ExternalServiceTimeout, "Open-Meteo timed out")
                } else {
                    ApiError::ExternalService(format!("Open-Meteo request failed: {}", e))
                }
            })?
            .error_for_status()
            .map_err(|e| ApiError::ExternalService(format!("Open-Meteo returned error: {}", e)))?;

        let body: ForecastBody = response
            .json()
            .await
            .map_err(|e| ApiError::ExternalService(format!("Invalid Open-Meteo response: {}", e)))?;

        let readings = body
            .hourly
            .temperature_2m
            .iter()
            .zip(body.hourly.wind_speed_10m.iter())
            .map(|(t, w)| HourlyWeather {
                temp_f: t.unwrap_or(65.0),
                wind_mph: w.unwrap_or(10.0),
            })
            .collect::<Vec<_>>();

        debug!("Fetched {} hourly readings for {}", readings.len(), point.key);
        Ok(readings)
    }

    /// Refresh the given points on a fixed interval.
    pub fn spawn_refresh_task(
        self,
        points: Vec<WeatherPoint>,
        refresh_interval: Duration,
    ) -> tokio::task::JoinHandle<()> {
        info!(
            "🔄 Starting weather cache refresh task ({} points, interval: {}s)",
            points.len(),
            refresh_interval.as_secs()
        );

        tokio::spawn(async move {
            let mut timer = tokio::time::interval(refresh_interval);
            loop {
                timer.tick().await;
                let mut refreshed = 0;
                for point in &points {
                    match self.fetch(*point).await {
                        Ok(data) => {
                            self.cache
                                .write()
                                .await
                                .insert(point.key.to_string(), (Instant::now(), Arc::new(data)));
                            refreshed += 1;
                        }
                        Err(e) => error!("Failed to refresh weather for {}: {}", point.key, e),
                    }
                }
                info!("🔄 Refreshed weather cache: {}/{} points", refreshed, points.len());
            }
        })
    }
}
