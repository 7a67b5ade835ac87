use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub environment: String,
    pub host: String,
    pub port: u16,
    pub log_format: LogFormat,
    pub cors_origins: Vec<String>,
    pub request_timeout: u64,
    pub grid: GridDataConfig,
    pub notifications: NotificationConfig,
    pub weather: WeatherConfig,
    /// Optional metadata file describing a trained price model
    pub price_model_file: Option<PathBuf>,
    /// Delay between messages on the operator event stream
    pub event_stream_interval_ms: u64,
}

/// Log output format selected by `LOG_FORMAT`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

/// Locations of the grid model source files
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GridDataConfig {
    pub activsg_case_file: PathBuf,
    pub activsg_aux_file: PathBuf,
    pub travis150_aux_file: PathBuf,
    /// Parsed graph cache; rebuilt from the source files when missing
    pub cache_file: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationConfig {
    pub ntfy_server: String,
    pub supabase_url: Option<String>,
    pub supabase_anon_key: Option<String>,
    /// Base URL used for action links inside notifications
    pub api_base_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherConfig {
    pub open_meteo_url: String,
    pub cache_ttl_secs: u64,
    /// Refresh the live weather cache in the background
    pub background_refresh: bool,
}

impl Default for GridDataConfig {
    fn default() -> Self {
        Self {
            activsg_case_file: PathBuf::from("data/activsg2000/case_ACTIVSg2000.m"),
            activsg_aux_file: PathBuf::from("data/activsg2000/ACTIVSg2000.aux"),
            travis150_aux_file: PathBuf::from("data/travis150/Travis150_Electric_Data.aux"),
            cache_file: PathBuf::from("data/parsed_grid.json"),
        }
    }
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            ntfy_server: "https://ntfy.sh".to_string(),
            supabase_url: None,
            supabase_anon_key: None,
            api_base_url: "http://localhost:3000".to_string(),
        }
    }
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            open_meteo_url: "https://api.open-meteo.com/v1/forecast".to_string(),
            cache_ttl_secs: 900,
            background_refresh: false,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            environment: "development".to_string(),
            host: "0.0.0.0".to_string(),
            port: 8000,
            log_format: LogFormat::Pretty,
            cors_origins: vec![
                "http://localhost:3000".to_string(),
                "http://localhost:5173".to_string(),
            ],
            request_timeout: 30,
            grid: GridDataConfig::default(),
            notifications: NotificationConfig::default(),
            weather: WeatherConfig::default(),
            price_model_file: None,
            event_stream_interval_ms: crate::constants::events::STREAM_INTERVAL_MS,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // Load .env file if it exists

        let defaults = Config::default();

        let config = Config {
            environment: env::var("ENVIRONMENT").unwrap_or(defaults.environment),
            host: env::var("HOST").unwrap_or(defaults.host),
            port: match env::var("PORT") {
                Ok(port) => port
                    .parse()
                    .map_err(|e| anyhow::anyhow!("PORT must be a valid port number: {}", e))?,
                Err(_) => defaults.port,
            },
            log_format: match env::var("LOG_FORMAT").as_deref() {
                Ok("json") => LogFormat::Json,
                _ => LogFormat::Pretty,
            },
            cors_origins: env::var("CORS_ORIGINS")
                .map(|v| split_list(&v))
                .unwrap_or(defaults.cors_origins),
            request_timeout: env::var("REQUEST_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.request_timeout),
            grid: GridDataConfig {
                activsg_case_file: path_var("ACTIVSG_CASE_FILE", defaults.grid.activsg_case_file),
                activsg_aux_file: path_var("ACTIVSG_AUX_FILE", defaults.grid.activsg_aux_file),
                travis150_aux_file: path_var(
                    "TRAVIS150_AUX_FILE",
                    defaults.grid.travis150_aux_file,
                ),
                cache_file: path_var("GRID_CACHE_FILE", defaults.grid.cache_file),
            },
            notifications: NotificationConfig {
                ntfy_server: env::var("NTFY_SERVER").unwrap_or(defaults.notifications.ntfy_server),
                supabase_url: non_empty_var("SUPABASE_URL"),
                supabase_anon_key: non_empty_var("SUPABASE_ANON_KEY"),
                api_base_url: env::var("API_BASE_URL")
                    .unwrap_or(defaults.notifications.api_base_url),
            },
            weather: WeatherConfig {
                open_meteo_url: env::var("OPEN_METEO_URL")
                    .unwrap_or(defaults.weather.open_meteo_url),
                cache_ttl_secs: env::var("WEATHER_CACHE_TTL_SECS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(defaults.weather.cache_ttl_secs),
                background_refresh: env::var("WEATHER_BACKGROUND_REFRESH")
                    .unwrap_or_else(|_| "false".to_string())
                    .parse()
                    .unwrap_or(false),
            },
            price_model_file: non_empty_var("PRICE_MODEL_FILE").map(PathBuf::from),
            event_stream_interval_ms: env::var("EVENT_STREAM_INTERVAL_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.event_stream_interval_ms),
        };

        config.validate()?;
        Ok(config)
    }

    /// Reject settings the server cannot start with
    pub fn validate(&self) -> Result<()> {
        if self.port == 0 {
            anyhow::bail!("PORT must be greater than zero");
        }
        if self.request_timeout == 0 {
            anyhow::bail!("REQUEST_TIMEOUT_SECS must be greater than zero");
        }
        if self.notifications.ntfy_server.trim().is_empty() {
            anyhow::bail!("NTFY_SERVER must not be empty");
        }
        Ok(())
    }

    /// Supabase credentials, when both halves are configured
    pub fn supabase(&self) -> Option<(&str, &str)> {
        match (
            self.notifications.supabase_url.as_deref(),
            self.notifications.supabase_anon_key.as_deref(),
        ) {
            (Some(url), Some(key)) => Some((url, key)),
            _ => None,
        }
    }
}

fn path_var(name: &str, default: PathBuf) -> PathBuf {
    env::var(name).map(PathBuf::from).unwrap_or(default)
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.port, 8000);
        assert_eq!(config.cors_origins.len(), 2);
        assert!(config.supabase().is_none());
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        let config = Config {
            request_timeout: 0,
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_split_list_trims_and_skips_empty() {
        assert_eq!(
            split_list(" http://a , ,http://b"),
            vec!["http://a".to_string(), "http://b".to_string()]
        );
    }
}
