//! Application startup and initialization logic.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use metrics_exporter_prometheus::PrometheusHandle;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::app_state::AppState;
use crate::config::{Config, LogFormat};
use crate::constants::api::VERSION;
use crate::services::demand::CITIES;
use crate::services::price::tables::ZONE_PRICING;
use crate::services::weather::WeatherPoint;
use crate::services::{
    ConsumerService, DispatchService, GridGraph, NotificationService, OrchestratorService,
    PriceService, WeatherService,
};

const HTTP_CLIENT_TIMEOUT_SECS: u64 = 15;

/// Install the tracing subscriber. `LOG_FORMAT=json` selects JSON lines.
pub fn init_tracing(config: &Config) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "blackout_api=debug,tower_http=debug".into());

    match config.log_format {
        LogFormat::Json => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init(),
        LogFormat::Pretty => tracing_subscriber::fmt().with_env_filter(filter).init(),
    }
}

/// Load the grid and initialize every service.
pub async fn initialize_app(config: &Config) -> Result<AppState> {
    info!("🚀 Starting Blackout API v{} ({})", VERSION, config.environment);

    let metrics_handle = metrics_exporter_prometheus::PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| anyhow::anyhow!("Failed to install Prometheus recorder: {}", e))?;
    info!("✅ Prometheus metrics initialized");

    let grid_config = config.grid.clone();
    let grid = tokio::task::spawn_blocking(move || GridGraph::load(&grid_config))
        .await
        .map_err(|e| anyhow::anyhow!("Grid loading task failed: {}", e))??;
    info!(
        "✅ Grid model loaded ({} nodes, {} edges)",
        grid.node_count(),
        grid.edge_count()
    );

    build_state(config, Arc::new(grid), Some(metrics_handle))
}

/// Wire services around an already loaded grid.
pub fn build_state(
    config: &Config,
    grid: Arc<GridGraph>,
    metrics_handle: Option<PrometheusHandle>,
) -> Result<AppState> {
    let http_client = reqwest::Client::builder()
        .timeout(Duration::from_secs(HTTP_CLIENT_TIMEOUT_SECS))
        .user_agent(format!("blackout-api/{}", VERSION))
        .build()
        .map_err(|e| anyhow::anyhow!("Failed to create HTTP client: {}", e))?;
    info!("✅ HTTP client initialized");

    let weather = WeatherService::new(http_client.clone(), &config.weather);
    info!(
        "✅ Weather service initialized (cache TTL: {}s)",
        config.weather.cache_ttl_secs
    );

    let prices = PriceService::load(config.price_model_file.as_deref(), weather.clone());
    info!("✅ Price service initialized (model loaded: {})", prices.model_loaded());

    let consumers = ConsumerService::new(prices.clone());
    info!("✅ Consumer service initialized");

    let dispatch = DispatchService::new();
    info!("✅ Dispatch service initialized");

    let notifier = NotificationService::new(http_client, &config.notifications);
    match config.supabase() {
        Some((url, _)) => info!("✅ Notification service initialized (directory: {})", url),
        None => warn!("⚠️ Notification service initialized without a Supabase directory"),
    }

    let orchestrator = OrchestratorService::new(
        grid.clone(),
        weather.clone(),
        prices.clone(),
        consumers.clone(),
        notifier.clone(),
        dispatch.clone(),
    );
    info!("✅ Orchestrator initialized");

    Ok(AppState {
        config: config.clone(),
        grid,
        weather,
        dispatch,
        prices,
        consumers,
        notifier,
        orchestrator,
        metrics_handle,
    })
}

/// Every location whose live weather is read by demand or price forecasts.
fn weather_points() -> Vec<WeatherPoint> {
    CITIES
        .iter()
        .map(|&(key, lat, lon)| WeatherPoint { key, lat, lon })
        .chain(ZONE_PRICING.iter().map(|z| WeatherPoint {
            key: z.zone,
            lat: z.lat,
            lon: z.lon,
        }))
        .collect()
}

/// Spawn background tasks.
pub fn spawn_background_tasks(app_state: &AppState) {
    let weather = &app_state.config.weather;
    if weather.background_refresh {
        app_state
            .weather
            .clone()
            .spawn_refresh_task(weather_points(), Duration::from_secs(weather.cache_ttl_secs));
        info!("✅ Weather refresh task started");
    }
}

/// Wait for shutdown signal.
pub async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!("Failed to install signal handler: {}", e);
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal, shutting down gracefully");
        },
        _ = terminate => {
            info!("Received SIGTERM signal, shutting down gracefully");
        },
    }
}
