//! Application state shared across all handlers.

use std::sync::Arc;

use metrics_exporter_prometheus::PrometheusHandle;

use crate::config::Config;
use crate::services::{
    ConsumerService, DispatchService, GridGraph, NotificationService, OrchestratorService,
    PriceService, WeatherService,
};

/// Application state shared across handlers.
///
/// The grid graph is loaded once at startup and never mutated; every other
/// service is a cheap handle around shared interior state.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Config,
    /// Merged ACTIVSg2000 + Travis150 graph
    pub grid: Arc<GridGraph>,
    /// Cached Open-Meteo forecasts
    pub weather: WeatherService,
    /// Crew dispatch state machine
    pub dispatch: DispatchService,
    /// Wholesale and retail price forecasts
    pub prices: PriceService,
    /// Household profiles and optimisation
    pub consumers: ConsumerService,
    /// ntfy push relay
    pub notifier: NotificationService,
    /// End-to-end simulation sessions
    pub orchestrator: OrchestratorService,
    /// Renders the Prometheus exposition at `/metrics`
    pub metrics_handle: Option<PrometheusHandle>,
}

impl axum::extract::FromRef<AppState> for DispatchService {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.dispatch.clone()
    }
}

impl axum::extract::FromRef<AppState> for ConsumerService {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.consumers.clone()
    }
}

impl axum::extract::FromRef<AppState> for NotificationService {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.notifier.clone()
    }
}

impl axum::extract::FromRef<AppState> for OrchestratorService {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.orchestrator.clone()
    }
}
