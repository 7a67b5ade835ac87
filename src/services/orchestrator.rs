//! End-to-end run: demand → cascade → prices → alerts → crew dispatch.
//!
//! Each run is a session kept in memory. The session record is updated as
//! every stage finishes, so `GET /api/orchestrate/sessions/{id}` shows how
//! far a run got even when a later stage is still working.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use metrics::counter;
use serde_json::json;
use tracing::{info, warn};
use uuid::Uuid;

use crate::constants::forecast::PRICE_HORIZON_HOURS;
use crate::constants::orchestrate::*;
use crate::error::ApiError;
use crate::models::alerts::DeviceAlert;
use crate::models::notification::WeatherAlert;
use crate::models::orchestrate::{
    LiveAlert, OrchestrateRequest, OrchestrationSummary, SessionStatus, SessionsResponse,
    SimulationSession,
};
use crate::models::price::{HourlyPrice, PricingMode};
use crate::models::scenario::Scenario;
use crate::models::simulate::CascadeResult;
use crate::services::cascade::{run_cascade, CascadeParams};
use crate::services::demand::scenario_multipliers;
use crate::services::device_alerts;
use crate::services::{
    ConsumerService, DispatchService, GridGraph, NotificationService, PriceService, WeatherService,
};
use crate::utils::round_to;

/// Grid-wide alerts for a finished cascade and its price outlook.
pub fn grid_alerts(
    session_id: &str,
    grid_region: &str,
    cascade: &CascadeResult,
    prices: &[HourlyPrice],
    now: DateTime<Utc>,
) -> Vec<LiveAlert> {
    let alert = |severity: &str, alert_type: &str, title: String, description: String, metadata| LiveAlert {
        id: Uuid::new_v4().to_string(),
        session_id: session_id.to_string(),
        profile_id: None,
        grid_region: grid_region.to_string(),
        severity: severity.to_string(),
        title,
        description,
        alert_type: alert_type.to_string(),
        metadata,
        created_at: now,
    };

    let mut alerts = Vec::new();
    let (peak, avg) = wholesale_peak_and_avg(prices);

    if cascade.total_failed_nodes > 0 {
        alerts.push(alert(
            "critical",
            "cascade_warning",
            format!("Cascade Alert: {} nodes failed", cascade.total_failed_nodes),
            format!(
                "{:.0} MW load shed across {} cascade steps. Grid region: {}.",
                cascade.total_load_shed_mw, cascade.cascade_depth, grid_region
            ),
            json!({
                "total_failed_nodes": cascade.total_failed_nodes,
                "total_load_shed_mw": cascade.total_load_shed_mw,
                "cascade_depth": cascade.cascade_depth,
            }),
        ));
    }

    if peak > PRICE_SPIKE_MWH {
        let severity = if peak > CRITICAL_PRICE_MWH { "critical" } else { "warning" };
        alerts.push(alert(
            severity,
            "price_spike",
            format!("Price Spike: ${:.0}/MWh peak", peak),
            format!(
                "Wholesale prices forecast to spike to ${:.0}/MWh (avg ${:.0}/MWh). Consider shifting flexible loads to off-peak hours.",
                peak, avg
            ),
            json!({
                "peak_price_mwh": round_to(peak, 2),
                "avg_price_mwh": round_to(avg, 2),
            }),
        ));
    }

    if peak > LOAD_SHIFT_MWH {
        let retail_peak = prices.iter().map(|p| p.consumer_price_kwh).fold(f64::MIN, f64::max);
        let retail_low = prices.iter().map(|p| p.consumer_price_kwh).fold(f64::MAX, f64::min);
        alerts.push(alert(
            "optimization",
            "device_savings",
            format!(
                "Shift Loads: Save ${:.2} on {:.0} kWh",
                (retail_peak - retail_low) * SHIFTABLE_KWH,
                SHIFTABLE_KWH
            ),
            format!(
                "Peak retail: ${:.3}/kWh vs valley: ${:.3}/kWh. Defer EV charging and heavy appliances to off-peak hours.",
                retail_peak, retail_low
            ),
            json!({
                "consumer_peak_kwh": round_to(retail_peak, 4),
                "consumer_low_kwh": round_to(retail_low, 4),
            }),
        ));
    }

    if cascade.total_load_shed_mw > LOAD_SHED_ALERT_MW {
        alerts.push(alert(
            "warning",
            "load_shed",
            format!("Load Shed Warning: {:.0} MW", cascade.total_load_shed_mw),
            format!(
                "Significant load shedding of {:.0} MW detected. Rolling blackouts may affect your area. Ensure battery reserves are charged.",
                cascade.total_load_shed_mw
            ),
            json!({ "total_load_shed_mw": cascade.total_load_shed_mw }),
        ));
    }

    alerts
}

/// (peak, mean) wholesale price; zero for an empty forecast.
fn wholesale_peak_and_avg(prices: &[HourlyPrice]) -> (f64, f64) {
    if prices.is_empty() {
        return (0.0, 0.0);
    }
    let peak = prices.iter().map(|p| p.price_mwh).fold(f64::MIN, f64::max);
    let avg = prices.iter().map(|p| p.price_mwh).sum::<f64>() / prices.len() as f64;
    (peak, avg)
}

fn household_alert(session_id: &str, grid_region: &str, alert: &DeviceAlert, now: DateTime<Utc>) -> LiveAlert {
    LiveAlert {
        id: Uuid::new_v4().to_string(),
        session_id: session_id.to_string(),
        profile_id: Some(alert.profile_id.clone()),
        grid_region: grid_region.to_string(),
        severity: alert.severity.as_str().to_string(),
        title: alert.title.clone(),
        description: alert.description.clone(),
        alert_type: alert.alert_type(),
        metadata: serde_json::to_value(&alert.metadata).unwrap_or_default(),
        created_at: now,
    }
}

#[derive(Clone)]
pub struct OrchestratorService {
    sessions: Arc<DashMap<String, SimulationSession>>,
    grid: Arc<GridGraph>,
    weather: WeatherService,
    prices: PriceService,
    consumers: ConsumerService,
    notifier: NotificationService,
    dispatch: DispatchService,
}

impl OrchestratorService {
    pub fn new(
        grid: Arc<GridGraph>,
        weather: WeatherService,
        prices: PriceService,
        consumers: ConsumerService,
        notifier: NotificationService,
        dispatch: DispatchService,
    ) -> Self {
        Self {
            sessions: Arc::new(DashMap::new()),
            grid,
            weather,
            prices,
            consumers,
            notifier,
            dispatch,
        }
    }

    fn update(&self, session_id: &str, apply: impl FnOnce(&mut SimulationSession)) {
        if let Some(mut session) = self.sessions.get_mut(session_id) {
            apply(session.value_mut());
        }
    }

    fn open_session(&self, request: &OrchestrateRequest, grid_region: &str, now: DateTime<Utc>) -> String {
        while self.sessions.len() >= MAX_SESSIONS {
            let oldest = self
                .sessions
                .iter()
                .min_by_key(|s| s.started_at)
                .map(|s| s.key().clone());
            match oldest {
                Some(id) => {
                    self.sessions.remove(&id);
                }
                None => break,
            }
        }

        let session_id = Uuid::new_v4().to_string();
        self.sessions.insert(
            session_id.clone(),
            SimulationSession {
                session_id: session_id.clone(),
                scenario: request.scenario.clone(),
                grid_region: grid_region.to_string(),
                forecast_hour: request.forecast_hour,
                status: SessionStatus::Running,
                started_at: now,
                completed_at: None,
                total_failed_nodes: 0,
                cascade_depth: 0,
                total_load_shed_mw: 0.0,
                peak_price_mwh: 0.0,
                avg_price_mwh: 0.0,
                alerts_generated: 0,
                notifications_sent: 0,
                notifications_failed: 0,
                crews_dispatched: 0,
                avg_eta_minutes: 0.0,
                alerts: Vec::new(),
            },
        );
        session_id
    }

    pub async fn run(&self, request: &OrchestrateRequest) -> OrchestrationSummary {
        let now = Utc::now();
        let scenario = Scenario::parse(&request.scenario);
        let scripted = scenario.scripted();
        let grid_region = request.grid_region.to_ascii_uppercase();

        let session_id = self.open_session(request, &grid_region, now);
        info!("Orchestrator: session {} created (scenario={})", session_id, scenario);
        counter!("orchestration_runs_total").increment(1);

        let multipliers = scenario_multipliers(&self.grid, &self.weather, scenario, request.forecast_hour).await;
        let cascade = run_cascade(
            &self.grid,
            CascadeParams {
                multipliers: &multipliers,
                scenario_label: scenario.as_str(),
                forecast_hour: request.forecast_hour,
                zone_temps: None,
            },
        );
        self.update(&session_id, |s| {
            s.status = SessionStatus::CascadeDone;
            s.total_failed_nodes = cascade.total_failed_nodes;
            s.cascade_depth = cascade.cascade_depth;
            s.total_load_shed_mw = cascade.total_load_shed_mw;
        });
        info!(
            "Orchestrator: cascade done, {} failed, {:.0} MW shed",
            cascade.total_failed_nodes, cascade.total_load_shed_mw
        );

        let prices = self.prices.forecast(
            &grid_region,
            PricingMode::Hybrid,
            scripted.as_str(),
            PRICE_HORIZON_HOURS,
            now,
        );
        let (peak, avg) = wholesale_peak_and_avg(&prices);
        self.update(&session_id, |s| {
            s.status = SessionStatus::PricesDone;
            s.peak_price_mwh = round_to(peak, 2);
            s.avg_price_mwh = round_to(avg, 2);
        });
        info!("Orchestrator: prices done, peak ${:.2}/MWh, avg ${:.2}/MWh", peak, avg);

        let temps = self
            .prices
            .temperature_outlook(&grid_region, scripted.as_str(), PRICE_HORIZON_HOURS);
        let household: Vec<DeviceAlert> = self
            .consumers
            .profiles()
            .profiles
            .iter()
            .flat_map(|profile| device_alerts::generate(profile, &temps, &prices, now))
            .collect();

        let mut alerts: Vec<LiveAlert> = household
            .iter()
            .map(|a| household_alert(&session_id, &grid_region, a, now))
            .collect();
        alerts.extend(grid_alerts(&session_id, &grid_region, &cascade, &prices, now));

        let push: Vec<WeatherAlert> = household
            .iter()
            .zip(&alerts)
            .map(|(device, live)| device.to_weather_alert(Some(live.id.clone())))
            .collect();
        let delivery = self.notifier.broadcast(&push).await;
        if delivery.failed > 0 {
            warn!(
                "Orchestrator: {} of {} weather notifications failed",
                delivery.failed,
                push.len()
            );
        }

        let alerts_generated = alerts.len();
        self.update(&session_id, |s| {
            s.status = SessionStatus::AlertsDone;
            s.alerts_generated = alerts_generated;
            s.notifications_sent = delivery.success;
            s.notifications_failed = delivery.failed;
            s.alerts = alerts;
        });
        info!("Orchestrator: {} alerts generated", alerts_generated);

        let (crews_dispatched, avg_eta) = if cascade.total_failed_nodes > 0 {
            self.dispatch.load_cascade(&self.grid, &cascade, scripted).await;
            let recommendation = self.dispatch.recommend().await;
            let confirmed = self.dispatch.dispatch_all().await;
            (confirmed.len(), recommendation.avg_eta_minutes)
        } else {
            (0, 0.0)
        };

        let completed_at = Utc::now();
        self.update(&session_id, |s| {
            s.status = SessionStatus::Completed;
            s.crews_dispatched = crews_dispatched;
            s.avg_eta_minutes = round_to(avg_eta, 1);
            s.completed_at = Some(completed_at);
        });
        info!(
            "Orchestrator: completed, {} crews dispatched, avg ETA {:.1} min",
            crews_dispatched, avg_eta
        );

        OrchestrationSummary {
            session_id: session_id.clone(),
            scenario: request.scenario.clone(),
            grid_region,
            status: SessionStatus::Completed,
            total_failed_nodes: cascade.total_failed_nodes,
            cascade_depth: cascade.cascade_depth,
            total_load_shed_mw: cascade.total_load_shed_mw,
            peak_price_mwh: round_to(peak, 2),
            avg_price_mwh: round_to(avg, 2),
            alerts_generated,
            crews_dispatched,
            avg_eta_minutes: round_to(avg_eta, 1),
        }
    }

    pub fn session(&self, session_id: &str) -> Result<SimulationSession, ApiError> {
        self.sessions
            .get(session_id)
            .map(|s| s.value().clone())
            .ok_or_else(|| ApiError::not_found(&format!("Session {}", session_id)))
    }

    pub fn sessions(&self) -> SessionsResponse {
        let mut sessions: Vec<SimulationSession> = self.sessions.iter().map(|s| s.value().clone()).collect();
        sessions.sort_by(|a, b| b.started_at.cmp(&a.started_at));
        SessionsResponse {
            total: sessions.len(),
            sessions: sessions.iter().map(OrchestrationSummary::from).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use std::collections::BTreeMap;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2021, 2, 15, 12, 0, 0).unwrap()
    }

    fn cascade(failed: usize, shed_mw: f64) -> CascadeResult {
        CascadeResult {
            scenario: "uri".to_string(),
            forecast_hour: 36,
            started_at: now(),
            completed_at: now(),
            steps: Vec::new(),
            total_failed_nodes: failed,
            total_nodes: 100,
            cascade_depth: if failed > 0 { 3 } else { 0 },
            total_load_shed_mw: shed_mw,
            failed_node_ids: Vec::new(),
            final_node_states: BTreeMap::new(),
        }
    }

    fn prices(wholesale: &[f64]) -> Vec<HourlyPrice> {
        wholesale
            .iter()
            .enumerate()
            .map(|(h, &mwh)| HourlyPrice {
                hour: h as u32,
                timestamp: now() + Duration::hours(h as i64),
                price_mwh: mwh,
                consumer_price_kwh: 0.10 + mwh / 10_000.0,
                demand_factor: 1.0,
                wind_gen_factor: 0.1,
                grid_utilization_pct: 70.0,
                zone: "ERCOT".to_string(),
                prediction_mode: PricingMode::Rules,
            })
            .collect()
    }

    fn types(alerts: &[LiveAlert]) -> Vec<&str> {
        alerts.iter().map(|a| a.alert_type.as_str()).collect()
    }

    #[test]
    fn test_storm_raises_every_grid_alert() {
        let alerts = grid_alerts("s-1", "ERCOT", &cascade(12, 1800.0), &prices(&[40.0, 5000.0, 60.0]), now());

        assert_eq!(types(&alerts), vec!["cascade_warning", "price_spike", "device_savings", "load_shed"]);
        assert_eq!(alerts[0].title, "Cascade Alert: 12 nodes failed");
        assert_eq!(alerts[1].severity, "critical");
        assert_eq!(alerts[1].title, "Price Spike: $5000/MWh peak");
        // (0.60 - 0.104) × 30 kWh
        assert_eq!(alerts[2].title, "Shift Loads: Save $14.88 on 30 kWh");
        assert_eq!(alerts[3].metadata["total_load_shed_mw"], 1800.0);
        assert!(alerts.iter().all(|a| a.session_id == "s-1" && a.profile_id.is_none()));
    }

    #[test]
    fn test_moderate_spike_is_a_warning() {
        let alerts = grid_alerts("s-2", "ERCOT", &cascade(0, 0.0), &prices(&[30.0, 250.0]), now());
        assert_eq!(types(&alerts), vec!["price_spike", "device_savings"]);
        assert_eq!(alerts[0].severity, "warning");
    }

    #[test]
    fn test_calm_day_raises_nothing() {
        assert!(grid_alerts("s-3", "ERCOT", &cascade(0, 0.0), &prices(&[25.0, 45.0]), now()).is_empty());
        assert!(grid_alerts("s-3", "ERCOT", &cascade(0, 0.0), &[], now()).is_empty());
    }

    #[test]
    fn test_small_shed_skips_load_shed_alert() {
        let alerts = grid_alerts("s-4", "ERCOT", &cascade(2, 120.0), &prices(&[30.0]), now());
        assert_eq!(types(&alerts), vec!["cascade_warning"]);
        assert!(alerts[0].description.starts_with("120 MW load shed across 3 cascade steps"));
    }

    fn service() -> OrchestratorService {
        use crate::config::{NotificationConfig, WeatherConfig};
        use crate::models::grid::GridData;

        let client = reqwest::Client::new();
        let weather = WeatherService::new(client.clone(), &WeatherConfig::default());
        let prices = PriceService::new(None, weather.clone());
        OrchestratorService::new(
            Arc::new(GridGraph::from_data(GridData { nodes: Vec::new(), edges: Vec::new() })),
            weather,
            prices.clone(),
            ConsumerService::new(prices),
            NotificationService::new(client, &NotificationConfig::default()),
            DispatchService::new(),
        )
    }

    #[test]
    fn test_oldest_session_evicted() {
        let svc = service();
        let request = OrchestrateRequest::default();
        let first = svc.open_session(&request, "ERCOT", now());
        for i in 1..=MAX_SESSIONS {
            svc.open_session(&request, "ERCOT", now() + Duration::minutes(i as i64));
        }

        assert_eq!(svc.sessions().total, MAX_SESSIONS);
        assert!(svc.session(&first).is_err());
    }

    #[test]
    fn test_sessions_listed_newest_first() {
        let svc = service();
        let request = OrchestrateRequest::default();
        let older = svc.open_session(&request, "ERCOT", now());
        let newer = svc.open_session(&request, "ERCOT", now() + Duration::hours(1));

        let listed = svc.sessions();
        assert_eq!(listed.sessions[0].session_id, newer);
        assert_eq!(listed.sessions[1].session_id, older);
        assert_eq!(svc.session(&older).unwrap().status, SessionStatus::Running);
    }
}
