//! Crew dispatch: greedy assignment of repair crews to failed nodes and a
//! wall-clock state machine that moves each assignment through
//! `EN_ROUTE → ON_SITE → REPAIRING → COMPLETE`.
//!
//! State lives behind a single async `RwLock`; every mutating operation holds
//! the write lock for its full duration, so a recommendation and the
//! dispatches that follow from it never interleave with another request.

use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use metrics::counter;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::constants::dispatch::*;
use crate::error::{ApiError, ErrorCode, Result};
use crate::models::dispatch::{
    DispatchAssignment, DispatchInitResponse, DispatchRecommendation, DispatchStatusResponse,
    FailedNode, FailureType, SpecialtyMatch,
};
use crate::models::scenario::Scenario;
use crate::models::simulate::CascadeResult;
use crate::models::utility::{Crew, CrewStatus};
use crate::services::cascade::{run_cascade, CascadeParams};
use crate::services::crews;
use crate::services::demand::DemandMultipliers;
use crate::services::grid::GridGraph;
use crate::utils::{haversine_km, round_to};

const SPECIALTY_LINE_REPAIR: &str = "line_repair";
const SPECIALTY_SUBSTATION: &str = "substation";
const SPECIALTY_DISTRIBUTION: &str = "distribution";
const SPECIALTY_GENERATION: &str = "generation";

/// Load (MW) that earns a severity weight of 1
const SEVERITY_UNIT_MW: f64 = 500.0;

/// Failure type and the specialty best suited to repair it.
pub fn classify_failure(voltage_kv: f64, has_generator: bool) -> (FailureType, &'static str) {
    if has_generator {
        (FailureType::Generation, SPECIALTY_GENERATION)
    } else if voltage_kv >= TRANSMISSION_KV {
        (FailureType::Transmission, SPECIALTY_LINE_REPAIR)
    } else if voltage_kv >= SUBSTATION_KV {
        (FailureType::Substation, SPECIALTY_SUBSTATION)
    } else {
        (FailureType::Distribution, SPECIALTY_DISTRIBUTION)
    }
}

fn adjacent_skills(specialty: &str) -> &'static [&'static str] {
    match specialty {
        SPECIALTY_LINE_REPAIR => &[SPECIALTY_SUBSTATION],
        SPECIALTY_SUBSTATION => &[SPECIALTY_LINE_REPAIR, SPECIALTY_DISTRIBUTION],
        SPECIALTY_DISTRIBUTION => &[SPECIALTY_SUBSTATION],
        _ => &[],
    }
}

pub fn specialty_match(crew_specialty: &str, ideal: &str) -> (f64, SpecialtyMatch) {
    if crew_specialty == ideal {
        (EXACT_MATCH_SCORE, SpecialtyMatch::Exact)
    } else if adjacent_skills(crew_specialty).contains(&ideal) {
        (PARTIAL_MATCH_SCORE, SpecialtyMatch::Partial)
    } else {
        (MISMATCH_SCORE, SpecialtyMatch::Mismatch)
    }
}

/// Drive time in whole minutes, never less than one.
pub fn eta_minutes(distance_km: f64, storm: bool) -> u32 {
    let speed = DRIVE_SPEED_KMH * if storm { STORM_SPEED_FACTOR } else { 1.0 };
    (distance_km / speed * 60.0).round().max(1.0) as u32
}

fn ideal_specialty(node: &FailedNode) -> &'static str {
    classify_failure(node.voltage_kv, node.failure_type == FailureType::Generation).1
}

/// Failed nodes from a cascade, in failure order without duplicates.
pub fn failed_nodes_from_cascade(grid: &GridGraph, result: &CascadeResult) -> Vec<FailedNode> {
    let mut seen = HashSet::new();
    let mut nodes = Vec::new();

    for step in &result.steps {
        for failure in &step.new_failures {
            if !seen.insert(failure.id.clone()) {
                continue;
            }
            let (voltage_kv, has_generator, weather_zone) = match grid.node(&failure.id) {
                Some(n) => (
                    n.voltage_kv,
                    n.capacity_mw > n.base_load_mw * 2.0 && n.capacity_mw > GENERATOR_MIN_MW,
                    n.weather_zone.clone(),
                ),
                None => (0.0, false, String::new()),
            };
            nodes.push(FailedNode {
                id: failure.id.clone(),
                lat: failure.lat,
                lon: failure.lon,
                load_mw: failure.load_mw,
                capacity_mw: failure.capacity_mw,
                voltage_kv,
                weather_zone,
                failure_type: classify_failure(voltage_kv, has_generator).0,
            });
        }
    }
    nodes
}

/// Mutable dispatch state. All timing is driven by the `now` passed in.
#[derive(Debug, Default)]
pub struct DispatchState {
    assignments: Vec<DispatchAssignment>,
    crews: Vec<Crew>,
    failed_nodes: Vec<FailedNode>,
    repaired: BTreeSet<String>,
    next_id: u32,
    storm: bool,
}

impl DispatchState {
    pub fn new(storm: bool) -> Self {
        Self {
            storm,
            ..Self::default()
        }
    }

    /// Load a roster; every crew starts on standby.
    pub fn load_crews(&mut self, roster: Vec<Crew>) {
        self.crews = roster
            .into_iter()
            .map(|c| Crew {
                status: CrewStatus::Standby,
                assigned_region: None,
                eta_minutes: None,
                ..c
            })
            .collect();
    }

    pub fn load_failed_nodes(&mut self, nodes: Vec<FailedNode>) {
        self.failed_nodes = nodes;
    }

    fn next_assignment_id(&mut self) -> String {
        self.next_id += 1;
        format!("DISP-{:04}", self.next_id)
    }

    fn unassigned_failed_nodes(&self) -> Vec<FailedNode> {
        let targeted: HashSet<&str> = self
            .assignments
            .iter()
            .filter(|a| a.status != CrewStatus::Complete)
            .map(|a| a.target_node_id.as_str())
            .collect();

        self.failed_nodes
            .iter()
            .filter(|n| !targeted.contains(n.id.as_str()) && !self.repaired.contains(&n.id))
            .cloned()
            .collect()
    }

    /// Greedy assignment: heaviest failures first, each taking the best
    /// scoring crew still free. Nothing is dispatched.
    pub fn recommend(&mut self) -> DispatchRecommendation {
        let available: Vec<Crew> = self
            .crews
            .iter()
            .filter(|c| c.status.is_available())
            .cloned()
            .collect();
        let mut unassigned = self.unassigned_failed_nodes();
        unassigned.sort_by(|a, b| b.load_mw.total_cmp(&a.load_mw));

        let mut used: HashSet<&str> = HashSet::new();
        let mut assignments = Vec::new();
        let mut leftover = Vec::new();

        for node in &unassigned {
            let ideal = ideal_specialty(node);
            let severity = (node.load_mw / SEVERITY_UNIT_MW).clamp(0.5, 5.0);

            let mut best: Option<(&Crew, f64, f64, SpecialtyMatch)> = None;
            for crew in available.iter().filter(|c| !used.contains(c.crew_id.as_str())) {
                let dist = haversine_km(crew.lat, crew.lon, node.lat, node.lon);
                let (mult, label) = specialty_match(&crew.specialty, ideal);
                let score = mult * severity / (dist + 1.0) * 1000.0;
                if best.map_or(true, |(_, best_score, _, _)| score > best_score) {
                    best = Some((crew, score, dist, label));
                }
            }

            match best {
                Some((crew, score, dist, label)) => {
                    used.insert(crew.crew_id.as_str());
                    assignments.push(DispatchAssignment {
                        assignment_id: self.next_assignment_id(),
                        crew_id: crew.crew_id.clone(),
                        crew_name: crew.name.clone(),
                        target_node_id: node.id.clone(),
                        target_lat: node.lat,
                        target_lon: node.lon,
                        distance_km: round_to(dist, 1),
                        eta_minutes: eta_minutes(dist, self.storm),
                        specialty_match: label,
                        match_score: round_to(score, 2),
                        failure_type: node.failure_type,
                        status: CrewStatus::Dispatched,
                        repair_minutes: node.failure_type.repair_minutes(),
                        dispatched_at: None,
                        arrived_at: None,
                        completed_at: None,
                        origin: (crew.lat, crew.lon),
                    });
                }
                None => leftover.push(node.clone()),
            }
        }

        let avg_eta = if assignments.is_empty() {
            0.0
        } else {
            assignments.iter().map(|a| a.eta_minutes as f64).sum::<f64>() / assignments.len() as f64
        };

        debug!(
            "Dispatch recommendation: {} assignments, {} unassigned nodes",
            assignments.len(),
            leftover.len()
        );

        DispatchRecommendation {
            total_crews_available: available.len(),
            total_failed_nodes: unassigned.len(),
            avg_eta_minutes: round_to(avg_eta, 1),
            coverage_pct: round_to(assignments.len() as f64 / unassigned.len().max(1) as f64, 2),
            assignments,
            unassigned_nodes: leftover,
        }
    }

    /// Send a crew to a failed node.
    pub fn dispatch(&mut self, crew_id: &str, node_id: &str, now: DateTime<Utc>) -> Result<DispatchAssignment> {
        let storm = self.storm;
        let crew_idx = self
            .crews
            .iter()
            .position(|c| c.crew_id == crew_id)
            .ok_or_else(|| ApiError::with_code(ErrorCode::UnknownCrew, format!("Unknown crew: {}", crew_id)))?;

        let status = self.crews[crew_idx].status;
        if !(status.is_available() || status == CrewStatus::Deployed) {
            return Err(ApiError::with_code(
                ErrorCode::CrewUnavailable,
                format!("Crew {} is not available (status={:?})", crew_id, status),
            ));
        }

        let node = self
            .failed_nodes
            .iter()
            .find(|n| n.id == node_id)
            .cloned()
            .ok_or_else(|| {
                ApiError::with_code(
                    ErrorCode::NodeNotFailed,
                    format!("Unknown or non-failed node: {}", node_id),
                )
            })?;

        let assignment_id = self.next_assignment_id();
        let crew = &mut self.crews[crew_idx];
        let dist = haversine_km(crew.lat, crew.lon, node.lat, node.lon);
        let minutes = eta_minutes(dist, storm);
        let (mult, label) = specialty_match(&crew.specialty, ideal_specialty(&node));

        let assignment = DispatchAssignment {
            assignment_id,
            crew_id: crew.crew_id.clone(),
            crew_name: crew.name.clone(),
            target_node_id: node.id.clone(),
            target_lat: node.lat,
            target_lon: node.lon,
            distance_km: round_to(dist, 1),
            eta_minutes: minutes,
            specialty_match: label,
            match_score: round_to(mult, 2),
            failure_type: node.failure_type,
            status: CrewStatus::EnRoute,
            repair_minutes: node.failure_type.repair_minutes(),
            dispatched_at: Some(now),
            arrived_at: None,
            completed_at: None,
            origin: (crew.lat, crew.lon),
        };

        crew.status = CrewStatus::EnRoute;
        crew.assigned_region = Some(node.id.clone());
        crew.eta_minutes = Some(minutes);

        counter!("crew_dispatches_total").increment(1);
        info!(
            "🚚 Dispatched {} to {} ({:.1} km, ETA {} min)",
            crew_id, node_id, dist, minutes
        );

        self.assignments.push(assignment.clone());
        Ok(assignment)
    }

    /// Recommend, then dispatch every recommendation that is still valid.
    pub fn dispatch_all(&mut self, now: DateTime<Utc>) -> Vec<DispatchAssignment> {
        let recommendation = self.recommend();
        recommendation
            .assignments
            .iter()
            .filter_map(|rec| match self.dispatch(&rec.crew_id, &rec.target_node_id, now) {
                Ok(a) => Some(a),
                Err(e) => {
                    warn!("Skipping recommended dispatch {}: {}", rec.assignment_id, e);
                    None
                }
            })
            .collect()
    }

    /// Advance every assignment to `now`.
    pub fn tick(&mut self, now: DateTime<Utc>) -> DispatchStatusResponse {
        for a in &mut self.assignments {
            let Some(crew) = self.crews.iter_mut().find(|c| c.crew_id == a.crew_id) else {
                continue;
            };

            match a.status {
                CrewStatus::Dispatched | CrewStatus::EnRoute => {
                    let Some(dispatched_at) = a.dispatched_at else {
                        continue;
                    };
                    let elapsed = (now - dispatched_at).num_milliseconds() as f64 / 60_000.0;
                    let remaining = (a.eta_minutes as i64 - elapsed.floor() as i64).max(0) as u32;
                    crew.eta_minutes = Some(remaining);

                    if remaining == 0 {
                        a.status = CrewStatus::OnSite;
                        a.arrived_at = Some(now);
                        crew.status = CrewStatus::OnSite;
                        crew.lat = a.target_lat;
                        crew.lon = a.target_lon;
                    } else {
                        let progress = (elapsed / a.eta_minutes.max(1) as f64).clamp(0.0, 1.0);
                        let (origin_lat, origin_lon) = a.origin;
                        crew.lat = round_to(origin_lat + (a.target_lat - origin_lat) * progress, 4);
                        crew.lon = round_to(origin_lon + (a.target_lon - origin_lon) * progress, 4);
                    }
                }
                CrewStatus::OnSite => {
                    a.status = CrewStatus::Repairing;
                    crew.status = CrewStatus::Repairing;
                }
                CrewStatus::Repairing => {
                    let Some(arrived_at) = a.arrived_at else {
                        continue;
                    };
                    let repair_elapsed = (now - arrived_at).num_milliseconds() as f64 / 60_000.0;
                    if repair_elapsed >= a.repair_minutes as f64 {
                        a.status = CrewStatus::Complete;
                        a.completed_at = Some(now);
                        crew.status = CrewStatus::Complete;
                        self.repaired.insert(a.target_node_id.clone());
                        info!("✅ {} repaired {}", a.crew_id, a.target_node_id);
                    }
                }
                _ => {}
            }
        }

        self.status()
    }

    pub fn status(&self) -> DispatchStatusResponse {
        let count = |pred: fn(CrewStatus) -> bool| self.assignments.iter().filter(|a| pred(a.status)).count();

        DispatchStatusResponse {
            assignments: self.assignments.clone(),
            crews: self.crews.clone(),
            repaired_nodes: self.repaired.iter().cloned().collect(),
            total_dispatched: count(|s| matches!(s, CrewStatus::Dispatched | CrewStatus::EnRoute)),
            total_repairing: count(|s| s == CrewStatus::Repairing),
            total_complete: count(|s| s == CrewStatus::Complete),
        }
    }
}

/// Shared handle to the dispatch state.
#[derive(Debug, Clone, Default)]
pub struct DispatchService {
    state: Arc<RwLock<DispatchState>>,
}

impl DispatchService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset all state, load the roster and the failed nodes of a fresh
    /// cascade at `multipliers`.
    pub async fn init(
        &self,
        grid: &GridGraph,
        multipliers: &DemandMultipliers,
        scenario: Scenario,
    ) -> DispatchInitResponse {
        let result = run_cascade(
            grid,
            CascadeParams {
                multipliers,
                scenario_label: scenario.as_str(),
                forecast_hour: crate::constants::forecast::DEFAULT_FORECAST_HOUR,
                zone_temps: None,
            },
        );
        self.load_cascade(grid, &result, scenario).await
    }

    /// Reset all state, load the roster and the failed nodes of `result`.
    pub async fn load_cascade(
        &self,
        grid: &GridGraph,
        result: &CascadeResult,
        scenario: Scenario,
    ) -> DispatchInitResponse {
        let mut state = self.state.write().await;
        *state = DispatchState::new(scenario.is_uri());

        let roster = crews::roster(scenario);
        let crews_loaded = roster.len();
        state.load_crews(roster);

        let failed = failed_nodes_from_cascade(grid, result);
        let failed_count = failed.len();
        state.load_failed_nodes(failed);

        info!(
            "Dispatch initialised for {}: {} crews, {} failed nodes",
            scenario, crews_loaded, failed_count
        );

        DispatchInitResponse {
            status: "initialized".to_string(),
            crews_loaded,
            failed_nodes: failed_count,
            cascade_depth: result.cascade_depth,
            total_load_shed_mw: result.total_load_shed_mw,
        }
    }

    pub async fn recommend(&self) -> DispatchRecommendation {
        self.state.write().await.recommend()
    }

    pub async fn dispatch(&self, crew_id: &str, node_id: &str) -> Result<DispatchAssignment> {
        self.state.write().await.dispatch(crew_id, node_id, Utc::now())
    }

    pub async fn dispatch_all(&self) -> Vec<DispatchAssignment> {
        self.state.write().await.dispatch_all(Utc::now())
    }

    pub async fn tick(&self) -> DispatchStatusResponse {
        self.state.write().await.tick(Utc::now())
    }

    pub async fn status(&self) -> DispatchStatusResponse {
        self.state.read().await.status()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn crew(id: &str, specialty: &str, lat: f64, lon: f64) -> Crew {
        Crew {
            crew_id: id.to_string(),
            name: format!("{} crew", id),
            status: CrewStatus::Deployed,
            lat,
            lon,
            city: "Test".to_string(),
            specialty: specialty.to_string(),
            assigned_region: Some("HOU".to_string()),
            eta_minutes: Some(0),
        }
    }

    fn failed(id: &str, lat: f64, lon: f64, load: f64, kv: f64) -> FailedNode {
        FailedNode {
            id: id.to_string(),
            lat,
            lon,
            load_mw: load,
            capacity_mw: load / 1.2,
            voltage_kv: kv,
            weather_zone: "Coast".to_string(),
            failure_type: classify_failure(kv, false).0,
        }
    }

    fn state() -> DispatchState {
        let mut s = DispatchState::new(true);
        s.load_crews(vec![
            crew("C1", "line_repair", 29.76, -95.37),
            crew("C2", "distribution", 30.27, -97.74),
        ]);
        s.load_failed_nodes(vec![
            failed("B1", 29.80, -95.40, 300.0, 345.0),
            failed("B2", 30.30, -97.70, 900.0, 13.8),
            failed("B3", 32.78, -96.80, 100.0, 138.0),
        ]);
        s
    }

    #[test]
    fn test_classify_failure() {
        assert_eq!(classify_failure(345.0, false).0, FailureType::Transmission);
        assert_eq!(classify_failure(200.0, false).1, "line_repair");
        assert_eq!(classify_failure(69.0, false).0, FailureType::Substation);
        assert_eq!(classify_failure(13.8, false).0, FailureType::Distribution);
        assert_eq!(classify_failure(13.8, true).0, FailureType::Generation);
    }

    #[test]
    fn test_specialty_match() {
        assert_eq!(specialty_match("substation", "substation"), (2.0, SpecialtyMatch::Exact));
        assert_eq!(specialty_match("substation", "distribution"), (1.0, SpecialtyMatch::Partial));
        assert_eq!(specialty_match("line_repair", "distribution"), (0.3, SpecialtyMatch::Mismatch));
        assert_eq!(specialty_match("generation", "substation").1, SpecialtyMatch::Mismatch);
    }

    #[test]
    fn test_eta() {
        // 80 km at 80 km/h is an hour; storms slow trucks down
        assert_eq!(eta_minutes(80.0, false), 60);
        assert_eq!(eta_minutes(80.0, true), 92);
        assert_eq!(eta_minutes(0.0, true), 1);
    }

    #[test]
    fn test_load_crews_resets_to_standby() {
        let s = state();
        assert!(s.crews.iter().all(|c| c.status == CrewStatus::Standby));
        assert!(s.crews.iter().all(|c| c.assigned_region.is_none() && c.eta_minutes.is_none()));
    }

    #[test]
    fn test_recommend_heaviest_first() {
        let mut s = state();
        let rec = s.recommend();

        assert_eq!(rec.total_crews_available, 2);
        assert_eq!(rec.total_failed_nodes, 3);
        assert_eq!(rec.assignments.len(), 2);
        // B2 (900 MW) first: the nearby distribution crew is an exact match
        assert_eq!(rec.assignments[0].target_node_id, "B2");
        assert_eq!(rec.assignments[0].crew_id, "C2");
        assert_eq!(rec.assignments[0].assignment_id, "DISP-0001");
        assert_eq!(rec.assignments[1].target_node_id, "B1");
        assert_eq!(rec.assignments[1].crew_id, "C1");
        assert_eq!(rec.unassigned_nodes.len(), 1);
        assert_eq!(rec.unassigned_nodes[0].id, "B3");
        assert_eq!(rec.coverage_pct, 0.67);
        assert!(rec.assignments.iter().all(|a| a.status == CrewStatus::Dispatched));
        // Recommending does not dispatch
        assert!(s.assignments.is_empty());
    }

    #[test]
    fn test_dispatch_errors() {
        let mut s = state();
        let now = Utc::now();

        let err = tokio_test::assert_err!(s.dispatch("NOPE", "B1", now));
        assert_eq!(err.error_code(), ErrorCode::UnknownCrew);
        assert_eq!(err.status_code(), axum::http::StatusCode::BAD_REQUEST);

        let err = s.dispatch("C1", "B404", now).unwrap_err();
        assert_eq!(err.error_code(), ErrorCode::NodeNotFailed);

        tokio_test::assert_ok!(s.dispatch("C1", "B1", now));
        let err = s.dispatch("C1", "B3", now).unwrap_err();
        assert_eq!(err.error_code(), ErrorCode::CrewUnavailable);
        assert_eq!(err.status_code(), axum::http::StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_dispatch_all_then_nothing_left() {
        let mut s = state();
        let confirmed = s.dispatch_all(Utc::now());
        assert_eq!(confirmed.len(), 2);
        assert!(confirmed.iter().all(|a| a.status == CrewStatus::EnRoute));
        // Recommendations consumed ids 1-2, dispatches 3-4
        assert_eq!(confirmed[0].assignment_id, "DISP-0003");

        let rec = s.recommend();
        assert!(rec.assignments.is_empty());
        assert_eq!(rec.total_crews_available, 0);
        assert_eq!(rec.total_failed_nodes, 1);
    }

    #[test]
    fn test_state_machine_progression() {
        let mut s = state();
        let t0 = Utc::now();
        let a = s.dispatch("C1", "B1", t0).unwrap();
        assert_eq!(s.status().total_dispatched, 1);

        // Halfway: crew is between origin and target
        let half = t0 + Duration::seconds(a.eta_minutes as i64 * 30);
        s.tick(half);
        let c1 = s.crews.iter().find(|c| c.crew_id == "C1").unwrap();
        assert!(c1.lat > 29.76 && c1.lat < 29.80);
        assert_eq!(s.assignments[0].status, CrewStatus::EnRoute);

        // Arrival
        let arrival = t0 + Duration::minutes(a.eta_minutes as i64);
        s.tick(arrival);
        assert_eq!(s.assignments[0].status, CrewStatus::OnSite);
        let c1 = s.crews.iter().find(|c| c.crew_id == "C1").unwrap();
        assert_eq!((c1.lat, c1.lon), (29.80, -95.40));

        // Next tick starts the repair
        let status = s.tick(arrival + Duration::seconds(5));
        assert_eq!(status.total_repairing, 1);

        // Transmission repairs take three hours after arrival
        s.tick(arrival + Duration::minutes(179));
        assert_eq!(s.assignments[0].status, CrewStatus::Repairing);
        let status = s.tick(arrival + Duration::minutes(180));
        assert_eq!(status.total_complete, 1);
        assert_eq!(status.repaired_nodes, vec!["B1"]);
        assert_eq!(s.crews[0].status, CrewStatus::Complete);

        // A completed crew is available again; repaired nodes are not offered
        let rec = s.recommend();
        assert_eq!(rec.total_crews_available, 2);
        assert!(rec.assignments.iter().all(|a| a.target_node_id != "B1"));
    }

    #[tokio::test]
    async fn test_service_init_from_cascade() {
        use crate::models::grid::GridData;
        use crate::services::grid::test_support::{edge, node};

        let grid = GridGraph::from_data(GridData {
            nodes: vec![
                node("B1", 29.76, -95.37, 150.0, 100.0, 345.0),
                node("B2", 29.80, -95.40, 60.0, 100.0, 138.0),
                node("B3", 30.27, -97.74, 10.0, 400.0, 13.8),
            ],
            edges: vec![edge("B1", "B2"), edge("B2", "B3")],
        });

        let service = DispatchService::new();
        let init = service.init(&grid, &DemandMultipliers::new(), Scenario::Uri).await;
        assert_eq!(init.crews_loaded, 7);
        // B1 fails and pushes 105 MW onto B2, which fails next
        assert_eq!(init.failed_nodes, 2);
        assert_eq!(init.cascade_depth, 2);

        let status = service.status().await;
        assert_eq!(status.crews.len(), 7);
        assert!(status.assignments.is_empty());

        let confirmed = service.dispatch_all().await;
        assert_eq!(confirmed.len(), 2);
        assert_eq!(service.status().await.total_dispatched, 2);
    }
}
