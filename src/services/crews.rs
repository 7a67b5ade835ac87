//! Repair crew rosters per scenario.

use crate::models::scenario::Scenario;
use crate::models::utility::{Crew, CrewOptimizationResponse, CrewStatus};
use crate::utils::round_to;

struct CrewSeed {
    id: &'static str,
    name: &'static str,
    status: CrewStatus,
    lat: f64,
    lon: f64,
    city: &'static str,
    specialty: &'static str,
    region: Option<&'static str>,
    eta: Option<u32>,
}

const URI_ROSTER: [CrewSeed; 7] = [
    CrewSeed { id: "CREW-TX-14", name: "Houston Line Alpha", status: CrewStatus::Deployed, lat: 29.76, lon: -95.37, city: "Houston", specialty: "line_repair", region: Some("HOU"), eta: Some(0) },
    CrewSeed { id: "CREW-TX-22", name: "Dallas Substation Bravo", status: CrewStatus::Deployed, lat: 32.78, lon: -96.80, city: "Dallas", specialty: "substation", region: Some("DAL"), eta: Some(0) },
    CrewSeed { id: "CREW-TX-08", name: "Austin Distribution Charlie", status: CrewStatus::EnRoute, lat: 30.27, lon: -97.74, city: "Austin", specialty: "distribution", region: Some("AUS"), eta: Some(45) },
    CrewSeed { id: "CREW-TX-31", name: "San Antonio Gen Delta", status: CrewStatus::Deployed, lat: 29.42, lon: -98.49, city: "San Antonio", specialty: "generation", region: Some("SAT"), eta: Some(0) },
    CrewSeed { id: "CREW-NY-05", name: "New York Mutual Aid Echo", status: CrewStatus::EnRoute, lat: 32.00, lon: -97.00, city: "New York (Mutual Aid)", specialty: "line_repair", region: Some("DAL"), eta: Some(180) },
    CrewSeed { id: "CREW-TX-17", name: "Midland Gen Foxtrot", status: CrewStatus::Standby, lat: 31.99, lon: -102.08, city: "Midland", specialty: "generation", region: Some("WTX"), eta: None },
    CrewSeed { id: "CREW-TX-42", name: "Corpus Christi Dist Golf", status: CrewStatus::Standby, lat: 27.80, lon: -97.40, city: "Corpus Christi", specialty: "distribution", region: None, eta: None },
];

/// Crews on a normal day: the first three, all on standby
const NORMAL_ROSTER_SIZE: usize = 3;

fn to_crew(seed: &CrewSeed) -> Crew {
    Crew {
        crew_id: seed.id.to_string(),
        name: seed.name.to_string(),
        status: seed.status,
        lat: seed.lat,
        lon: seed.lon,
        city: seed.city.to_string(),
        specialty: seed.specialty.to_string(),
        assigned_region: seed.region.map(str::to_string),
        eta_minutes: seed.eta,
    }
}

pub fn roster(scenario: Scenario) -> Vec<Crew> {
    if scenario.is_uri() {
        URI_ROSTER.iter().map(to_crew).collect()
    } else {
        URI_ROSTER[..NORMAL_ROSTER_SIZE]
            .iter()
            .map(|seed| Crew {
                status: CrewStatus::Standby,
                assigned_region: None,
                eta_minutes: None,
                ..to_crew(seed)
            })
            .collect()
    }
}

pub fn crews(scenario: Scenario) -> CrewOptimizationResponse {
    let crews = roster(scenario);
    let deployed = crews
        .iter()
        .filter(|c| matches!(c.status, CrewStatus::Deployed | CrewStatus::EnRoute))
        .count();
    let coverage_pct = if crews.is_empty() {
        0.0
    } else {
        round_to(deployed as f64 / crews.len() as f64, 2)
    };

    CrewOptimizationResponse {
        crews,
        total_deployed: deployed,
        coverage_pct,
    }
}
