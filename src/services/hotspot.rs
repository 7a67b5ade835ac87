//! City markers and transmission corridors for the operator globe,
//! aggregated from weather-zone loads.

use crate::models::grid::{ArcsResponse, GridArc, GridHotspot, HotspotsResponse, Severity};
use crate::services::demand::DemandMultipliers;
use crate::services::grid::zones::{
    COAST, FAR_WEST, NORTH_CENTRAL, SOUTHERN, SOUTH_CENTRAL, WEST,
};
use crate::services::grid::GridGraph;
use crate::utils::round_to;

struct HotspotCity {
    id: &'static str,
    name: &'static str,
    lat: f64,
    lon: f64,
    weather_zone: &'static str,
}

const HOTSPOT_CITIES: [HotspotCity; 8] = [
    HotspotCity { id: "HS-HOU", name: "Houston", lat: 29.76, lon: -95.37, weather_zone: COAST },
    HotspotCity { id: "HS-DAL", name: "Dallas", lat: 32.78, lon: -96.80, weather_zone: NORTH_CENTRAL },
    HotspotCity { id: "HS-AUS", name: "Austin", lat: 30.27, lon: -97.74, weather_zone: SOUTH_CENTRAL },
    HotspotCity { id: "HS-SAT", name: "San Antonio", lat: 29.42, lon: -98.49, weather_zone: SOUTH_CENTRAL },
    HotspotCity { id: "HS-CRP", name: "Corpus Christi", lat: 27.80, lon: -97.40, weather_zone: SOUTHERN },
    HotspotCity { id: "HS-MID", name: "Midland", lat: 31.99, lon: -102.08, weather_zone: FAR_WEST },
    HotspotCity { id: "HS-LBK", name: "Lubbock", lat: 33.58, lon: -101.85, weather_zone: WEST },
    HotspotCity { id: "HS-ELP", name: "El Paso", lat: 31.76, lon: -106.44, weather_zone: FAR_WEST },
];

/// Transmission corridors between hotspot cities
const ARCS: [(&str, &str); 10] = [
    ("HS-HOU", "HS-DAL"),
    ("HS-HOU", "HS-AUS"),
    ("HS-HOU", "HS-SAT"),
    ("HS-AUS", "HS-SAT"),
    ("HS-AUS", "HS-DAL"),
    ("HS-DAL", "HS-MID"),
    ("HS-MID", "HS-ELP"),
    ("HS-MID", "HS-LBK"),
    ("HS-SAT", "HS-CRP"),
    ("HS-DAL", "HS-LBK"),
];

/// Share of the smaller zone's capacity carried by a corridor
const ARC_CAPACITY_SHARE: f64 = 0.3;
const DEFAULT_ARC_CAPACITY_MW: f64 = 100.0;

/// Aggregated load in one weather zone
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoneLoad {
    pub status: Severity,
    pub load_mw: f64,
    pub capacity_mw: f64,
    pub risk_pct: f64,
}

pub fn zone_load(grid: &GridGraph, multipliers: &DemandMultipliers, zone: &str) -> ZoneLoad {
    let (mut load, mut cap) = (0.0, 0.0);
    for id in grid.nodes_in_weather_zone(zone) {
        if let Some(node) = grid.node(id) {
            load += node.base_load_mw * multipliers.get(id).copied().unwrap_or(1.0);
            cap += node.capacity_mw;
        }
    }

    if cap == 0.0 {
        return ZoneLoad {
            status: Severity::Normal,
            load_mw: 0.0,
            capacity_mw: 0.0,
            risk_pct: 0.0,
        };
    }

    let util = load / cap * 100.0;
    let status = if util >= 95.0 {
        Severity::Critical
    } else if util >= 75.0 {
        Severity::Stressed
    } else {
        Severity::Normal
    };

    ZoneLoad {
        status,
        load_mw: round_to(load, 1),
        capacity_mw: round_to(cap, 1),
        risk_pct: round_to(util.min(100.0), 1),
    }
}

pub fn hotspots(grid: &GridGraph, multipliers: &DemandMultipliers, scenario: &str) -> HotspotsResponse {
    let hotspots = HOTSPOT_CITIES
        .iter()
        .map(|city| {
            let zone = zone_load(grid, multipliers, city.weather_zone);
            GridHotspot {
                id: city.id.to_string(),
                name: city.name.to_string(),
                lat: city.lat,
                lon: city.lon,
                status: zone.status,
                load_mw: zone.load_mw,
                capacity_mw: zone.capacity_mw,
                outage_risk_pct: zone.risk_pct,
            }
        })
        .collect();

    HotspotsResponse {
        hotspots,
        scenario: scenario.to_string(),
    }
}

fn city(id: &str) -> Option<&'static HotspotCity> {
    HOTSPOT_CITIES.iter().find(|c| c.id == id)
}

pub fn arcs(grid: &GridGraph, multipliers: &DemandMultipliers, scenario: &str) -> ArcsResponse {
    let (total_load, total_cap) = grid.nodes().iter().fold((0.0, 0.0), |(l, c), n| {
        (
            l + n.base_load_mw * multipliers.get(&n.id).copied().unwrap_or(1.0),
            c + n.capacity_mw,
        )
    });
    let grid_util = if total_cap > 0.0 {
        total_load / total_cap * 100.0
    } else {
        50.0
    };

    let arcs = ARCS
        .iter()
        .filter_map(|(src, tgt)| Some((city(src)?, city(tgt)?)))
        .map(|(src, tgt)| {
            let src_zone = zone_load(grid, multipliers, src.weather_zone);
            let tgt_zone = zone_load(grid, multipliers, tgt.weather_zone);

            let mut capacity = src_zone.capacity_mw.min(tgt_zone.capacity_mw) * ARC_CAPACITY_SHARE;
            if capacity == 0.0 {
                capacity = DEFAULT_ARC_CAPACITY_MW;
            }
            let flow = capacity * grid_util / 100.0;
            let utilization = round_to((flow / capacity * 100.0).min(100.0), 1);

            let status = if utilization >= 90.0 {
                Severity::Critical
            } else if utilization >= 70.0 {
                Severity::Stressed
            } else {
                Severity::Normal
            };

            GridArc {
                source: src.id.to_string(),
                target: tgt.id.to_string(),
                source_coords: [src.lat, src.lon],
                target_coords: [tgt.lat, tgt.lon],
                flow_mw: round_to(flow, 1),
                capacity_mw: round_to(capacity, 1),
                utilization_pct: utilization,
                status,
            }
        })
        .collect();

    ArcsResponse {
        arcs,
        scenario: scenario.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::grid::GridData;
    use crate::services::grid::test_support::node;

    fn grid() -> GridGraph {
        GridGraph::from_data(GridData {
            nodes: vec![
                // Coast
                node("B1", 29.76, -95.37, 96.0, 100.0, 345.0),
                // North Central
                node("B2", 32.78, -96.80, 40.0, 100.0, 345.0),
                node("B3", 32.70, -96.90, 40.0, 100.0, 138.0),
                // South Central
                node("B4", 30.27, -97.74, 80.0, 100.0, 138.0),
            ],
            edges: vec![],
        })
    }

    #[test]
    fn test_zone_status_thresholds() {
        let g = grid();
        let m = DemandMultipliers::new();
        assert_eq!(zone_load(&g, &m, COAST).status, Severity::Critical);
        assert_eq!(zone_load(&g, &m, SOUTH_CENTRAL).status, Severity::Stressed);

        let nc = zone_load(&g, &m, NORTH_CENTRAL);
        assert_eq!(nc.status, Severity::Normal);
        assert_eq!(nc.load_mw, 80.0);
        assert_eq!(nc.capacity_mw, 200.0);
        assert_eq!(nc.risk_pct, 40.0);

        let empty = zone_load(&g, &m, FAR_WEST);
        assert_eq!(empty.capacity_mw, 0.0);
        assert_eq!(empty.status, Severity::Normal);
    }

    #[test]
    fn test_risk_is_capped() {
        let g = grid();
        let mut m = DemandMultipliers::new();
        m.insert("B1".to_string(), 2.0);
        assert_eq!(zone_load(&g, &m, COAST).risk_pct, 100.0);
    }

    #[test]
    fn test_hotspots_cover_all_cities() {
        let response = hotspots(&grid(), &DemandMultipliers::new(), "uri");
        assert_eq!(response.hotspots.len(), 8);
        let sat = response.hotspots.iter().find(|h| h.id == "HS-SAT").unwrap();
        assert_eq!(sat.status, Severity::Stressed);
        let elp = response.hotspots.iter().find(|h| h.id == "HS-ELP").unwrap();
        assert_eq!(elp.outage_risk_pct, 0.0);
    }

    #[test]
    fn test_arcs() {
        let response = arcs(&grid(), &DemandMultipliers::new(), "uri");
        assert_eq!(response.arcs.len(), 10);

        // Grid utilisation 256 / 400 = 64%
        let hou_dal = &response.arcs[0];
        assert_eq!(hou_dal.source_coords, [29.76, -95.37]);
        assert_eq!(hou_dal.capacity_mw, 30.0);
        assert_eq!(hou_dal.flow_mw, 19.2);
        assert_eq!(hou_dal.utilization_pct, 64.0);
        assert_eq!(hou_dal.status, Severity::Normal);

        // Midland has no buses in this grid: default corridor capacity
        let mid_elp = response.arcs.iter().find(|a| a.source == "HS-MID" && a.target == "HS-ELP").unwrap();
        assert_eq!(mid_elp.capacity_mw, 100.0);
    }
}
