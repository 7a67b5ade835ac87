//! Builds node and edge lists from the raw ACTIVSg2000 and Travis150 files.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::fs;
use std::path::Path;

use tracing::{info, warn};

use super::matpower::{self, column, MatpowerCase};
use super::powerworld::{parse_blocks, require_block};
use super::zones::{classify_weather_zone, SOUTH_CENTRAL};
use super::GridDataError;
use crate::config::GridDataConfig;
use crate::constants::api::GRID_REGION;
use crate::models::grid::{GridData, GridEdge, GridNode};
use crate::utils::{planar_distance, round_to};

pub const SOURCE_ACTIVSG: &str = "activsg2000";
pub const SOURCE_TRAVIS: &str = "travis150";

/// Default MVA rating for lines with no rating
const DEFAULT_LINE_MVA: f64 = 100.0;
/// Fallback capacity headroom for buses without generation
const LOAD_ONLY_HEADROOM: f64 = 1.3;

const TIE_LINE_COUNT: usize = 3;
const TIE_LINE_MIN_KV: f64 = 200.0;
const TIE_LINE_MVA: f64 = 500.0;
const TIE_LINE_IMPEDANCE: f64 = 0.001;

/// Read a source file, replacing invalid UTF-8.
pub fn read_source(path: &Path) -> Result<String, GridDataError> {
    let bytes = fs::read(path).map_err(|source| GridDataError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Build the merged grid from the configured files.
///
/// The Travis150 overlay is optional; without it only ACTIVSg2000 is used.
pub fn build_merged(config: &GridDataConfig) -> Result<GridData, GridDataError> {
    info!("Parsing ACTIVSg2000 case: {}", config.activsg_case_file.display());
    let case_text = read_source(&config.activsg_case_file)?;
    let aux_text = read_source(&config.activsg_aux_file)?;
    let activsg = build_activsg(&case_text, &aux_text)?;

    if !config.travis150_aux_file.exists() {
        warn!(
            "Travis150 AUX not found at {}, using ACTIVSg2000 only",
            config.travis150_aux_file.display()
        );
        return Ok(activsg);
    }

    let travis_text = read_source(&config.travis150_aux_file)?;
    let travis = build_travis150(&travis_text)?;
    Ok(merge(activsg, travis))
}

/// Concatenate both datasets and add the tie lines between them.
pub fn merge(activsg: GridData, travis: GridData) -> GridData {
    let ties = create_tie_lines(&activsg.nodes, &travis.nodes);

    info!(
        "Merged grid: {} nodes ({} ACTIVSg + {} Travis), {} edges ({} + {} + {} ties)",
        activsg.nodes.len() + travis.nodes.len(),
        activsg.nodes.len(),
        travis.nodes.len(),
        activsg.edges.len() + travis.edges.len() + ties.len(),
        activsg.edges.len(),
        travis.edges.len(),
        ties.len()
    );

    let mut nodes = activsg.nodes;
    nodes.extend(travis.nodes);
    let mut edges = activsg.edges;
    edges.extend(travis.edges);
    edges.extend(ties);
    GridData { nodes, edges }
}

struct BusLocation {
    lat: f64,
    lon: f64,
    grid_zone: i32,
    substation: u32,
}

fn activsg_locations(aux_text: &str) -> Result<HashMap<u32, BusLocation>, GridDataError> {
    let block = require_block(aux_text, "Bus", "ACTIVSg2000 AUX")?;

    let locations = block
        .records()
        .filter_map(|r| {
            Some((
                r.get::<u32>("BusNum")?,
                BusLocation {
                    lat: r.get("Latitude:1")?,
                    lon: r.get("Longitude:1")?,
                    grid_zone: r.get("ZoneNum")?,
                    substation: r.get("SubNum")?,
                },
            ))
        })
        .collect();

    Ok(locations)
}

/// Build ACTIVSg2000 nodes and edges from the MATPOWER case and AUX text.
pub fn build_activsg(case_text: &str, aux_text: &str) -> Result<GridData, GridDataError> {
    let case = MatpowerCase::parse(case_text)?;
    info!(
        "MATPOWER: {} buses, {} generators, {} branches",
        case.bus.len(),
        case.gen.len(),
        case.branch.len()
    );

    let locations = activsg_locations(aux_text)?;
    info!("AUX: {} bus entries with lat/lon", locations.len());

    let mut gen_capacity: HashMap<u32, f64> = HashMap::new();
    for row in &case.gen {
        let bus = column(row, matpower::generator::GEN_BUS, 0.0) as u32;
        *gen_capacity.entry(bus).or_default() += column(row, matpower::generator::PMAX, 0.0);
    }

    let mut nodes = Vec::with_capacity(case.bus.len());
    for row in &case.bus {
        let bus_num = column(row, matpower::bus::BUS_I, 0.0) as u32;
        let Some(loc) = locations.get(&bus_num) else {
            continue;
        };

        let pd = column(row, matpower::bus::PD, 0.0);
        let base_kv = column(row, matpower::bus::BASE_KV, 0.0);
        let area = column(row, matpower::bus::BUS_AREA, 1.0) as i32;

        let mut capacity = gen_capacity.get(&bus_num).copied().unwrap_or(0.0);
        if capacity <= 0.0 {
            capacity = (pd * LOAD_ONLY_HEADROOM).max(1.0);
        }

        nodes.push(GridNode {
            id: format!("B{}", bus_num),
            bus_num,
            lat: round_to(loc.lat, 6),
            lon: round_to(loc.lon, 6),
            base_load_mw: round_to(pd.max(0.0), 2),
            capacity_mw: round_to(capacity, 2),
            voltage_kv: round_to(base_kv, 1),
            region: GRID_REGION.to_string(),
            weather_zone: classify_weather_zone(loc.lat, loc.lon).to_string(),
            area,
            grid_zone: loc.grid_zone,
            substation: Some(loc.substation),
            source: SOURCE_ACTIVSG.to_string(),
        });
    }

    let valid: HashSet<u32> = nodes.iter().map(|n| n.bus_num).collect();
    let edges: Vec<GridEdge> = case
        .branch
        .iter()
        .filter_map(|row| {
            let from = column(row, matpower::branch::F_BUS, 0.0) as u32;
            let to = column(row, matpower::branch::T_BUS, 0.0) as u32;
            if !valid.contains(&from) || !valid.contains(&to) {
                return None;
            }
            let rate_a = column(row, matpower::branch::RATE_A, 0.0);
            Some(GridEdge {
                from_bus: format!("B{}", from),
                to_bus: format!("B{}", to),
                capacity_mva: line_rating(rate_a),
                impedance: round_to(column(row, matpower::branch::BR_X, 0.0), 6),
            })
        })
        .collect();

    info!("Built ACTIVSg2000 grid: {} nodes, {} edges", nodes.len(), edges.len());
    Ok(GridData { nodes, edges })
}

fn line_rating(mva: f64) -> f64 {
    if mva > 0.0 {
        round_to(mva, 1)
    } else {
        DEFAULT_LINE_MVA
    }
}

/// Sum a numeric field per bus over rows whose status column reads `Closed`.
fn closed_totals(
    text: &str,
    block: &str,
    status_field: &str,
    value_field: &str,
) -> Result<HashMap<u32, f64>, GridDataError> {
    let mut totals: HashMap<u32, f64> = HashMap::new();
    if let Some(block) = parse_blocks(text, block)?.into_iter().next() {
        for r in block.records() {
            let (Some(bus), Some(status)) = (r.get::<u32>("BusNum"), r.raw(status_field)) else {
                continue;
            };
            if status != "Closed" {
                continue;
            }
            if let Some(value) = r.get::<f64>(value_field) {
                *totals.entry(bus).or_default() += value;
            }
        }
    }
    Ok(totals)
}

/// Build Travis150 nodes and edges from its AUX text.
///
/// Coordinates live on substations; buses inherit the location of their
/// substation and buses without one are dropped.
pub fn build_travis150(aux_text: &str) -> Result<GridData, GridDataError> {
    let subs = require_block(aux_text, "Substation", "Travis150 AUX")?;
    let substations: HashMap<u32, (f64, f64)> = subs
        .records()
        .filter_map(|r| Some((r.get("SubNum")?, (r.get("Latitude")?, r.get("Longitude")?))))
        .collect();
    info!("Travis150: {} substations", substations.len());

    let bus_block = require_block(aux_text, "Bus", "Travis150 AUX")?;
    // BTreeMap keeps node order stable across runs
    let mut buses = BTreeMap::new();
    for r in bus_block.records() {
        let (Some(bus), Some(kv), Some(sub)) = (
            r.get::<u32>("BusNum"),
            r.get::<f64>("BusNomVolt"),
            r.get::<u32>("SubNum"),
        ) else {
            continue;
        };
        if let Some(&(lat, lon)) = substations.get(&sub) {
            buses.insert(bus, (sub, kv, lat, lon));
        }
    }
    info!("Travis150: {} buses", buses.len());

    let loads = closed_totals(aux_text, "Load", "LoadStatus", "LoadSMW")?;
    info!(
        "Travis150: {} buses with loads, total {:.1} MW",
        loads.len(),
        loads.values().sum::<f64>()
    );

    let gens = closed_totals(aux_text, "Gen", "GenStatus", "GenMWMax")?;
    info!(
        "Travis150: {} buses with generation, total {:.1} MW",
        gens.len(),
        gens.values().sum::<f64>()
    );

    let mut raw_branches = Vec::new();
    for block in parse_blocks(aux_text, "Branch")? {
        for r in block.records() {
            if r.raw("LineStatus") != Some("Closed") {
                continue;
            }
            let (Some(from), Some(to), Some(x), Some(mva)) = (
                r.get::<u32>("BusNum"),
                r.get::<u32>("BusNum:1"),
                r.get::<f64>("LineX"),
                r.get::<f64>("LineAMVA"),
            ) else {
                continue;
            };
            raw_branches.push((from, to, x, mva));
        }
    }
    info!("Travis150: {} branch entries (closed)", raw_branches.len());

    let nodes: Vec<GridNode> = buses
        .iter()
        .map(|(&bus_num, &(sub, kv, lat, lon))| {
            let base_load = loads.get(&bus_num).copied().unwrap_or(0.0);
            let mut capacity = gens.get(&bus_num).copied().unwrap_or(0.0);
            if capacity <= 0.0 {
                capacity = (base_load * LOAD_ONLY_HEADROOM).max(1.0);
            }
            GridNode {
                id: format!("T{}", bus_num),
                bus_num,
                lat: round_to(lat, 6),
                lon: round_to(lon, 6),
                base_load_mw: round_to(base_load.max(0.0), 2),
                capacity_mw: round_to(capacity, 2),
                voltage_kv: round_to(kv, 1),
                region: GRID_REGION.to_string(),
                weather_zone: SOUTH_CENTRAL.to_string(),
                area: 9,
                grid_zone: 0,
                substation: Some(sub),
                source: SOURCE_TRAVIS.to_string(),
            }
        })
        .collect();

    let edges: Vec<GridEdge> = raw_branches
        .into_iter()
        .filter(|(from, to, _, _)| buses.contains_key(from) && buses.contains_key(to))
        .map(|(from, to, x, mva)| GridEdge {
            from_bus: format!("T{}", from),
            to_bus: format!("T{}", to),
            capacity_mva: line_rating(mva),
            impedance: round_to(x.abs(), 6),
        })
        .collect();

    info!("Built Travis150 grid: {} nodes, {} edges", nodes.len(), edges.len());
    Ok(GridData { nodes, edges })
}

/// Link the largest high-voltage Travis buses to the nearest high-voltage
/// ACTIVSg bus in the South Central zone.
pub fn create_tie_lines(activsg: &[GridNode], travis: &[GridNode]) -> Vec<GridEdge> {
    let mut travis_hv: Vec<&GridNode> = travis
        .iter()
        .filter(|n| n.voltage_kv >= TIE_LINE_MIN_KV)
        .collect();
    if travis_hv.is_empty() {
        warn!("No Travis150 high-voltage buses found for tie lines");
        return Vec::new();
    }

    let activsg_hv: Vec<&GridNode> = activsg
        .iter()
        .filter(|n| n.voltage_kv >= TIE_LINE_MIN_KV && n.weather_zone == SOUTH_CENTRAL)
        .collect();
    if activsg_hv.is_empty() {
        warn!("No ACTIVSg2000 high-voltage buses in South Central for tie lines");
        return Vec::new();
    }

    // Stable sort keeps file order among equal capacities
    travis_hv.sort_by(|a, b| b.capacity_mw.total_cmp(&a.capacity_mw));

    travis_hv
        .into_iter()
        .take(TIE_LINE_COUNT)
        .filter_map(|t| {
            let (nearest, dist) = activsg_hv
                .iter()
                .map(|a| (*a, planar_distance(t.lat, t.lon, a.lat, a.lon)))
                .fold(None, |best: Option<(&GridNode, f64)>, (a, d)| match best {
                    Some((_, bd)) if bd <= d => best,
                    _ => Some((a, d)),
                })?;
            info!(
                "Tie line: {} ({:.2}, {:.2}) <-> {} ({:.2}, {:.2}), dist={:.3} deg",
                t.id, t.lat, t.lon, nearest.id, nearest.lat, nearest.lon, dist
            );
            Some(GridEdge {
                from_bus: t.id.clone(),
                to_bus: nearest.id.clone(),
                capacity_mva: TIE_LINE_MVA,
                impedance: TIE_LINE_IMPEDANCE,
            })
        })
        .collect()
}
