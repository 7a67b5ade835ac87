//! Grid model loading from source files and the JSON cache.

use std::fs;
use std::path::Path;

use proptest::prelude::*;
use tempfile::TempDir;

use blackout_api::config::GridDataConfig;
use blackout_api::models::grid::{GridData, GridEdge, GridNode};
use blackout_api::services::grid::GridDataError;
use blackout_api::services::GridGraph;

const CASE: &str = "
mpc.bus = [
	1001	2	50	0	0	0	3	1	0	345	1	1.1	0.9;
	1002	1	80	0	0	0	3	1	0	345	1	1.1	0.9;
];
mpc.gen = [
	1001	0	0	0	0	1	100	1	300	0;
];
mpc.branch = [
	1001	1002	0	0.01	0	200	0	0	0	0	1	-360	360;
];
";

const AUX: &str = r#"
DATA (Bus, [BusNum, BusName, Latitude:1, Longitude:1, AreaNum, ZoneNum, SubNum])
{
1001 "AUSTIN 1" 30.27 -97.74 3 12 101
1002 "AUSTIN 2" 30.30 -97.70 3 12 102
}
"#;

const TRAVIS: &str = r#"
DATA (Substation, [SubNum, SubName, Latitude, Longitude])
{
1 "Sub A" 30.25 -97.75
}
DATA (Bus, [BusNum, BusName, BusNomVolt, SubNum])
{
1 "A345" 345 1
2 "A69" 69 1
}
DATA (Load, [BusNum, LoadID, LoadStatus, LoadSMW])
{
2 "1" "Closed" 40
}
DATA (Gen, [BusNum, GenID, GenStatus, GenMWMax])
{
1 "1" "Closed" 250
}
DATA (Branch, [BusNum, BusNum:1, LineCircuit, LineStatus, LineX, LineAMVA])
{
1 2 "1" "Closed" 0.02 120
}
"#;

fn config(dir: &Path) -> GridDataConfig {
    GridDataConfig {
        activsg_case_file: dir.join("ACTIVSg2000.m"),
        activsg_aux_file: dir.join("ACTIVSg2000.aux"),
        travis150_aux_file: dir.join("Travis150.aux"),
        cache_file: dir.join("cache").join("grid.json"),
    }
}

fn write_sources(dir: &Path, with_travis: bool) {
    fs::write(dir.join("ACTIVSg2000.m"), CASE).unwrap();
    fs::write(dir.join("ACTIVSg2000.aux"), AUX).unwrap();
    if with_travis {
        fs::write(dir.join("Travis150.aux"), TRAVIS).unwrap();
    }
}

#[test]
fn test_load_builds_merged_grid_and_writes_cache() {
    let dir = TempDir::new().unwrap();
    write_sources(dir.path(), true);
    let config = config(dir.path());

    let grid = GridGraph::load(&config).unwrap();
    let ids: Vec<&str> = grid.node_ids().collect();
    assert_eq!(ids, vec!["B1001", "B1002", "T1", "T2"]);
    assert!(config.cache_file.exists());

    // One ACTIVSg line, one Travis line, one tie line from the 345 kV Travis bus
    assert_eq!(grid.edge_count(), 3);
    assert!(grid.neighbors("T1").contains(&"T2"));
    assert!(grid.neighbors("T1").contains(&"B1001"));
}

#[test]
fn test_load_prefers_cache() {
    let dir = TempDir::new().unwrap();
    write_sources(dir.path(), true);
    let config = config(dir.path());
    let first = GridGraph::load(&config).unwrap();

    fs::remove_file(&config.activsg_case_file).unwrap();
    let second = GridGraph::load(&config).unwrap();
    assert_eq!(second.node_count(), first.node_count());
    assert_eq!(second.edge_count(), first.edge_count());
}

#[test]
fn test_load_without_travis_overlay() {
    let dir = TempDir::new().unwrap();
    write_sources(dir.path(), false);

    let grid = GridGraph::load(&config(dir.path())).unwrap();
    assert_eq!(grid.node_count(), 2);
    assert!(grid.nodes().iter().all(|n| n.source == "activsg2000"));
}

#[test]
fn test_missing_case_file_is_io_error() {
    let dir = TempDir::new().unwrap();

    let err = GridGraph::load(&config(dir.path())).unwrap_err();
    assert!(matches!(err, GridDataError::Io { .. }));
}

#[test]
fn test_corrupt_cache_rejected() {
    let dir = TempDir::new().unwrap();
    let config = config(dir.path());
    fs::create_dir_all(config.cache_file.parent().unwrap()).unwrap();
    fs::write(&config.cache_file, "{ not json").unwrap();

    assert!(GridGraph::load(&config).is_err());
}

fn node(id: usize) -> GridNode {
    GridNode {
        id: format!("N{}", id),
        bus_num: id as u32,
        lat: 30.0,
        lon: -97.0,
        base_load_mw: 10.0,
        capacity_mw: 20.0,
        voltage_kv: 138.0,
        region: "ERCOT".to_string(),
        weather_zone: "South Central".to_string(),
        area: 1,
        grid_zone: 1,
        substation: None,
        source: "activsg2000".to_string(),
    }
}

proptest! {
    #[test]
    fn prop_adjacency_is_symmetric(
        n in 1usize..12,
        pairs in prop::collection::vec((0usize..16, 0usize..16), 0..40),
    ) {
        let edges: Vec<GridEdge> = pairs
            .iter()
            .map(|&(a, b)| GridEdge {
                from_bus: format!("N{}", a),
                to_bus: format!("N{}", b),
                capacity_mva: 100.0,
                impedance: 0.01,
            })
            .collect();
        let grid = GridGraph::from_data(GridData { nodes: (0..n).map(node).collect(), edges });

        for id in grid.node_ids() {
            let neighbours = grid.neighbors(id);
            prop_assert!(!neighbours.contains(&id));
            for other in neighbours {
                prop_assert!(grid.neighbors(other).contains(&id));
            }
        }
    }
}
