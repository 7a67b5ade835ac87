//! In-memory grid model.
//!
//! The merged ACTIVSg2000 + Travis150 graph is parsed once at startup (or read
//! from its JSON cache) and then shared read-only behind an `Arc`. Simulations
//! never mutate it; they copy per-node loads into their own working state.

pub mod builder;
pub mod matpower;
pub mod powerworld;
pub mod zones;

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{info, warn};

use crate::config::GridDataConfig;
use crate::models::grid::{GridData, GridEdge, GridNode};

pub use zones::classify_weather_zone;

/// Errors raised while loading grid source data.
#[derive(Debug, Error)]
pub enum GridDataError {
    #[error("failed to read {}: {}", .path.display(), .source)]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("missing {block} DATA block in {context}")]
    MissingBlock { block: String, context: String },

    #[error("missing matrix mpc.{0} in MATPOWER case")]
    MissingMatrix(String),

    #[error("malformed value {value:?} in {context}")]
    Parse { context: String, value: String },

    #[error("invalid block pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("invalid grid cache: {0}")]
    Cache(#[from] serde_json::Error),
}

/// Undirected bus/line graph with lookup indices.
#[derive(Debug, Clone)]
pub struct GridGraph {
    data: GridData,
    index: HashMap<String, usize>,
    /// Neighbour node indices in edge order, without duplicates
    adjacency: Vec<Vec<usize>>,
    zone_index: BTreeMap<String, Vec<String>>,
    edge_count: usize,
}

impl GridGraph {
    /// Load from the JSON cache, or build from the source files and write
    /// the cache.
    pub fn load(config: &GridDataConfig) -> Result<Self, GridDataError> {
        let data = match read_cache(&config.cache_file)? {
            Some(data) => data,
            None => {
                let data = builder::build_merged(config)?;
                write_cache(&config.cache_file, &data);
                data
            }
        };

        let graph = Self::from_data(data);
        info!(
            "Grid loaded: {} nodes, {} edges",
            graph.node_count(),
            graph.edge_count()
        );
        Ok(graph)
    }

    /// Index a node and edge list. Edges to unknown nodes and self loops are
    /// ignored for adjacency but kept in the raw edge list.
    pub fn from_data(data: GridData) -> Self {
        let index: HashMap<String, usize> = data
            .nodes
            .iter()
            .enumerate()
            .map(|(i, n)| (n.id.clone(), i))
            .collect();

        let mut adjacency = vec![Vec::new(); data.nodes.len()];
        let mut edge_count = 0;
        for edge in &data.edges {
            let (Some(&a), Some(&b)) = (index.get(&edge.from_bus), index.get(&edge.to_bus)) else {
                continue;
            };
            if a == b || adjacency[a].contains(&b) {
                continue;
            }
            adjacency[a].push(b);
            adjacency[b].push(a);
            edge_count += 1;
        }

        let mut zone_index: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for node in &data.nodes {
            zone_index
                .entry(node.weather_zone.clone())
                .or_default()
                .push(node.id.clone());
        }

        Self {
            data,
            index,
            adjacency,
            zone_index,
            edge_count,
        }
    }

    /// Raw nodes and edges as parsed.
    pub fn topology(&self) -> &GridData {
        &self.data
    }

    pub fn nodes(&self) -> &[GridNode] {
        &self.data.nodes
    }

    pub fn edges(&self) -> &[GridEdge] {
        &self.data.edges
    }

    pub fn node_count(&self) -> usize {
        self.data.nodes.len()
    }

    /// Number of distinct connected node pairs.
    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    pub fn node_ids(&self) -> impl Iterator<Item = &str> {
        self.data.nodes.iter().map(|n| n.id.as_str())
    }

    pub fn node(&self, id: &str) -> Option<&GridNode> {
        self.index_of(id).map(|i| &self.data.nodes[i])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.index.get(id).copied()
    }

    /// Neighbour indices of the node at `idx`.
    pub fn neighbor_indices(&self, idx: usize) -> &[usize] {
        self.adjacency.get(idx).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Neighbour ids in edge order.
    pub fn neighbors(&self, id: &str) -> Vec<&str> {
        self.index_of(id)
            .map(|i| {
                self.neighbor_indices(i)
                    .iter()
                    .map(|&j| self.data.nodes[j].id.as_str())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Neighbour ids, sorted.
    pub fn connected_nodes(&self, id: &str) -> Vec<String> {
        let mut ids: Vec<String> = self.neighbors(id).into_iter().map(str::to_string).collect();
        ids.sort();
        ids
    }

    pub fn nodes_in_weather_zone(&self, zone: &str) -> &[String] {
        self.zone_index.get(zone).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Weather zones present in the grid, sorted.
    pub fn weather_zones(&self) -> Vec<&str> {
        self.zone_index.keys().map(String::as_str).collect()
    }
}

/// Read the parsed-grid cache. A missing cache, or one written before the
/// Travis150 overlay existed, yields `None` so the grid is rebuilt.
fn read_cache(path: &Path) -> Result<Option<GridData>, GridDataError> {
    if !path.exists() {
        return Ok(None);
    }

    info!("Loading cached parsed grid from {}", path.display());
    let text = builder::read_source(path)?;
    let data: GridData = serde_json::from_str(&text)?;

    if data.nodes.first().is_some_and(|n| n.source.is_empty()) {
        info!("Grid cache predates the Travis150 overlay, rebuilding");
        return Ok(None);
    }
    Ok(Some(data))
}

fn write_cache(path: &Path, data: &GridData) {
    let result = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map_or(Ok(()), fs::create_dir_all)
        .and_then(|_| {
            let json = serde_json::to_string(data).map_err(std::io::Error::other)?;
            fs::write(path, json)
        });

    match result {
        Ok(()) => info!("Cached merged grid to {}", path.display()),
        Err(e) => warn!("Failed to write grid cache {}: {}", path.display(), e),
    }
}
