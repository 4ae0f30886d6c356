use serde::{Deserialize, Serialize};

use super::graph::{Distance, Location, RoadGraph};

/// Compressed Sparse Row graph for cache-friendly traversal.
/// Stores the road network in a flat array format optimized for iteration.
///
/// **Determinism**: `nodes` is sorted by location id and each node's edge list
/// is sorted by neighbour index, so identical road lists always compile to an
/// identical layout.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CsrGraph {
    /// Sorted list of all locations
    pub nodes: Vec<Location>,
    /// node_offsets[i] is the start index in `edges` for node i.
    /// node_offsets[i+1] - node_offsets[i] = number of neighbors of node i.
    pub node_offsets: Vec<u32>,
    /// Flat array of neighbor indices (indices into `nodes`), sorted per node
    pub edges: Vec<u32>,
    /// Road distances (same length as edges)
    pub weights: Vec<Distance>,
}

impl CsrGraph {
    pub fn from_road_graph(graph: &RoadGraph) -> Self {
        // BTreeMap keys arrive sorted, so a location's index is its rank.
        let nodes: Vec<Location> = graph.locations().collect();

        let mut node_offsets = Vec::with_capacity(nodes.len() + 1);
        let mut edges = Vec::new();
        let mut weights = Vec::new();

        for &node in &nodes {
            node_offsets.push(edges.len() as u32);
            for (neighbor, distance) in graph.neighbors(node) {
                if let Ok(idx) = nodes.binary_search(&neighbor) {
                    edges.push(idx as u32);
                    weights.push(distance);
                }
            }
        }
        node_offsets.push(edges.len() as u32);

        Self {
            nodes,
            node_offsets,
            edges,
            weights,
        }
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn neighbors(&self, node_idx: u32) -> &[u32] {
        let start = self.node_offsets[node_idx as usize] as usize;
        let end = self.node_offsets[node_idx as usize + 1] as usize;
        &self.edges[start..end]
    }

    pub fn neighbor_weights(&self, node_idx: u32) -> impl Iterator<Item = (u32, Distance)> + '_ {
        let start = self.node_offsets[node_idx as usize] as usize;
        let end = self.node_offsets[node_idx as usize + 1] as usize;
        self.edges[start..end]
            .iter()
            .zip(self.weights[start..end].iter())
            .map(|(&e, &w)| (e, w))
    }

    pub fn find_node_index(&self, location: Location) -> Option<u32> {
        self.nodes.binary_search(&location).ok().map(|i| i as u32)
    }

    pub fn location(&self, node_idx: u32) -> Location {
        self.nodes[node_idx as usize]
    }
}
