use std::collections::BTreeMap;
use std::fmt;

use bevy::log::{debug, warn};
use ordered_float::NotNan;
use serde::{Deserialize, Serialize};

use crate::error::DispatchError;

use super::csr::CsrGraph;

/// Path length along the road network. Never NaN, never negative once it has
/// passed [`checked_distance`].
pub type Distance = NotNan<f64>;

/// Largest length accepted for a single road. Keeps path sums exact enough
/// and far from overflow no matter how many roads a batch declares.
pub const MAX_ROAD_DISTANCE: f64 = u32::MAX as f64;

/// Validate a raw road length: finite, non-negative and at most
/// [`MAX_ROAD_DISTANCE`]. The error is a human-readable reason.
pub fn checked_distance(value: f64) -> Result<Distance, String> {
    // Adding 0.0 folds -0.0 into 0.0.
    let distance = NotNan::new(value + 0.0)
        .map_err(|_| "road distance must be a number, got NaN".to_string())?;
    if value < 0.0 {
        return Err(format!("road distance must not be negative, got {value}"));
    }
    if value > MAX_ROAD_DISTANCE {
        return Err(format!(
            "road distance {value} is above the maximum {MAX_ROAD_DISTANCE}"
        ));
    }
    Ok(distance)
}

/// A place on the network, identified by a ZIP-code-like integer.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Location(pub u32);

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A bidirectional road segment as read from a batch. `distance` is the raw
/// value; [`build_graph`] validates it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Road {
    #[serde(alias = "u")]
    pub a: Location,
    #[serde(alias = "v")]
    pub b: Location,
    #[serde(alias = "d")]
    pub distance: f64,
}

impl Road {
    pub fn new(a: u32, b: u32, distance: impl Into<f64>) -> Self {
        Self {
            a: Location(a),
            b: Location(b),
            distance: distance.into(),
        }
    }
}

/// Undirected weighted road network: location → (neighbour → distance).
///
/// Symmetric by construction. Ordered maps keep neighbour iteration, and
/// therefore every search over the graph, deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoadGraph {
    adjacency: BTreeMap<Location, BTreeMap<Location, Distance>>,
}

impl RoadGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert both directions of the road `a - b`. A later road between the
    /// same pair replaces the earlier distance; the replaced distance is
    /// returned.
    pub fn insert_road(&mut self, a: Location, b: Location, distance: Distance) -> Option<Distance> {
        let previous = self.adjacency.entry(a).or_default().insert(b, distance);
        self.adjacency.entry(b).or_default().insert(a, distance);
        previous
    }

    pub fn contains(&self, location: Location) -> bool {
        self.adjacency.contains_key(&location)
    }

    pub fn location_count(&self) -> usize {
        self.adjacency.len()
    }

    /// Number of distinct undirected roads (each pair counted once).
    pub fn road_count(&self) -> usize {
        self.adjacency
            .iter()
            .map(|(a, neighbors)| neighbors.keys().filter(|b| a <= *b).count())
            .sum()
    }

    pub fn locations(&self) -> impl Iterator<Item = Location> + '_ {
        self.adjacency.keys().copied()
    }

    pub fn neighbors(&self, location: Location) -> impl Iterator<Item = (Location, Distance)> + '_ {
        self.adjacency
            .get(&location)
            .into_iter()
            .flat_map(|n| n.iter().map(|(&l, &d)| (l, d)))
    }

    pub fn distance_between(&self, a: Location, b: Location) -> Option<Distance> {
        self.adjacency.get(&a)?.get(&b).copied()
    }

    /// Compile into the flat CSR layout used by the search.
    pub fn to_csr(&self) -> CsrGraph {
        CsrGraph::from_road_graph(self)
    }
}

/// Build the road network from an ordered road list.
///
/// All-or-nothing: the first road with an invalid distance (negative, NaN,
/// infinite or above [`MAX_ROAD_DISTANCE`]) fails the whole build.
pub fn build_graph(roads: &[Road]) -> Result<RoadGraph, DispatchError> {
    let mut graph = RoadGraph::new();
    for (i, road) in roads.iter().enumerate() {
        let distance = checked_distance(road.distance).map_err(|reason| {
            DispatchError::MalformedInput {
                line: None,
                reason: format!("road #{} ({} - {}): {reason}", i + 1, road.a, road.b),
            }
        })?;
        if let Some(previous) = graph.insert_road(road.a, road.b, distance) {
            if previous != distance {
                warn!(
                    "Road {} - {} declared twice; distance {} replaces {}",
                    road.a, road.b, distance, previous
                );
            }
        }
    }
    debug!(
        "Road graph built: {} locations, {} roads",
        graph.location_count(),
        graph.road_count()
    );
    Ok(graph)
}
