mod csr;
mod graph;
#[cfg(test)]
mod tests;

pub use csr::CsrGraph;
pub use graph::{
    build_graph, checked_distance, Distance, Location, Road, RoadGraph, MAX_ROAD_DISTANCE,
};

/// Shorthand for a known-good distance in tests.
#[cfg(any(test, feature = "bench"))]
pub fn dist(value: f64) -> Distance {
    checked_distance(value).expect("test distance should be valid")
}
