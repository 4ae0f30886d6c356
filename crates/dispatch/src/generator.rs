//! Seeded random batches for benchmarks, property tests and the
//! `generate_batch` tool.
//!
//! Uses `ChaCha8Rng` so the same seed yields the same batch on every
//! platform.

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::input::DispatchBatch;
use crate::inventory::UnitEntry;
use crate::resolver::DispatchRequest;
use crate::resource_type::ResourceType;
use crate::road_graph::Road;

/// Size and density of a generated batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NetworkShape {
    /// Locations are numbered `1..=locations`.
    pub locations: u32,
    /// Roads added on top of the spanning tree that keeps the network connected.
    pub extra_roads: usize,
    /// Road lengths are drawn in half steps from `0..=max_distance`.
    pub max_distance: u32,
    pub unit_rows: usize,
    pub max_units_per_row: u32,
    pub requests: usize,
}

impl Default for NetworkShape {
    fn default() -> Self {
        Self {
            locations: 50,
            extra_roads: 75,
            max_distance: 20,
            unit_rows: 20,
            max_units_per_row: 3,
            requests: 40,
        }
    }
}

impl NetworkShape {
    pub fn new(locations: u32, extra_roads: usize) -> Self {
        Self {
            locations,
            extra_roads,
            unit_rows: (locations as usize / 2).max(1),
            requests: locations as usize,
            ..Self::default()
        }
    }
}

fn half_steps(rng: &mut ChaCha8Rng, max: u32) -> f64 {
    f64::from(rng.gen_range(0..=max.saturating_mul(2))) / 2.0
}

/// Generate a connected batch from `seed`.
pub fn generate_batch(seed: u64, shape: &NetworkShape) -> DispatchBatch {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let n = shape.locations.max(1);

    let mut roads = Vec::with_capacity(n as usize - 1 + shape.extra_roads);
    // Spanning tree over a shuffled order, so location 1 is not always the hub.
    let mut order: Vec<u32> = (1..=n).collect();
    order.shuffle(&mut rng);
    for i in 1..order.len() {
        let parent = order[rng.gen_range(0..i)];
        roads.push(Road::new(
            order[i],
            parent,
            half_steps(&mut rng, shape.max_distance),
        ));
    }
    for _ in 0..shape.extra_roads {
        roads.push(Road::new(
            rng.gen_range(1..=n),
            rng.gen_range(1..=n),
            half_steps(&mut rng, shape.max_distance),
        ));
    }

    let units = (0..shape.unit_rows)
        .map(|_| {
            UnitEntry::new(
                rng.gen_range(1..=n),
                random_type(&mut rng),
                rng.gen_range(0..=shape.max_units_per_row),
            )
        })
        .collect();

    let requests = (0..shape.requests)
        .map(|_| DispatchRequest::new(rng.gen_range(1..=n), random_type(&mut rng)))
        .collect();

    DispatchBatch {
        roads,
        units,
        requests,
    }
}

fn random_type(rng: &mut ChaCha8Rng) -> ResourceType {
    ResourceType::ALL[rng.gen_range(0..ResourceType::ALL.len())]
}
