//! Nearest-available emergency unit dispatch over a weighted road network.
//!
//! A batch is a road network, an inventory of units per location and an
//! ordered list of requests. Each request is served by the closest location
//! (shortest road distance) that still holds a unit of the requested type,
//! and that unit is consumed before the next request is looked at.

pub mod config;
pub mod error;
pub mod generator;
pub mod input;
pub mod inventory;
pub mod metrics;
pub mod nearest_unit;
pub mod plugin;
pub mod resolver;
pub mod resource_type;
pub mod road_graph;

#[cfg(any(test, feature = "bench"))]
pub mod test_harness;

pub use config::{DispatchParams, NOT_FOUND};
pub use error::DispatchError;
pub use input::{parse_batch, read_batch, DispatchBatch, BUNDLED_EXAMPLE};
pub use inventory::{build_inventory, InventoryLedger, UnitAvailability, UnitEntry};
pub use nearest_unit::{find_nearest_unit, UnitMatch};
pub use plugin::{DispatchPlugin, DispatchSet};
pub use resolver::{
    resolve_dispatch, ConsumptionPolicy, DispatchOutcome, DispatchReport, DispatchRequest,
    DispatchResolver,
};
pub use resource_type::{ResourceType, TypeCodeTable};
pub use road_graph::{build_graph, CsrGraph, Location, Road, RoadGraph};
