//! # TestDispatch: headless harness for plugin-level tests
//!
//! Wraps a `bevy::app::App` with `MinimalPlugins` + [`DispatchPlugin`] and
//! offers a fluent builder for setting up a network, inventory and requests.

use bevy::prelude::*;

use crate::config::DispatchParams;
use crate::input::DispatchBatch;
use crate::inventory::{build_inventory, InventoryLedger, UnitAvailability, UnitEntry};
use crate::metrics::DispatchMetrics;
use crate::plugin::{load_batch, DispatchLog, DispatchNetwork, DispatchPlugin, PendingRequests};
use crate::resolver::{DispatchOutcome, DispatchRequest};
use crate::resource_type::ResourceType;
use crate::road_graph::{build_graph, Location, Road};

/// A headless App running [`DispatchPlugin`].
pub struct TestDispatch {
    app: App,
    roads: Vec<Road>,
}

impl Default for TestDispatch {
    fn default() -> Self {
        Self::new()
    }
}

impl TestDispatch {
    // -----------------------------------------------------------------------
    // Constructors
    // -----------------------------------------------------------------------

    /// An empty network with an empty ledger and default params.
    pub fn new() -> Self {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins);
        app.add_plugins(DispatchPlugin);
        app.update();
        Self {
            app,
            roads: Vec::new(),
        }
    }

    /// Load a whole parsed batch through [`load_batch`].
    pub fn from_batch(batch: &DispatchBatch) -> Self {
        let mut harness = Self::new();
        harness.roads = batch.roads.clone();
        load_batch(harness.app.world_mut(), batch).expect("batch should load");
        harness
    }

    // -----------------------------------------------------------------------
    // Builder
    // -----------------------------------------------------------------------

    pub fn with_params(mut self, params: DispatchParams) -> Self {
        self.app.insert_resource(params);
        self
    }

    /// Add a road and rebuild the network resource.
    pub fn with_road(mut self, a: u32, b: u32, distance: impl Into<f64>) -> Self {
        self.roads.push(Road::new(a, b, distance));
        let graph = build_graph(&self.roads).expect("road should be valid");
        self.app.insert_resource(DispatchNetwork::new(graph));
        self
    }

    /// Set the unit count for `(location, resource)`.
    pub fn with_units(mut self, location: u32, resource: ResourceType, count: u32) -> Self {
        let world = self.app.world_mut();
        let mut entries: Vec<UnitEntry> = {
            let ledger = world.resource::<InventoryLedger>();
            ledger
                .locations()
                .flat_map(|loc| {
                    ledger
                        .counts_at(loc)
                        .map(move |(r, c)| UnitEntry {
                            location: loc,
                            resource: r,
                            count: c,
                        })
                })
                .collect()
        };
        entries.push(UnitEntry::new(location, resource, count));
        world.insert_resource(build_inventory(&entries));
        self
    }

    pub fn with_preview(mut self) -> Self {
        self.app.world_mut().resource_mut::<PendingRequests>().preview = true;
        self
    }

    // -----------------------------------------------------------------------
    // Driving
    // -----------------------------------------------------------------------

    pub fn request(&mut self, location: u32, resource: ResourceType) -> &mut Self {
        self.app
            .world_mut()
            .resource_mut::<PendingRequests>()
            .push(DispatchRequest::new(location, resource));
        self
    }

    pub fn tick(&mut self) -> &mut Self {
        self.app.update();
        self
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    pub fn outcomes(&self) -> &[DispatchOutcome] {
        &self.app.world().resource::<DispatchLog>().outcomes
    }

    /// Outcomes as signed distances, `-1.0` for unavailable.
    pub fn signed_outcomes(&self) -> Vec<f64> {
        self.outcomes().iter().map(DispatchOutcome::to_signed).collect()
    }

    pub fn metrics(&self) -> &DispatchMetrics {
        &self.app.world().resource::<DispatchLog>().metrics
    }

    pub fn last_error(&self) -> Option<&str> {
        self.app
            .world()
            .resource::<DispatchLog>()
            .last_error
            .as_deref()
    }

    pub fn pending_count(&self) -> usize {
        self.app.world().resource::<PendingRequests>().requests.len()
    }

    pub fn available(&self, location: u32, resource: ResourceType) -> u32 {
        self.ledger().available_count(Location(location), resource)
    }

    pub fn ledger(&self) -> &InventoryLedger {
        self.app.world().resource::<InventoryLedger>()
    }

    pub fn world_mut(&mut self) -> &mut World {
        self.app.world_mut()
    }
}
