//! Bevy integration: dispatch state as resources, resolution as a system.
//!
//! A host loads a batch with [`load_batch`] (or fills the resources directly)
//! and the next `app.update()` resolves everything queued in
//! [`PendingRequests`], appending outcomes to [`DispatchLog`].

use bevy::prelude::*;

use crate::config::DispatchParams;
use crate::error::DispatchError;
use crate::input::DispatchBatch;
use crate::inventory::InventoryLedger;
use crate::metrics::DispatchMetrics;
use crate::resolver::{DispatchOutcome, DispatchRequest, DispatchResolver};
use crate::road_graph::{CsrGraph, RoadGraph};

// ---------------------------------------------------------------------------
// Sets
// ---------------------------------------------------------------------------

/// Phases for dispatch systems in the `Update` schedule.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum DispatchSet {
    /// Hosts queueing requests should run here.
    Intake,
    /// Requests are resolved against the ledger.
    Resolve,
}

// ---------------------------------------------------------------------------
// Resources
// ---------------------------------------------------------------------------

/// The road network in both forms: the adjacency map it was built as and the
/// CSR layout the search runs on.
#[derive(Resource, Debug, Clone, Default)]
pub struct DispatchNetwork {
    pub graph: RoadGraph,
    pub csr: CsrGraph,
}

impl DispatchNetwork {
    pub fn new(graph: RoadGraph) -> Self {
        let csr = graph.to_csr();
        Self { graph, csr }
    }
}

/// Requests waiting for the next resolve pass, in arrival order.
#[derive(Resource, Debug, Clone, Default)]
pub struct PendingRequests {
    pub requests: Vec<DispatchRequest>,
    /// Resolve the next pass without committing: the ledger is restored
    /// afterwards. Cleared once that pass has run.
    pub preview: bool,
}

impl PendingRequests {
    pub fn push(&mut self, request: DispatchRequest) {
        self.requests.push(request);
    }
}

/// Everything resolved so far.
#[derive(Resource, Debug, Clone, Default)]
pub struct DispatchLog {
    pub outcomes: Vec<DispatchOutcome>,
    pub metrics: DispatchMetrics,
    pub last_error: Option<String>,
}

// ---------------------------------------------------------------------------
// Systems
// ---------------------------------------------------------------------------

/// Drain [`PendingRequests`] and resolve them in order.
pub fn process_pending_requests(
    params: Res<DispatchParams>,
    network: Res<DispatchNetwork>,
    mut ledger: ResMut<InventoryLedger>,
    mut pending: ResMut<PendingRequests>,
    mut log: ResMut<DispatchLog>,
) {
    if pending.requests.is_empty() {
        return;
    }
    let requests = std::mem::take(&mut pending.requests);
    let preview = std::mem::take(&mut pending.preview);
    let resolver = DispatchResolver::from_params(&network.csr, &params);

    let result = if preview {
        resolver.preview(&mut ledger, &requests)
    } else {
        resolver.resolve_all(&mut ledger, &requests)
    };

    match result {
        Ok(report) => {
            log.metrics.merge(&report.metrics);
            log.outcomes.extend(report.outcomes);
        }
        Err(e) => {
            error!("Dispatch pass over {} requests failed: {e}", requests.len());
            log.last_error = Some(e.to_string());
        }
    }
}

/// Install a parsed batch: replaces the network and ledger, and queues the
/// batch's requests behind anything already pending.
pub fn load_batch(world: &mut World, batch: &DispatchBatch) -> Result<(), DispatchError> {
    let (graph, ledger) = batch.build()?;
    let network = DispatchNetwork::new(graph);
    info!(
        "Loaded network with {} locations and {} roads; queued {} requests",
        network.graph.location_count(),
        network.graph.road_count(),
        batch.requests.len()
    );
    world.insert_resource(network);
    world.insert_resource(ledger);
    world
        .get_resource_or_insert_with(PendingRequests::default)
        .requests
        .extend_from_slice(&batch.requests);
    Ok(())
}

// ---------------------------------------------------------------------------
// Plugin
// ---------------------------------------------------------------------------

pub struct DispatchPlugin;

impl Plugin for DispatchPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<DispatchParams>()
            .init_resource::<DispatchNetwork>()
            .init_resource::<InventoryLedger>()
            .init_resource::<PendingRequests>()
            .init_resource::<DispatchLog>()
            .configure_sets(Update, (DispatchSet::Intake, DispatchSet::Resolve).chain())
            .add_systems(
                Update,
                process_pending_requests.in_set(DispatchSet::Resolve),
            );
    }
}
