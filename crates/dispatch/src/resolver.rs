//! Dispatch resolution: one nearest-unit search per request, in order, with
//! exactly one ledger decrement committed per successful search.
//!
//! The search reports the location it stopped at and the resolver decrements
//! there. Attribution never comes from comparing ledger copies, so two
//! locations holding identical counts can never be confused.

use std::fmt;

use bevy::log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::config::{DispatchParams, NOT_FOUND};
use crate::error::DispatchError;
use crate::inventory::InventoryLedger;
use crate::metrics::DispatchMetrics;
use crate::nearest_unit::{find_nearest_unit_within, UnitMatch};
use crate::resource_type::ResourceType;
use crate::road_graph::{CsrGraph, Distance, Location, RoadGraph};

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// A request for one unit of `resource` at `location`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchRequest {
    pub location: Location,
    pub resource: ResourceType,
}

impl DispatchRequest {
    pub fn new(location: u32, resource: ResourceType) -> Self {
        Self {
            location: Location(location),
            resource,
        }
    }
}

/// Result of one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DispatchOutcome {
    /// A unit stationed at `from` was consumed; `distance` is the shortest
    /// road distance from the request location to `from`.
    Dispatched { from: Location, distance: Distance },
    /// No reachable location had a unit of the requested type.
    Unavailable,
}

impl DispatchOutcome {
    pub fn distance(&self) -> Option<Distance> {
        match self {
            DispatchOutcome::Dispatched { distance, .. } => Some(*distance),
            DispatchOutcome::Unavailable => None,
        }
    }

    pub fn is_dispatched(&self) -> bool {
        matches!(self, DispatchOutcome::Dispatched { .. })
    }

    /// Distance as a plain number, [`NOT_FOUND`] when unavailable.
    pub fn to_signed(&self) -> f64 {
        self.distance().map_or(NOT_FOUND, Distance::into_inner)
    }
}

impl fmt::Display for DispatchOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DispatchOutcome::Dispatched { distance, .. } => write!(f, "{distance}"),
            DispatchOutcome::Unavailable => write!(f, "{NOT_FOUND}"),
        }
    }
}

impl From<Option<UnitMatch>> for DispatchOutcome {
    fn from(found: Option<UnitMatch>) -> Self {
        match found {
            Some(m) => DispatchOutcome::Dispatched {
                from: m.location,
                distance: m.distance,
            },
            None => DispatchOutcome::Unavailable,
        }
    }
}

/// Which ledger view the search reads while a request is being resolved.
///
/// Either way the search is read-only and the decrement is committed at the
/// location the search reported, so both policies yield identical outcomes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConsumptionPolicy {
    /// Search reads the live ledger through a shared borrow.
    #[default]
    Live,
    /// Search reads a snapshot taken at the start of each request.
    Snapshot,
}

/// Ordered outcomes of a batch plus per-type statistics.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DispatchReport {
    pub outcomes: Vec<DispatchOutcome>,
    pub metrics: DispatchMetrics,
}

impl DispatchReport {
    /// Outcomes rendered one per line, `-1` for unavailable.
    pub fn to_lines(&self) -> Vec<String> {
        self.outcomes.iter().map(ToString::to_string).collect()
    }
}

// ---------------------------------------------------------------------------
// Resolver
// ---------------------------------------------------------------------------

/// Resolves requests against a compiled road graph.
pub struct DispatchResolver<'a> {
    csr: &'a CsrGraph,
    policy: ConsumptionPolicy,
    max_response_distance: Option<Distance>,
}

impl<'a> DispatchResolver<'a> {
    pub fn new(csr: &'a CsrGraph) -> Self {
        Self {
            csr,
            policy: ConsumptionPolicy::default(),
            max_response_distance: None,
        }
    }

    pub fn from_params(csr: &'a CsrGraph, params: &DispatchParams) -> Self {
        Self {
            csr,
            policy: params.policy,
            max_response_distance: params.max_response_distance,
        }
    }

    pub fn with_policy(mut self, policy: ConsumptionPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_max_response_distance(mut self, max: Option<Distance>) -> Self {
        self.max_response_distance = max;
        self
    }

    /// Resolve a single request, committing at most one decrement.
    pub fn resolve_one(
        &self,
        ledger: &mut InventoryLedger,
        request: DispatchRequest,
    ) -> Result<DispatchOutcome, DispatchError> {
        let found = match self.policy {
            ConsumptionPolicy::Live => self.search(&*ledger, request),
            ConsumptionPolicy::Snapshot => {
                let snapshot = ledger.snapshot();
                self.search(&snapshot, request)
            }
        };

        let Some(found) = found else {
            debug!(
                "No {} unit reachable from {}",
                request.resource, request.location
            );
            return Ok(DispatchOutcome::Unavailable);
        };

        let remaining = ledger.decrement(found.location, request.resource)?;
        debug!(
            "Dispatched {} from {} to {} (distance {}, {} left there)",
            request.resource, found.location, request.location, found.distance, remaining
        );
        Ok(Some(found).into())
    }

    /// Resolve every request in input order.
    pub fn resolve_all(
        &self,
        ledger: &mut InventoryLedger,
        requests: &[DispatchRequest],
    ) -> Result<DispatchReport, DispatchError> {
        let mut report = DispatchReport {
            outcomes: Vec::with_capacity(requests.len()),
            metrics: DispatchMetrics::default(),
        };
        for &request in requests {
            let outcome = self.resolve_one(ledger, request)?;
            report.metrics.record(request.resource, &outcome);
            report.outcomes.push(outcome);
        }
        info!(
            "Resolved {} requests: {} dispatched, {} unavailable",
            requests.len(),
            report.metrics.total_dispatches(),
            report.metrics.total_failed()
        );
        Ok(report)
    }

    /// Resolve `requests` as a what-if: the ledger is restored to its
    /// pre-batch state afterwards, whether or not resolution succeeded.
    pub fn preview(
        &self,
        ledger: &mut InventoryLedger,
        requests: &[DispatchRequest],
    ) -> Result<DispatchReport, DispatchError> {
        let before = ledger.snapshot();
        let report = self.resolve_all(ledger, requests);
        ledger.restore(&before);
        report
    }

    fn search<V: crate::inventory::UnitAvailability>(
        &self,
        view: &V,
        request: DispatchRequest,
    ) -> Option<UnitMatch> {
        find_nearest_unit_within(
            self.csr,
            view,
            request.location,
            request.resource,
            self.max_response_distance,
        )
    }
}

/// Resolve `requests` in order against `graph`, consuming units from `ledger`.
///
/// Uses the default policy and no distance cutoff. One outcome per request.
pub fn resolve_dispatch(
    graph: &RoadGraph,
    ledger: &mut InventoryLedger,
    requests: &[DispatchRequest],
) -> Result<Vec<DispatchOutcome>, DispatchError> {
    let csr = graph.to_csr();
    let report = DispatchResolver::new(&csr).resolve_all(ledger, requests)?;
    Ok(report.outcomes)
}
