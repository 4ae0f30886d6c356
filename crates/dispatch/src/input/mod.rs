//! Batch input: the line-oriented text format and its JSON equivalent.
//!
//! This is the only place raw type codes exist. Both readers translate them
//! through the [`TypeCodeTable`] as they go, so a [`DispatchBatch`] holds
//! canonical [`ResourceType`]s only.

mod json_format;
mod text_format;

use std::path::Path;

use bevy::log::info;
use serde::{Deserialize, Serialize};

use crate::config::DispatchParams;
use crate::error::DispatchError;
use crate::inventory::{build_inventory, InventoryLedger, UnitEntry};
use crate::resolver::{DispatchReport, DispatchRequest, DispatchResolver};
use crate::resource_type::{ResourceType, TypeCodeTable};
use crate::road_graph::{build_graph, Road, RoadGraph};

pub use json_format::parse_json;
pub use text_format::{parse_text, render_text};

/// The example batch shipped with the dispatch console: 5 locations,
/// 6 roads, 3 stocked locations, 4 requests.
pub const BUNDLED_EXAMPLE: &str = "5 6\n1 2 5\n1 3 10\n2 3 2\n2 4 3\n3 5 1\n4 5 2\n3\n1 1 1\n3 2 1\n5 3 1\n4\n2 1\n3 2\n1 3\n5 1";

/// A fully parsed batch: network, initial inventory and ordered requests.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DispatchBatch {
    pub roads: Vec<Road>,
    pub units: Vec<UnitEntry>,
    pub requests: Vec<DispatchRequest>,
}

impl DispatchBatch {
    /// Build the graph and ledger for this batch.
    pub fn build(&self) -> Result<(RoadGraph, InventoryLedger), DispatchError> {
        let graph = build_graph(&self.roads)?;
        let ledger = build_inventory(&self.units);
        Ok((graph, ledger))
    }

    /// Build and resolve the whole batch in one go.
    pub fn run(&self, params: &DispatchParams) -> Result<DispatchReport, DispatchError> {
        let (graph, mut ledger) = self.build()?;
        let csr = graph.to_csr();
        DispatchResolver::from_params(&csr, params).resolve_all(&mut ledger, &self.requests)
    }

    /// Requested resource types that the batch stocks nowhere.
    pub fn unstocked_types(&self) -> Vec<ResourceType> {
        ResourceType::ALL
            .into_iter()
            .filter(|r| self.requests.iter().any(|q| q.resource == *r))
            .filter(|r| !self.units.iter().any(|u| u.resource == *r && u.count > 0))
            .collect()
    }
}

/// Parse a batch, choosing JSON when the first non-blank character is `{`.
pub fn parse_batch(text: &str, table: &TypeCodeTable) -> Result<DispatchBatch, DispatchError> {
    let batch = if text.trim_start().starts_with('{') {
        parse_json(text, table)?
    } else {
        parse_text(text, table)?
    };
    info!(
        "Parsed batch: {} roads, {} inventory rows, {} requests",
        batch.roads.len(),
        batch.units.len(),
        batch.requests.len()
    );
    Ok(batch)
}

/// Read and parse a batch file.
pub fn read_batch(path: impl AsRef<Path>, table: &TypeCodeTable) -> Result<DispatchBatch, DispatchError> {
    let text = std::fs::read_to_string(path)?;
    parse_batch(&text, table)
}
