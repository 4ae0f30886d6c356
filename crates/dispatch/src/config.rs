//! Dispatch tunables.
//!
//! [`DispatchParams`] gathers the knobs a host may want to change without
//! recompiling: which ledger view the search reads, an optional response
//! distance cutoff, and the type-code table used while parsing batches.

use std::path::Path;

use bevy::log::info;
use bevy::prelude::Resource;
use serde::{Deserialize, Serialize};

use crate::error::DispatchError;
use crate::resolver::ConsumptionPolicy;
use crate::resource_type::TypeCodeTable;
use crate::road_graph::Distance;

/// Outcome value written for a request no unit could serve.
pub const NOT_FOUND: f64 = -1.0;

/// Runtime parameters for parsing and resolving a batch.
#[derive(Resource, Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatchParams {
    pub policy: ConsumptionPolicy,
    /// Units further than this are treated as unavailable. `None` = no limit.
    pub max_response_distance: Option<Distance>,
    pub type_codes: TypeCodeTable,
}

impl DispatchParams {
    pub fn from_json(text: &str) -> Result<Self, DispatchError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Read parameters from a JSON file. Missing fields keep their defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, DispatchError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let params = Self::from_json(&text)?;
        info!(
            "Loaded dispatch params from {}: policy {:?}, cutoff {:?}, {} type codes",
            path.display(),
            params.policy,
            params.max_response_distance,
            params.type_codes.len()
        );
        Ok(params)
    }
}
