//! Per-type dispatch statistics for a batch.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::resolver::DispatchOutcome;
use crate::resource_type::ResourceType;

/// Counters for one resource type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TypeMetrics {
    pub dispatches: u32,
    pub total_distance: f64,
    pub failed: u32,
}

impl TypeMetrics {
    /// Mean distance of successful dispatches.
    pub fn avg_distance(&self) -> f64 {
        if self.dispatches == 0 {
            0.0
        } else {
            self.total_distance / f64::from(self.dispatches)
        }
    }
}

/// Dispatch statistics keyed by resource type.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DispatchMetrics {
    by_type: BTreeMap<ResourceType, TypeMetrics>,
}

impl DispatchMetrics {
    pub fn record(&mut self, resource: ResourceType, outcome: &DispatchOutcome) {
        let entry = self.by_type.entry(resource).or_default();
        match outcome.distance() {
            Some(d) => {
                entry.dispatches += 1;
                entry.total_distance += d.into_inner();
            }
            None => entry.failed += 1,
        }
    }

    pub fn get(&self, resource: ResourceType) -> TypeMetrics {
        self.by_type.get(&resource).copied().unwrap_or_default()
    }

    pub fn total_dispatches(&self) -> u32 {
        self.by_type.values().map(|m| m.dispatches).sum()
    }

    pub fn total_failed(&self) -> u32 {
        self.by_type.values().map(|m| m.failed).sum()
    }

    pub fn merge(&mut self, other: &DispatchMetrics) {
        for (&resource, m) in &other.by_type {
            let entry = self.by_type.entry(resource).or_default();
            entry.dispatches += m.dispatches;
            entry.total_distance += m.total_distance;
            entry.failed += m.failed;
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (ResourceType, TypeMetrics)> + '_ {
        self.by_type.iter().map(|(&r, &m)| (r, m))
    }
}
