//! Per-location, per-type unit counts.
//!
//! [`InventoryLedger`] is the live ledger for one batch. Callers read it
//! through [`UnitAvailability`] and change it only through
//! [`InventoryLedger::decrement`]; the underlying maps stay private.

use std::collections::BTreeMap;

use bevy::prelude::Resource;
use serde::{Deserialize, Serialize};

use crate::error::DispatchError;
use crate::resource_type::ResourceType;
use crate::road_graph::Location;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// One inventory row: `count` units of `resource` stationed at `location`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitEntry {
    pub location: Location,
    pub resource: ResourceType,
    pub count: u32,
}

impl UnitEntry {
    pub fn new(location: u32, resource: ResourceType, count: u32) -> Self {
        Self {
            location: Location(location),
            resource,
            count,
        }
    }
}

type Counts = BTreeMap<Location, BTreeMap<ResourceType, u32>>;

/// Read-only view of unit availability, used by the nearest-unit search.
pub trait UnitAvailability {
    fn available_count(&self, location: Location, resource: ResourceType) -> u32;

    fn has_unit(&self, location: Location, resource: ResourceType) -> bool {
        self.available_count(location, resource) > 0
    }
}

/// Live unit counts for one dispatch batch.
#[derive(Resource, Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryLedger {
    counts: Counts,
}

/// Frozen copy of a ledger. Independent of the ledger it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InventorySnapshot {
    counts: Counts,
}

// ---------------------------------------------------------------------------
// Ledger
// ---------------------------------------------------------------------------

/// Build a ledger from inventory rows. A later row for the same
/// (location, type) overwrites the earlier count; rows are not summed.
pub fn build_inventory(entries: &[UnitEntry]) -> InventoryLedger {
    let mut counts = Counts::new();
    for entry in entries {
        counts
            .entry(entry.location)
            .or_default()
            .insert(entry.resource, entry.count);
    }
    InventoryLedger { counts }
}

impl InventoryLedger {
    /// Remove one unit of `resource` from `location`, returning what is left.
    pub fn decrement(
        &mut self,
        location: Location,
        resource: ResourceType,
    ) -> Result<u32, DispatchError> {
        let slot = self
            .counts
            .get_mut(&location)
            .and_then(|by_type| by_type.get_mut(&resource))
            .filter(|count| **count > 0)
            .ok_or(DispatchError::InsufficientInventory { location, resource })?;
        *slot -= 1;
        Ok(*slot)
    }

    pub fn snapshot(&self) -> InventorySnapshot {
        InventorySnapshot {
            counts: self.counts.clone(),
        }
    }

    /// Replace the whole ledger state with `snapshot`.
    pub fn restore(&mut self, snapshot: &InventorySnapshot) {
        self.counts = snapshot.counts.clone();
    }

    /// Units of `resource` left across every location.
    pub fn total_available(&self, resource: ResourceType) -> u64 {
        self.counts
            .values()
            .filter_map(|by_type| by_type.get(&resource))
            .map(|&c| c as u64)
            .sum()
    }

    /// Locations that have (or had) any inventory row.
    pub fn locations(&self) -> impl Iterator<Item = Location> + '_ {
        self.counts.keys().copied()
    }

    /// Per-type counts at one location, zero-count types included.
    pub fn counts_at(&self, location: Location) -> impl Iterator<Item = (ResourceType, u32)> + '_ {
        self.counts
            .get(&location)
            .into_iter()
            .flat_map(|by_type| by_type.iter().map(|(&r, &c)| (r, c)))
    }
}

impl UnitAvailability for InventoryLedger {
    fn available_count(&self, location: Location, resource: ResourceType) -> u32 {
        lookup(&self.counts, location, resource)
    }
}

impl UnitAvailability for InventorySnapshot {
    fn available_count(&self, location: Location, resource: ResourceType) -> u32 {
        lookup(&self.counts, location, resource)
    }
}

fn lookup(counts: &Counts, location: Location, resource: ResourceType) -> u32 {
    counts
        .get(&location)
        .and_then(|by_type| by_type.get(&resource))
        .copied()
        .unwrap_or(0)
}
