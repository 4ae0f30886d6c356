//! Nearest available unit search.
//!
//! Dijkstra over the CSR road graph, stopped by an availability predicate
//! instead of a fixed goal: the first settled location holding a unit of the
//! requested type is the nearest such location, because road distances are
//! non-negative. The search only reads the ledger; committing the dispatch is
//! the resolver's job.

use bevy::log::trace;
use num_traits::Zero;

use crate::inventory::UnitAvailability;
use crate::resource_type::ResourceType;
use crate::road_graph::{CsrGraph, Distance, Location};

/// Where the search stopped and how far away that is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnitMatch {
    pub location: Location,
    pub distance: Distance,
}

/// Find the nearest location to `start` with at least one `resource` unit.
///
/// Returns `None` when no reachable location has one. A `start` that is not
/// on the road network can still be served by its own units.
pub fn find_nearest_unit<V: UnitAvailability + ?Sized>(
    csr: &CsrGraph,
    view: &V,
    start: Location,
    resource: ResourceType,
) -> Option<UnitMatch> {
    if view.has_unit(start, resource) {
        return Some(UnitMatch {
            location: start,
            distance: Distance::zero(),
        });
    }

    let start_idx = csr.find_node_index(start)?;

    let (path, distance) = pathfinding::prelude::dijkstra(
        &start_idx,
        |&idx| csr.neighbor_weights(idx),
        |&idx| view.has_unit(csr.location(idx), resource),
    )?;

    // The path always holds at least the start node.
    let found = csr.location(*path.last()?);
    trace!(
        "Nearest {} to {}: {} at distance {} ({} hops)",
        resource,
        start,
        found,
        distance,
        path.len() - 1
    );
    Some(UnitMatch {
        location: found,
        distance,
    })
}

/// [`find_nearest_unit`] with an upper bound on acceptable distance.
///
/// Because the unbounded search already returns the minimum, a match beyond
/// `max_distance` means every other unit is at least as far.
pub fn find_nearest_unit_within<V: UnitAvailability + ?Sized>(
    csr: &CsrGraph,
    view: &V,
    start: Location,
    resource: ResourceType,
    max_distance: Option<Distance>,
) -> Option<UnitMatch> {
    let found = find_nearest_unit(csr, view, start, resource)?;
    match max_distance {
        Some(limit) if found.distance > limit => None,
        _ => Some(found),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inventory::{build_inventory, UnitEntry};
    use crate::road_graph::{build_graph, dist, Road};

    fn bundled_csr() -> CsrGraph {
        build_graph(&[
            Road::new(1, 2, 5),
            Road::new(1, 3, 10),
            Road::new(2, 3, 2),
            Road::new(2, 4, 3),
            Road::new(3, 5, 1),
            Road::new(4, 5, 2),
        ])
        .unwrap()
        .to_csr()
    }

    #[test]
    fn test_unit_at_start_is_distance_zero() {
        let csr = bundled_csr();
        let ledger = build_inventory(&[UnitEntry::new(3, ResourceType::Fire, 1)]);
        let found = find_nearest_unit(&csr, &ledger, Location(3), ResourceType::Fire).unwrap();
        assert_eq!(found, UnitMatch { location: Location(3), distance: dist(0.0) });
    }

    #[test]
    fn test_unit_at_start_off_network_is_distance_zero() {
        let csr = bundled_csr();
        let ledger = build_inventory(&[UnitEntry::new(900, ResourceType::Police, 2)]);
        let found =
            find_nearest_unit(&csr, &ledger, Location(900), ResourceType::Police).unwrap();
        assert_eq!(found.distance, dist(0.0));
    }

    #[test]
    fn test_off_network_start_without_units_finds_nothing() {
        let csr = bundled_csr();
        let ledger = build_inventory(&[UnitEntry::new(1, ResourceType::Police, 2)]);
        assert!(find_nearest_unit(&csr, &ledger, Location(900), ResourceType::Police).is_none());
    }

    #[test]
    fn test_takes_shortest_path_not_fewest_hops() {
        // 1 -> 5: direct hop chain 1-3-5 is 11, but 1-2-3-5 is 8.
        let csr = bundled_csr();
        let ledger = build_inventory(&[UnitEntry::new(5, ResourceType::Police, 1)]);
        let found = find_nearest_unit(&csr, &ledger, Location(1), ResourceType::Police).unwrap();
        assert_eq!(found, UnitMatch { location: Location(5), distance: dist(8.0) });
    }

    #[test]
    fn test_picks_nearest_of_several_holders() {
        let csr = bundled_csr();
        let ledger = build_inventory(&[
            UnitEntry::new(1, ResourceType::Ambulance, 1),
            UnitEntry::new(4, ResourceType::Ambulance, 1),
        ]);
        // From 5: location 4 is 2 away, location 1 is 8 away.
        let found =
            find_nearest_unit(&csr, &ledger, Location(5), ResourceType::Ambulance).unwrap();
        assert_eq!(found.location, Location(4));
        assert_eq!(found.distance, dist(2.0));
    }

    #[test]
    fn test_zero_count_holder_is_skipped() {
        let csr = bundled_csr();
        let ledger = build_inventory(&[
            UnitEntry::new(2, ResourceType::Rescue, 0),
            UnitEntry::new(5, ResourceType::Rescue, 1),
        ]);
        let found = find_nearest_unit(&csr, &ledger, Location(2), ResourceType::Rescue).unwrap();
        assert_eq!(found.location, Location(5));
        assert_eq!(found.distance, dist(3.0));
    }

    #[test]
    fn test_unreachable_component_is_not_found() {
        let csr = build_graph(&[Road::new(1, 2, 1), Road::new(3, 4, 1)])
            .unwrap()
            .to_csr();
        let ledger = build_inventory(&[UnitEntry::new(4, ResourceType::Fire, 3)]);
        assert!(find_nearest_unit(&csr, &ledger, Location(1), ResourceType::Fire).is_none());
    }

    #[test]
    fn test_type_with_no_inventory_is_not_found() {
        let csr = bundled_csr();
        let ledger = build_inventory(&[UnitEntry::new(5, ResourceType::Police, 4)]);
        for start in 1..=5 {
            assert!(
                find_nearest_unit(&csr, &ledger, Location(start), ResourceType::Rescue).is_none()
            );
        }
    }

    #[test]
    fn test_search_does_not_mutate_ledger() {
        let csr = bundled_csr();
        let ledger = build_inventory(&[UnitEntry::new(1, ResourceType::Ambulance, 1)]);
        let before = ledger.clone();
        for _ in 0..3 {
            find_nearest_unit(&csr, &ledger, Location(5), ResourceType::Ambulance);
        }
        assert_eq!(ledger, before);
    }

    #[test]
    fn test_zero_weight_roads() {
        let csr = build_graph(&[Road::new(1, 2, 0), Road::new(2, 3, 0)])
            .unwrap()
            .to_csr();
        let ledger = build_inventory(&[UnitEntry::new(3, ResourceType::Fire, 1)]);
        let found = find_nearest_unit(&csr, &ledger, Location(1), ResourceType::Fire).unwrap();
        assert_eq!(found, UnitMatch { location: Location(3), distance: dist(0.0) });
    }

    #[test]
    fn test_search_against_snapshot_view() {
        let csr = bundled_csr();
        let mut ledger = build_inventory(&[UnitEntry::new(4, ResourceType::Fire, 1)]);
        let snapshot = ledger.snapshot();
        ledger.decrement(Location(4), ResourceType::Fire).unwrap();
        assert!(find_nearest_unit(&csr, &ledger, Location(2), ResourceType::Fire).is_none());
        let found = find_nearest_unit(&csr, &snapshot, Location(2), ResourceType::Fire).unwrap();
        assert_eq!(found.location, Location(4));
    }

    #[test]
    fn test_max_distance_cutoff() {
        let csr = bundled_csr();
        let ledger = build_inventory(&[UnitEntry::new(5, ResourceType::Police, 1)]);
        let near = find_nearest_unit_within(
            &csr,
            &ledger,
            Location(1),
            ResourceType::Police,
            Some(dist(8.0)),
        );
        assert_eq!(near.map(|m| m.distance), Some(dist(8.0)));
        let far = find_nearest_unit_within(
            &csr,
            &ledger,
            Location(1),
            ResourceType::Police,
            Some(dist(7.0)),
        );
        assert!(far.is_none());
    }

    #[test]
    fn test_fractional_path_sum() {
        // 1 -2.5- 2 -0.5- 3 is 3.0; the direct 1 - 3 road is 3.25.
        let csr = build_graph(&[
            Road::new(1, 2, 2.5),
            Road::new(2, 3, 0.5),
            Road::new(1, 3, 3.25),
        ])
        .unwrap()
        .to_csr();
        let ledger = build_inventory(&[UnitEntry::new(3, ResourceType::Fire, 1)]);
        let found = find_nearest_unit(&csr, &ledger, Location(1), ResourceType::Fire).unwrap();
        assert_eq!(found, UnitMatch { location: Location(3), distance: dist(3.0) });
    }

    #[test]
    fn test_repeated_searches_agree_on_ties() {
        // 2 and 4 are both 1 away from 3.
        let csr = build_graph(&[Road::new(2, 3, 1), Road::new(3, 4, 1)])
            .unwrap()
            .to_csr();
        let ledger = build_inventory(&[
            UnitEntry::new(2, ResourceType::Ambulance, 1),
            UnitEntry::new(4, ResourceType::Ambulance, 1),
        ]);
        let first =
            find_nearest_unit(&csr, &ledger, Location(3), ResourceType::Ambulance).unwrap();
        for _ in 0..20 {
            let again =
                find_nearest_unit(&csr, &ledger, Location(3), ResourceType::Ambulance).unwrap();
            assert_eq!(again, first);
        }
        assert_eq!(first.distance, dist(1.0));
    }
}
