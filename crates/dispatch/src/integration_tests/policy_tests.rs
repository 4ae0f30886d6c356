//! Consumption policies and preview runs on generated batches.

use crate::config::DispatchParams;
use crate::generator::{generate_batch, NetworkShape};
use crate::inventory::{build_inventory, UnitAvailability, UnitEntry};
use crate::resolver::{ConsumptionPolicy, DispatchOutcome, DispatchRequest, DispatchResolver};
use crate::resource_type::ResourceType;
use crate::road_graph::{build_graph, dist, Location, Road};
use crate::test_harness::TestDispatch;

#[test]
fn live_and_snapshot_policies_agree() {
    for seed in 0..30 {
        let batch = generate_batch(seed, &NetworkShape::default());
        let live = batch.run(&DispatchParams::default()).unwrap();
        let snapshot = batch
            .run(&DispatchParams {
                policy: ConsumptionPolicy::Snapshot,
                ..DispatchParams::default()
            })
            .unwrap();
        assert_eq!(live, snapshot, "seed {seed}");
    }
}

#[test]
fn preview_matches_commit_and_restores() {
    for seed in 40..50 {
        let batch = generate_batch(seed, &NetworkShape::new(30, 30));
        let (graph, mut ledger) = batch.build().unwrap();
        let csr = graph.to_csr();
        let resolver = DispatchResolver::new(&csr);
        let pristine = ledger.clone();

        let preview = resolver.preview(&mut ledger, &batch.requests).unwrap();
        assert_eq!(ledger, pristine, "seed {seed}: preview must not commit");

        let committed = resolver.resolve_all(&mut ledger, &batch.requests).unwrap();
        assert_eq!(preview, committed, "seed {seed}");
    }
}

#[test]
fn equal_counts_elsewhere_do_not_confuse_attribution() {
    // Locations 2 and 3 both hold exactly one unit. A request at 1 must
    // take the nearer one (2), and the unit at 3 must survive.
    let graph = build_graph(&[Road::new(1, 2, 1), Road::new(1, 3, 5)]).unwrap();
    let csr = graph.to_csr();
    let mut ledger = build_inventory(&[
        UnitEntry::new(2, ResourceType::Fire, 1),
        UnitEntry::new(3, ResourceType::Fire, 1),
    ]);

    for policy in [ConsumptionPolicy::Live, ConsumptionPolicy::Snapshot] {
        let mut ledger = ledger.clone();
        let outcome = DispatchResolver::new(&csr)
            .with_policy(policy)
            .resolve_one(&mut ledger, DispatchRequest::new(1, ResourceType::Fire))
            .unwrap();
        assert_eq!(
            outcome,
            DispatchOutcome::Dispatched {
                from: Location(2),
                distance: dist(1.0)
            }
        );
        assert_eq!(ledger.available_count(Location(2), ResourceType::Fire), 0);
        assert_eq!(ledger.available_count(Location(3), ResourceType::Fire), 1);
    }

    let outcomes = crate::resolver::resolve_dispatch(
        &graph,
        &mut ledger,
        &[
            DispatchRequest::new(1, ResourceType::Fire),
            DispatchRequest::new(1, ResourceType::Fire),
            DispatchRequest::new(1, ResourceType::Fire),
        ],
    )
    .unwrap();
    let signed: Vec<f64> = outcomes.iter().map(DispatchOutcome::to_signed).collect();
    assert_eq!(signed, vec![1.0, 5.0, -1.0]);
}

#[test]
fn snapshot_policy_through_plugin() {
    let params = DispatchParams {
        policy: ConsumptionPolicy::Snapshot,
        ..DispatchParams::default()
    };
    let mut dispatch = TestDispatch::new()
        .with_params(params)
        .with_road(1, 2, 3)
        .with_road(2, 3, 3)
        .with_units(3, ResourceType::Police, 2);

    dispatch
        .request(1, ResourceType::Police)
        .request(2, ResourceType::Police)
        .request(3, ResourceType::Police)
        .tick();

    assert_eq!(dispatch.signed_outcomes(), vec![6.0, 3.0, -1.0]);
}
