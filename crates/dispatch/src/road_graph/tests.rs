use crate::error::DispatchError;
use crate::road_graph::{
    build_graph, checked_distance, dist, CsrGraph, Location, Road, RoadGraph, MAX_ROAD_DISTANCE,
};

fn bundled_roads() -> Vec<Road> {
    vec![
        Road::new(1, 2, 5),
        Road::new(1, 3, 10),
        Road::new(2, 3, 2),
        Road::new(2, 4, 3),
        Road::new(3, 5, 1),
        Road::new(4, 5, 2),
    ]
}

#[test]
fn test_build_graph_is_symmetric() {
    let graph = build_graph(&bundled_roads()).unwrap();
    assert_eq!(graph.location_count(), 5);
    assert_eq!(graph.road_count(), 6);
    for road in bundled_roads() {
        assert_eq!(graph.distance_between(road.a, road.b), Some(dist(road.distance)));
        assert_eq!(graph.distance_between(road.b, road.a), Some(dist(road.distance)));
    }
}

#[test]
fn test_duplicate_road_last_write_wins() {
    let roads = vec![Road::new(7, 8, 40), Road::new(8, 7, 3), Road::new(7, 8, 12)];
    let graph = build_graph(&roads).unwrap();
    assert_eq!(graph.road_count(), 1);
    assert_eq!(graph.distance_between(Location(7), Location(8)), Some(dist(12.0)));
    assert_eq!(graph.distance_between(Location(8), Location(7)), Some(dist(12.0)));
}

#[test]
fn test_insert_road_reports_replaced_distance() {
    let mut graph = RoadGraph::new();
    assert_eq!(graph.insert_road(Location(1), Location(2), dist(9.0)), None);
    assert_eq!(
        graph.insert_road(Location(2), Location(1), dist(4.0)),
        Some(dist(9.0))
    );
}

#[test]
fn test_self_loop_is_stored_once() {
    let graph = build_graph(&[Road::new(3, 3, 6)]).unwrap();
    assert_eq!(graph.location_count(), 1);
    assert_eq!(graph.road_count(), 1);
    assert_eq!(graph.neighbors(Location(3)).count(), 1);
}

#[test]
fn test_out_of_range_distance_fails_whole_build() {
    let roads = vec![Road::new(1, 2, 5), Road::new(2, 3, MAX_ROAD_DISTANCE * 2.0)];
    let err = build_graph(&roads).unwrap_err();
    match err {
        DispatchError::MalformedInput { reason, .. } => {
            assert!(reason.contains("road #2"), "got: {reason}");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_fractional_distances_are_kept() {
    let graph = build_graph(&[Road::new(1, 2, 2.5), Road::new(2, 3, 0.25)]).unwrap();
    assert_eq!(graph.distance_between(Location(1), Location(2)), Some(dist(2.5)));
    assert_eq!(graph.distance_between(Location(3), Location(2)), Some(dist(0.25)));
}

#[test]
fn test_negative_distance_fails_build() {
    let err = build_graph(&[Road::new(1, 2, -0.5)]).unwrap_err();
    assert!(err.to_string().contains("negative"), "got: {err}");
}

#[test]
fn test_checked_distance_rejects_nan_and_infinity() {
    assert!(checked_distance(f64::NAN).is_err());
    assert!(checked_distance(f64::INFINITY).is_err());
    assert!(checked_distance(f64::NEG_INFINITY).is_err());
    assert_eq!(checked_distance(MAX_ROAD_DISTANCE), Ok(dist(MAX_ROAD_DISTANCE)));
}

#[test]
fn test_negative_zero_is_zero() {
    let d = checked_distance(-0.0).unwrap();
    assert_eq!(d, dist(0.0));
    assert_eq!(d.to_string(), "0");
}

#[test]
fn test_empty_road_list_builds_empty_graph() {
    let graph = build_graph(&[]).unwrap();
    assert_eq!(graph.location_count(), 0);
    let csr = graph.to_csr();
    assert_eq!(csr.node_count(), 0);
    assert_eq!(csr.node_offsets, vec![0]);
}

#[test]
fn test_neighbors_of_unknown_location_is_empty() {
    let graph = build_graph(&bundled_roads()).unwrap();
    assert!(!graph.contains(Location(99)));
    assert_eq!(graph.neighbors(Location(99)).count(), 0);
}

#[test]
fn test_csr_node_count() {
    let graph = build_graph(&bundled_roads()).unwrap();
    let csr = CsrGraph::from_road_graph(&graph);
    assert_eq!(csr.node_count(), 5);
    // Every undirected road appears once per direction.
    assert_eq!(csr.edge_count(), 12);
}

#[test]
fn test_csr_nodes_sorted_and_neighbors_sorted() {
    let roads = vec![Road::new(50, 10, 1), Road::new(30, 50, 2), Road::new(10, 30, 3)];
    let csr = build_graph(&roads).unwrap().to_csr();
    assert_eq!(csr.nodes, vec![Location(10), Location(30), Location(50)]);
    for idx in 0..csr.node_count() as u32 {
        let neighbors = csr.neighbors(idx);
        assert!(neighbors.windows(2).all(|w| w[0] < w[1]));
    }
}

#[test]
fn test_csr_weights_match_graph() {
    let graph = build_graph(&bundled_roads()).unwrap();
    let csr = graph.to_csr();
    for idx in 0..csr.node_count() as u32 {
        let from = csr.location(idx);
        for (n, w) in csr.neighbor_weights(idx) {
            let to = csr.location(n);
            assert_eq!(graph.distance_between(from, to), Some(w));
        }
    }
}

#[test]
fn test_csr_layout_is_deterministic() {
    let mut reversed = bundled_roads();
    reversed.reverse();
    let a = build_graph(&bundled_roads()).unwrap().to_csr();
    let b = build_graph(&reversed).unwrap().to_csr();
    assert_eq!(a.nodes, b.nodes);
    assert_eq!(a.node_offsets, b.node_offsets);
    assert_eq!(a.edges, b.edges);
    assert_eq!(a.weights, b.weights);
}

#[test]
fn test_find_node_index() {
    let csr = build_graph(&bundled_roads()).unwrap().to_csr();
    assert_eq!(csr.find_node_index(Location(1)), Some(0));
    assert_eq!(csr.find_node_index(Location(5)), Some(4));
    assert_eq!(csr.find_node_index(Location(6)), None);
}

#[test]
fn test_road_accepts_short_json_field_names() {
    let road: Road = serde_json::from_str(r#"{"u": 1, "v": 2, "d": 5}"#).unwrap();
    assert_eq!(road, Road::new(1, 2, 5));
    let road: Road = serde_json::from_str(r#"{"a": 1, "b": 2, "distance": 0.75}"#).unwrap();
    assert_eq!(road.distance, 0.75);
}
