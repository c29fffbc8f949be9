use std::collections::BTreeSet;

use proptest::prelude::*;
use strata_core::{EdgeKind, RngHandle, VertexId};
use strata_graph::{canonical_hash, graph_to_json, GeneratorParams, GraphStore, LayeredGraphGenerator};

fn generate(seed: u64, max_depth: u32, fan_out: u32) -> GraphStore {
    let params = GeneratorParams::new(max_depth, fan_out);
    LayeredGraphGenerator::new(params, RngHandle::from_seed(seed))
        .generate()
        .unwrap()
}

fn unordered(a: VertexId, b: VertexId) -> (VertexId, VertexId) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

fn check_layering(graph: &GraphStore, max_depth: u32) {
    for edge in graph.edges() {
        let from = graph.depth_of(edge.from).unwrap();
        let to = graph.depth_of(edge.to).unwrap();
        match edge.color {
            EdgeKind::Grey => assert_eq!(to, from + 1, "grey edge {}", edge.id),
            EdgeKind::Green => assert_eq!(edge.from, edge.to, "green edge {}", edge.id),
            EdgeKind::Yellow => assert_eq!(to, from + 1, "yellow edge {}", edge.id),
            EdgeKind::Red => assert_eq!(to, from + 2, "red edge {}", edge.id),
        }
    }
    assert!(graph.max_depth() <= max_depth);

    let mut earlier = BTreeSet::new();
    for edge in graph.edges() {
        let pair = unordered(edge.from, edge.to);
        if edge.color == EdgeKind::Yellow {
            assert!(!earlier.contains(&pair), "yellow edge {} duplicates a connection", edge.id);
        }
        earlier.insert(pair);
    }
}

fn check_ids_and_partition(graph: &GraphStore) {
    let vertex_ids: Vec<u64> = graph.vertices().map(|id| id.as_raw()).collect();
    assert_eq!(vertex_ids, (0..graph.vertex_count() as u64).collect::<Vec<_>>());
    let edge_ids: Vec<u64> = graph.edges().map(|edge| edge.id.as_raw()).collect();
    assert_eq!(edge_ids, (0..graph.edge_count() as u64).collect::<Vec<_>>());

    let mut covered = BTreeSet::new();
    let mut total = 0;
    for bucket in graph.layers().values() {
        total += bucket.len();
        covered.extend(bucket.iter().copied());
    }
    assert_eq!(total, graph.vertex_count());
    assert_eq!(covered.len(), graph.vertex_count());
}

proptest! {
    #[test]
    fn generated_graphs_respect_layering(seed in any::<u64>(), max_depth in 0u32..7, fan_out in 0u32..4) {
        let graph = generate(seed, max_depth, fan_out);
        graph.check_invariants().unwrap();
        check_layering(&graph, max_depth);
        check_ids_and_partition(&graph);
        if max_depth > 0 {
            prop_assert_eq!(graph.vertices_at_depth(1).len(), 1);
        }
        prop_assert_eq!(graph.edges_of_color(EdgeKind::Grey).len(), graph.vertex_count().saturating_sub(1));
    }

    #[test]
    fn same_seed_same_graph(seed in any::<u64>(), max_depth in 1u32..6, fan_out in 1u32..4) {
        let first = generate(seed, max_depth, fan_out);
        let second = generate(seed, max_depth, fan_out);
        prop_assert_eq!(canonical_hash(&first), canonical_hash(&second));
        prop_assert_eq!(graph_to_json(&first).unwrap(), graph_to_json(&second).unwrap());
    }
}

#[test]
fn first_layer_always_spawns_full_fan_out() {
    // Layer 1 succeeds with probability 1, so the root always has `fan_out` children.
    for seed in 0..16 {
        let graph = generate(seed, 4, 3);
        assert_eq!(graph.vertices_at_depth(2).len(), 3);
    }
}

#[test]
fn last_layer_never_spawns() {
    for seed in 0..16 {
        let graph = generate(seed, 3, 4);
        let deepest = graph.max_depth();
        assert!(deepest <= 3);
        for vertex in graph.vertices_at_depth(3) {
            let outgoing_grey = graph
                .incident_edges(vertex)
                .unwrap()
                .iter()
                .map(|id| graph.edge(*id).unwrap())
                .filter(|edge| edge.color == EdgeKind::Grey && edge.from == vertex)
                .count();
            assert_eq!(outgoing_grey, 0);
        }
    }
}
