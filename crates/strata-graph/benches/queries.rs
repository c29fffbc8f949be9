use criterion::{black_box, criterion_group, criterion_main, Criterion};
use strata_core::{EdgeKind, RngHandle};
use strata_graph::{canonical_hash, graph_to_json, GeneratorParams, LayeredGraphGenerator};

fn queries_bench(c: &mut Criterion) {
    let graph = LayeredGraphGenerator::new(GeneratorParams::new(6, 4), RngHandle::from_seed(7))
        .generate()
        .unwrap();
    let vertices: Vec<_> = graph.vertices().collect();

    c.bench_function("adjacency_queries", |b| {
        b.iter(|| {
            for pair in vertices.windows(2) {
                black_box(graph.is_adjacent(pair[0], pair[1]).unwrap());
            }
        });
    });

    c.bench_function("color_index", |b| {
        b.iter(|| {
            for kind in EdgeKind::ALL {
                black_box(graph.edges_of_color(kind).len());
            }
        });
    });

    c.bench_function("json_dump", |b| {
        b.iter(|| black_box(graph_to_json(&graph).unwrap()));
    });

    c.bench_function("canonical_hash", |b| {
        b.iter(|| black_box(canonical_hash(&graph)));
    });
}

criterion_group!(benches, queries_bench);
criterion_main!(benches);
