use criterion::{black_box, criterion_group, criterion_main, Criterion};
use strata_core::RngHandle;
use strata_graph::{GeneratorParams, LayeredGraphGenerator};

fn generate_bench(c: &mut Criterion) {
    c.bench_function("generate_depth6_fan4", |b| {
        b.iter(|| {
            let rng = RngHandle::from_seed(42);
            let graph = LayeredGraphGenerator::new(GeneratorParams::new(6, 4), rng)
                .generate()
                .unwrap();
            black_box(graph);
        });
    });
}

criterion_group!(benches, generate_bench);
criterion_main!(benches);
