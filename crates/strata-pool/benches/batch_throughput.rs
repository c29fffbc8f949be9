use criterion::{black_box, criterion_group, criterion_main, Criterion};
use strata_graph::GeneratorParams;
use strata_pool::{ControllerConfig, GenerationController};

fn batch_bench(c: &mut Criterion) {
    for threads in [1, 4] {
        c.bench_function(&format!("batch_32_graphs_{threads}_threads"), |b| {
            let config = ControllerConfig::new(GeneratorParams::new(5, 3), 32, threads)
                .unwrap()
                .with_seed(42);
            let mut controller = GenerationController::new(config).unwrap();
            b.iter(|| {
                let report = controller
                    .generate(|_| {}, |_, graph| {
                        black_box(graph);
                    })
                    .unwrap();
                black_box(report);
            });
        });
    }
}

criterion_group!(benches, batch_bench);
criterion_main!(benches);
