//! Benchmarks for layout computation
//!
//! Runs every strategy over synthetic import graphs shaped like a real
//! project: a few entry files fanning out into shared utilities.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use importscope::graph::{EdgeKind, GraphEdge, GraphNode};
use importscope::layout::{LayoutConfig, LayoutEngine, LayoutStrategy};

/// Create a layered test graph with `total_nodes` files
fn create_graph(total_nodes: usize, fan_out: usize) -> (Vec<GraphNode>, Vec<GraphEdge>) {
    let nodes: Vec<GraphNode> = (0..total_nodes)
        .map(|i| GraphNode::file(format!("src/module_{}/file_{}.ts", i % 17, i)))
        .collect();

    let mut edges = Vec::new();
    for (i, node) in nodes.iter().enumerate() {
        for k in 1..=fan_out {
            let target = i * fan_out + k;
            if target >= total_nodes {
                break;
            }
            edges.push(GraphEdge::new(
                node.id.clone(),
                nodes[target].id.clone(),
                EdgeKind::Internal,
            ));
        }
        // a shared utility most files import
        if i > 0 && i % 3 == 0 {
            edges.push(GraphEdge::new(node.id.clone(), nodes[1].id.clone(), EdgeKind::Internal));
        }
    }

    (nodes, edges)
}

/// Benchmark one full layout per strategy
fn bench_strategies(c: &mut Criterion) {
    for strategy in LayoutStrategy::ALL {
        let mut group = c.benchmark_group(format!("layout_{}", strategy));

        for size in [50, 200, 500].iter() {
            let (nodes, edges) = create_graph(*size, 3);
            let config = LayoutConfig::new(strategy, 1200.0, 800.0);

            group.bench_with_input(BenchmarkId::new("nodes", size), size, |b, _| {
                let mut engine = LayoutEngine::new();
                b.iter(|| black_box(engine.compute_layout(&nodes, &edges, &config)));
            });
        }

        group.finish();
    }
}

/// Benchmark a single force tick, the per-frame cost of the preview
fn bench_force_tick(c: &mut Criterion) {
    let mut group = c.benchmark_group("force_tick");

    for size in [50, 200, 500].iter() {
        let (nodes, edges) = create_graph(*size, 3);
        let config = LayoutConfig::new(LayoutStrategy::Force, 1200.0, 800.0).with_seed(1);
        let simulation = LayoutEngine::new().start_force(&nodes, &edges, &config, 0);

        group.bench_with_input(BenchmarkId::new("nodes", size), size, |b, _| {
            b.iter_batched(
                || simulation.clone(),
                |mut sim| black_box(sim.tick()),
                criterion::BatchSize::SmallInput,
            );
        });
    }

    group.finish();
}

criterion_group!(benches, bench_strategies, bench_force_tick);
criterion_main!(benches);
