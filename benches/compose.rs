//! Benchmarks for graph composition
//!
//! Composes large synthetic dependency graphs with heavy sharing between
//! packages to keep traversal and deduplication cheap on real projects.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use graph_composer::model::{DependencyEdge, PackageGraph, PackageNode};
use graph_composer::graph::GraphComposer;
use graph_composer::render::to_dot;
use graph_composer::status::{StaticReport, VersionStatusClassifier};

/// Create a layered package graph where every package requires
/// `fan_out` packages of the next layer.
fn create_layered_graph(layers: usize, width: usize, fan_out: usize) -> PackageGraph {
    let mut graph = PackageGraph::new(PackageNode::with_version("root/app", "1.0.0"));

    for layer in 0..layers {
        for i in 0..width {
            graph.add_package(&format!("vendor/pkg-{}-{}", layer, i), Some("1.0.0"));
        }
    }

    for i in 0..width {
        graph.add_dependency("root/app", &format!("vendor/pkg-0-{}", i), DependencyEdge::new("^1.0"));
    }

    for layer in 0..layers.saturating_sub(1) {
        for i in 0..width {
            for k in 0..fan_out {
                graph.add_dependency(
                    &format!("vendor/pkg-{}-{}", layer, i),
                    &format!("vendor/pkg-{}-{}", layer + 1, (i + k) % width),
                    DependencyEdge::new("^1.0"),
                );
            }
        }
    }

    graph
}

fn composer(graph: PackageGraph) -> GraphComposer {
    GraphComposer::new(graph, VersionStatusClassifier::new(".", StaticReport::default()))
}

/// Benchmark full composition
fn bench_compose(c: &mut Criterion) {
    let mut group = c.benchmark_group("compose");

    for width in [10, 50, 100, 200].iter() {
        let composer = composer(create_layered_graph(10, *width, 5));

        group.bench_with_input(BenchmarkId::new("width", width), width, |b, _| {
            b.iter(|| black_box(composer.compose()));
        });
    }

    group.finish();
}

/// Benchmark composition under a depth limit
fn bench_compose_depth_limited(c: &mut Criterion) {
    let mut group = c.benchmark_group("compose_depth_limited");

    for depth in [1, 3, 5].iter() {
        let composer = composer(create_layered_graph(10, 100, 5)).with_max_depth(*depth);

        group.bench_with_input(BenchmarkId::new("depth", depth), depth, |b, _| {
            b.iter(|| black_box(composer.compose()));
        });
    }

    group.finish();
}

/// Benchmark DOT encoding of a composed graph
fn bench_to_dot(c: &mut Criterion) {
    let composition = composer(create_layered_graph(10, 100, 5)).compose();

    c.bench_function("to_dot_1000_packages", |b| {
        b.iter(|| black_box(to_dot(&composition.graph)));
    });
}

criterion_group!(
    benches,
    bench_compose,
    bench_compose_depth_limited,
    bench_to_dot
);
criterion_main!(benches);
