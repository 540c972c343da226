use boxgraph_layout::config::{Config, RouteConfig};
use boxgraph_layout::input::parse_graph;
use boxgraph_layout::render::render_svg;
use boxgraph_layout::{BoxGraph, Viewport, route_graph};
use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use std::hint::black_box;

/// A chain of `blocks` boxes where every fourth block branches forward and
/// every seventh loops back, roughly what a long compiled function looks like.
fn function_source(blocks: usize) -> String {
    let mut out = String::from("{ boxes: [");
    for i in 0..blocks {
        out.push_str(&format!(
            "{{ id: \"b{i}\", lines: [\"mov eax, {i}\", \"cmp eax, ecx\"] }},"
        ));
    }
    out.push_str("], edges: [");
    for i in 0..blocks.saturating_sub(1) {
        out.push_str(&format!("[\"b{}\", \"b{}\"],", i, i + 1));
        if i % 4 == 0 && i + 3 < blocks {
            out.push_str(&format!("[\"b{}\", \"b{}\"],", i, i + 3));
        }
        if i % 7 == 6 && i >= 5 {
            out.push_str(&format!("[\"b{}\", \"b{}\"],", i, i - 5));
        }
    }
    out.push_str("] }");
    out
}

/// `n` boxes where box `i` links to `(i * 7 + 3) % n` and `(i * 13 + 5) % n`.
fn tangle(n: usize) -> BoxGraph<usize, ()> {
    let mut graph = BoxGraph::new();
    for i in 0..n {
        let handle = graph.create_box(i, ()).expect("fresh id");
        if let Some(b) = graph.get_mut(handle) {
            b.set_size(40.0 + (i % 5) as f32 * 20.0, 20.0 + (i % 3) as f32 * 16.0);
        }
    }
    for i in 0..n {
        for j in [(i * 7 + 3) % n, (i * 13 + 5) % n] {
            if i != j {
                graph.link_boxes(&i, &j).expect("known ids");
            }
        }
    }
    graph
}

fn bench_arrange(c: &mut Criterion) {
    let mut group = c.benchmark_group("arrange");
    let config = Config::default();
    for blocks in [16usize, 64, 256] {
        let graph = parse_graph(&function_source(blocks), &config.render).expect("parse failed");
        group.bench_with_input(BenchmarkId::new("function", blocks), &graph, |b, graph| {
            b.iter(|| {
                let mut graph = graph.clone();
                let report = graph.arrange_with(black_box(&config.layout));
                black_box(report.passes);
            });
        });
    }
    for n in [32usize, 128] {
        let graph = tangle(n);
        group.bench_with_input(BenchmarkId::new("tangle", n), &graph, |b, graph| {
            b.iter(|| {
                let mut graph = graph.clone();
                black_box(graph.arrange().pruned_edges);
            });
        });
    }
    group.finish();
}

fn bench_route(c: &mut Criterion) {
    let mut group = c.benchmark_group("route");
    let route_config = RouteConfig::default();
    for n in [32usize, 128] {
        let mut graph = tangle(n);
        graph.arrange();
        let viewport = Viewport::fit(graph.bounds(), 1200.0, 800.0);
        group.bench_with_input(BenchmarkId::from_parameter(n), &graph, |b, graph| {
            b.iter(|| {
                let routes = route_graph(black_box(graph), &viewport, &route_config);
                black_box(routes.len());
            });
        });
    }
    group.finish();
}

fn bench_end_to_end(c: &mut Criterion) {
    let mut group = c.benchmark_group("end_to_end");
    let config = Config::default();
    for blocks in [16usize, 128] {
        let source = function_source(blocks);
        group.bench_with_input(BenchmarkId::from_parameter(blocks), &source, |b, data| {
            b.iter(|| {
                let mut graph = parse_graph(black_box(data), &config.render).expect("parse failed");
                graph.arrange_with(&config.layout);
                let viewport =
                    Viewport::fit(graph.bounds(), config.render.width, config.render.height);
                let routes = route_graph(&graph, &viewport, &config.route);
                let svg = render_svg(
                    &graph,
                    &routes,
                    &viewport,
                    &config.theme,
                    &config.render,
                    None,
                );
                black_box(svg.len());
            });
        });
    }
    group.finish();
}

criterion_group!(
    name = benches;
    config = Criterion::default();
    targets = bench_arrange, bench_route, bench_end_to_end
);
criterion_main!(benches);
