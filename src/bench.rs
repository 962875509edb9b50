use std::{env, fmt::Write, time::Instant};

use rand::prelude::*;
use serde::Serialize;

use tplan_lib::graph::Graph;
use tplan_lib::shortest_path;

/// Settings for a benchmark run
#[derive(Debug)]
struct BenchSettings {
    num_vertices: usize,
    num_edges: usize,
    max_weight: f64,
    loop_count: usize,
    seed: Option<u64>,
}

#[derive(Debug, Serialize)]
struct BenchResults {
    num_vertices: usize,
    num_edges: usize,
    loop_count: usize,
    avg_millis: f64,
    max_millis: f64,
    avg_settled: f64,
}

/// Generate the text form of a connected random graph with `num_vertices` vertices.
/// The first `num_vertices - 1` edges form a random spanning tree.
fn gen_graph_text(settings: &BenchSettings, rng: &mut StdRng) -> String {
    let n = settings.num_vertices;
    let mut text = format!("{}\n", n);
    for i in 0..settings.num_edges.max(n - 1) {
        let (a, b) = if i + 1 < n {
            (i + 1, rng.gen_range(0..=i))
        } else if n > 1 {
            let a = rng.gen_range(0..n);
            (a, (a + rng.gen_range(1..n)) % n)
        } else {
            break;
        };
        let weight = rng.gen_range(1.0..=settings.max_weight);
        // Writing into a `String` cannot fail
        let _ = writeln!(text, "v{} v{} {:.3}", a, b, weight);
    }
    text
}

fn main() {
    tplan_lib::init_logger();

    let args: Vec<_> = env::args().collect();

    if !args.contains(&"--vertices".to_string()) {
        let err = "Missing required argument: --vertices";
        log::error!("{}", err);
        panic!("{}", err);
    }

    let mut settings = BenchSettings {
        num_vertices: 0,
        num_edges: 0,
        max_weight: 100.0,
        loop_count: 1,
        seed: None,
    };

    let mut i = 1;
    while i < args.len() {
        let value = args.get(i + 1)
            .unwrap_or_else(|| panic!("Missing value for argument: {}", &args[i]));
        match args[i].as_str() {
            "--vertices" => {
                settings.num_vertices = value.parse()
                    .expect("Invalid argument: vertices");
            }
            "--edges" => {
                settings.num_edges = value.parse()
                    .expect("Invalid argument: edges");
            }
            "--max-weight" => {
                settings.max_weight = value.parse()
                    .expect("Invalid argument: max_weight");
            }
            "--loop" => {
                settings.loop_count = value.parse()
                    .expect("Invalid argument: loop_count");
            }
            "--seed" => {
                settings.seed = Some(value.parse()
                    .expect("Invalid argument: seed"));
            }
            _ => {
                panic!("Unknown argument: {}", &args[i]);
            }
        }
        i += 2;
    }

    if settings.num_vertices == 0 || settings.max_weight < 1.0 {
        let err = "Benchmark needs at least one vertex and a maximum weight of at least 1";
        log::error!("{}", err);
        panic!("{}", err);
    }

    log::info!("Benchmarking with the following settings: {:?}", &settings);

    let mut rng = match settings.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let text = gen_graph_text(&settings, &mut rng);
    let graph = Graph::from_reader(text.as_bytes())
        .expect("Failed to parse generated graph");
    log::info!("Generated graph with {} nodes and {} edges", graph.num_nodes, graph.num_edges);

    let mut sum_millis = 0.0;
    let mut max_millis: f64 = 0.0;
    let mut sum_settled = 0;
    for _ in 0..settings.loop_count {
        let source = rng.gen_range(0..graph.num_nodes);

        let start = Instant::now();
        let report = shortest_path::shortest_paths(&graph, source)
            .expect("Invalid source vertex");
        let millis = start.elapsed().as_secs_f64() * 1000.0;

        sum_millis += millis;
        max_millis = max_millis.max(millis);
        sum_settled += (0..graph.num_nodes)
            .filter(|&node_id| report.is_reachable(node_id))
            .count();
    }

    let loops = settings.loop_count.max(1) as f64;
    let bench_results = BenchResults {
        num_vertices: graph.num_nodes,
        num_edges: graph.num_edges / 2,
        loop_count: settings.loop_count,
        avg_millis: sum_millis / loops,
        max_millis,
        avg_settled: sum_settled as f64 / loops,
    };

    log::info!("Benchmark results:\n{:#?}", bench_results);
    match serde_json::to_string_pretty(&bench_results) {
        Ok(json) => println!("{}", json),
        Err(err) => log::error!("Failed to serialize benchmark results: {}", err),
    }
}
