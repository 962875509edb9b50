pub mod command;
pub mod error;
pub mod graph;
pub mod indexed_pq;
pub mod shortest_path;
pub mod travel;

use std::error::Error;

use crate::graph::Graph;

/// Load the graph stored at `graph_path`.
/// Returns the parsed graph if the operation succeeds, or an `Err` otherwise.
pub fn load_graph(graph_path: &str) -> Result<Graph, Box<dyn Error>> {
    match Graph::parse_from_file(graph_path) {
        Ok(graph) => {
            log::info!("Loaded graph: {}", graph_path);
            Ok(graph)
        }
        Err(err) => {
            log::warn!("Failed to parse graph {}: {}", graph_path, err);
            Err(err.into())
        }
    }
}

/// Default the log level to `warn` unless `RUST_LOG` is set, then initialize the logger
pub fn init_logger() {
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "warn");
    }
    env_logger::init();
}
