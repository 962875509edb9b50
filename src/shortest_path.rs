use derive_more::{Display, Error};
use serde::Serialize;

use crate::graph::{Graph, GraphView};
use crate::indexed_pq::{Direction, IndexedPriorityQueue, QueueError};

/// Distance of every vertex that cannot be reached from the source
pub const UNREACHABLE: f64 = f64::INFINITY;

#[derive(Debug, Display, Error, PartialEq)]
pub enum ComputationError {
    #[display(fmt = "Invalid source vertex {}", vertex)]
    InvalidSource { vertex: usize },
    #[display(fmt = "Invalid target vertex {}", vertex)]
    InvalidTarget { vertex: usize },
    #[display(fmt = "Unknown vertex name {}", name)]
    UnknownName { name: String },
    #[display(fmt = "Priority queue out of sync: {}", source)]
    Queue { source: QueueError },
}

impl From<QueueError> for ComputationError {
    fn from(err: QueueError) -> Self {
        Self::Queue { source: err }
    }
}

/// A path through the graph together with its total weight.
/// A path to an unreachable vertex has no nodes and weight `UNREACHABLE`.
#[derive(Debug, PartialEq, Serialize)]
pub struct ShortestPath<T = usize> {
    pub nodes: Vec<T>,
    pub dist: f64,
}

impl<T> ShortestPath<T> {
    fn unreachable() -> Self {
        Self {
            nodes: Vec::new(),
            dist: UNREACHABLE,
        }
    }

    /// Returns `true` if the path reaches its target
    pub fn is_reachable(&self) -> bool {
        !self.nodes.is_empty()
    }
}

/// Result of a single source shortest path computation: the distance and the predecessor
/// of every vertex on a shortest path from the source
#[derive(Debug)]
pub struct ShortestPathReport<'g, G: GraphView> {
    graph: &'g G,
    source: usize,
    dist: Vec<f64>,
    pred: Vec<Option<usize>>,
}

/// Compute the shortest distances from `source` to all vertices of `graph` with Dijkstra's
/// algorithm. All edge weights of `graph` must be positive.
pub fn shortest_paths<G: GraphView>(graph: &G, source: usize) -> Result<ShortestPathReport<'_, G>, ComputationError> {
    let num_nodes = graph.vertex_count();
    if source >= num_nodes {
        log::warn!("Invalid source {} for a graph with {} nodes", source, num_nodes);
        return Err(ComputationError::InvalidSource { vertex: source });
    }

    let mut dist = vec![UNREACHABLE; num_nodes];
    let mut pred = vec![None; num_nodes];

    let mut queue = IndexedPriorityQueue::with_capacity(num_nodes, Direction::Min);
    for node_id in 0..num_nodes {
        queue.insert(node_id, UNREACHABLE)?;
    }
    pred[source] = Some(source);
    queue.change_priority(source, 0.0)?;

    let mut num_settled = 0;
    while let Ok((u, dist_u)) = queue.delete_top() {
        // Everything left in the queue is unreachable
        if dist_u == UNREACHABLE {
            break;
        }
        dist[u] = dist_u;
        num_settled += 1;

        for edge in graph.neighbors(u) {
            if let Some(cur_dist) = queue.get_priority(edge.tgt) {
                let new_dist = dist_u + edge.weight;
                if new_dist < cur_dist {
                    queue.change_priority(edge.tgt, new_dist)?;
                    pred[edge.tgt] = Some(u);
                }
            }
        }
    }

    log::debug!("Computed shortest paths from {}, settled {} of {} nodes",
        source, num_settled, num_nodes);

    Ok(ShortestPathReport {
        graph,
        source,
        dist,
        pred,
    })
}

impl<'g, G: GraphView> ShortestPathReport<'g, G> {
    /// The graph this report was computed on
    pub fn graph(&self) -> &'g G {
        self.graph
    }

    pub fn source(&self) -> usize {
        self.source
    }

    /// Shortest distances from the source, indexed by vertex
    pub fn distances(&self) -> &[f64] {
        &self.dist
    }

    /// Predecessors on the shortest paths, indexed by vertex.
    /// The source is its own predecessor, unreachable vertices have none.
    pub fn predecessors(&self) -> &[Option<usize>] {
        &self.pred
    }

    /// Get the shortest distance from the source to `node_id`
    pub fn distance(&self, node_id: usize) -> Option<f64> {
        self.dist.get(node_id).copied()
    }

    pub fn predecessor(&self, node_id: usize) -> Option<usize> {
        self.pred.get(node_id).copied().flatten()
    }

    /// Returns `true` if there is a path from the source to `node_id`
    pub fn is_reachable(&self, node_id: usize) -> bool {
        self.predecessor(node_id).is_some()
    }

    /// Get the vertex following `node_id` on its shortest path towards the source.
    /// Returns `None` for the source itself and for unreachable vertices.
    pub fn next_hop(&self, node_id: usize) -> Option<usize> {
        self.predecessor(node_id)
            .filter(|&pred| pred != node_id)
    }

    /// Get the shortest path from `node_id` back to the source
    pub fn route_from(&self, node_id: usize) -> Result<ShortestPath, ComputationError> {
        if node_id >= self.dist.len() {
            return Err(ComputationError::InvalidTarget { vertex: node_id });
        }
        if !self.is_reachable(node_id) {
            return Ok(ShortestPath::unreachable());
        }

        let mut nodes = vec![node_id];
        let mut cur = node_id;
        while let Some(pred) = self.next_hop(cur) {
            nodes.push(pred);
            cur = pred;
        }

        Ok(ShortestPath {
            nodes,
            dist: self.dist[node_id],
        })
    }

    /// Get the shortest path from the source to `target`
    pub fn path_to(&self, target: usize) -> Result<ShortestPath, ComputationError> {
        let mut path = self.route_from(target)?;
        path.nodes.reverse();
        Ok(path)
    }
}

impl<'g> ShortestPathReport<'g, Graph> {
    /// Get the shortest path from the source to the vertex called `target` by vertex names
    pub fn path_names_to(&self, target: &str) -> Result<ShortestPath<&'g str>, ComputationError> {
        let path = self.path_to(self.resolve(target)?)?;
        Ok(self.with_names(path))
    }

    /// Get the shortest path from the vertex called `name` back to the source by vertex names
    pub fn route_names_from(&self, name: &str) -> Result<ShortestPath<&'g str>, ComputationError> {
        let path = self.route_from(self.resolve(name)?)?;
        Ok(self.with_names(path))
    }

    fn resolve(&self, name: &str) -> Result<usize, ComputationError> {
        self.graph.id_of(name)
            .ok_or_else(|| ComputationError::UnknownName { name: name.to_string() })
    }

    fn with_names(&self, path: ShortestPath) -> ShortestPath<&'g str> {
        let graph = self.graph;
        ShortestPath {
            nodes: path.nodes.iter()
                .map(|&node_id| graph.name_of(node_id).unwrap_or(" "))
                .collect(),
            dist: path.dist,
        }
    }
}
