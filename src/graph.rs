use std::{collections::HashMap,
          fmt::Formatter,
          fs::File,
          io::{prelude::*, BufReader},
          num::{ParseFloatError, ParseIntError}};

use serde::Serialize;

use crate::shortest_path::{self, ComputationError, ShortestPathReport};

/// Maximum number of characters in a vertex name
pub const MAX_NAME_LEN: usize = 10;

/// A graph vertex with id and (optional) name.
/// Vertices that never occur in an edge have no name.
#[derive(Debug, Serialize)]
pub struct Vertex {
    pub id: usize,
    pub name: Option<String>,
}

/// A directed half of an undirected graph edge
#[derive(Debug, Clone, Serialize)]
pub struct Edge {
    pub src: usize,
    pub tgt: usize,
    pub weight: f64,
}

/// Read access to a weighted graph as needed by the shortest path computation
pub trait GraphView {
    /// Number of vertices; vertex ids are `0..vertex_count()`
    fn vertex_count(&self) -> usize;

    /// All edges leaving `vertex`
    fn neighbors(&self, vertex: usize) -> &[Edge];
}

/// An undirected graph with named vertices, stored as directed edges sorted by source
/// plus per-vertex offsets into the edge list
#[derive(Debug, Serialize)]
pub struct Graph {
    vertices: Vec<Vertex>,
    edges: Vec<Edge>,
    offsets: Vec<usize>,
    #[serde(skip)]
    ids: HashMap<String, usize>,
    pub num_nodes: usize,
    pub num_edges: usize,
}

/// Whitespace separated token together with its line number
struct Token {
    line_no: usize,
    text: String,
}

impl Graph {
    /// Create a graph with `num_nodes` unnamed vertices and no edges.
    /// Fails if the vertex storage cannot be allocated.
    fn with_num_nodes(num_nodes: usize) -> Result<Self, ParseError> {
        let too_many = || ParseError::InvalidVertexCount(num_nodes as i64);

        let mut vertices = Vec::new();
        vertices.try_reserve_exact(num_nodes).map_err(|_| too_many())?;
        vertices.extend((0..num_nodes).map(|id| Vertex { id, name: None }));

        let num_offsets = num_nodes.checked_add(1).ok_or_else(too_many)?;
        let mut offsets = Vec::new();
        offsets.try_reserve_exact(num_offsets).map_err(|_| too_many())?;
        offsets.resize(num_offsets, 0);

        Ok(Self {
            vertices,
            edges: Vec::new(),
            offsets,
            ids: HashMap::new(),
            num_nodes,
            num_edges: 0,
        })
    }

    /// Parse a graph from a file, see `from_reader` for the format
    pub fn parse_from_file(graph_file_path: &str) -> Result<Self, ParseError> {
        let graph_file = File::open(graph_file_path)?;
        let graph = Self::from_reader(BufReader::new(graph_file))?;

        log::info!("Parsed graph {} with {} nodes and {} edges",
            graph_file_path, graph.num_nodes, graph.num_edges);

        Ok(graph)
    }

    /// Parse a graph from a stream that holds an upper bound for the number of vertices,
    /// followed by `src dest weight` triples that each describe an undirected edge.
    ///
    /// Edges with a non-positive weight and self-loops are skipped. Anything that is not
    /// a complete triple fails the whole parse.
    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self, ParseError> {
        let mut tokens = Vec::new();
        for (i, line) in reader.lines().enumerate() {
            let line = line?;
            tokens.extend(line.split_whitespace().map(|text| Token {
                line_no: i + 1,
                text: text.to_string(),
            }));
        }
        let mut tokens = tokens.into_iter();

        let header = tokens.next()
            .ok_or_else(|| ParseError::Malformed {
                line_no: 0,
                message: "Unexpected EOF while parsing number of nodes".to_string(),
            })?;
        let num_nodes: i64 = header.text.parse()?;
        if num_nodes <= 0 {
            return Err(ParseError::InvalidVertexCount(num_nodes));
        }

        let mut graph = Self::with_num_nodes(num_nodes as usize).map_err(|err| {
            log::warn!("Cannot allocate a graph with {} nodes", num_nodes);
            err
        })?;
        let mut edges = Vec::new();

        while let Some(src) = tokens.next() {
            let line_no = src.line_no;
            let tgt = tokens.next()
                .ok_or_else(|| ParseError::Malformed {
                    line_no,
                    message: "Unexpected EOF while parsing edge target".to_string(),
                })?;
            let weight: f64 = tokens.next()
                .ok_or_else(|| ParseError::Malformed {
                    line_no,
                    message: "Unexpected EOF while parsing edge weight".to_string(),
                })?
                .text
                .parse()?;

            for name in [&src.text, &tgt.text] {
                if name.chars().count() > MAX_NAME_LEN {
                    return Err(ParseError::NameTooLong { line_no, name: name.clone() });
                }
            }

            let valid_weight = weight > 0.0 && weight.is_finite();
            let self_loop = src.text == tgt.text;
            if !valid_weight {
                log::warn!("Invalid weight {} in line {}, ignoring edge", weight, line_no);
            }
            if self_loop {
                log::warn!("Self-loop at {} in line {}, ignoring edge", src.text, line_no);
            }
            if !valid_weight || self_loop {
                continue;
            }

            let src_id = graph.get_or_assign_id(&src.text)?;
            let tgt_id = graph.get_or_assign_id(&tgt.text)?;
            edges.push(Edge { src: src_id, tgt: tgt_id, weight });
            edges.push(Edge { src: tgt_id, tgt: src_id, weight });
        }

        graph.set_edges(edges);

        Ok(graph)
    }

    /// Get the id of vertex `name`, naming the next free vertex if `name` is new
    fn get_or_assign_id(&mut self, name: &str) -> Result<usize, ParseError> {
        if let Some(&id) = self.ids.get(name) {
            return Ok(id);
        }

        let id = self.ids.len();
        if id >= self.num_nodes {
            return Err(ParseError::TooManyVertices(self.num_nodes));
        }
        self.ids.insert(name.to_string(), id);
        self.vertices[id].name = Some(name.to_string());

        Ok(id)
    }

    /// Sort `edges` by source and compute the offsets of every vertex
    fn set_edges(&mut self, mut edges: Vec<Edge>) {
        edges.sort_by_key(|edge| edge.src);

        self.offsets.iter_mut().for_each(|offset| *offset = 0);
        for edge in &edges {
            self.offsets[edge.src + 1] += 1;
        }
        for i in 1..self.offsets.len() {
            self.offsets[i] += self.offsets[i - 1];
        }

        self.num_edges = edges.len();
        self.edges = edges;
    }

    /// Get the number of outgoing edges of the node with id `node_id`.
    /// Unknown ids have no edges.
    pub fn get_out_degree(&self, node_id: usize) -> usize {
        self.neighbors(node_id).len()
    }

    /// Get the id of the vertex called `name`
    pub fn id_of(&self, name: &str) -> Option<usize> {
        self.ids.get(name).copied()
    }

    /// Get the name of the vertex with id `node_id`
    pub fn name_of(&self, node_id: usize) -> Option<&str> {
        self.vertices.get(node_id)
            .and_then(|vertex| vertex.name.as_deref())
    }

    /// Returns `true` if there is a vertex called `name`
    pub fn contains(&self, name: &str) -> bool {
        self.ids.contains_key(name)
    }

    /// Names of all vertices in id order. Unnamed vertices are listed as `" "`.
    pub fn names(&self) -> Vec<String> {
        self.vertices.iter()
            .map(|vertex| vertex.name.clone().unwrap_or_else(|| " ".to_string()))
            .collect()
    }

    /// Get name and edge weight of every neighbour of the vertex called `name`
    pub fn neighbors_by_name(&self, name: &str) -> Result<Vec<(&str, f64)>, ComputationError> {
        let node_id = self.id_of(name)
            .ok_or_else(|| ComputationError::UnknownName { name: name.to_string() })?;

        Ok(self.neighbors(node_id).iter()
            .filter_map(|edge| self.name_of(edge.tgt).map(|tgt| (tgt, edge.weight)))
            .collect())
    }

    /// Compute shortest paths from the vertex called `name` to all other vertices
    pub fn shortest_paths_from(&self, name: &str) -> Result<ShortestPathReport<'_, Graph>, ComputationError> {
        let source = self.id_of(name)
            .ok_or_else(|| ComputationError::UnknownName { name: name.to_string() })?;
        shortest_path::shortest_paths(self, source)
    }
}

impl GraphView for Graph {
    fn vertex_count(&self) -> usize {
        self.num_nodes
    }

    /// Unknown vertices have no edges
    fn neighbors(&self, vertex: usize) -> &[Edge] {
        if vertex >= self.num_nodes {
            return &[];
        }
        &self.edges[self.offsets[vertex]..self.offsets[vertex + 1]]
    }
}

impl std::fmt::Display for Graph {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "------------")?;
        for vertex in &self.vertices {
            write!(f, "{} : < ", vertex.name.as_deref().unwrap_or(" "))?;
            for edge in self.neighbors(vertex.id) {
                write!(f, "{} {:.6} ", self.name_of(edge.tgt).unwrap_or(" "), edge.weight)?;
            }
            writeln!(f, ">")?;
        }
        writeln!(f, "------------")
    }
}

#[derive(Debug)]
pub enum ParseError {
    IO(std::io::Error),
    ParseInt(ParseIntError),
    ParseFloat(ParseFloatError),
    InvalidVertexCount(i64),
    TooManyVertices(usize),
    NameTooLong { line_no: usize, name: String },
    Malformed { line_no: usize, message: String },
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::IO(err) => write!(f, "{}", err),
            Self::ParseInt(err) => write!(f, "{}", err),
            Self::ParseFloat(err) => write!(f, "{}", err),
            Self::InvalidVertexCount(num_nodes) =>
                write!(f, "Number of nodes must be positive, got {}", num_nodes),
            Self::TooManyVertices(num_nodes) =>
                write!(f, "More than {} distinct vertex names", num_nodes),
            Self::NameTooLong { line_no, name } =>
                write!(f, "Vertex name {} in line {} is longer than {} characters",
                       name, line_no, MAX_NAME_LEN),
            Self::Malformed { line_no, message } =>
                write!(f, "{} in line {}", message, line_no),
        }
    }
}

impl std::error::Error for ParseError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match *self {
            Self::IO(ref err) => Some(err),
            Self::ParseInt(ref err) => Some(err),
            Self::ParseFloat(ref err) => Some(err),
            _ => None
        }
    }
}

impl From<std::io::Error> for ParseError {
    fn from(err: std::io::Error) -> Self {
        Self::IO(err)
    }
}

impl From<ParseIntError> for ParseError {
    fn from(err: ParseIntError) -> Self {
        Self::ParseInt(err)
    }
}

impl From<ParseFloatError> for ParseError {
    fn from(err: ParseFloatError) -> Self {
        Self::ParseFloat(err)
    }
}

#[cfg(test)]
mod test {
    use crate::graph::{Graph, GraphView, ParseError};
    use crate::shortest_path::ComputationError;

    fn parse(input: &str) -> Result<Graph, ParseError> {
        Graph::from_reader(input.as_bytes())
    }

    #[test]
    fn test_graph() {
        let graph = Graph::parse_from_file("data/cities.txt").unwrap();

        assert_eq!(graph.num_nodes, 12);
        assert_eq!(graph.num_edges, 2 * 11);
        assert!(graph.contains("Stuttgart"));
        assert!(!graph.contains("Paris"));

        let id = graph.id_of("Stuttgart").unwrap();
        assert_eq!(graph.name_of(id), Some("Stuttgart"));
        assert_eq!(graph.get_out_degree(id), graph.neighbors(id).len());
        for edge in graph.neighbors(id) {
            assert_eq!(edge.src, id);
            assert!(graph.neighbors(edge.tgt).iter()
                .any(|back| back.tgt == id && back.weight == edge.weight));
        }
    }

    #[test]
    fn test_ids_in_order_of_appearance() {
        let graph = parse("4\nA B 1\nB C 2.5\n").unwrap();

        assert_eq!(graph.id_of("A"), Some(0));
        assert_eq!(graph.id_of("B"), Some(1));
        assert_eq!(graph.id_of("C"), Some(2));
        assert_eq!(graph.names(), vec!["A", "B", "C", " "]);
        assert_eq!(graph.vertex_count(), 4);
        assert_eq!(graph.get_out_degree(1), 2);
        assert_eq!(graph.get_out_degree(3), 0);

        let mut nbrs = graph.neighbors_by_name("B").unwrap();
        nbrs.sort_by(|a, b| a.0.cmp(b.0));
        assert_eq!(nbrs, vec![("A", 1.0), ("C", 2.5)]);
    }

    #[test]
    fn test_skipped_edges() {
        let graph = parse("3 A B 0 A A 2 A B -1 B C 1").unwrap();

        assert_eq!(graph.num_edges, 2);
        assert_eq!(graph.id_of("B"), Some(0));
        assert_eq!(graph.id_of("C"), Some(1));
        assert!(!graph.contains("A"));
    }

    #[test]
    fn test_malformed() {
        assert!(matches!(parse("3 A B 1 C"), Err(ParseError::Malformed { line_no: 1, .. })));
        assert!(matches!(parse("3\nA B 1\nC D"), Err(ParseError::Malformed { line_no: 3, .. })));
        assert!(matches!(parse("3 A B x"), Err(ParseError::ParseFloat(_))));
        assert!(matches!(parse(""), Err(ParseError::Malformed { line_no: 0, .. })));
        assert!(matches!(parse("many A B 1"), Err(ParseError::ParseInt(_))));
        assert!(matches!(parse("0 A B 1"), Err(ParseError::InvalidVertexCount(0))));
        assert!(matches!(parse("-2 A B 1"), Err(ParseError::InvalidVertexCount(-2))));
        assert!(matches!(parse("9223372036854775807 A B 1"),
                         Err(ParseError::InvalidVertexCount(i64::MAX))));
        assert!(matches!(parse("2 A B 1 B C 1"), Err(ParseError::TooManyVertices(2))));
        assert!(matches!(parse("2 A Frankfurt_am_Main 1"),
                         Err(ParseError::NameTooLong { line_no: 1, .. })));
    }

    #[test]
    fn test_unknown_ids() {
        let graph = parse("2 A B 1").unwrap();

        assert_eq!(graph.get_out_degree(2), 0);
        assert_eq!(graph.get_out_degree(usize::MAX), 0);
        assert!(graph.neighbors(2).is_empty());
        assert!(graph.neighbors(usize::MAX).is_empty());
        assert_eq!(graph.get_out_degree(0), 1);
    }

    #[test]
    fn test_unknown_name() {
        let graph = parse("2 A B 1").unwrap();
        assert_eq!(graph.neighbors_by_name("C").unwrap_err(),
                   ComputationError::UnknownName { name: "C".to_string() });
    }

    #[test]
    fn test_display() {
        let graph = parse("2 A B 1.5").unwrap();
        assert_eq!(graph.to_string(),
                   "------------\nA : < B 1.500000 >\nB : < A 1.500000 >\n------------\n");
    }
}
