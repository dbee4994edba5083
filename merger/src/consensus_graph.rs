//! Directed sequence graph a component's contigs are threaded onto.
//! Vertices carry DNA substrings; adjacency means concatenation. The
//! graph is acyclic by construction: grafting only ever adds vertices
//! upstream of a source, downstream along a path, or as a branch of an
//! existing vertex, so path enumeration needs no cycle detection.

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;
use std::collections::BTreeMap;

/// One source-to-sink walk. `position_map` maps the end offset of every
/// vertex label in `seq` to its vertex; keys are strictly increasing
/// and the last key equals `seq.len()`.
#[derive(Debug, Clone, Default)]
pub struct GraphPath {
    pub seq: Vec<u8>,
    pub position_map: BTreeMap<usize, NodeIndex>,
}

#[derive(Debug, Clone)]
pub struct ConsensusGraph {
    graph: DiGraph<Vec<u8>, ()>,
    sources: Vec<NodeIndex>,
}

impl ConsensusGraph {
    /// A graph of one vertex holding `seq`, which is the sole source.
    pub fn new(seq: Vec<u8>) -> Self {
        let mut graph = DiGraph::new();
        let root = graph.add_node(seq);
        Self {
            graph,
            sources: vec![root],
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn sources(&self) -> &[NodeIndex] {
        &self.sources
    }

    pub fn label(&self, v: NodeIndex) -> &[u8] {
        &self.graph[v]
    }

    pub fn add_vertex(&mut self, seq: Vec<u8>) -> NodeIndex {
        self.graph.add_node(seq)
    }

    pub fn add_edge(&mut self, from: NodeIndex, to: NodeIndex) {
        self.graph.add_edge(from, to, ());
    }

    /// Register a vertex without in-edges as a path origin.
    pub fn push_source(&mut self, v: NodeIndex) {
        self.sources.push(v);
    }

    pub fn append_label(&mut self, v: NodeIndex, suffix: &[u8]) {
        self.graph[v].extend_from_slice(suffix);
    }

    pub fn prepend_label(&mut self, v: NodeIndex, prefix: &[u8]) {
        self.graph[v].splice(0..0, prefix.iter().copied());
    }

    /// Split the label of `u` at `at`: `u` keeps the prefix, a new
    /// vertex takes the suffix along with all of `u`'s out-edges, and
    /// `u` gains a single edge to the new vertex. Returns the suffix
    /// vertex.
    pub fn split_vertex(&mut self, u: NodeIndex, at: usize) -> NodeIndex {
        let label = &mut self.graph[u];
        assert!(at <= label.len());
        let suffix = label.split_off(at);
        let v = self.graph.add_node(suffix);
        let targets: Vec<_> = self
            .graph
            .neighbors_directed(u, Direction::Outgoing)
            .collect();
        while let Some(edge) = self.graph.first_edge(u, Direction::Outgoing) {
            self.graph.remove_edge(edge);
        }
        for target in targets {
            self.graph.add_edge(v, target, ());
        }
        self.graph.add_edge(u, v, ());
        v
    }

    /// Every source-to-sink path, depth-first from each source in
    /// registration order, children in ascending vertex order.
    pub fn enumerate_paths(&self) -> Vec<GraphPath> {
        let mut paths = vec![];
        for &source in self.sources.iter() {
            self.enumerate_paths_dfs(&mut paths, GraphPath::default(), source);
        }
        paths
    }

    fn enumerate_paths_dfs(&self, paths: &mut Vec<GraphPath>, mut path: GraphPath, v: NodeIndex) {
        path.seq.extend_from_slice(&self.graph[v]);
        path.position_map.insert(path.seq.len(), v);
        let mut children: Vec<_> = self
            .graph
            .neighbors_directed(v, Direction::Outgoing)
            .collect();
        if children.is_empty() {
            paths.push(path);
            return;
        }
        children.sort_unstable();
        for child in children {
            self.enumerate_paths_dfs(paths, path.clone(), child);
        }
    }
}
