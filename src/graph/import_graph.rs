//! Import graph implementation using petgraph.
//!
//! Provides a directed graph of source files and external packages, built
//! from resolved import edges, with import counts and cycle detection.

use petgraph::algo::{is_cyclic_directed, tarjan_scc};
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;

use crate::analysis::{ResolutionKind, ResolvedEdge};

/// What a graph node stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    /// A scanned project file
    #[default]
    File,
    /// A package referenced by name
    External,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File => write!(f, "file"),
            Self::External => write!(f, "external"),
        }
    }
}

/// The kind of relationship an edge represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeKind {
    /// File-to-file import
    #[default]
    Internal,
    /// File-to-package import
    External,
}

impl fmt::Display for EdgeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Internal => write!(f, "internal"),
            Self::External => write!(f, "external"),
        }
    }
}

/// Represents a node in the import graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphNode {
    /// Project-relative path or package name
    pub id: String,
    /// Display name (file name or package name)
    pub label: String,
    #[serde(rename = "type")]
    pub kind: NodeKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    /// Number of outgoing import edges
    #[serde(default)]
    pub imports: usize,
    /// Number of incoming import edges
    #[serde(default)]
    pub imported_by: usize,
}

impl GraphNode {
    /// Creates a node for a project file; the label is its file name.
    ///
    /// # Example
    ///
    /// ```rust
    /// use importscope::graph::GraphNode;
    ///
    /// let node = GraphNode::file("src/utils/format.ts");
    /// assert_eq!(node.label, "format.ts");
    /// assert_eq!(node.path.as_deref(), Some("src/utils/format.ts"));
    /// ```
    pub fn file(path: impl Into<String>) -> Self {
        let path = path.into();
        let label = path.rsplit('/').next().unwrap_or(&path).to_string();
        Self {
            id: path.clone(),
            label,
            kind: NodeKind::File,
            path: Some(path),
            imports: 0,
            imported_by: 0,
        }
    }

    /// Creates a node for an external package.
    pub fn external(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            id: name.clone(),
            label: name,
            kind: NodeKind::External,
            path: None,
            imports: 0,
            imported_by: 0,
        }
    }

    /// Returns true for package nodes that are not project files.
    pub fn is_external(&self) -> bool {
        self.kind == NodeKind::External
    }
}

/// Represents an edge in the import graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphEdge {
    pub id: String,
    pub from: String,
    pub to: String,
    #[serde(rename = "type")]
    pub kind: EdgeKind,
}

impl GraphEdge {
    /// Creates an edge from `from` to `to`.
    pub fn new(from: impl Into<String>, to: impl Into<String>, kind: EdgeKind) -> Self {
        let from = from.into();
        let to = to.into();
        Self {
            id: format!("{from}->{to}"),
            from,
            to,
            kind,
        }
    }
}

/// Summary counts of one analysis pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphStats {
    pub total_files: usize,
    pub internal_deps: usize,
    pub external_deps: usize,
    pub unresolved_deps: usize,
}

/// Information about a detected import cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleInfo {
    /// Node ids participating in the cycle
    pub nodes: Vec<String>,
}

impl CycleInfo {
    /// Returns a string representation of the cycle path.
    ///
    /// Format: "a -> b -> c -> a"
    pub fn cycle_path(&self) -> String {
        match self.nodes.first() {
            Some(first) => {
                let mut path = self.nodes.join(" -> ");
                path.push_str(" -> ");
                path.push_str(first);
                path
            }
            None => String::new(),
        }
    }

    /// Number of files in the cycle.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// Collects files and resolved edges, then materializes an [`ImportGraph`].
///
/// # Example
///
/// ```rust
/// use importscope::analysis::{ResolutionKind, ResolvedEdge};
/// use importscope::graph::GraphBuilder;
///
/// let mut builder = GraphBuilder::new();
/// builder.add_file("src/a.js");
/// builder.add_file("src/b.js");
/// builder.add_resolved(ResolvedEdge::new("src/a.js", "src/b.js", ResolutionKind::Internal));
/// builder.add_resolved(ResolvedEdge::new("src/a.js", "react", ResolutionKind::External));
///
/// let graph = builder.build();
/// assert_eq!(graph.node_count(), 3);
/// assert_eq!(graph.edge_count(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct GraphBuilder {
    include_external: bool,
    files: Vec<String>,
    seen_files: HashSet<String>,
    resolved: Vec<ResolvedEdge>,
}

impl Default for GraphBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl GraphBuilder {
    /// Creates an empty builder that keeps external packages.
    pub fn new() -> Self {
        Self {
            include_external: true,
            files: Vec::new(),
            seen_files: HashSet::new(),
            resolved: Vec::new(),
        }
    }

    /// Whether external packages become graph nodes.
    pub fn include_external(mut self, include: bool) -> Self {
        self.include_external = include;
        self
    }

    /// Registers a scanned file. Repeated paths are ignored.
    pub fn add_file(&mut self, path: &str) {
        if self.seen_files.insert(path.to_string()) {
            self.files.push(path.to_string());
        }
    }

    /// Records a resolved import.
    ///
    /// Every edge is kept for diagnostics whatever its kind; only internal
    /// and (when enabled) external edges become graph edges.
    pub fn add_resolved(&mut self, edge: ResolvedEdge) {
        self.resolved.push(edge);
    }

    /// Builds the graph. Internal edges whose target was not scanned are kept
    /// only as diagnostics, so every graph edge has both endpoints.
    pub fn build(self) -> ImportGraph {
        let mut graph = ImportGraph::with_capacity(self.files.len(), self.resolved.len());
        graph.total_files = self.files.len();

        for path in &self.files {
            graph.insert_node(GraphNode::file(path.as_str()));
        }

        let mut seen_edges: HashSet<(String, String)> = HashSet::new();
        for edge in self.resolved {
            let edge_kind = match edge.kind {
                ResolutionKind::Internal => Some(EdgeKind::Internal),
                ResolutionKind::External if self.include_external => {
                    if !graph.contains(&edge.to) {
                        graph.insert_node(GraphNode::external(edge.to.as_str()));
                    }
                    Some(EdgeKind::External)
                }
                _ => None,
            };

            if let Some(kind) = edge_kind {
                if graph.contains(&edge.from)
                    && graph.contains(&edge.to)
                    && seen_edges.insert((edge.from.clone(), edge.to.clone()))
                {
                    graph.connect(&edge.from, &edge.to, kind);
                }
            }

            match edge.kind {
                ResolutionKind::Internal => graph.internal.push(edge),
                ResolutionKind::External => graph.external.push(edge),
                ResolutionKind::Unresolved => graph.unresolved.push(edge),
            }
        }

        graph
    }
}

/// A directed graph of import relationships.
///
/// Edges point from the importing file to the imported file or package.
/// Nodes keep their insertion order: scanned files first, then external
/// packages in order of first reference.
#[derive(Debug, Clone, Default)]
pub struct ImportGraph {
    graph: DiGraph<GraphNode, GraphEdge>,
    node_indices: HashMap<String, NodeIndex>,
    total_files: usize,
    internal: Vec<ResolvedEdge>,
    external: Vec<ResolvedEdge>,
    unresolved: Vec<ResolvedEdge>,
}

impl ImportGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty graph with room for `nodes` nodes and `edges` edges.
    pub fn with_capacity(nodes: usize, edges: usize) -> Self {
        Self {
            graph: DiGraph::with_capacity(nodes, edges),
            node_indices: HashMap::with_capacity(nodes),
            ..Self::default()
        }
    }

    fn insert_node(&mut self, node: GraphNode) -> NodeIndex {
        if let Some(&idx) = self.node_indices.get(&node.id) {
            return idx;
        }
        let id = node.id.clone();
        let idx = self.graph.add_node(node);
        self.node_indices.insert(id, idx);
        idx
    }

    fn connect(&mut self, from: &str, to: &str, kind: EdgeKind) {
        let (Some(&from_idx), Some(&to_idx)) = (self.node_indices.get(from), self.node_indices.get(to))
        else {
            return;
        };

        self.graph
            .add_edge(from_idx, to_idx, GraphEdge::new(from, to, kind));
        self.graph[from_idx].imports += 1;
        self.graph[to_idx].imported_by += 1;
    }

    /// Gets a node by id.
    pub fn get_node(&self, id: &str) -> Option<&GraphNode> {
        self.node_indices
            .get(id)
            .and_then(|&idx| self.graph.node_weight(idx))
    }

    /// Returns true if a node with this id exists.
    pub fn contains(&self, id: &str) -> bool {
        self.node_indices.contains_key(id)
    }

    /// All nodes in insertion order.
    pub fn nodes(&self) -> Vec<&GraphNode> {
        self.graph.node_weights().collect()
    }

    /// All edges in insertion order.
    pub fn edges(&self) -> Vec<&GraphEdge> {
        self.graph.edge_weights().collect()
    }

    /// Nodes imported by `id` (outgoing edges).
    pub fn dependencies(&self, id: &str) -> Vec<&GraphNode> {
        self.neighbors(id, Direction::Outgoing)
    }

    /// Nodes importing `id` (incoming edges).
    pub fn dependents(&self, id: &str) -> Vec<&GraphNode> {
        self.neighbors(id, Direction::Incoming)
    }

    fn neighbors(&self, id: &str, direction: Direction) -> Vec<&GraphNode> {
        let Some(&idx) = self.node_indices.get(id) else {
            return Vec::new();
        };

        self.graph
            .edges_directed(idx, direction)
            .filter_map(|edge| {
                let other = match direction {
                    Direction::Outgoing => edge.target(),
                    Direction::Incoming => edge.source(),
                };
                self.graph.node_weight(other)
            })
            .collect()
    }

    /// Returns the number of nodes in the graph.
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Returns the number of edges in the graph.
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// Counts of scanned files and of resolved imports per kind.
    ///
    /// Counts come from the diagnostic lists, so they include imports that
    /// did not become graph edges.
    pub fn stats(&self) -> GraphStats {
        GraphStats {
            total_files: self.total_files,
            internal_deps: self.internal.len(),
            external_deps: self.external.len(),
            unresolved_deps: self.unresolved.len(),
        }
    }

    /// Resolved edges of one kind, including those without graph nodes.
    pub fn diagnostics(&self, kind: ResolutionKind) -> &[ResolvedEdge] {
        match kind {
            ResolutionKind::Internal => &self.internal,
            ResolutionKind::External => &self.external,
            ResolutionKind::Unresolved => &self.unresolved,
        }
    }

    /// Returns true if any import cycle exists.
    pub fn has_cycles(&self) -> bool {
        is_cyclic_directed(&self.graph)
    }

    /// Detects import cycles.
    ///
    /// Uses Tarjan's algorithm; every strongly connected component with more
    /// than one node, or a single node importing itself, is reported.
    pub fn detect_cycles(&self) -> Vec<CycleInfo> {
        let mut cycles = Vec::new();

        for scc in tarjan_scc(&self.graph) {
            let is_cycle = scc.len() > 1 || self.graph.contains_edge(scc[0], scc[0]);
            if !is_cycle {
                continue;
            }

            let mut nodes: Vec<String> = scc
                .iter()
                .filter_map(|&idx| self.graph.node_weight(idx))
                .map(|node| node.id.clone())
                .collect();
            nodes.reverse();
            cycles.push(CycleInfo { nodes });
        }

        cycles
    }

    /// Clones out the node and edge lists handed to the layout engine.
    pub fn to_parts(&self) -> (Vec<GraphNode>, Vec<GraphEdge>) {
        (
            self.graph.node_weights().cloned().collect(),
            self.graph.edge_weights().cloned().collect(),
        )
    }
}
