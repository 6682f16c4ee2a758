//! Layout engine for import graphs.
//!
//! Given graph nodes and edges, a viewport and a [`LayoutStrategy`], the
//! engine classifies every node, drops the ones hidden by the
//! [`VisibilityFilter`], estimates the virtual canvas width needed to keep
//! labels apart, and places the remaining nodes.
//!
//! Four strategies are available:
//!
//! - **Hierarchical**: breadth-first depth layers from the import roots
//! - **Circular**: concentric rings ordered by importance
//! - **Tree**: rooted trees with width-proportional subtrees
//! - **Force**: a seeded grid refined by an externally driven
//!   [`ForceSimulation`]
//!
//! # Example
//!
//! ```rust
//! use importscope::graph::{EdgeKind, GraphEdge, GraphNode};
//! use importscope::layout::{LayoutConfig, LayoutEngine, LayoutStrategy};
//!
//! let nodes = vec![GraphNode::file("a.js"), GraphNode::file("b.js")];
//! let edges = vec![GraphEdge::new("a.js", "b.js", EdgeKind::Internal)];
//! let config = LayoutConfig::new(LayoutStrategy::Hierarchical, 800.0, 600.0);
//!
//! let layout = LayoutEngine::new().compute_layout(&nodes, &edges, &config);
//! assert_eq!(layout.positions.len(), 2);
//! assert!(layout.positions["a.js"].y < layout.positions["b.js"].y);
//! ```

mod circular;
pub mod force;
mod hierarchical;
pub mod measure;
mod session;
mod tree;

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::graph::{classify_all, Category, ClassifiedNode, GraphEdge, GraphNode};

pub use force::{Bounds, ForceParams, ForceSimulation, MAX_TICKS};
pub use measure::{Font, LabelMeasurer};
pub use session::LayoutSession;

/// Horizontal gap kept between neighbouring labels.
pub const LABEL_PADDING: f32 = 24.0;
/// Labels are never measured wider than this.
pub const MAX_LABEL_WIDTH: f32 = 180.0;

/// Nodes per pseudo-layer when estimating hierarchical/force canvas width.
const WIDTH_ESTIMATE_CHUNK: usize = 8;

/// The layout algorithm to apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutStrategy {
    #[default]
    Hierarchical,
    Circular,
    Tree,
    Force,
}

impl LayoutStrategy {
    pub const ALL: [LayoutStrategy; 4] = [
        LayoutStrategy::Hierarchical,
        LayoutStrategy::Circular,
        LayoutStrategy::Tree,
        LayoutStrategy::Force,
    ];
}

impl fmt::Display for LayoutStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Hierarchical => write!(f, "hierarchical"),
            Self::Circular => write!(f, "circular"),
            Self::Tree => write!(f, "tree"),
            Self::Force => write!(f, "force"),
        }
    }
}

impl FromStr for LayoutStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "hierarchical" | "layered" => Ok(Self::Hierarchical),
            "circular" | "radial" => Ok(Self::Circular),
            "tree" => Ok(Self::Tree),
            "force" => Ok(Self::Force),
            _ => Err(format!(
                "Unknown layout strategy: '{}'. Valid strategies: hierarchical, circular, tree, force",
                s
            )),
        }
    }
}

/// Decides which classified nodes take part in a layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VisibilityFilter {
    pub hidden_categories: BTreeSet<Category>,
    pub show_external: bool,
}

impl Default for VisibilityFilter {
    fn default() -> Self {
        Self {
            hidden_categories: BTreeSet::new(),
            show_external: true,
        }
    }
}

impl VisibilityFilter {
    /// Returns true if `node` should be laid out.
    pub fn allows(&self, node: &ClassifiedNode<'_>) -> bool {
        if node.node.is_external() && !self.show_external {
            return false;
        }
        !self.hidden_categories.contains(&node.category)
    }

    /// Hides every node of `category`.
    pub fn hide(mut self, category: Category) -> Self {
        self.hidden_categories.insert(category);
        self
    }
}

/// Everything a layout run depends on besides the graph itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutConfig {
    pub strategy: LayoutStrategy,
    pub viewport_width: f32,
    pub viewport_height: f32,
    #[serde(default)]
    pub filter: VisibilityFilter,
    /// Seed for the force strategy's initial jitter
    #[serde(default)]
    pub seed: u64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self::new(LayoutStrategy::default(), 1200.0, 800.0)
    }
}

impl LayoutConfig {
    /// Creates a config with no filtering and seed 0.
    pub fn new(strategy: LayoutStrategy, viewport_width: f32, viewport_height: f32) -> Self {
        Self {
            strategy,
            viewport_width,
            viewport_height,
            filter: VisibilityFilter::default(),
            seed: 0,
        }
    }

    pub fn with_filter(mut self, filter: VisibilityFilter) -> Self {
        self.filter = filter;
        self
    }

    /// Seed for the force layout's starting jitter.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

/// Position of one node. `vx`/`vy` are only non-zero during force refinement.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct NodePosition {
    pub x: f32,
    pub y: f32,
    pub radius: f32,
    pub vx: f32,
    pub vy: f32,
}

impl NodePosition {
    /// A position at rest.
    pub fn at(x: f32, y: f32, radius: f32) -> Self {
        Self {
            x,
            y,
            radius,
            vx: 0.0,
            vy: 0.0,
        }
    }
}

/// Node id to position, ordered by id.
pub type PositionMap = BTreeMap<String, NodePosition>;

/// The result of a layout run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Layout {
    pub strategy: LayoutStrategy,
    /// Width of the coordinate space; may exceed the viewport
    pub width: f32,
    pub height: f32,
    pub positions: PositionMap,
}

impl Layout {
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// True when the coordinate space is wider than `viewport_width` and
    /// the presenter has to offer horizontal panning.
    pub fn needs_panning(&self, viewport_width: f32) -> bool {
        self.width > viewport_width
    }
}

/// Available drawing area for one strategy run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Canvas {
    pub width: f32,
    pub height: f32,
}

/// Strategy output: one point per [`LayoutGraph`] node, plus the extent used.
#[derive(Debug, Clone, Default)]
pub(crate) struct Placement {
    pub points: Vec<(f32, f32)>,
    pub width: f32,
    pub height: f32,
}

#[derive(Debug, Clone)]
pub(crate) struct LayoutNode {
    pub id: String,
    pub label_width: f32,
    pub radius: f32,
    pub importance: f32,
}

/// Filtered, index-based view of the graph that the strategies work on.
#[derive(Debug, Clone, Default)]
pub(crate) struct LayoutGraph {
    pub nodes: Vec<LayoutNode>,
    /// `(from, to)` node indices
    pub edges: Vec<(usize, usize)>,
    pub outgoing: Vec<Vec<usize>>,
    pub incoming: Vec<Vec<usize>>,
}

impl LayoutGraph {
    /// Builds adjacency lists; self-loops are dropped from them.
    pub fn new(nodes: Vec<LayoutNode>, edges: Vec<(usize, usize)>) -> Self {
        let mut outgoing = vec![Vec::new(); nodes.len()];
        let mut incoming = vec![Vec::new(); nodes.len()];
        for &(from, to) in &edges {
            if from == to {
                continue;
            }
            outgoing[from].push(to);
            incoming[to].push(from);
        }

        Self {
            nodes,
            edges,
            outgoing,
            incoming,
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Mean measured label width, 0 for an empty graph.
    pub fn average_label_width(&self) -> f32 {
        if self.nodes.is_empty() {
            return 0.0;
        }
        self.nodes.iter().map(|n| n.label_width).sum::<f32>() / self.nodes.len() as f32
    }
}

/// Estimates the canvas width a strategy needs to keep labels from
/// overlapping; never less than `viewport_width`.
pub(crate) fn estimate_virtual_width(
    graph: &LayoutGraph,
    strategy: LayoutStrategy,
    viewport_width: f32,
) -> f32 {
    if graph.is_empty() {
        return viewport_width;
    }

    let estimate = match strategy {
        // Approximates layers by chunking in insertion order; the real layers
        // are only known once the strategy runs.
        LayoutStrategy::Hierarchical | LayoutStrategy::Force => graph
            .nodes
            .chunks(WIDTH_ESTIMATE_CHUNK)
            .map(|chunk| {
                chunk.iter().map(|n| n.label_width).sum::<f32>()
                    + LABEL_PADDING * (chunk.len() + 1) as f32
            })
            .fold(0.0, f32::max),
        LayoutStrategy::Circular => {
            let circumference: f32 = graph
                .nodes
                .iter()
                .map(|n| n.label_width + LABEL_PADDING)
                .sum();
            circumference / std::f32::consts::PI + 2.0 * circular::MARGIN
        }
        LayoutStrategy::Tree => (graph.len() as f32).sqrt() * graph.average_label_width(),
    };

    estimate.max(viewport_width)
}

/// Computes node positions for import graphs.
#[derive(Debug, Clone, Default)]
pub struct LayoutEngine {
    measurer: LabelMeasurer,
}

impl LayoutEngine {
    /// Creates an engine measuring labels with the default font.
    ///
    /// # Example
    ///
    /// ```
    /// use importscope::graph::{EdgeKind, GraphEdge, GraphNode};
    /// use importscope::layout::{LayoutConfig, LayoutEngine, LayoutStrategy};
    ///
    /// let nodes = vec![GraphNode::file("src/main.js"), GraphNode::file("src/util.js")];
    /// let edges = vec![GraphEdge::new("src/main.js", "src/util.js", EdgeKind::Internal)];
    /// let config = LayoutConfig::new(LayoutStrategy::Hierarchical, 800.0, 600.0);
    ///
    /// let layout = LayoutEngine::new().compute_layout(&nodes, &edges, &config);
    /// let (main, util) = (&layout.positions["src/main.js"], &layout.positions["src/util.js"]);
    /// assert!(main.y < util.y);
    /// ```
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an engine measuring labels with `font`.
    pub fn with_font(font: Font) -> Self {
        Self {
            measurer: LabelMeasurer::new(font),
        }
    }

    /// The label measurer and its cache.
    pub fn measurer(&self) -> &LabelMeasurer {
        &self.measurer
    }

    /// Classifies, filters and measures the graph.
    pub(crate) fn prepare(
        &mut self,
        nodes: &[GraphNode],
        edges: &[GraphEdge],
        filter: &VisibilityFilter,
    ) -> LayoutGraph {
        let classified = classify_all(nodes, edges);

        let mut layout_nodes = Vec::new();
        let mut index: HashMap<&str, usize> = HashMap::new();
        for node in classified.iter().filter(|c| filter.allows(c)) {
            if index.contains_key(node.node.id.as_str()) {
                continue;
            }
            index.insert(node.node.id.as_str(), layout_nodes.len());
            layout_nodes.push(LayoutNode {
                id: node.node.id.clone(),
                label_width: self.measurer.measure(&node.node.label, MAX_LABEL_WIDTH),
                radius: node.radius,
                importance: node.importance,
            });
        }

        let layout_edges = edges
            .iter()
            .filter_map(|e| Some((*index.get(e.from.as_str())?, *index.get(e.to.as_str())?)))
            .collect();

        LayoutGraph::new(layout_nodes, layout_edges)
    }

    /// Computes a layout without touching the inputs.
    ///
    /// For [`LayoutStrategy::Force`] this returns the seeded starting grid;
    /// refine it with [`LayoutEngine::start_force`] or a [`LayoutSession`].
    pub fn compute_layout(
        &mut self,
        nodes: &[GraphNode],
        edges: &[GraphEdge],
        config: &LayoutConfig,
    ) -> Layout {
        let graph = self.prepare(nodes, edges, &config.filter);
        if graph.is_empty() {
            return Layout {
                strategy: config.strategy,
                width: config.viewport_width,
                height: config.viewport_height,
                positions: PositionMap::new(),
            };
        }

        let width = estimate_virtual_width(&graph, config.strategy, config.viewport_width);
        let canvas = Canvas {
            width,
            height: config.viewport_height,
        };
        debug!(
            strategy = %config.strategy,
            nodes = graph.len(),
            edges = graph.edges.len(),
            virtual_width = width,
            "computing layout"
        );

        let placement = match config.strategy {
            LayoutStrategy::Hierarchical => hierarchical::layout(&graph, canvas),
            LayoutStrategy::Circular => circular::layout(&graph, canvas),
            LayoutStrategy::Tree => tree::layout(&graph, canvas),
            LayoutStrategy::Force => {
                let simulation = ForceSimulation::new(&graph, canvas, config.seed, 0);
                return simulation.layout();
            }
        };

        let positions = graph
            .nodes
            .iter()
            .zip(&placement.points)
            .map(|(node, &(x, y))| (node.id.clone(), NodePosition::at(x, y, node.radius)))
            .collect();

        Layout {
            strategy: config.strategy,
            width: placement.width.max(width),
            height: placement.height.max(config.viewport_height),
            positions,
        }
    }

    /// Prepares a force simulation for the graph; the caller drives it with
    /// [`ForceSimulation::tick`].
    pub fn start_force(
        &mut self,
        nodes: &[GraphNode],
        edges: &[GraphEdge],
        config: &LayoutConfig,
        data_version: u64,
    ) -> ForceSimulation {
        let graph = self.prepare(nodes, edges, &config.filter);
        let width = estimate_virtual_width(&graph, LayoutStrategy::Force, config.viewport_width);
        let canvas = Canvas {
            width,
            height: config.viewport_height,
        };
        ForceSimulation::new(&graph, canvas, config.seed, data_version)
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::graph;
    use super::*;
    use crate::graph::{EdgeKind, GraphEdge, GraphNode};

    fn sample() -> (Vec<GraphNode>, Vec<GraphEdge>) {
        let (mut nodes, mut edges) = graph(
            &["main.js", "app.js", "util.js", "api.js", "package.json"],
            &[
                ("main.js", "app.js"),
                ("app.js", "util.js"),
                ("app.js", "api.js"),
                ("api.js", "util.js"),
                ("api.js", "axios"),
            ],
        );
        nodes.push(GraphNode::external("axios"));
        edges.last_mut().unwrap().kind = EdgeKind::External;
        (nodes, edges)
    }

    #[test]
    fn test_every_visible_node_gets_one_position() {
        let (nodes, edges) = sample();
        let mut engine = LayoutEngine::new();
        for strategy in LayoutStrategy::ALL {
            let layout =
                engine.compute_layout(&nodes, &edges, &LayoutConfig::new(strategy, 800.0, 600.0));
            assert_eq!(layout.positions.len(), nodes.len(), "{strategy}");
            for edge in &edges {
                assert!(layout.positions.contains_key(&edge.from), "{strategy}");
                assert!(layout.positions.contains_key(&edge.to), "{strategy}");
            }
            for pos in layout.positions.values() {
                assert!(pos.x.is_finite() && pos.y.is_finite(), "{strategy}");
            }
        }
    }

    #[test]
    fn test_filter_removes_nodes_and_edges() {
        let (nodes, edges) = sample();
        let filter = VisibilityFilter {
            show_external: false,
            ..VisibilityFilter::default()
        }
        .hide(Category::Config);
        let config = LayoutConfig::new(LayoutStrategy::Circular, 800.0, 600.0).with_filter(filter);

        let layout = LayoutEngine::new().compute_layout(&nodes, &edges, &config);
        assert_eq!(layout.positions.len(), 4);
        assert!(!layout.positions.contains_key("axios"));
        assert!(!layout.positions.contains_key("package.json"));
    }

    #[test]
    fn test_empty_graph_gives_empty_map() {
        for strategy in LayoutStrategy::ALL {
            let layout = LayoutEngine::new().compute_layout(
                &[],
                &[],
                &LayoutConfig::new(strategy, 640.0, 480.0),
            );
            assert!(layout.is_empty());
            assert_eq!(layout.width, 640.0);
        }
    }

    #[test]
    fn test_non_force_layouts_are_idempotent() {
        let (nodes, edges) = sample();
        let mut engine = LayoutEngine::new();
        for strategy in [
            LayoutStrategy::Hierarchical,
            LayoutStrategy::Circular,
            LayoutStrategy::Tree,
        ] {
            let config = LayoutConfig::new(strategy, 800.0, 600.0);
            let first = engine.compute_layout(&nodes, &edges, &config);
            let second = LayoutEngine::new().compute_layout(&nodes, &edges, &config);
            assert_eq!(first, second, "{strategy}");
        }
    }

    #[test]
    fn test_force_initialization_is_seeded() {
        let (nodes, edges) = sample();
        let config = LayoutConfig::new(LayoutStrategy::Force, 800.0, 600.0).with_seed(7);
        let a = LayoutEngine::new().compute_layout(&nodes, &edges, &config);
        let b = LayoutEngine::new().compute_layout(&nodes, &edges, &config);
        assert_eq!(a, b);

        let other = LayoutEngine::new().compute_layout(&nodes, &edges, &config.clone().with_seed(8));
        assert_ne!(a.positions, other.positions);
    }

    #[test]
    fn test_inputs_untouched() {
        let (nodes, edges) = sample();
        let before = (nodes.clone(), edges.clone());
        LayoutEngine::new().compute_layout(&nodes, &edges, &LayoutConfig::default());
        assert_eq!(before, (nodes, edges));
    }

    #[test]
    fn test_virtual_width_never_below_viewport() {
        let (nodes, edges) = graph(&["a.js"], &[]);
        let mut engine = LayoutEngine::new();
        let prepared = engine.prepare(&nodes, &edges, &VisibilityFilter::default());
        for strategy in LayoutStrategy::ALL {
            assert_eq!(estimate_virtual_width(&prepared, strategy, 900.0), 900.0);
        }
    }

    #[test]
    fn test_wide_layer_expands_virtual_width() {
        let ids: Vec<String> = (0..40).map(|i| format!("components/Widget{i:02}.tsx")).collect();
        let id_refs: Vec<&str> = ids.iter().map(String::as_str).collect();
        let (nodes, edges) = graph(&id_refs, &[]);

        let config = LayoutConfig::new(LayoutStrategy::Hierarchical, 400.0, 600.0);
        let layout = LayoutEngine::new().compute_layout(&nodes, &edges, &config);
        assert!(layout.needs_panning(400.0));
        for pos in layout.positions.values() {
            assert!(pos.x <= layout.width);
        }
    }

    #[test]
    fn test_strategy_from_str() {
        assert_eq!(
            "Force".parse::<LayoutStrategy>().unwrap(),
            LayoutStrategy::Force
        );
        assert_eq!(
            "radial".parse::<LayoutStrategy>().unwrap(),
            LayoutStrategy::Circular
        );
        assert!("spiral".parse::<LayoutStrategy>().is_err());
    }
}
