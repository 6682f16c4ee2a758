//! Long-lived layout state for an interactive host.

use tracing::debug;

use super::{ForceSimulation, Layout, LayoutConfig, LayoutEngine, LayoutStrategy};
use crate::graph::{GraphEdge, GraphNode};

/// Holds the current graph, its data version and the latest layout.
///
/// Every call to [`LayoutSession::set_graph`] bumps the data version and
/// drops any force simulation still running, so positions never carry over
/// from an older graph.
#[derive(Debug, Default)]
pub struct LayoutSession {
    engine: LayoutEngine,
    config: LayoutConfig,
    nodes: Vec<GraphNode>,
    edges: Vec<GraphEdge>,
    data_version: u64,
    layout: Layout,
    simulation: Option<ForceSimulation>,
}

impl LayoutSession {
    /// Creates a session with no graph.
    pub fn new(engine: LayoutEngine, config: LayoutConfig) -> Self {
        Self {
            engine,
            config,
            ..Self::default()
        }
    }

    /// Replaces the graph data and rebuilds the layout from scratch.
    pub fn set_graph(&mut self, nodes: Vec<GraphNode>, edges: Vec<GraphEdge>) {
        self.nodes = nodes;
        self.edges = edges;
        self.data_version += 1;
        if self.simulation.take().is_some() {
            debug!(data_version = self.data_version, "abandoning force simulation");
        }
        self.recompute();
    }

    /// Replaces the config and recomputes; an identical config is ignored.
    pub fn set_config(&mut self, config: LayoutConfig) {
        if config == self.config {
            return;
        }
        self.config = config;
        self.simulation = None;
        self.recompute();
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    fn recompute(&mut self) {
        if self.config.strategy == LayoutStrategy::Force {
            let simulation =
                self.engine
                    .start_force(&self.nodes, &self.edges, &self.config, self.data_version);
            self.layout = simulation.layout();
            self.simulation = Some(simulation);
        } else {
            self.layout = self
                .engine
                .compute_layout(&self.nodes, &self.edges, &self.config);
        }
    }

    /// Advances the force simulation by one step, if one is running.
    ///
    /// Returns true when positions changed.
    pub fn tick(&mut self) -> bool {
        let Some(simulation) = self.simulation.as_mut() else {
            return false;
        };
        if simulation.data_version() != self.data_version {
            self.simulation = None;
            return false;
        }
        if !simulation.tick() {
            return false;
        }
        self.layout = simulation.layout();
        true
    }

    /// Returns true while a force simulation still has ticks left.
    pub fn is_settling(&self) -> bool {
        self.simulation.as_ref().is_some_and(|s| !s.is_finished())
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    /// Bumped by every [`LayoutSession::set_graph`].
    pub fn data_version(&self) -> u64 {
        self.data_version
    }

    pub fn nodes(&self) -> &[GraphNode] {
        &self.nodes
    }

    pub fn edges(&self) -> &[GraphEdge] {
        &self.edges
    }
}
