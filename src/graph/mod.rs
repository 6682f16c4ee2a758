//! Graph module for import relationship modeling.
//!
//! This module provides the [`ImportGraph`] built by [`GraphBuilder`] from
//! resolved import edges, and the pure node classifier used by the layout
//! engine.
//!
//! # Example
//!
//! ```rust
//! use importscope::analysis::{ResolutionKind, ResolvedEdge};
//! use importscope::graph::{classify_all, Category, GraphBuilder};
//!
//! let mut builder = GraphBuilder::new();
//! builder.add_file("src/main.js");
//! builder.add_file("src/util.js");
//! builder.add_resolved(ResolvedEdge::new("src/main.js", "src/util.js", ResolutionKind::Internal));
//!
//! let (nodes, edges) = builder.build().to_parts();
//! let classified = classify_all(&nodes, &edges);
//! assert_eq!(classified[0].category, Category::Bridge);
//! assert_eq!(classified[1].category, Category::Leaf);
//! ```

mod classify;
mod import_graph;

pub use classify::{
    categorize, classify, classify_all, degrees, is_config_name, Category, ClassifiedNode, Degree,
    NodeStyle,
};
pub use import_graph::{
    CycleInfo, EdgeKind, GraphBuilder, GraphEdge, GraphNode, GraphStats, ImportGraph, NodeKind,
};
