//! Topological node classification.
//!
//! A node's category, radius and importance are derived purely from its
//! incoming/outgoing edge counts and its name. Nothing is cached on the node,
//! so reclassifying after a filter change can never go stale.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use super::{GraphEdge, GraphNode};

/// Incoming edges at or above this count make a hub.
pub const HUB_MIN_INCOMING: usize = 5;
/// Outgoing edges at or above this count (with few incoming) make an entry.
pub const ENTRY_MIN_OUTGOING: usize = 5;
pub const ENTRY_MAX_INCOMING: usize = 2;

/// Filename fragments of well-known project configuration files.
const CONFIG_MARKERS: &[&str] = &[
    "package.json",
    "tsconfig",
    "jsconfig",
    "webpack.config",
    "vite.config",
    "rollup.config",
    "babel.config",
    ".babelrc",
    "eslint.config",
    ".eslintrc",
    ".prettierrc",
    "jest.config",
    "vitest.config",
    "tailwind.config",
    "postcss.config",
    "next.config",
    "nuxt.config",
    "svelte.config",
    ".env",
    "setup.py",
    "pyproject.toml",
    "requirements.txt",
    "cargo.toml",
];

/// The topological role of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// Imported by many files
    Hub,
    /// Imports many files, imported by few
    Entry,
    /// Both imports and is imported
    Bridge,
    /// Imports nothing
    Leaf,
    /// Project configuration file
    Config,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Hub,
        Category::Entry,
        Category::Bridge,
        Category::Leaf,
        Category::Config,
    ];

    pub fn base_radius(self) -> f32 {
        match self {
            Self::Hub => 14.0,
            Self::Entry => 12.0,
            Self::Bridge => 10.0,
            Self::Leaf => 8.0,
            Self::Config => 9.0,
        }
    }

    /// Ordering weight for ring assignment in the circular layout.
    pub fn weight(self) -> f32 {
        match self {
            Self::Hub => 5.0,
            Self::Entry => 4.0,
            Self::Bridge => 3.0,
            Self::Leaf => 2.0,
            Self::Config => 1.0,
        }
    }

    pub fn style(self) -> NodeStyle {
        match self {
            Self::Hub => NodeStyle::new("#f59e0b", "#b45309", "#fcd34d"),
            Self::Entry => NodeStyle::new("#10b981", "#047857", "#6ee7b7"),
            Self::Bridge => NodeStyle::new("#3b82f6", "#1d4ed8", "#93c5fd"),
            Self::Leaf => NodeStyle::new("#8b5cf6", "#6d28d9", "#c4b5fd"),
            Self::Config => NodeStyle::new("#6b7280", "#374151", "#d1d5db"),
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Hub => write!(f, "hub"),
            Self::Entry => write!(f, "entry"),
            Self::Bridge => write!(f, "bridge"),
            Self::Leaf => write!(f, "leaf"),
            Self::Config => write!(f, "config"),
        }
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "hub" => Ok(Self::Hub),
            "entry" => Ok(Self::Entry),
            "bridge" => Ok(Self::Bridge),
            "leaf" => Ok(Self::Leaf),
            "config" => Ok(Self::Config),
            _ => Err(format!(
                "Unknown category: '{}'. Valid categories: hub, entry, bridge, leaf, config",
                s
            )),
        }
    }
}

/// Fill, stroke and glow colors for a category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeStyle {
    pub fill: &'static str,
    pub stroke: &'static str,
    pub glow: &'static str,
}

impl NodeStyle {
    const fn new(fill: &'static str, stroke: &'static str, glow: &'static str) -> Self {
        Self { fill, stroke, glow }
    }
}

/// Edge counts of a single node.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Degree {
    pub incoming: usize,
    pub outgoing: usize,
}

impl Degree {
    pub fn total(self) -> usize {
        self.incoming + self.outgoing
    }
}

/// Counts incoming and outgoing edges per node id.
pub fn degrees<'a>(edges: impl IntoIterator<Item = &'a GraphEdge>) -> HashMap<&'a str, Degree> {
    let mut table: HashMap<&str, Degree> = HashMap::new();
    for edge in edges {
        table.entry(edge.from.as_str()).or_default().outgoing += 1;
        table.entry(edge.to.as_str()).or_default().incoming += 1;
    }
    table
}

/// Returns true when `name` looks like a project configuration file.
pub fn is_config_name(name: &str) -> bool {
    let lower = name.to_lowercase();
    CONFIG_MARKERS.iter().any(|marker| lower.contains(marker))
}

/// Assigns a category. First matching rule wins: config, hub, entry, leaf, bridge.
///
/// # Example
///
/// ```rust
/// use importscope::graph::{categorize, Category, Degree};
///
/// let hub = Degree { incoming: 6, outgoing: 1 };
/// assert_eq!(categorize("src/utils.js", hub), Category::Hub);
/// assert_eq!(categorize("package.json", hub), Category::Config);
/// ```
pub fn categorize(name: &str, degree: Degree) -> Category {
    if is_config_name(name) {
        Category::Config
    } else if degree.incoming >= HUB_MIN_INCOMING {
        Category::Hub
    } else if degree.outgoing >= ENTRY_MIN_OUTGOING && degree.incoming <= ENTRY_MAX_INCOMING {
        Category::Entry
    } else if degree.outgoing == 0 {
        Category::Leaf
    } else {
        Category::Bridge
    }
}

/// A node together with its derived visual attributes.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassifiedNode<'a> {
    pub node: &'a GraphNode,
    pub category: Category,
    pub degree: Degree,
    pub radius: f32,
    pub importance: f32,
    pub style: NodeStyle,
}

/// Classifies one node given its edge counts.
pub fn classify(node: &GraphNode, degree: Degree) -> ClassifiedNode<'_> {
    let name_match = is_config_name(&node.label)
        || node.path.as_deref().is_some_and(is_config_name)
        || is_config_name(&node.id);
    let category = if name_match {
        Category::Config
    } else {
        categorize("", degree)
    };

    let scale = (degree.total() as f32 / 10.0).clamp(0.5, 2.0);
    let importance =
        category.weight() + 0.1 * (2.0 * degree.incoming as f32 + degree.outgoing as f32);

    ClassifiedNode {
        node,
        category,
        degree,
        radius: category.base_radius() * scale,
        importance,
        style: category.style(),
    }
}

/// Classifies every node against the full edge set, preserving node order.
pub fn classify_all<'a>(nodes: &'a [GraphNode], edges: &[GraphEdge]) -> Vec<ClassifiedNode<'a>> {
    let table = degrees(edges);
    nodes
        .iter()
        .map(|node| {
            let degree = table.get(node.id.as_str()).copied().unwrap_or_default();
            classify(node, degree)
        })
        .collect()
}
