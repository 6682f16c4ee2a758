//! JSON wire format.
//!
//! The analysis result crosses a process boundary as one JSON document:
//! summary stats, the complete graph, and diagnostic edge lists that may be
//! truncated for transport. Layout data is never part of it; the consumer
//! recomputes classification and positions from `graph`.

use std::io::{Read, Write};

use serde::{Deserialize, Serialize};

use super::{ExportData, ExportResult, Exporter};
use crate::analysis::{ResolutionKind, ResolvedEdge};
use crate::graph::{GraphEdge, GraphNode, GraphStats, ImportGraph};

/// JSON exporter implementation.
pub struct JsonExporter;

/// Tag carried by every diagnostic edge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticTag {
    #[default]
    Import,
}

/// One entry of the `internal`/`external`/`unresolved` lists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiagnosticEdge {
    pub from: String,
    pub to: String,
    #[serde(rename = "type", default)]
    pub tag: DiagnosticTag,
}

impl From<&ResolvedEdge> for DiagnosticEdge {
    fn from(edge: &ResolvedEdge) -> Self {
        Self {
            from: edge.from.clone(),
            to: edge.to.clone(),
            tag: DiagnosticTag::Import,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireGraph {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
}

/// Root of the wire document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub stats: GraphStats,
    pub graph: WireGraph,
    #[serde(default)]
    pub internal: Vec<DiagnosticEdge>,
    #[serde(default)]
    pub external: Vec<DiagnosticEdge>,
    #[serde(default)]
    pub unresolved: Vec<DiagnosticEdge>,
}

impl AnalysisReport {
    /// Builds the document for `graph`, keeping at most `max_diagnostics`
    /// entries per diagnostic list. `stats` always reports the full counts.
    pub fn from_graph(graph: &ImportGraph, max_diagnostics: Option<usize>) -> Self {
        let limit = max_diagnostics.unwrap_or(usize::MAX);
        let list = |kind| -> Vec<DiagnosticEdge> {
            graph
                .diagnostics(kind)
                .iter()
                .take(limit)
                .map(DiagnosticEdge::from)
                .collect()
        };

        let (nodes, edges) = graph.to_parts();
        Self {
            stats: graph.stats(),
            graph: WireGraph { nodes, edges },
            internal: list(ResolutionKind::Internal),
            external: list(ResolutionKind::External),
            unresolved: list(ResolutionKind::Unresolved),
        }
    }

    pub fn to_writer<W: Write>(&self, writer: &mut W) -> ExportResult<()> {
        serde_json::to_writer_pretty(&mut *writer, self)?;
        writeln!(writer)?;
        Ok(())
    }

    /// Parses a document written by [`AnalysisReport::to_writer`].
    pub fn from_reader<R: Read>(reader: R) -> ExportResult<Self> {
        Ok(serde_json::from_reader(reader)?)
    }

    pub fn nodes(&self) -> &[GraphNode] {
        &self.graph.nodes
    }

    pub fn edges(&self) -> &[GraphEdge] {
        &self.graph.edges
    }
}

impl Exporter for JsonExporter {
    fn export<W: Write>(&self, data: &ExportData, writer: &mut W) -> ExportResult<()> {
        data.report.to_writer(writer)
    }
}
