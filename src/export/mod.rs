//! Export functionality for import analysis results.
//!
//! This module provides exporters for outputting an analyzed import graph
//! in various formats: the JSON wire document consumed by a separate viewer,
//! and a Markdown summary for documentation and reviews.

pub mod json;
pub mod markdown;

use std::io::{self, Write};

use thiserror::Error;

use crate::graph::{CycleInfo, ImportGraph};

pub use json::{AnalysisReport, DiagnosticEdge, WireGraph};

/// Errors that can occur while writing or reading exported documents.
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Invalid report document: {0}")]
    Json(#[from] serde_json::Error),
}

pub type ExportResult<T> = Result<T, ExportError>;

/// Export format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    /// JSON format - the wire document, complete graph plus diagnostics
    #[default]
    Json,
    /// Markdown format - documentation/reporting
    Markdown,
}

impl std::str::FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(ExportFormat::Json),
            "markdown" | "md" => Ok(ExportFormat::Markdown),
            _ => Err(format!(
                "Unknown export format: '{}'. Valid formats: json, markdown",
                s
            )),
        }
    }
}

impl std::fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExportFormat::Json => write!(f, "json"),
            ExportFormat::Markdown => write!(f, "markdown"),
        }
    }
}

/// Data container for export operations.
///
/// Holds the wire report plus the cycles found in the graph, which only the
/// Markdown summary shows.
#[derive(Debug, Clone)]
pub struct ExportData {
    /// Name shown in report headings, usually the scanned directory name
    pub project_name: String,
    pub report: AnalysisReport,
    pub cycles: Vec<CycleInfo>,
}

impl ExportData {
    /// Create export data from an analyzed graph.
    ///
    /// `max_diagnostics` truncates the diagnostic lists; the graph itself is
    /// always complete.
    pub fn new(
        project_name: impl Into<String>,
        graph: &ImportGraph,
        max_diagnostics: Option<usize>,
    ) -> Self {
        Self {
            project_name: project_name.into(),
            report: AnalysisReport::from_graph(graph, max_diagnostics),
            cycles: graph.detect_cycles(),
        }
    }
}

/// Trait for exporters.
pub trait Exporter {
    /// Export the data to the given writer.
    fn export<W: Write>(&self, data: &ExportData, writer: &mut W) -> ExportResult<()>;
}

/// Export data in the specified format.
pub fn export<W: Write>(
    format: ExportFormat,
    data: &ExportData,
    writer: &mut W,
) -> ExportResult<()> {
    match format {
        ExportFormat::Json => json::JsonExporter.export(data, writer),
        ExportFormat::Markdown => markdown::MarkdownExporter.export(data, writer),
    }
}

/// Export data to a string.
pub fn export_to_string(format: ExportFormat, data: &ExportData) -> ExportResult<String> {
    let mut buffer = Vec::new();
    export(format, data, &mut buffer)?;
    String::from_utf8(buffer)
        .map_err(|e| ExportError::Io(io::Error::new(io::ErrorKind::InvalidData, e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_export_format_from_str() {
        assert_eq!("json".parse::<ExportFormat>().unwrap(), ExportFormat::Json);
        assert_eq!("JSON".parse::<ExportFormat>().unwrap(), ExportFormat::Json);
        assert_eq!(
            "markdown".parse::<ExportFormat>().unwrap(),
            ExportFormat::Markdown
        );
        assert_eq!(
            "md".parse::<ExportFormat>().unwrap(),
            ExportFormat::Markdown
        );
        assert!("csv".parse::<ExportFormat>().is_err());
    }

    #[test]
    fn test_export_format_display() {
        assert_eq!(format!("{}", ExportFormat::Json), "json");
        assert_eq!(format!("{}", ExportFormat::Markdown), "markdown");
    }

    #[test]
    fn test_export_to_string_empty_graph() {
        let data = ExportData::new("empty", &ImportGraph::new(), None);
        let json = export_to_string(ExportFormat::Json, &data).unwrap();
        assert!(json.contains("\"totalFiles\": 0"));

        let md = export_to_string(ExportFormat::Markdown, &data).unwrap();
        assert!(md.starts_with("# Import Graph Report"));
    }
}
