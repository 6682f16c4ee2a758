//! Markdown export implementation.
//!
//! Exports a human-readable summary of an import graph for documentation and
//! code reviews.

use std::io::Write;

use super::{ExportData, ExportResult, Exporter};
use crate::graph::{classify_all, Category};

/// Number of rows in the hub table.
const TOP_HUBS: usize = 10;

/// Markdown exporter implementation.
pub struct MarkdownExporter;

impl Exporter for MarkdownExporter {
    fn export<W: Write>(&self, data: &ExportData, writer: &mut W) -> ExportResult<()> {
        let report = &data.report;

        writeln!(writer, "# Import Graph Report")?;
        writeln!(writer)?;
        writeln!(writer, "**Project:** {}", data.project_name)?;
        writeln!(writer)?;

        // Summary section
        writeln!(writer, "## Summary")?;
        writeln!(writer)?;
        writeln!(writer, "| Metric | Count |")?;
        writeln!(writer, "|--------|-------|")?;
        writeln!(writer, "| Files | {} |", report.stats.total_files)?;
        writeln!(writer, "| Internal Imports | {} |", report.stats.internal_deps)?;
        writeln!(writer, "| External Imports | {} |", report.stats.external_deps)?;
        writeln!(
            writer,
            "| Unresolved Imports | {} |",
            report.stats.unresolved_deps
        )?;
        writeln!(writer, "| Graph Nodes | {} |", report.nodes().len())?;
        writeln!(writer, "| Graph Edges | {} |", report.edges().len())?;
        writeln!(writer, "| Import Cycles | {} |", data.cycles.len())?;
        writeln!(writer)?;

        // Most depended-on files
        let mut classified = classify_all(report.nodes(), report.edges());
        classified.retain(|c| !c.node.is_external() && c.degree.incoming > 0);
        classified.sort_by(|a, b| {
            b.degree
                .incoming
                .cmp(&a.degree.incoming)
                .then_with(|| b.importance.total_cmp(&a.importance))
                .then_with(|| a.node.id.cmp(&b.node.id))
        });

        if !classified.is_empty() {
            writeln!(writer, "## Top Hubs")?;
            writeln!(writer)?;
            writeln!(writer, "| File | Category | Imported By | Imports |")?;
            writeln!(writer, "|------|----------|-------------|---------|")?;
            for node in classified.iter().take(TOP_HUBS) {
                writeln!(
                    writer,
                    "| {} | {} | {} | {} |",
                    node.node.id, node.category, node.degree.incoming, node.degree.outgoing
                )?;
            }
            writeln!(writer)?;

            let hubs = classified
                .iter()
                .filter(|c| c.category == Category::Hub)
                .count();
            if hubs > 0 {
                writeln!(writer, "{} file(s) are classified as hubs.", hubs)?;
                writeln!(writer)?;
            }
        }

        // Issues section (cycles and unresolved imports)
        if !data.cycles.is_empty() || !report.unresolved.is_empty() {
            writeln!(writer, "## Issues")?;
            writeln!(writer)?;
        }

        if !data.cycles.is_empty() {
            writeln!(writer, "### Import Cycles")?;
            writeln!(writer)?;
            writeln!(writer, "The following import cycles were detected:")?;
            writeln!(writer)?;
            for (i, cycle) in data.cycles.iter().enumerate() {
                writeln!(writer, "{}. `{}`", i + 1, cycle.cycle_path())?;
            }
            writeln!(writer)?;
        }

        if !report.unresolved.is_empty() {
            writeln!(writer, "### Unresolved Imports")?;
            writeln!(writer)?;
            if report.unresolved.len() < report.stats.unresolved_deps {
                writeln!(
                    writer,
                    "Showing {} of {} unresolved imports.",
                    report.unresolved.len(),
                    report.stats.unresolved_deps
                )?;
                writeln!(writer)?;
            }
            writeln!(writer, "| File | Target |")?;
            writeln!(writer, "|------|--------|")?;
            for edge in &report.unresolved {
                writeln!(writer, "| {} | `{}` |", edge.from, edge.to)?;
            }
            writeln!(writer)?;
        }

        // Footer
        writeln!(writer, "---")?;
        writeln!(writer, "*Generated by importscope*")?;

        Ok(())
    }
}
