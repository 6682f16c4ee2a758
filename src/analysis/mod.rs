//! Source analysis module for ImportScope.
//!
//! This module turns a set of source files into a typed import graph.
//!
//! # Pipeline
//!
//! 1. [`ImportExtractor`] pulls raw specifiers out of each file using the
//!    per-language patterns of a [`RuleSet`]
//! 2. [`ImportResolver`] classifies each specifier as internal, external or
//!    unresolved relative to the importing file
//! 3. [`GraphBuilder`](crate::graph::GraphBuilder) aggregates the resolved
//!    edges into nodes, edges and import counts
//!
//! # Example
//!
//! ```rust
//! use importscope::analysis::{analyze, AnalysisOptions, KnownFiles, RuleSet, SourceFile};
//!
//! let files = vec![
//!     SourceFile::new("src/index.js", "javascript", "import { run } from './app';"),
//!     SourceFile::new("src/app.js", "javascript", "import _ from 'lodash';"),
//! ];
//! let rules = RuleSet::standard();
//! let probe = KnownFiles::new(files.iter().map(|f| f.path.clone()));
//!
//! let graph = analyze(&files, &rules, probe, &AnalysisOptions::default());
//! assert_eq!(graph.node_count(), 3);
//! assert_eq!(graph.stats().internal_deps, 1);
//! ```

pub mod extractor;
pub mod language;
pub mod resolver;
pub mod source;

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info};

use crate::graph::{GraphBuilder, ImportGraph};

pub use extractor::ImportExtractor;
pub use language::{LanguageRules, RuleSet, SpecifierStyle};
pub use resolver::{DiskProbe, ImportResolver, KnownFiles, PathProbe, ResolutionKind, ResolvedEdge};
pub use source::{DirectoryFileSet, ExclusionFilter, FileSetProvider, SourceFile};

/// Errors that can occur while preparing an analysis pass.
#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("Failed to read project: {0}")]
    Io(#[from] std::io::Error),

    #[error("Not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    #[error("Invalid exclusion pattern '{pattern}': {source}")]
    InvalidGlob {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },
}

/// Result type for analysis operations.
pub type AnalysisResult<T> = Result<T, AnalysisError>;

/// Knobs for one analysis pass.
#[derive(Debug, Clone)]
pub struct AnalysisOptions {
    /// Materialize nodes for external packages
    pub include_external: bool,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            include_external: true,
        }
    }
}

/// Runs extraction, resolution and graph building over `files`.
///
/// Files in languages without rules still become graph nodes; they simply
/// contribute no edges.
pub fn analyze<P: PathProbe>(
    files: &[SourceFile],
    rules: &RuleSet,
    probe: P,
    options: &AnalysisOptions,
) -> ImportGraph {
    let extractor = ImportExtractor::new(rules);
    let resolver = ImportResolver::new(rules, probe);
    let mut builder = GraphBuilder::new().include_external(options.include_external);

    for file in files {
        builder.add_file(&file.path);

        let specifiers = extractor.extract(file);
        debug!(path = %file.path, imports = specifiers.len(), "extracted imports");

        for specifier in specifiers {
            builder.add_resolved(resolver.resolve(&specifier, &file.path, &file.language));
        }
    }

    let graph = builder.build();
    let stats = graph.stats();
    info!(
        files = stats.total_files,
        internal = stats.internal_deps,
        external = stats.external_deps,
        unresolved = stats.unresolved_deps,
        "analysis complete"
    );
    graph
}

/// Scans a project directory from disk and analyzes it.
pub fn analyze_directory(
    root: &Path,
    rules: &RuleSet,
    filter: ExclusionFilter,
    options: &AnalysisOptions,
) -> AnalysisResult<ImportGraph> {
    if !root.is_dir() {
        return Err(AnalysisError::NotADirectory(root.to_path_buf()));
    }

    let files = DirectoryFileSet::new(root, rules, filter).source_files();
    Ok(analyze(&files, rules, DiskProbe::new(root), options))
}
