//! Source files and the file-set boundary.
//!
//! The analysis pipeline only needs an ordered list of `{ path, language,
//! content }` records. [`DirectoryFileSet`] produces that list from a project
//! directory; anything else implementing [`FileSetProvider`] works as well.

use std::fs;
use std::path::{Path, PathBuf};

use glob::Pattern;
use tracing::{debug, warn};
use walkdir::WalkDir;

use super::language::RuleSet;
use super::{AnalysisError, AnalysisResult};

/// A single file handed to the analysis pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    /// Project-relative path with `/` separators
    pub path: String,
    /// Language tag matching a [`RuleSet`] entry
    pub language: String,
    /// Raw file text
    pub content: String,
}

impl SourceFile {
    pub fn new(
        path: impl Into<String>,
        language: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            path: path.into(),
            language: language.into(),
            content: content.into(),
        }
    }
}

/// Supplies the files of one analysis pass.
pub trait FileSetProvider {
    /// Returns the files to analyze, in a stable order.
    fn source_files(&self) -> Vec<SourceFile>;
}

impl FileSetProvider for Vec<SourceFile> {
    fn source_files(&self) -> Vec<SourceFile> {
        self.clone()
    }
}

impl FileSetProvider for [SourceFile] {
    fn source_files(&self) -> Vec<SourceFile> {
        self.to_vec()
    }
}

/// Directories that never contain first-party sources.
const IGNORED_DIRS: &[&str] = &[
    "node_modules",
    ".git",
    "dist",
    "build",
    ".next",
    "coverage",
    ".turbo",
    "__pycache__",
    ".venv",
    "target",
];

/// Decides which project-relative paths take part in the analysis.
#[derive(Debug, Clone, Default)]
pub struct ExclusionFilter {
    patterns: Vec<Pattern>,
}

impl ExclusionFilter {
    /// Creates a filter that excludes nothing.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a filter from glob patterns such as `**/*.test.js` or `legacy/**`.
    pub fn from_globs<I, S>(globs: I) -> AnalysisResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let patterns = globs
            .into_iter()
            .map(|g| {
                let g = g.as_ref();
                Pattern::new(g).map_err(|source| AnalysisError::InvalidGlob {
                    pattern: g.to_string(),
                    source,
                })
            })
            .collect::<AnalysisResult<Vec<_>>>()?;

        Ok(Self { patterns })
    }

    /// Returns false when `path` matches any exclusion pattern.
    pub fn should_include(&self, path: &str) -> bool {
        !self.patterns.iter().any(|p| p.matches(path))
    }

    /// Returns true if no pattern is registered.
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

/// Reads every recognised source file below a project root.
#[derive(Debug)]
pub struct DirectoryFileSet<'r> {
    root: PathBuf,
    rules: &'r RuleSet,
    filter: ExclusionFilter,
}

impl<'r> DirectoryFileSet<'r> {
    /// Lists files under `root` whose extension belongs to a language in `rules`.
    pub fn new(root: impl Into<PathBuf>, rules: &'r RuleSet, filter: ExclusionFilter) -> Self {
        Self {
            root: root.into(),
            rules,
            filter,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl FileSetProvider for DirectoryFileSet<'_> {
    fn source_files(&self) -> Vec<SourceFile> {
        let mut files = Vec::new();

        for entry in WalkDir::new(&self.root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| !is_ignored_dir(e))
            .filter_map(|e| e.ok())
        {
            if !entry.file_type().is_file() {
                continue;
            }

            let path = entry.path();
            let Some(relative) = relative_path(&self.root, path) else {
                continue;
            };
            if !self.filter.should_include(&relative) {
                debug!(path = %relative, "excluded by pattern");
                continue;
            }
            let Some(language) = self.rules.language_for_path(path) else {
                continue;
            };

            match fs::read_to_string(path) {
                Ok(content) => files.push(SourceFile::new(relative, language, content)),
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "skipping unreadable file");
                }
            }
        }

        files
    }
}

/// Converts `path` to a `/`-separated path relative to `root`.
pub fn relative_path(root: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(root).ok()?;
    let parts: Vec<String> = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    if parts.is_empty() {
        return None;
    }
    Some(parts.join("/"))
}

fn is_ignored_dir(entry: &walkdir::DirEntry) -> bool {
    if !entry.file_type().is_dir() || entry.depth() == 0 {
        return false;
    }

    let name = entry.file_name().to_string_lossy();
    IGNORED_DIRS.contains(&name.as_ref())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn test_exclusion_filter() {
        let filter = ExclusionFilter::from_globs(["**/*.test.js", "legacy/*"]).unwrap();
        assert!(filter.should_include("src/app.js"));
        assert!(!filter.should_include("src/app.test.js"));
        assert!(!filter.should_include("legacy/old.js"));
    }

    #[test]
    fn test_invalid_glob_is_an_error() {
        let err = ExclusionFilter::from_globs(["[unclosed"]).unwrap_err();
        assert!(matches!(err, AnalysisError::InvalidGlob { .. }));
    }

    #[test]
    fn test_directory_file_set_walks_sources() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "src/index.js", "import './app';");
        write(dir.path(), "src/app.ts", "export const x = 1;");
        write(dir.path(), "src/app.test.js", "");
        write(dir.path(), "node_modules/react/index.js", "");
        write(dir.path(), "README.md", "# readme");

        let rules = RuleSet::standard();
        let filter = ExclusionFilter::from_globs(["**/*.test.js"]).unwrap();
        let files = DirectoryFileSet::new(dir.path(), &rules, filter).source_files();

        let paths: Vec<_> = files.iter().map(|f| f.path.as_str()).collect();
        assert_eq!(paths, vec!["src/app.ts", "src/index.js"]);
        assert_eq!(files[0].language, "typescript");
        assert_eq!(files[1].content, "import './app';");
    }

    #[test]
    fn test_non_utf8_file_is_skipped() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("bad.js"), [0xff, 0xfe, 0x00, 0x80]).unwrap();
        write(dir.path(), "good.js", "");

        let rules = RuleSet::standard();
        let files =
            DirectoryFileSet::new(dir.path(), &rules, ExclusionFilter::new()).source_files();

        assert_eq!(files.len(), 1);
        assert_eq!(files[0].path, "good.js");
    }

    #[test]
    fn test_relative_path() {
        assert_eq!(
            relative_path(Path::new("/p"), Path::new("/p/src/a.js")),
            Some("src/a.js".to_string())
        );
        assert_eq!(relative_path(Path::new("/p"), Path::new("/p")), None);
        assert_eq!(relative_path(Path::new("/p"), Path::new("/q/a.js")), None);
    }
}
